//! Seeded train/test splitting

use crate::error::{PipelineError, Result};
use crate::utils::take_rows;
use polars::prelude::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Shuffle rows with a seeded RNG and split off `ceil(n * test_size)` test rows.
///
/// Returns `(train, test)`. The same seed always yields the same split.
pub fn train_test_split(
    df: &DataFrame,
    test_size: f64,
    random_state: u64,
) -> Result<(DataFrame, DataFrame)> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(PipelineError::Configuration(format!(
            "test_size must be in (0, 1), got {}",
            test_size
        )));
    }

    let n_samples = df.height();
    let n_test = (n_samples as f64 * test_size).ceil() as usize;
    if n_test == 0 || n_test >= n_samples {
        return Err(PipelineError::Configuration(format!(
            "cannot split {} rows with test_size {}",
            n_samples, test_size
        )));
    }

    let mut indices: Vec<usize> = (0..n_samples).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(random_state);
    indices.shuffle(&mut rng);

    let (test_idx, train_idx) = indices.split_at(n_test);
    Ok((take_rows(df, train_idx)?, take_rows(df, test_idx)?))
}
