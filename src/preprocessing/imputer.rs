//! Missing value imputation

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Strategy for imputing missing values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImputeStrategy {
    /// Replace with median (numeric only)
    Median,
    /// Replace with mode / most frequent value
    MostFrequent,
}

/// Median of the observed values. Even counts average the two middle values.
pub fn median(column: &str, values: &[Option<f64>]) -> Result<f64> {
    let mut observed: Vec<f64> = values.iter().flatten().copied().collect();
    if observed.is_empty() {
        return Err(no_observed_values(column));
    }

    observed.sort_by(|a, b| a.total_cmp(b));
    let mid = observed.len() / 2;
    if observed.len() % 2 == 0 {
        Ok((observed[mid - 1] + observed[mid]) / 2.0)
    } else {
        Ok(observed[mid])
    }
}

/// Most frequent observed value; ties go to the lexicographically smallest.
pub fn most_frequent(column: &str, values: &[Option<String>]) -> Result<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for val in values.iter().flatten() {
        *counts.entry(val.as_str()).or_insert(0) += 1;
    }

    let mut best: Option<(&str, usize)> = None;
    for (val, count) in counts {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((val, count));
        }
    }

    best.map(|(val, _)| val.to_string())
        .ok_or_else(|| no_observed_values(column))
}

/// Replace missing numeric values with `fill`
pub fn fill_numeric(values: &[Option<f64>], fill: f64) -> Vec<f64> {
    values.iter().map(|v| v.unwrap_or(fill)).collect()
}

/// Replace missing categorical values with `fill`
pub fn fill_categorical<'a>(values: &'a [Option<String>], fill: &'a str) -> Vec<&'a str> {
    values
        .iter()
        .map(|v| v.as_deref().unwrap_or(fill))
        .collect()
}

fn no_observed_values(column: &str) -> PipelineError {
    PipelineError::Data(format!(
        "column '{}' has no non-missing training values",
        column
    ))
}
