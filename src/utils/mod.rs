//! Utility functions for working with data frames

pub mod data_loader;

pub use data_loader::{DataLoader, DataSaver};

use crate::error::{PipelineError, Result};
use polars::prelude::*;

/// Column names of `df`, in table order
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names().iter().map(|n| n.to_string()).collect()
}

fn series<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    df.column(name)
        .map(|c| c.as_materialized_series())
        .map_err(|_| PipelineError::SchemaMismatch(format!("column '{}' not found", name)))
}

/// Values of a column as strings; nulls stay `None`
pub fn string_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let casted = series(df, name)?.cast(&DataType::String)?;
    let values = casted
        .str()?
        .into_iter()
        .map(|v| v.map(|s| s.to_string()))
        .collect();
    Ok(values)
}

/// Values of a column as `f64`; nulls and NaN are `None`.
///
/// A present value that does not parse as a number is a `Data` error naming
/// the column and the value.
pub fn f64_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let series = series(df, name)?;
    let casted = series.cast(&DataType::Float64)?;

    if casted.null_count() > series.null_count() {
        let raw = series.cast(&DataType::String)?;
        let offending = raw
            .str()?
            .into_iter()
            .zip(casted.f64()?.into_iter())
            .find_map(|(raw, parsed)| match (raw, parsed) {
                (Some(raw), None) => Some(raw.to_string()),
                _ => None,
            })
            .unwrap_or_default();
        return Err(PipelineError::Data(format!(
            "column '{}' has non-numeric value '{}'",
            name, offending
        )));
    }

    let values = casted
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect();
    Ok(values)
}

/// New frame with the given rows, in the given order
pub fn take_rows(df: &DataFrame, indices: &[usize]) -> Result<DataFrame> {
    let idx: Vec<IdxSize> = indices.iter().map(|&i| i as IdxSize).collect();
    let idx = IdxCa::from_vec("idx".into(), idx);
    Ok(df.take(&idx)?)
}
