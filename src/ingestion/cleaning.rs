//! Row-level cleaning rules for the raw vehicle pricing table

use crate::config::IngestionConfig;
use crate::error::{PipelineError, Result};
use crate::utils::{column_names, string_values, take_rows};
use polars::prelude::*;
use std::collections::{HashMap, HashSet};

/// Levy placeholder used for "no levy"
const LEVY_SENTINEL: &str = "-";

/// Apply every cleaning rule, in order:
/// drop identifier columns, remove rare `rare_filter_column` values, normalize
/// `Levy`, split `Engine volume` into volume and turbo flag, normalize `Doors`,
/// then drop duplicate rows.
pub fn clean_dataset(df: &DataFrame, config: &IngestionConfig) -> Result<DataFrame> {
    let mut df = df.clone();
    for column in &config.dropped_columns {
        df = df.drop(column)?;
    }

    let mut df = filter_rare_values(&df, &config.rare_filter_column, config.min_category_count)?;

    let levy = map_column(&df, "Levy", parse_levy)?;
    df.with_column(Series::new("Levy".into(), levy))?;

    let engine = map_column(&df, "Engine volume", parse_engine_volume)?;
    let (volume, turbo): (Vec<Option<f64>>, Vec<Option<&str>>) = engine
        .into_iter()
        .map(|e| match e {
            Some((v, t)) => (Some(v), Some(t)),
            None => (None, None),
        })
        .unzip();
    df.with_column(Series::new("Engine volume".into(), volume))?;
    df.with_column(Series::new("Turbo engine".into(), turbo))?;

    let doors = map_column(&df, "Doors", parse_doors)?;
    df.with_column(Series::new("Doors".into(), doors))?;

    drop_duplicates(&df)
}

fn map_column<T, F>(df: &DataFrame, column: &str, parse: F) -> Result<Vec<Option<T>>>
where
    F: Fn(&str) -> Result<T>,
{
    string_values(df, column)?
        .iter()
        .map(|v| v.as_deref().map(&parse).transpose())
        .collect()
}

/// `"-"` means no levy (0); anything else must be an integer
pub fn parse_levy(raw: &str) -> Result<i64> {
    let raw = raw.trim();
    if raw == LEVY_SENTINEL {
        return Ok(0);
    }
    raw.parse::<i64>()
        .map_err(|_| PipelineError::Ingestion(format!("cannot parse Levy value '{}'", raw)))
}

/// `"2.0 Turbo"` → `(2.0, "Yes")`, `"2.0"` → `(2.0, "No")`
pub fn parse_engine_volume(raw: &str) -> Result<(f64, &'static str)> {
    let turbo = if raw.contains("Turbo") { "Yes" } else { "No" };
    let volume = raw
        .replace("Turbo", "")
        .trim()
        .parse::<f64>()
        .map_err(|_| PipelineError::Ingestion(format!("cannot parse Engine volume value '{}'", raw)))?;
    Ok((volume, turbo))
}

/// `"04-May"` → 4.0, `"02-Mar"` → 2.0, `">5"` → 5.0
pub fn parse_doors(raw: &str) -> Result<f64> {
    let cleaned = raw.replace("-May", "").replace("-Mar", "");
    let cleaned = cleaned.trim();
    if cleaned == ">5" {
        return Ok(5.0);
    }
    cleaned
        .parse::<f64>()
        .map_err(|_| PipelineError::Ingestion(format!("cannot parse Doors value '{}'", raw)))
}

/// Keep rows whose `column` value occurs more than `min_count` times.
/// Rows with a missing value are removed as well.
pub fn filter_rare_values(df: &DataFrame, column: &str, min_count: usize) -> Result<DataFrame> {
    let values = string_values(df, column)?;

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for v in values.iter().flatten() {
        *counts.entry(v.as_str()).or_insert(0) += 1;
    }

    let keep: Vec<usize> = values
        .iter()
        .enumerate()
        .filter(|(_, v)| {
            v.as_deref()
                .map_or(false, |v| counts.get(v).copied().unwrap_or(0) > min_count)
        })
        .map(|(i, _)| i)
        .collect();

    take_rows(df, &keep)
}

/// Remove exact duplicate rows, keeping the first occurrence
pub fn drop_duplicates(df: &DataFrame) -> Result<DataFrame> {
    let columns = column_names(df)
        .iter()
        .map(|name| string_values(df, name))
        .collect::<Result<Vec<_>>>()?;

    let mut seen: HashSet<Vec<Option<&str>>> = HashSet::with_capacity(df.height());
    let mut keep = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        let key: Vec<Option<&str>> = columns.iter().map(|c| c[row].as_deref()).collect();
        if seen.insert(key) {
            keep.push(row);
        }
    }

    take_rows(df, &keep)
}
