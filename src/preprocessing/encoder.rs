//! Categorical encoding: fixed-order ordinal ranks and learned one-hot vocabularies

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// What to do with a one-hot category that was not seen during fit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownCategoryPolicy {
    /// Emit an all-zero indicator block
    #[default]
    Ignore,
    /// Fail with `PipelineError::UnknownCategory`
    Error,
}

/// Ordinal encoder over a declared rank list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrdinalEncoder {
    column: String,
    categories: Vec<String>,
}

impl OrdinalEncoder {
    pub fn new(column: impl Into<String>, categories: Vec<String>) -> Self {
        Self {
            column: column.into(),
            categories,
        }
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Rank of `value` in the declared order
    pub fn rank(&self, value: &str) -> Result<usize> {
        self.categories
            .iter()
            .position(|c| c == value)
            .ok_or_else(|| PipelineError::UnknownCategory {
                column: self.column.clone(),
                value: value.to_string(),
            })
    }

    pub fn encode(&self, values: &[&str]) -> Result<Vec<f64>> {
        values.iter().map(|v| self.rank(v).map(|r| r as f64)).collect()
    }
}

/// One-hot encoder with a vocabulary learned from training values.
///
/// Categories are kept sorted, so output positions depend only on the set of
/// observed values and never on row order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    column: String,
    categories: Vec<String>,
}

impl OneHotEncoder {
    pub fn fit(column: impl Into<String>, values: &[&str]) -> Self {
        let categories: BTreeSet<&str> = values.iter().copied().collect();
        Self {
            column: column.into(),
            categories: categories.into_iter().map(str::to_string).collect(),
        }
    }

    /// Rebuild from a stored vocabulary; rejects unsorted or duplicated lists.
    pub fn from_categories(column: impl Into<String>, categories: Vec<String>) -> Result<Self> {
        let column = column.into();
        if categories.windows(2).any(|w| w[0] >= w[1]) {
            return Err(PipelineError::Persistence(format!(
                "one-hot vocabulary for '{}' is not strictly sorted",
                column
            )));
        }
        Ok(Self { column, categories })
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn width(&self) -> usize {
        self.categories.len()
    }

    pub fn position(&self, value: &str) -> Option<usize> {
        self.categories
            .binary_search_by(|c| c.as_str().cmp(value))
            .ok()
    }

    /// Write the indicator block for `value` into `out` (length `width()`).
    pub fn encode_into(&self, value: &str, out: &mut [f64], policy: UnknownCategoryPolicy) -> Result<()> {
        out.iter_mut().for_each(|v| *v = 0.0);
        match (self.position(value), policy) {
            (Some(idx), _) => {
                out[idx] = 1.0;
                Ok(())
            }
            (None, UnknownCategoryPolicy::Ignore) => Ok(()),
            (None, UnknownCategoryPolicy::Error) => Err(PipelineError::UnknownCategory {
                column: self.column.clone(),
                value: value.to_string(),
            }),
        }
    }

    pub fn feature_names(&self) -> Vec<String> {
        self.categories
            .iter()
            .map(|c| format!("{}_{}", self.column, c))
            .collect()
    }
}
