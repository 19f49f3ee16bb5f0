//! Column transformer: routes each column to its group recipe and
//! concatenates the group outputs into one dense matrix.

use super::{
    encoder::{OneHotEncoder, OrdinalEncoder, UnknownCategoryPolicy},
    imputer,
    scaler::StandardScaler,
    validate_groups, ColumnGroup, GroupKind,
};
use crate::error::{PipelineError, Result};
use crate::utils::{f64_values, string_values};
use ndarray::Array2;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;
use tracing::debug;

/// Format tag written into every persisted transformer
pub const FORMAT_TAG: &str = "vehicle-pricing-prep/column-transformer";

/// Current persisted format version
pub const FORMAT_VERSION: u32 = 1;

/// Learned parameters of a numeric column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericParams {
    pub column: String,
    pub median: f64,
    pub mean: f64,
    pub scale: f64,
}

/// Learned parameters of an ordinal column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrdinalParams {
    pub column: String,
    pub mode: String,
    /// Declared rank order, copied from the group definition
    pub categories: Vec<String>,
    /// Scaling over ranks
    pub mean: f64,
    pub scale: f64,
}

/// Learned parameters of a one-hot column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NominalParams {
    pub column: String,
    pub mode: String,
    /// Sorted vocabulary; index = output position within the column block
    pub categories: Vec<String>,
}

/// Everything learned by one `fit` call
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FittedState {
    pub numeric: Vec<NumericParams>,
    pub ordinal: Vec<OrdinalParams>,
    pub nominal: Vec<NominalParams>,
}

impl FittedState {
    pub fn output_width(&self) -> usize {
        self.numeric.len()
            + self.ordinal.len()
            + self.nominal.iter().map(|p| p.categories.len()).sum::<usize>()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransformerState {
    Unfit,
    Fitted(FittedState),
}

/// Fit/transform unit over a fixed set of column groups
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnTransformer {
    groups: Vec<ColumnGroup>,
    unknown_policy: UnknownCategoryPolicy,
    state: TransformerState,
}

/// On-disk layout of a fitted transformer
#[derive(Debug, Serialize, Deserialize)]
struct PersistedTransformer {
    format: String,
    version: u32,
    unknown_category_policy: UnknownCategoryPolicy,
    groups: Vec<ColumnGroup>,
    fitted: FittedState,
}

#[derive(Deserialize)]
struct PersistedHeader {
    format: String,
    version: u32,
}

impl ColumnTransformer {
    pub(crate) fn new(groups: Vec<ColumnGroup>, unknown_policy: UnknownCategoryPolicy) -> Self {
        Self {
            groups,
            unknown_policy,
            state: TransformerState::Unfit,
        }
    }

    pub fn groups(&self) -> &[ColumnGroup] {
        &self.groups
    }

    pub fn unknown_category_policy(&self) -> UnknownCategoryPolicy {
        self.unknown_policy
    }

    pub fn state(&self) -> &TransformerState {
        &self.state
    }

    pub fn is_fitted(&self) -> bool {
        matches!(self.state, TransformerState::Fitted(_))
    }

    pub fn fitted_state(&self) -> Option<&FittedState> {
        match &self.state {
            TransformerState::Fitted(state) => Some(state),
            TransformerState::Unfit => None,
        }
    }

    fn require_fitted(&self) -> Result<&FittedState> {
        self.fitted_state().ok_or(PipelineError::NotFitted)
    }

    /// Learn all parameters from `df`, replacing any previous fit.
    ///
    /// The previous state is kept if fitting fails.
    pub fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        let start = Instant::now();
        let mut fitted = FittedState::default();

        for group in &self.groups {
            debug!(
                group = %group.name,
                columns = group.columns.len(),
                impute = ?group.kind.impute_strategy(),
                "Fitting column group"
            );
            match &group.kind {
                GroupKind::Numeric => {
                    for column in &group.columns {
                        fitted.numeric.push(Self::fit_numeric(df, column)?);
                    }
                }
                GroupKind::Ordinal { categories } => {
                    for (column, ranks) in group.columns.iter().zip(categories) {
                        fitted.ordinal.push(Self::fit_ordinal(df, column, ranks)?);
                    }
                }
                GroupKind::Nominal => {
                    for column in &group.columns {
                        fitted.nominal.push(Self::fit_nominal(df, column)?);
                    }
                }
            }
        }

        debug!(
            rows = df.height(),
            width = fitted.output_width(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Column transformer fitted"
        );
        self.state = TransformerState::Fitted(fitted);
        Ok(self)
    }

    fn fit_numeric(df: &DataFrame, column: &str) -> Result<NumericParams> {
        let values = f64_values(df, column)?;
        let median = imputer::median(column, &values)?;
        let scaler = StandardScaler::fit(&imputer::fill_numeric(&values, median));
        Ok(NumericParams {
            column: column.to_string(),
            median,
            mean: scaler.mean,
            scale: scaler.scale,
        })
    }

    fn fit_ordinal(df: &DataFrame, column: &str, ranks: &[String]) -> Result<OrdinalParams> {
        let values = string_values(df, column)?;
        let mode = imputer::most_frequent(column, &values)?;
        let encoder = OrdinalEncoder::new(column, ranks.to_vec());
        let encoded = encoder.encode(&imputer::fill_categorical(&values, &mode))?;
        let scaler = StandardScaler::fit(&encoded);
        Ok(OrdinalParams {
            column: column.to_string(),
            mode,
            categories: ranks.to_vec(),
            mean: scaler.mean,
            scale: scaler.scale,
        })
    }

    fn fit_nominal(df: &DataFrame, column: &str) -> Result<NominalParams> {
        let values = string_values(df, column)?;
        let mode = imputer::most_frequent(column, &values)?;
        let encoder = OneHotEncoder::fit(column, &imputer::fill_categorical(&values, &mode));
        Ok(NominalParams {
            column: column.to_string(),
            mode,
            categories: encoder.categories().to_vec(),
        })
    }

    /// Apply the stored parameters to `df`. Nothing is re-learned from the input.
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        let fitted = self.require_fitted()?;
        let n_rows = df.height();
        let mut matrix = Array2::<f64>::zeros((n_rows, fitted.output_width()));
        let mut offset = 0;

        for group in &self.groups {
            match group.kind {
                GroupKind::Numeric => {
                    for params in &fitted.numeric {
                        let values = f64_values(df, &params.column)?;
                        let scaler = StandardScaler {
                            mean: params.mean,
                            scale: params.scale,
                        };
                        for (row, value) in values.iter().enumerate() {
                            matrix[[row, offset]] = scaler.scale(value.unwrap_or(params.median));
                        }
                        offset += 1;
                    }
                }
                GroupKind::Ordinal { .. } => {
                    for params in &fitted.ordinal {
                        let values = string_values(df, &params.column)?;
                        let encoder = OrdinalEncoder::new(&params.column, params.categories.clone());
                        let scaler = StandardScaler {
                            mean: params.mean,
                            scale: params.scale,
                        };
                        let filled = imputer::fill_categorical(&values, &params.mode);
                        for (row, value) in filled.iter().enumerate() {
                            let rank = encoder.rank(value)? as f64;
                            matrix[[row, offset]] = scaler.scale(rank);
                        }
                        offset += 1;
                    }
                }
                GroupKind::Nominal => {
                    for params in &fitted.nominal {
                        let values = string_values(df, &params.column)?;
                        let encoder =
                            OneHotEncoder::from_categories(&params.column, params.categories.clone())?;
                        let width = encoder.width();
                        let mut block = vec![0.0; width];
                        let filled = imputer::fill_categorical(&values, &params.mode);
                        for (row, value) in filled.iter().enumerate() {
                            encoder.encode_into(value, &mut block, self.unknown_policy)?;
                            for (k, v) in block.iter().enumerate() {
                                matrix[[row, offset + k]] = *v;
                            }
                        }
                        offset += width;
                    }
                }
            }
        }

        Ok(matrix)
    }

    /// `fit` followed by `transform` on the same data
    pub fn fit_transform(&mut self, df: &DataFrame) -> Result<Array2<f64>> {
        self.fit(df)?;
        self.transform(df)
    }

    /// Number of output columns fixed at fit time
    pub fn output_width(&self) -> Result<usize> {
        Ok(self.require_fitted()?.output_width())
    }

    /// Output column names in matrix order
    pub fn feature_names(&self) -> Result<Vec<String>> {
        let fitted = self.require_fitted()?;
        let mut names = Vec::with_capacity(fitted.output_width());

        for group in &self.groups {
            match group.kind {
                GroupKind::Numeric => names.extend(fitted.numeric.iter().map(|p| p.column.clone())),
                GroupKind::Ordinal { .. } => {
                    names.extend(fitted.ordinal.iter().map(|p| p.column.clone()))
                }
                GroupKind::Nominal => {
                    for params in &fitted.nominal {
                        let encoder =
                            OneHotEncoder::from_categories(&params.column, params.categories.clone())?;
                        names.extend(encoder.feature_names());
                    }
                }
            }
        }

        Ok(names)
    }

    /// Recover the original numeric values from a transformed matrix.
    ///
    /// Returns one column per numeric feature, in `NumericParams` order.
    pub fn inverse_transform_numeric(&self, matrix: &Array2<f64>) -> Result<Array2<f64>> {
        let fitted = self.require_fitted()?;
        if matrix.ncols() != fitted.output_width() {
            return Err(PipelineError::SchemaMismatch(format!(
                "expected {} columns, got {}",
                fitted.output_width(),
                matrix.ncols()
            )));
        }

        let mut offset = 0;
        for group in &self.groups {
            match group.kind {
                GroupKind::Numeric => break,
                GroupKind::Ordinal { .. } => offset += fitted.ordinal.len(),
                GroupKind::Nominal => {
                    offset += fitted.nominal.iter().map(|p| p.categories.len()).sum::<usize>()
                }
            }
        }

        let mut result = Array2::<f64>::zeros((matrix.nrows(), fitted.numeric.len()));
        for (j, params) in fitted.numeric.iter().enumerate() {
            let scaler = StandardScaler {
                mean: params.mean,
                scale: params.scale,
            };
            for row in 0..matrix.nrows() {
                result[[row, j]] = scaler.unscale(matrix[[row, offset + j]]);
            }
        }

        Ok(result)
    }

    /// Serialize the fitted transformer to the versioned JSON format
    pub fn to_json(&self) -> Result<String> {
        let fitted = self.require_fitted()?;
        let persisted = PersistedTransformer {
            format: FORMAT_TAG.to_string(),
            version: FORMAT_VERSION,
            unknown_category_policy: self.unknown_policy,
            groups: self.groups.clone(),
            fitted: fitted.clone(),
        };
        Ok(serde_json::to_string_pretty(&persisted)?)
    }

    /// Restore a fitted transformer written by [`to_json`](Self::to_json)
    pub fn from_json(json: &str) -> Result<Self> {
        let header: PersistedHeader = serde_json::from_str(json)?;
        if header.format != FORMAT_TAG {
            return Err(PipelineError::Persistence(format!(
                "unrecognized format '{}'",
                header.format
            )));
        }
        if header.version != FORMAT_VERSION {
            return Err(PipelineError::Persistence(format!(
                "unsupported format version {} (expected {})",
                header.version, FORMAT_VERSION
            )));
        }

        let persisted: PersistedTransformer = serde_json::from_str(json)?;
        validate_groups(&persisted.groups, None)
            .map_err(|e| PipelineError::Persistence(e.to_string()))?;
        Self::check_consistency(&persisted.groups, &persisted.fitted)?;

        Ok(Self {
            groups: persisted.groups,
            unknown_policy: persisted.unknown_category_policy,
            state: TransformerState::Fitted(persisted.fitted),
        })
    }

    /// Fitted parameters must cover exactly the group columns, in order.
    fn check_consistency(groups: &[ColumnGroup], fitted: &FittedState) -> Result<()> {
        let mismatch = |what: &str| {
            PipelineError::Persistence(format!("fitted {} parameters do not match groups", what))
        };

        let mut numeric: Vec<&str> = Vec::new();
        let mut ordinal: Vec<(&str, &[String])> = Vec::new();
        let mut nominal: Vec<&str> = Vec::new();
        for group in groups {
            match &group.kind {
                GroupKind::Numeric => numeric.extend(group.columns.iter().map(String::as_str)),
                GroupKind::Ordinal { categories } => ordinal.extend(
                    group
                        .columns
                        .iter()
                        .map(String::as_str)
                        .zip(categories.iter().map(Vec::as_slice)),
                ),
                GroupKind::Nominal => nominal.extend(group.columns.iter().map(String::as_str)),
            }
        }

        let fitted_numeric: Vec<&str> = fitted.numeric.iter().map(|p| p.column.as_str()).collect();
        if fitted_numeric != numeric {
            return Err(mismatch("numeric"));
        }

        let fitted_ordinal: Vec<(&str, &[String])> = fitted
            .ordinal
            .iter()
            .map(|p| (p.column.as_str(), p.categories.as_slice()))
            .collect();
        if fitted_ordinal != ordinal {
            return Err(mismatch("ordinal"));
        }

        let fitted_nominal: Vec<&str> = fitted.nominal.iter().map(|p| p.column.as_str()).collect();
        if fitted_nominal != nominal {
            return Err(mismatch("nominal"));
        }
        for params in &fitted.nominal {
            OneHotEncoder::from_categories(&params.column, params.categories.clone())?;
        }

        Ok(())
    }

    /// Write the fitted transformer to `path`, replacing any existing file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = self.to_json()?;
        let persist_err =
            |e: std::io::Error| PipelineError::Persistence(format!("{}: {}", path.display(), e));

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(persist_err)?;
        }
        std::fs::write(path, json).map_err(persist_err)?;
        Ok(())
    }

    /// Load a fitted transformer from `path`
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| PipelineError::Persistence(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }
}
