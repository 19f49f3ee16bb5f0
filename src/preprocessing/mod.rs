//! Feature preprocessing
//!
//! Columns are partitioned into disjoint groups, each with its own recipe:
//! - numeric: median imputation, then standard scaling
//! - ordinal: most-frequent imputation, rank encoding over a declared order,
//!   then standard scaling
//! - nominal: most-frequent imputation, then one-hot encoding over the
//!   categories observed during fit
//!
//! [`PipelineBuilder`] checks the partition and returns an unfit
//! [`ColumnTransformer`].

mod encoder;
mod imputer;
mod pipeline;
mod scaler;

pub use encoder::{OneHotEncoder, OrdinalEncoder, UnknownCategoryPolicy};
pub use imputer::ImputeStrategy;
pub use pipeline::{
    ColumnTransformer, FittedState, NominalParams, NumericParams, OrdinalParams,
    TransformerState, FORMAT_TAG, FORMAT_VERSION,
};
pub use scaler::StandardScaler;

use crate::error::{PipelineError, Result};
use crate::schema::Schema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Processing recipe of a column group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GroupKind {
    Numeric,
    /// One rank list per column, aligned with the group's columns
    Ordinal { categories: Vec<Vec<String>> },
    Nominal,
}

impl GroupKind {
    pub fn impute_strategy(&self) -> ImputeStrategy {
        match self {
            GroupKind::Numeric => ImputeStrategy::Median,
            GroupKind::Ordinal { .. } | GroupKind::Nominal => ImputeStrategy::MostFrequent,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            GroupKind::Numeric => "numeric",
            GroupKind::Ordinal { .. } => "ordinal",
            GroupKind::Nominal => "nominal",
        }
    }
}

/// Named set of columns sharing one recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnGroup {
    pub name: String,
    pub kind: GroupKind,
    pub columns: Vec<String>,
}

/// Check group definitions: one group per kind, disjoint columns, valid rank
/// lists and, when `required` is given, exact coverage of those columns.
pub(crate) fn validate_groups(groups: &[ColumnGroup], required: Option<&[String]>) -> Result<()> {
    let mut kinds = BTreeSet::new();
    let mut owner: HashMap<&str, &str> = HashMap::new();

    for group in groups {
        if !kinds.insert(group.kind.label()) {
            return Err(PipelineError::Configuration(format!(
                "more than one {} group",
                group.kind.label()
            )));
        }

        if let GroupKind::Ordinal { categories } = &group.kind {
            if categories.len() != group.columns.len() {
                return Err(PipelineError::Configuration(format!(
                    "group '{}' has {} columns but {} rank lists",
                    group.name,
                    group.columns.len(),
                    categories.len()
                )));
            }
            for (column, ranks) in group.columns.iter().zip(categories) {
                if ranks.is_empty() {
                    return Err(PipelineError::Configuration(format!(
                        "rank list for '{}' is empty",
                        column
                    )));
                }
                let distinct: BTreeSet<&String> = ranks.iter().collect();
                if distinct.len() != ranks.len() {
                    return Err(PipelineError::Configuration(format!(
                        "rank list for '{}' contains duplicates",
                        column
                    )));
                }
            }
        }

        for column in &group.columns {
            if let Some(previous) = owner.insert(column.as_str(), group.name.as_str()) {
                return Err(PipelineError::Configuration(format!(
                    "column '{}' assigned to both '{}' and '{}'",
                    column, previous, group.name
                )));
            }
        }
    }

    if let Some(required) = required {
        let required: BTreeSet<&str> = required.iter().map(String::as_str).collect();
        let assigned: BTreeSet<&str> = owner.keys().copied().collect();

        if let Some(extra) = assigned.difference(&required).next() {
            return Err(PipelineError::Configuration(format!(
                "column '{}' is not a modeling input column",
                extra
            )));
        }
        let uncovered: Vec<&&str> = required.difference(&assigned).collect();
        if !uncovered.is_empty() {
            return Err(PipelineError::Configuration(format!(
                "columns {:?} are not assigned to any group",
                uncovered
            )));
        }
    }

    Ok(())
}

/// Builder for an unfit [`ColumnTransformer`]
#[derive(Debug, Clone, Default)]
pub struct PipelineBuilder {
    required: Vec<String>,
    numeric: Vec<String>,
    ordinal: Vec<(String, Vec<String>)>,
    nominal: Vec<String>,
    unknown_policy: UnknownCategoryPolicy,
}

impl PipelineBuilder {
    /// Builder whose groups must cover exactly `required`
    pub fn new<I, S>(required: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            required: required.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn numeric<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.numeric.extend(columns.into_iter().map(Into::into));
        self
    }

    pub fn ordinal<S: Into<String>>(mut self, column: impl Into<String>, ranks: Vec<S>) -> Self {
        self.ordinal
            .push((column.into(), ranks.into_iter().map(Into::into).collect()));
        self
    }

    pub fn nominal<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.nominal.extend(columns.into_iter().map(Into::into));
        self
    }

    pub fn unknown_category_policy(mut self, policy: UnknownCategoryPolicy) -> Self {
        self.unknown_policy = policy;
        self
    }

    pub fn build(self) -> Result<ColumnTransformer> {
        let mut groups = Vec::new();

        if !self.numeric.is_empty() {
            groups.push(ColumnGroup {
                name: "num_pipeline".to_string(),
                kind: GroupKind::Numeric,
                columns: self.numeric,
            });
        }

        if !self.ordinal.is_empty() {
            let (columns, categories): (Vec<String>, Vec<Vec<String>>) =
                self.ordinal.into_iter().unzip();
            groups.push(ColumnGroup {
                name: "ordinal_pipeline".to_string(),
                kind: GroupKind::Ordinal { categories },
                columns,
            });
        }

        if !self.nominal.is_empty() {
            groups.push(ColumnGroup {
                name: "onehot_pipeline".to_string(),
                kind: GroupKind::Nominal,
                columns: self.nominal,
            });
        }

        validate_groups(&groups, Some(self.required.as_slice()))?;
        Ok(ColumnTransformer::new(groups, self.unknown_policy))
    }
}

/// Rank orders of the vehicle ordinal columns
pub fn vehicle_rank_lists() -> Vec<(&'static str, Vec<&'static str>)> {
    vec![
        ("Gear box type", vec!["Manual", "Automatic", "Tiptronic", "Variator"]),
        ("Drive wheels", vec!["Rear", "Front", "4x4"]),
        (
            "Fuel type",
            vec!["LPG", "CNG", "Diesel", "Petrol", "Hybrid", "Plug-in Hybrid"],
        ),
        ("Turbo engine", vec!["No", "Yes"]),
        ("Leather interior", vec!["No", "Yes"]),
        ("Wheel", vec!["Left wheel", "Right-hand drive"]),
    ]
}

/// The fixed vehicle pricing groups, checked against `schema`'s features
pub fn vehicle_pipeline(schema: &Schema, policy: UnknownCategoryPolicy) -> Result<ColumnTransformer> {
    let mut builder = PipelineBuilder::new(schema.feature_columns())
        .numeric([
            "Levy",
            "Prod. year",
            "Engine volume",
            "Cylinders",
            "Doors",
            "Airbags",
        ])
        .nominal(["Manufacturer", "Model", "Category", "Color"])
        .unknown_category_policy(policy);

    for (column, ranks) in vehicle_rank_lists() {
        builder = builder.ordinal(column, ranks);
    }

    builder.build()
}
