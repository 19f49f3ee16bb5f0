//! Explicit column schemas for the vehicle pricing tables
//!
//! Tables are checked against a declared, ordered list of `(name, role)` pairs
//! when they are loaded instead of relying on whatever columns happen to exist.

use crate::error::{PipelineError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Semantic role of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnRole {
    /// Identifier-like column removed during ingestion
    Dropped,
    Numeric,
    /// Categorical with a fixed rank order
    Ordinal,
    /// Categorical without an order
    Nominal,
    Target,
}

impl ColumnRole {
    pub fn is_feature(&self) -> bool {
        matches!(self, ColumnRole::Numeric | ColumnRole::Ordinal | ColumnRole::Nominal)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub role: ColumnRole,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, role: ColumnRole) -> Self {
        Self {
            name: name.into(),
            role,
        }
    }
}

/// Ordered table schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    columns: Vec<ColumnSpec>,
}

const RAW_VEHICLE_COLUMNS: &[(&str, ColumnRole)] = &[
    ("ID", ColumnRole::Dropped),
    ("Price", ColumnRole::Target),
    ("Levy", ColumnRole::Numeric),
    ("Manufacturer", ColumnRole::Nominal),
    ("Model", ColumnRole::Nominal),
    ("Prod. year", ColumnRole::Numeric),
    ("Category", ColumnRole::Nominal),
    ("Leather interior", ColumnRole::Ordinal),
    ("Fuel type", ColumnRole::Ordinal),
    ("Engine volume", ColumnRole::Numeric),
    ("Mileage", ColumnRole::Dropped),
    ("Cylinders", ColumnRole::Numeric),
    ("Gear box type", ColumnRole::Ordinal),
    ("Drive wheels", ColumnRole::Ordinal),
    ("Doors", ColumnRole::Numeric),
    ("Wheel", ColumnRole::Ordinal),
    ("Color", ColumnRole::Nominal),
    ("Airbags", ColumnRole::Numeric),
];

impl Schema {
    pub fn new(columns: Vec<ColumnSpec>) -> Self {
        Self { columns }
    }

    /// Schema of the raw vehicle pricing source file
    pub fn raw_vehicle() -> Self {
        Self::new(
            RAW_VEHICLE_COLUMNS
                .iter()
                .map(|(name, role)| ColumnSpec::new(*name, *role))
                .collect(),
        )
    }

    /// Schema of the cleaned tables produced by ingestion
    pub fn cleaned_vehicle() -> Self {
        let mut columns: Vec<ColumnSpec> = RAW_VEHICLE_COLUMNS
            .iter()
            .filter(|(_, role)| *role != ColumnRole::Dropped)
            .map(|(name, role)| ColumnSpec::new(*name, *role))
            .collect();
        columns.push(ColumnSpec::new("Turbo engine", ColumnRole::Ordinal));
        Self::new(columns)
    }

    pub fn names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn role_of(&self, name: &str) -> Option<ColumnRole> {
        self.columns.iter().find(|c| c.name == name).map(|c| c.role)
    }

    /// Modeling input columns, in declaration order
    pub fn feature_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.role.is_feature())
            .map(|c| c.name.clone())
            .collect()
    }

    pub fn target_column(&self) -> Option<&str> {
        self.columns
            .iter()
            .find(|c| c.role == ColumnRole::Target)
            .map(|c| c.name.as_str())
    }

    /// Check that `df` has exactly the declared columns.
    pub fn validate(&self, df: &DataFrame) -> Result<()> {
        let present: BTreeSet<String> = df
            .get_column_names()
            .iter()
            .map(|n| n.to_string())
            .collect();
        let declared: BTreeSet<String> = self.names().into_iter().collect();

        let missing: Vec<&String> = declared.difference(&present).collect();
        let unexpected: Vec<&String> = present.difference(&declared).collect();

        if missing.is_empty() && unexpected.is_empty() {
            return Ok(());
        }

        Err(PipelineError::SchemaMismatch(format!(
            "missing columns {:?}, unexpected columns {:?}",
            missing, unexpected
        )))
    }
}
