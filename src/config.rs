//! Pipeline configuration
//!
//! Values are fixed at build time through `Default`; the builder methods exist
//! so tests and callers can redirect artifacts without touching global state.

use crate::preprocessing::UnknownCategoryPolicy;
use crate::schema::Schema;
use std::path::PathBuf;

/// Configuration for the ingestion step
#[derive(Debug, Clone)]
pub struct IngestionConfig {
    /// Raw source file
    pub source_path: PathBuf,

    /// Cleaned snapshot of the whole dataset
    pub raw_data_path: PathBuf,

    /// Training split output
    pub train_data_path: PathBuf,

    /// Test split output
    pub test_data_path: PathBuf,

    /// Fraction of rows assigned to the test split
    pub test_size: f64,

    /// Seed for the split shuffle
    pub random_state: u64,

    /// Column whose rare values are filtered out
    pub rare_filter_column: String,

    /// Values occurring this many times or fewer are removed
    pub min_category_count: usize,

    /// Identifier-like columns dropped before cleaning
    pub dropped_columns: Vec<String>,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            source_path: PathBuf::from("notebooks/data/car_price.csv"),
            raw_data_path: PathBuf::from("artifacts/raw.csv"),
            train_data_path: PathBuf::from("artifacts/train.csv"),
            test_data_path: PathBuf::from("artifacts/test.csv"),
            test_size: 0.3,
            random_state: 50,
            rare_filter_column: "Model".to_string(),
            min_category_count: 100,
            dropped_columns: vec!["ID".to_string(), "Mileage".to_string()],
        }
    }
}

impl IngestionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_path = path.into();
        self
    }

    /// Place raw/train/test outputs under `dir`
    pub fn with_artifact_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        self.raw_data_path = dir.join("raw.csv");
        self.train_data_path = dir.join("train.csv");
        self.test_data_path = dir.join("test.csv");
        self
    }

    pub fn with_min_category_count(mut self, count: usize) -> Self {
        self.min_category_count = count;
        self
    }

    pub fn with_split(mut self, test_size: f64, random_state: u64) -> Self {
        self.test_size = test_size;
        self.random_state = random_state;
        self
    }
}

/// Configuration for the transformation step
#[derive(Debug, Clone)]
pub struct TransformationConfig {
    /// Where the fitted transformer is persisted
    pub preprocessor_path: PathBuf,

    /// Label column separated from the features
    pub target_column: String,

    /// Handling of one-hot categories unseen during fit
    pub unknown_category_policy: UnknownCategoryPolicy,

    /// Schema both splits must match
    pub schema: Schema,
}

impl Default for TransformationConfig {
    fn default() -> Self {
        Self {
            preprocessor_path: PathBuf::from("artifacts/preprocessor.json"),
            target_column: "Price".to_string(),
            unknown_category_policy: UnknownCategoryPolicy::Ignore,
            schema: Schema::cleaned_vehicle(),
        }
    }
}

impl TransformationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_preprocessor_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.preprocessor_path = path.into();
        self
    }

    pub fn with_unknown_category_policy(mut self, policy: UnknownCategoryPolicy) -> Self {
        self.unknown_category_policy = policy;
        self
    }

    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = schema;
        self
    }
}
