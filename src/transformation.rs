//! Data transformation runner
//!
//! Separates the target from the features, fits the column transformer on the
//! training split only, transforms both splits with that one fitted instance
//! and persists it.

use crate::config::TransformationConfig;
use crate::error::{PipelineError, Result, Stage};
use crate::observe::{observe_stage, PipelineObserver, TracingObserver};
use crate::preprocessing::{vehicle_pipeline, ColumnTransformer};
use crate::utils::{column_names, f64_values, DataLoader};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Result of one transformation run
#[derive(Debug, Clone)]
pub struct TransformationOutput {
    pub train_features: Array2<f64>,
    pub test_features: Array2<f64>,
    pub train_target: Array1<f64>,
    pub test_target: Array1<f64>,
    /// Names of the matrix columns
    pub feature_names: Vec<String>,
    /// Where the fitted transformer was written
    pub preprocessor_path: PathBuf,
}

/// Transformation component
pub struct DataTransformation {
    config: TransformationConfig,
    observer: Arc<dyn PipelineObserver>,
}

impl DataTransformation {
    pub fn new(config: TransformationConfig) -> Self {
        Self {
            config,
            observer: Arc::new(TracingObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &TransformationConfig {
        &self.config
    }

    /// Unfit transformer with the vehicle column groups
    pub fn get_data_transformation_object(&self) -> Result<ColumnTransformer> {
        vehicle_pipeline(&self.config.schema, self.config.unknown_category_policy)
    }

    /// Read the train/test CSV splits and run the transformation
    pub fn initiate_data_transformation(
        &self,
        train_path: &Path,
        test_path: &Path,
    ) -> Result<TransformationOutput> {
        let (train, test) = observe_stage(self.observer.as_ref(), Stage::ReadSplits, || {
            let loader = DataLoader::new();
            Ok((loader.load_csv(train_path)?, loader.load_csv(test_path)?))
        })?;

        debug!("Train dataframe head:\n{}", train.head(Some(5)));
        debug!("Test dataframe head:\n{}", test.head(Some(5)));

        self.run(&train, &test, &self.config.target_column)
    }

    /// Fit on `train` features, transform both splits, persist the fitted
    /// transformer.
    pub fn run(
        &self,
        train: &DataFrame,
        test: &DataFrame,
        target_column: &str,
    ) -> Result<TransformationOutput> {
        let observer = self.observer.as_ref();

        let (train_x, train_y, test_x, test_y) = observe_stage(observer, Stage::ValidateSchema, || {
            self.validate(train, test, target_column)?;
            let (train_x, train_y) = split_features_and_target(train, target_column)?;
            let (test_x, test_y) = split_features_and_target(test, target_column)?;
            Ok((train_x, train_y, test_x, test_y))
        })?;

        let mut transformer = observe_stage(observer, Stage::BuildPipeline, || {
            self.get_data_transformation_object()
        })?;

        observe_stage(observer, Stage::Fit, || transformer.fit(&train_x).map(|_| ()))?;

        let train_features = observe_stage(observer, Stage::Transform, || transformer.transform(&train_x))?;
        let test_features = observe_stage(observer, Stage::Transform, || transformer.transform(&test_x))?;
        observer.event(
            Stage::Transform,
            &format!(
                "Transformed train {:?} and test {:?}",
                train_features.dim(),
                test_features.dim()
            ),
        );

        let preprocessor_path = self.config.preprocessor_path.clone();
        observe_stage(observer, Stage::Persist, || transformer.save(&preprocessor_path))?;
        observer.event(
            Stage::Persist,
            &format!("Preprocessor saved to {}", preprocessor_path.display()),
        );

        Ok(TransformationOutput {
            train_features,
            test_features,
            train_target: train_y,
            test_target: test_y,
            feature_names: transformer.feature_names()?,
            preprocessor_path,
        })
    }

    /// Both tables need the target and the same feature columns, and each must
    /// match the configured schema.
    fn validate(&self, train: &DataFrame, test: &DataFrame, target_column: &str) -> Result<()> {
        let train_columns: BTreeSet<String> = column_names(train).into_iter().collect();
        let test_columns: BTreeSet<String> = column_names(test).into_iter().collect();

        for (split, columns) in [("train", &train_columns), ("test", &test_columns)] {
            if !columns.contains(target_column) {
                return Err(PipelineError::SchemaMismatch(format!(
                    "{} table has no target column '{}'",
                    split, target_column
                )));
            }
        }

        if train_columns != test_columns {
            let only_train: Vec<&String> = train_columns.difference(&test_columns).collect();
            let only_test: Vec<&String> = test_columns.difference(&train_columns).collect();
            return Err(PipelineError::SchemaMismatch(format!(
                "feature columns differ: only in train {:?}, only in test {:?}",
                only_train, only_test
            )));
        }

        self.config.schema.validate(train)?;
        self.config.schema.validate(test)
    }
}

/// Split `df` into the feature table and the target vector
pub fn split_features_and_target(df: &DataFrame, target_column: &str) -> Result<(DataFrame, Array1<f64>)> {
    let target = f64_values(df, target_column)?;
    let missing = target.iter().filter(|v| v.is_none()).count();
    if missing > 0 {
        return Err(PipelineError::Data(format!(
            "target column '{}' has {} missing values",
            target_column, missing
        )));
    }

    let features = df.drop(target_column)?;
    let target = Array1::from_vec(target.into_iter().flatten().collect());
    Ok((features, target))
}
