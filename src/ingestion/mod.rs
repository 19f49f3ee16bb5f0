//! Data ingestion
//!
//! Reads the raw vehicle pricing file, cleans it, writes a cleaned snapshot and
//! splits it into train/test CSV artifacts. Reruns overwrite earlier outputs.

mod cleaning;
mod split;

pub use cleaning::{
    clean_dataset, drop_duplicates, filter_rare_values, parse_doors, parse_engine_volume,
    parse_levy,
};
pub use split::train_test_split;

use crate::config::IngestionConfig;
use crate::error::{PipelineError, Result, Stage};
use crate::observe::{observe_stage, PipelineObserver, TracingObserver};
use crate::schema::Schema;
use crate::utils::{DataLoader, DataSaver};
use std::path::PathBuf;
use std::sync::Arc;

/// Paths of the artifacts written by one ingestion run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestionArtifacts {
    pub raw_data_path: PathBuf,
    pub train_data_path: PathBuf,
    pub test_data_path: PathBuf,
}

/// Ingestion component
pub struct DataIngestion {
    config: IngestionConfig,
    schema: Schema,
    observer: Arc<dyn PipelineObserver>,
}

impl DataIngestion {
    pub fn new(config: IngestionConfig) -> Self {
        Self {
            config,
            schema: Schema::raw_vehicle(),
            observer: Arc::new(TracingObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &IngestionConfig {
        &self.config
    }

    /// Run read → clean → snapshot → split → write.
    pub fn initiate_data_ingestion(&self) -> Result<IngestionArtifacts> {
        let observer = self.observer.as_ref();
        let config = &self.config;

        let raw = observe_stage(observer, Stage::ReadSource, || {
            let df = DataLoader::new()
                .load_csv(&config.source_path)
                .map_err(|e| {
                    PipelineError::Ingestion(format!(
                        "cannot read source {}: {}",
                        config.source_path.display(),
                        e
                    ))
                })?;
            self.schema.validate(&df)?;
            Ok(df)
        })?;
        observer.event(Stage::ReadSource, &format!("Read {} raw rows", raw.height()));

        let mut cleaned = observe_stage(observer, Stage::Clean, || clean_dataset(&raw, config))?;
        observer.event(Stage::Clean, &format!("{} rows after cleaning", cleaned.height()));

        observe_stage(observer, Stage::WriteArtifacts, || {
            DataSaver::save_csv(&mut cleaned, &config.raw_data_path)
        })?;

        let (mut train, mut test) = observe_stage(observer, Stage::Split, || {
            train_test_split(&cleaned, config.test_size, config.random_state)
        })?;
        observer.event(
            Stage::Split,
            &format!("Split into {} train and {} test rows", train.height(), test.height()),
        );

        observe_stage(observer, Stage::WriteArtifacts, || {
            DataSaver::save_csv(&mut train, &config.train_data_path)?;
            DataSaver::save_csv(&mut test, &config.test_data_path)
        })?;

        Ok(IngestionArtifacts {
            raw_data_path: config.raw_data_path.clone(),
            train_data_path: config.train_data_path.clone(),
            test_data_path: config.test_data_path.clone(),
        })
    }
}
