//! Vehicle pricing preparation
//!
//! Prepares the vehicle pricing dataset for modeling:
//! - [`ingestion`] - clean the raw table and split it into train/test artifacts
//! - [`preprocessing`] - column groups and the fit/transform column transformer
//! - [`transformation`] - fit on train, transform both splits, persist the fit
//!
//! Supporting modules:
//! - [`schema`] - explicit table schemas
//! - [`config`] - static pipeline configuration
//! - [`observe`] - injected stage observers
//! - [`error`] - error taxonomy

pub mod error;

pub mod config;
pub mod schema;
pub mod observe;
pub mod utils;

pub mod ingestion;
pub mod preprocessing;
pub mod transformation;

pub use error::{PipelineError, Result, Stage};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{PipelineError, Result, Stage, StageContext};

    pub use crate::config::{IngestionConfig, TransformationConfig};
    pub use crate::schema::{ColumnRole, ColumnSpec, Schema};
    pub use crate::observe::{PipelineObserver, RecordingObserver, TracingObserver};

    pub use crate::ingestion::{DataIngestion, IngestionArtifacts};
    pub use crate::preprocessing::{
        vehicle_pipeline, ColumnGroup, ColumnTransformer, FittedState, GroupKind, PipelineBuilder,
        UnknownCategoryPolicy,
    };
    pub use crate::transformation::{DataTransformation, TransformationOutput};
}
