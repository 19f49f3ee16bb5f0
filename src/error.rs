//! Error types for the vehicle pricing preparation pipeline

use std::fmt;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Pipeline stage in which an error originated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    ReadSource,
    Clean,
    Split,
    WriteArtifacts,
    ReadSplits,
    ValidateSchema,
    BuildPipeline,
    Fit,
    Transform,
    Persist,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::ReadSource => "read_source",
            Stage::Clean => "clean",
            Stage::Split => "split",
            Stage::WriteArtifacts => "write_artifacts",
            Stage::ReadSplits => "read_splits",
            Stage::ValidateSchema => "validate_schema",
            Stage::BuildPipeline => "build_pipeline",
            Stage::Fit => "fit",
            Stage::Transform => "transform",
            Stage::Persist => "persist",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Main error type for the pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Ingestion error: {0}")]
    Ingestion(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    /// `transform` (or persistence) requested before a successful `fit`.
    #[error("Transformer not fitted")]
    NotFitted,

    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("Unknown category '{value}' in column '{column}'")]
    UnknownCategory { column: String, value: String },

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Data error: {0}")]
    Data(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("stage '{stage}' failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: Box<PipelineError>,
    },
}

impl PipelineError {
    /// Attach the stage an error came from. Errors that already carry a
    /// stage keep the innermost one.
    pub fn in_stage(self, stage: Stage) -> Self {
        match self {
            PipelineError::Stage { .. } => self,
            other => PipelineError::Stage {
                stage,
                source: Box::new(other),
            },
        }
    }

    /// The error with any stage wrapper removed
    pub fn root(&self) -> &PipelineError {
        match self {
            PipelineError::Stage { source, .. } => source.root(),
            other => other,
        }
    }

    /// Stage the error was raised in, if it has been attached
    pub fn stage(&self) -> Option<Stage> {
        match self {
            PipelineError::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

/// Extension for tagging results with the stage they belong to
pub trait StageContext<T> {
    fn at_stage(self, stage: Stage) -> Result<T>;
}

impl<T> StageContext<T> for Result<T> {
    fn at_stage(self, stage: Stage) -> Result<T> {
        self.map_err(|e| e.in_stage(stage))
    }
}

impl From<polars::error::PolarsError> for PipelineError {
    fn from(err: polars::error::PolarsError) -> Self {
        PipelineError::Data(err.to_string())
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::Persistence(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PipelineError::Data("test error".to_string());
        assert_eq!(err.to_string(), "Data error: test error");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: PipelineError = io_err.into();
        assert!(matches!(err, PipelineError::Io(_)));
    }

    #[test]
    fn test_stage_wrapping_keeps_innermost() {
        let err = PipelineError::NotFitted
            .in_stage(Stage::Transform)
            .in_stage(Stage::Persist);

        assert_eq!(err.stage(), Some(Stage::Transform));
        assert!(matches!(err.root(), PipelineError::NotFitted));
        assert_eq!(err.to_string(), "stage 'transform' failed: Transformer not fitted");
    }

    #[test]
    fn test_at_stage_on_result() {
        let result: Result<()> = Err(PipelineError::SchemaMismatch("x".into()));
        let err = result.at_stage(Stage::ValidateSchema).unwrap_err();
        assert_eq!(err.stage(), Some(Stage::ValidateSchema));
        assert!(matches!(err.root(), PipelineError::SchemaMismatch(_)));
    }
}
