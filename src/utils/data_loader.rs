//! CSV loading and saving

use crate::error::{PipelineError, Result};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

/// Loader for header-row CSV tables
#[derive(Debug, Clone, Default)]
pub struct DataLoader;

impl DataLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load a CSV file with a header row. Column types are inferred from the
    /// whole file.
    pub fn load_csv(&self, path: &Path) -> Result<DataFrame> {
        let file = File::open(path)?;

        CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(None)
            .into_reader_with_file_handle(file)
            .finish()
            .map_err(|e| PipelineError::Data(format!("{}: {}", path.display(), e)))
    }
}

/// Writer for CSV artifacts
pub struct DataSaver;

impl DataSaver {
    /// Write `df` with a header row, replacing any existing file and creating
    /// missing parent directories.
    pub fn save_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = File::create(path)?;

        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(df)
            .map_err(|e| PipelineError::Data(format!("{}: {}", path.display(), e)))
    }
}
