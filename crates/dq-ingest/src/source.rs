//! Loading subject and reference datasets from local files.

use std::fs::File;
use std::path::{Path, PathBuf};

use dq_common::Dataset;
use dq_model::ReferenceSource;
use polars::prelude::{ParquetReader, SerReader};
use tracing::{debug, info};

use crate::csv_table::{CsvOptions, read_csv_table};
use crate::error::{IngestError, Result};

/// Supported on-disk formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Parquet,
}

impl SourceFormat {
    /// Resolve a configured type name. Unset types are inferred from the
    /// file extension, defaulting to CSV.
    pub fn resolve(format: Option<&str>, path: &Path) -> Result<Self> {
        match format.map(|value| value.trim().to_lowercase()) {
            None => Ok(match path.extension().and_then(|ext| ext.to_str()) {
                Some(ext) if ext.eq_ignore_ascii_case("parquet") => SourceFormat::Parquet,
                _ => SourceFormat::Csv,
            }),
            Some(name) if name.is_empty() || name.ends_with("csv") => Ok(SourceFormat::Csv),
            Some(name) if name.ends_with("parquet") => Ok(SourceFormat::Parquet),
            Some(name) => Err(IngestError::UnsupportedFormat { format: name }),
        }
    }
}

/// Resolves the datasets named by referential and email rules.
///
/// The engine calls this once per distinct reference before evaluation.
pub trait ReferenceResolver: Sync {
    fn resolve(&self, source: &ReferenceSource) -> Result<Dataset>;
}

/// Reads datasets from the local filesystem.
///
/// Relative paths are joined onto `base_dir` when one is set.
#[derive(Debug, Clone, Default)]
pub struct FileResolver {
    base_dir: Option<PathBuf>,
}

impl FileResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }

    fn locate(&self, path: &str) -> PathBuf {
        let path = PathBuf::from(path);
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path,
        }
    }
}

impl ReferenceResolver for FileResolver {
    fn resolve(&self, source: &ReferenceSource) -> Result<Dataset> {
        let path = source
            .path
            .as_deref()
            .ok_or_else(|| IngestError::MissingPath {
                name: source.display_name(),
            })?;
        let path = self.locate(path);
        let format = SourceFormat::resolve(source.format.as_deref(), &path)?;
        let options = CsvOptions::from_config(source.delimiter.as_deref(), source.header)?;
        load_dataset(&path, format, options)
    }
}

/// Load one dataset from disk.
pub fn load_dataset(path: &Path, format: SourceFormat, options: CsvOptions) -> Result<Dataset> {
    info!(path = %path.display(), ?format, "loading dataset");
    let frame = match format {
        SourceFormat::Csv => read_csv_table(path, options)?.into_frame()?,
        SourceFormat::Parquet => {
            let file = File::open(path).map_err(|source| IngestError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            ParquetReader::new(file).finish()?
        }
    };
    debug!(rows = frame.height(), columns = frame.width(), "dataset loaded");
    Ok(Dataset::new(frame))
}
