use std::path::PathBuf;

use dq_common::DatasetError;
use polars::error::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("no path configured for {name}")]
    MissingPath { name: String },
    #[error("unsupported source type `{format}`")]
    UnsupportedFormat { format: String },
    #[error("invalid delimiter `{delimiter}`: expected a single byte")]
    InvalidDelimiter { delimiter: String },
    #[error("read csv {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("polars error: {0}")]
    Polars(#[from] PolarsError),
    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

pub type Result<T> = std::result::Result<T, IngestError>;
