use polars::error::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("column not found: {name}")]
    MissingColumn { name: String },
    #[error("row mask has {found} entries but the dataset has {expected} rows")]
    MaskLength { expected: usize, found: usize },
    #[error("join keys differ in arity: {left} local vs {right} reference")]
    KeyArity { left: usize, right: usize },
    #[error("polars error: {0}")]
    Polars(#[from] PolarsError),
}

pub type Result<T> = std::result::Result<T, DatasetError>;
