use dq_common::DatasetError;
use thiserror::Error;

/// Why a rule instance could not be evaluated.
///
/// Evaluation errors skip the instance and surface as diagnostics; they are
/// never counted as data-quality failures.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error("reference dataset {name} is unavailable: {reason}")]
    ReferenceUnavailable { name: String, reason: String },
    #[error("invalid literal date `{value}` for format {format}")]
    InvalidReferenceDate { value: String, format: String },
    #[error("invalid expression `{expression}`: {reason}")]
    InvalidExpression { expression: String, reason: String },
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, EvalError>;
