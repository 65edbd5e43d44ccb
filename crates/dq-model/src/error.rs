use thiserror::Error;

/// Problems found while turning a run configuration into rule specifications.
///
/// These are configuration errors, never data-quality findings: the affected
/// rule instance is skipped and the run continues.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("rule {code}: unknown rule code prefix")]
    UnknownRuleCode { code: String },
    #[error("rule {code}: missing parameter `{parameter}`")]
    MissingParameter { code: String, parameter: String },
    #[error("rule {code}: invalid parameter `{parameter}`: {reason}")]
    InvalidParameter {
        code: String,
        parameter: String,
        reason: String,
    },
    #[error("rule {code}: unrecognized date format `{format}`")]
    UnknownDateFormat { code: String, format: String },
    #[error("rule {code}: {kind} cannot be used as a conditional quality function")]
    UnsupportedInnerRule { code: String, kind: String },
    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    pub(crate) fn missing(code: &str, parameter: &str) -> Self {
        Self::MissingParameter {
            code: code.to_string(),
            parameter: parameter.to_string(),
        }
    }

    pub(crate) fn invalid(code: &str, parameter: &str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            code: code.to_string(),
            parameter: parameter.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
