use serde::{Deserialize, Serialize};

/// Version stamped into every report row.
pub const LIBRARY_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Identifying metadata for the audited dataset.
///
/// Mirrors the `input` block of the run configuration. Values are kept as
/// configured; the report builder upper-cases them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunMetadata {
    pub country: String,
    pub project: String,
    pub entity: String,
    pub domain: String,
    pub sub_domain: String,
    pub segment: String,
    pub area: String,
    /// Business date of the data being audited.
    pub data_date: String,
}

impl RunMetadata {
    /// Upper-cased entity used inside rule codes.
    pub fn entity_code(&self) -> String {
        self.entity.to_uppercase()
    }
}
