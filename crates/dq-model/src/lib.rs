pub mod config;
pub mod date_format;
pub mod diagnostic;
pub mod error;
pub mod kind;
pub mod metadata;
pub mod spec;

pub use config::{AuditConfig, DataConfig, InputConfig, RuleSet, SinkConfig, parse_filter, parse_rules};
pub use date_format::{DateFormat, DatePrecision};
pub use diagnostic::Diagnostic;
pub use error::{ConfigError, Result};
pub use kind::RuleKind;
pub use metadata::{LIBRARY_VERSION, RunMetadata};
pub use spec::{
    Comparison, Condition, DiffUnit, FilterSign, RangeBounds, RangeLimit, ReferenceSource,
    RowFilter, RuleParams, RuleSpec, StorageType, TargetFields, TrendMethod, ValueType, WILDCARD,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_display_names_the_rule() {
        let diagnostic = Diagnostic::new("104", "unrecognized date format `YYYY`");
        assert_eq!(diagnostic.to_string(), "[104] unrecognized date format `YYYY`");
    }

    #[test]
    fn spec_serializes() {
        let spec = RuleSpec {
            code: "101".to_string(),
            kind: RuleKind::NullCheck,
            target: TargetFields::Columns(vec!["id".to_string()]),
            threshold_percent: 100.0,
            write_violations: true,
            params: RuleParams::Fields,
        };
        let json = serde_json::to_string(&spec).expect("serialize spec");
        let round: RuleSpec = serde_json::from_str(&json).expect("deserialize spec");
        assert_eq!(round, spec);
    }
}
