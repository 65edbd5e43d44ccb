//! Tests for dq-model configuration and rule types.

use dq_model::{
    AuditConfig, ConfigError, DateFormat, RangeBounds, RangeLimit, RuleKind, RuleParams,
    TargetFields,
};
use proptest::prelude::*;

const CONFIG: &str = r#"{
    "input": {
        "country": "pe",
        "project": "retail",
        "entity": "customers",
        "domain": "sales",
        "sub_domain": "stores",
        "segment": "b2c",
        "area": "audit",
        "data_date": "2024-05-31",
        "path": "customers.csv",
        "delimiter": ";",
        "header": "TRUE",
        "valid_data": "TRUE"
    },
    "data": {"fields": ["id"], "path": "clean.csv"},
    "filter": [["status", "!=", "deleted"]],
    "rules": {
        "100": {"fields": ["id", "email"]},
        "101": {"fields": ["*"], "threshold": 99.5},
        "102": {"fields": ["id"], "write": false},
        "104": {"fields": ["created"], "format_date": "yyyy-MM-dd"},
        "104_bad": {"fields": ["created"], "format_date": "dd.MM.yy"},
        "114": {"fields": ["*"], "output": {"path": "stats.csv"}}
    }
}"#;

#[test]
fn loads_full_configuration() {
    let config = AuditConfig::from_json(CONFIG).expect("parse config");
    assert_eq!(config.input.header, Some(true));
    assert!(config.wants_clean_data());
    assert_eq!(config.metadata().data_date, "2024-05-31");

    let (filters, diagnostics) = config.global_filters();
    assert_eq!(filters.len(), 1);
    assert!(diagnostics.is_empty());

    let set = config.rule_set();
    let kinds: Vec<RuleKind> = set.specs.iter().map(|spec| spec.kind).collect();
    assert_eq!(
        kinds,
        [
            RuleKind::Prerequisites,
            RuleKind::NullCheck,
            RuleKind::DuplicateCheck,
            RuleKind::DateFormatCheck,
            RuleKind::StatisticsSummary,
        ]
    );
    assert_eq!(set.diagnostics.len(), 1);
    assert_eq!(set.diagnostics[0].code, "104_bad");

    let prerequisites = set.prerequisites().expect("prerequisites rule");
    assert_eq!(
        prerequisites.target,
        TargetFields::Columns(vec!["id".to_string(), "email".to_string()])
    );
    assert!(set.specs[1].target.is_wildcard());
    assert!(!set.specs[2].write_violations);
    assert_eq!(
        set.specs[4].params,
        RuleParams::Statistics {
            output: Some("stats.csv".to_string())
        }
    );
}

#[test]
fn malformed_json_is_reported() {
    let err = AuditConfig::from_json("{ not json").unwrap_err();
    assert!(matches!(err, ConfigError::Json(_)));
}

#[test]
fn date_format_serializes_as_pattern() {
    let format = DateFormat::lookup("dd/MM/yyyy").expect("allowed");
    let json = serde_json::to_string(&format).expect("serialize");
    assert_eq!(json, "\"dd/MM/yyyy\"");
    let round: DateFormat = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(round, format);
    assert!(serde_json::from_str::<DateFormat>("\"yy\"").is_err());
}

proptest! {
    #[test]
    fn code_suffix_never_changes_kind(index in 0usize..20, suffix in "[_a-zA-Z0-9-]{0,8}") {
        let kind = RuleKind::all().nth(index).expect("twenty kinds");
        let code = format!("{}{}", kind.code(), suffix);
        prop_assert_eq!(RuleKind::from_code(&code), Some(kind));
    }

    #[test]
    fn exclusion_band_complements_inclusive_range(
        low in -1000.0f64..1000.0,
        width in 0.0f64..500.0,
        value in -2000.0f64..2000.0,
    ) {
        let high = low + width;
        let inclusive = RangeBounds {
            min: Some(RangeLimit::Number(low)),
            max: Some(RangeLimit::Number(high)),
            ..RangeBounds::default()
        };
        let exclusion = RangeBounds { inclusive: false, ..inclusive.clone() };
        prop_assert_ne!(
            inclusive.violates(value, Some(low), Some(high)),
            exclusion.violates(value, Some(low), Some(high))
        );
    }
}
