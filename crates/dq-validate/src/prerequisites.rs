//! Hard gate run before any other rule.

use dq_common::Dataset;
use dq_model::{RuleKind, RuleSpec};
use tracing::{info, warn};

use crate::outcome::RuleOutcome;

pub const EMPTY_DATASET_MESSAGE: &str = "DataFrame no contiene registros";
const MISSING_FIELDS_MESSAGE: &str = "Error en esquema de la tabla, revisar los siguientes campos";
/// Fixed threshold reported for prerequisite failures.
pub const PREREQUISITES_THRESHOLD: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate {
    Satisfied,
    Missing(String),
}

impl Gate {
    pub fn is_satisfied(&self) -> bool {
        matches!(self, Gate::Satisfied)
    }
}

/// Check that every required field exists and the dataset has rows.
///
/// Missing fields are reported before an empty dataset.
pub fn check(dataset: &Dataset, required: &[String]) -> Gate {
    let missing: Vec<&str> = required
        .iter()
        .map(String::as_str)
        .filter(|field| !dataset.has_column(field))
        .collect();
    if !missing.is_empty() {
        warn!(fields = %missing.join(","), "prerequisite columns missing");
        return Gate::Missing(format!("{MISSING_FIELDS_MESSAGE}: {}", missing.join(",")));
    }
    if dataset.row_count() == 0 {
        warn!("subject dataset has no rows");
        return Gate::Missing(EMPTY_DATASET_MESSAGE.to_string());
    }
    info!(fields = required.len(), rows = dataset.row_count(), "prerequisites satisfied");
    Gate::Satisfied
}

/// Build the single failure record reported when the gate fails.
pub fn failure_outcome(
    spec: &RuleSpec,
    required: &[String],
    message: &str,
    row_count: usize,
    entity: &str,
) -> RuleOutcome {
    let kind = RuleKind::Prerequisites;
    let label = required.join(",");
    RuleOutcome {
        config_code: spec.code.clone(),
        kind,
        rule_code: format!("{}/{}/{}", kind.code(), entity, label),
        tested_field_label: label,
        function_code: kind.code().to_string(),
        data_requirement: message.to_string(),
        threshold_percent: PREREQUISITES_THRESHOLD,
        rule_group: kind.group().to_string(),
        rule_property: kind.property().to_string(),
        tested_count: row_count,
        failed_count: row_count,
        write_violations: false,
        violating_rows: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    fn dataset(rows: usize) -> Dataset {
        let ids: Vec<String> = (0..rows).map(|idx| idx.to_string()).collect();
        Dataset::new(DataFrame::new(vec![Column::new("id".into(), ids)]).unwrap())
    }

    #[test]
    fn missing_column_names_the_field() {
        let gate = check(&dataset(2), &["id".to_string(), "email".to_string()]);
        assert_eq!(
            gate,
            Gate::Missing(
                "Error en esquema de la tabla, revisar los siguientes campos: email".to_string()
            )
        );
    }

    #[test]
    fn empty_dataset_fails_the_gate() {
        let gate = check(&dataset(0), &["id".to_string()]);
        assert_eq!(gate, Gate::Missing(EMPTY_DATASET_MESSAGE.to_string()));
    }

    #[test]
    fn present_columns_pass() {
        assert!(check(&dataset(1), &["id".to_string()]).is_satisfied());
    }
}
