use dq_common::Dataset;
use dq_model::RuleKind;

/// Result of one evaluator invocation.
///
/// Rates are derived from the counts on demand and never stored.
#[derive(Debug, Clone)]
pub struct RuleOutcome {
    /// Configured rule code this outcome came from.
    pub config_code: String,
    pub kind: RuleKind,
    pub tested_field_label: String,
    pub function_code: String,
    pub rule_code: String,
    pub data_requirement: String,
    pub threshold_percent: f64,
    pub rule_group: String,
    pub rule_property: String,
    pub tested_count: usize,
    pub failed_count: usize,
    pub write_violations: bool,
    /// Failing rows with every original column, kept only when
    /// `write_violations` is set and something failed.
    pub violating_rows: Option<Dataset>,
}

impl RuleOutcome {
    pub fn passed_count(&self) -> usize {
        self.tested_count - self.failed_count
    }

    /// Percentage of tested rows that passed; 100 when nothing was tested.
    pub fn success_rate(&self) -> f64 {
        success_rate(self.tested_count, self.failed_count)
    }

    pub fn fail_rate(&self) -> f64 {
        100.0 - self.success_rate()
    }
}

pub fn success_rate(tested: usize, failed: usize) -> f64 {
    if tested == 0 {
        100.0
    } else {
        (tested - failed) as f64 / tested as f64 * 100.0
    }
}

/// Row-level verdict produced by an evaluator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    /// Rows eligible for the check.
    pub tested_count: usize,
    /// One entry per dataset row; `true` marks a violating row.
    pub failed: Vec<bool>,
}

impl Finding {
    /// Every row is tested.
    pub fn full(failed: Vec<bool>) -> Self {
        Self {
            tested_count: failed.len(),
            failed,
        }
    }

    /// Only rows where `eligible` holds are tested; others never fail.
    pub fn over(eligible: &[bool], failed: Vec<bool>) -> Self {
        let failed: Vec<bool> = failed
            .into_iter()
            .zip(eligible)
            .map(|(failed, eligible)| failed && *eligible)
            .collect();
        Self {
            tested_count: eligible.iter().filter(|eligible| **eligible).count(),
            failed,
        }
    }

    pub fn failed_count(&self) -> usize {
        self.failed.iter().filter(|failed| **failed).count()
    }
}
