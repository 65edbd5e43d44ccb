use dq_common::Dataset;
use dq_model::{Condition, RowFilter, RuleSpec};

use crate::error::Result;
use crate::filter;
use crate::outcome::Finding;
use crate::plan::RuleInstance;
use crate::rules::{EvalContext, evaluate as evaluate_rule};

/// Run the inner rule on the rows selected by the filters.
///
/// Only selected rows are tested; failures are mapped back to their
/// position in the full dataset. An empty selection tests nothing.
pub fn evaluate(
    dataset: &Dataset,
    fields: &[String],
    condition: Condition,
    filters: &[RowFilter],
    inner: &RuleSpec,
    ctx: &EvalContext,
) -> Result<Finding> {
    let selected = filter::mask(dataset, condition, filters)?;
    let subset = dataset.filter(&selected)?;
    let inner_instance = RuleInstance {
        spec: inner,
        fields,
    };
    let finding = evaluate_rule(&inner_instance, &subset, ctx)?;

    let mut inner_failed = finding.failed.into_iter();
    let failed = selected
        .iter()
        .map(|selected| *selected && inner_failed.next().unwrap_or(false))
        .collect();
    Ok(Finding {
        tested_count: finding.tested_count,
        failed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::frame;
    use chrono::NaiveDate;
    use dq_model::{FilterSign, RuleKind, RuleParams, TargetFields};

    fn null_check(field: &str) -> RuleSpec {
        RuleSpec {
            code: "101".to_string(),
            kind: RuleKind::NullCheck,
            target: TargetFields::from_list(vec![field.to_string()]),
            threshold_percent: 100.0,
            write_violations: true,
            params: RuleParams::Fields,
        }
    }

    fn ctx() -> EvalContext {
        EvalContext::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
    }

    #[test]
    fn inner_rule_sees_only_selected_rows() {
        let dataset = frame(&[
            ("status", [Some("ACTIVE"), Some("CLOSED"), Some("ACTIVE"), Some("CLOSED")]),
            ("email", [None, None, Some("a@b.pe"), Some("c@d.pe")]),
        ]);
        let filters = vec![RowFilter {
            column: "status".to_string(),
            sign: FilterSign::In(vec!["ACTIVE".to_string()]),
        }];
        let fields = vec!["email".to_string()];
        let finding = evaluate(
            &dataset,
            &fields,
            Condition::No,
            &filters,
            &null_check("email"),
            &ctx(),
        )
        .unwrap();
        assert_eq!(finding.tested_count, 2);
        assert_eq!(finding.failed, vec![true, false, false, false]);
    }

    #[test]
    fn empty_selection_tests_nothing() {
        let dataset = frame(&[("status", [Some("CLOSED")]), ("email", [None])]);
        let filters = vec![RowFilter {
            column: "status".to_string(),
            sign: FilterSign::In(vec!["ACTIVE".to_string()]),
        }];
        let fields = vec!["email".to_string()];
        let finding = evaluate(
            &dataset,
            &fields,
            Condition::And,
            &filters,
            &null_check("email"),
            &ctx(),
        )
        .unwrap();
        assert_eq!(finding.tested_count, 0);
        assert_eq!(finding.failed, vec![false]);
    }
}
