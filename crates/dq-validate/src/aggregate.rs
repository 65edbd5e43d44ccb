//! Folding rule outcomes into the result and error tables.

use dq_common::{Dataset, DatasetError};
use polars::prelude::{Column, DataFrame};

use crate::error::Result;
use crate::outcome::RuleOutcome;

pub const ERROR_COLUMN: &str = "error";
pub const RUN_TIME_COLUMN: &str = "run_time";

/// Outcomes in configuration order plus the union of violating rows.
#[derive(Debug, Clone)]
pub struct Aggregate {
    pub results: Vec<RuleOutcome>,
    /// Subject columns followed by `error` and `run_time`.
    pub errors: DataFrame,
}

/// Append every outcome and union the violating rows of those that asked
/// for them. With nothing to union the error table is empty but keeps the
/// full schema.
pub fn aggregate(outcomes: Vec<RuleOutcome>, subject: &Dataset, run_time: &str) -> Result<Aggregate> {
    let mut errors = tag(&subject.frame().clear(), "", run_time)?;
    for outcome in &outcomes {
        let Some(rows) = outcome.violating_rows.as_ref() else {
            continue;
        };
        if !outcome.write_violations || outcome.failed_count == 0 {
            continue;
        }
        let tagged = tag(rows.frame(), &outcome.data_requirement, run_time)?;
        errors.vstack_mut(&tagged).map_err(DatasetError::from)?;
    }
    Ok(Aggregate {
        results: outcomes,
        errors,
    })
}

/// Append the `error` and `run_time` columns to a row set.
fn tag(rows: &DataFrame, requirement: &str, run_time: &str) -> Result<DataFrame> {
    let height = rows.height();
    let mut tagged = rows.clone();
    tagged
        .with_column(Column::new(ERROR_COLUMN.into(), vec![requirement; height]))
        .map_err(DatasetError::from)?;
    tagged
        .with_column(Column::new(RUN_TIME_COLUMN.into(), vec![run_time; height]))
        .map_err(DatasetError::from)?;
    Ok(tagged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::frame;
    use dq_model::RuleKind;
    use polars::prelude::DataType;

    fn outcome(requirement: &str, rows: Option<Dataset>, write: bool) -> RuleOutcome {
        let failed = rows.as_ref().map_or(0, Dataset::row_count);
        RuleOutcome {
            config_code: "101".to_string(),
            kind: RuleKind::NullCheck,
            tested_field_label: "name".to_string(),
            function_code: "101".to_string(),
            rule_code: "101/CLIENTS/name".to_string(),
            data_requirement: requirement.to_string(),
            threshold_percent: 100.0,
            rule_group: "Nulos".to_string(),
            rule_property: "Completitud".to_string(),
            tested_count: 3,
            failed_count: failed,
            write_violations: write,
            violating_rows: rows,
        }
    }

    fn subject() -> Dataset {
        frame(&[("id", [Some("1"), Some("2"), Some("3")]), ("name", [Some("a"), None, None])])
    }

    #[test]
    fn empty_error_table_keeps_schema() {
        let aggregate = aggregate(vec![outcome("Nulos - name", None, true)], &subject(), "2024-01-01 00:00:00").unwrap();
        assert_eq!(aggregate.results.len(), 1);
        assert_eq!(aggregate.errors.height(), 0);
        let names: Vec<String> = aggregate
            .errors
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();
        assert_eq!(names, ["id", "name", "error", "run_time"]);
        let run_time = aggregate.errors.column(RUN_TIME_COLUMN).unwrap();
        assert_eq!(run_time.dtype(), &DataType::String);
    }

    #[test]
    fn unions_violations_with_their_requirement() {
        let subject = subject();
        let rows = subject.filter(&[false, true, true]).unwrap();
        let skipped = subject.filter(&[true, false, false]).unwrap();
        let aggregate = aggregate(
            vec![
                outcome("Nulos - name", Some(rows), true),
                outcome("Nulos - id", Some(skipped), false),
            ],
            &subject,
            "2024-01-01 00:00:00",
        )
        .unwrap();
        assert_eq!(aggregate.results.len(), 2);
        assert_eq!(aggregate.errors.height(), 2);
        let errors = Dataset::new(aggregate.errors);
        assert_eq!(
            errors.texts(ERROR_COLUMN).unwrap(),
            vec![Some("Nulos - name".to_string()); 2]
        );
        assert_eq!(
            errors.texts(RUN_TIME_COLUMN).unwrap(),
            vec![Some("2024-01-01 00:00:00".to_string()); 2]
        );
    }
}
