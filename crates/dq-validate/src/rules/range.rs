use dq_common::Dataset;
use dq_model::{RangeBounds, RangeLimit};

use crate::error::Result;
use crate::outcome::Finding;

/// A numeric row fails when it violates the bounds. Nulls and non-numeric
/// values pass.
pub fn evaluate(dataset: &Dataset, field: &str, bounds: &RangeBounds) -> Result<Finding> {
    let values = dataset.numbers(field)?;
    Ok(Finding::full(violations(dataset, &values, bounds)?))
}

/// Apply bounds to precomputed per-row values.
pub(crate) fn violations(
    dataset: &Dataset,
    values: &[Option<f64>],
    bounds: &RangeBounds,
) -> Result<Vec<bool>> {
    let min = limit_values(dataset, bounds.min.as_ref())?;
    let max = limit_values(dataset, bounds.max.as_ref())?;
    Ok(values
        .iter()
        .enumerate()
        .map(|(idx, value)| value.is_some_and(|value| bounds.violates(value, min[idx], max[idx])))
        .collect())
}

/// Per-row limit values; a column limit is read row by row.
fn limit_values(dataset: &Dataset, limit: Option<&RangeLimit>) -> Result<Vec<Option<f64>>> {
    let rows = dataset.row_count();
    Ok(match limit {
        None => vec![None; rows],
        Some(RangeLimit::Number(value)) => vec![Some(*value); rows],
        Some(RangeLimit::Column(name)) => dataset.numbers(name)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::{column, frame};

    fn bounds(min: Option<RangeLimit>, max: Option<RangeLimit>) -> RangeBounds {
        RangeBounds {
            min,
            max,
            ..RangeBounds::default()
        }
    }

    #[test]
    fn age_between_zero_and_one_twenty() {
        let dataset = column("age", &[Some("-1"), Some("30"), Some("150"), Some("40")]);
        let finding = evaluate(
            &dataset,
            "age",
            &bounds(Some(RangeLimit::Number(0.0)), Some(RangeLimit::Number(120.0))),
        )
        .unwrap();
        assert_eq!(finding.tested_count, 4);
        assert_eq!(finding.failed_count(), 2);
    }

    #[test]
    fn limits_may_name_columns() {
        let dataset = frame(&[
            ("paid", [Some("10"), Some("50"), Some("5")]),
            ("owed", [Some("20"), Some("40"), None]),
        ]);
        let finding = evaluate(
            &dataset,
            "paid",
            &bounds(None, Some(RangeLimit::Column("owed".to_string()))),
        )
        .unwrap();
        assert_eq!(finding.failed, vec![false, true, false]);
    }

    #[test]
    fn non_numeric_values_pass() {
        let dataset = column("age", &[Some("abc"), None]);
        let finding = evaluate(
            &dataset,
            "age",
            &bounds(Some(RangeLimit::Number(0.0)), None),
        )
        .unwrap();
        assert_eq!(finding.failed_count(), 0);
    }
}
