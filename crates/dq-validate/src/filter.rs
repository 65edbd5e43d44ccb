//! Row filters for conditional rules and the global filter.

use dq_common::{Dataset, parse_f64};
use dq_model::{Condition, FilterSign, RowFilter};

use crate::error::Result;

/// Evaluate filters into a row mask. An empty filter list keeps every row.
///
/// Null cells never satisfy a value or comparison filter.
pub fn mask(dataset: &Dataset, condition: Condition, filters: &[RowFilter]) -> Result<Vec<bool>> {
    let rows = dataset.row_count();
    let filters = match condition {
        Condition::No => &filters[..filters.len().min(1)],
        Condition::And | Condition::Or => filters,
    };
    if filters.is_empty() {
        return Ok(vec![true; rows]);
    }

    let masks = filters
        .iter()
        .map(|filter| filter_mask(dataset, filter))
        .collect::<Result<Vec<_>>>()?;

    Ok((0..rows)
        .map(|idx| match condition {
            Condition::Or => masks.iter().any(|mask| mask[idx]),
            Condition::No | Condition::And => masks.iter().all(|mask| mask[idx]),
        })
        .collect())
}

/// Apply filters, returning the kept rows.
pub fn apply(dataset: &Dataset, condition: Condition, filters: &[RowFilter]) -> Result<Dataset> {
    let keep = mask(dataset, condition, filters)?;
    Ok(dataset.filter(&keep)?)
}

fn filter_mask(dataset: &Dataset, filter: &RowFilter) -> Result<Vec<bool>> {
    let mask = match &filter.sign {
        FilterSign::In(values) => dataset
            .texts(&filter.column)?
            .iter()
            .map(|cell| cell.as_deref().is_some_and(|cell| matches_any(cell, values)))
            .collect(),
        FilterSign::NotIn(values) => dataset
            .texts(&filter.column)?
            .iter()
            .map(|cell| cell.as_deref().is_some_and(|cell| !matches_any(cell, values)))
            .collect(),
        FilterSign::IsNull => dataset
            .texts(&filter.column)?
            .iter()
            .map(Option::is_none)
            .collect(),
        FilterSign::IsNotNull => dataset
            .texts(&filter.column)?
            .iter()
            .map(Option::is_some)
            .collect(),
        FilterSign::Compare(op, literal) => dataset
            .numbers(&filter.column)?
            .iter()
            .map(|value| value.is_some_and(|value| op.holds(value, *literal)))
            .collect(),
    };
    Ok(mask)
}

/// Text equality, or numeric equality when both sides parse.
fn matches_any(cell: &str, values: &[String]) -> bool {
    let number = parse_f64(cell);
    values.iter().any(|value| {
        value == cell
            || number
                .zip(parse_f64(value))
                .is_some_and(|(left, right)| left == right)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dq_model::Comparison;
    use polars::prelude::*;

    fn people() -> Dataset {
        Dataset::new(
            DataFrame::new(vec![
                Column::new("status".into(), vec![Some("A"), Some("B"), None, Some("A")]),
                Column::new("age".into(), vec![Some("17"), Some("30"), Some("45"), None]),
            ])
            .unwrap(),
        )
    }

    fn filter(column: &str, sign: FilterSign) -> RowFilter {
        RowFilter {
            column: column.to_string(),
            sign,
        }
    }

    #[test]
    fn no_condition_uses_first_filter_only() {
        let filters = [
            filter("status", FilterSign::In(vec!["A".to_string()])),
            filter("age", FilterSign::IsNotNull),
        ];
        let mask = mask(&people(), Condition::No, &filters).unwrap();
        assert_eq!(mask, vec![true, false, false, true]);
    }

    #[test]
    fn and_or_combine_filters() {
        let filters = [
            filter("status", FilterSign::NotIn(vec!["B".to_string()])),
            filter("age", FilterSign::Compare(Comparison::Gt, 18.0)),
        ];
        assert_eq!(
            mask(&people(), Condition::And, &filters).unwrap(),
            vec![false, false, false, false]
        );
        assert_eq!(
            mask(&people(), Condition::Or, &filters).unwrap(),
            vec![true, true, true, true]
        );
    }

    #[test]
    fn null_filters() {
        let filters = [filter("status", FilterSign::IsNull)];
        assert_eq!(
            mask(&people(), Condition::And, &filters).unwrap(),
            vec![false, false, true, false]
        );
    }

    #[test]
    fn numeric_membership_ignores_formatting() {
        let filters = [filter("age", FilterSign::In(vec!["30.0".to_string()]))];
        assert_eq!(
            mask(&people(), Condition::And, &filters).unwrap(),
            vec![false, true, false, false]
        );
    }
}
