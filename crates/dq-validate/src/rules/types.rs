use chrono::{NaiveDate, NaiveDateTime};
use dq_common::Dataset;
use dq_model::ValueType;

use crate::error::Result;
use crate::outcome::Finding;

const TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"];

/// A non-null value fails when it cannot be read as the expected type.
pub fn evaluate(dataset: &Dataset, field: &str, expected: ValueType) -> Result<Finding> {
    let failed = dataset
        .texts(field)?
        .iter()
        .map(|cell| cell.as_deref().is_some_and(|value| !parses_as(value.trim(), expected)))
        .collect();
    Ok(Finding::full(failed))
}

pub(crate) fn parses_as(value: &str, expected: ValueType) -> bool {
    match expected {
        ValueType::Integer => value.parse::<i32>().is_ok(),
        ValueType::Long => value.parse::<i64>().is_ok(),
        ValueType::Double | ValueType::Decimal => {
            value.parse::<f64>().is_ok_and(f64::is_finite)
        }
        ValueType::Boolean => matches!(
            value.to_lowercase().as_str(),
            "true" | "false" | "t" | "f" | "y" | "n" | "yes" | "no" | "1" | "0"
        ),
        ValueType::Date => NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok(),
        ValueType::Timestamp => {
            NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
                || TIMESTAMP_FORMATS
                    .iter()
                    .any(|format| NaiveDateTime::parse_from_str(value, format).is_ok())
        }
        ValueType::String => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::column;

    #[test]
    fn integer_check_skips_nulls() {
        let dataset = column("qty", &[Some("12"), Some("1.5"), None, Some("x"), Some(" 7 ")]);
        let finding = evaluate(&dataset, "qty", ValueType::Integer).unwrap();
        assert_eq!(finding.tested_count, 5);
        assert_eq!(finding.failed, vec![false, true, false, true, false]);
    }

    #[test]
    fn parses_common_types() {
        assert!(parses_as("2024-02-29", ValueType::Date));
        assert!(!parses_as("2023-02-29", ValueType::Date));
        assert!(parses_as("2024-01-01 10:00:00", ValueType::Timestamp));
        assert!(parses_as("YES", ValueType::Boolean));
        assert!(!parses_as("inf", ValueType::Double));
        assert!(parses_as("9999999999", ValueType::Long));
        assert!(!parses_as("9999999999", ValueType::Integer));
    }
}
