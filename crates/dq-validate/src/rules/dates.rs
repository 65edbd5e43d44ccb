//! Date format and date-difference rules.

use chrono::{NaiveDate, NaiveDateTime};
use dq_common::Dataset;
use dq_model::{DateFormat, DatePrecision, DiffUnit, RangeBounds};

use crate::error::{EvalError, Result};
use crate::outcome::Finding;
use crate::rules::range;

/// Parse a value with an allow-listed format, keeping the calendar date.
pub(crate) fn parse_date(value: &str, format: &DateFormat) -> Option<NaiveDate> {
    let value = value.trim();
    match format.precision {
        DatePrecision::Second => NaiveDateTime::parse_from_str(value, format.chrono)
            .ok()
            .map(|timestamp| timestamp.date()),
        DatePrecision::Month => {
            NaiveDate::parse_from_str(&format!("{value}{}", format.day_suffix), format.chrono).ok()
        }
        DatePrecision::Day => NaiveDate::parse_from_str(value, format.chrono).ok(),
    }
}

/// Non-null values must parse with the format. Nulls are not tested.
pub fn evaluate_format(dataset: &Dataset, field: &str, format: &DateFormat) -> Result<Finding> {
    let values = dataset.texts(field)?;
    let eligible: Vec<bool> = values.iter().map(Option::is_some).collect();
    let failed = values
        .iter()
        .map(|cell| {
            cell.as_deref()
                .is_some_and(|value| parse_date(value, format).is_none())
        })
        .collect();
    Ok(Finding::over(&eligible, failed))
}

/// Parameters of a date-difference check.
#[derive(Debug, Clone, Copy)]
pub struct TimeRange<'a> {
    /// Column name, `hoy`/`today`, or a literal date in `format`.
    pub reference: &'a str,
    pub format: &'a DateFormat,
    pub unit: DiffUnit,
    pub bounds: &'a RangeBounds,
    pub run_date: NaiveDate,
}

impl TimeRange<'_> {
    fn reference_dates(&self, dataset: &Dataset) -> Result<Vec<Option<NaiveDate>>> {
        let rows = dataset.row_count();
        if dataset.has_column(self.reference) {
            return Ok(dataset
                .texts(self.reference)?
                .iter()
                .map(|cell| cell.as_deref().and_then(|value| parse_date(value, self.format)))
                .collect());
        }
        let fixed = if self.reference.eq_ignore_ascii_case("hoy")
            || self.reference.eq_ignore_ascii_case("today")
        {
            self.run_date
        } else {
            parse_date(self.reference, self.format).ok_or_else(|| {
                EvalError::InvalidReferenceDate {
                    value: self.reference.to_string(),
                    format: self.format.pattern.to_string(),
                }
            })?
        };
        Ok(vec![Some(fixed); rows])
    }
}

/// The difference `reference - field`, in the configured unit, must lie
/// within the bounds. Rows whose dates do not parse are not flagged.
pub fn evaluate_time_range(dataset: &Dataset, field: &str, spec: &TimeRange<'_>) -> Result<Finding> {
    let references = spec.reference_dates(dataset)?;
    let diffs: Vec<Option<f64>> = dataset
        .texts(field)?
        .iter()
        .zip(&references)
        .map(|(cell, reference)| {
            let date = cell.as_deref().and_then(|value| parse_date(value, spec.format))?;
            let days = (*reference)?.signed_duration_since(date).num_days();
            Some(spec.unit.from_days(days))
        })
        .collect();
    Ok(Finding::full(range::violations(dataset, &diffs, spec.bounds)?))
}
