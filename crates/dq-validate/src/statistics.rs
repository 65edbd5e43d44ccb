//! Column profiling for the statistics rule.

use std::collections::HashMap;

use dq_common::{Dataset, format_numeric};
use polars::prelude::{Column, DataFrame};
use tracing::debug;

use crate::error::Result;
use crate::rules::trend::mean_and_stddev;

pub const FIELD_COLUMN: &str = "CAMPOS";
pub const MEAN_COLUMN: &str = "MEDIA";
pub const STDDEV_COLUMN: &str = "DESVIACION ESTANDAR";
pub const MIN_COLUMN: &str = "MIN";
pub const MAX_COLUMN: &str = "MAX";
pub const MODE_COLUMN: &str = "MODA";

/// Percentile columns and their quantiles.
const PERCENTILES: &[(&str, f64)] = &[
    ("P1", 0.01),
    ("P5", 0.05),
    ("P10", 0.10),
    ("P25", 0.25),
    ("MEDIANA", 0.50),
    ("P75", 0.75),
    ("P90", 0.90),
    ("P95", 0.95),
];

/// Output column order of the statistics table.
pub fn schema() -> Vec<&'static str> {
    let mut columns = vec![FIELD_COLUMN, MEAN_COLUMN, STDDEV_COLUMN, MIN_COLUMN];
    columns.extend(PERCENTILES.iter().map(|(name, _)| *name));
    columns.extend([MAX_COLUMN, MODE_COLUMN]);
    columns
}

/// Profile of a single column. Numeric measures are `None` unless every
/// non-null value is numeric.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnProfile {
    pub field: String,
    pub mean: Option<f64>,
    pub stddev: Option<f64>,
    pub min: Option<String>,
    pub percentiles: Vec<Option<f64>>,
    pub max: Option<String>,
    pub mode: Option<String>,
}

impl ColumnProfile {
    pub fn compute(dataset: &Dataset, field: &str) -> Result<Self> {
        let texts: Vec<String> = dataset.texts(field)?.into_iter().flatten().collect();
        let numbers: Vec<f64> = dataset.numbers(field)?.into_iter().flatten().collect();
        let numeric = !texts.is_empty() && numbers.len() == texts.len();

        let mut profile = Self {
            field: field.to_string(),
            mode: mode(&texts),
            percentiles: vec![None; PERCENTILES.len()],
            ..Self::default()
        };

        if numeric {
            let mut sorted = numbers;
            sorted.sort_by(f64::total_cmp);
            profile.mean = Some(sorted.iter().sum::<f64>() / sorted.len() as f64);
            profile.stddev = mean_and_stddev(&sorted).map(|(_, stddev)| stddev);
            profile.min = sorted.first().copied().map(format_numeric);
            profile.max = sorted.last().copied().map(format_numeric);
            profile.percentiles = PERCENTILES
                .iter()
                .map(|(_, quantile)| percentile(&sorted, *quantile))
                .collect();
        } else {
            profile.min = texts.iter().min().cloned();
            profile.max = texts.iter().max().cloned();
        }
        Ok(profile)
    }
}

/// Linear interpolation between closest ranks. `sorted` must be ascending.
pub(crate) fn percentile(sorted: &[f64], quantile: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let position = quantile * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let weight = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}

/// Most frequent value; ties go to the value seen first.
fn mode(values: &[String]) -> Option<String> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for value in values {
        match positions.get(value.as_str()) {
            Some(&slot) => counts[slot].1 += 1,
            None => {
                positions.insert(value.as_str(), counts.len());
                counts.push((value.as_str(), 1));
            }
        }
    }
    let mut best: Option<(&str, usize)> = None;
    for (value, count) in counts {
        if best.is_none_or(|(_, top)| count > top) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value.to_string())
}

/// Build the statistics table, one row per field.
pub fn statistics_table(dataset: &Dataset, fields: &[String]) -> Result<DataFrame> {
    let profiles = fields
        .iter()
        .map(|field| ColumnProfile::compute(dataset, field))
        .collect::<Result<Vec<_>>>()?;
    debug!(fields = profiles.len(), "profiled columns");

    let number = |value: Option<f64>| value.map(format_numeric);
    let mut columns = vec![
        text_column(FIELD_COLUMN, profiles.iter().map(|p| Some(p.field.clone()))),
        text_column(MEAN_COLUMN, profiles.iter().map(|p| number(p.mean))),
        text_column(STDDEV_COLUMN, profiles.iter().map(|p| number(p.stddev))),
        text_column(MIN_COLUMN, profiles.iter().map(|p| p.min.clone())),
    ];
    for (idx, (name, _)) in PERCENTILES.iter().enumerate() {
        columns.push(text_column(
            name,
            profiles.iter().map(|p| number(p.percentiles[idx])),
        ));
    }
    columns.push(text_column(MAX_COLUMN, profiles.iter().map(|p| p.max.clone())));
    columns.push(text_column(MODE_COLUMN, profiles.iter().map(|p| p.mode.clone())));
    Ok(DataFrame::new(columns).map_err(dq_common::DatasetError::from)?)
}

fn text_column(name: &str, values: impl Iterator<Item = Option<String>>) -> Column {
    Column::new(name.into(), values.collect::<Vec<_>>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::frame;

    #[test]
    fn percentiles_interpolate() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(percentile(&sorted, 0.5), Some(2.5));
        assert_eq!(percentile(&sorted, 0.0), Some(1.0));
        assert_eq!(percentile(&sorted, 1.0), Some(4.0));
        assert_eq!(percentile(&[], 0.5), None);
    }

    #[test]
    fn mode_prefers_first_seen_on_ties() {
        let values: Vec<String> = ["b", "a", "a", "b", "c"].iter().map(|v| v.to_string()).collect();
        assert_eq!(mode(&values), Some("b".to_string()));
    }

    #[test]
    fn mode_of_distinct_ids_is_the_first_one() {
        let ids: Vec<String> = (0..100_000).map(|idx| format!("id{idx}")).collect();
        assert_eq!(mode(&ids), Some("id0".to_string()));
    }

    #[test]
    fn profiles_numeric_and_text_columns() {
        let dataset = frame(&[
            ("amount", [Some("10"), Some("20"), None, Some("30")]),
            ("name", [Some("zoe"), Some("ana"), Some("ana"), None]),
        ]);
        let amount = ColumnProfile::compute(&dataset, "amount").unwrap();
        assert_eq!(amount.mean, Some(20.0));
        assert_eq!(amount.stddev, Some(10.0));
        assert_eq!(amount.min.as_deref(), Some("10"));
        assert_eq!(amount.max.as_deref(), Some("30"));
        assert_eq!(amount.percentiles[4], Some(20.0));

        let name = ColumnProfile::compute(&dataset, "name").unwrap();
        assert_eq!(name.mean, None);
        assert_eq!(name.min.as_deref(), Some("ana"));
        assert_eq!(name.max.as_deref(), Some("zoe"));
        assert_eq!(name.mode.as_deref(), Some("ana"));
    }

    #[test]
    fn table_has_one_row_per_field() {
        let dataset = frame(&[("amount", [Some("1"), Some("2")]), ("code", [Some("x"), Some("y")])]);
        let fields = vec!["amount".to_string(), "code".to_string()];
        let table = statistics_table(&dataset, &fields).unwrap();
        assert_eq!(table.height(), 2);
        let names: Vec<String> = table
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();
        assert_eq!(names, schema());
    }
}
