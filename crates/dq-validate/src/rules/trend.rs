use dq_common::Dataset;
use dq_model::TrendMethod;

use crate::error::Result;
use crate::outcome::Finding;

/// Flag values outside `mean ± k·stddev`, computed per group of
/// `reference_fields` (or over the whole column when none are given).
///
/// Groups with fewer than two numeric values have no band and pass. Inside a
/// group with a band, null and non-numeric values fail.
pub fn evaluate(
    dataset: &Dataset,
    field: &str,
    reference_fields: &[String],
    method: TrendMethod,
) -> Result<Finding> {
    let values = dataset.numbers(field)?;
    let groups = if reference_fields.is_empty() {
        vec![(0..dataset.row_count()).collect()]
    } else {
        dataset.group_by(reference_fields)?
    };

    let mut failed = vec![false; values.len()];
    for rows in groups {
        let sample: Vec<f64> = rows.iter().filter_map(|&idx| values[idx]).collect();
        let Some((mean, stddev)) = mean_and_stddev(&sample) else {
            continue;
        };
        // Inclusive band: a constant group (zero stddev) passes every row.
        let width = method.band_width() * stddev;
        let (lower, upper) = (mean - width, mean + width);
        for idx in rows {
            failed[idx] = values[idx].is_none_or(|value| value < lower || value > upper);
        }
    }
    Ok(Finding::full(failed))
}

/// Mean and sample standard deviation; `None` below two values.
pub(crate) fn mean_and_stddev(values: &[f64]) -> Option<(f64, f64)> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Some((mean, variance.sqrt()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::{column, frame};

    #[test]
    fn sample_statistics() {
        let (mean, stddev) = mean_and_stddev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_eq!(mean, 5.0);
        assert!((stddev - 2.138).abs() < 1e-3);
        assert!(mean_and_stddev(&[1.0]).is_none());
    }

    #[test]
    fn whole_column_band() {
        let dataset = column(
            "amount",
            &[Some("10"), Some("11"), Some("9"), Some("10"), Some("30"), None],
        );
        let finding = evaluate(&dataset, "amount", &[], TrendMethod::StandardDeviation).unwrap();
        assert_eq!(finding.failed, vec![false, false, false, false, true, true]);
    }

    #[test]
    fn chebyshev_band_is_wider() {
        let dataset = column("amount", &[Some("10"), Some("12"), Some("14"), Some("16")]);
        let narrow = evaluate(&dataset, "amount", &[], TrendMethod::StandardDeviation).unwrap();
        let wide = evaluate(&dataset, "amount", &[], TrendMethod::Chebyshev).unwrap();
        assert_eq!(narrow.failed, vec![true, false, false, true]);
        assert_eq!(wide.failed_count(), 0);
    }

    #[test]
    fn bands_are_per_group() {
        let dataset = frame(&[
            ("branch", [Some("A"), Some("A"), Some("B"), Some("B"), Some("C")]),
            ("amount", [Some("10"), Some("10"), Some("1000"), Some("1000"), Some("5")]),
        ]);
        let fields = vec!["branch".to_string()];
        let finding = evaluate(&dataset, "amount", &fields, TrendMethod::Chebyshev).unwrap();
        assert_eq!(finding.failed_count(), 0);
    }

    #[test]
    fn constant_group_sits_on_its_band() {
        let dataset = column("amount", &[Some("7"), Some("7"), Some("7")]);
        let finding = evaluate(&dataset, "amount", &[], TrendMethod::StandardDeviation).unwrap();
        assert_eq!(finding.failed, vec![false, false, false]);
    }
}
