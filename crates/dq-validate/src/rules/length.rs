use dq_common::Dataset;

use crate::error::Result;
use crate::outcome::Finding;

/// A row fails when its character length is outside `[min, max]`. Nulls pass.
pub fn evaluate(
    dataset: &Dataset,
    field: &str,
    min: Option<usize>,
    max: Option<usize>,
) -> Result<Finding> {
    let failed = dataset
        .texts(field)?
        .iter()
        .map(|cell| {
            cell.as_deref().is_some_and(|value| {
                let length = value.chars().count();
                min.is_some_and(|min| length < min) || max.is_some_and(|max| length > max)
            })
        })
        .collect();
    Ok(Finding::full(failed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::column;

    #[test]
    fn counts_characters_not_bytes() {
        let dataset = column("code", &[Some("ñandú"), Some("ab"), Some("abcdefg"), None]);
        let finding = evaluate(&dataset, "code", Some(3), Some(5)).unwrap();
        assert_eq!(finding.failed, vec![false, true, true, false]);
    }

    #[test]
    fn open_bounds() {
        let dataset = column("code", &[Some("a"), Some("abcdef")]);
        let finding = evaluate(&dataset, "code", None, Some(5)).unwrap();
        assert_eq!(finding.failed, vec![false, true]);
    }
}
