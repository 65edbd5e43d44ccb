use dq_common::Dataset;

use crate::error::Result;
use crate::outcome::Finding;

/// Every row whose key tuple occurs more than once fails.
pub fn evaluate(dataset: &Dataset, keys: &[String]) -> Result<Finding> {
    let failed = dataset
        .group_counts(keys)?
        .into_iter()
        .map(|count| count > 1)
        .collect();
    Ok(Finding::full(failed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::frame;

    #[test]
    fn flags_every_member_of_a_repeated_key() {
        let dataset = frame(&[
            ("id", [Some("1"), Some("2"), Some("1"), Some("3"), Some("1")]),
            ("day", [Some("a"), Some("a"), Some("a"), Some("a"), Some("b")]),
        ]);
        let finding = evaluate(&dataset, &["id".to_string()]).unwrap();
        assert_eq!(finding.failed, vec![true, false, true, false, true]);

        let finding = evaluate(&dataset, &["id".to_string(), "day".to_string()]).unwrap();
        assert_eq!(finding.failed, vec![true, false, true, false, false]);
    }
}
