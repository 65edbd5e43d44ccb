use dq_common::Dataset;

use crate::error::Result;
use crate::outcome::Finding;

/// The characters at 1-based positions `start..=end` must be one of the
/// expected values. Nulls pass.
pub fn evaluate(
    dataset: &Dataset,
    field: &str,
    start: usize,
    end: usize,
    expected: &[String],
) -> Result<Finding> {
    let failed = dataset
        .texts(field)?
        .iter()
        .map(|cell| {
            cell.as_deref().is_some_and(|value| {
                let slice = substring(value, start, end);
                !expected.iter().any(|candidate| *candidate == slice)
            })
        })
        .collect();
    Ok(Finding::full(failed))
}

/// Characters `start..=end`, 1-based, clipped to the value.
fn substring(value: &str, start: usize, end: usize) -> String {
    let skip = start.saturating_sub(1);
    let take = (end + 1).saturating_sub(start.max(1));
    value.chars().skip(skip).take(take).collect()
}
