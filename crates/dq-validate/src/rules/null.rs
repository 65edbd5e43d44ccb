use dq_common::Dataset;

use crate::error::Result;
use crate::outcome::Finding;

/// A row fails when the field is null or the empty string.
pub fn evaluate(dataset: &Dataset, field: &str) -> Result<Finding> {
    let failed = dataset
        .texts(field)?
        .iter()
        .map(|cell| cell.as_deref().is_none_or(|value| value.is_empty()))
        .collect();
    Ok(Finding::full(failed))
}
