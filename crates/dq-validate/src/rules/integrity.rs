use dq_common::Dataset;

use crate::error::Result;
use crate::outcome::Finding;

/// Rows without a matching reference row fail (anti-join).
pub fn evaluate(
    dataset: &Dataset,
    fields: &[String],
    reference: &Dataset,
    reference_fields: &[String],
) -> Result<Finding> {
    let failed = dataset.anti_join_mask(reference, fields, reference_fields)?;
    Ok(Finding::full(failed))
}
