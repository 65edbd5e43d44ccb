use dq_common::Dataset;

use crate::error::Result;
use crate::outcome::Finding;

/// A row fails when the field differs from its parts joined by `delimiter`.
///
/// Null parts are skipped in the join; a null field passes.
pub fn evaluate(dataset: &Dataset, field: &str, parts: &[String], delimiter: &str) -> Result<Finding> {
    let values = dataset.texts(field)?;
    let parts = parts
        .iter()
        .map(|part| dataset.texts(part))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let failed = values
        .iter()
        .enumerate()
        .map(|(idx, value)| {
            value.as_deref().is_some_and(|value| {
                let expected = parts
                    .iter()
                    .filter_map(|part| part[idx].as_deref())
                    .collect::<Vec<_>>()
                    .join(delimiter);
                value != expected
            })
        })
        .collect();
    Ok(Finding::full(failed))
}
