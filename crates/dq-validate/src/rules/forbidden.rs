use dq_common::Dataset;

use crate::error::Result;
use crate::outcome::Finding;

/// A row fails when the field contains any forbidden token.
pub fn evaluate(dataset: &Dataset, field: &str, tokens: &[String]) -> Result<Finding> {
    let tokens: Vec<&str> = tokens
        .iter()
        .map(String::as_str)
        .filter(|token| !token.is_empty())
        .collect();
    let failed = dataset
        .texts(field)?
        .iter()
        .map(|cell| {
            cell.as_deref()
                .is_some_and(|value| tokens.iter().any(|token| value.contains(token)))
        })
        .collect();
    Ok(Finding::full(failed))
}
