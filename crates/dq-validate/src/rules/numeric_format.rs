use dq_common::Dataset;

use crate::error::Result;
use crate::outcome::Finding;

/// A row fails when either part around the separator holds a non-digit, the
/// integer part is too long, or the decimal part is too long. Nulls pass.
pub fn evaluate(
    dataset: &Dataset,
    field: &str,
    max_integer_digits: usize,
    decimal_digits: usize,
    separator: char,
) -> Result<Finding> {
    let failed = dataset
        .texts(field)?
        .iter()
        .map(|cell| {
            cell.as_deref().is_some_and(|value| {
                !fits(value.trim(), max_integer_digits, decimal_digits, separator)
            })
        })
        .collect();
    Ok(Finding::full(failed))
}

fn fits(value: &str, max_integer_digits: usize, decimal_digits: usize, separator: char) -> bool {
    let (integer, decimal) = match value.split_once(separator) {
        Some((integer, decimal)) => (integer, decimal),
        None => (value, ""),
    };
    let digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
    digits(integer)
        && digits(decimal)
        && integer.chars().count() <= max_integer_digits
        && decimal.chars().count() <= decimal_digits
}
