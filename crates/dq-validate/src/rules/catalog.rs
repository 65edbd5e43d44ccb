use std::collections::HashSet;

use dq_common::Dataset;

use crate::error::Result;
use crate::outcome::Finding;

/// A row fails when its normalized value is not in the allowed set.
/// Nulls fail.
pub fn evaluate(dataset: &Dataset, field: &str, allowed: &[String]) -> Result<Finding> {
    let allowed: HashSet<String> = allowed.iter().map(|value| normalize(value)).collect();
    let failed = dataset
        .texts(field)?
        .iter()
        .map(|cell| {
            cell.as_deref()
                .is_none_or(|value| !allowed.contains(&normalize(value)))
        })
        .collect();
    Ok(Finding::full(failed))
}

/// Trim, drop diacritics and fold case.
pub(crate) fn normalize(value: &str) -> String {
    value
        .trim()
        .chars()
        .map(strip_accent)
        .flat_map(char::to_lowercase)
        .collect()
}

fn strip_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'ä' | 'â' | 'ã' | 'å' => 'a',
        'Á' | 'À' | 'Ä' | 'Â' | 'Ã' | 'Å' => 'A',
        'é' | 'è' | 'ë' | 'ê' => 'e',
        'É' | 'È' | 'Ë' | 'Ê' => 'E',
        'í' | 'ì' | 'ï' | 'î' => 'i',
        'Í' | 'Ì' | 'Ï' | 'Î' => 'I',
        'ó' | 'ò' | 'ö' | 'ô' | 'õ' => 'o',
        'Ó' | 'Ò' | 'Ö' | 'Ô' | 'Õ' => 'O',
        'ú' | 'ù' | 'ü' | 'û' => 'u',
        'Ú' | 'Ù' | 'Ü' | 'Û' => 'U',
        'ñ' => 'n',
        'Ñ' => 'N',
        'ç' => 'c',
        'Ç' => 'C',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::column;

    #[test]
    fn comparison_ignores_case_accents_and_padding() {
        assert_eq!(normalize("  Perú "), "peru");
        let dataset = column(
            "country",
            &[Some("PERU"), Some(" perú"), Some("Chile"), None],
        );
        let allowed = vec!["Perú".to_string(), "Colombia".to_string()];
        let finding = evaluate(&dataset, "country", &allowed).unwrap();
        assert_eq!(finding.failed, vec![false, false, true, true]);
    }
}
