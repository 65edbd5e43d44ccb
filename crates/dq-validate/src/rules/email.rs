use std::collections::HashSet;

use dq_common::Dataset;
use regex::Regex;

use crate::error::Result;
use crate::outcome::Finding;

const EMAIL_PATTERN: &str = r"^[\w\.-]+@([\w-]+\.)+[\w]+$";

/// A non-null address fails when it is malformed, its domain is not listed
/// in the reference column, or its local part is forbidden.
pub fn evaluate(
    dataset: &Dataset,
    field: &str,
    reference: &Dataset,
    domain_field: &str,
    forbidden: &[String],
) -> Result<Finding> {
    let pattern = Regex::new(EMAIL_PATTERN)?;
    let domains: HashSet<String> = reference
        .texts(domain_field)?
        .into_iter()
        .flatten()
        .map(|domain| domain.trim().to_string())
        .collect();

    let failed = dataset
        .texts(field)?
        .iter()
        .map(|cell| {
            cell.as_deref().is_some_and(|address| {
                let Some((local, domain)) = address.split_once('@') else {
                    return true;
                };
                !pattern.is_match(address)
                    || !domains.contains(domain)
                    || forbidden.iter().any(|token| token == local)
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
    fn validates_format_domain_and_local_part() {
        let dataset = column(
            "email",
            &[
                Some("ana.perez@bank.pe"),
                Some("ana@unknown.com"),
                Some("not-an-email"),
                Some("test@bank.pe"),
                None,
            ],
        );
        let domains = column("domain", &[Some("bank.pe"), Some("mail.bank.pe")]);
        let forbidden = vec!["test".to_string()];
        let finding = evaluate(&dataset, "email", &domains, "domain", &forbidden).unwrap();
        assert_eq!(finding.failed, vec![false, true, true, true, false]);
    }
}
