use std::collections::HashMap;

/// A set that performs case-insensitive lookups but preserves original names.
///
/// Used to resolve configured column names against a dataset schema.
#[derive(Debug, Clone, Default)]
pub struct CaseInsensitiveSet {
    /// Maps uppercase name -> original name
    inner: HashMap<String, String>,
}

impl CaseInsensitiveSet {
    pub fn new<I, S>(iter: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            inner: iter
                .into_iter()
                .map(|s| (s.as_ref().to_uppercase(), s.as_ref().to_string()))
                .collect(),
        }
    }

    /// Check if the set contains a value (case-insensitive).
    pub fn contains(&self, value: impl AsRef<str>) -> bool {
        self.inner.contains_key(&value.as_ref().to_uppercase())
    }

    /// Get the original column name (case-insensitive lookup).
    pub fn get(&self, value: impl AsRef<str>) -> Option<&str> {
        self.inner
            .get(&value.as_ref().to_uppercase())
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_set() {
        let set = CaseInsensitiveSet::new(["customer_id", "Email"]);

        assert!(set.contains("CUSTOMER_ID"));
        assert!(set.contains("email"));
        assert_eq!(set.get("EMAIL"), Some("Email"));
        assert!(!set.contains("phone"));
        assert_eq!(set.len(), 2);
    }
}
