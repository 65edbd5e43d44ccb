//! Allow-listed date patterns.
//!
//! Rule configurations name date formats with Java-style patterns. Only the
//! patterns below are accepted; each maps to a chrono format string.

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatePrecision {
    /// Year and month only; parsed as the first day of the month.
    Month,
    Day,
    Second,
}

/// One allow-listed date format. Serialized as its pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub struct DateFormat {
    pub pattern: &'static str,
    pub chrono: &'static str,
    pub precision: DatePrecision,
    /// Appended to month-precision values before parsing.
    pub day_suffix: &'static str,
}

const fn format(
    pattern: &'static str,
    chrono: &'static str,
    precision: DatePrecision,
    day_suffix: &'static str,
) -> DateFormat {
    DateFormat {
        pattern,
        chrono,
        precision,
        day_suffix,
    }
}

const ALLOWED_FORMATS: &[DateFormat] = &[
    format("yyyy-MM-dd", "%Y-%m-%d", DatePrecision::Day, ""),
    format("yyyy/MM/dd", "%Y/%m/%d", DatePrecision::Day, ""),
    format("dd-MM-yyyy", "%d-%m-%Y", DatePrecision::Day, ""),
    format("dd/MM/yyyy", "%d/%m/%Y", DatePrecision::Day, ""),
    format("MM-dd-yyyy", "%m-%d-%Y", DatePrecision::Day, ""),
    format("MM/dd/yyyy", "%m/%d/%Y", DatePrecision::Day, ""),
    format("yyyyMMdd", "%Y%m%d", DatePrecision::Day, ""),
    format("ddMMyyyy", "%d%m%Y", DatePrecision::Day, ""),
    format("yyyy-MM", "%Y-%m-%d", DatePrecision::Month, "-01"),
    format("yyyyMM", "%Y%m%d", DatePrecision::Month, "01"),
    format(
        "yyyy-MM-dd HH:mm:ss",
        "%Y-%m-%d %H:%M:%S",
        DatePrecision::Second,
        "",
    ),
    format(
        "yyyy/MM/dd HH:mm:ss",
        "%Y/%m/%d %H:%M:%S",
        DatePrecision::Second,
        "",
    ),
    format(
        "dd/MM/yyyy HH:mm:ss",
        "%d/%m/%Y %H:%M:%S",
        DatePrecision::Second,
        "",
    ),
    format(
        "yyyy-MM-dd'T'HH:mm:ss",
        "%Y-%m-%dT%H:%M:%S",
        DatePrecision::Second,
        "",
    ),
    format("yyyyMMddHHmmss", "%Y%m%d%H%M%S", DatePrecision::Second, ""),
];

impl DateFormat {
    /// Look up an allow-listed pattern. Surrounding whitespace is ignored.
    pub fn lookup(pattern: &str) -> Option<Self> {
        let pattern = pattern.trim();
        ALLOWED_FORMATS
            .iter()
            .find(|candidate| candidate.pattern == pattern)
            .copied()
    }

    pub fn allowed() -> impl Iterator<Item = &'static str> {
        ALLOWED_FORMATS.iter().map(|candidate| candidate.pattern)
    }

    pub fn has_time(&self) -> bool {
        self.precision == DatePrecision::Second
    }
}

impl TryFrom<String> for DateFormat {
    type Error = String;

    fn try_from(pattern: String) -> Result<Self, Self::Error> {
        Self::lookup(&pattern).ok_or_else(|| format!("unrecognized date format `{pattern}`"))
    }
}

// Not derived: the fields borrow from the static table, not from the input.
impl<'de> Deserialize<'de> for DateFormat {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let pattern = String::deserialize(deserializer)?;
        Self::try_from(pattern).map_err(serde::de::Error::custom)
    }
}

impl From<DateFormat> for String {
    fn from(format: DateFormat) -> Self {
        format.pattern.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_patterns_resolve() {
        let iso = DateFormat::lookup("yyyy-MM-dd").expect("iso date");
        assert_eq!(iso.chrono, "%Y-%m-%d");
        assert!(!iso.has_time());
        let stamp = DateFormat::lookup(" yyyy-MM-dd HH:mm:ss ").expect("timestamp");
        assert!(stamp.has_time());
        let month = DateFormat::lookup("yyyyMM").expect("month");
        assert_eq!(month.day_suffix, "01");
    }

    #[test]
    fn unknown_patterns_are_rejected() {
        assert!(DateFormat::lookup("YYYY-mm-DD").is_none());
        assert!(DateFormat::lookup("").is_none());
        assert_eq!(DateFormat::allowed().count(), ALLOWED_FORMATS.len());
    }

    #[derive(Debug, Deserialize)]
    struct Holder {
        format: DateFormat,
    }

    #[test]
    fn deserializes_inside_a_containing_struct() {
        let holder: Holder = serde_json::from_str(r#"{"format": "yyyyMM"}"#).unwrap();
        assert_eq!(holder.format.pattern, "yyyyMM");
        let err = serde_json::from_str::<Holder>(r#"{"format": "MM/yy"}"#).unwrap_err();
        assert!(err.to_string().contains("unrecognized date format `MM/yy`"));
    }
}
