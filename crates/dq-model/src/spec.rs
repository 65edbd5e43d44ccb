//! Typed rule specifications.
//!
//! A [`RuleSpec`] is one configured rule instance after validation. Its
//! kind-specific parameters live in [`RuleParams`], so an evaluator never has
//! to look anything up by key at run time.

use serde::{Deserialize, Serialize};

use crate::date_format::DateFormat;
use crate::kind::RuleKind;

/// Wildcard marker meaning "every column currently in the dataset".
pub const WILDCARD: &str = "*";

/// Columns a rule applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetFields {
    /// Apply once per column present when the run starts.
    All,
    /// Explicit ordered column list.
    Columns(Vec<String>),
}

impl TargetFields {
    pub fn from_list(fields: Vec<String>) -> Self {
        if fields.first().map(|f| f.trim()) == Some(WILDCARD) {
            TargetFields::All
        } else {
            TargetFields::Columns(fields)
        }
    }

    /// Resolve against a column snapshot.
    pub fn resolve(&self, columns: &[String]) -> Vec<String> {
        match self {
            TargetFields::All => columns.to_vec(),
            TargetFields::Columns(fields) => fields.clone(),
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, TargetFields::All)
    }
}

/// One configured, validated rule instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSpec {
    /// Configured code; its first three characters select `kind`.
    pub code: String,
    pub kind: RuleKind,
    pub target: TargetFields,
    /// Descriptive minimum success percentage, reported but not enforced.
    pub threshold_percent: f64,
    /// Whether failing rows are merged into the error table.
    pub write_violations: bool,
    pub params: RuleParams,
}

/// Kind-specific rule parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RuleParams {
    /// Kinds driven only by their target fields (null, duplicate,
    /// prerequisites).
    Fields,
    Statistics {
        /// Where the statistics table is written, if anywhere.
        output: Option<String>,
    },
    Referential {
        reference: ReferenceSource,
        reference_fields: Vec<String>,
    },
    Catalog {
        allowed: Vec<String>,
    },
    Range(RangeBounds),
    Forbidden {
        tokens: Vec<String>,
    },
    Type {
        expected: ValueType,
    },
    Composition {
        parts: Vec<String>,
        delimiter: String,
    },
    Length {
        min: Option<usize>,
        max: Option<usize>,
    },
    StorageType {
        expected: StorageType,
    },
    NumericFormat {
        max_integer_digits: usize,
        decimal_digits: usize,
        separator: char,
    },
    NumericOperation {
        operator: Comparison,
        operand: String,
        tolerance: f64,
    },
    DateFormat {
        format: DateFormat,
    },
    TimeRange {
        /// Column name, `hoy`/`today`, or a literal date in `format`.
        reference: String,
        format: DateFormat,
        unit: DiffUnit,
        bounds: RangeBounds,
    },
    Conditional {
        condition: Condition,
        filters: Vec<RowFilter>,
        inner: Box<RuleSpec>,
    },
    PositionValue {
        /// 1-based, inclusive.
        start: usize,
        /// 1-based, inclusive.
        end: usize,
        expected: Vec<String>,
    },
    Email {
        reference: ReferenceSource,
        domain_field: String,
        forbidden: Vec<String>,
    },
    ValueTrend {
        reference_fields: Vec<String>,
        method: TrendMethod,
    },
}

/// Where a reference dataset comes from. Resolution is the storage layer's job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ReferenceSource {
    #[serde(default)]
    pub entity: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default, rename = "type")]
    pub format: Option<String>,
    #[serde(default)]
    pub delimiter: Option<String>,
    #[serde(default, deserialize_with = "crate::config::optional_flag")]
    pub header: Option<bool>,
}

impl ReferenceSource {
    /// Human-readable name for messages.
    pub fn display_name(&self) -> String {
        self.entity
            .clone()
            .or_else(|| self.path.clone())
            .unwrap_or_else(|| "reference".to_string())
    }
}

/// Lower/upper limit of a range rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RangeLimit {
    Number(f64),
    /// Compared row-wise against another column.
    Column(String),
}

impl RangeLimit {
    /// Numbers become literal limits, anything else names a column.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().parse::<f64>() {
            Ok(value) => RangeLimit::Number(value),
            Err(_) => RangeLimit::Column(raw.trim().to_string()),
        }
    }
}

impl std::fmt::Display for RangeLimit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RangeLimit::Number(value) => write!(f, "{value}"),
            RangeLimit::Column(name) => write!(f, "{name}"),
        }
    }
}

/// Range limits with inclusivity flags.
///
/// With `inclusive = false` the range describes a forbidden band: a row fails
/// when it lies inside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeBounds {
    pub min: Option<RangeLimit>,
    pub max: Option<RangeLimit>,
    pub include_left: bool,
    pub include_right: bool,
    pub inclusive: bool,
}

impl Default for RangeBounds {
    fn default() -> Self {
        Self {
            min: None,
            max: None,
            include_left: true,
            include_right: true,
            inclusive: true,
        }
    }
}

impl RangeBounds {
    /// Whether `value` violates the bounds given resolved numeric limits.
    ///
    /// A missing limit never contributes a violation.
    pub fn violates(&self, value: f64, min: Option<f64>, max: Option<f64>) -> bool {
        let below = min.is_some_and(|limit| {
            if self.include_left {
                value < limit
            } else {
                value <= limit
            }
        });
        let above = max.is_some_and(|limit| {
            if self.include_right {
                value > limit
            } else {
                value >= limit
            }
        });
        if self.inclusive {
            below || above
        } else {
            // Exclusion band: both limits must be present and the value inside.
            match (min, max) {
                (Some(_), Some(_)) => !below && !above,
                _ => false,
            }
        }
    }
}

/// Target type for value-level parse checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueType {
    Integer,
    Long,
    Double,
    Decimal,
    Boolean,
    Date,
    Timestamp,
    String,
}

impl ValueType {
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = normalize_type_name(raw);
        let value_type = match normalized.as_str() {
            "int" | "integer" | "short" | "smallint" | "byte" | "tinyint" => ValueType::Integer,
            "long" | "bigint" => ValueType::Long,
            "double" | "float" | "real" => ValueType::Double,
            "decimal" | "numeric" => ValueType::Decimal,
            "boolean" | "bool" => ValueType::Boolean,
            "date" => ValueType::Date,
            "timestamp" | "datetime" => ValueType::Timestamp,
            "string" | "str" | "varchar" | "text" => ValueType::String,
            _ => return None,
        };
        Some(value_type)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ValueType::Integer => "integer",
            ValueType::Long => "long",
            ValueType::Double => "double",
            ValueType::Decimal => "decimal",
            ValueType::Boolean => "boolean",
            ValueType::Date => "date",
            ValueType::Timestamp => "timestamp",
            ValueType::String => "string",
        }
    }
}

/// Declared column storage type, compared at schema level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StorageType {
    Boolean,
    Byte,
    Short,
    Integer,
    Long,
    UnsignedInteger,
    Float,
    Double,
    Decimal,
    String,
    Binary,
    Date,
    Timestamp,
    Time,
    Null,
}

impl StorageType {
    /// Accepts engine-style names (`StringType()`, `IntegerType`) as well as
    /// short forms (`string`, `i64`, `f64`).
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = normalize_type_name(raw);
        let storage = match normalized.as_str() {
            "boolean" | "bool" => StorageType::Boolean,
            "byte" | "tinyint" | "i8" | "int8" => StorageType::Byte,
            "short" | "smallint" | "i16" | "int16" => StorageType::Short,
            "integer" | "int" | "i32" | "int32" => StorageType::Integer,
            "long" | "bigint" | "i64" | "int64" => StorageType::Long,
            "u8" | "u16" | "u32" | "u64" | "uint8" | "uint16" | "uint32" | "uint64" => {
                StorageType::UnsignedInteger
            }
            "float" | "f32" | "float32" => StorageType::Float,
            "double" | "f64" | "float64" => StorageType::Double,
            "decimal" => StorageType::Decimal,
            "string" | "str" | "utf8" | "varchar" => StorageType::String,
            "binary" => StorageType::Binary,
            "date" => StorageType::Date,
            "timestamp" | "datetime" => StorageType::Timestamp,
            "time" => StorageType::Time,
            "null" | "void" => StorageType::Null,
            _ => return None,
        };
        Some(storage)
    }
}

/// Lowercase, drop a trailing `()` or precision suffix and a `type` suffix.
fn normalize_type_name(raw: &str) -> String {
    let mut name = raw.trim().to_lowercase();
    if let Some(pos) = name.find('(') {
        name.truncate(pos);
    }
    if name.len() > 4
        && let Some(stripped) = name.strip_suffix("type")
    {
        name = stripped.to_string();
    }
    name
}

/// Comparison operator used by numeric-operation rules and row filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparison {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl Comparison {
    pub fn parse(raw: &str) -> Option<Self> {
        let op = match raw.trim() {
            "==" | "=" => Comparison::Eq,
            "!=" | "<>" => Comparison::Ne,
            ">" => Comparison::Gt,
            ">=" => Comparison::Ge,
            "<" => Comparison::Lt,
            "<=" => Comparison::Le,
            _ => return None,
        };
        Some(op)
    }

    pub fn holds(self, left: f64, right: f64) -> bool {
        match self {
            Comparison::Eq => left == right,
            Comparison::Ne => left != right,
            Comparison::Gt => left > right,
            Comparison::Ge => left >= right,
            Comparison::Lt => left < right,
            Comparison::Le => left <= right,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Comparison::Eq => "==",
            Comparison::Ne => "!=",
            Comparison::Gt => ">",
            Comparison::Ge => ">=",
            Comparison::Lt => "<",
            Comparison::Le => "<=",
        }
    }
}

/// Unit for date differences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiffUnit {
    Days,
    Months,
    Years,
}

impl DiffUnit {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_uppercase().as_str() {
            "DAY" | "DAYS" => Some(DiffUnit::Days),
            "MONTH" | "MONTHS" => Some(DiffUnit::Months),
            "YEAR" | "YEARS" => Some(DiffUnit::Years),
            _ => None,
        }
    }

    /// Convert a day count into this unit.
    pub fn from_days(self, days: i64) -> f64 {
        match self {
            DiffUnit::Days => days as f64,
            DiffUnit::Months => days as f64 / 30.0,
            DiffUnit::Years => days as f64 / 365.0,
        }
    }
}

/// How a conditional rule combines its filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Condition {
    /// Only the first filter applies.
    No,
    And,
    Or,
}

impl Condition {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_uppercase().as_str() {
            "NO" | "" => Some(Condition::No),
            "AND" => Some(Condition::And),
            "OR" => Some(Condition::Or),
            _ => None,
        }
    }
}

/// Row predicate used by conditional rules and the global filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowFilter {
    pub column: String,
    pub sign: FilterSign,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FilterSign {
    /// Value is one of the listed values (`in`, `==`).
    In(Vec<String>),
    /// Value differs from every listed value (`not in`, `!=`).
    NotIn(Vec<String>),
    IsNull,
    IsNotNull,
    /// Numeric comparison against a literal (`>`, `>=`, `<`, `<=`).
    Compare(Comparison, f64),
}

impl std::fmt::Display for RowFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.sign {
            FilterSign::In(values) => write!(f, "{} in {}", self.column, values.join(",")),
            FilterSign::NotIn(values) => write!(f, "{} not in {}", self.column, values.join(",")),
            FilterSign::IsNull => write!(f, "{} is Null", self.column),
            FilterSign::IsNotNull => write!(f, "{} is NotNull", self.column),
            FilterSign::Compare(op, value) => write!(f, "{} {} {}", self.column, op.symbol(), value),
        }
    }
}

/// Band width used by value-trend rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendMethod {
    /// mean ± 2·stdev
    Chebyshev,
    /// mean ± stdev
    StandardDeviation,
}

impl TrendMethod {
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("chebyshev") {
            TrendMethod::Chebyshev
        } else {
            TrendMethod::StandardDeviation
        }
    }

    pub fn band_width(self) -> f64 {
        match self {
            TrendMethod::Chebyshev => 2.0,
            TrendMethod::StandardDeviation => 1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TrendMethod::Chebyshev => "chebyshev",
            TrendMethod::StandardDeviation => "stddev",
        }
    }
}
