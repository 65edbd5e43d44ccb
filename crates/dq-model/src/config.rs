//! Run configuration and rule-record parsing.
//!
//! The configuration is a JSON document. Its `rules` object maps rule codes to
//! loosely-typed records; [`parse_rules`] validates every record into a typed
//! [`RuleSpec`] and turns anything it cannot use into a [`Diagnostic`].

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::date_format::DateFormat;
use crate::diagnostic::Diagnostic;
use crate::error::{ConfigError, Result};
use crate::kind::RuleKind;
use crate::metadata::RunMetadata;
use crate::spec::{
    Comparison, Condition, DiffUnit, FilterSign, RangeBounds, RangeLimit, ReferenceSource,
    RowFilter, RuleParams, RuleSpec, StorageType, TargetFields, TrendMethod, ValueType,
};

/// Default threshold when a record omits one.
pub const DEFAULT_THRESHOLD: f64 = 100.0;

/// Top-level run configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    pub input: InputConfig,
    pub output: Option<SinkConfig>,
    pub error: Option<SinkConfig>,
    /// Global row filter, a list of `[column, sign, value]` triples combined
    /// with AND.
    pub filter: Vec<Value>,
    pub data: Option<DataConfig>,
    pub rules: Map<String, Value>,
}

/// Subject dataset location plus identifying metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub country: String,
    pub project: String,
    pub entity: String,
    pub domain: String,
    pub sub_domain: String,
    pub segment: String,
    pub area: String,
    pub data_date: String,
    pub path: Option<String>,
    #[serde(rename = "type")]
    pub format: Option<String>,
    pub delimiter: Option<String>,
    #[serde(deserialize_with = "optional_flag")]
    pub header: Option<bool>,
    /// Whether the clean dataset is produced.
    #[serde(deserialize_with = "optional_flag")]
    pub valid_data: Option<bool>,
}

impl InputConfig {
    pub fn metadata(&self) -> RunMetadata {
        RunMetadata {
            country: self.country.clone(),
            project: self.project.clone(),
            entity: self.entity.clone(),
            domain: self.domain.clone(),
            sub_domain: self.sub_domain.clone(),
            segment: self.segment.clone(),
            area: self.area.clone(),
            data_date: self.data_date.clone(),
        }
    }

    pub fn source(&self) -> ReferenceSource {
        ReferenceSource {
            entity: Some(self.entity.clone()).filter(|entity| !entity.is_empty()),
            path: self.path.clone(),
            format: self.format.clone(),
            delimiter: self.delimiter.clone(),
            header: self.header,
        }
    }
}

/// Output location for a produced table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SinkConfig {
    pub path: Option<String>,
    #[serde(rename = "type")]
    pub format: Option<String>,
    pub delimiter: Option<String>,
    #[serde(deserialize_with = "optional_flag")]
    pub header: Option<bool>,
}

/// Clean-dataset projection settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Key fields for the anti-join against the error table.
    pub fields: Vec<String>,
    #[serde(flatten)]
    pub sink: SinkConfig,
}

/// Validated rules in configuration order, plus whatever was skipped.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    pub specs: Vec<RuleSpec>,
    pub diagnostics: Vec<Diagnostic>,
}

impl RuleSet {
    /// The prerequisites rule, if configured.
    pub fn prerequisites(&self) -> Option<&RuleSpec> {
        self.specs
            .iter()
            .find(|spec| spec.kind == RuleKind::Prerequisites)
    }
}

impl AuditConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn metadata(&self) -> RunMetadata {
        self.input.metadata()
    }

    pub fn rule_set(&self) -> RuleSet {
        parse_rules(&self.rules)
    }

    /// Parse the global filter. Malformed entries become diagnostics.
    pub fn global_filters(&self) -> (Vec<RowFilter>, Vec<Diagnostic>) {
        let mut filters = Vec::new();
        let mut diagnostics = Vec::new();
        for entry in &self.filter {
            match parse_filter("filter", entry) {
                Ok(filter) => filters.push(filter),
                Err(err) => {
                    warn!(error = %err, "ignoring malformed global filter");
                    diagnostics.push(Diagnostic::new("filter", err.to_string()));
                }
            }
        }
        (filters, diagnostics)
    }

    /// Whether the clean dataset should be produced.
    pub fn wants_clean_data(&self) -> bool {
        self.input.valid_data.unwrap_or(false)
            && self.data.as_ref().is_some_and(|data| !data.fields.is_empty())
    }
}

/// Validate every rule record, keeping configuration order.
pub fn parse_rules(rules: &Map<String, Value>) -> RuleSet {
    let mut set = RuleSet::default();
    for (code, record) in rules {
        match parse_rule(code, record) {
            Ok(Some(spec)) => set.specs.push(spec),
            Ok(None) => debug!(code = %code, "rule disabled by its fields"),
            Err(err) => {
                warn!(code = %code, error = %err, "skipping rule");
                set.diagnostics.push(Diagnostic::new(code.clone(), err.to_string()));
            }
        }
    }
    set
}

/// Validate one rule record. `Ok(None)` means the record disables itself.
pub fn parse_rule(code: &str, record: &Value) -> Result<Option<RuleSpec>> {
    let kind = RuleKind::from_code(code).ok_or_else(|| ConfigError::UnknownRuleCode {
        code: code.to_string(),
    })?;
    let record = RuleRecord::new(code, record)?;

    if kind == RuleKind::ConditionalRule {
        return parse_conditional(&record);
    }

    let Some(fields) = record.fields()? else {
        return Ok(None);
    };
    let target = if kind == RuleKind::Prerequisites {
        TargetFields::Columns(fields)
    } else {
        TargetFields::from_list(fields)
    };

    let params = parse_params(kind, &record)?;
    Ok(Some(RuleSpec {
        code: code.to_string(),
        kind,
        target,
        threshold_percent: record.threshold()?,
        write_violations: record.write_flag(),
        params,
    }))
}

fn parse_params(kind: RuleKind, record: &RuleRecord<'_>) -> Result<RuleParams> {
    let code = record.code;
    let params = match kind {
        RuleKind::Prerequisites | RuleKind::NullCheck | RuleKind::DuplicateCheck => {
            RuleParams::Fields
        }
        RuleKind::StatisticsSummary => RuleParams::Statistics {
            output: record.get("output").and_then(|output| match output {
                Value::String(path) => Some(path.clone()),
                Value::Object(map) => map.get("path").and_then(Value::as_str).map(str::to_string),
                _ => None,
            }),
        },
        RuleKind::ReferentialIntegrity => {
            let input = record.require("input")?;
            let reference = reference_source(code, input)?;
            let reference_fields = input
                .get("fields")
                .map(|fields| string_list(code, "input.fields", fields))
                .transpose()?
                .ok_or_else(|| ConfigError::missing(code, "input.fields"))?;
            let local = record.fields()?.unwrap_or_default();
            if local.len() != reference_fields.len() {
                return Err(ConfigError::invalid(
                    code,
                    "input.fields",
                    format!(
                        "expected {} reference fields, found {}",
                        local.len(),
                        reference_fields.len()
                    ),
                ));
            }
            RuleParams::Referential {
                reference,
                reference_fields,
            }
        }
        RuleKind::CatalogCheck => RuleParams::Catalog {
            allowed: record.list("values")?,
        },
        RuleKind::RangeCheck => {
            let bounds = record.range_bounds()?;
            if bounds.min.is_none() && bounds.max.is_none() {
                return Err(ConfigError::missing(code, "min_range"));
            }
            RuleParams::Range(bounds)
        }
        RuleKind::ForbiddenCharacters => RuleParams::Forbidden {
            tokens: record.list("values")?,
        },
        RuleKind::TypeCheck => {
            let raw = record.text("data_type")?;
            let expected = ValueType::parse(&raw)
                .ok_or_else(|| ConfigError::invalid(code, "data_type", format!("unknown type `{raw}`")))?;
            RuleParams::Type { expected }
        }
        RuleKind::CompositionCheck => RuleParams::Composition {
            parts: record.list("values")?,
            delimiter: record.optional_text("delimiter").unwrap_or_default(),
        },
        RuleKind::LengthCheck => {
            let min = record.optional_count("min_range")?;
            let max = record.optional_count("max_range")?;
            if min.is_none() && max.is_none() {
                return Err(ConfigError::missing(code, "min_range"));
            }
            RuleParams::Length { min, max }
        }
        RuleKind::ParquetTypeCheck => {
            let raw = record.text("data_type")?;
            let expected = StorageType::parse(&raw)
                .ok_or_else(|| ConfigError::invalid(code, "data_type", format!("unknown type `{raw}`")))?;
            RuleParams::StorageType { expected }
        }
        RuleKind::NumericFormatCheck => {
            let separator = record
                .optional_text("sep")
                .and_then(|sep| sep.chars().next())
                .unwrap_or('.');
            RuleParams::NumericFormat {
                max_integer_digits: record.count("max_int")?,
                decimal_digits: record.count("num_dec")?,
                separator,
            }
        }
        RuleKind::NumericOperationCheck => {
            let raw = record.text("operator")?;
            let operator = Comparison::parse(&raw)
                .ok_or_else(|| ConfigError::invalid(code, "operator", format!("unknown operator `{raw}`")))?;
            let operand = record.text("input_val")?;
            if operand.split_whitespace().next().is_none() {
                return Err(ConfigError::invalid(code, "input_val", "empty expression"));
            }
            RuleParams::NumericOperation {
                operator,
                operand,
                tolerance: record.optional_number("error_val")?.unwrap_or(0.0),
            }
        }
        RuleKind::DateFormatCheck => RuleParams::DateFormat {
            format: record.date_format()?,
        },
        RuleKind::TimeRangeCheck => {
            let unit = match record.optional_text("diff_unit") {
                Some(raw) => DiffUnit::parse(&raw).ok_or_else(|| {
                    ConfigError::invalid(code, "diff_unit", format!("unknown unit `{raw}`"))
                })?,
                None => DiffUnit::Days,
            };
            RuleParams::TimeRange {
                reference: record.text("reference_date")?,
                format: record.date_format()?,
                unit,
                bounds: record.range_bounds()?,
            }
        }
        RuleKind::PositionValueCheck => {
            let start = record.count("initial_position")?;
            let end = record.count("final_position")?;
            if start == 0 || end < start {
                return Err(ConfigError::invalid(
                    code,
                    "final_position",
                    format!("positions {start}..{end} are not a 1-based inclusive span"),
                ));
            }
            RuleParams::PositionValue {
                start,
                end,
                expected: record.list("expected_value")?,
            }
        }
        RuleKind::EmailCheck => {
            let input = record.require("input")?;
            let reference = reference_source(code, input)?;
            let domain_field = input
                .get("reference_fields")
                .or_else(|| input.get("referenceFields"))
                .or_else(|| input.get("fields"))
                .map(|fields| string_list(code, "input.reference_fields", fields))
                .transpose()?
                .and_then(|fields| fields.into_iter().next())
                .ok_or_else(|| ConfigError::missing(code, "input.reference_fields"))?;
            RuleParams::Email {
                reference,
                domain_field,
                forbidden: record.optional_list("expression_forbidden")?.unwrap_or_default(),
            }
        }
        RuleKind::ValueTrendCheck => RuleParams::ValueTrend {
            reference_fields: record.optional_list("reference_fields")?.unwrap_or_default(),
            method: TrendMethod::parse(&record.optional_text("method").unwrap_or_default()),
        },
        RuleKind::ConditionalRule => {
            return Err(ConfigError::UnsupportedInnerRule {
                code: code.to_string(),
                kind: format!("{kind:?}"),
            });
        }
    };
    Ok(params)
}

fn parse_conditional(record: &RuleRecord<'_>) -> Result<Option<RuleSpec>> {
    let code = record.code;
    let condition = match record.optional_text("condition") {
        Some(raw) => Condition::parse(&raw)
            .ok_or_else(|| ConfigError::invalid(code, "condition", format!("unknown condition `{raw}`")))?,
        None => Condition::No,
    };
    let filters = match record.require("filter_list")? {
        Value::Array(entries) if !entries.is_empty() => entries
            .iter()
            .map(|entry| parse_filter(code, entry))
            .collect::<Result<Vec<_>>>()?,
        _ => {
            return Err(ConfigError::invalid(code, "filter_list", "expected a non-empty list"));
        }
    };

    let inner_record = record.require("quality_function")?;
    let inner_code = inner_record
        .get("code")
        .and_then(Value::as_str)
        .ok_or_else(|| ConfigError::missing(code, "quality_function.code"))?;
    let inner_kind = RuleKind::from_code(inner_code).ok_or_else(|| ConfigError::UnknownRuleCode {
        code: inner_code.to_string(),
    })?;
    if matches!(
        inner_kind,
        RuleKind::ConditionalRule | RuleKind::StatisticsSummary | RuleKind::Prerequisites
    ) {
        return Err(ConfigError::UnsupportedInnerRule {
            code: code.to_string(),
            kind: format!("{inner_kind:?}"),
        });
    }
    let Some(inner) = parse_rule(inner_code, inner_record)? else {
        return Ok(None);
    };

    Ok(Some(RuleSpec {
        code: code.to_string(),
        kind: RuleKind::ConditionalRule,
        target: inner.target.clone(),
        threshold_percent: record.threshold()?,
        write_violations: record.write_flag(),
        params: RuleParams::Conditional {
            condition,
            filters,
            inner: Box::new(inner),
        },
    }))
}

/// Parse one `[column, sign, value]` filter triple.
pub fn parse_filter(code: &str, entry: &Value) -> Result<RowFilter> {
    let invalid = |reason: &str| ConfigError::invalid(code, "filter_list", reason.to_string());
    let Value::Array(parts) = entry else {
        return Err(invalid("filters are [column, sign, value] lists"));
    };
    let [column, sign, value] = parts.as_slice() else {
        return Err(invalid("filters are [column, sign, value] lists"));
    };
    let column = column
        .as_str()
        .ok_or_else(|| invalid("filter column must be a string"))?
        .to_string();
    let sign = sign
        .as_str()
        .ok_or_else(|| invalid("filter sign must be a string"))?
        .trim()
        .to_lowercase();

    let sign = match sign.as_str() {
        "in" | "==" => FilterSign::In(string_list(code, "filter_list", value)?),
        "not in" | "!=" => FilterSign::NotIn(string_list(code, "filter_list", value)?),
        "is" => match value_text(value).as_deref().map(str::to_lowercase).as_deref() {
            Some("null") => FilterSign::IsNull,
            Some("notnull") | Some("not null") => FilterSign::IsNotNull,
            _ => return Err(invalid("`is` filters take Null or NotNull")),
        },
        other => {
            let op = Comparison::parse(other)
                .filter(|op| !matches!(op, Comparison::Eq | Comparison::Ne))
                .ok_or_else(|| invalid(&format!("unknown filter sign `{other}`")))?;
            let literal = value_number(value)
                .ok_or_else(|| invalid("comparison filters take a numeric value"))?;
            FilterSign::Compare(op, literal)
        }
    };
    Ok(RowFilter { column, sign })
}

/// Deserialize a boolean that may also arrive as `"TRUE"`/`"FALSE"`.
pub(crate) fn optional_flag<'de, D>(deserializer: D) -> std::result::Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_flag))
}

fn value_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::String(text) => match text.trim().to_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        },
        Value::Number(number) => number.as_i64().map(|n| n != 0),
        _ => None,
    }
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn value_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn string_list(code: &str, parameter: &str, value: &Value) -> Result<Vec<String>> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| {
                value_text(item).ok_or_else(|| {
                    ConfigError::invalid(code, parameter, "list items must be scalars")
                })
            })
            .collect(),
        Value::Null => Err(ConfigError::missing(code, parameter)),
        other => value_text(other)
            .map(|text| vec![text])
            .ok_or_else(|| ConfigError::invalid(code, parameter, "expected a list")),
    }
}

fn reference_source(code: &str, value: &Value) -> Result<ReferenceSource> {
    ReferenceSource::deserialize(value)
        .map_err(|err| ConfigError::invalid(code, "input", err.to_string()))
}

/// Case- and underscore-insensitive view over a rule record.
struct RuleRecord<'a> {
    code: &'a str,
    entries: BTreeMap<String, &'a Value>,
}

fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

impl<'a> RuleRecord<'a> {
    fn new(code: &'a str, record: &'a Value) -> Result<Self> {
        let Value::Object(map) = record else {
            return Err(ConfigError::invalid(code, "record", "rule records are JSON objects"));
        };
        let entries = map
            .iter()
            .map(|(key, value)| (normalize_key(key), value))
            .collect();
        Ok(Self { code, entries })
    }

    fn get(&self, key: &str) -> Option<&'a Value> {
        self.entries
            .get(&normalize_key(key))
            .copied()
            .filter(|value| !value.is_null())
    }

    fn require(&self, key: &str) -> Result<&'a Value> {
        self.get(key)
            .ok_or_else(|| ConfigError::missing(self.code, key))
    }

    /// Target fields, or `None` when the record disables itself.
    fn fields(&self) -> Result<Option<Vec<String>>> {
        let value = self.require("fields")?;
        let fields = string_list(self.code, "fields", value)?;
        let disabled = fields.is_empty()
            || fields.iter().all(|field| {
                let field = field.trim();
                field.is_empty() || field == "0"
            });
        Ok((!disabled).then_some(fields))
    }

    fn threshold(&self) -> Result<f64> {
        match self.get("threshold") {
            None => Ok(DEFAULT_THRESHOLD),
            Some(value) => value_number(value)
                .ok_or_else(|| ConfigError::invalid(self.code, "threshold", "expected a number")),
        }
    }

    fn write_flag(&self) -> bool {
        self.get("write").and_then(value_flag).unwrap_or(true)
    }

    fn text(&self, key: &str) -> Result<String> {
        value_text(self.require(key)?)
            .ok_or_else(|| ConfigError::invalid(self.code, key, "expected a string"))
    }

    fn optional_text(&self, key: &str) -> Option<String> {
        self.get(key).and_then(value_text)
    }

    fn optional_number(&self, key: &str) -> Result<Option<f64>> {
        self.get(key)
            .map(|value| {
                value_number(value)
                    .ok_or_else(|| ConfigError::invalid(self.code, key, "expected a number"))
            })
            .transpose()
    }

    fn optional_count(&self, key: &str) -> Result<Option<usize>> {
        match self.optional_number(key)? {
            None => Ok(None),
            Some(value) if value >= 0.0 && value.fract() == 0.0 => Ok(Some(value as usize)),
            Some(value) => Err(ConfigError::invalid(
                self.code,
                key,
                format!("expected a non-negative integer, found {value}"),
            )),
        }
    }

    fn count(&self, key: &str) -> Result<usize> {
        self.optional_count(key)?
            .ok_or_else(|| ConfigError::missing(self.code, key))
    }

    fn list(&self, key: &str) -> Result<Vec<String>> {
        string_list(self.code, key, self.require(key)?)
    }

    fn optional_list(&self, key: &str) -> Result<Option<Vec<String>>> {
        self.get(key)
            .map(|value| string_list(self.code, key, value))
            .transpose()
    }

    fn optional_flag(&self, key: &str, default: bool) -> bool {
        self.get(key).and_then(value_flag).unwrap_or(default)
    }

    fn date_format(&self) -> Result<DateFormat> {
        let raw = self.text("format_date")?;
        DateFormat::lookup(&raw).ok_or_else(|| ConfigError::UnknownDateFormat {
            code: self.code.to_string(),
            format: raw,
        })
    }

    fn range_bounds(&self) -> Result<RangeBounds> {
        let limit = |key: &str| -> Result<Option<RangeLimit>> {
            match self.get(key) {
                None => Ok(None),
                Some(value) => value_text(value)
                    .filter(|text| !text.trim().is_empty())
                    .map(|text| RangeLimit::parse(&text))
                    .map(Some)
                    .ok_or_else(|| ConfigError::invalid(self.code, key, "expected a number or column")),
            }
        };
        Ok(RangeBounds {
            min: limit("min_range")?,
            max: limit("max_range")?,
            include_left: self.optional_flag("include_limit_left", true),
            include_right: self.optional_flag("include_limit_right", true),
            inclusive: self.optional_flag("inclusive", true),
        })
    }
}
