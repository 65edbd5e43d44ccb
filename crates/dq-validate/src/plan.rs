//! Expansion of rule specifications into independent rule instances.

use dq_model::{RuleKind, RuleParams, RuleSpec};

/// One evaluable unit: a rule applied to a concrete set of fields.
#[derive(Debug, Clone, Copy)]
pub struct RuleInstance<'a> {
    pub spec: &'a RuleSpec,
    pub fields: &'a [String],
}

/// Owned field lists backing the instances of a plan.
#[derive(Debug, Clone)]
pub struct RulePlan<'a> {
    entries: Vec<(&'a RuleSpec, Vec<String>)>,
}

impl<'a> RulePlan<'a> {
    /// Expand every spec against a single column snapshot.
    ///
    /// Wildcards resolve to the snapshot. The prerequisites rule is handled
    /// by the gate and is left out.
    pub fn expand(specs: &'a [RuleSpec], columns: &[String]) -> Self {
        let mut entries = Vec::new();
        for spec in specs {
            match (&spec.kind, &spec.params) {
                (RuleKind::Prerequisites, _) => {}
                (RuleKind::ConditionalRule, RuleParams::Conditional { inner, .. }) => {
                    push_instances(&mut entries, spec, inner.kind, inner.target.resolve(columns));
                }
                (kind, _) => push_instances(&mut entries, spec, *kind, spec.target.resolve(columns)),
            }
        }
        Self { entries }
    }

    pub fn instances(&self) -> Vec<RuleInstance<'_>> {
        self.entries
            .iter()
            .map(|(spec, fields)| RuleInstance {
                spec: *spec,
                fields: fields.as_slice(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Multi-column kinds (duplicate, referential, statistics) take the whole
/// field list as one instance; everything else gets one instance per field.
/// For conditional rules `kind` is the wrapped rule's kind.
fn push_instances<'a>(
    entries: &mut Vec<(&'a RuleSpec, Vec<String>)>,
    spec: &'a RuleSpec,
    kind: RuleKind,
    fields: Vec<String>,
) {
    match kind {
        RuleKind::DuplicateCheck
        | RuleKind::ReferentialIntegrity
        | RuleKind::StatisticsSummary => entries.push((spec, fields)),
        _ => entries.extend(fields.into_iter().map(|field| (spec, vec![field]))),
    }
}

impl RuleInstance<'_> {
    /// Comma-joined field list used in labels and rule codes.
    pub fn label(&self) -> String {
        self.fields.join(",")
    }

    /// The single field of a per-field instance.
    pub fn field(&self) -> &str {
        self.fields.first().map(String::as_str).unwrap_or_default()
    }
}
