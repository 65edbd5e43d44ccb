//! Rule evaluators.
//!
//! One module per rule kind. Each evaluator reads the dataset (and, for
//! cross-dataset kinds, a resolved reference) and returns a [`Finding`]: the
//! number of tested rows and a per-row failure mask.

mod catalog;
mod composition;
mod conditional;
pub(crate) mod dates;
mod duplicate;
mod email;
mod forbidden;
mod integrity;
mod length;
mod null;
mod numeric_format;
mod operation;
mod position;
pub(crate) mod range;
mod storage_type;
pub(crate) mod trend;
mod types;

use std::collections::HashMap;

use chrono::NaiveDate;
use dq_common::Dataset;
use dq_model::{ReferenceSource, RuleKind, RuleParams};

use crate::error::{EvalError, Result};
use crate::outcome::Finding;
use crate::plan::RuleInstance;

/// Shared, read-only inputs for every evaluator in a run.
#[derive(Debug, Clone)]
pub struct EvalContext {
    /// Reference datasets keyed by source, or the reason loading failed.
    pub references: HashMap<ReferenceSource, std::result::Result<Dataset, String>>,
    /// Date used for `hoy`/`today` references.
    pub run_date: NaiveDate,
}

impl EvalContext {
    pub fn new(run_date: NaiveDate) -> Self {
        Self {
            references: HashMap::new(),
            run_date,
        }
    }

    pub fn reference(&self, source: &ReferenceSource) -> Result<&Dataset> {
        match self.references.get(source) {
            Some(Ok(dataset)) => Ok(dataset),
            Some(Err(reason)) => Err(EvalError::ReferenceUnavailable {
                name: source.display_name(),
                reason: reason.clone(),
            }),
            None => Err(EvalError::ReferenceUnavailable {
                name: source.display_name(),
                reason: "not loaded".to_string(),
            }),
        }
    }
}

/// Evaluate one rule instance against a dataset.
pub fn evaluate(instance: &RuleInstance<'_>, dataset: &Dataset, ctx: &EvalContext) -> Result<Finding> {
    let field = instance.field();
    match &instance.spec.params {
        RuleParams::Fields if instance.spec.kind == RuleKind::DuplicateCheck => {
            duplicate::evaluate(dataset, instance.fields)
        }
        RuleParams::Fields => null::evaluate(dataset, field),
        // Profiling never fails rows.
        RuleParams::Statistics { .. } => Ok(Finding::full(vec![false; dataset.row_count()])),
        RuleParams::Referential {
            reference,
            reference_fields,
        } => integrity::evaluate(
            dataset,
            instance.fields,
            ctx.reference(reference)?,
            reference_fields,
        ),
        RuleParams::Catalog { allowed } => catalog::evaluate(dataset, field, allowed),
        RuleParams::Range(bounds) => range::evaluate(dataset, field, bounds),
        RuleParams::Forbidden { tokens } => forbidden::evaluate(dataset, field, tokens),
        RuleParams::Type { expected } => types::evaluate(dataset, field, *expected),
        RuleParams::Composition { parts, delimiter } => {
            composition::evaluate(dataset, field, parts, delimiter)
        }
        RuleParams::Length { min, max } => length::evaluate(dataset, field, *min, *max),
        RuleParams::StorageType { expected } => storage_type::evaluate(dataset, field, *expected),
        RuleParams::NumericFormat {
            max_integer_digits,
            decimal_digits,
            separator,
        } => numeric_format::evaluate(
            dataset,
            field,
            *max_integer_digits,
            *decimal_digits,
            *separator,
        ),
        RuleParams::NumericOperation {
            operator,
            operand,
            tolerance,
        } => operation::evaluate(dataset, field, *operator, operand, *tolerance),
        RuleParams::DateFormat { format } => dates::evaluate_format(dataset, field, format),
        RuleParams::TimeRange {
            reference,
            format,
            unit,
            bounds,
        } => dates::evaluate_time_range(
            dataset,
            field,
            &dates::TimeRange {
                reference,
                format,
                unit: *unit,
                bounds,
                run_date: ctx.run_date,
            },
        ),
        RuleParams::Conditional {
            condition,
            filters,
            inner,
        } => conditional::evaluate(dataset, instance.fields, *condition, filters, inner, ctx),
        RuleParams::PositionValue {
            start,
            end,
            expected,
        } => position::evaluate(dataset, field, *start, *end, expected),
        RuleParams::Email {
            reference,
            domain_field,
            forbidden,
        } => email::evaluate(
            dataset,
            field,
            ctx.reference(reference)?,
            domain_field,
            forbidden,
        ),
        RuleParams::ValueTrend {
            reference_fields,
            method,
        } => trend::evaluate(dataset, field, reference_fields, *method),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use polars::prelude::*;

    use dq_common::Dataset;

    /// Single string column with optional cells.
    pub fn column(name: &str, values: &[Option<&str>]) -> Dataset {
        let column = Column::new(name.into(), values.to_vec());
        Dataset::new(DataFrame::new(vec![column]).unwrap())
    }

    pub fn frame<const N: usize>(columns: &[(&str, [Option<&str>; N])]) -> Dataset {
        let columns = columns
            .iter()
            .map(|(name, values)| Column::new((*name).into(), values.to_vec()))
            .collect();
        Dataset::new(DataFrame::new(columns).unwrap())
    }
}
