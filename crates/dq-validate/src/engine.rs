//! Orchestration of one audit run.

use std::collections::HashSet;
use std::time::Instant;

use chrono::{Local, NaiveDateTime};
use dq_common::Dataset;
use dq_ingest::ReferenceResolver;
use dq_model::{AuditConfig, Condition, Diagnostic, ReferenceSource, RuleParams, RuleSpec};
use polars::prelude::DataFrame;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::aggregate::aggregate;
use crate::clean::clean_dataset;
use crate::error::Result;
use crate::filter;
use crate::outcome::RuleOutcome;
use crate::plan::{RuleInstance, RulePlan};
use crate::prerequisites::{self, Gate};
use crate::rules::{self, EvalContext};
use crate::statistics::statistics_table;

/// Rendering of the run timestamp in the error table.
pub const RUN_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Completed,
    /// The gate failed; `results` holds the single failure record.
    PrerequisitesFailed,
}

/// Profiling table produced by one statistics rule.
#[derive(Debug, Clone)]
pub struct StatisticsOutput {
    pub code: String,
    /// Configured destination, if any.
    pub output: Option<String>,
    pub table: DataFrame,
}

/// Everything one run produces.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub status: RunStatus,
    /// Outcomes in configuration order.
    pub results: Vec<RuleOutcome>,
    pub errors: DataFrame,
    pub statistics: Vec<StatisticsOutput>,
    pub clean: Option<Dataset>,
    pub diagnostics: Vec<Diagnostic>,
    pub run_time: NaiveDateTime,
    /// Rows audited after the global filter.
    pub tested_rows: usize,
}

impl RunOutcome {
    pub fn run_time_label(&self) -> String {
        self.run_time.format(RUN_TIME_FORMAT).to_string()
    }

    pub fn prerequisites_failed(&self) -> bool {
        self.status == RunStatus::PrerequisitesFailed
    }
}

/// What evaluating one instance yielded.
enum Evaluated {
    Outcome(RuleOutcome),
    Statistics(StatisticsOutput),
    Skipped(Diagnostic),
}

/// Runs a configured rule set against a subject dataset.
pub struct AuditEngine<'r> {
    resolver: &'r dyn ReferenceResolver,
    run_time: NaiveDateTime,
}

impl<'r> AuditEngine<'r> {
    pub fn new(resolver: &'r dyn ReferenceResolver) -> Self {
        Self {
            resolver,
            run_time: Local::now().naive_local(),
        }
    }

    /// Fix the run timestamp instead of using the wall clock.
    pub fn with_run_time(mut self, run_time: NaiveDateTime) -> Self {
        self.run_time = run_time;
        self
    }

    pub fn run(&self, config: &AuditConfig, subject: &Dataset) -> Result<RunOutcome> {
        let started = Instant::now();
        let metadata = config.metadata();
        let entity = metadata.entity_code();
        let rule_set = config.rule_set();
        let mut diagnostics = rule_set.diagnostics.clone();
        let run_time_label = self.run_time.format(RUN_TIME_FORMAT).to_string();
        info!(
            entity = %entity,
            rules = rule_set.specs.len(),
            rows = subject.row_count(),
            "starting audit run"
        );

        if let Some(spec) = rule_set.prerequisites() {
            let required = spec.target.resolve(&subject.columns());
            if let Gate::Missing(message) = prerequisites::check(subject, &required) {
                let failure = prerequisites::failure_outcome(
                    spec,
                    &required,
                    &message,
                    subject.row_count(),
                    &entity,
                );
                let aggregate = aggregate(vec![failure], subject, &run_time_label)?;
                return Ok(RunOutcome {
                    status: RunStatus::PrerequisitesFailed,
                    results: aggregate.results,
                    errors: aggregate.errors,
                    statistics: Vec::new(),
                    clean: None,
                    diagnostics,
                    run_time: self.run_time,
                    tested_rows: subject.row_count(),
                });
            }
        }

        let dataset = self.apply_global_filter(config, subject, &mut diagnostics);
        let columns = dataset.columns();
        let plan = RulePlan::expand(&rule_set.specs, &columns);
        let ctx = self.load_references(&rule_set.specs);

        let evaluated: Vec<Evaluated> = plan
            .instances()
            .par_iter()
            .map(|instance| evaluate_instance(instance, &dataset, &ctx, &entity))
            .collect();

        let mut outcomes = Vec::with_capacity(evaluated.len());
        let mut statistics = Vec::new();
        for item in evaluated {
            match item {
                Evaluated::Outcome(outcome) => outcomes.push(outcome),
                Evaluated::Statistics(table) => statistics.push(table),
                Evaluated::Skipped(diagnostic) => diagnostics.push(diagnostic),
            }
        }

        let aggregate = aggregate(outcomes, &dataset, &run_time_label)?;
        let clean = match config.data.as_ref() {
            Some(data) if config.wants_clean_data() => {
                match clean_dataset(&dataset, &aggregate.errors, &data.fields) {
                    Ok(clean) => Some(clean),
                    Err(err) => {
                        warn!(error = %err, "clean dataset projection failed");
                        diagnostics.push(Diagnostic::new("data", err.to_string()));
                        None
                    }
                }
            }
            _ => None,
        };

        info!(
            outcomes = aggregate.results.len(),
            error_rows = aggregate.errors.height(),
            diagnostics = diagnostics.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "audit run finished"
        );
        Ok(RunOutcome {
            status: RunStatus::Completed,
            results: aggregate.results,
            errors: aggregate.errors,
            statistics,
            clean,
            diagnostics,
            run_time: self.run_time,
            tested_rows: dataset.row_count(),
        })
    }

    fn apply_global_filter(
        &self,
        config: &AuditConfig,
        subject: &Dataset,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Dataset {
        let (filters, filter_diagnostics) = config.global_filters();
        diagnostics.extend(filter_diagnostics);
        if filters.is_empty() {
            return subject.clone();
        }
        match filter::apply(subject, Condition::And, &filters) {
            Ok(filtered) => {
                info!(
                    kept = filtered.row_count(),
                    total = subject.row_count(),
                    "applied global filter"
                );
                filtered
            }
            Err(err) => {
                warn!(error = %err, "global filter skipped");
                diagnostics.push(Diagnostic::new("filter", err.to_string()));
                subject.clone()
            }
        }
    }

    /// Resolve every distinct reference once, before evaluation starts.
    fn load_references(&self, specs: &[RuleSpec]) -> EvalContext {
        let mut ctx = EvalContext::new(self.run_time.date());
        let mut seen = HashSet::new();
        for source in specs.iter().filter_map(reference_of) {
            if !seen.insert(source.clone()) {
                continue;
            }
            let loaded = self.resolver.resolve(source).map_err(|err| {
                warn!(reference = %source.display_name(), error = %err, "reference unavailable");
                err.to_string()
            });
            ctx.references.insert(source.clone(), loaded);
        }
        ctx
    }
}

fn reference_of(spec: &RuleSpec) -> Option<&ReferenceSource> {
    match &spec.params {
        RuleParams::Referential { reference, .. } | RuleParams::Email { reference, .. } => {
            Some(reference)
        }
        RuleParams::Conditional { inner, .. } => reference_of(inner),
        _ => None,
    }
}

fn evaluate_instance(
    instance: &RuleInstance<'_>,
    dataset: &Dataset,
    ctx: &EvalContext,
    entity: &str,
) -> Evaluated {
    let spec = instance.spec;
    let started = Instant::now();

    if let RuleParams::Statistics { output } = &spec.params {
        return match statistics_table(dataset, instance.fields) {
            Ok(table) => Evaluated::Statistics(StatisticsOutput {
                code: spec.code.clone(),
                output: output.clone(),
                table,
            }),
            Err(err) => skipped(spec, instance, &err),
        };
    }

    let finding = match rules::evaluate(instance, dataset, ctx) {
        Ok(finding) => finding,
        Err(err) => return skipped(spec, instance, &err),
    };
    let failed_count = finding.failed_count();
    let violating_rows = if spec.write_violations && failed_count > 0 {
        match dataset.filter(&finding.failed) {
            Ok(rows) => Some(rows),
            Err(err) => return skipped(spec, instance, &err),
        }
    } else {
        None
    };

    let outcome = build_outcome(instance, entity, finding.tested_count, failed_count, violating_rows);
    debug!(
        code = %spec.code,
        fields = %outcome.tested_field_label,
        tested = outcome.tested_count,
        failed = outcome.failed_count,
        elapsed_us = started.elapsed().as_micros() as u64,
        "rule evaluated"
    );
    Evaluated::Outcome(outcome)
}

fn build_outcome(
    instance: &RuleInstance<'_>,
    entity: &str,
    tested_count: usize,
    failed_count: usize,
    violating_rows: Option<Dataset>,
) -> RuleOutcome {
    let spec = instance.spec;
    let kind = spec.kind;
    let label = instance.label();
    RuleOutcome {
        config_code: spec.code.clone(),
        kind,
        function_code: kind.code().to_string(),
        rule_code: format!("{}/{}/{}", kind.code(), entity, label),
        data_requirement: format!("{} - {}", kind.label(), label),
        tested_field_label: label,
        threshold_percent: spec.threshold_percent,
        rule_group: kind.group().to_string(),
        rule_property: kind.property().to_string(),
        tested_count,
        failed_count,
        write_violations: spec.write_violations,
        violating_rows,
    }
}

fn skipped(spec: &RuleSpec, instance: &RuleInstance<'_>, err: &dyn std::fmt::Display) -> Evaluated {
    warn!(code = %spec.code, fields = %instance.label(), error = %err, "rule skipped");
    Evaluated::Skipped(Diagnostic::new(
        spec.code.clone(),
        format!("{}: {err}", instance.label()),
    ))
}
