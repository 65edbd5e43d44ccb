//! Load, audit, report, write.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use dq_ingest::{CsvOptions, FileResolver, SourceFormat, load_subject};
use dq_model::{AuditConfig, SinkConfig};
use dq_report::{ReportTable, build_run_report, sink_path, write_report_csv, write_report_json, write_sink};
use dq_validate::AuditEngine;
use polars::prelude::DataFrame;
use tracing::{info, info_span, warn};

use crate::types::{AuditResult, WrittenTable};

/// What to run and where relative paths resolve.
#[derive(Debug, Clone)]
pub struct AuditOptions {
    pub config: PathBuf,
    /// Defaults to the configuration file's directory.
    pub base_dir: Option<PathBuf>,
    /// Skip writing every output table.
    pub dry_run: bool,
}

impl AuditOptions {
    pub fn new(config: impl Into<PathBuf>) -> Self {
        Self {
            config: config.into(),
            base_dir: None,
            dry_run: false,
        }
    }

    fn resolved_base_dir(&self) -> PathBuf {
        self.base_dir.clone().unwrap_or_else(|| {
            self.config
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default()
        })
    }
}

/// Run one audit end to end.
///
/// A failed prerequisite gate is not an error here: the report and error
/// table are still written and the caller decides the exit status.
pub fn run_audit(options: &AuditOptions) -> Result<AuditResult> {
    let span = info_span!("audit", config = %options.config.display());
    let _guard = span.enter();
    let started = Instant::now();

    let config = AuditConfig::load(&options.config)
        .with_context(|| format!("load configuration {}", options.config.display()))?;
    let base_dir = options.resolved_base_dir();
    let resolver = FileResolver::with_base_dir(base_dir.clone());
    let subject = load_subject(&config.input, &resolver).context("load subject dataset")?;

    let run = AuditEngine::new(&resolver)
        .run(&config, &subject)
        .context("run audit")?;
    for diagnostic in &run.diagnostics {
        warn!(code = %diagnostic.code, "{}", diagnostic.message);
    }
    let report = build_run_report(&run, &config.metadata());

    let written = if options.dry_run {
        info!("dry run, skipping outputs");
        Vec::new()
    } else {
        write_outputs(&config, &run, &report, &base_dir)?
    };

    info!(
        results = report.len(),
        written = written.len(),
        elapsed_ms = started.elapsed().as_millis(),
        "audit finished"
    );
    Ok(AuditResult {
        run,
        report,
        written,
    })
}

fn write_outputs(
    config: &AuditConfig,
    run: &dq_validate::RunOutcome,
    report: &ReportTable,
    base_dir: &Path,
) -> Result<Vec<WrittenTable>> {
    let mut written = Vec::new();

    if let Some(sink) = &config.output {
        let path = write_report(report, sink, base_dir).context("write report")?;
        written.push(WrittenTable {
            table: "report".to_string(),
            path,
            rows: report.len(),
        });
    }
    if let Some(sink) = &config.error {
        written.push(write_table(&run.errors, sink, "errors", base_dir)?);
    }
    if let (Some(clean), Some(data)) = (&run.clean, &config.data) {
        written.push(write_table(clean.frame(), &data.sink, "clean", base_dir)?);
    }
    for statistics in &run.statistics {
        let Some(output) = &statistics.output else {
            continue;
        };
        let sink = SinkConfig {
            path: Some(output.clone()),
            ..SinkConfig::default()
        };
        let table = format!("statistics:{}", statistics.code);
        written.push(write_table(&statistics.table, &sink, &table, base_dir)?);
    }
    Ok(written)
}

fn write_table(
    frame: &DataFrame,
    sink: &SinkConfig,
    table: &str,
    base_dir: &Path,
) -> Result<WrittenTable> {
    let path = write_sink(frame, sink, table, Some(base_dir))
        .with_context(|| format!("write {table} table"))?;
    Ok(WrittenTable {
        table: table.to_string(),
        path,
        rows: frame.height(),
    })
}

/// The report goes out as JSON when the sink asks for it, otherwise as a
/// typed table in the sink's format.
fn write_report(report: &ReportTable, sink: &SinkConfig, base_dir: &Path) -> Result<PathBuf> {
    let path = sink_path(sink, "report", Some(base_dir))?;
    if is_json(sink, &path) {
        write_report_json(report, &path)?;
        return Ok(path);
    }
    match SourceFormat::resolve(sink.format.as_deref(), &path)? {
        SourceFormat::Csv => {
            let options = CsvOptions::from_config(sink.delimiter.as_deref(), sink.header)?;
            write_report_csv(report, &path, options)?;
            Ok(path)
        }
        SourceFormat::Parquet => Ok(write_sink(&report.to_frame()?, sink, "report", Some(base_dir))?),
    }
}

fn is_json(sink: &SinkConfig, path: &Path) -> bool {
    match sink.format.as_deref() {
        Some(format) => format.trim().eq_ignore_ascii_case("json"),
        None => path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json")),
    }
}
