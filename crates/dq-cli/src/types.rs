use std::path::PathBuf;

use dq_report::ReportTable;
use dq_validate::RunOutcome;

/// A table written by the run.
#[derive(Debug, Clone)]
pub struct WrittenTable {
    /// `report`, `errors`, `clean` or `statistics:<code>`.
    pub table: String,
    pub path: PathBuf,
    pub rows: usize,
}

#[derive(Debug)]
pub struct AuditResult {
    pub run: RunOutcome,
    pub report: ReportTable,
    pub written: Vec<WrittenTable>,
}
