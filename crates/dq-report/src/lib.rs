//! Audit report assembly and output writers.
//!
//! Turns the outcomes of a run into the fixed 22-column report and writes the
//! report, error, clean and statistics tables.

pub mod error;
pub mod report;
pub mod schema;
pub mod writer;

pub use error::{ReportError, Result};
pub use report::{
    ReportRow, ReportTable, build_failure_report, build_report, build_run_report, format_rate,
};
pub use schema::REPORT_COLUMNS;
pub use writer::{sink_path, write_frame_csv, write_report_csv, write_report_json, write_sink};
