//! Table writers.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use csv::WriterBuilder;
use dq_common::any_to_text;
use dq_ingest::{CsvOptions, SourceFormat};
use dq_model::SinkConfig;
use polars::prelude::{DataFrame, ParquetWriter};
use tracing::info;

use crate::error::{ReportError, Result};
use crate::report::ReportTable;
use crate::schema::REPORT_COLUMNS;

/// Write the report as delimited text. The header is written even when the
/// report is empty.
pub fn write_report_csv(report: &ReportTable, path: &Path, options: CsvOptions) -> Result<()> {
    let file = create(path)?;
    let csv_err = |source| ReportError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = WriterBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(false)
        .from_writer(file);
    if options.has_header {
        writer.write_record(REPORT_COLUMNS).map_err(csv_err)?;
    }
    for row in &report.rows {
        writer.serialize(row).map_err(csv_err)?;
    }
    writer.flush().map_err(|source| io_error(path, source))?;
    info!(path = %path.display(), rows = report.len(), "wrote report");
    Ok(())
}

/// Write the report as a pretty-printed JSON array.
pub fn write_report_json(report: &ReportTable, path: &Path) -> Result<()> {
    let mut file = create(path)?;
    serde_json::to_writer_pretty(&mut file, report)?;
    file.write_all(b"\n").map_err(|source| io_error(path, source))?;
    info!(path = %path.display(), rows = report.len(), "wrote report");
    Ok(())
}

/// Write any frame as delimited text; nulls become empty cells.
pub fn write_frame_csv(frame: &DataFrame, path: &Path, options: CsvOptions) -> Result<()> {
    let file = create(path)?;
    let csv_err = |source| ReportError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = WriterBuilder::new()
        .delimiter(options.delimiter)
        .from_writer(file);
    if options.has_header {
        let names: Vec<&str> = frame.get_column_names().iter().map(|name| name.as_str()).collect();
        writer.write_record(&names).map_err(csv_err)?;
    }
    let columns = frame.get_columns();
    for idx in 0..frame.height() {
        let record: Vec<String> = columns
            .iter()
            .map(|column| {
                column
                    .get(idx)
                    .ok()
                    .and_then(any_to_text)
                    .unwrap_or_default()
            })
            .collect();
        writer.write_record(&record).map_err(csv_err)?;
    }
    writer.flush().map_err(|source| io_error(path, source))?;
    Ok(())
}

/// Write a frame where a sink points, in the sink's format.
///
/// Relative sink paths are joined onto `base_dir` when one is given.
pub fn write_sink(
    frame: &DataFrame,
    sink: &SinkConfig,
    table: &str,
    base_dir: Option<&Path>,
) -> Result<PathBuf> {
    let path = sink_path(sink, table, base_dir)?;
    match SourceFormat::resolve(sink.format.as_deref(), &path)? {
        SourceFormat::Csv => {
            let options = CsvOptions::from_config(sink.delimiter.as_deref(), sink.header)?;
            write_frame_csv(frame, &path, options)?;
        }
        SourceFormat::Parquet => {
            let file = create(&path)?;
            let mut frame = frame.clone();
            ParquetWriter::new(file).finish(&mut frame)?;
        }
    }
    info!(table, path = %path.display(), rows = frame.height(), "wrote table");
    Ok(path)
}

/// Resolve a sink's target path.
pub fn sink_path(sink: &SinkConfig, table: &str, base_dir: Option<&Path>) -> Result<PathBuf> {
    let raw = sink
        .path
        .as_deref()
        .filter(|path| !path.trim().is_empty())
        .ok_or_else(|| ReportError::MissingPath {
            table: table.to_string(),
        })?;
    let path = PathBuf::from(raw);
    Ok(match base_dir {
        Some(base) if path.is_relative() => base.join(path),
        _ => path,
    })
}

fn create(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| io_error(parent, source))?;
    }
    File::create(path).map_err(|source| io_error(path, source))
}

fn io_error(path: &Path, source: std::io::Error) -> ReportError {
    ReportError::Io {
        path: path.to_path_buf(),
        source,
    }
}
