use std::path::Path;

use csv::ReaderBuilder;
use polars::prelude::{Column, DataFrame};

use crate::error::{IngestError, Result};

/// Parsing options for a delimited file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvOptions {
    pub delimiter: u8,
    pub has_header: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            has_header: true,
        }
    }
}

impl CsvOptions {
    /// Build options from configured values, falling back to defaults.
    pub fn from_config(delimiter: Option<&str>, has_header: Option<bool>) -> Result<Self> {
        let delimiter = match delimiter {
            None | Some("") => b',',
            Some("\\t") | Some("\t") => b'\t',
            Some(raw) => match raw.as_bytes() {
                [byte] => *byte,
                _ => {
                    return Err(IngestError::InvalidDelimiter {
                        delimiter: raw.to_string(),
                    });
                }
            },
        };
        Ok(Self {
            delimiter,
            has_header: has_header.unwrap_or(true),
        })
    }
}

/// A delimited file held as text cells.
#[derive(Debug, Clone)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    trimmed.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

pub fn read_csv_table(path: &Path, options: CsvOptions) -> Result<CsvTable> {
    let csv_error = |source| IngestError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .delimiter(options.delimiter)
        .flexible(true)
        .from_path(path)
        .map_err(csv_error)?;

    let mut raw_rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        let row: Vec<String> = record.iter().map(normalize_cell).collect();
        if row.iter().all(|value| value.is_empty()) {
            continue;
        }
        raw_rows.push(row);
    }

    let width = raw_rows.iter().map(Vec::len).max().unwrap_or(0);
    let (headers, data) = if options.has_header {
        match raw_rows.split_first() {
            Some((header, rest)) => (
                header.iter().map(|value| normalize_header(value)).collect(),
                rest.to_vec(),
            ),
            None => (Vec::new(), Vec::new()),
        }
    } else {
        ((0..width).map(|idx| format!("_c{idx}")).collect(), raw_rows)
    };

    let rows = data
        .into_iter()
        .map(|record| {
            (0..headers.len())
                .map(|idx| record.get(idx).cloned().unwrap_or_default())
                .collect()
        })
        .collect();
    Ok(CsvTable { headers, rows })
}

impl CsvTable {
    /// Build a string-typed frame. Empty cells become nulls.
    pub fn into_frame(self) -> Result<DataFrame> {
        let columns = self
            .headers
            .iter()
            .enumerate()
            .map(|(idx, header)| {
                let values: Vec<Option<String>> = self
                    .rows
                    .iter()
                    .map(|row| row.get(idx).filter(|cell| !cell.is_empty()).cloned())
                    .collect();
                Column::new(header.as_str().into(), values)
            })
            .collect();
        Ok(DataFrame::new(columns)?)
    }
}
