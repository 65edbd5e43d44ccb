pub mod csv_table;
pub mod error;
pub mod source;

pub use csv_table::{CsvOptions, CsvTable, read_csv_table};
pub use error::{IngestError, Result};
pub use source::{FileResolver, ReferenceResolver, SourceFormat, load_dataset};

use dq_common::Dataset;
use dq_model::InputConfig;

/// Load the subject dataset described by the `input` block.
pub fn load_subject(input: &InputConfig, resolver: &FileResolver) -> Result<Dataset> {
    resolver.resolve(&input.source())
}
