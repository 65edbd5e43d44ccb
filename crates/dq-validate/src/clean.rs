//! Clean-dataset projection.

use dq_common::Dataset;
use polars::prelude::DataFrame;
use tracing::debug;

use crate::error::Result;

/// Subject rows whose key does not appear in the error table.
pub fn clean_dataset(subject: &Dataset, errors: &DataFrame, keys: &[String]) -> Result<Dataset> {
    let errors = Dataset::new(errors.clone());
    let clean = subject.anti_join(&errors, keys, keys)?;
    debug!(
        kept = clean.row_count(),
        dropped = subject.row_count() - clean.row_count(),
        "projected clean dataset"
    );
    Ok(clean)
}
