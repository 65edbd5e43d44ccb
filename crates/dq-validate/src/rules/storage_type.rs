use dq_common::{Dataset, DatasetError};
use dq_model::StorageType;
use polars::prelude::DataType;

use crate::error::Result;
use crate::outcome::Finding;

/// Schema-level check: every row fails when the column's storage type
/// differs from the expected one, otherwise none do.
///
/// The column name is matched case-insensitively.
pub fn evaluate(dataset: &Dataset, field: &str, expected: StorageType) -> Result<Finding> {
    let lookup = dataset.column_lookup();
    let column = lookup.get(field).ok_or_else(|| DatasetError::MissingColumn {
        name: field.to_string(),
    })?;
    let actual = storage_type(dataset.dtype(column)?);
    let mismatch = actual != Some(expected);
    Ok(Finding::full(vec![mismatch; dataset.row_count()]))
}

/// Canonical storage type of a polars dtype.
pub(crate) fn storage_type(dtype: &DataType) -> Option<StorageType> {
    let storage = match dtype {
        DataType::Boolean => StorageType::Boolean,
        DataType::Int8 => StorageType::Byte,
        DataType::Int16 => StorageType::Short,
        DataType::Int32 => StorageType::Integer,
        DataType::Int64 => StorageType::Long,
        DataType::UInt8 | DataType::UInt16 | DataType::UInt32 | DataType::UInt64 => {
            StorageType::UnsignedInteger
        }
        DataType::Float32 => StorageType::Float,
        DataType::Float64 => StorageType::Double,
        DataType::String => StorageType::String,
        DataType::Binary => StorageType::Binary,
        DataType::Date => StorageType::Date,
        DataType::Datetime(_, _) => StorageType::Timestamp,
        DataType::Time => StorageType::Time,
        DataType::Null => StorageType::Null,
        _ => return None,
    };
    Some(storage)
}
