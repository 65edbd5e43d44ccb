//! Shared utilities for the data-quality workspace.
//!
//! Provides the [`Dataset`] handle the rule evaluators work against, plus
//! Polars value conversions.

pub mod dataset;
pub mod error;
pub mod lookup;
pub mod polars;

pub use dataset::{Dataset, RowKey};
pub use error::{DatasetError, Result};
pub use lookup::CaseInsensitiveSet;
pub use crate::polars::{any_to_f64, any_to_string, any_to_text, format_numeric, parse_f64};
