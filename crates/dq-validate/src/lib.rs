//! Rule evaluation for data-quality audits.
//!
//! The [`AuditEngine`] runs the prerequisites gate, expands the configured
//! rules into independent instances, evaluates them in parallel and folds the
//! outcomes into a result table and an error table.

pub mod aggregate;
pub mod clean;
pub mod engine;
pub mod error;
pub mod filter;
pub mod outcome;
pub mod plan;
pub mod prerequisites;
pub mod rules;
pub mod statistics;

pub use aggregate::{Aggregate, ERROR_COLUMN, RUN_TIME_COLUMN, aggregate};
pub use clean::clean_dataset;
pub use engine::{AuditEngine, RUN_TIME_FORMAT, RunOutcome, RunStatus, StatisticsOutput};
pub use error::{EvalError, Result};
pub use outcome::{Finding, RuleOutcome, success_rate};
pub use plan::{RuleInstance, RulePlan};
pub use prerequisites::{EMPTY_DATASET_MESSAGE, Gate};
pub use rules::EvalContext;
pub use statistics::{ColumnProfile, statistics_table};
