//! FILENAME: pivot-engine/src/error.rs

use thiserror::Error;

/// Errors raised while interpreting a pivot configuration.
/// Pivot computation itself never fails; bad data degrades to placeholders.
#[derive(Error, Debug)]
pub enum PivotError {
    #[error("Unknown aggregation: {0}")]
    UnknownAggregation(String),

    #[error("Month table needs 12 names, got {0}")]
    InvalidMonthNames(usize),

    #[error("Invalid pivot configuration: {0}")]
    Config(#[from] serde_json::Error),
}
