//! FILENAME: pivot-engine/src/lib.rs
//! Pivot table generation over imported records.
//!
//! Given raw records and a field assignment (row keys, column keys, value
//! fields, aggregation choices), the engine groups records into a
//! row-key x column-key matrix and computes per-cell, per-row and
//! per-column aggregates, with an optional derived date hierarchy
//! (Year/Quarter/Month) over date-like fields. Source data is never mutated.
//!
//! Layers:
//! - `definition`: Serializable configuration (what the pivot table IS)
//! - `date` / `key`: Resolving records into grouping keys
//! - `aggregate`: Cell-level and total-level aggregation rules
//! - `engine`: Calculation engine (HOW we calculate)
//! - `view`: Renderable output for the frontend (WHAT we display)

pub mod aggregate;
pub mod date;
pub mod definition;
pub mod engine;
pub mod error;
pub mod key;
pub mod view;

pub use aggregate::{
    aggregate_bucket, aggregate_column_total, aggregate_row_total, grand_total,
    AggregateAccumulator, CellContribution,
};
pub use date::{parse_day_month_year, resolve_date_unit, MonthNames};
pub use definition::*;
pub use self::engine::{build_pivot, PivotCalculator, PivotCell, PivotResult, ValueVector};
pub use error::PivotError;
pub use key::{build_key, resolve_selector, CompositeKey, KEY_DELIMITER};
pub use view::*;
