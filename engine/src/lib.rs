//! FILENAME: engine/src/lib.rs
//! PURPOSE: Tabular record model shared by the pivot engine and the importer.
//! CONTEXT: Re-exports public types and modules for use by other crates.

pub mod logging;

pub mod fields;
pub mod record;
pub mod value;

// Re-export commonly used types at the crate root
pub use fields::{date_like_fields, is_date_like_field, numeric_fields};
pub use record::{Dataset, Record};
pub use value::{format_number, FieldValue, MISSING_LABEL};
