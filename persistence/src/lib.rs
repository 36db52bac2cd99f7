//! FILENAME: persistence/src/lib.rs
//! Spreadsheet import.
//!
//! Reads the first worksheet of an XLSX workbook into a `Dataset`: the first
//! row names the fields, every following non-blank row becomes a record.
//! Date-like columns are normalized to DD/MM/YYYY text on the way in so the
//! pivot engine can derive Year/Quarter/Month from them.

mod dates;
mod error;
mod xlsx_reader;

pub use dates::{normalize_date_value, serial_to_date, DISPLAY_DATE_FORMAT};
pub use error::PersistenceError;
pub use xlsx_reader::{header_names, load_xlsx, load_xlsx_from_bytes};
