//! FILENAME: persistence/src/xlsx_reader.rs

use crate::dates::normalize_date_value;
use crate::PersistenceError;
use calamine::{Data, Reader, Xlsx};
use engine::{format_number, is_date_like_field, log_info, Dataset, FieldValue, Record};
use rustc_hash::FxHashSet;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;

/// Base name given to columns whose header cell is blank.
const BLANK_HEADER: &str = "__EMPTY";

/// Loads the first worksheet of an XLSX file.
pub fn load_xlsx(path: &Path) -> Result<Dataset, PersistenceError> {
    let file = File::open(path)?;
    let mut workbook = Xlsx::new(BufReader::new(file))?;
    read_first_sheet(&mut workbook)
}

/// Loads the first worksheet of an XLSX workbook held in memory (an upload).
pub fn load_xlsx_from_bytes(bytes: &[u8]) -> Result<Dataset, PersistenceError> {
    let mut workbook = Xlsx::new(Cursor::new(bytes))?;
    read_first_sheet(&mut workbook)
}

fn read_first_sheet<RS: Read + Seek>(workbook: &mut Xlsx<RS>) -> Result<Dataset, PersistenceError> {
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(PersistenceError::EmptyWorkbook)?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or(PersistenceError::EmptyWorkbook)?
        .map_err(|e| PersistenceError::InvalidFormat(e.to_string()))?;

    let mut rows = range.rows();
    let headers = match rows.next() {
        Some(header_row) => header_names(header_row),
        None => {
            log_info!("IMPORT", "sheet '{}' is empty", sheet_name);
            return Ok(Dataset::default());
        }
    };
    let date_columns: Vec<bool> = headers.iter().map(|h| is_date_like_field(h)).collect();

    let mut records = Vec::new();
    for row in rows {
        if row.iter().all(is_blank) {
            continue;
        }

        let record: Record = headers
            .iter()
            .enumerate()
            .map(|(col, header)| {
                let value = row.get(col).map_or_else(|| FieldValue::text(""), cell_value);
                let value = if date_columns[col] {
                    normalize_date_value(value)
                } else {
                    value
                };
                (header.clone(), value)
            })
            .collect();
        records.push(record);
    }

    log_info!(
        "IMPORT",
        "loaded sheet '{}': {} fields, {} records",
        sheet_name,
        headers.len(),
        records.len()
    );

    Ok(Dataset::new(headers, records))
}

/// Field names for a header row. Blank headers become "__EMPTY",
/// "__EMPTY_1", ...; repeated names get "_1", "_2", ... appended.
pub fn header_names(row: &[Data]) -> Vec<String> {
    let mut used: FxHashSet<String> = FxHashSet::default();

    row.iter()
        .map(|cell| {
            let text = header_text(cell);
            let base = if text.is_empty() { BLANK_HEADER.to_string() } else { text };

            let mut name = base.clone();
            let mut counter = 1;
            while used.contains(&name) {
                name = format!("{}_{}", base, counter);
                counter += 1;
            }
            used.insert(name.clone());
            name
        })
        .collect()
}

fn header_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Float(f) => format_number(*f),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => (if *b { "TRUE" } else { "FALSE" }).to_string(),
        Data::Error(e) => e.to_string(),
        Data::DateTime(dt) => format_number(dt.as_f64()),
    }
}

fn is_blank(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Maps a worksheet cell to a record value. Blank cells read as "".
fn cell_value(cell: &Data) -> FieldValue {
    match cell {
        Data::Empty => FieldValue::text(""),
        Data::String(s) => FieldValue::Text(s.clone()),
        Data::Float(f) => FieldValue::Number(*f),
        Data::Int(i) => FieldValue::Number(*i as f64),
        Data::Bool(b) => FieldValue::Boolean(*b),
        Data::Error(e) => FieldValue::Text(e.to_string()),
        Data::DateTime(dt) => FieldValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) => FieldValue::Text(s.clone()),
        Data::DurationIso(s) => FieldValue::Text(s.clone()),
    }
}
