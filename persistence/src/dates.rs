//! FILENAME: persistence/src/dates.rs
//! Date normalization for date-like columns.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use engine::FieldValue;

/// Day-first display format handed to the pivot engine.
pub const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y";

/// Text layouts recognized in date-like columns, tried in order.
/// Month-first slashes win over day-first ones, so "05/01/2024" is 1 May.
const DATE_LAYOUTS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%B %d, %Y", "%b %d, %Y"];

const DATETIME_LAYOUTS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"];

/// Converts a spreadsheet serial day number to a calendar date.
///
/// Day 1 is 1899-12-31 and the time-of-day fraction is dropped. Serials
/// from 61 on match the spreadsheet calendar exactly.
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1900, 1, 1)?;
    let offset = serial.floor() - 2.0;
    if offset.abs() > i32::MAX as f64 {
        return None;
    }
    epoch.checked_add_signed(Duration::try_days(offset as i64)?)
}

fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    DATE_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDate::parse_from_str(text, layout).ok())
        .or_else(|| {
            DATETIME_LAYOUTS
                .iter()
                .find_map(|layout| NaiveDateTime::parse_from_str(text, layout).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(text).ok().map(|dt| dt.date_naive()))
}

/// Normalizes one value of a date-like column.
///
/// Numbers are treated as serial day numbers; recognizable date strings
/// are re-formatted. Anything else, including day-first strings that do
/// not parse, is returned unchanged.
pub fn normalize_date_value(value: FieldValue) -> FieldValue {
    let date = match &value {
        FieldValue::Number(n) => serial_to_date(*n),
        FieldValue::Text(s) => parse_date_text(s),
        _ => None,
    };
    match date {
        Some(date) => FieldValue::Text(date.format(DISPLAY_DATE_FORMAT).to_string()),
        None => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalized(value: impl Into<FieldValue>) -> FieldValue {
        normalize_date_value(value.into())
    }

    #[test]
    fn test_serial_numbers() {
        assert_eq!(normalized(45306.0), FieldValue::from("15/01/2024"));
        assert_eq!(normalized(45306.75), FieldValue::from("15/01/2024"));
        assert_eq!(normalized(61.0), FieldValue::from("01/03/1900"));
        assert_eq!(normalized(f64::NAN).as_number().map(f64::is_nan), Some(true));
    }

    #[test]
    fn test_text_layouts() {
        assert_eq!(normalized("2024-03-09"), FieldValue::from("09/03/2024"));
        assert_eq!(normalized("2024-03-09T13:45:00"), FieldValue::from("09/03/2024"));
        assert_eq!(normalized("2024-03-09T13:45:00+02:00"), FieldValue::from("09/03/2024"));
        assert_eq!(normalized("05/01/2024"), FieldValue::from("01/05/2024"));
        assert_eq!(normalized("March 9, 2024"), FieldValue::from("09/03/2024"));
        assert_eq!(normalized("Mar 9, 2024"), FieldValue::from("09/03/2024"));
    }

    #[test]
    fn test_unrecognized_values_pass_through() {
        assert_eq!(normalized("25/12/2024"), FieldValue::from("25/12/2024"));
        assert_eq!(normalized("soon"), FieldValue::from("soon"));
        assert_eq!(normalized(""), FieldValue::from(""));
        assert_eq!(normalized(true), FieldValue::Boolean(true));
    }
}
