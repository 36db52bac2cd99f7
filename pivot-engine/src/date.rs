//! FILENAME: pivot-engine/src/date.rs
//! Date hierarchy resolution.
//!
//! Date-like fields arrive from the importer as day/month/year strings
//! ("31/12/2024" or "31-12-2024"). A derived Year, Quarter or Month unit is
//! resolved per record into a display label, or "N/A" when the raw value is
//! not a valid calendar date. Dates are built from explicit components, so
//! the result never depends on a timezone.

use chrono::{Datelike, Month, NaiveDate};
use engine::MISSING_LABEL;
use serde::{Deserialize, Serialize};

use crate::definition::DateUnit;
use crate::error::PivotError;

/// Month naming for the Month unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum MonthNames {
    /// "January" .. "December".
    #[default]
    English,
    /// Twelve caller-supplied names, January first.
    Custom(Vec<String>),
}

impl MonthNames {
    /// Validated constructor for a custom month table.
    pub fn custom(names: Vec<String>) -> Result<Self, PivotError> {
        if names.len() != 12 {
            return Err(PivotError::InvalidMonthNames(names.len()));
        }
        Ok(MonthNames::Custom(names))
    }

    /// Name of a 0-based month. A short custom table falls back to English.
    pub fn name(&self, month0: u32) -> String {
        if let MonthNames::Custom(names) = self {
            if let Some(name) = names.get(month0 as usize) {
                return name.clone();
            }
        }
        u8::try_from(month0 + 1)
            .ok()
            .and_then(|m| Month::try_from(m).ok())
            .map(|m| m.name().to_string())
            .unwrap_or_else(|| MISSING_LABEL.to_string())
    }
}

/// Century added to one- and two-digit years.
const TWO_DIGIT_YEAR_BASE: u32 = 1900;

/// Parses a day/month/year string with "-" or "/" separators.
///
/// Returns None unless there are exactly three parts, each a positive
/// number, forming a real calendar date (31-04-2024 is rejected).
/// Years below 100 read as 19xx, so "31/12/24" is 31 December 1924.
pub fn parse_day_month_year(raw: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = raw.split(['-', '/']).collect();
    if parts.len() != 3 {
        return None;
    }

    let day = positive_integer(parts[0])?;
    let month = positive_integer(parts[1])?;
    let year = match positive_integer(parts[2])? {
        short @ 1..=99 => short + TWO_DIGIT_YEAR_BASE,
        year => year,
    };

    NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month, day)
}

/// A part must read as a finite number greater than zero. Fractions pass
/// this check but can never form a date, so they are rejected here too.
fn positive_integer(part: &str) -> Option<u32> {
    let n: f64 = part.trim().parse().ok()?;
    if !n.is_finite() || n <= 0.0 || n.fract() != 0.0 || n > u32::MAX as f64 {
        return None;
    }
    Some(n as u32)
}

/// Display label of one date unit of a parsed date.
pub fn date_unit_label(date: NaiveDate, unit: DateUnit, months: &MonthNames) -> String {
    match unit {
        DateUnit::Year => format!("{:04}", date.year()),
        DateUnit::Quarter => format!("Q{}", date.month0() / 3 + 1),
        DateUnit::Month => months.name(date.month0()),
    }
}

/// Resolves a raw date-like value to the label of one hierarchy unit.
/// Missing, empty, or unparseable values resolve to "N/A".
pub fn resolve_date_unit(raw: Option<&str>, unit: DateUnit, months: &MonthNames) -> String {
    match raw.filter(|s| !s.is_empty()).and_then(parse_day_month_year) {
        Some(date) => date_unit_label(date, unit, months),
        None => MISSING_LABEL.to_string(),
    }
}
