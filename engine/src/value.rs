//! FILENAME: engine/src/value.rs
//! PURPOSE: Defines the primitive value held by one field of an imported record.
//! CONTEXT: The importer produces these; the pivot engine reads them to build
//! grouping keys (via `display_value`) and numeric buckets (via `as_number`).

use serde::{Deserialize, Serialize};

/// Placeholder rendered for a field that is missing or has no value.
pub const MISSING_LABEL: &str = "N/A";

/// A single field value inside a record.
///
/// Serialized untagged so a record reads naturally as JSON:
/// `{"Region": "East", "Sales": 10, "Notes": null}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Empty,
    Number(f64),
    Text(String),
    Boolean(bool),
}

impl FieldValue {
    pub fn text(s: impl Into<String>) -> Self {
        FieldValue::Text(s.into())
    }

    /// Returns the numeric payload. Text is never coerced.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, FieldValue::Empty)
    }

    /// Returns the display value as a String.
    /// `Empty` renders as the empty string; callers that need the
    /// missing-value placeholder use `key_label`.
    pub fn display_value(&self) -> String {
        match self {
            FieldValue::Empty => String::new(),
            FieldValue::Number(n) => format_number(*n),
            FieldValue::Text(s) => s.clone(),
            FieldValue::Boolean(b) => b.to_string(),
        }
    }

    /// Label used when this value takes part in a grouping key.
    pub fn key_label(&self) -> String {
        match self {
            FieldValue::Empty => MISSING_LABEL.to_string(),
            other => other.display_value(),
        }
    }
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Empty
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value as f64)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

/// Magnitudes at or above this render in exponent form.
const EXPONENT_ABOVE: f64 = 1e21;
/// Non-zero magnitudes below this render in exponent form.
const EXPONENT_BELOW: f64 = 1e-6;

/// Formats a number the way the field-assignment UI shows it:
/// integers without a fraction, everything else in shortest round-trip form.
/// Very large and very small magnitudes switch to exponent form with an
/// explicit sign ("1e+21", "1.5e-7").
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        // Also folds -0.0
        return "0".to_string();
    }
    let magnitude = n.abs();
    if magnitude >= EXPONENT_ABOVE || magnitude < EXPONENT_BELOW {
        let formatted = format!("{:e}", n);
        return match formatted.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
            _ => formatted,
        };
    }
    format!("{}", n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_display() {
        assert_eq!(FieldValue::Number(10.0).display_value(), "10");
        assert_eq!(FieldValue::Number(1.5).display_value(), "1.5");
        assert_eq!(FieldValue::Number(-0.0).display_value(), "0");
        assert_eq!(FieldValue::Number(f64::INFINITY).display_value(), "Infinity");
    }

    #[test]
    fn test_extreme_magnitudes_use_exponent_form() {
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(-2.5e22), "-2.5e+22");
        assert_eq!(format_number(1e20), "100000000000000000000");
        assert_eq!(format_number(0.000001), "0.000001");
        assert_eq!(format_number(1.5e-7), "1.5e-7");
        assert_eq!(FieldValue::Number(1e21).key_label(), "1e+21");
    }

    #[test]
    fn test_key_label_uses_placeholder_for_empty() {
        assert_eq!(FieldValue::Empty.key_label(), "N/A");
        assert_eq!(FieldValue::text("").key_label(), "");
        assert_eq!(FieldValue::Boolean(true).key_label(), "true");
    }

    #[test]
    fn test_text_is_not_coerced_to_number() {
        assert_eq!(FieldValue::text("42").as_number(), None);
        assert_eq!(FieldValue::Number(42.0).as_number(), Some(42.0));
    }

    #[test]
    fn test_untagged_json() {
        let values: Vec<FieldValue> =
            serde_json::from_str(r#"[null, 3.5, "East", false]"#).unwrap();
        assert_eq!(
            values,
            vec![
                FieldValue::Empty,
                FieldValue::Number(3.5),
                FieldValue::text("East"),
                FieldValue::Boolean(false),
            ]
        );
    }
}
