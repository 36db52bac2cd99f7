//! FILENAME: engine/src/fields.rs
//! PURPOSE: Field classification heuristics shared by the importer and the
//! field-assignment layer.

use crate::record::Dataset;

/// Name fragments (lowercase) that mark a field as holding dates.
const DATE_NAME_MARKERS: [&str; 3] = ["date", " on", "dob"];

/// Whether a field name looks like it holds dates ("Order Date", "DOB",
/// "Shipped On").
pub fn is_date_like_field(name: &str) -> bool {
    let lower = name.to_lowercase();
    DATE_NAME_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Date-like fields in source order.
pub fn date_like_fields(fields: &[String]) -> Vec<String> {
    fields
        .iter()
        .filter(|f| is_date_like_field(f))
        .cloned()
        .collect()
}

/// Fields whose value in the first record is a number.
/// Used to flag candidate value fields.
pub fn numeric_fields(dataset: &Dataset) -> Vec<String> {
    let Some(first) = dataset.records.first() else {
        return Vec::new();
    };
    dataset
        .fields
        .iter()
        .filter(|f| first.number(f).is_some())
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;

    #[test]
    fn test_date_like_names() {
        assert!(is_date_like_field("Order Date"));
        assert!(is_date_like_field("DOB"));
        assert!(is_date_like_field("Shipped On"));
        assert!(is_date_like_field("updated_date"));
        assert!(!is_date_like_field("Region"));
        // " on" needs the leading space
        assert!(!is_date_like_field("Region Code"));
        assert!(!is_date_like_field("Sales"));
    }

    #[test]
    fn test_numeric_fields_from_first_record() {
        let dataset = Dataset::new(
            vec!["Region".into(), "Sales".into(), "Units".into()],
            vec![
                Record::new().with("Region", "East").with("Sales", 1.0).with("Units", "n/a"),
                Record::new().with("Region", "West").with("Sales", 2.0).with("Units", 5.0),
            ],
        );
        assert_eq!(numeric_fields(&dataset), vec!["Sales".to_string()]);
        assert!(numeric_fields(&Dataset::default()).is_empty());
    }
}
