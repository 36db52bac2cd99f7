//! FILENAME: engine/src/record.rs
//! PURPOSE: Records (one imported spreadsheet row) and the dataset that owns them.
//! CONTEXT: Records are immutable input for the pivot engine. Field order is
//! kept on the dataset, since a hash map carries none.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::value::FieldValue;

/// One source row: field name -> value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    values: FxHashMap<String, FieldValue>,
}

impl Record {
    pub fn new() -> Self {
        Record {
            values: FxHashMap::default(),
        }
    }

    /// Builder-style insert, handy for fixtures.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.values.insert(field.into(), value.into());
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: FieldValue) {
        self.values.insert(field.into(), value);
    }

    /// Returns the value for a field, if the field is present at all.
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    /// Numeric value of a field. Missing fields and non-numbers yield None.
    pub fn number(&self, field: &str) -> Option<f64> {
        self.values.get(field).and_then(FieldValue::as_number)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.values.iter()
    }
}

impl<K: Into<String>> FromIterator<(K, FieldValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, FieldValue)>>(iter: I) -> Self {
        Record {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// An imported table: ordered field names plus the records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Field names in source column order.
    pub fields: Vec<String>,
    pub records: Vec<Record>,
}

impl Dataset {
    pub fn new(fields: Vec<String>, records: Vec<Record>) -> Self {
        Dataset { fields, records }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Returns the record's values in field order.
    /// Missing fields render as the empty value.
    pub fn row_values<'a>(&'a self, record: &'a Record) -> impl Iterator<Item = &'a FieldValue> + 'a {
        const EMPTY: &FieldValue = &FieldValue::Empty;
        self.fields
            .iter()
            .map(move |f| record.get(f).unwrap_or(EMPTY))
    }
}
