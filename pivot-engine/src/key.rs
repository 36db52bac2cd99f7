//! FILENAME: pivot-engine/src/key.rs
//! Composite grouping keys.
//!
//! A record's row (or column) key is the tuple of its resolved selector
//! labels. Grouping is done on the tuple itself; the " | "-joined string is
//! only used for ordering and display, so two different tuples that happen
//! to join to the same text still land in separate buckets.

use std::cmp::Ordering;

use engine::{Record, MISSING_LABEL};
use serde::{Serialize, Serializer};
use smallvec::SmallVec;

use crate::date::{resolve_date_unit, MonthNames};
use crate::definition::FieldRef;

/// Separator placed between the parts of a composite key.
pub const KEY_DELIMITER: &str = " | ";

/// Resolved labels of one record for an ordered selector list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CompositeKey {
    parts: SmallVec<[String; 4]>,
}

impl CompositeKey {
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CompositeKey {
            parts: parts.into_iter().map(Into::into).collect(),
        }
    }

    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    /// Number of selectors the key was built from.
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// The display form: parts joined by " | ". An ungrouped key is "".
    pub fn joined(&self) -> String {
        self.parts.join(KEY_DELIMITER)
    }

    /// Labels as laid out in headers: one per part, never re-split, so a
    /// value containing the delimiter keeps its own header cell. The
    /// ungrouped key yields a single empty label.
    pub fn display_parts(&self) -> Vec<String> {
        if self.parts.is_empty() {
            vec![String::new()]
        } else {
            self.parts.to_vec()
        }
    }

    /// Ordering used for pivot axes: the joined text compared by UTF-16
    /// code units, then the part tuple to keep colliding texts stable.
    pub fn axis_cmp(&self, other: &Self) -> Ordering {
        let a = self.joined();
        let b = other.joined();
        a.encode_utf16()
            .cmp(b.encode_utf16())
            .then_with(|| self.parts.cmp(&other.parts))
    }
}

impl std::fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.joined())
    }
}

/// Renderers receive the joined string.
impl Serialize for CompositeKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.joined())
    }
}

/// Resolves one selector against a record. Never fails: missing fields
/// and unparseable dates become "N/A".
pub fn resolve_selector(record: &Record, selector: &FieldRef, months: &MonthNames) -> String {
    match selector {
        FieldRef::Plain(name) => record
            .get(name)
            .map_or_else(|| MISSING_LABEL.to_string(), |v| v.key_label()),
        FieldRef::DateUnit { field, unit } => {
            let raw = record.get(field).and_then(|v| v.as_text());
            resolve_date_unit(raw, *unit, months)
        }
    }
}

/// Builds the composite key of a record for an ordered selector list.
pub fn build_key(record: &Record, selectors: &[FieldRef], months: &MonthNames) -> CompositeKey {
    CompositeKey {
        parts: selectors
            .iter()
            .map(|s| resolve_selector(record, s, months))
            .collect(),
    }
}

/// Sorts axis keys into display order.
pub fn sort_axis_keys(keys: &mut [CompositeKey]) {
    keys.sort_by(CompositeKey::axis_cmp);
}
