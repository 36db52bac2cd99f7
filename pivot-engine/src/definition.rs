//! FILENAME: pivot-engine/src/definition.rs
//! Pivot Definition - The serializable configuration.
//!
//! This module contains all the types needed to DESCRIBE a pivot table:
//! which fields bucket rows, which bucket columns, which are aggregated and
//! how. These structures are designed to be:
//! - Serializable (for handing over from the field-assignment UI)
//! - Immutable snapshots of user intent, passed whole into the engine

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use engine::date_like_fields;
use serde::{Deserialize, Serialize};

use crate::date::MonthNames;
use crate::error::PivotError;
use engine::log_warn;

// ============================================================================
// AGGREGATION
// ============================================================================

/// Supported aggregation functions for value fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationType {
    Sum,
    #[serde(rename = "avg")]
    Average,
    Count,
    Min,
    Max,
}

impl Default for AggregationType {
    fn default() -> Self {
        AggregationType::Sum
    }
}

impl AggregationType {
    pub const ALL: [AggregationType; 5] = [
        AggregationType::Sum,
        AggregationType::Average,
        AggregationType::Count,
        AggregationType::Min,
        AggregationType::Max,
    ];

    /// Short identifier used in selectors and header labels ("sum", "avg", ...).
    pub fn as_str(self) -> &'static str {
        match self {
            AggregationType::Sum => "sum",
            AggregationType::Average => "avg",
            AggregationType::Count => "count",
            AggregationType::Min => "min",
            AggregationType::Max => "max",
        }
    }

    /// Capitalized label for total headers ("Sum", "Avg", ...).
    pub fn label(self) -> &'static str {
        match self {
            AggregationType::Sum => "Sum",
            AggregationType::Average => "Avg",
            AggregationType::Count => "Count",
            AggregationType::Min => "Min",
            AggregationType::Max => "Max",
        }
    }

    /// Parses an aggregation name, falling back to Sum for anything unknown.
    pub fn parse_lenient(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            log_warn!("PIVOT", "unknown aggregation '{}', using sum", name);
            AggregationType::Sum
        })
    }
}

impl FromStr for AggregationType {
    type Err = PivotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sum" => Ok(AggregationType::Sum),
            "avg" | "average" => Ok(AggregationType::Average),
            "count" => Ok(AggregationType::Count),
            "min" => Ok(AggregationType::Min),
            "max" => Ok(AggregationType::Max),
            _ => Err(PivotError::UnknownAggregation(s.to_string())),
        }
    }
}

impl fmt::Display for AggregationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// FIELD REFERENCES
// ============================================================================

/// Levels of the derived date hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DateUnit {
    Year,
    Quarter,
    Month,
}

impl DateUnit {
    /// Hierarchy order, outermost first.
    pub const ALL: [DateUnit; 3] = [DateUnit::Year, DateUnit::Quarter, DateUnit::Month];

    /// Selector suffix the field-assignment UI appends to the base field.
    pub fn suffix(self) -> &'static str {
        match self {
            DateUnit::Year => "_Year",
            DateUnit::Quarter => "_Quarter",
            DateUnit::Month => "_Month",
        }
    }
}

/// A reference to a grouping or value field: either a source field or a
/// date unit derived from a date-like source field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldRef {
    Plain(String),
    DateUnit { field: String, unit: DateUnit },
}

impl FieldRef {
    pub fn plain(name: impl Into<String>) -> Self {
        FieldRef::Plain(name.into())
    }

    pub fn date(field: impl Into<String>, unit: DateUnit) -> Self {
        FieldRef::DateUnit {
            field: field.into(),
            unit,
        }
    }

    /// The source field this reference reads.
    pub fn base_field(&self) -> &str {
        match self {
            FieldRef::Plain(name) => name,
            FieldRef::DateUnit { field, .. } => field,
        }
    }

    /// Selector string as shown in the field list ("Order Date_Year").
    pub fn selector(&self) -> String {
        match self {
            FieldRef::Plain(name) => name.clone(),
            FieldRef::DateUnit { field, unit } => format!("{}{}", field, unit.suffix()),
        }
    }

    /// Resolves a selector string against the known source fields.
    ///
    /// An exact source field always wins, so a real column named
    /// "Budget_Year" is never mistaken for a derived unit. A recognized
    /// suffix only produces a date unit when its base is a known field.
    pub fn parse(selector: &str, known_fields: &[String]) -> Self {
        if known_fields.iter().any(|f| f == selector) {
            return FieldRef::plain(selector);
        }
        for unit in DateUnit::ALL {
            if let Some(base) = selector.strip_suffix(unit.suffix()) {
                if known_fields.iter().any(|f| f == base) {
                    return FieldRef::date(base, unit);
                }
            }
        }
        FieldRef::plain(selector)
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldRef::Plain(name) => f.write_str(name),
            FieldRef::DateUnit { field, unit } => write!(f, "{}{}", field, unit.suffix()),
        }
    }
}

// ============================================================================
// FIELD ASSIGNMENT
// ============================================================================

/// Drop zones of the field-assignment panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PivotArea {
    Rows,
    Columns,
    Values,
}

/// The complete field assignment for one pivot: the engine's only input
/// besides the records themselves.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldAssignment {
    /// Row grouping fields, outermost first.
    #[serde(default)]
    pub rows: Vec<FieldRef>,

    /// Column grouping fields, outermost first.
    #[serde(default)]
    pub columns: Vec<FieldRef>,

    /// Aggregated fields, in display order.
    #[serde(default)]
    pub values: Vec<FieldRef>,

    /// Aggregation per value field, keyed by selector. Missing entries mean Sum.
    #[serde(default)]
    pub aggregations: BTreeMap<String, AggregationType>,
}

impl FieldAssignment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, PivotError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, PivotError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Aggregation for a value field (Sum when unassigned).
    pub fn aggregation_for(&self, field: &FieldRef) -> AggregationType {
        self.aggregations
            .get(&field.selector())
            .copied()
            .unwrap_or_default()
    }

    pub fn set_aggregation(&mut self, field: &FieldRef, aggregation: AggregationType) {
        self.aggregations.insert(field.selector(), aggregation);
    }

    /// The area currently holding a field, if any.
    pub fn area_of(&self, field: &FieldRef) -> Option<PivotArea> {
        if self.rows.contains(field) {
            Some(PivotArea::Rows)
        } else if self.columns.contains(field) {
            Some(PivotArea::Columns)
        } else if self.values.contains(field) {
            Some(PivotArea::Values)
        } else {
            None
        }
    }

    /// Moves a field into an area, taking it out of wherever it was.
    /// Leaving the values area drops the field's aggregation choice.
    pub fn place(&mut self, field: FieldRef, area: PivotArea) {
        self.remove(&field);
        match area {
            PivotArea::Rows => self.rows.push(field),
            PivotArea::Columns => self.columns.push(field),
            PivotArea::Values => self.values.push(field),
        }
    }

    /// Takes a field out of every area.
    pub fn remove(&mut self, field: &FieldRef) {
        self.rows.retain(|f| f != field);
        self.columns.retain(|f| f != field);
        if self.values.contains(field) {
            self.values.retain(|f| f != field);
            self.aggregations.remove(&field.selector());
        }
    }

    pub fn reset(&mut self) {
        self.rows.clear();
        self.columns.clear();
        self.values.clear();
        self.aggregations.clear();
    }

    /// Whether any grouping field is assigned. Without one the pivot is
    /// not computed and the raw records are shown instead.
    pub fn has_grouping(&self) -> bool {
        !self.rows.is_empty() || !self.columns.is_empty()
    }

    /// Fields still available for placement: unplaced source fields, then
    /// the unplaced Year/Quarter/Month units of every date-like field.
    pub fn available_fields(&self, source_fields: &[String]) -> Vec<FieldRef> {
        let plain = source_fields.iter().map(|f| FieldRef::plain(f.as_str()));
        let derived = date_like_fields(source_fields).into_iter().flat_map(|field| {
            DateUnit::ALL
                .into_iter()
                .map(move |unit| FieldRef::date(field.clone(), unit))
        });
        plain
            .chain(derived)
            .filter(|f| self.area_of(f).is_none())
            .collect()
    }
}

// ============================================================================
// UI REQUEST
// ============================================================================

/// The string-typed assignment produced by the field-selection panel:
/// selectors like "Order Date_Quarter" and aggregation names like "avg".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PivotRequest {
    #[serde(default)]
    pub rows: Vec<String>,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub values: Vec<String>,
    #[serde(default)]
    pub aggregations: HashMap<String, String>,
}

impl PivotRequest {
    /// Resolves selectors against the dataset's fields. Unknown aggregation
    /// names fall back to Sum.
    pub fn into_assignment(self, known_fields: &[String]) -> FieldAssignment {
        let resolve = |selectors: Vec<String>| -> Vec<FieldRef> {
            selectors
                .iter()
                .map(|s| FieldRef::parse(s, known_fields))
                .collect()
        };

        let values = resolve(self.values);
        let aggregations = self
            .aggregations
            .iter()
            .map(|(selector, name)| {
                let field = FieldRef::parse(selector, known_fields);
                (field.selector(), AggregationType::parse_lenient(name))
            })
            .collect();

        FieldAssignment {
            rows: resolve(self.rows),
            columns: resolve(self.columns),
            values,
            aggregations,
        }
    }
}

// ============================================================================
// OPTIONS
// ============================================================================

/// Engine settings that are not part of the field assignment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PivotOptions {
    /// Month naming used by the Month date unit.
    #[serde(default)]
    pub month_names: MonthNames,
}
