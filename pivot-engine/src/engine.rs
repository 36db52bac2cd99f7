//! FILENAME: pivot-engine/src/engine.rs
//! Pivot Engine - The calculation core that turns records into a pivot matrix.
//!
//! This module takes a FieldAssignment (configuration) and the imported
//! records (data) and produces a PivotResult (plain data for rendering).
//!
//! Algorithm:
//! 1. Group: resolve each record's row key and column key, and feed its
//!    numeric value-field entries into the (row, column) bucket accumulators
//! 2. Sort the distinct row keys and column keys into axis order
//! 3. Fill the dense matrix: every (row, column) pair gets a cell, empty
//!    buckets aggregating to their defaults
//! 4. Compute row totals and column totals per value field
//!
//! Everything is recomputed from scratch per call; nothing is cached.

use rustc_hash::FxHashMap;
use serde::Serialize;
use smallvec::SmallVec;

use engine::Record;

use crate::aggregate::{
    aggregate_column_total, aggregate_row_total, grand_total, AggregateAccumulator,
    CellContribution,
};
use crate::definition::{AggregationType, FieldAssignment, FieldRef, PivotOptions};
use crate::key::{build_key, CompositeKey};
use engine::log_debug;

/// Per-value-field numbers, in value field order.
pub type ValueVector = SmallVec<[f64; 4]>;

// ============================================================================
// OUTPUT
// ============================================================================

/// Aggregated values of one (row key, column key) pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PivotCell {
    /// One aggregate per value field.
    pub values: ValueVector,

    /// Raw observation count behind each value (weights column averages).
    #[serde(skip)]
    pub observations: SmallVec<[u32; 4]>,
}

impl PivotCell {
    pub fn value(&self, value_index: usize) -> Option<f64> {
        self.values.get(value_index).copied()
    }
}

/// The full pivot computation result.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PivotResult {
    /// Value field selectors, indexing every ValueVector below.
    pub value_fields: Vec<String>,

    /// Aggregation applied to each value field.
    pub aggregations: Vec<AggregationType>,

    /// Sorted distinct row keys.
    pub pivot_rows: Vec<CompositeKey>,

    /// Sorted distinct column keys.
    pub pivot_columns: Vec<CompositeKey>,

    /// `matrix[row][column]`, dimensions |pivot_rows| x |pivot_columns|.
    pub matrix: Vec<Vec<PivotCell>>,

    /// One entry per pivot row.
    pub row_totals: Vec<ValueVector>,

    /// One entry per pivot column.
    pub column_totals: Vec<ValueVector>,
}

impl PivotResult {
    /// True when no pivot was computed (no data, or nothing to group by).
    pub fn is_empty(&self) -> bool {
        self.pivot_rows.is_empty() && self.pivot_columns.is_empty()
    }

    pub fn value_index(&self, field: &str) -> Option<usize> {
        self.value_fields.iter().position(|f| f == field)
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&PivotCell> {
        self.matrix.get(row).and_then(|r| r.get(column))
    }

    /// Cell value by value field selector.
    pub fn cell_value(&self, row: usize, column: usize, field: &str) -> Option<f64> {
        let index = self.value_index(field)?;
        self.cell(row, column)?.value(index)
    }

    /// Per value field: the sum of its column totals.
    pub fn grand_totals(&self) -> ValueVector {
        (0..self.value_fields.len())
            .map(|vf_idx| {
                let totals: Vec<f64> = self
                    .column_totals
                    .iter()
                    .map(|t| t.get(vf_idx).copied().unwrap_or(0.0))
                    .collect();
                grand_total(&totals)
            })
            .collect()
    }
}

// ============================================================================
// PIVOT CALCULATOR
// ============================================================================

/// The main calculation engine for pivot tables.
pub struct PivotCalculator<'a> {
    records: &'a [Record],
    assignment: &'a FieldAssignment,
    options: &'a PivotOptions,

    /// Aggregation per value field, resolved once.
    aggregations: Vec<AggregationType>,

    /// Distinct row keys in first-seen order, and their positions.
    row_keys: Vec<CompositeKey>,
    row_index: FxHashMap<CompositeKey, usize>,

    /// Distinct column keys in first-seen order, and their positions.
    col_keys: Vec<CompositeKey>,
    col_index: FxHashMap<CompositeKey, usize>,

    /// Accumulators keyed by (row position, column position), one per value field.
    buckets: FxHashMap<(usize, usize), Vec<AggregateAccumulator>>,
}

impl<'a> PivotCalculator<'a> {
    /// Creates a new calculator instance.
    pub fn new(
        records: &'a [Record],
        assignment: &'a FieldAssignment,
        options: &'a PivotOptions,
    ) -> Self {
        let aggregations = assignment
            .values
            .iter()
            .map(|vf| assignment.aggregation_for(vf))
            .collect();

        PivotCalculator {
            records,
            assignment,
            options,
            aggregations,
            row_keys: Vec::new(),
            row_index: FxHashMap::default(),
            col_keys: Vec::new(),
            col_index: FxHashMap::default(),
            buckets: FxHashMap::default(),
        }
    }

    /// Executes the full calculation.
    pub fn calculate(mut self) -> PivotResult {
        let value_fields: Vec<String> =
            self.assignment.values.iter().map(FieldRef::selector).collect();

        if self.records.is_empty() || !self.assignment.has_grouping() {
            log_debug!(
                "PIVOT",
                "skipping pivot: records={} grouped={}",
                self.records.len(),
                self.assignment.has_grouping()
            );
            return PivotResult {
                value_fields,
                aggregations: self.aggregations,
                ..PivotResult::default()
            };
        }

        // Step 1: Group records into buckets
        self.group_records();

        // Step 2: Sort axes
        let row_order = axis_order(&self.row_keys);
        let col_order = axis_order(&self.col_keys);

        // Step 3: Dense matrix
        let matrix = self.build_matrix(&row_order, &col_order);

        // Step 4: Totals
        let row_totals = self.compute_row_totals(&matrix);
        let column_totals = self.compute_column_totals(&matrix, col_order.len());

        log_debug!(
            "PIVOT",
            "pivot built: records={} rows={} columns={} values={} buckets={}",
            self.records.len(),
            row_order.len(),
            col_order.len(),
            value_fields.len(),
            self.buckets.len()
        );

        let pivot_rows = row_order.iter().map(|&i| self.row_keys[i].clone()).collect();
        let pivot_columns = col_order.iter().map(|&i| self.col_keys[i].clone()).collect();

        PivotResult {
            value_fields,
            aggregations: self.aggregations,
            pivot_rows,
            pivot_columns,
            matrix,
            row_totals,
            column_totals,
        }
    }

    /// Resolves keys for every record and accumulates numeric value entries.
    /// Non-numeric entries are skipped, never coerced.
    fn group_records(&mut self) {
        let assignment = self.assignment;
        let options = self.options;
        let months = &options.month_names;
        let value_count = assignment.values.len();

        for record in self.records {
            let row_key = build_key(record, &assignment.rows, months);
            let col_key = build_key(record, &assignment.columns, months);

            let row_pos = intern_key(&mut self.row_keys, &mut self.row_index, row_key);
            let col_pos = intern_key(&mut self.col_keys, &mut self.col_index, col_key);

            let accumulators = self
                .buckets
                .entry((row_pos, col_pos))
                .or_insert_with(|| vec![AggregateAccumulator::new(); value_count]);

            for (acc, field) in accumulators.iter_mut().zip(&assignment.values) {
                if let Some(n) = numeric_value(record, field) {
                    acc.add_number(n);
                }
            }
        }
    }

    fn build_matrix(&self, row_order: &[usize], col_order: &[usize]) -> Vec<Vec<PivotCell>> {
        let empty = AggregateAccumulator::new();

        row_order
            .iter()
            .map(|&ri| {
                col_order
                    .iter()
                    .map(|&ci| {
                        let accumulators = self.buckets.get(&(ri, ci));
                        let mut cell = PivotCell::default();
                        for (vf_idx, &aggregation) in self.aggregations.iter().enumerate() {
                            let acc = accumulators
                                .and_then(|accs| accs.get(vf_idx))
                                .unwrap_or(&empty);
                            cell.values.push(acc.compute(aggregation));
                            cell.observations.push(acc.observations());
                        }
                        cell
                    })
                    .collect()
            })
            .collect()
    }

    fn compute_row_totals(&self, matrix: &[Vec<PivotCell>]) -> Vec<ValueVector> {
        matrix
            .iter()
            .map(|row| {
                self.aggregations
                    .iter()
                    .enumerate()
                    .map(|(vf_idx, &aggregation)| {
                        let cells: Vec<f64> = row.iter().map(|c| c.values[vf_idx]).collect();
                        aggregate_row_total(&cells, aggregation)
                    })
                    .collect()
            })
            .collect()
    }

    fn compute_column_totals(&self, matrix: &[Vec<PivotCell>], col_count: usize) -> Vec<ValueVector> {
        (0..col_count)
            .map(|col| {
                self.aggregations
                    .iter()
                    .enumerate()
                    .map(|(vf_idx, &aggregation)| {
                        let cells: Vec<CellContribution> = matrix
                            .iter()
                            .map(|row| {
                                let cell = &row[col];
                                CellContribution::new(cell.values[vf_idx], cell.observations[vf_idx])
                            })
                            .collect();
                        aggregate_column_total(&cells, aggregation)
                    })
                    .collect()
            })
            .collect()
    }
}

// ============================================================================
// HELPER FUNCTIONS (outside impl to avoid borrow issues)
// ============================================================================

/// Returns the position of a key, registering it on first sight.
fn intern_key(
    keys: &mut Vec<CompositeKey>,
    index: &mut FxHashMap<CompositeKey, usize>,
    key: CompositeKey,
) -> usize {
    if let Some(&pos) = index.get(&key) {
        return pos;
    }
    let pos = keys.len();
    keys.push(key.clone());
    index.insert(key, pos);
    pos
}

/// Positions of `keys` in axis display order.
fn axis_order(keys: &[CompositeKey]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..keys.len()).collect();
    order.sort_by(|&a, &b| keys[a].axis_cmp(&keys[b]));
    order
}

/// Numeric value of a value field. Derived date units are labels, never numbers.
fn numeric_value(record: &Record, field: &FieldRef) -> Option<f64> {
    match field {
        FieldRef::Plain(name) => record.number(name),
        FieldRef::DateUnit { .. } => None,
    }
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Builds a pivot from records and a field assignment.
/// This is the main entry point for the calculation engine.
pub fn build_pivot(
    records: &[Record],
    assignment: &FieldAssignment,
    options: &PivotOptions,
) -> PivotResult {
    PivotCalculator::new(records, assignment, options).calculate()
}
