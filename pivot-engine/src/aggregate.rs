//! FILENAME: pivot-engine/src/aggregate.rs
//! Aggregation Engine.
//!
//! Two distinct granularities:
//! - Cell level: an accumulator over the raw numeric observations that fell
//!   into one (row key, column key) bucket.
//! - Total level: row totals and column totals computed over the already
//!   aggregated cell values of one row or one column.
//!
//! At total level a cell value of 0 is ambiguous ("no data" or "a genuine
//! 0"). The inherited policy treats 0 as no contribution for avg, count and
//! min, while sum and max include every cell, 0 included.
//! OPEN QUESTION (product): this asymmetry is kept for compatibility with
//! existing reports; revisit once consumers can tell empty cells from 0.

use serde::{Deserialize, Serialize};

use crate::definition::AggregationType;

// ============================================================================
// ROUNDING
// ============================================================================

/// Rounds to 2 decimals, half away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Leaves integral values untouched, rounds anything else to 2 decimals.
pub fn round_if_fractional(value: f64) -> f64 {
    if value.fract() == 0.0 {
        value
    } else {
        round2(value)
    }
}

// ============================================================================
// CELL LEVEL
// ============================================================================

/// Accumulator for one value field of one pivot bucket.
/// Stores the intermediate state needed for all aggregation types.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggregateAccumulator {
    pub sum: f64,
    pub count: u32,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl AggregateAccumulator {
    pub fn new() -> Self {
        AggregateAccumulator {
            sum: 0.0,
            count: 0,
            min: None,
            max: None,
        }
    }

    /// Adds a numeric observation.
    pub fn add_number(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
    }

    /// Number of raw observations seen.
    pub fn observations(&self) -> u32 {
        self.count
    }

    /// Computes the cell value. An empty bucket yields 0 for every type.
    pub fn compute(&self, aggregation: AggregationType) -> f64 {
        match aggregation {
            AggregationType::Sum => round_if_fractional(self.sum),
            AggregationType::Average => {
                if self.count > 0 {
                    round_if_fractional(self.sum / self.count as f64)
                } else {
                    0.0
                }
            }
            AggregationType::Count => self.count as f64,
            AggregationType::Min => self.min.unwrap_or(0.0),
            AggregationType::Max => self.max.unwrap_or(0.0),
        }
    }
}

impl FromIterator<f64> for AggregateAccumulator {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut acc = AggregateAccumulator::new();
        for value in iter {
            acc.add_number(value);
        }
        acc
    }
}

/// Aggregates a bucket of raw observations.
pub fn aggregate_bucket(values: &[f64], aggregation: AggregationType) -> f64 {
    values
        .iter()
        .copied()
        .collect::<AggregateAccumulator>()
        .compute(aggregation)
}

// ============================================================================
// TOTAL LEVEL
// ============================================================================

/// One aggregated cell as seen by a column total: its value and, when
/// known, how many raw observations produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellContribution {
    pub value: f64,
    pub observations: Option<u32>,
}

impl CellContribution {
    pub fn new(value: f64, observations: u32) -> Self {
        CellContribution {
            value,
            observations: Some(observations),
        }
    }

    pub fn unweighted(value: f64) -> Self {
        CellContribution {
            value,
            observations: None,
        }
    }
}

/// A cell counts toward avg/count/min totals only when non-zero.
fn contributes(value: f64) -> bool {
    value != 0.0 && !value.is_nan()
}

/// Total rules shared by rows and columns; avg is handled by the callers.
fn total_common(cells: &[f64], aggregation: AggregationType) -> f64 {
    match aggregation {
        AggregationType::Sum => round_if_fractional(cells.iter().sum()),
        AggregationType::Count => cells.iter().filter(|v| contributes(**v)).count() as f64,
        AggregationType::Min => cells
            .iter()
            .copied()
            .filter(|v| contributes(*v))
            .reduce(f64::min)
            .unwrap_or(0.0),
        AggregationType::Max => cells.iter().copied().reduce(f64::max).unwrap_or(0.0),
        AggregationType::Average => unweighted_average(cells),
    }
}

/// Mean of the non-zero cells, rounded to 2 decimals; 0 when there are none.
fn unweighted_average(cells: &[f64]) -> f64 {
    let (sum, count) = cells
        .iter()
        .filter(|v| contributes(**v))
        .fold((0.0, 0u32), |(s, c), v| (s + v, c + 1));
    if count > 0 {
        round2(sum / count as f64)
    } else {
        0.0
    }
}

/// Total across one pivot row. Average here is the plain mean of the
/// non-zero cells.
pub fn aggregate_row_total(cells: &[f64], aggregation: AggregationType) -> f64 {
    total_common(cells, aggregation)
}

/// Total down one pivot column. Average here is weighted by each cell's
/// observation count, reconstructing the mean of the underlying records;
/// it falls back to the plain mean when any non-zero cell lacks a count.
pub fn aggregate_column_total(cells: &[CellContribution], aggregation: AggregationType) -> f64 {
    if aggregation != AggregationType::Average {
        let values: Vec<f64> = cells.iter().map(|c| c.value).collect();
        return total_common(&values, aggregation);
    }

    let contributing = cells.iter().filter(|c| contributes(c.value));
    let mut weighted_sum = 0.0;
    let mut weight = 0u64;
    for cell in contributing {
        match cell.observations {
            Some(n) => {
                weighted_sum += cell.value * n as f64;
                weight += n as u64;
            }
            None => {
                let values: Vec<f64> = cells.iter().map(|c| c.value).collect();
                return unweighted_average(&values);
            }
        }
    }

    if weight > 0 {
        round2(weighted_sum / weight as f64)
    } else {
        0.0
    }
}

/// Grand total of a value field: the plain sum of its column totals,
/// whatever the field's aggregation type.
pub fn grand_total(column_totals: &[f64]) -> f64 {
    column_totals.iter().sum()
}
