//! FILENAME: pivot-engine/src/view.rs
//! Pivot View - Renderable output for the frontend.
//!
//! This module turns a PivotResult into a table structure the frontend can
//! draw directly. It includes:
//! - The column tree: column key parts nested level by level, with
//!   value fields as leaves
//! - Header rows with column/row spans derived from the tree
//! - Body rows (row key parts, cells, row totals) and the totals footer
//! - The flat raw-record table used when nothing is grouped

use serde::{Deserialize, Serialize};

use engine::{Dataset, FieldValue};

use crate::definition::{AggregationType, FieldAssignment, FieldRef, PivotOptions};
use crate::engine::{build_pivot, PivotResult};
use crate::key::CompositeKey;

// ============================================================================
// COLUMN TREE
// ============================================================================

/// A node of the column header tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColumnNode {
    /// A key part with its children, in insertion order.
    Branch(Vec<(String, ColumnNode)>),
    /// A value field under the deepest key part.
    Leaf,
}

impl ColumnNode {
    /// Header rows needed below and including this node.
    /// An empty branch still occupies one row; a leaf adds none.
    pub fn depth(&self) -> usize {
        match self {
            ColumnNode::Leaf => 0,
            ColumnNode::Branch(children) => {
                1 + children.iter().map(|(_, c)| c.depth()).max().unwrap_or(0)
            }
        }
    }

    /// Number of value columns spanned by this node.
    pub fn leaf_count(&self) -> usize {
        match self {
            ColumnNode::Leaf => 1,
            ColumnNode::Branch(children) => children.iter().map(|(_, c)| c.leaf_count()).sum(),
        }
    }

    fn is_nonempty_branch(&self) -> bool {
        matches!(self, ColumnNode::Branch(children) if !children.is_empty())
    }
}

/// Finds a child by label, creating an empty branch when missing. A leaf
/// sitting under the same label is turned into a branch.
fn child_branch<'t>(children: &'t mut Vec<(String, ColumnNode)>, label: &str) -> &'t mut Vec<(String, ColumnNode)> {
    let pos = match children.iter().position(|(l, _)| l == label) {
        Some(pos) => pos,
        None => {
            children.push((label.to_string(), ColumnNode::Branch(Vec::new())));
            children.len() - 1
        }
    };
    let node = &mut children[pos].1;
    if let ColumnNode::Leaf = node {
        *node = ColumnNode::Branch(Vec::new());
    }
    match node {
        ColumnNode::Branch(grandchildren) => grandchildren,
        ColumnNode::Leaf => unreachable!("leaf replaced above"),
    }
}

/// Sets a child to a leaf, keeping its position if the label already exists.
fn set_leaf(children: &mut Vec<(String, ColumnNode)>, label: &str) {
    match children.iter_mut().find(|(l, _)| l == label) {
        Some((_, node)) => *node = ColumnNode::Leaf,
        None => children.push((label.to_string(), ColumnNode::Leaf)),
    }
}

/// Nested column headers built from the pivot's column keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnTree {
    pub roots: Vec<(String, ColumnNode)>,
}

impl ColumnTree {
    /// Threads each column key's parts into the tree; the value fields
    /// hang under the deepest part.
    pub fn build(columns: &[CompositeKey], value_fields: &[String]) -> Self {
        let mut roots: Vec<(String, ColumnNode)> = Vec::new();

        for key in columns {
            let mut current = &mut roots;
            for part in &key.display_parts() {
                current = child_branch(current, part);
            }
            for value in value_fields {
                set_leaf(current, value);
            }
        }

        ColumnTree { roots }
    }

    /// Total header depth.
    pub fn depth(&self) -> usize {
        1 + self.roots.iter().map(|(_, c)| c.depth()).max().unwrap_or(0)
    }
}

// ============================================================================
// HEADER ROWS
// ============================================================================

/// One header cell with its spans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderCell {
    pub label: String,
    pub col_span: usize,
    pub row_span: usize,
}

/// Lays the column tree out as `depth` header rows.
///
/// Branches span their leaf count. Terminal nodes span down to the last
/// header row; value leaves read "<field> (<agg>)". With no value fields
/// the terminal key parts get a column span of 0.
pub fn header_rows(tree: &ColumnTree, assignment: &FieldAssignment) -> Vec<Vec<HeaderCell>> {
    let depth = tree.depth();
    let mut rows: Vec<Vec<HeaderCell>> = vec![Vec::new(); depth];
    let no_values = assignment.values.is_empty();

    fn traverse(
        children: &[(String, ColumnNode)],
        level: usize,
        depth: usize,
        no_values: bool,
        assignment: &FieldAssignment,
        rows: &mut Vec<Vec<HeaderCell>>,
    ) {
        for (label, child) in children {
            if child.is_nonempty_branch() {
                rows[level].push(HeaderCell {
                    label: label.clone(),
                    col_span: child.leaf_count(),
                    row_span: 1,
                });
                if let ColumnNode::Branch(grandchildren) = child {
                    traverse(grandchildren, level + 1, depth, no_values, assignment, rows);
                }
            } else if no_values {
                rows[level].push(HeaderCell {
                    label: label.clone(),
                    col_span: 0,
                    row_span: depth - level,
                });
            } else {
                let aggregation = assignment.aggregation_for(&FieldRef::plain(label.as_str()));
                rows[level].push(HeaderCell {
                    label: format!("{} ({})", label, aggregation.as_str()),
                    col_span: 1,
                    row_span: depth - level,
                });
            }
        }
    }

    traverse(&tree.roots, 0, depth, no_values, assignment, &mut rows);
    rows
}

/// Header of a row-total column: "Total Avg of Sales".
pub fn row_total_label(field: &str, aggregation: AggregationType) -> String {
    format!("Total {} of {}", aggregation.label(), field)
}

// ============================================================================
// TABLE VIEW
// ============================================================================

/// One body row of the pivot table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotBodyRow {
    /// Row key parts, one per row field.
    pub labels: Vec<String>,
    /// Cell values, column-major then value field; zero renders blank.
    pub cells: Vec<Option<f64>>,
    /// Row totals with two decimals, one per value field.
    pub totals: Vec<String>,
}

/// The "Column Totals" footer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotFooter {
    pub label: String,
    pub column_totals: Vec<f64>,
    /// Grand totals with two decimals, one per value field.
    pub grand_totals: Vec<String>,
}

/// A pivot table ready to draw.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotTableView {
    /// Row field selectors, one header column each.
    pub row_headers: Vec<String>,
    pub column_headers: Vec<Vec<HeaderCell>>,
    pub header_depth: usize,
    pub row_total_headers: Vec<String>,
    pub body: Vec<PivotBodyRow>,
    /// Present only when value fields are assigned.
    pub footer: Option<PivotFooter>,
}

impl PivotTableView {
    pub fn render(result: &PivotResult, assignment: &FieldAssignment) -> Self {
        let tree = ColumnTree::build(&result.pivot_columns, &result.value_fields);
        let column_headers = header_rows(&tree, assignment);

        let row_total_headers = result
            .value_fields
            .iter()
            .zip(&result.aggregations)
            .map(|(field, &agg)| row_total_label(field, agg))
            .collect();

        let body = result
            .pivot_rows
            .iter()
            .enumerate()
            .map(|(row_idx, key)| PivotBodyRow {
                labels: key.display_parts(),
                cells: result.matrix[row_idx]
                    .iter()
                    .flat_map(|cell| cell.values.iter().map(|&v| (v != 0.0).then_some(v)))
                    .collect(),
                totals: result.row_totals[row_idx]
                    .iter()
                    .map(|t| format!("{:.2}", t))
                    .collect(),
            })
            .collect();

        let footer = (!result.value_fields.is_empty()).then(|| PivotFooter {
            label: "Column Totals".to_string(),
            column_totals: result
                .column_totals
                .iter()
                .flat_map(|t| t.iter().copied())
                .collect(),
            grand_totals: result
                .grand_totals()
                .iter()
                .map(|t| format!("{:.2}", t))
                .collect(),
        });

        PivotTableView {
            row_headers: assignment.rows.iter().map(FieldRef::selector).collect(),
            header_depth: column_headers.len(),
            column_headers,
            row_total_headers,
            body,
            footer,
        }
    }
}

// ============================================================================
// FLAT TABLE
// ============================================================================

/// Raw records as a plain table, shown while no grouping field is assigned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlatTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl FlatTable {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        FlatTable {
            headers: dataset.fields.clone(),
            rows: dataset
                .records
                .iter()
                .map(|r| dataset.row_values(r).map(FieldValue::display_value).collect())
                .collect(),
        }
    }
}

/// What the table area shows for the current data and assignment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TableOutput {
    NoData,
    Flat(FlatTable),
    Pivot(PivotTableView),
}

/// Picks and builds the table for a dataset: nothing without records, the
/// flat table without grouping fields, otherwise the pivot.
pub fn render_table(
    dataset: &Dataset,
    assignment: &FieldAssignment,
    options: &PivotOptions,
) -> TableOutput {
    if dataset.is_empty() {
        return TableOutput::NoData;
    }
    if !assignment.has_grouping() {
        return TableOutput::Flat(FlatTable::from_dataset(dataset));
    }
    let result = build_pivot(&dataset.records, assignment, options);
    TableOutput::Pivot(PivotTableView::render(&result, assignment))
}
