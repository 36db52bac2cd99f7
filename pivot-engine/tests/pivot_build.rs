//! FILENAME: pivot-engine/tests/pivot_build.rs
//! End-to-end tests for pivot generation through the public API.

use engine::{Dataset, Record};
use pivot_engine::{
    build_key, build_pivot, render_table, AggregationType, DateUnit, FieldAssignment, FieldRef,
    PivotArea, PivotOptions, PivotRequest, TableOutput, KEY_DELIMITER,
};

// ============================================================================
// FIXTURES
// ============================================================================

fn region_sales() -> Vec<Record> {
    vec![
        Record::new().with("Region", "East").with("Sales", 10.0),
        Record::new().with("Region", "West").with("Sales", 20.0),
    ]
}

fn orders() -> Vec<Record> {
    vec![
        Record::new().with("Region", "East").with("Order Date", "05/01/2024").with("Sales", 5.0),
        Record::new().with("Region", "East").with("Order Date", "17/02/2024").with("Sales", 5.0),
        Record::new().with("Region", "East").with("Order Date", "30/03/2024").with("Sales", 5.0),
        Record::new().with("Region", "West").with("Order Date", "12/01/2024").with("Sales", 5.0),
        Record::new().with("Region", "West").with("Order Date", "14/07/2024").with("Sales", 8.0),
        Record::new().with("Region", "West").with("Order Date", "31-04-2024").with("Sales", 2.0),
    ]
}

fn assignment(rows: &[FieldRef], columns: &[FieldRef], value: &str, agg: AggregationType) -> FieldAssignment {
    let mut a = FieldAssignment::new();
    for r in rows {
        a.place(r.clone(), PivotArea::Rows);
    }
    for c in columns {
        a.place(c.clone(), PivotArea::Columns);
    }
    let value = FieldRef::plain(value);
    a.place(value.clone(), PivotArea::Values);
    a.set_aggregation(&value, agg);
    a
}

fn joined(keys: &[pivot_engine::CompositeKey]) -> Vec<String> {
    keys.iter().map(|k| k.joined()).collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[test]
fn test_single_row_field_sum() {
    let records = region_sales();
    let a = assignment(&[FieldRef::plain("Region")], &[], "Sales", AggregationType::Sum);
    let result = build_pivot(&records, &a, &PivotOptions::default());

    assert_eq!(joined(&result.pivot_rows), vec!["East", "West"]);
    assert_eq!(joined(&result.pivot_columns), vec![""]);
    assert_eq!(result.cell_value(0, 0, "Sales"), Some(10.0));
    assert_eq!(result.cell_value(1, 0, "Sales"), Some(20.0));
    assert_eq!(result.column_totals.len(), 1);
    assert_eq!(result.column_totals[0].as_slice(), &[30.0]);
    assert_eq!(result.grand_totals().as_slice(), &[30.0]);
}

#[test]
fn test_matrix_dimensions() {
    let records = orders();
    let a = assignment(
        &[FieldRef::plain("Region")],
        &[FieldRef::date("Order Date", DateUnit::Quarter)],
        "Sales",
        AggregationType::Sum,
    );
    let result = build_pivot(&records, &a, &PivotOptions::default());

    assert_eq!(joined(&result.pivot_columns), vec!["N/A", "Q1", "Q3"]);
    assert_eq!(result.matrix.len(), result.pivot_rows.len());
    for row in &result.matrix {
        assert_eq!(row.len(), result.pivot_columns.len());
    }
    assert_eq!(result.row_totals.len(), result.pivot_rows.len());
    assert_eq!(result.column_totals.len(), result.pivot_columns.len());

    // East never has an N/A or Q3 order
    assert_eq!(result.cell_value(0, 0, "Sales"), Some(0.0));
    assert_eq!(result.cell_value(0, 1, "Sales"), Some(15.0));
}

#[test]
fn test_invalid_date_resolves_every_unit_to_placeholder() {
    let records = vec![Record::new().with("Order Date", "31-04-2024").with("Sales", 1.0)];
    let a = assignment(
        &[
            FieldRef::date("Order Date", DateUnit::Year),
            FieldRef::date("Order Date", DateUnit::Quarter),
            FieldRef::date("Order Date", DateUnit::Month),
        ],
        &[],
        "Sales",
        AggregationType::Sum,
    );
    let result = build_pivot(&records, &a, &PivotOptions::default());
    assert_eq!(joined(&result.pivot_rows), vec!["N/A | N/A | N/A"]);
}

#[test]
fn test_key_split_matches_selector_count() {
    let selectors = vec![
        FieldRef::plain("Region"),
        FieldRef::date("Order Date", DateUnit::Year),
        FieldRef::date("Order Date", DateUnit::Month),
        FieldRef::plain("Missing"),
    ];
    for record in orders() {
        let a = build_key(&record, &selectors, &Default::default());
        let b = build_key(&record, &selectors, &Default::default());
        assert_eq!(a, b);
        assert_eq!(a.joined().split(KEY_DELIMITER).count(), selectors.len());
    }
}

#[test]
fn test_row_average_is_unweighted_and_column_average_weighted() {
    let records = orders();
    let a = assignment(
        &[FieldRef::plain("Region")],
        &[FieldRef::date("Order Date", DateUnit::Quarter)],
        "Sales",
        AggregationType::Average,
    );
    let result = build_pivot(&records, &a, &PivotOptions::default());

    // West: N/A=2 (1 obs), Q1=5 (1 obs), Q3=8 (1 obs)
    assert_eq!(result.row_totals[1].as_slice(), &[5.0]);

    // Q1 column: East 5 from 3 records, West 5 from 1 record
    let q1 = result.pivot_columns.iter().position(|k| k.joined() == "Q1").unwrap();
    assert_eq!(result.column_totals[q1].as_slice(), &[5.0]);

    // A column of unequal weights: East avg 5 (3 obs) and West avg 9 (1 obs)
    let mut skewed = orders();
    skewed.push(Record::new().with("Region", "West").with("Order Date", "02/02/2024").with("Sales", 13.0));
    let result = build_pivot(&skewed, &a, &PivotOptions::default());
    // West Q1 = (5 + 13) / 2 = 9 from 2 obs -> (5*3 + 9*2) / 5 = 6.6
    assert_eq!(result.column_totals[q1].as_slice(), &[6.6]);
    // Plain mean of the cells would be 7
    assert_ne!(result.column_totals[q1][0], 7.0);
}

#[test]
fn test_count_min_max_totals() {
    let records = orders();
    for (agg, expected_west_total) in [
        (AggregationType::Count, 3.0),
        (AggregationType::Min, 2.0),
        (AggregationType::Max, 8.0),
        (AggregationType::Sum, 15.0),
    ] {
        let a = assignment(
            &[FieldRef::plain("Region")],
            &[FieldRef::date("Order Date", DateUnit::Quarter)],
            "Sales",
            agg,
        );
        let result = build_pivot(&records, &a, &PivotOptions::default());
        assert_eq!(result.row_totals[1].as_slice(), &[expected_west_total], "{:?}", agg);
    }
}

#[test]
fn test_column_totals_skip_empty_cells() {
    // Columns by Region, rows by Order Date quarter:
    // East holds Q1 only, so its N/A and Q3 cells are 0
    let records = orders();
    let expectations = [
        (AggregationType::Count, [1.0, 3.0]),
        (AggregationType::Min, [5.0, 2.0]),
        (AggregationType::Max, [5.0, 8.0]),
        (AggregationType::Sum, [15.0, 15.0]),
    ];
    for (agg, expected) in expectations {
        let a = assignment(
            &[FieldRef::date("Order Date", DateUnit::Quarter)],
            &[FieldRef::plain("Region")],
            "Sales",
            agg,
        );
        let result = build_pivot(&records, &a, &PivotOptions::default());
        assert_eq!(joined(&result.pivot_columns), vec!["East", "West"]);
        let totals: Vec<f64> = result.column_totals.iter().map(|t| t[0]).collect();
        assert_eq!(totals, expected.to_vec(), "{:?}", agg);
    }

    // Count grand total adds the column totals, not the raw records
    let a = assignment(
        &[FieldRef::date("Order Date", DateUnit::Quarter)],
        &[FieldRef::plain("Region")],
        "Sales",
        AggregationType::Count,
    );
    let result = build_pivot(&records, &a, &PivotOptions::default());
    assert_eq!(result.grand_totals().as_slice(), &[4.0]);
}

#[test]
fn test_idempotent_output() {
    let records = orders();
    let a = assignment(
        &[FieldRef::plain("Region"), FieldRef::date("Order Date", DateUnit::Month)],
        &[FieldRef::date("Order Date", DateUnit::Year)],
        "Sales",
        AggregationType::Sum,
    );
    let first = serde_json::to_string(&build_pivot(&records, &a, &PivotOptions::default())).unwrap();
    let second = serde_json::to_string(&build_pivot(&records, &a, &PivotOptions::default())).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_serialized_keys_are_joined_strings() {
    let records = orders();
    let a = assignment(
        &[FieldRef::plain("Region"), FieldRef::date("Order Date", DateUnit::Year)],
        &[],
        "Sales",
        AggregationType::Sum,
    );
    let result = build_pivot(&records, &a, &PivotOptions::default());
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["pivot_rows"][0], "East | 2024");
    assert_eq!(json["pivot_columns"][0], "");
}

#[test]
fn test_request_from_ui_strings() {
    let dataset = Dataset::new(
        vec!["Region".into(), "Order Date".into(), "Sales".into()],
        orders(),
    );
    let request: PivotRequest = serde_json::from_str(
        r#"{
            "rows": ["Order Date_Year"],
            "columns": ["Region"],
            "values": ["Sales"],
            "aggregations": {"Sales": "median"}
        }"#,
    )
    .unwrap();
    let a = request.into_assignment(&dataset.fields);
    assert_eq!(a.aggregation_for(&FieldRef::plain("Sales")), AggregationType::Sum);

    let TableOutput::Pivot(view) = render_table(&dataset, &a, &PivotOptions::default()) else {
        panic!("expected a pivot");
    };
    assert_eq!(view.row_headers, vec!["Order Date_Year"]);
    let labels: Vec<&str> = view.body.iter().map(|r| r.labels[0].as_str()).collect();
    assert_eq!(labels, vec!["2024", "N/A"]);
    assert_eq!(view.footer.unwrap().grand_totals, vec!["30.00"]);
}
