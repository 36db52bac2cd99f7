//! FILENAME: pivot-engine/benches/pivot_calculations.rs

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use engine::Record;
use pivot_engine::{
    build_pivot, AggregationType, DateUnit, FieldAssignment, FieldRef, PivotArea, PivotOptions,
};

const REGIONS: [&str; 4] = ["North", "South", "East", "West"];
const PRODUCTS: [&str; 5] = ["Apples", "Oranges", "Pears", "Plums", "Grapes"];

fn synthetic_records(count: usize) -> Vec<Record> {
    (0..count)
        .map(|i| {
            let day = i % 28 + 1;
            let month = i % 12 + 1;
            let year = 2020 + i % 5;
            Record::new()
                .with("Region", REGIONS[i % REGIONS.len()])
                .with("Product", PRODUCTS[i % PRODUCTS.len()])
                .with("Order Date", format!("{:02}/{:02}/{}", day, month, year))
                .with("Sales", (i % 997) as f64 * 1.25)
                .with("Units", (i % 13) as f64)
        })
        .collect()
}

fn assignment() -> FieldAssignment {
    let mut a = FieldAssignment::new();
    a.place(FieldRef::plain("Region"), PivotArea::Rows);
    a.place(FieldRef::plain("Product"), PivotArea::Rows);
    a.place(FieldRef::date("Order Date", DateUnit::Year), PivotArea::Columns);
    a.place(FieldRef::date("Order Date", DateUnit::Quarter), PivotArea::Columns);
    a.place(FieldRef::plain("Sales"), PivotArea::Values);
    a.place(FieldRef::plain("Units"), PivotArea::Values);
    a.set_aggregation(&FieldRef::plain("Units"), AggregationType::Average);
    a
}

fn bench_build_pivot(c: &mut Criterion) {
    let options = PivotOptions::default();
    let assignment = assignment();

    for size in [1_000usize, 100_000] {
        let records = synthetic_records(size);
        c.bench_function(&format!("build_pivot_{}", size), |b| {
            b.iter(|| black_box(build_pivot(black_box(&records), &assignment, &options)))
        });
    }
}

criterion_group!(benches, bench_build_pivot);
criterion_main!(benches);
