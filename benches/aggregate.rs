use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use polars::prelude::*;
use tehsil_weather::{aggregate, FilterCascade, ObservationTable, Selection};

fn synthetic_table() -> ObservationTable {
    let days = 30;
    let tehsils = 500;
    let mut dates = Vec::with_capacity(days * tehsils);
    let mut states = Vec::with_capacity(days * tehsils);
    let mut districts = Vec::with_capacity(days * tehsils);
    let mut names = Vec::with_capacity(days * tehsils);
    let mut values = Vec::with_capacity(days * tehsils);
    for day in 0..days {
        for t in 0..tehsils {
            dates.push(format!("2020-06-{:02}", day + 1));
            states.push(format!("state_{}", t % 10));
            districts.push(format!("district_{}", t % 50));
            names.push(format!("tehsil_{t}"));
            values.push((day * t % 97) as f64);
        }
    }
    let df = df!(
        "date" => dates,
        "state" => states,
        "district" => districts,
        "tehsil" => names,
        "rain_mm" => values,
    )
    .unwrap();
    ObservationTable::try_new(df).unwrap()
}

fn bench_pipeline(c: &mut Criterion) {
    let table = synthetic_table();
    let date = NaiveDate::from_ymd_opt(2020, 6, 15).unwrap();

    c.bench_function("filter_date", |b| {
        b.iter(|| FilterCascade::for_date(black_box(&table), date).unwrap())
    });

    let cascade = FilterCascade::for_date(&table, date).unwrap();
    c.bench_function("cascade_run", |b| {
        b.iter(|| cascade.run(black_box(&Selection::default())).unwrap())
    });
    c.bench_function("aggregate", |b| {
        b.iter(|| aggregate(black_box(cascade.frame()), "rain_mm").unwrap())
    });
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
