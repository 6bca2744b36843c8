use std::fmt::Write as _;

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use csv_layout::annotation::parse_columns;
use csv_layout::compare::{SortDirection, SortState, sort_rows};
use csv_layout::csv_input::{CsvTable, parse_csv};
use csv_layout::host::{HostProfile, ResourceNeeds, ResourceSet};
use csv_layout::sizing::ColumnSizingEngine;

const STATUSES: [&str; 5] = ["critical", "healthy", "Very_Low", "idle", "unknown"];
const UPTIMES: [&str; 4] = ["3 days", "45 minutes", "2 weeks", "12 hours"];

fn generate_fleet(rows: usize) -> CsvTable {
    let mut text = String::from("Host,Severity [status|c],Uptime [r],Tags [chips],Online [bool]\n");
    for i in 0..rows {
        let status = STATUSES[i % STATUSES.len()];
        let uptime = UPTIMES[i % UPTIMES.len()];
        let online = if i % 2 == 0 { "yes" } else { "no" };
        let _ = writeln!(text, "host-{i:05},{status},{uptime},\"edge, zone-{}\",{online}", i % 7);
    }
    parse_csv(&text, b',').expect("parse fleet")
}

fn bench_sort_and_size(c: &mut Criterion) {
    let table = generate_fleet(5_000);
    let columns = parse_columns(&table.headers);
    let profile = HostProfile::default();
    let resources = ResourceSet::resolve(&columns, ResourceNeeds::default(), &profile, &profile);

    let mut group = c.benchmark_group("sort_and_size");

    for (name, by) in [("status", "Severity [status|c]"), ("duration", "Uptime [r]")] {
        let sort = SortState::new(by, SortDirection::Descending);
        group.bench_function(format!("sort_by_{name}"), |b| {
            b.iter_batched(
                || table.rows.clone(),
                |rows| sort_rows(&columns, rows, &sort),
                BatchSize::LargeInput,
            );
        });
    }

    group.bench_function("size_columns", |b| {
        let engine = ColumnSizingEngine::new(&profile, &resources);
        let sort = SortState::none();
        b.iter(|| engine.size(&columns, &table.rows, &sort));
    });

    group.finish();
}

criterion_group!(benches, bench_sort_and_size);
criterion_main!(benches);
