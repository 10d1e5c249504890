use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use socks_infra::import::{BatchImporter, CsvSheet};
use socks_infra::ledger::StockLedger;
use socks_infra::stock_store::InMemoryStockStore;
use socks_inventory::{filter_and_sort, Movement, SortKey, StockLevel, StockQuery, StockSnapshot};

const COLORS: [&str; 5] = ["Red", "Blue", "Green", "Black", "White"];

fn snapshot_of(size: usize) -> StockSnapshot {
    (0..size)
        .map(|i| StockLevel::new(COLORS[i % COLORS.len()], (i * 7 % 101) as i32, i as u32))
        .collect()
}

fn batch_csv(rows: usize) -> String {
    let mut out = String::from("color,cotton,quantity\n");
    for i in 0..rows {
        out.push_str(&format!("{}-{},{},{}\n", COLORS[i % COLORS.len()], i, i % 101, i));
    }
    out
}

fn bench_ledger_latency(c: &mut Criterion) {
    let mut group = c.benchmark_group("ledger_latency");
    group.sample_size(1000);

    // Arrival into an existing row (merge path).
    group.bench_function("arrival_merge", |b| {
        let ledger = StockLedger::new(InMemoryStockStore::new());
        ledger.record_arrival(&Movement::new("Red", 40, 0)).unwrap();
        b.iter(|| {
            ledger
                .record_arrival(&Movement::new("Red", 40, black_box(1)))
                .unwrap();
        });
    });

    // Departure that is always rejected (no write).
    group.bench_function("departure_rejected", |b| {
        let ledger = StockLedger::new(InMemoryStockStore::new());
        ledger.record_arrival(&Movement::new("Red", 40, 1)).unwrap();
        b.iter(|| {
            let _ = black_box(ledger.record_departure(&Movement::new("Red", 40, 2)));
        });
    });

    group.finish();
}

fn bench_filter_and_sort(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter_and_sort");

    for size in [100usize, 1_000, 10_000].iter() {
        let snapshot = snapshot_of(*size);
        let query = StockQuery::new()
            .color("red")
            .min_cotton(20)
            .max_cotton(80)
            .sort_by(SortKey::Cotton);

        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("red_20_80_by_cotton", size), size, |b, _| {
            b.iter(|| black_box(filter_and_sort(&snapshot, &query)));
        });
    }

    group.finish();
}

fn bench_batch_import(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_import");

    for rows in [10usize, 100, 1_000].iter() {
        let csv = batch_csv(*rows);
        group.throughput(Throughput::Elements(*rows as u64));
        group.bench_with_input(BenchmarkId::new("csv_rows", rows), rows, |b, _| {
            b.iter(|| {
                let importer = BatchImporter::new(InMemoryStockStore::new());
                let mut sheet = CsvSheet::from_bytes("bench.csv", csv.as_bytes());
                black_box(importer.import_rows(&mut sheet).unwrap());
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_ledger_latency,
    bench_filter_and_sort,
    bench_batch_import
);
criterion_main!(benches);
