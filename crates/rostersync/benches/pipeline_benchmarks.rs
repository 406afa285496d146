//! Pipeline performance benchmarks.
//!
//! Measures loading (UTF-8 and Shift_JIS), field inference and reconciliation.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rostersync::input::CsvLoader;
use rostersync::inference::FieldDetector;
use rostersync::{Reconciler, Roster, RosterRecord};

const SURNAMES: [&str; 5] = ["田中", "佐藤", "鈴木", "山田", "高橋"];
const GIVEN_NAMES: [&str; 4] = ["太郎", "花子", "一郎", "美咲"];
const POSITIONS: [&str; 4] = ["部長", "課長", "主任", "スタッフ"];
const DEPARTMENTS: [&str; 4] = ["営業部", "技術部", "経理部", "人事部"];

/// Generate a user roster CSV with Japanese headers.
fn generate_users_csv(rows: usize) -> String {
    let mut data = String::from("氏名,メールアドレス,役職,部署\n");

    for row in 0..rows {
        data.push_str(&format!(
            "{} {},user{:06}@example.com,{},{}\n",
            SURNAMES[row % SURNAMES.len()],
            GIVEN_NAMES[row % GIVEN_NAMES.len()],
            row,
            POSITIONS[row % POSITIONS.len()],
            DEPARTMENTS[(row / 3) % DEPARTMENTS.len()],
        ));
    }

    data
}

/// Roster covering every other CSV user plus some users to delete.
fn generate_roster(rows: usize) -> Roster {
    (0..rows)
        .step_by(2)
        .map(|row| {
            RosterRecord::new(format!("user{:06}@example.com", row))
                .with_position(POSITIONS[(row + 1) % POSITIONS.len()])
                .with_department(DEPARTMENTS[(row / 3) % DEPARTMENTS.len()])
        })
        .chain((0..rows / 10).map(|i| RosterRecord::new(format!("former{:06}@example.com", i))))
        .collect()
}

fn bench_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("load");

    for rows in [100, 1_000, 10_000].iter() {
        let utf8 = generate_users_csv(*rows);
        let (sjis, _, _) = encoding_rs::SHIFT_JIS.encode(&utf8);
        let sjis = sjis.into_owned();

        group.throughput(Throughput::Bytes(utf8.len() as u64));
        group.bench_with_input(BenchmarkId::new("utf8", rows), &utf8, |b, data| {
            let loader = CsvLoader::new();
            b.iter(|| black_box(loader.load_bytes(data.as_bytes()).unwrap()))
        });
        group.bench_with_input(BenchmarkId::new("shift_jis", rows), &sjis, |b, data| {
            let loader = CsvLoader::new();
            b.iter(|| black_box(loader.load_bytes(data).unwrap()))
        });
    }

    group.finish();
}

fn bench_inference(c: &mut Criterion) {
    let mut group = c.benchmark_group("auto_detect_fields");

    for rows in [100, 10_000].iter() {
        let (table, _) = CsvLoader::new()
            .load_bytes(generate_users_csv(*rows).as_bytes())
            .unwrap();

        group.bench_with_input(BenchmarkId::new("rows", rows), &table, |b, table| {
            let detector = FieldDetector::new();
            b.iter(|| black_box(detector.auto_detect_fields(table)))
        });
    }

    group.finish();
}

fn bench_reconcile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compare_users");

    for rows in [1_000, 10_000].iter() {
        let (table, _) = CsvLoader::new()
            .load_bytes(generate_users_csv(*rows).as_bytes())
            .unwrap();
        let mapping = FieldDetector::new().auto_detect_fields(&table);
        let roster = generate_roster(*rows);

        group.throughput(Throughput::Elements(*rows as u64));
        group.bench_with_input(BenchmarkId::new("rows", rows), &table, |b, table| {
            let reconciler = Reconciler::new();
            b.iter(|| black_box(reconciler.compare_users(table, &mapping, &roster).unwrap()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_load, bench_inference, bench_reconcile);
criterion_main!(benches);
