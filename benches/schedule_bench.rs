//! Benchmarks for MedHere schedule building and the medication store
//!
//! Run with: cargo bench

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use medhere::schedule::*;
use medhere::storage::{MedicationStore, StorageConfig};
use tempfile::tempdir;

const FREQUENCIES: [(Frequency, &[&str]); 5] = [
    (Frequency::OnceDaily, &["08:00"]),
    (Frequency::TwiceDaily, &["08:00", "20:00"]),
    (Frequency::ThreeTimesDaily, &["08:00", "14:00", "20:00"]),
    (Frequency::Weekly, &["09:00"]),
    (Frequency::AsNeeded, &[]),
];

fn create_test_meds(count: usize) -> Vec<Medication> {
    (0..count)
        .map(|i| {
            let (frequency, times) = FREQUENCIES[i % FREQUENCIES.len()];
            let mut draft = MedicationDraft::new(format!("Drug {}", i), 10.0, "mg", "2025-01-01")
                .frequency(frequency)
                .end_date("2025-12-31");
            for t in times {
                draft = draft.time(*t);
            }
            draft.validate(i as u64 + 1).unwrap()
        })
        .collect()
}

fn create_test_log(meds: &[Medication], date: NaiveDate) -> CheckoffLog {
    let mut log = CheckoffLog::new();
    for day in date.iter_days().take(31) {
        for med in meds.iter().step_by(2) {
            for time in &med.times {
                log.set(day, &med.dose_key(Some(*time)), true);
            }
        }
    }
    log
}

fn bench_doses(c: &mut Criterion) {
    let mut group = c.benchmark_group("doses");
    let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
    let now = date.and_hms_opt(12, 0, 0).unwrap();

    for size in [10, 100, 1000] {
        let meds = create_test_meds(size);
        let log = create_test_log(&meds, date);

        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("doses_for_day_{}", size), |b| {
            b.iter(|| doses_for_day(black_box(&meds), date, &log, now))
        });
    }

    group.finish();
}

fn bench_calendar(c: &mut Criterion) {
    let mut group = c.benchmark_group("calendar");
    let anchor = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();
    let now = anchor.and_hms_opt(12, 0, 0).unwrap();
    let meds = create_test_meds(50);
    let log = create_test_log(&meds, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());

    for view in [CalendarView::Day, CalendarView::Week, CalendarView::Month] {
        group.bench_function(format!("build_{:?}", view).to_lowercase(), |b| {
            b.iter(|| build_calendar(black_box(&meds), view, anchor, &log, now))
        });
    }

    group.bench_function("medication_color", |b| {
        b.iter(|| medication_color(black_box("Hydrochlorothiazide")))
    });

    group.finish();
}

fn bench_store(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    let mut group = c.benchmark_group("store");

    group.bench_function("add_single", |b| {
        b.iter_custom(|iters| {
            rt.block_on(async {
                let dir = tempdir().unwrap();
                let store = MedicationStore::open(StorageConfig::new(dir.path())).await.unwrap();

                let start = std::time::Instant::now();

                for i in 0..iters {
                    let draft = MedicationDraft::new(format!("Drug {}", i), 10.0, "mg", "2025-01-01")
                        .time("08:00");
                    store.add("bench", draft).await.unwrap();
                }

                start.elapsed()
            })
        });
    });

    group.bench_function("toggle_dose", |b| {
        b.iter_custom(|iters| {
            rt.block_on(async {
                let dir = tempdir().unwrap();
                let store = MedicationStore::open(StorageConfig::new(dir.path())).await.unwrap();
                let med = store
                    .add("bench", MedicationDraft::new("Tylenol", 650.0, "mg", "2025-01-01").time("08:00"))
                    .await
                    .unwrap();
                let key = med.dose_key(med.times.first().copied());
                let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();

                let start = std::time::Instant::now();

                for _ in 0..iters {
                    store.toggle_dose("bench", date, black_box(&key)).await.unwrap();
                }

                start.elapsed()
            })
        });
    });

    group.finish();
}

criterion_group!(benches, bench_doses, bench_calendar, bench_store);
criterion_main!(benches);
