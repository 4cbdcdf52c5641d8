//! History persistence through the file-backed store.

use cihub_cli::history::{HistoryCache, HISTORY_CAPACITY, HISTORY_KEY};
use cihub_cli::model::{
    normalize, EstimateOutcome, EstimateResponse, HistoryEntry, MonthlyForecast, RawFields,
    UnitFootprint,
};
use cihub_cli::storage::FileStore;
use std::fs;
use std::path::Path;

fn entry(ts: i64, region: &str) -> HistoryEntry {
    let input = normalize(&RawFields {
        region: region.into(),
        ..RawFields::default()
    });
    HistoryEntry::record_at(
        ts,
        input,
        EstimateOutcome::Report(EstimateResponse {
            risk_score: 88.0,
            per_1k_requests: UnitFootprint {
                cost_usd: 0.008,
                co2_g: 1.5,
            },
            monthly_forecast: MonthlyForecast {
                cost_usd: 3.1,
                co2_kg: 0.6,
            },
            suggested_yaml: "cpu: 1\n".into(),
            advice: vec!["keep automated checks per deploy".into()],
        }),
    )
}

fn open(dir: &Path) -> HistoryCache {
    HistoryCache::open(Box::new(FileStore::open_at(dir)))
}

#[test]
fn file_backed_history_round_trips() {
    let tmp = tempfile::tempdir().unwrap();
    let mut cache = open(tmp.path());
    for (n, region) in ["asia-south1", "us-west1", "europe-west4"].iter().enumerate() {
        cache.append(entry(1_700_000_000_000 + n as i64, region));
    }
    assert!(cache.persist_error().is_none());

    let reloaded = open(tmp.path());
    assert_eq!(reloaded.entries(), cache.entries());
    assert_eq!(reloaded.entries()[0].region, "europe-west4");
}

#[test]
fn corrupt_blob_on_disk_initializes_empty_then_heals() {
    let tmp = tempfile::tempdir().unwrap();
    let blob_path = tmp.path().join(format!("{HISTORY_KEY}.json"));
    fs::write(&blob_path, "{not json").unwrap();

    let mut cache = open(tmp.path());
    assert!(cache.is_empty());

    // The next append rewrites the blob from the in-memory truth.
    cache.append(entry(1_700_000_000_001, "us-east1"));
    let reloaded = open(tmp.path());
    assert_eq!(reloaded.len(), 1);
    assert_eq!(reloaded.entries()[0].region, "us-east1");
}

#[test]
fn capacity_holds_across_sessions() {
    let tmp = tempfile::tempdir().unwrap();

    let mut first = open(tmp.path());
    for n in 0..6 {
        first.append(entry(n, &format!("first-{n}")));
    }
    drop(first);

    let mut second = open(tmp.path());
    assert_eq!(second.len(), 6);
    for n in 6..12 {
        second.append(entry(n, &format!("second-{n}")));
    }
    assert_eq!(second.len(), HISTORY_CAPACITY);
    assert_eq!(second.entries()[0].region, "second-11");
    assert!(second.entries().iter().all(|e| e.region != "first-0"));

    let third = open(tmp.path());
    assert_eq!(third.len(), HISTORY_CAPACITY);
    assert_eq!(third.entries(), second.entries());
}

#[test]
fn missing_data_directory_is_an_empty_history() {
    let tmp = tempfile::tempdir().unwrap();
    let cache = open(&tmp.path().join("never-created"));
    assert!(cache.is_empty());
}
