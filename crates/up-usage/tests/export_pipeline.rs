//! End-to-end export from an hour-partitioned directory into a JSON file.

use std::fs;
use std::io::BufWriter;
use std::path::Path;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use tempfile::TempDir;

use up_usage::{
    export_usage, partition_offset, EventTags, FileUsageStore, JsonArrayEncoder, UsageError,
    UsageEvent, UsageQueryIterator, UsageStore,
};

fn at(d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2006, 5, d, h, 0, 0).unwrap()
}

fn event(account: &str, kind: &str, t: DateTime<Utc>) -> UsageEvent {
    UsageEvent {
        name: "max_resource_count_per_gvk_per_mcp".into(),
        tags: EventTags {
            group: "example.org".into(),
            version: "v1alpha1".into(),
            kind: kind.into(),
            account: account.into(),
            mcp_id: "8f5c7c2e".into(),
        },
        timestamp: t,
        timestamp_end: t + TimeDelta::hours(1),
        value: 2.0,
    }
}

fn write_object(root: &Path, key: &str, events: &[UsageEvent]) {
    let path = root.join(key);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let body: String = events
        .iter()
        .map(|e| serde_json::to_string(e).unwrap() + "\n")
        .collect();
    fs::write(path, body).unwrap();
}

/// Two days of hourly objects for `acme` plus a neighbouring account.
fn seed(root: &Path) {
    let mut t = at(4, 0);
    while t < at(6, 0) {
        let key = format!("{}part-0000.json", partition_offset("acme", t));
        write_object(root, &key, &[event("acme", "Bucket", t), event("acme", "Queue", t)]);
        let other = format!("{}part-0000.json", partition_offset("acme-dev", t));
        write_object(root, &other, &[event("acme-dev", "Bucket", t)]);
        t += TimeDelta::hours(1);
    }
}

#[test]
fn export_day_in_six_hour_windows() {
    let store_dir = TempDir::new().unwrap();
    seed(store_dir.path());
    let store = FileUsageStore::with_root(store_dir.path()).unwrap();

    let out_dir = TempDir::new().unwrap();
    let out_path = out_dir.path().join("usage.json");
    let file = fs::File::create(&out_path).unwrap();

    let iter = UsageQueryIterator::new("acme", at(4, 12), at(5, 12), TimeDelta::hours(6)).unwrap();
    let mut enc = JsonArrayEncoder::new(BufWriter::new(file)).unwrap();
    let summary = export_usage(&store, iter, &mut enc).unwrap();
    enc.close().unwrap();

    assert_eq!(summary.windows, 4);
    assert_eq!(summary.objects, 24);
    assert_eq!(summary.events, 48);

    let events: Vec<UsageEvent> =
        serde_json::from_str(&fs::read_to_string(&out_path).unwrap()).unwrap();
    assert_eq!(events.len(), 48);
    assert!(events.iter().all(|e| e.tags.account == "acme"));
    assert_eq!(events.first().unwrap().timestamp, at(4, 12));
    assert_eq!(events.last().unwrap().timestamp, at(5, 11));
    assert!(events.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
}

#[test]
fn windowed_and_single_shot_listings_agree() {
    let store_dir = TempDir::new().unwrap();
    seed(store_dir.path());
    let store = FileUsageStore::with_root(store_dir.path()).unwrap();

    let single = store
        .list(&up_usage::usage_query("acme", at(4, 3), at(5, 20)).unwrap())
        .unwrap();
    let windowed: Vec<String> =
        UsageQueryIterator::new("acme", at(4, 3), at(5, 20), TimeDelta::hours(5))
            .unwrap()
            .flat_map(|w| store.list(&w.query).unwrap())
            .collect();

    assert_eq!(single.len(), 41);
    assert_eq!(single, windowed);
}

#[test]
fn malformed_object_aborts_export() {
    let store_dir = TempDir::new().unwrap();
    seed(store_dir.path());
    let bad = format!("{}part-0001.json", partition_offset("acme", at(4, 2)));
    fs::write(store_dir.path().join(&bad), "{\"name\":\n").unwrap();
    let store = FileUsageStore::with_root(store_dir.path()).unwrap();

    let iter = UsageQueryIterator::new("acme", at(4, 0), at(4, 6), TimeDelta::hours(1)).unwrap();
    let mut enc = JsonArrayEncoder::new(Vec::new()).unwrap();
    let err = export_usage(&store, iter, &mut enc).unwrap_err();

    match err {
        UsageError::Parse { key, line, .. } => {
            assert_eq!(key, bad);
            assert_eq!(line, 1);
        }
        other => panic!("expected parse error, got {other:?}"),
    }
}
