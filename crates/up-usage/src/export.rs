//! Windowed export of usage events.

use std::io::Write;

use serde::Serialize;
use tracing::{debug, info_span};

use crate::encoding::JsonArrayEncoder;
use crate::error::Result;
use crate::store::UsageStore;
use crate::window::UsageQueryIterator;

/// Counts gathered while exporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExportSummary {
    /// Windows queried.
    pub windows: usize,
    /// Objects read.
    pub objects: usize,
    /// Events written.
    pub events: usize,
}

/// Queries `store` one window at a time and writes every event to `encoder`.
///
/// Windows are pulled with [`UsageQueryIterator::advance`] and any failed
/// step ends the export with its error. The encoder is left open so the
/// caller decides whether to close it or discard the output after an error.
///
/// # Errors
///
/// Returns the first listing, read, encoding or write error. Events written
/// before the error remain in the sink.
pub fn export_usage<S, W>(
    store: &S,
    mut windows: UsageQueryIterator,
    encoder: &mut JsonArrayEncoder<W>,
) -> Result<ExportSummary>
where
    S: UsageStore + ?Sized,
    W: Write,
{
    let mut summary = ExportSummary::default();
    while windows.more() {
        let window = windows.advance()?;
        let span = info_span!("usage_window", start = %window.start, end = %window.end);
        let _enter = span.enter();

        let keys = store.list(&window.query)?;
        for key in &keys {
            for event in store.read(key)? {
                encoder.encode(&event)?;
                summary.events += 1;
            }
        }
        summary.windows += 1;
        summary.objects += keys.len();
        debug!(objects = keys.len(), events = summary.events, "exported window");
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use chrono::{DateTime, TimeDelta, TimeZone, Utc};

    use crate::error::UsageError;
    use crate::types::{EventTags, UsageEvent, UsageQuery};

    /// In-memory store keyed by object key.
    #[derive(Default)]
    struct MemoryStore {
        objects: BTreeMap<String, Vec<UsageEvent>>,
        fail_reads: bool,
        /// Listing fails for windows starting at or after this offset.
        fail_list_from: Option<String>,
    }

    impl UsageStore for MemoryStore {
        fn list(&self, query: &UsageQuery) -> Result<Vec<String>> {
            if self
                .fail_list_from
                .as_ref()
                .is_some_and(|from| query.start_offset >= *from)
            {
                return Err(UsageError::Io(std::io::Error::other("listing timed out")));
            }
            Ok(self
                .objects
                .keys()
                .filter(|k| query.contains(k))
                .cloned()
                .collect())
        }

        fn read(&self, key: &str) -> Result<Vec<UsageEvent>> {
            if self.fail_reads {
                return Err(UsageError::Io(std::io::Error::other("backend down")));
            }
            Ok(self.objects.get(key).cloned().unwrap_or_default())
        }
    }

    fn at(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2006, 5, d, h, 0, 0).unwrap()
    }

    fn event(d: u32, h: u32) -> UsageEvent {
        UsageEvent {
            name: "max_resource_count_per_gvk_per_mcp".into(),
            tags: EventTags {
                account: "acme".into(),
                kind: "Bucket".into(),
                ..EventTags::default()
            },
            timestamp: at(d, h),
            timestamp_end: at(d, h) + TimeDelta::hours(1),
            value: f64::from(h),
        }
    }

    fn store() -> MemoryStore {
        let mut store = MemoryStore::default();
        for (d, h) in [(4, 22), (4, 23), (5, 0), (5, 1), (5, 2)] {
            let key = format!("{}part-0.json", crate::partition_offset("acme", at(d, h)));
            store.objects.insert(key, vec![event(d, h)]);
        }
        store
    }

    #[test]
    fn exports_events_in_window_order() {
        let store = store();
        let iter = UsageQueryIterator::new("acme", at(4, 23), at(5, 2), TimeDelta::hours(2)).unwrap();
        let mut enc = JsonArrayEncoder::new(Vec::new()).unwrap();

        let summary = export_usage(&store, iter, &mut enc).unwrap();
        assert_eq!(
            summary,
            ExportSummary {
                windows: 2,
                objects: 3,
                events: 3
            }
        );

        let out = enc.close().unwrap();
        let events: Vec<UsageEvent> = serde_json::from_slice(&out).unwrap();
        let hours: Vec<_> = events.iter().map(|e| e.timestamp).collect();
        assert_eq!(hours, vec![at(4, 23), at(5, 0), at(5, 1)]);
    }

    #[test]
    fn empty_range_exports_empty_array() {
        let store = store();
        let iter = UsageQueryIterator::new("acme", at(5, 0), at(5, 0), TimeDelta::hours(1)).unwrap();
        let mut enc = JsonArrayEncoder::new(Vec::new()).unwrap();

        let summary = export_usage(&store, iter, &mut enc).unwrap();
        assert_eq!(summary, ExportSummary::default());

        let out = enc.close().unwrap();
        let events: Vec<UsageEvent> = serde_json::from_slice(&out).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn read_failure_stops_export() {
        let mut store = store();
        store.fail_reads = true;
        let iter = UsageQueryIterator::new("acme", at(4, 22), at(5, 2), TimeDelta::hours(1)).unwrap();
        let mut enc = JsonArrayEncoder::new(Vec::new()).unwrap();

        let err = export_usage(&store, iter, &mut enc).unwrap_err();
        assert!(matches!(err, UsageError::Io(_)));
        assert!(!enc.wrote_first_item());
    }

    #[test]
    fn later_window_failure_is_returned() {
        let mut store = store();
        store.fail_list_from = Some(crate::partition_offset("acme", at(5, 0)));
        let iter = UsageQueryIterator::new("acme", at(4, 22), at(5, 2), TimeDelta::hours(2)).unwrap();
        let mut enc = JsonArrayEncoder::new(Vec::new()).unwrap();

        let err = export_usage(&store, iter, &mut enc).unwrap_err();
        assert!(matches!(err, UsageError::Io(_)));

        // The first window's events were already written before the failure.
        assert!(enc.wrote_first_item());
        let out = enc.close().unwrap();
        let events: Vec<UsageEvent> = serde_json::from_slice(&out).unwrap();
        let hours: Vec<_> = events.iter().map(|e| e.timestamp).collect();
        assert_eq!(hours, vec![at(4, 22), at(4, 23)]);
    }
}
