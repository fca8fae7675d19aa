//! # up-usage
//!
//! Usage reporting for managed control planes.
//!
//! Usage events are stored in an object store partitioned by account and UTC
//! hour (`account=<A>/date=<YYYY-MM-DD>/hour=<HH>/`). This crate provides:
//!
//! - [`usage_query`] — The key range covering a time range in one scan
//! - [`UsageQueryIterator`] — The same range split into bounded windows
//! - [`JsonArrayEncoder`] — Streaming JSON array output
//! - [`UsageStore`] / [`FileUsageStore`] — Range listing over stored objects
//! - [`export_usage`] — Windowed export from a store into an encoder
//!
//! ## Example
//!
//! ```rust
//! use chrono::{TimeDelta, TimeZone, Utc};
//! use up_usage::UsageQueryIterator;
//!
//! let start = Utc.with_ymd_and_hms(2006, 5, 4, 3, 0, 0).unwrap();
//! let end = Utc.with_ymd_and_hms(2006, 5, 4, 6, 0, 0).unwrap();
//! let mut iter = UsageQueryIterator::new("test-account", start, end, TimeDelta::hours(1)).unwrap();
//!
//! while iter.more() {
//!     let window = iter.advance().unwrap();
//!     println!("{} .. {}", window.query.start_offset, window.query.end_offset);
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod encoding;
pub mod error;
pub mod export;
pub mod query;
pub mod store;
pub mod types;
pub mod window;

pub use encoding::JsonArrayEncoder;
pub use error::{Result, UsageError};
pub use export::{export_usage, ExportSummary};
pub use query::{partition_offset, truncate_to_hour, usage_query};
pub use store::{FileUsageStore, FileUsageStoreConfig, UsageStore};
pub use types::{EventTags, UsageEvent, UsageQuery, UsageWindow};
pub use window::UsageQueryIterator;
