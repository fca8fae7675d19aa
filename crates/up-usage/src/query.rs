//! Partition offsets for hour-partitioned usage objects.
//!
//! Usage objects are keyed `account=<account>/date=<YYYY-MM-DD>/hour=<HH>/...`,
//! so a range of hours maps to a lexical key range between two such prefixes.

use chrono::{DateTime, NaiveTime, TimeDelta, Timelike, Utc};

use crate::error::{Result, UsageError};
use crate::types::UsageQuery;

/// Truncates an instant down to the start of its UTC hour.
///
/// Works for every instant `DateTime<Utc>` can represent.
#[must_use]
pub fn truncate_to_hour(t: DateTime<Utc>) -> DateTime<Utc> {
    let hour = NaiveTime::MIN + TimeDelta::hours(i64::from(t.hour()));
    t.date_naive().and_time(hour).and_utc()
}

/// Renders the partition prefix for the hour containing `t`.
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use up_usage::partition_offset;
///
/// let t = Utc.with_ymd_and_hms(2006, 5, 4, 3, 0, 0).unwrap();
/// assert_eq!(
///     partition_offset("test-account", t),
///     "account=test-account/date=2006-05-04/hour=03/"
/// );
/// ```
#[must_use]
pub fn partition_offset(account: &str, t: DateTime<Utc>) -> String {
    format!(
        "account={account}/date={}/hour={:02}/",
        t.format("%Y-%m-%d"),
        t.hour()
    )
}

/// Builds the key range covering `[start, end)` for `account` as a single
/// query. Sub-hour precision of both bounds is ignored.
///
/// # Errors
///
/// Returns [`UsageError::InvalidRange`] if `end` precedes `start`.
pub fn usage_query(account: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<UsageQuery> {
    compute_offsets(account, start, end).map(|(query, _, _)| query)
}

/// Validates and truncates `[start, end)`, returning its key range alongside
/// the truncated bounds.
pub(crate) fn compute_offsets(
    account: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<(UsageQuery, DateTime<Utc>, DateTime<Utc>)> {
    if end < start {
        return Err(UsageError::InvalidRange);
    }
    let start = truncate_to_hour(start);
    let end = truncate_to_hour(end);
    let query = UsageQuery {
        start_offset: partition_offset(account, start),
        end_offset: partition_offset(account, end),
    };
    Ok((query, start, end))
}
