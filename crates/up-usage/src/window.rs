//! Windowed iteration over hour-partitioned usage.
//!
//! [`UsageQueryIterator`] splits `[start, end)` into consecutive windows of a
//! fixed number of hours so a long export can be issued as several bounded
//! range scans instead of one unbounded scan.

use chrono::{DateTime, TimeDelta, Utc};

use crate::error::{Result, UsageError};
use crate::query::compute_offsets;
use crate::types::UsageWindow;

/// Position of a [`UsageQueryIterator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WindowCursor {
    /// The next window starts here.
    Active(DateTime<Utc>),
    /// Every window has been produced.
    Exhausted,
}

/// Produces the [`UsageWindow`]s covering a time range for one account.
///
/// Callers either drive it with [`more`](Self::more) / [`advance`](Self::advance)
/// or use it as an [`Iterator`].
///
/// ```
/// use chrono::{TimeDelta, TimeZone, Utc};
/// use up_usage::UsageQueryIterator;
///
/// let start = Utc.with_ymd_and_hms(2006, 5, 4, 3, 0, 0).unwrap();
/// let end = Utc.with_ymd_and_hms(2006, 5, 4, 6, 0, 0).unwrap();
/// let iter = UsageQueryIterator::new("test-account", start, end, TimeDelta::hours(2)).unwrap();
///
/// let hours: Vec<_> = iter.map(|w| (w.start, w.end)).collect();
/// assert_eq!(hours.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageQueryIterator {
    account: String,
    cursor: WindowCursor,
    end_time: DateTime<Utc>,
    window: TimeDelta,
}

impl UsageQueryIterator {
    /// Creates an iterator over `[start, end)` in steps of `window`.
    ///
    /// `start`, `end` and `window` are truncated to whole hours.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::InvalidWindow`] if `window` is shorter than one
    /// hour and [`UsageError::InvalidRange`] if `end` precedes `start`.
    pub fn new(
        account: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        window: TimeDelta,
    ) -> Result<Self> {
        if window < TimeDelta::hours(1) {
            return Err(UsageError::InvalidWindow);
        }
        let account = account.into();
        let (_, start, end_time) = compute_offsets(&account, start, end)?;
        let cursor = if start < end_time {
            WindowCursor::Active(start)
        } else {
            WindowCursor::Exhausted
        };

        Ok(Self {
            account,
            cursor,
            end_time,
            window: TimeDelta::hours(window.num_hours()),
        })
    }

    /// Returns true while at least one window remains. Does not change state.
    #[must_use]
    pub const fn more(&self) -> bool {
        matches!(self.cursor, WindowCursor::Active(_))
    }

    /// Produces the next window and moves the cursor to its end.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::Exhausted`] if called after the final window.
    pub fn advance(&mut self) -> Result<UsageWindow> {
        let WindowCursor::Active(cursor) = self.cursor else {
            return Err(UsageError::Exhausted);
        };

        let step_end = cursor
            .checked_add_signed(self.window)
            .map_or(self.end_time, |t| t.min(self.end_time));
        let (query, start, end) = compute_offsets(&self.account, cursor, step_end)?;

        self.cursor = if step_end < self.end_time {
            WindowCursor::Active(step_end)
        } else {
            WindowCursor::Exhausted
        };

        Ok(UsageWindow { query, start, end })
    }

    /// Account embedded in every offset.
    #[must_use]
    pub fn account(&self) -> &str {
        &self.account
    }

    #[cfg(test)]
    pub(crate) const fn cursor(&self) -> WindowCursor {
        self.cursor
    }

    /// Truncated end of the whole range.
    #[must_use]
    pub const fn end_time(&self) -> DateTime<Utc> {
        self.end_time
    }

    /// Truncated window size.
    #[must_use]
    pub const fn window(&self) -> TimeDelta {
        self.window
    }

    /// Number of windows left to produce.
    #[must_use]
    pub fn remaining(&self) -> usize {
        match self.cursor {
            WindowCursor::Exhausted => 0,
            WindowCursor::Active(cursor) => {
                let span = (self.end_time - cursor).num_hours();
                let step = self.window.num_hours();
                usize::try_from((span + step - 1) / step).unwrap_or(usize::MAX)
            }
        }
    }
}

impl Iterator for UsageQueryIterator {
    type Item = UsageWindow;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.more() {
            return None;
        }
        // Only `Exhausted` can fail `advance`, and `more` rules it out.
        self.advance().ok()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining();
        (n, Some(n))
    }
}
