//! Whether a cached collection can be used as-is.

use time::{Duration, UtcDateTime};

/// The freshness window for a number of whole days.
pub fn max_age(days: u32) -> Duration {
    Duration::days(i64::from(days))
}

/// A collection is fresh if it has been synced at all and its last sync is
/// no older than `max_age`. The boundary itself counts as fresh.
pub fn is_fresh(last_synced_at: Option<UtcDateTime>, max_age: Duration, now: UtcDateTime) -> bool {
    last_synced_at.is_some_and(|synced| now - synced <= max_age)
}
