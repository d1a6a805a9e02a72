use crate::error::Result;
use async_trait::async_trait;
use shelfsync_records::{Record, Source};
use std::cmp::Ordering;
use time::UtcDateTime;

/// Keyed record storage for a single source.
#[async_trait]
pub trait LocalStore: Send + Sync {
    /// The source every record in this store belongs to.
    fn source(&self) -> Source;

    /// Every stored record, in [`stored_order`].
    ///
    /// Collections hydrated from this list inherit its order, so their
    /// derived partitions come out the same on every reload.
    async fn find_all(&self) -> Result<Vec<Record>>;

    /// Insert or replace the record with the same stable ID.
    ///
    /// Raises [`MissingId`](crate::error::ErrorKind::MissingId) for records
    /// that don't have one.
    async fn upsert(&self, record: &Record) -> Result<()>;

    /// Returns `true` if a record was deleted.
    async fn delete(&self, id: &str) -> Result<bool>;

    async fn count(&self) -> Result<u64>;
}

/// Last-synced timestamps, one per named collection.
#[async_trait]
pub trait SyncMarkerStore: Send + Sync {
    async fn find(&self, name: &str) -> Result<Option<UtcDateTime>>;

    async fn touch(&self, name: &str, at: UtcDateTime) -> Result<()>;
}

/// The order [`LocalStore::find_all`] returns records in: finish date
/// descending, then percent complete descending, then title ascending, then
/// ID ascending. Missing values sort last at every level.
pub fn stored_order(a: &Record, b: &Record) -> Ordering {
    fn desc<T: Ord>(a: Option<T>, b: Option<T>) -> Ordering {
        match (a, b) {
            (Some(a), Some(b)) => b.cmp(&a),
            (a, b) => a.is_none().cmp(&b.is_none()),
        }
    }
    fn asc<T: Ord>(a: Option<T>, b: Option<T>) -> Ordering {
        match (a, b) {
            (Some(a), Some(b)) => a.cmp(&b),
            (a, b) => a.is_none().cmp(&b.is_none()),
        }
    }
    // Stored timestamps only have whole seconds.
    let finished = |record: &Record| record.finished_at.map(UtcDateTime::unix_timestamp);
    desc(finished(a), finished(b))
        .then_with(|| desc(a.percent_complete, b.percent_complete))
        .then_with(|| asc(a.title.as_deref(), b.title.as_deref()))
        .then_with(|| asc(a.id(), b.id()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, title: Option<&str>, pct: Option<u8>, finished: Option<i64>) -> Record {
        let mut record = Record::new(Source::Audible, Some(id.to_string()));
        record.title = title.map(str::to_string);
        record.percent_complete = pct;
        record.finished_at = finished.map(|ts| UtcDateTime::from_unix_timestamp(ts).unwrap());
        record
    }

    #[test]
    fn test_stored_order() {
        let mut records = vec![
            record("e", None, None, None),
            record("d", Some("Alpha"), Some(10), None),
            record("c", Some("Beta"), Some(40), None),
            record("b", Some("Zulu"), Some(100), Some(1_000)),
            record("a", Some("Yankee"), Some(100), Some(2_000)),
            record("f", Some("Alpha"), Some(10), None),
        ];
        records.sort_by(stored_order);
        let ids = records.iter().filter_map(Record::id).collect::<Vec<_>>();
        assert_eq!(ids, vec!["a", "b", "c", "d", "f", "e"]);
    }
}
