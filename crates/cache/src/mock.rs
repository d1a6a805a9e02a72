//! In-memory stores for testing.

use crate::error::{ErrorKind, Result};
use crate::store::{LocalStore, SyncMarkerStore, stored_order};
use async_trait::async_trait;
use exn::OptionExt;
use shelfsync_records::{Record, Source};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use time::UtcDateTime;
use tokio::sync::RwLock;

/// In-memory [`LocalStore`].
///
/// Behaves like the SQLite repository (keyed upserts, [`stored_order`] on
/// read, whole-second timestamps) and additionally counts upserts so tests
/// can assert on write volume.
#[derive(Debug)]
pub struct MemoryStore {
    source: Source,
    records: RwLock<HashMap<String, Record>>,
    upserts: AtomicUsize,
}

impl MemoryStore {
    pub fn new(source: Source) -> Self {
        Self {
            source,
            records: RwLock::new(HashMap::new()),
            upserts: AtomicUsize::new(0),
        }
    }

    /// Pre-populate the store. Panics on records without an ID: if the test
    /// setup is wrong, the test should not pass.
    pub fn with_records(source: Source, records: impl IntoIterator<Item = Record>) -> Self {
        let map = records
            .into_iter()
            .map(|record| match record.id.clone() {
                Some(id) => (id, truncate(record)),
                None => panic!("MemoryStore::with_records: record without id"),
            })
            .collect();
        Self {
            source,
            records: RwLock::new(map),
            upserts: AtomicUsize::new(0),
        }
    }

    /// Number of `upsert` calls that succeeded.
    pub fn upserts(&self) -> usize {
        self.upserts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LocalStore for MemoryStore {
    fn source(&self) -> Source {
        self.source
    }

    async fn find_all(&self) -> Result<Vec<Record>> {
        let mut records = self.records.read().await.values().cloned().collect::<Vec<_>>();
        records.sort_by(stored_order);
        Ok(records)
    }

    async fn upsert(&self, record: &Record) -> Result<()> {
        let id = record
            .id()
            .ok_or_raise(|| ErrorKind::MissingId(record.title_and_authors()))?;
        self.records.write().await.insert(id.to_string(), truncate(record.clone()));
        self.upserts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        Ok(self.records.write().await.remove(id).is_some())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.records.read().await.len() as u64)
    }
}

/// In-memory [`SyncMarkerStore`].
#[derive(Debug, Default)]
pub struct MemoryMarkers {
    markers: RwLock<HashMap<String, UtcDateTime>>,
}

impl MemoryMarkers {
    pub fn with_marker(name: impl Into<String>, at: UtcDateTime) -> Self {
        Self {
            markers: RwLock::new(HashMap::from([(name.into(), at)])),
        }
    }
}

#[async_trait]
impl SyncMarkerStore for MemoryMarkers {
    async fn find(&self, name: &str) -> Result<Option<UtcDateTime>> {
        Ok(self.markers.read().await.get(name).copied())
    }

    async fn touch(&self, name: &str, at: UtcDateTime) -> Result<()> {
        self.markers.write().await.insert(name.to_string(), at);
        Ok(())
    }
}

fn truncate(mut record: Record) -> Record {
    let seconds = |ts: UtcDateTime| ts.replace_nanosecond(0).unwrap_or(ts);
    record.finished_at = record.finished_at.map(seconds);
    record.added_at = record.added_at.map(seconds);
    record
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_matches_repository_contract() {
        let store = MemoryStore::new(Source::Storygraph);
        let mut record = Record::new(Source::Storygraph, Some("a1".to_string()));
        record.finished_at = Some(UtcDateTime::now());
        store.upsert(&record).await.unwrap();
        store.upsert(&record).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 1);
        assert_eq!(store.upserts(), 2);
        assert_eq!(store.find_all().await.unwrap()[0].finished_at.map(|ts| ts.nanosecond()), Some(0));
        assert!(store.upsert(&Record::new(Source::Storygraph, None)).await.is_err());
    }

    #[tokio::test]
    async fn test_memory_markers() {
        let at = UtcDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        let markers = MemoryMarkers::with_marker("storygraph_library", at);
        assert_eq!(markers.find("storygraph_library").await.unwrap(), Some(at));
        assert_eq!(markers.find("audible_library").await.unwrap(), None);
    }
}
