//! An in-memory collection of one source's records.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use shelfsync_cache::LocalStore;
use shelfsync_records::{Fields, Record, Source};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use time::Date;
use tracing::instrument;

/// Records for one source, keyed by stable ID and kept in insertion order.
///
/// The finished/unfinished/started partitions are computed on first use and
/// reused until the collection is next modified, so repeated calls are cheap
/// and always return the same order.
#[derive(Debug, Clone)]
pub struct Collection {
    source: Source,
    records: Vec<Record>,
    by_id: HashMap<String, usize>,
    reported_total: Option<usize>,
    partitions: OnceLock<Partitions>,
}

/// Indices into `Collection::records`.
#[derive(Debug, Clone)]
struct Partitions {
    finished: Vec<usize>,
    unfinished: Vec<usize>,
    started: Vec<usize>,
    not_started: Vec<usize>,
}

/// What [`Collection::persist`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistReport {
    pub saved: usize,
    /// Display names of records that were skipped for lack of a stable ID.
    pub skipped: Vec<String>,
}

impl Collection {
    pub fn new(source: Source) -> Self {
        Self {
            source,
            records: Vec::new(),
            by_id: HashMap::new(),
            reported_total: None,
            partitions: OnceLock::new(),
        }
    }

    /// Hydrate from the local store, keeping the store's order.
    #[instrument(skip_all, fields(source = %store.source()))]
    pub async fn from_store(store: &dyn LocalStore) -> Result<Self> {
        let records = store.find_all().await.or_raise(|| ErrorKind::Cache)?;
        let mut collection = Self::new(store.source());
        collection.extend(records);
        tracing::info!(records = collection.len(), "Loaded cached library");
        Ok(collection)
    }

    pub fn source(&self) -> Source {
        self.source
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Record> {
        self.by_id.get(id).map(|&index| &self.records[index])
    }

    /// Mutable access to a record. Invalidates the cached partitions.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut Record> {
        let index = *self.by_id.get(id)?;
        self.partitions.take();
        Some(&mut self.records[index])
    }

    /// The collection's size, or the size the remote reported if it's known
    /// (and the collection is still being filled in).
    pub fn total_count(&self) -> usize {
        self.reported_total.unwrap_or(self.records.len())
    }

    pub fn reported_total(&self) -> Option<usize> {
        self.reported_total
    }

    pub fn set_reported_total(&mut self, total: Option<usize>) {
        self.reported_total = total;
    }

    /// Insert a record, or fill the gaps in the one already stored under the
    /// same ID. Populated fields are never overwritten. Returns `true` if
    /// anything changed.
    ///
    /// Records without a stable ID can't be matched against anything, so
    /// they're always appended.
    pub fn add_or_merge(&mut self, record: Record) -> bool {
        let existing = record.id().and_then(|id| self.by_id.get(id)).copied();
        let changed = match existing {
            Some(index) => self.records[index].merge_from(&record),
            None => {
                if let Some(id) = record.id() {
                    self.by_id.insert(id.to_string(), self.records.len());
                }
                self.records.push(record);
                true
            },
        };
        if changed {
            self.partitions.take();
        }
        changed
    }

    pub fn extend(&mut self, records: impl IntoIterator<Item = Record>) {
        for record in records {
            self.add_or_merge(record);
        }
    }

    /// First record carrying this ISBN, in insertion order.
    pub fn find_by_isbn(&self, isbn: &str) -> Option<&Record> {
        self.records.iter().find(|record| record.isbn() == Some(isbn))
    }

    fn partitions(&self) -> &Partitions {
        self.partitions.get_or_init(|| Partitions::compute(&self.records))
    }

    fn pick(&self, indices: &[usize]) -> Vec<&Record> {
        indices.iter().map(|&index| &self.records[index]).collect()
    }

    /// Finished records, most recently finished first. Records without a
    /// finish date come after those with one.
    pub fn finished(&self) -> Vec<&Record> {
        self.pick(&self.partitions().finished)
    }

    /// Unfinished records, in insertion order.
    pub fn unfinished(&self) -> Vec<&Record> {
        self.pick(&self.partitions().unfinished)
    }

    /// Unfinished but started records, furthest along first.
    pub fn started(&self) -> Vec<&Record> {
        self.pick(&self.partitions().started)
    }

    pub fn not_started(&self) -> Vec<&Record> {
        self.pick(&self.partitions().not_started)
    }

    pub fn total_finished(&self) -> usize {
        self.partitions().finished.len()
    }

    pub fn total_unfinished(&self) -> usize {
        self.partitions().unfinished.len()
    }

    pub fn total_started(&self) -> usize {
        self.partitions().started.len()
    }

    pub fn total_not_started(&self) -> usize {
        self.partitions().not_started.len()
    }

    /// `None` while [`total_count`](Self::total_count) is zero.
    pub fn finished_percent(&self) -> Option<u32> {
        percent(self.total_finished(), self.total_count())
    }

    pub fn unfinished_percent(&self) -> Option<u32> {
        percent(self.total_unfinished(), self.total_count())
    }

    pub fn started_percent(&self) -> Option<u32> {
        percent(self.total_started(), self.total_count())
    }

    pub fn not_started_percent(&self) -> Option<u32> {
        percent(self.total_not_started(), self.total_count())
    }

    /// ISBN to finish date for every finished record that has both, most
    /// recent first. The first record seen for an ISBN wins.
    pub fn finish_dates_by_isbn(&self) -> Vec<(String, Date)> {
        let mut seen = std::collections::HashSet::new();
        self.finished()
            .into_iter()
            .filter_map(|record| Some((record.isbn()?, record.finished_on()?)))
            .filter(|(isbn, _)| seen.insert(*isbn))
            .map(|(isbn, date)| (isbn.to_string(), date))
            .collect()
    }

    /// Number of records with a known finish date.
    pub fn total_finish_dates(&self) -> usize {
        self.records.iter().filter(|record| record.finished_at.is_some()).count()
    }

    /// Upsert every record into the store. Records without a stable ID are
    /// skipped with a warning and listed in the report.
    #[instrument(skip_all, fields(source = %self.source))]
    pub async fn persist(&self, store: &dyn LocalStore) -> Result<PersistReport> {
        let mut report = PersistReport::default();
        for record in &self.records {
            if persist_record(store, record).await? {
                report.saved += 1;
            } else {
                report.skipped.push(record.title_and_authors());
            }
        }
        tracing::info!(saved = report.saved, skipped = report.skipped.len(), "Persisted library");
        Ok(report)
    }

    /// Write the legacy JSON library file: a pretty-printed array of flat
    /// records. Returns `true` if the file now exists and isn't empty.
    pub fn save_to_file(&self, path: &Path) -> Result<bool> {
        let fields = self.records.iter().map(Record::to_fields).collect::<Vec<_>>();
        let json = serde_json::to_string_pretty(&fields).or_raise(|| ErrorKind::File(path.to_path_buf()))?;
        fs::write(path, json).or_raise(|| ErrorKind::File(path.to_path_buf()))?;
        Ok(fs::metadata(path).is_ok_and(|meta| meta.len() > 0))
    }

    /// Read the legacy JSON library file. A missing or blank file is `None`
    /// ("not loaded"), not an error.
    pub fn load_from_file(source: Source, path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(path).or_raise(|| ErrorKind::File(path.to_path_buf()))?;
        if json.trim().is_empty() {
            return Ok(None);
        }
        let fields: Vec<Fields> = serde_json::from_str(&json).or_raise(|| ErrorKind::File(path.to_path_buf()))?;
        let mut collection = Self::new(source);
        collection.extend(fields.into_iter().map(Record::from_fields));
        Ok(Some(collection))
    }
}

impl Partitions {
    fn compute(records: &[Record]) -> Self {
        let (mut finished, unfinished): (Vec<usize>, Vec<usize>) =
            (0..records.len()).partition(|&index| records[index].is_finished());
        // Stable sorts: ties keep insertion order.
        finished.sort_by(|&a, &b| {
            let (a, b) = (records[a].finished_at, records[b].finished_at);
            match (a, b) {
                (Some(a), Some(b)) => b.cmp(&a),
                (a, b) => a.is_none().cmp(&b.is_none()),
            }
        });
        let (mut started, not_started): (Vec<usize>, Vec<usize>) =
            unfinished.iter().partition(|&&index| records[index].is_started());
        started.sort_by_key(|&index| std::cmp::Reverse(records[index].percent_complete.unwrap_or(0)));
        Self {
            finished,
            unfinished,
            started,
            not_started,
        }
    }
}

/// Upsert one record. Returns `false` (after warning) if it has no stable ID.
pub(crate) async fn persist_record(store: &dyn LocalStore, record: &Record) -> Result<bool> {
    if record.id().is_none() {
        tracing::warn!(record = %record.title_and_authors(), "Skipping record with no stable ID");
        return Ok(false);
    }
    store.upsert(record).await.or_raise(|| ErrorKind::Cache)?;
    Ok(true)
}

fn percent(count: usize, total: usize) -> Option<u32> {
    (total > 0).then(|| (100.0 * count as f64 / total as f64).round() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use shelfsync_cache::MemoryStore;
    use shelfsync_records::Status;
    use time::UtcDateTime;
    use time::macros::{date, utc_datetime};

    fn item(id: &str) -> Record {
        let mut record = Record::new(Source::Audible, Some(id.to_string()));
        record.title = Some(format!("Title {id}"));
        record
    }

    fn finished(id: &str, at: Option<UtcDateTime>) -> Record {
        let mut record = item(id);
        record.percent_complete = Some(100);
        record.finished_at = at;
        record
    }

    fn progress(id: &str, pct: u8) -> Record {
        let mut record = item(id);
        record.percent_complete = Some(pct);
        record
    }

    fn ids(records: Vec<&Record>) -> Vec<&str> {
        records.into_iter().filter_map(Record::id).collect()
    }

    fn sample() -> Collection {
        let mut collection = Collection::new(Source::Audible);
        collection.extend([
            progress("a", 0),
            finished("b", Some(utc_datetime!(2023-03-01 00:00))),
            progress("c", 35),
            finished("d", None),
            finished("e", Some(utc_datetime!(2024-01-01 00:00))),
            progress("f", 80),
            progress("g", 0),
            finished("h", None),
        ]);
        collection
    }

    #[test]
    fn test_finished_order() {
        let collection = sample();
        assert_eq!(ids(collection.finished()), vec!["e", "b", "d", "h"]);
    }

    #[test]
    fn test_started_order() {
        let collection = sample();
        assert_eq!(ids(collection.unfinished()), vec!["a", "c", "f", "g"]);
        assert_eq!(ids(collection.started()), vec!["f", "c"]);
        assert_eq!(ids(collection.not_started()), vec!["a", "g"]);
    }

    #[test]
    fn test_partition_totals() {
        let collection = sample();
        assert_eq!(collection.total_finished() + collection.total_unfinished(), collection.len());
        assert_eq!(collection.total_started() + collection.total_not_started(), collection.total_unfinished());
    }

    #[test]
    fn test_partitions_are_idempotent() {
        let collection = sample();
        let first = collection.finished().into_iter().cloned().collect::<Vec<_>>();
        let second = collection.finished().into_iter().cloned().collect::<Vec<_>>();
        assert_eq!(first, second);
    }

    #[test]
    fn test_partitions_refresh_after_add() {
        let mut collection = sample();
        assert_eq!(collection.total_finished(), 4);
        collection.add_or_merge(finished("z", Some(utc_datetime!(2025-01-01 00:00))));
        assert_eq!(ids(collection.finished())[0], "z");
        collection.get_mut("a").unwrap().percent_complete = Some(100);
        assert_eq!(collection.total_finished(), 6);
    }

    #[test]
    fn test_merge_fills_gaps_only() {
        let mut collection = Collection::new(Source::Goodreads);
        let mut a = Record::new(Source::Goodreads, Some("1.X".to_string()));
        a.title = Some("X".to_string());
        let mut b = Record::new(Source::Goodreads, Some("1.X".to_string()));
        b.title = Some("Y".to_string());
        b.authors = vec!["Z".to_string()];
        assert!(collection.add_or_merge(a));
        assert!(collection.add_or_merge(b.clone()));
        assert!(!collection.add_or_merge(b));
        assert_eq!(collection.len(), 1);
        let merged = collection.get("1.X").unwrap();
        assert_eq!(merged.title.as_deref(), Some("X"));
        assert_eq!(merged.authors, vec!["Z"]);
    }

    #[test]
    fn test_records_without_id_are_appended() {
        let mut collection = Collection::new(Source::Storygraph);
        collection.add_or_merge(Record::new(Source::Storygraph, None));
        collection.add_or_merge(Record::new(Source::Storygraph, None));
        assert_eq!(collection.len(), 2);
    }

    #[rstest]
    #[case(Some(200), 8, Some(2))]
    #[case(None, 8, Some(50))]
    fn test_finished_percent(#[case] reported: Option<usize>, #[case] expected_total: usize, #[case] expected: Option<u32>) {
        let mut collection = sample();
        collection.set_reported_total(reported);
        assert_eq!(collection.len(), expected_total);
        assert_eq!(collection.finished_percent(), expected);
    }

    #[test]
    fn test_percent_on_empty_collection() {
        let collection = Collection::new(Source::Audible);
        assert_eq!(collection.total_count(), 0);
        assert_eq!(collection.finished_percent(), None);
    }

    #[test]
    fn test_find_by_isbn() {
        let mut collection = sample();
        let mut with_isbn = item("i");
        with_isbn.isbn = Some("9780441013593".to_string());
        collection.add_or_merge(with_isbn);
        assert_eq!(collection.find_by_isbn("9780441013593").and_then(Record::id), Some("i"));
        assert!(collection.find_by_isbn("0000000000000").is_none());
    }

    #[test]
    fn test_finish_dates_by_isbn() {
        let mut collection = Collection::new(Source::Audible);
        let mut older = finished("old", Some(utc_datetime!(2022-05-05 10:00)));
        older.isbn = Some("111".to_string());
        let mut newer = finished("new", Some(utc_datetime!(2024-02-02 10:00)));
        newer.isbn = Some("111".to_string());
        let mut other = finished("other", Some(utc_datetime!(2023-01-01 10:00)));
        other.isbn = Some("222".to_string());
        let mut undated = finished("undated", None);
        undated.isbn = Some("333".to_string());
        collection.extend([older, newer, other, undated]);
        assert_eq!(
            collection.finish_dates_by_isbn(),
            vec![("111".to_string(), date!(2024-02-02)), ("222".to_string(), date!(2023-01-01))]
        );
    }

    #[tokio::test]
    async fn test_persist_skips_records_without_id() {
        let store = MemoryStore::new(Source::Storygraph);
        let mut collection = Collection::new(Source::Storygraph);
        let mut good = Record::new(Source::Storygraph, Some("a1".to_string()));
        good.status = Some(Status::Read);
        let mut nameless = Record::new(Source::Storygraph, None);
        nameless.title = Some("Mystery".to_string());
        collection.extend([good, nameless]);

        let report = collection.persist(&store).await.unwrap();
        assert_eq!(report.saved, 1);
        assert_eq!(report.skipped, vec!["Mystery"]);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_from_store_keeps_store_order() {
        let store = MemoryStore::with_records(Source::Audible, [progress("x", 10), finished("y", None), progress("w", 90)]);
        let collection = Collection::from_store(&store).await.unwrap();
        assert_eq!(ids(collection.iter().collect()), vec!["y", "w", "x"]);
    }

    #[test]
    fn test_legacy_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("library.json");
        assert!(Collection::load_from_file(Source::Audible, &path).unwrap().is_none());
        fs::write(&path, "  \n").unwrap();
        assert!(Collection::load_from_file(Source::Audible, &path).unwrap().is_none());

        let mut collection = sample();
        collection.get_mut("c").unwrap().narrators = vec!["A".to_string(), "B".to_string(), "C".to_string()];
        assert!(collection.save_to_file(&path).unwrap());
        let loaded = Collection::load_from_file(Source::Audible, &path).unwrap().unwrap();
        assert_eq!(loaded.records(), collection.records());
        assert!(fs::read_to_string(&path).unwrap().starts_with("[\n"));
    }

    #[test]
    fn test_legacy_file_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("library.json");
        fs::write(&path, "{not json").unwrap();
        let err = Collection::load_from_file(Source::Audible, &path).unwrap_err();
        assert!(matches!(&*err, ErrorKind::File(_)));
    }
}
