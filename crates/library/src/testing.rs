//! An in-memory [`RemoteClient`] for loader and reconciliation tests.

use crate::remote::error::{ErrorKind, Result};
use crate::remote::{Page, RemoteClient};
use async_trait::async_trait;
use shelfsync_records::{ReadDate, Record, Source};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use time::UtcDateTime;

pub(crate) struct FakeRemote {
    source: Source,
    pages: Mutex<VecDeque<Result<Page>>>,
    finish_dates: HashMap<String, UtcDateTime>,
    by_isbn: HashMap<String, Record>,
    by_query: HashMap<String, Record>,
    write_error: Option<ErrorKind>,
    reject_writes: bool,
    calls: Mutex<Vec<String>>,
    writes: Mutex<Vec<(String, ReadDate)>>,
}

impl FakeRemote {
    pub fn new(source: Source) -> Self {
        Self {
            source,
            pages: Mutex::default(),
            finish_dates: HashMap::new(),
            by_isbn: HashMap::new(),
            by_query: HashMap::new(),
            write_error: None,
            reject_writes: false,
            calls: Mutex::default(),
            writes: Mutex::default(),
        }
    }

    pub fn with_page(self, total_count: Option<usize>, records: Vec<Record>, has_next: bool) -> Self {
        self.pages.lock().unwrap().push_back(Ok(Page {
            total_count,
            records,
            has_next,
        }));
        self
    }

    pub fn with_failure(self, kind: ErrorKind) -> Self {
        self.pages.lock().unwrap().push_back(Err(exn::Exn::from(kind)));
        self
    }

    pub fn with_finish_date(mut self, id: &str, at: UtcDateTime) -> Self {
        self.finish_dates.insert(id.to_string(), at);
        self
    }

    pub fn with_isbn(mut self, isbn: &str, record: Record) -> Self {
        self.by_isbn.insert(isbn.to_string(), record);
        self
    }

    pub fn with_query(mut self, query: &str, record: Record) -> Self {
        self.by_query.insert(query.to_string(), record);
        self
    }

    pub fn rejecting_writes(mut self) -> Self {
        self.reject_writes = true;
        self
    }

    pub fn failing_writes(mut self, kind: ErrorKind) -> Self {
        self.write_error = Some(kind);
        self
    }

    /// Every call made, e.g. `"fetch_page 2"` or `"search_by_isbn 978..."`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn writes(&self) -> Vec<(String, ReadDate)> {
        self.writes.lock().unwrap().clone()
    }

    fn log(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl RemoteClient for FakeRemote {
    fn source(&self) -> Source {
        self.source
    }

    async fn fetch_page(&self, page: u32, _page_size: u32) -> Result<Page> {
        self.log(format!("fetch_page {page}"));
        self.pages.lock().unwrap().pop_front().unwrap_or_else(|| Ok(Page::default()))
    }

    async fn fetch_finish_dates(&self) -> Result<HashMap<String, UtcDateTime>> {
        self.log("fetch_finish_dates".to_string());
        Ok(self.finish_dates.clone())
    }

    async fn search_by_isbn(&self, isbn: &str) -> Result<Option<Record>> {
        self.log(format!("search_by_isbn {isbn}"));
        Ok(self.by_isbn.get(isbn).cloned())
    }

    async fn search(&self, query: &str) -> Result<Option<Record>> {
        self.log(format!("search {query}"));
        Ok(self.by_query.get(query).cloned())
    }

    async fn set_finished_status(&self, id: &str, date: ReadDate) -> Result<bool> {
        self.log(format!("set_finished_status {id}"));
        if let Some(kind) = self.write_error.clone() {
            exn::bail!(kind);
        }
        self.writes.lock().unwrap().push((id.to_string(), date));
        Ok(!self.reject_writes)
    }
}
