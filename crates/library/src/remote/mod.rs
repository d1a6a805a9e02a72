//! Remote services, behind one interface.
//!
//! [`RemoteClient`] is everything the loader and the reconciliation flow
//! need from a service. The three implementations ([`AudibleClient`],
//! [`GoodreadsClient`], [`StorygraphClient`]) sit on an injected
//! [`Transport`], which owns the HTTP session; signing in is not this
//! crate's business.

mod audible;
pub mod error;
mod goodreads;
mod storygraph;
#[cfg(test)]
pub(crate) mod testing;
mod throttle;
mod transport;

pub use self::audible::AudibleClient;
pub use self::goodreads::GoodreadsClient;
pub use self::storygraph::StorygraphClient;
pub use self::throttle::Throttle;
pub use self::transport::{Response, Transport};

use self::error::{ErrorKind, Result};
use async_trait::async_trait;
use shelfsync_records::{ReadDate, Record, Source};
use std::collections::HashMap;
use time::UtcDateTime;

/// One page of a remote listing.
#[derive(Debug, Clone, Default)]
pub struct Page {
    /// Total size of the listing, if the remote says.
    pub total_count: Option<usize>,
    pub records: Vec<Record>,
    /// Whether the remote indicated there's another page.
    pub has_next: bool,
}

#[async_trait]
pub trait RemoteClient: Send + Sync {
    fn source(&self) -> Source;

    /// Fetch one page (1-based) of the user's library listing.
    async fn fetch_page(&self, page: u32, page_size: u32) -> Result<Page>;

    /// Finish timestamps by stable ID, for listings that don't reliably
    /// include them.
    async fn fetch_finish_dates(&self) -> Result<HashMap<String, UtcDateTime>> {
        Ok(HashMap::new())
    }

    /// Absence is a normal answer, not an error.
    async fn search_by_isbn(&self, isbn: &str) -> Result<Option<Record>>;

    /// Free-text search, returning the best match.
    async fn search(&self, _query: &str) -> Result<Option<Record>> {
        Ok(None)
    }

    /// Mark a book as read on the given date. Returns `false` if the remote
    /// refused the change.
    async fn set_finished_status(&self, _id: &str, _date: ReadDate) -> Result<bool> {
        exn::bail!(ErrorKind::Unsupported(self.source()))
    }
}
