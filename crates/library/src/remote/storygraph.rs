use super::error::{ErrorKind, Result};
use super::{Page, RemoteClient, Response, Throttle, Transport};
use async_trait::async_trait;
use exn::{OptionExt, ResultExt};
use shelfsync_records::page::storygraph::{self, BASE_URL};
use shelfsync_records::page::is_sign_in_url;
use shelfsync_records::{ReadDate, Record, Source};
use shelfsync_config::RemoteConfig;
use std::time::Duration;
use tracing::instrument;

/// The StoryGraph, scraped. The only service we write read dates back to.
#[derive(Debug)]
pub struct StorygraphClient<T> {
    transport: T,
    base_url: String,
    user: String,
    throttle: Throttle,
}

impl<T: Transport> StorygraphClient<T> {
    pub fn new(transport: T, user: impl Into<String>, delay: Duration) -> Self {
        Self {
            transport,
            base_url: BASE_URL.to_string(),
            user: user.into(),
            throttle: Throttle::new(delay),
        }
    }

    /// Spaced out by the configured `remote.throttle_ms`.
    pub fn from_config(transport: T, user: impl Into<String>, config: &RemoteConfig) -> Self {
        Self::new(transport, user, config.throttle())
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Response> {
        self.throttle.wait().await;
        let url = format!("{}{}", self.base_url, path);
        tracing::info!(%url, "GET");
        self.transport.get(&url, query).await?.check(Source::Storygraph)
    }

    async fn search_results(&self, query: &str, isbn: Option<&str>) -> Result<Option<Record>> {
        if query.trim().is_empty() {
            return Ok(None);
        }
        tracing::info!(query, "Searching Storygraph");
        let response = self.get("/search", &[("search_term", query.to_string())]).await?;
        Ok(storygraph::parse_search_results(&response.body, &self.base_url, isbn).into_iter().next())
    }
}

#[async_trait]
impl<T: Transport> RemoteClient for StorygraphClient<T> {
    fn source(&self) -> Source {
        Source::Storygraph
    }

    #[instrument(skip(self))]
    async fn fetch_page(&self, page: u32, _page_size: u32) -> Result<Page> {
        let response = self.get(&format!("/books-read/{}", self.user), &[("page", page.to_string())]).await?;
        let listing = storygraph::parse_read_books(&response.body, &self.base_url)
            .or_raise(|| ErrorKind::InvalidResponse("books read page"))?;
        Ok(Page {
            total_count: listing.total,
            has_next: listing.has_next(),
            records: listing.records,
        })
    }

    async fn search_by_isbn(&self, isbn: &str) -> Result<Option<Record>> {
        self.search_results(isbn, Some(isbn)).await
    }

    async fn search(&self, query: &str) -> Result<Option<Record>> {
        self.search_results(query, None).await
    }

    /// Posts the read-date form: day, month and year go as separate fields,
    /// with the CSRF token from the book's page.
    #[instrument(skip(self))]
    async fn set_finished_status(&self, id: &str, date: ReadDate) -> Result<bool> {
        let book = self.get(&format!("/books/{id}"), &[]).await?;
        let token = storygraph::csrf_token(&book.body)
            .ok_or_raise(|| ErrorKind::Navigation(format!("no CSRF token on {}", book.url)))?;
        let form = [
            ("authenticity_token", token),
            ("book_id", id.to_string()),
            ("read_instance[day]", date.day.to_string()),
            ("read_instance[month]", date.month.to_string()),
            ("read_instance[year]", date.year.to_string()),
        ];
        self.throttle.wait().await;
        let url = format!("{}/read_instances", self.base_url);
        let response = self.transport.post_form(&url, &form).await?;
        if matches!(response.status, 401 | 403) || is_sign_in_url(Source::Storygraph, &response.url) {
            exn::bail!(ErrorKind::NotAuthenticated(Source::Storygraph));
        }
        match response.status {
            200..=399 => Ok(true),
            400..=499 => {
                tracing::warn!(id, status = response.status, "Read date rejected");
                Ok(false)
            },
            status => exn::bail!(ErrorKind::Http { status }),
        }
    }
}
