use super::error::{ErrorKind, Result};
use super::{Page, RemoteClient, Response, Throttle, Transport};
use async_trait::async_trait;
use exn::ResultExt;
use shelfsync_records::page::goodreads::{self, BASE_URL};
use shelfsync_records::{Record, Source};
use shelfsync_config::RemoteConfig;
use std::time::Duration;
use tracing::instrument;

/// Goodreads, scraped. Listings come from the user's shelf pages.
#[derive(Debug)]
pub struct GoodreadsClient<T> {
    transport: T,
    base_url: String,
    /// "<user id>-<profile slug>", as it appears in shelf URLs.
    user: String,
    shelf: String,
    throttle: Throttle,
}

impl<T: Transport> GoodreadsClient<T> {
    pub fn new(transport: T, user: impl Into<String>, delay: Duration) -> Self {
        Self {
            transport,
            base_url: BASE_URL.to_string(),
            user: user.into(),
            shelf: "read".to_string(),
            throttle: Throttle::new(delay),
        }
    }

    pub fn with_shelf(mut self, shelf: impl Into<String>) -> Self {
        self.shelf = shelf.into();
        self
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
        self.transport.get(&url, query).await?.check(Source::Goodreads)
    }
}

#[async_trait]
impl<T: Transport> RemoteClient for GoodreadsClient<T> {
    fn source(&self) -> Source {
        Source::Goodreads
    }

    #[instrument(skip(self))]
    async fn fetch_page(&self, page: u32, page_size: u32) -> Result<Page> {
        let query = [
            ("shelf", self.shelf.clone()),
            ("page", page.to_string()),
            ("per_page", page_size.to_string()),
        ];
        let response = self.get(&format!("/review/list/{}", self.user), &query).await?;
        let shelf = goodreads::parse_shelf(&response.body, &self.base_url)
            .or_raise(|| ErrorKind::InvalidResponse("shelf page"))?;
        if shelf.records.is_empty() {
            tracing::warn!(url = %response.url, "No books found on page");
        }
        Ok(Page {
            total_count: shelf.total,
            has_next: shelf.has_next(),
            records: shelf.records,
        })
    }

    /// A search for an ISBN with a match redirects straight to the book.
    async fn search_by_isbn(&self, isbn: &str) -> Result<Option<Record>> {
        let response = self.get("/search", &[("q", isbn.to_string())]).await?;
        Ok(goodreads::parse_book_page(&response.body, &response.url, isbn))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::testing::{ScriptedTransport, ok};

    const SHELF: &str = r#"<a class="selectedShelf">Read (3)</a><table id="books"><tbody>
        <tr><td class="field title"><div class="value"><a href="/book/show/1.Hyperion">Hyperion</a></div></td></tr>
        <tr><td class="field title"><div class="value"><a href="/book/show/2.Endymion">Endymion</a></div></td></tr>
    </tbody></table><a class="next_page" href="/review/list/42-reader?page=2&shelf=read">next</a>"#;

    fn client(responses: impl IntoIterator<Item = Response>) -> GoodreadsClient<ScriptedTransport> {
        GoodreadsClient::new(ScriptedTransport::new(responses), "42-reader", Duration::from_secs(1))
    }

    #[test]
    fn test_from_config_uses_configured_throttle() {
        let config = RemoteConfig {
            throttle_ms: 2500,
            ..RemoteConfig::default()
        };
        let client = GoodreadsClient::from_config(ScriptedTransport::new(Vec::<Response>::new()), "reader", &config);
        assert_eq!(client.throttle.delay(), Duration::from_millis(2500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_page() {
        let client = client([ok("https://www.goodreads.com/review/list/42-reader?shelf=read", SHELF)]);
        let page = client.fetch_page(1, 20).await.unwrap();
        assert_eq!(page.total_count, Some(3));
        assert!(page.has_next);
        assert_eq!(page.records.len(), 2);
        let request = &client.transport().requests()[0];
        assert_eq!(request.url, "https://www.goodreads.com/review/list/42-reader");
        assert_eq!(request.param("shelf"), Some("read"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pages_are_throttled() {
        let client = client([
            ok("https://www.goodreads.com/review/list/42-reader", SHELF),
            ok("https://www.goodreads.com/review/list/42-reader", SHELF),
        ]);
        let start = tokio::time::Instant::now();
        client.fetch_page(1, 20).await.unwrap();
        client.fetch_page(2, 20).await.unwrap();
        assert!(start.elapsed() >= Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_redirected_to_sign_in() {
        let client = client([ok("https://www.goodreads.com/user/sign_in", "<form></form>")]);
        let err = client.fetch_page(1, 20).await.unwrap_err();
        assert_eq!(*err, ErrorKind::NotAuthenticated(Source::Goodreads));
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_by_isbn() {
        let client = client([
            ok("https://www.goodreads.com/book/show/1.Hyperion", r#"<h1 data-testid="bookTitle">Hyperion</h1>"#),
            ok("https://www.goodreads.com/search?q=0000000000", "<p>No results.</p>"),
        ]);
        let found = client.search_by_isbn("9780553283686").await.unwrap().unwrap();
        assert_eq!(found.id(), Some("1.Hyperion"));
        assert_eq!(found.isbn(), Some("9780553283686"));
        assert!(client.search_by_isbn("0000000000").await.unwrap().is_none());
    }
}
