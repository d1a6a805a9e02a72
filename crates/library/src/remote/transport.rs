use super::error::{ErrorKind, Result};
use async_trait::async_trait;
use shelfsync_records::Source;
use shelfsync_records::page::is_sign_in_url;

/// A response after redirects have been followed.
#[derive(Debug, Clone, Default)]
pub struct Response {
    /// The final URL, which is how a bounce to a sign-in page shows up.
    pub url: String,
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Response {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turn sign-in redirects, auth statuses and other non-2xx responses
    /// into errors.
    pub(crate) fn check(self, source: Source) -> Result<Self> {
        if matches!(self.status, 401 | 403) || is_sign_in_url(source, &self.url) {
            exn::bail!(ErrorKind::NotAuthenticated(source));
        }
        if !self.is_success() {
            exn::bail!(ErrorKind::Http { status: self.status });
        }
        Ok(self)
    }
}

/// HTTP as the remote clients need it.
///
/// Implementations own the session (cookies, bearer tokens) and follow
/// redirects; query parameters and form fields are passed unencoded.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str, query: &[(&str, String)]) -> Result<Response>;

    async fn post_form(&self, url: &str, form: &[(&str, String)]) -> Result<Response>;
}
