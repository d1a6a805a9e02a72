//! Whole-page parsing for the scraped sources.

pub mod goodreads;
pub mod storygraph;

use crate::Record;
use crate::models::Source;

/// One page of a shelf listing.
#[derive(Debug, Clone, Default)]
pub struct ShelfPage {
    pub records: Vec<Record>,
    /// Absolute URL of the next page, if the listing continues.
    pub next_page: Option<String>,
    /// The shelf size the site reports, when it reports one.
    pub total: Option<usize>,
}

impl ShelfPage {
    pub fn has_next(&self) -> bool {
        self.next_page.is_some()
    }
}

/// Whether a (post-redirect) URL is the source's sign-in page, i.e. the
/// session has expired.
pub fn is_sign_in_url(source: Source, url: &str) -> bool {
    let path = url.split(['?', '#']).next().unwrap_or_default().trim_end_matches('/');
    match source {
        // Goodreads bounces through Amazon's sign-in.
        Source::Goodreads => path.ends_with("/user/sign_in") || path.ends_with("/ap/signin"),
        Source::Storygraph => path.ends_with("/users/sign_in"),
        Source::Audible => path.ends_with("/ap/signin"),
    }
}
