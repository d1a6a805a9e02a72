use super::ShelfPage;
use crate::Record;
use crate::consts;
use crate::error::Result;
use crate::record::absolute_url;
use scraper::Html;
use tracing::instrument;

pub const BASE_URL: &str = "https://app.thestorygraph.com";

/// Parse a `/books-read/<user>` page.
#[instrument(level = "debug", skip(html))]
pub fn parse_read_books(html: &str, base_url: &str) -> Result<ShelfPage> {
    let document = Html::parse_document(html);
    let records = document
        .select(&consts::STORYGRAPH_PANE_SELECTOR)
        .map(|pane| Record::from_storygraph_pane(pane, base_url))
        .collect::<Vec<_>>();
    let next_page = document
        .select(&consts::STORYGRAPH_NEXT_PAGE_SELECTOR)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(|href| absolute_url(base_url, href));
    Ok(ShelfPage {
        records,
        next_page,
        total: None,
    })
}

/// Parse a `/search?search_term=<query>` page. An empty result list is a
/// perfectly valid answer.
pub fn parse_search_results(html: &str, base_url: &str, isbn: Option<&str>) -> Vec<Record> {
    let document = Html::parse_document(html);
    document
        .select(&consts::STORYGRAPH_SEARCH_RESULT_SELECTOR)
        .map(|link| Record::from_storygraph_result(link, base_url, isbn))
        .filter(|record| record.id().is_some())
        .collect()
}

/// The Rails CSRF token every form post has to echo back.
pub fn csrf_token(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    document
        .select(&consts::CSRF_TOKEN_SELECTOR)
        .next()
        .and_then(|meta| meta.value().attr("content"))
        .map(str::to_string)
}
