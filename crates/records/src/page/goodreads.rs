use super::ShelfPage;
use crate::Record;
use crate::consts;
use crate::error::{ErrorKind, Result};
use crate::models::Source;
use crate::record::{absolute_url, squish};
use scraper::Html;
use tracing::instrument;

pub const BASE_URL: &str = "https://www.goodreads.com";

/// Parse a `/review/list/<user>?shelf=<shelf>` page.
#[instrument(level = "debug", skip(html))]
pub fn parse_shelf(html: &str, base_url: &str) -> Result<ShelfPage> {
    let document = Html::parse_document(html);
    if document.select(&consts::GOODREADS_TABLE_SELECTOR).next().is_none() {
        exn::bail!(ErrorKind::InvalidDocument("no table#books on shelf page".into()));
    }

    let records = document
        .select(&consts::GOODREADS_ROW_SELECTOR)
        .filter_map(|row| match Record::from_goodreads_row(row, base_url) {
            Ok(record) => Some(record),
            Err(err) => {
                tracing::warn!(error = %err, "Skipping unreadable shelf row");
                None
            },
        })
        .collect::<Vec<_>>();
    let next_page = document
        .select(&consts::GOODREADS_NEXT_PAGE_SELECTOR)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(|href| absolute_url(base_url, href));
    let total = document
        .select(&consts::GOODREADS_SELECTED_SHELF_SELECTOR)
        .next()
        .map(|a| a.text().collect::<String>())
        .and_then(|text| shelf_count(&text));
    tracing::debug!(records = records.len(), ?total, has_next = next_page.is_some(), "Parsed shelf page");
    Ok(ShelfPage { records, next_page, total })
}

/// Parse a single book's page (where an ISBN search lands when it finds a
/// match). `url` is the page's final URL, which carries the slug.
pub fn parse_book_page(html: &str, url: &str, isbn: &str) -> Option<Record> {
    let path = url.split(['?', '#']).next()?;
    if !path.contains("/book/show/") {
        return None;
    }
    let slug = path.rsplit('/').next().filter(|slug| !slug.is_empty())?;
    let document = Html::parse_document(html);
    let mut record = Record::new(Source::Goodreads, Some(slug.to_string()));
    record.title = document
        .select(&consts::GOODREADS_BOOK_TITLE_SELECTOR)
        .next()
        .map(|el| squish(&el.text().collect::<String>()))
        .filter(|title| !title.is_empty());
    record.authors = document
        .select(&consts::GOODREADS_BOOK_AUTHOR_SELECTOR)
        .map(|el| squish(&el.text().collect::<String>()))
        .filter(|author| !author.is_empty())
        .collect();
    record.isbn = Some(isbn.to_string());
    record.url = Some(path.to_string());
    Some(record)
}

/// "Read  (1,234)" => 1234
fn shelf_count(text: &str) -> Option<usize> {
    let captures = consts::SHELF_COUNT_REGEX.captures(text)?;
    captures[1].replace(',', "").parse().ok()
}
