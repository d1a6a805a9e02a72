//! Elements scraped from the tracking sites' HTML pages.

use super::{Record, non_empty};
use crate::consts;
use crate::error::{ErrorKind, Result};
use crate::models::{Source, Status};
use exn::{OptionExt, ResultExt};
use scraper::ElementRef;
use time::{Date, Month, UtcDateTime};

impl Record {
    /// Build a record from a `table#books tbody tr` row of a Goodreads shelf.
    ///
    /// The title link is required: it's where the slug (the stable ID) comes
    /// from.
    pub fn from_goodreads_row(row: ElementRef<'_>, base_url: &str) -> Result<Self> {
        let title_el = row
            .select(&consts::GOODREADS_TITLE_SELECTOR)
            .next()
            .ok_or_raise(|| ErrorKind::MissingField("title"))?;
        let link = title_el
            .select(&consts::ANCHOR_SELECTOR)
            .next()
            .and_then(|a| a.value().attr("href"))
            .ok_or_raise(|| ErrorKind::MissingField("book link"))?;
        let url = absolute_url(base_url, link);
        // e.g. "/book/show/11286.Carrion_Comfort" => "11286.Carrion_Comfort"
        let slug = url.split(['?', '#']).next().and_then(|path| path.rsplit('/').next()).and_then(non_empty);

        let mut record = Self::new(Source::Goodreads, slug);
        record.title = non_empty(squish(&title_el.text().collect::<String>()));
        record.authors = row
            .select(&consts::GOODREADS_AUTHOR_SELECTOR)
            .next()
            .and_then(|el| non_empty(squish(&el.text().collect::<String>())))
            .map(|author| vec![reorder_surname_first(&author)])
            .unwrap_or_default();
        record.isbn = row
            .select(&consts::GOODREADS_ISBN_SELECTOR)
            .next()
            .map(|el| el.text().collect::<String>().replace([' ', '\n', '-'], ""))
            .filter(|isbn| consts::ISBN_REGEX.is_match(isbn));
        record.status = row
            .select(&consts::GOODREADS_SHELF_SELECTOR)
            .next()
            .and_then(|el| non_empty(el.text().collect::<String>()))
            .map(|shelf| Status::from(shelf.as_str()));
        record.finished_at = row
            .select(&consts::GOODREADS_DATE_READ_SELECTOR)
            .next()
            .and_then(|el| read_date(&record, &el.text().collect::<String>()));
        record.url = Some(url);
        Ok(record)
    }

    /// Build a record from a `div.book-pane` on a Storygraph "books read"
    /// listing. Everything on that listing has been read.
    pub fn from_storygraph_pane(pane: ElementRef<'_>, base_url: &str) -> Self {
        let id = pane.value().attr("data-book-id").and_then(non_empty);
        let mut record = Self::new(Source::Storygraph, id);
        let title_link = pane.select(&consts::STORYGRAPH_PANE_TITLE_SELECTOR).next();
        record.title = title_link.and_then(|a| non_empty(squish(&a.text().collect::<String>())));
        record.url = title_link.and_then(|a| a.value().attr("href")).map(|href| absolute_url(base_url, href));
        record.authors = pane
            .select(&consts::STORYGRAPH_PANE_AUTHOR_SELECTOR)
            .filter_map(|a| non_empty(squish(&a.text().collect::<String>())))
            .collect();
        record.status = Some(Status::Read);
        record.finished_at = pane
            .select(&consts::STORYGRAPH_READ_DATE_SELECTOR)
            .next()
            .and_then(|el| read_date(&record, &el.text().collect::<String>()));
        record
    }

    /// Build a record from a `#search-results-ul li a` search result link.
    ///
    /// Search results carry no ISBN of their own; pass the one that was
    /// searched for, if any, so the result can be joined on later.
    pub fn from_storygraph_result(link: ElementRef<'_>, base_url: &str, isbn: Option<&str>) -> Self {
        let href = link.value().attr("href").unwrap_or_default();
        let id = consts::STORYGRAPH_BOOK_URL_REGEX
            .captures(href)
            .and_then(|captures| captures.get(1))
            .and_then(|m| non_empty(m.as_str()));
        let mut record = Self::new(Source::Storygraph, id);
        record.title = link
            .select(&consts::STORYGRAPH_RESULT_TITLE_SELECTOR)
            .next()
            .and_then(|el| non_empty(squish(&el.text().collect::<String>())));
        record.authors = link
            .select(&consts::STORYGRAPH_RESULT_AUTHOR_SELECTOR)
            .next()
            .and_then(|el| non_empty(squish(&el.text().collect::<String>())))
            .map(|author| vec![author])
            .unwrap_or_default();
        record.isbn = isbn.and_then(non_empty);
        record.url = non_empty(href).map(|href| absolute_url(base_url, &href));
        record
    }
}

pub(crate) fn absolute_url(base_url: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else {
        format!("{}/{}", base_url.trim_end_matches('/'), href.trim_start_matches('/'))
    }
}

/// Collapse runs of whitespace, the way scraped text needs it.
pub(crate) fn squish(text: &str) -> String {
    consts::WHITESPACE_REGEX.replace_all(text.trim(), " ").into_owned()
}

/// "Simmons, Dan" => "Dan Simmons"
fn reorder_surname_first(author: &str) -> String {
    match author.split_once(", ") {
        Some((surname, given)) => format!("{given} {surname}"),
        None => author.to_string(),
    }
}

/// A read date that isn't a real date ("Feb 30, 2024") is treated as
/// absent; the rest of the row is still good.
fn read_date(record: &Record, text: &str) -> Option<UtcDateTime> {
    match month_day_year(text) {
        Ok(date) => date.map(|date| date.midnight().as_utc()),
        Err(err) => {
            tracing::warn!(id = ?record.id, error = %err, "Ignoring invalid read date");
            None
        },
    }
}

/// Finds a "Jan 1, 2024"-style date. Text without one (e.g. "not set") is
/// `Ok(None)`; a date-shaped value that isn't a real date is an error.
fn month_day_year(text: &str) -> Result<Option<Date>> {
    let Some(captures) = consts::MONTH_DAY_YEAR_REGEX.captures(text) else {
        return Ok(None);
    };
    let parse_error = || ErrorKind::ParseError {
        field: "date",
        value: text.trim().to_string(),
    };
    let month = match captures[1].to_lowercase().as_str() {
        "jan" => Month::January,
        "feb" => Month::February,
        "mar" => Month::March,
        "apr" => Month::April,
        "may" => Month::May,
        "jun" => Month::June,
        "jul" => Month::July,
        "aug" => Month::August,
        "sep" => Month::September,
        "oct" => Month::October,
        "nov" => Month::November,
        "dec" => Month::December,
        _ => return Ok(None),
    };
    let day = captures[2].parse::<u8>().or_raise(parse_error)?;
    let year = captures[3].parse::<i32>().or_raise(parse_error)?;
    Ok(Some(Date::from_calendar_date(year, month, day).or_raise(parse_error)?))
}
