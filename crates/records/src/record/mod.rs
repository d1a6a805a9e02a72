//! The normalized [`Record`] and everything derived from it.

mod flat;
mod html;
mod json;

pub(crate) use html::{absolute_url, squish};

use crate::models::{Source, Status};
use crate::words::join_words;
use std::fmt::{Display, Formatter, Result as FmtResult};
use time::{Date, UtcDateTime};

/// A single book as known to one source.
///
/// All normalization happens at construction (see the `from_*` factory
/// functions), so every accessor is a cheap read and repeated calls always
/// agree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub source: Source,
    /// Stable identifier within the source: ASIN for Audible, slug for
    /// Goodreads, opaque ID for Storygraph. Records without one can live in
    /// a collection but can't be persisted.
    pub id: Option<String>,
    /// Cross-service join key; neither guaranteed present nor unique.
    pub isbn: Option<String>,
    pub title: Option<String>,
    pub authors: Vec<String>,
    pub narrators: Vec<String>,
    /// Tracking sites only.
    pub status: Option<Status>,
    /// Commerce source only, always within `0..=100`.
    pub percent_complete: Option<u8>,
    /// The commerce source's own "finished" flag, which isn't always
    /// accompanied by a timestamp or a 100% progress value.
    pub marked_finished: bool,
    pub finished_at: Option<UtcDateTime>,
    pub added_at: Option<UtcDateTime>,
    pub url: Option<String>,
}

impl Record {
    /// An empty record, to be filled in by one of the factories.
    pub fn new(source: Source, id: Option<String>) -> Self {
        Self {
            source,
            id: id.and_then(non_empty),
            isbn: None,
            title: None,
            authors: Vec::new(),
            narrators: Vec::new(),
            status: None,
            percent_complete: None,
            marked_finished: false,
            finished_at: None,
            added_at: None,
            url: None,
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn isbn(&self) -> Option<&str> {
        self.isbn.as_deref()
    }

    /// A finish date, progress of 100%, a "read" status, or the source's
    /// own finished flag all count as finished.
    pub fn is_finished(&self) -> bool {
        self.finished_at.is_some()
            || self.percent_complete == Some(100)
            || self.status == Some(Status::Read)
            || self.marked_finished
    }

    pub fn is_started(&self) -> bool {
        self.percent_complete.is_some_and(|pct| pct > 0)
            || self.status.as_ref().is_some_and(|status| *status != Status::ToRead)
    }

    /// Calendar date (UTC) the record was finished on.
    pub fn finished_on(&self) -> Option<Date> {
        self.finished_at.map(|timestamp| timestamp.date())
    }

    /// e.g. "Carrion Comfort by Dan Simmons"
    pub fn title_and_authors(&self) -> String {
        let title = match (&self.title, &self.id) {
            (Some(title), _) => title.clone(),
            (None, Some(id)) => format!("Unknown ({} {})", self.source, id),
            (None, None) => "Unknown".to_string(),
        };
        if self.authors.is_empty() {
            title
        } else {
            format!("{} by {}", title, join_words(&self.authors))
        }
    }

    /// Free-text search terms for finding this book on another service.
    pub fn search_query(&self) -> Option<String> {
        let title = self.title.as_deref()?;
        Some(match self.authors.is_empty() {
            true => title.to_string(),
            false => format!("{} {}", title, join_words(&self.authors)),
        })
    }

    /// Short human-readable progress summary.
    pub fn finish_status(&self) -> String {
        if let Some(date) = self.finished_on() {
            format!("Finished {date}")
        } else if self.is_finished() {
            "Finished".to_string()
        } else if let Some(pct) = self.percent_complete.filter(|pct| *pct > 0) {
            format!("{pct}% complete")
        } else if let Some(status) = &self.status {
            status.label().to_string()
        } else {
            "Not started".to_string()
        }
    }

    /// Fill in anything this record is missing from `incoming`.
    ///
    /// Fields that are already populated are never overwritten, so a record
    /// rediscovered from a less complete listing can't lose data. Returns
    /// `true` if anything changed.
    pub fn merge_from(&mut self, incoming: &Record) -> bool {
        let mut changed = false;
        changed |= fill_text(&mut self.id, &incoming.id);
        changed |= fill_text(&mut self.isbn, &incoming.isbn);
        changed |= fill_text(&mut self.title, &incoming.title);
        changed |= fill_list(&mut self.authors, &incoming.authors);
        changed |= fill_list(&mut self.narrators, &incoming.narrators);
        changed |= fill(&mut self.status, &incoming.status);
        changed |= fill(&mut self.percent_complete, &incoming.percent_complete);
        changed |= fill(&mut self.finished_at, &incoming.finished_at);
        changed |= fill(&mut self.added_at, &incoming.added_at);
        changed |= fill_text(&mut self.url, &incoming.url);
        if !self.marked_finished && incoming.marked_finished {
            self.marked_finished = true;
            changed = true;
        }
        changed
    }
}

impl Display for Record {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{} ({})", self.title_and_authors(), self.finish_status())
    }
}

/// Day/month/year as three discrete fields, which is the shape the
/// tracking site's read-date form expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadDate {
    pub day: u8,
    pub month: u8,
    pub year: i32,
}
impl From<Date> for ReadDate {
    fn from(date: Date) -> Self {
        Self {
            day: date.day(),
            month: u8::from(date.month()),
            year: date.year(),
        }
    }
}

pub(crate) fn non_empty(value: impl AsRef<str>) -> Option<String> {
    let trimmed = value.as_ref().trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn fill<T: Clone>(slot: &mut Option<T>, incoming: &Option<T>) -> bool {
    if slot.is_some() {
        return false;
    }
    *slot = incoming.clone();
    slot.is_some()
}

fn fill_text(slot: &mut Option<String>, incoming: &Option<String>) -> bool {
    if slot.as_deref().is_some_and(|s| !s.is_empty()) {
        return false;
    }
    match incoming.as_deref() {
        Some(value) if !value.is_empty() => {
            *slot = Some(value.to_string());
            true
        },
        _ => false,
    }
}

fn fill_list(slot: &mut Vec<String>, incoming: &[String]) -> bool {
    if !slot.is_empty() || incoming.is_empty() {
        return false;
    }
    slot.extend_from_slice(incoming);
    true
}
