//! Carrying finish dates from one service over to another.
//!
//! For every target (an ISBN and the date it was finished), the matching
//! record on the tracking service is found, locally first and then
//! remotely, and its read date compared. Records that aren't marked read
//! yet are handed to a [`Decider`], which says whether to write the date
//! back. Disagreeing dates are reported, never overwritten.

use crate::collection::{Collection, PersistReport};
use crate::error::{ErrorKind, Result};
use crate::remote::RemoteClient;
use shelfsync_cache::LocalStore;
use shelfsync_records::{ReadDate, Record, Status};
use std::collections::HashSet;
use time::Date;
use tracing::instrument;

/// A book that was finished on `finished_on`, identified by ISBN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub isbn: String,
    pub finished_on: Date,
    /// Free-text fallback for when the ISBN finds nothing.
    pub query: Option<String>,
}

impl Target {
    pub fn new(isbn: impl Into<String>, finished_on: Date) -> Self {
        Self {
            isbn: isbn.into(),
            finished_on,
            query: None,
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// One target per ISBN among the collection's finished records, most
    /// recently finished first.
    pub fn from_collection(collection: &Collection) -> Vec<Self> {
        let mut seen = HashSet::new();
        collection
            .finished()
            .into_iter()
            .filter_map(|record| Some((record, record.isbn()?, record.finished_on()?)))
            .filter(|(_, isbn, _)| seen.insert(*isbn))
            .map(|(record, isbn, finished_on)| Self {
                isbn: isbn.to_string(),
                finished_on,
                query: record.search_query(),
            })
            .collect()
    }
}

/// A record that isn't marked as read yet, and the date it should get.
#[derive(Debug)]
pub struct Candidate<'a> {
    pub record: &'a Record,
    pub target: Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    SetReadDate,
    Skip,
    /// Stop here; nothing further is processed.
    Cancel,
}

/// Answers for each write-back candidate, typically by asking the user.
pub trait Decider: Send {
    fn decide(&mut self, candidate: &Candidate<'_>) -> Decision;

    /// Checked after each target has been fully handled.
    fn is_cancelled(&self) -> bool {
        false
    }
}

impl<F> Decider for F
where
    F: FnMut(&Candidate<'_>) -> Decision + Send,
{
    fn decide(&mut self, candidate: &Candidate<'_>) -> Decision {
        self(candidate)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Neither the local collection nor the remote knows the ISBN.
    NotFound,
    /// The record exists but has no stable ID to write back to.
    NoStableId,
    AlreadyConsistent,
    /// Both sides have a finish date and they disagree.
    Conflict { remote: Date, target: Date },
    Marked,
    /// The remote refused the new read date.
    Rejected,
    Skipped,
    Cancelled,
}

#[derive(Debug, Default)]
pub struct Report {
    /// One entry per processed target, in processing order.
    pub outcomes: Vec<(String, Outcome)>,
    pub cancelled: bool,
    /// Records found remotely and added to the collection.
    pub discovered: usize,
    /// Set when the collection was saved at the end of the run.
    pub persisted: Option<PersistReport>,
}

impl Report {
    pub fn outcome(&self, isbn: &str) -> Option<&Outcome> {
        self.outcomes.iter().find(|(key, _)| key == isbn).map(|(_, outcome)| outcome)
    }

    pub fn count(&self, outcome: &Outcome) -> usize {
        self.outcomes.iter().filter(|(_, o)| o == outcome).count()
    }
}

/// Work through `targets` in order against the tracking service's
/// `collection`.
///
/// If anything was discovered or written back, the collection is saved once
/// at the end, including when the run stops on an error. Earlier targets
/// stay as they were handled either way.
#[instrument(skip_all, fields(source = %collection.source(), targets = targets.len()))]
pub async fn reconcile(
    targets: &[Target],
    collection: &mut Collection,
    remote: &dyn RemoteClient,
    store: &dyn LocalStore,
    decider: &mut dyn Decider,
) -> Result<Report> {
    let mut run = Run {
        collection,
        remote,
        decider,
        report: Report::default(),
        dirty: false,
    };
    let result = run.process(targets).await;
    let Run {
        collection,
        mut report,
        dirty,
        ..
    } = run;

    if dirty {
        match (collection.persist(store).await, &result) {
            (Ok(persisted), _) => report.persisted = Some(persisted),
            (Err(err), Ok(())) => return Err(err),
            (Err(err), Err(_)) => tracing::error!(error = %err, "Could not save the collection"),
        }
    }
    result?;
    tracing::info!(
        processed = report.outcomes.len(),
        marked = report.count(&Outcome::Marked),
        not_found = report.count(&Outcome::NotFound),
        cancelled = report.cancelled,
        "Reconciliation finished"
    );
    Ok(report)
}

struct Run<'a> {
    collection: &'a mut Collection,
    remote: &'a dyn RemoteClient,
    decider: &'a mut dyn Decider,
    report: Report,
    dirty: bool,
}

impl Run<'_> {
    async fn process(&mut self, targets: &[Target]) -> Result<()> {
        for target in targets {
            let outcome = self.handle(target).await?;
            let cancelled = outcome == Outcome::Cancelled;
            self.report.outcomes.push((target.isbn.clone(), outcome));
            if cancelled || self.decider.is_cancelled() {
                tracing::info!(isbn = %target.isbn, "Cancelled, skipping the remaining targets");
                self.report.cancelled = true;
                break;
            }
        }
        Ok(())
    }

    async fn handle(&mut self, target: &Target) -> Result<Outcome> {
        let Some(record) = self.locate(target).await? else {
            tracing::warn!(isbn = %target.isbn, "Not found");
            return Ok(Outcome::NotFound);
        };
        let Some(id) = record.id().map(str::to_string) else {
            tracing::warn!(record = %record.title_and_authors(), "No stable ID, can't update");
            return Ok(Outcome::NoStableId);
        };

        match record.finished_on() {
            Some(current) if current == target.finished_on => return Ok(Outcome::AlreadyConsistent),
            Some(current) => {
                tracing::warn!(record = %record.title_and_authors(), %current, target = %target.finished_on, "Finish dates disagree");
                return Ok(Outcome::Conflict {
                    remote: current,
                    target: target.finished_on,
                });
            },
            None => {},
        }

        let candidate = Candidate {
            record: &record,
            target: target.finished_on,
        };
        match self.decider.decide(&candidate) {
            Decision::Skip => return Ok(Outcome::Skipped),
            Decision::Cancel => return Ok(Outcome::Cancelled),
            Decision::SetReadDate => {},
        }

        let date = ReadDate::from(target.finished_on);
        let accepted = self.remote.set_finished_status(&id, date).await.map_err(ErrorKind::remote)?;
        if !accepted {
            tracing::warn!(record = %record.title_and_authors(), "Read date was rejected");
            return Ok(Outcome::Rejected);
        }
        if let Some(stored) = self.collection.get_mut(&id) {
            stored.finished_at = Some(target.finished_on.midnight().as_utc());
            stored.status = Some(Status::Read);
            self.dirty = true;
        }
        tracing::info!(record = %record.title_and_authors(), date = %target.finished_on, "Marked as read");
        Ok(Outcome::Marked)
    }

    /// Local collection first, then the remote by ISBN, then by free text.
    /// Anything found remotely joins the collection.
    async fn locate(&mut self, target: &Target) -> Result<Option<Record>> {
        if let Some(record) = self.collection.find_by_isbn(&target.isbn) {
            return Ok(Some(record.clone()));
        }
        let mut found = self.remote.search_by_isbn(&target.isbn).await.map_err(ErrorKind::remote)?;
        if found.is_none()
            && let Some(query) = &target.query
        {
            found = self.remote.search(query).await.map_err(ErrorKind::remote)?;
        }
        let Some(mut record) = found else {
            return Ok(None);
        };
        record.isbn.get_or_insert_with(|| target.isbn.clone());
        let Some(id) = record.id().map(str::to_string) else {
            return Ok(Some(record));
        };
        // Listings don't always carry ISBNs, so the hit may be a record we
        // already have. Compare against the merged one: it has the read date.
        let is_new = self.collection.get(&id).is_none();
        if self.collection.add_or_merge(record) {
            self.dirty = true;
        }
        if is_new {
            self.report.discovered += 1;
        }
        Ok(self.collection.get(&id).cloned())
    }
}
