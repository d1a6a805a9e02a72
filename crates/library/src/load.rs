//! Cache-or-refresh loading of one source's collection.
//!
//! A collection synced within the freshness window is read straight from
//! the local store. Otherwise the remote listing is paged through in full,
//! each page saved as it arrives, and the sync marker is only touched once
//! the whole pass has succeeded: an interrupted refresh leaves its pages
//! cached and is simply retried next time.

use crate::collection::{Collection, persist_record};
use crate::error::{ErrorKind, Result};
use crate::freshness;
use crate::remote::RemoteClient;
use exn::ResultExt;
use shelfsync_cache::{LocalStore, SyncMarkerStore};
use shelfsync_config::Config;
use shelfsync_records::{Record, Source};
use time::{Duration, UtcDateTime};
use tracing::instrument;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    pub max_age: Duration,
    pub page_size: u32,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            max_age: freshness::max_age(1),
            page_size: 50,
        }
    }
}

impl From<&Config> for LoadOptions {
    fn from(config: &Config) -> Self {
        Self {
            max_age: freshness::max_age(config.cache.max_age_days),
            page_size: config.remote.page_size,
        }
    }
}

/// Load the collection `remote` serves, from the local cache if it's fresh.
///
/// Remote failures are not caught; an expired session surfaces as
/// [`ErrorKind::NotAuthenticated`].
#[instrument(skip_all, fields(source = %remote.source()))]
pub async fn load(
    remote: &dyn RemoteClient,
    store: &dyn LocalStore,
    markers: &dyn SyncMarkerStore,
    options: LoadOptions,
) -> Result<Collection> {
    let source = remote.source();
    let last_synced = markers.find(source.sync_key()).await.or_raise(|| ErrorKind::Cache)?;

    if freshness::is_fresh(last_synced, options.max_age, UtcDateTime::now()) {
        tracing::info!(?last_synced, "Cache is fresh");
        let mut collection = Collection::from_store(store).await?;
        if source == Source::Audible && !collection.is_empty() && collection.total_finish_dates() == 0 {
            tracing::info!("Cached library has no finish dates, backfilling");
            backfill_finish_dates(remote, store, &mut collection).await?;
        }
        return Ok(collection);
    }

    tracing::info!(?last_synced, "Cache is stale, refreshing from remote");
    refresh(remote, store, markers, options.page_size).await
}

/// Page through the whole remote listing, then mark the collection synced.
async fn refresh(
    remote: &dyn RemoteClient,
    store: &dyn LocalStore,
    markers: &dyn SyncMarkerStore,
    page_size: u32,
) -> Result<Collection> {
    let source = remote.source();
    let mut collection = Collection::new(source);
    let mut page_number = 1;
    loop {
        let page = remote.fetch_page(page_number, page_size).await.map_err(ErrorKind::remote)?;
        if page.total_count.is_some() {
            collection.set_reported_total(page.total_count);
        }
        if page.records.is_empty() {
            break;
        }

        let before = collection.len();
        let mut records = page.records;
        // The last page can come back full even though only part of it is
        // still owed.
        if let Some(total) = collection.reported_total() {
            records.truncate(total.saturating_sub(before));
        }
        for record in records {
            add_and_persist(&mut collection, store, record).await?;
        }
        tracing::info!(
            page = page_number,
            loaded = collection.len(),
            total = ?collection.reported_total(),
            "Fetched page"
        );

        if collection.reported_total().is_some_and(|total| collection.len() >= total) || !page.has_next {
            break;
        }
        if collection.len() == before {
            tracing::warn!(page = page_number, "Page added nothing new, stopping");
            break;
        }
        page_number += 1;
    }

    markers.touch(source.sync_key(), UtcDateTime::now()).await.or_raise(|| ErrorKind::Cache)?;

    if source == Source::Audible && backfill_finish_dates(remote, store, &mut collection).await? > 0 {
        markers.touch(source.sync_key(), UtcDateTime::now()).await.or_raise(|| ErrorKind::Cache)?;
    }
    Ok(collection)
}

/// Persist the merged version of a record, not just what the page said.
async fn add_and_persist(collection: &mut Collection, store: &dyn LocalStore, record: Record) -> Result<()> {
    let Some(id) = record.id().map(str::to_string) else {
        persist_record(store, &record).await?;
        collection.add_or_merge(record);
        return Ok(());
    };
    collection.add_or_merge(record);
    if let Some(stored) = collection.get(&id) {
        persist_record(store, stored).await?;
    }
    Ok(())
}

/// Fill in missing finish timestamps from the remote's finish-event log.
/// Dates already on a record are left alone. Returns how many records
/// changed.
#[instrument(skip_all)]
async fn backfill_finish_dates(
    remote: &dyn RemoteClient,
    store: &dyn LocalStore,
    collection: &mut Collection,
) -> Result<usize> {
    let finish_dates = remote.fetch_finish_dates().await.map_err(ErrorKind::remote)?;
    let mut changed = Vec::new();
    for (id, finished_at) in finish_dates {
        if let Some(record) = collection.get_mut(&id).filter(|record| record.finished_at.is_none()) {
            record.finished_at = Some(finished_at);
            changed.push(id);
        }
    }
    for id in &changed {
        if let Some(record) = collection.get(id) {
            persist_record(store, record).await?;
        }
    }
    tracing::info!(updated = changed.len(), "Backfilled finish dates");
    Ok(changed.len())
}
