use super::error::{ErrorKind, Result};
use super::{Page, RemoteClient, Transport};
use async_trait::async_trait;
use exn::{OptionExt, ResultExt};
use serde_json::Value;
use shelfsync_records::{Record, Source, parse_timestamp};
use std::collections::HashMap;
use time::UtcDateTime;
use tracing::instrument;

pub const API_URL: &str = "https://api.audible.com";
const RESPONSE_GROUPS: &str = "contributors,product_attrs,product_desc,listening_status,is_finished,percent_complete";
const TOTAL_COUNT_HEADER: &str = "Total-Count";

/// The commerce API: paginated JSON with the total in a response header.
#[derive(Debug)]
pub struct AudibleClient<T> {
    transport: T,
    api_url: String,
}

impl<T: Transport> AudibleClient<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            api_url: API_URL.to_string(),
        }
    }

    /// Point at another marketplace, e.g. `https://api.audible.co.uk`.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<(Value, Option<usize>)> {
        let url = format!("{}{}", self.api_url, path);
        let response = self.transport.get(&url, query).await?.check(Source::Audible)?;
        let total = response.header(TOTAL_COUNT_HEADER).and_then(|value| value.trim().parse().ok());
        let json = serde_json::from_str(&response.body).or_raise(|| ErrorKind::InvalidResponse("not JSON"))?;
        Ok((json, total))
    }
}

#[async_trait]
impl<T: Transport> RemoteClient for AudibleClient<T> {
    fn source(&self) -> Source {
        Source::Audible
    }

    #[instrument(skip(self))]
    async fn fetch_page(&self, page: u32, page_size: u32) -> Result<Page> {
        let query = [
            ("num_results", page_size.to_string()),
            ("page", page.to_string()),
            ("response_groups", RESPONSE_GROUPS.to_string()),
            ("sort_by", "-PurchaseDate".to_string()),
        ];
        let (json, total_count) = self.get_json("/1.0/library", &query).await?;
        let items = json
            .get("items")
            .and_then(Value::as_array)
            .ok_or_raise(|| ErrorKind::InvalidResponse("library has no items"))?;
        let records = items
            .iter()
            .map(Record::from_audible_json)
            .collect::<shelfsync_records::error::Result<Vec<_>>>()
            .or_raise(|| ErrorKind::InvalidResponse("library item"))?;
        Ok(Page {
            total_count,
            has_next: items.len() >= page_size as usize,
            records,
        })
    }

    /// Reads the "mark as finished" event log. The latest finish event per
    /// ASIN wins; un-finish events are ignored.
    #[instrument(skip(self))]
    async fn fetch_finish_dates(&self) -> Result<HashMap<String, UtcDateTime>> {
        let query = [("start_date", "1970-01-01T00:00:00Z".to_string())];
        let (json, _) = self.get_json("/1.0/stats/status/finished", &query).await?;
        let events = json
            .get("mark_as_finished_status_list")
            .and_then(Value::as_array)
            .ok_or_raise(|| ErrorKind::InvalidResponse("no finished status list"))?;
        let mut dates = HashMap::new();
        for event in events {
            if !event.get("is_marked_as_finished").and_then(Value::as_bool).unwrap_or(false) {
                continue;
            }
            let asin = event.get("asin").and_then(Value::as_str);
            let at = event.get("event_timestamp").and_then(Value::as_str).and_then(parse_timestamp);
            let (Some(asin), Some(at)) = (asin, at) else {
                tracing::warn!(?event, "Ignoring malformed finish event");
                continue;
            };
            dates
                .entry(asin.to_string())
                .and_modify(|existing: &mut UtcDateTime| *existing = (*existing).max(at))
                .or_insert(at);
        }
        tracing::info!(finished = dates.len(), "Fetched finish dates");
        Ok(dates)
    }

    /// The library API has no ISBN lookup.
    async fn search_by_isbn(&self, _isbn: &str) -> Result<Option<Record>> {
        Ok(None)
    }
}
