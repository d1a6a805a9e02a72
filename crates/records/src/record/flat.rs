//! Flat store rows / legacy JSON entries.

use super::{Record, non_empty};
use crate::dates::{format_timestamp, parse_timestamp};
use crate::models::{Fields, Status};
use crate::words::{join_words, split_words};

impl Record {
    /// Build a record from its flat, stored shape.
    ///
    /// Unparseable timestamps are treated as absent (with a warning) rather
    /// than failing the whole row; everything else is infallible.
    pub fn from_fields(fields: Fields) -> Self {
        let mut record = Self::new(fields.source, fields.id);
        record.isbn = fields.isbn.and_then(non_empty);
        record.title = fields.title.and_then(non_empty);
        record.authors = fields.author.as_deref().map(split_words).unwrap_or_default();
        record.narrators = fields.narrator.as_deref().map(split_words).unwrap_or_default();
        record.status = fields.status.and_then(non_empty).map(|s| Status::from(s.as_str()));
        record.percent_complete = fields.percent_complete.map(|pct| pct.min(100));
        record.marked_finished = fields.marked_finished;
        record.finished_at = timestamp(&record, "finished_at", fields.finished_at.as_deref());
        record.added_at = timestamp(&record, "added_at", fields.added_at.as_deref());
        record.url = fields.url.and_then(non_empty);
        record
    }

    /// The flat shape of this record; the exact inverse of
    /// [`from_fields`](Self::from_fields) for every field a record carries.
    pub fn to_fields(&self) -> Fields {
        Fields {
            source: self.source,
            id: self.id.clone(),
            isbn: self.isbn.clone(),
            title: self.title.clone(),
            author: (!self.authors.is_empty()).then(|| join_words(&self.authors)),
            narrator: (!self.narrators.is_empty()).then(|| join_words(&self.narrators)),
            status: self.status.as_ref().map(|status| status.as_str().to_string()),
            percent_complete: self.percent_complete,
            marked_finished: self.marked_finished,
            finished_at: self.finished_at.map(format_timestamp),
            added_at: self.added_at.map(format_timestamp),
            url: self.url.clone(),
        }
    }
}

fn timestamp(record: &Record, field: &'static str, value: Option<&str>) -> Option<time::UtcDateTime> {
    let value = value?;
    let parsed = parse_timestamp(value);
    if parsed.is_none() && !value.trim().is_empty() {
        tracing::warn!(source = %record.source, id = ?record.id, field, value, "Ignoring unparseable timestamp");
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Source;

    fn stored_row() -> Fields {
        Fields {
            source: Source::Audible,
            id: Some("B002V0QK4C".to_string()),
            isbn: Some("9780553283686".to_string()),
            title: Some("Hyperion".to_string()),
            author: Some("Dan Simmons".to_string()),
            narrator: Some("Marc Vietor, Allyson Johnson, and Victor Bevine".to_string()),
            status: None,
            percent_complete: Some(100),
            marked_finished: true,
            finished_at: Some("2024-11-29T14:47:00Z".to_string()),
            added_at: Some("2020-02-01T00:00:00Z".to_string()),
            url: None,
        }
    }

    #[test]
    fn test_flattened_lists_are_split() {
        let record = Record::from_fields(stored_row());
        assert_eq!(record.narrators, vec!["Marc Vietor", "Allyson Johnson", "Victor Bevine"]);
        assert_eq!(record.authors, vec!["Dan Simmons"]);
    }

    #[test]
    fn test_fields_round_trip() {
        let row = stored_row();
        assert_eq!(Record::from_fields(row.clone()).to_fields(), row);
    }

    #[test]
    fn test_json_round_trip() {
        let record = Record::from_fields(stored_row());
        let json = serde_json::to_string_pretty(&record.to_fields()).unwrap();
        let reloaded = Record::from_fields(serde_json::from_str(&json).unwrap());
        assert_eq!(reloaded, record);
    }

    #[test]
    fn test_bad_timestamp_is_absent() {
        let mut row = stored_row();
        row.finished_at = Some("yesterday-ish".to_string());
        let record = Record::from_fields(row);
        assert!(record.finished_at.is_none());
        // Still finished thanks to the 100% progress.
        assert!(record.is_finished());
    }
}
