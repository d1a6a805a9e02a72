//! Commerce API payloads.

use super::{Record, non_empty};
use crate::dates::parse_timestamp;
use crate::error::{ErrorKind, Result};
use crate::models::Source;
use crate::words::split_words;
use exn::OptionExt;
use serde_json::Value;

impl Record {
    /// Build a record from one item of the commerce library listing, e.g.
    ///
    /// ```json
    /// {
    ///   "asin": "B002V0QK4C",
    ///   "title": "Hyperion",
    ///   "authors": [{"asin": "B000AQ0842", "name": "Dan Simmons"}],
    ///   "listening_status": {"is_finished": false, "percent_complete": 12.84}
    /// }
    /// ```
    ///
    /// Only a non-object payload is an error: every individual field is
    /// optional, including the ASIN (such records are skipped when
    /// persisting).
    pub fn from_audible_json(data: &Value) -> Result<Self> {
        let data = data.as_object().ok_or_raise(|| ErrorKind::InvalidDocument("library item is not an object".to_string()))?;
        let text = |key: &str| data.get(key).and_then(Value::as_str).and_then(non_empty);
        let listening = data.get("listening_status").and_then(Value::as_object);

        let mut record = Self::new(Source::Audible, text("asin").or_else(|| text("isbn")));
        record.isbn = text("isbn");
        record.title = text("title");
        record.authors = names(data.get("authors"));
        record.narrators = names(data.get("narrators"));
        record.percent_complete = data
            .get("percent_complete")
            .filter(|v| !v.is_null())
            .or_else(|| listening.and_then(|l| l.get("percent_complete")))
            .and_then(percent);
        record.marked_finished =
            listening.and_then(|l| l.get("is_finished")).and_then(Value::as_bool).unwrap_or(false);
        record.finished_at = text("finished_at").as_deref().and_then(parse_timestamp);
        record.added_at = data
            .get("library_status")
            .and_then(|s| s.get("date_added"))
            .and_then(Value::as_str)
            .or_else(|| data.get("purchase_date").and_then(Value::as_str))
            .and_then(parse_timestamp);
        Ok(record)
    }
}

/// Contributor lists arrive either as `[{"name": ..}, ..]`, as a plain list
/// of strings, or already flattened into "A, B, and C".
fn names(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(name) => non_empty(name),
                Value::Object(map) => map.get("name").and_then(Value::as_str).and_then(non_empty),
                _ => None,
            })
            .collect(),
        Some(Value::String(joined)) => split_words(joined),
        _ => Vec::new(),
    }
}

/// Percentages arrive as floats from the API and integers from storage;
/// both round to the nearest whole percent.
fn percent(value: &Value) -> Option<u8> {
    let pct = value.as_f64().or_else(|| value.as_str().and_then(|s| s.trim().parse::<f64>().ok()))?;
    if !pct.is_finite() {
        return None;
    }
    // Clamped into range, so the cast can't truncate.
    Some(pct.round().clamp(0.0, 100.0) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn test_listing_item() {
        let item = json!({
            "asin": "B002V0QK4C",
            "isbn": "9780553283686",
            "title": "Hyperion",
            "authors": [{"asin": "B000AQ0842", "name": "Dan Simmons"}],
            "narrators": [{"name": "Marc Vietor"}, {"name": "Allyson Johnson"}, {"name": "Victor Bevine"}],
            "library_status": {"date_added": "2020-02-01T08:00:00Z"},
            "listening_status": {"is_finished": false, "percent_complete": 12.84},
        });
        let record = Record::from_audible_json(&item).unwrap();
        assert_eq!(record.id(), Some("B002V0QK4C"));
        assert_eq!(record.isbn(), Some("9780553283686"));
        assert_eq!(record.authors, vec!["Dan Simmons"]);
        assert_eq!(record.narrators.len(), 3);
        assert_eq!(record.percent_complete, Some(13));
        assert!(record.is_started());
        assert!(!record.is_finished());
        assert!(record.added_at.is_some());
    }

    #[rstest]
    #[case(json!(99.5), Some(100))]
    #[case(json!(99.4), Some(99))]
    #[case(json!(42), Some(42))]
    #[case(json!("7.6"), Some(8))]
    #[case(json!(140.0), Some(100))]
    #[case(json!(null), None)]
    fn test_percent_rounding(#[case] value: Value, #[case] expected: Option<u8>) {
        assert_eq!(percent(&value), expected);
    }

    #[test]
    fn test_finished_flag_without_timestamp() {
        let item = json!({"asin": "B0", "listening_status": {"is_finished": true, "percent_complete": 97.0}});
        let record = Record::from_audible_json(&item).unwrap();
        assert!(record.is_finished());
        assert!(record.finished_at.is_none());
    }

    #[test]
    fn test_flattened_authors() {
        let item = json!({"asin": "B0", "authors": "Terry Pratchett and Neil Gaiman"});
        let record = Record::from_audible_json(&item).unwrap();
        assert_eq!(record.authors, vec!["Terry Pratchett", "Neil Gaiman"]);
    }

    #[test]
    fn test_missing_asin_is_not_an_error() {
        let record = Record::from_audible_json(&json!({"title": "Untitled"})).unwrap();
        assert!(record.id().is_none());
    }

    #[test]
    fn test_not_an_object() {
        assert!(Record::from_audible_json(&json!([1, 2, 3])).is_err());
    }
}
