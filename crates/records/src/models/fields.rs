use super::Source;
use serde::{Deserialize, Serialize};

/// Flat, storage-friendly shape of a [`Record`](crate::Record).
///
/// This is what rows in the local store map to, and what the legacy JSON
/// library file is an array of. Multi-valued fields are flattened with
/// [`join_words`](crate::join_words) and timestamps are RFC 3339 strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fields {
    pub source: Source,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub narrator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent_complete: Option<u8>,
    #[serde(default)]
    pub marked_finished: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}
impl Fields {
    /// An otherwise empty set of fields for the given source.
    pub fn new(source: Source) -> Self {
        Self {
            source,
            id: None,
            isbn: None,
            title: None,
            author: None,
            narrator: None,
            status: None,
            percent_complete: None,
            marked_finished: false,
            finished_at: None,
            added_at: None,
            url: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_keys_default() {
        let fields: Fields = serde_json::from_str(r#"{"source":"goodreads","id":"11286.Carrion_Comfort"}"#).unwrap();
        assert_eq!(fields.source, Source::Goodreads);
        assert_eq!(fields.id.as_deref(), Some("11286.Carrion_Comfort"));
        assert!(!fields.marked_finished);
        assert!(fields.finished_at.is_none());
    }

    #[test]
    fn test_absent_values_are_not_serialized() {
        let json = serde_json::to_string(&Fields::new(Source::Storygraph)).unwrap();
        assert_eq!(json, r#"{"source":"storygraph","marked_finished":false}"#);
    }
}
