use super::sanitize;
use crate::error::{Error, ErrorKind};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// The service a record was collected from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Commerce audiobook platform (paginated JSON API).
    Audible,
    /// Tracking site A (scraped, slug identifiers).
    Goodreads,
    /// Tracking site B (scraped, opaque identifiers).
    Storygraph,
}
impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Audible => "audible",
            Self::Goodreads => "goodreads",
            Self::Storygraph => "storygraph",
        }
    }

    /// Name of the sync-time marker for this source's collection.
    pub fn sync_key(&self) -> &'static str {
        match self {
            Self::Audible => "audible_library",
            Self::Goodreads => "goodreads_library",
            Self::Storygraph => "storygraph_library",
        }
    }
}
impl FromStr for Source {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match sanitize(s).as_str() {
            "audible" => Self::Audible,
            "goodreads" => Self::Goodreads,
            "storygraph" | "thestorygraph" => Self::Storygraph,
            _ => exn::bail!(ErrorKind::ParseError {
                field: "source",
                value: s.to_string(),
            }),
        })
    }
}
impl Display for Source {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Source::Audible)]
    #[case(Source::Goodreads)]
    #[case(Source::Storygraph)]
    fn test_display_parses_back(#[case] source: Source) {
        assert_eq!(source.to_string().parse::<Source>().unwrap(), source);
    }

    #[test]
    fn test_unknown_source() {
        assert!("kindle".parse::<Source>().is_err());
    }
}
