use super::sanitize;
use std::convert::Infallible;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Reading status as reported by a tracking site.
///
/// Remote-supplied text isn't under our control, so parsing never fails:
/// anything unrecognized is kept verbatim in [`Status::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Status {
    CurrentlyReading,
    ToRead,
    Read,
    DidNotFinish,
    Other(String),
}
impl Status {
    pub fn as_str(&self) -> &str {
        match self {
            Self::CurrentlyReading => "currently-reading",
            Self::ToRead => "to-read",
            Self::Read => "read",
            Self::DidNotFinish => "did-not-finish",
            Self::Other(value) => value.as_str(),
        }
    }

    /// Human-friendly label, e.g. for a status summary line.
    pub fn label(&self) -> &str {
        match self {
            Self::CurrentlyReading => "Currently reading",
            Self::ToRead => "Want to read",
            Self::Read => "Finished",
            Self::DidNotFinish => "Did not finish",
            Self::Other(value) => value.as_str(),
        }
    }
}
impl FromStr for Status {
    type Err = Infallible;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match sanitize(s).as_str() {
            "currentlyreading" | "reading" => Self::CurrentlyReading,
            "toread" | "wanttoread" => Self::ToRead,
            "read" | "finished" => Self::Read,
            "didnotfinish" | "dnf" => Self::DidNotFinish,
            _ => Self::Other(s.trim().to_string()),
        })
    }
}
impl From<&str> for Status {
    fn from(value: &str) -> Self {
        let Ok(status) = value.parse::<Status>();
        status
    }
}
impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("currently-reading", Status::CurrentlyReading)]
    #[case("Currently Reading", Status::CurrentlyReading)]
    #[case("to-read", Status::ToRead)]
    #[case("read", Status::Read)]
    #[case("did-not-finish", Status::DidNotFinish)]
    #[case(" dnf ", Status::DidNotFinish)]
    #[case("favourites", Status::Other("favourites".to_string()))]
    fn test_parse(#[case] input: &str, #[case] expected: Status) {
        assert_eq!(Status::from(input), expected);
    }

    #[test]
    fn test_serialized_form_parses_back() {
        for status in [Status::CurrentlyReading, Status::ToRead, Status::Read, Status::DidNotFinish] {
            assert_eq!(Status::from(status.as_str()), status);
        }
    }
}
