//! Error types for the [`remote`](super) module.

use derive_more::{Display, Error};
use shelfsync_records::Source;

/// A remote error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for remote operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies a remote failure.
///
/// [`ErrorKind::NotAuthenticated`] is the only recoverable kind: the caller
/// re-authenticates and tries again. Everything else aborts the operation.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The remote sent us to its sign-in page (or answered 401/403).
    #[display("not signed in to {_0}")]
    NotAuthenticated(#[error(not(source))] Source),
    /// The request never got a response.
    #[display("request failed")]
    Transport,
    #[display("unexpected HTTP status {status}")]
    Http { status: u16 },
    /// A page didn't contain what we needed to carry on (form, token, link).
    #[display("could not navigate: {_0}")]
    Navigation(#[error(not(source))] String),
    /// A response arrived but couldn't be understood.
    #[display("invalid response: {_0}")]
    InvalidResponse(#[error(not(source))] &'static str),
    #[display("{_0} does not support this operation")]
    Unsupported(#[error(not(source))] Source),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::NotAuthenticated(_) | Self::Transport => true,
            Self::Http { status } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    pub fn requires_reauth(&self) -> bool {
        matches!(self, Self::NotAuthenticated(_))
    }
}
