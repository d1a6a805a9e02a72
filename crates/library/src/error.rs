//! Library Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use crate::remote::error::{Error as RemoteError, ErrorKind as RemoteErrorKind};
use derive_more::{Display, Error};
use shelfsync_records::Source;
use std::path::PathBuf;

/// A library error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// ### Recoverable
/// - [`ErrorKind::NotAuthenticated`]: sign in again, then retry.
///
/// ### Fatal for the current operation
/// - [`ErrorKind::Remote`]
/// - [`ErrorKind::Cache`]
/// - [`ErrorKind::File`]
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The remote session expired or was never established.
    #[display("not signed in to {_0}")]
    NotAuthenticated(#[error(not(source))] Source),
    /// Any other remote failure (HTTP, navigation, unexpected payload).
    #[display("remote request failed")]
    Remote,
    /// The local store failed to read or write.
    #[display("local store error")]
    Cache,
    /// The legacy library file couldn't be read or written.
    #[display("library file error: {}", _0.display())]
    File(#[error(not(source))] PathBuf),
}

impl ErrorKind {
    /// Re-raise a remote error, keeping its frame as a child. An expired
    /// session stays recognizable as [`ErrorKind::NotAuthenticated`].
    #[track_caller]
    pub fn remote(err: RemoteError) -> Error {
        let kind = match &*err {
            RemoteErrorKind::NotAuthenticated(source) => Self::NotAuthenticated(*source),
            _ => Self::Remote,
        };
        err.raise(kind)
    }

    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::NotAuthenticated(_))
    }

    /// Returns `true` if the caller needs to sign in again before retrying.
    pub fn requires_reauth(&self) -> bool {
        matches!(self, Self::NotAuthenticated(_))
    }
}
