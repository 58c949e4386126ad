//! Error types for annotext.

use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for extraction operations.
///
/// Every variant is terminal for a run: nothing is retried and no partial
/// output is produced once one of these is returned.
#[derive(Error, Debug)]
pub enum Error {
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("unreadable PDF document {}: {reason}", path.display())]
    UnreadableDocument { path: PathBuf, reason: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn unreadable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Error::UnreadableDocument {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Process exit code for this error.
    ///
    /// `2` matches clap's own usage-error code so that bad flags and bad
    /// flag values exit the same way.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidArgument(_) => 2,
            Error::FileNotFound(_) => 3,
            Error::UnreadableDocument { .. } => 4,
            Error::Io(_) | Error::Json(_) => 1,
        }
    }
}

/// Convenience Result type alias for [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
