#![forbid(unsafe_code)]

//! Unified error for applications using Rewind.
//!
//! Each layer keeps its own typed error so callers can match on what
//! matters; [`Error`] wraps them for code that just wants `?`.

use std::fmt;

use rewind_core::{BufferError, ErrorKind};
use rewind_runtime::{ConfigError, HistoryError};

/// Top-level error for Rewind APIs.
#[derive(Debug)]
pub enum Error {
    /// Buffer misuse (empty access, stale cursor, bad capacity).
    Buffer(BufferError),
    /// History request refused or action failed.
    History(HistoryError),
    /// Configuration could not be loaded.
    Config(ConfigError),
}

/// Standard result type for Rewind APIs.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Category of the underlying failure.
    ///
    /// Config I/O and parse failures count as invalid arguments.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Buffer(err) => err.kind(),
            Self::History(err) => err.kind(),
            Self::Config(ConfigError::Limit(err)) => err.kind(),
            Self::Config(_) => ErrorKind::InvalidArgument,
        }
    }

    /// Error type label for metrics and tracing.
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Buffer(_) => "buffer",
            Self::History(_) => "history",
            Self::Config(_) => "config",
        }
    }

    /// Whether retrying the same request later may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::History(err) if err.is_busy())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buffer(err) => write!(f, "{err}"),
            Self::History(err) => write!(f, "{err}"),
            Self::Config(err) => write!(f, "config: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Buffer(err) => Some(err),
            Self::History(err) => Some(err),
            Self::Config(err) => Some(err),
        }
    }
}

impl From<BufferError> for Error {
    fn from(err: BufferError) -> Self {
        Self::Buffer(err)
    }
}

impl From<HistoryError> for Error {
    fn from(err: HistoryError) -> Self {
        Self::History(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}
