#![forbid(unsafe_code)]

//! Error taxonomy shared by the buffer and history layers.
//!
//! Every error in the workspace maps onto one of three [`ErrorKind`]s so
//! callers can branch on the category without matching every variant.

use std::fmt;

/// Broad category of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A caller-supplied value is out of range (e.g. a negative capacity).
    InvalidArgument,
    /// The operation is not valid in the current state (empty buffer,
    /// busy history, stale cursor).
    InvalidState,
    /// A wrapped action reported a failure.
    ActionFailure,
}

impl ErrorKind {
    /// Stable label for logs and metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidArgument => "invalid_argument",
            Self::InvalidState => "invalid_state",
            Self::ActionFailure => "action_failure",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by [`BoundedCircularBuffer`](crate::BoundedCircularBuffer)
/// and its [`Cursor`](crate::Cursor).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    /// A negative capacity other than the unbounded sentinel was supplied.
    InvalidCapacity(i64),
    /// `pop`/`peek` on an empty buffer.
    Empty,
    /// The buffer was mutated after the cursor took its snapshot.
    Modified {
        /// Version captured when the cursor was created or reset.
        expected: u64,
        /// Version observed at the failing advance.
        found: u64,
    },
    /// The cursor was created by a different buffer.
    ForeignCursor,
}

impl BufferError {
    /// Category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidCapacity(_) => ErrorKind::InvalidArgument,
            Self::Empty | Self::Modified { .. } | Self::ForeignCursor => ErrorKind::InvalidState,
        }
    }
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCapacity(raw) => {
                write!(f, "invalid capacity {raw}: must be >= 0 (0 = unbounded)")
            }
            Self::Empty => write!(f, "buffer is empty"),
            Self::Modified { expected, found } => write!(
                f,
                "buffer modified during enumeration (version {expected} -> {found})"
            ),
            Self::ForeignCursor => write!(f, "cursor belongs to a different buffer"),
        }
    }
}

impl std::error::Error for BufferError {}
