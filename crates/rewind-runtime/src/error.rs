#![forbid(unsafe_code)]

//! Errors returned by [`ActionHistory`](crate::ActionHistory).

use std::error::Error as StdError;
use std::fmt;

use rewind_core::ErrorKind;

use crate::action::{ActionError, Operation};
use crate::state::ExecutionMode;

/// Failure of a history request.
#[derive(Debug)]
pub enum HistoryError {
    /// Negative `max_undo_actions` other than the unlimited sentinel.
    InvalidLimit(i64),
    /// Another action is still executing.
    Busy {
        /// Shape of the call already in flight.
        ongoing: ExecutionMode,
    },
    /// `undo` with an empty undo buffer.
    NothingToUndo,
    /// `redo` with an empty redo buffer.
    NothingToRedo,
    /// The wrapped action failed; nothing was recorded.
    ActionFailed {
        operation: Operation,
        source: ActionError,
    },
}

impl HistoryError {
    /// Category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidLimit(_) => ErrorKind::InvalidArgument,
            Self::Busy { .. } | Self::NothingToUndo | Self::NothingToRedo => {
                ErrorKind::InvalidState
            }
            Self::ActionFailed { .. } => ErrorKind::ActionFailure,
        }
    }

    /// Whether the request was turned away because an action is in flight.
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        matches!(self, Self::Busy { .. })
    }

    /// The action's own error, if the action failed.
    #[must_use]
    pub fn action_error(&self) -> Option<&ActionError> {
        match self {
            Self::ActionFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl fmt::Display for HistoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidLimit(raw) => write!(
                f,
                "invalid max undo actions {raw}: use -1 (unlimited), 0 (disabled) or a positive count"
            ),
            Self::Busy { ongoing } => {
                write!(f, "an action is already executing ({ongoing})")
            }
            Self::NothingToUndo => write!(f, "nothing to undo"),
            Self::NothingToRedo => write!(f, "nothing to redo"),
            Self::ActionFailed { operation, source } => {
                write!(f, "action {operation} failed: {source}")
            }
        }
    }
}

impl StdError for HistoryError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::ActionFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}
