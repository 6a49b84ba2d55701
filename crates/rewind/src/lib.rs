#![forbid(unsafe_code)]

//! Rewind public facade crate.
//!
//! Re-exports the bounded buffer from `rewind-core` and the undo/redo
//! orchestrator from `rewind-runtime`, plus a unified [`Error`] and a
//! prelude for day-to-day use.
//!
//! ```
//! use rewind::prelude::*;
//!
//! let history = ActionHistory::with_limit(UndoLimit::bounded(2));
//! for name in ["A", "B", "C"] {
//!     history
//!         .execute_action(CallbackAction::new(name).with_execute(|| Ok(())).with_undo(|| Ok(())))
//!         .unwrap();
//! }
//! assert_eq!(history.undo_descriptions(10), vec!["C", "B"]);
//! ```

pub mod error;

// --- Buffer re-exports -----------------------------------------------------

pub use rewind_core::{BoundedCircularBuffer, BufferError, Capacity, Cursor, ErrorKind, Iter};

// --- History re-exports ----------------------------------------------------

pub use rewind_runtime::{
    Action, ActionError, ActionHistory, ActionKind, ActionRecord, ActionResult, AsyncAction,
    CallbackAction, Completion, ConfigError, DEFAULT_MAX_UNDO_ACTIONS, ExecutionMode,
    ExecutionState, HistoryConfig, HistoryError, HistoryStats, Operation, PendingAction,
    UndoLimit,
};

// --- Errors ----------------------------------------------------------------

pub use error::{Error, Result};

/// Common imports.
pub mod prelude {
    pub use crate::{
        Action, ActionError, ActionHistory, ActionResult, AsyncAction, BoundedCircularBuffer,
        CallbackAction, Capacity, Completion, Error, HistoryConfig, UndoLimit,
    };
}
