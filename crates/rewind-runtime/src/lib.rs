#![forbid(unsafe_code)]

//! Rewind Runtime
//!
//! Runs caller-supplied actions and records them in bounded undo and redo
//! buffers. One request runs at a time; sync actions complete inline and
//! async actions hand back a [`PendingAction`] future.
//!
//! # Key Components
//!
//! - [`ActionHistory`] - the orchestrator (`&self` API, `Send + Sync`)
//! - [`Action`] / [`AsyncAction`] - what callers implement
//! - [`CallbackAction`] - closure-backed action for ad-hoc use
//! - [`UndoLimit`] - disabled, unlimited or bounded history
//! - [`HistoryConfig`] - settings, loadable from TOML/JSON with `config`
//! - [`HistoryStats`] - counters for executed, undone, evicted, ...
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicI64, Ordering};
//! use rewind_runtime::{ActionHistory, CallbackAction};
//!
//! let total = Arc::new(AtomicI64::new(0));
//! let (up, down) = (Arc::clone(&total), Arc::clone(&total));
//! let add = CallbackAction::new("Add 5")
//!     .with_execute(move || {
//!         up.fetch_add(5, Ordering::SeqCst);
//!         Ok(())
//!     })
//!     .with_undo(move || {
//!         down.fetch_sub(5, Ordering::SeqCst);
//!         Ok(())
//!     });
//!
//! let history = ActionHistory::new();
//! history.execute_action(add).unwrap();
//! assert_eq!(total.load(Ordering::SeqCst), 5);
//!
//! assert!(history.undo().unwrap().is_done());
//! assert_eq!(total.load(Ordering::SeqCst), 0);
//! assert_eq!(history.current_redo_description().as_deref(), Some("Add 5"));
//! ```
//!
//! # Tracing
//!
//! Events use the `rewind.history` target; each accepted request runs in a
//! `history.action` span.

pub mod action;
pub mod config;
pub mod error;
pub mod history;
pub mod limit;
pub mod record;
pub mod state;
mod telemetry;

pub use action::{
    Action, ActionError, ActionFn, ActionKind, ActionResult, AsyncAction, CallbackAction,
    Operation,
};
pub use config::{ConfigError, HistoryConfig};
pub use error::HistoryError;
pub use history::{ActionHistory, Completion, PendingAction};
pub use limit::{DEFAULT_MAX_UNDO_ACTIONS, UndoLimit};
pub use record::ActionRecord;
pub use rewind_core::{BoundedCircularBuffer, Capacity, ErrorKind};
pub use state::{ExecutionMode, ExecutionState};
pub use telemetry::HistoryStats;
