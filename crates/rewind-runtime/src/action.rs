#![forbid(unsafe_code)]

//! Action capability consumed by [`ActionHistory`](crate::ActionHistory).
//!
//! Callers implement [`Action`] (synchronous) or [`AsyncAction`]
//! (synchronous plus awaitable forms). The history stores them as the tagged
//! variant [`ActionKind`] and dispatches on the tag, never on a runtime type
//! test.
//!
//! # Invariants
//!
//! - `execute()` followed by `undo()` restores prior state
//! - `undo()` followed by `redo()` restores the executed state
//! - descriptions are cheap to read and do not mutate the action
//!
//! # Failure Modes
//!
//! An action reports failure with [`ActionError`]. The history surfaces it
//! as [`HistoryError::ActionFailed`](crate::HistoryError::ActionFailed) and
//! records nothing for the failed call.

use std::error::Error as StdError;
use std::fmt;

use futures_util::future::BoxFuture;

/// Result of an action call.
pub type ActionResult = Result<(), ActionError>;

/// Failure reported by an action.
#[derive(Debug)]
pub struct ActionError {
    message: String,
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl ActionError {
    /// Failure with a message only.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap an underlying error; its `Display` becomes the message.
    #[must_use]
    pub fn from_source<E>(source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl StdError for ActionError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn StdError + 'static))
    }
}

impl From<String> for ActionError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for ActionError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Which action entry point a history call drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Execute,
    Undo,
    Redo,
}

impl Operation {
    /// Stable label for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Execute => "execute",
            Self::Undo => "undo",
            Self::Redo => "redo",
        }
    }

    pub(crate) fn apply<A: Action + ?Sized>(self, action: &mut A) -> ActionResult {
        match self {
            Self::Execute => action.execute(),
            Self::Undo => action.undo(),
            Self::Redo => action.redo(),
        }
    }

    pub(crate) fn apply_async<A: AsyncAction + ?Sized>(
        self,
        action: &mut A,
    ) -> BoxFuture<'_, ActionResult> {
        match self {
            Self::Execute => action.execute_async(),
            Self::Undo => action.undo_async(),
            Self::Redo => action.redo_async(),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reversible user action.
pub trait Action: Send {
    /// Human-readable description (e.g. "Resize image").
    fn description(&self) -> &str;

    /// Label for an undo menu entry.
    fn undo_description(&self) -> &str {
        self.description()
    }

    /// Label for a redo menu entry.
    fn redo_description(&self) -> &str {
        self.description()
    }

    /// Apply the action's effect.
    fn execute(&mut self) -> ActionResult;

    /// Revert the action's effect.
    fn undo(&mut self) -> ActionResult;

    /// Re-apply after an undo.
    fn redo(&mut self) -> ActionResult {
        self.execute()
    }
}

/// An action whose operations can run as long-lived futures.
///
/// The history awaits these futures without blocking the calling thread and
/// rejects every other request until they resolve.
pub trait AsyncAction: Action {
    fn execute_async(&mut self) -> BoxFuture<'_, ActionResult>;

    fn undo_async(&mut self) -> BoxFuture<'_, ActionResult>;

    fn redo_async(&mut self) -> BoxFuture<'_, ActionResult> {
        self.execute_async()
    }
}

/// Tagged action shape stored by the history.
pub enum ActionKind {
    Sync(Box<dyn Action>),
    Async(Box<dyn AsyncAction>),
}

impl ActionKind {
    #[must_use]
    pub fn is_async(&self) -> bool {
        matches!(self, Self::Async(_))
    }

    #[must_use]
    pub fn description(&self) -> &str {
        match self {
            Self::Sync(action) => action.description(),
            Self::Async(action) => action.description(),
        }
    }

    #[must_use]
    pub fn undo_description(&self) -> &str {
        match self {
            Self::Sync(action) => action.undo_description(),
            Self::Async(action) => action.undo_description(),
        }
    }

    #[must_use]
    pub fn redo_description(&self) -> &str {
        match self {
            Self::Sync(action) => action.redo_description(),
            Self::Async(action) => action.redo_description(),
        }
    }
}

impl fmt::Debug for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = if self.is_async() { "Async" } else { "Sync" };
        f.debug_tuple(name).field(&self.description()).finish()
    }
}

// ============================================================================
// Closure-backed action
// ============================================================================

/// Callback type for action operations.
pub type ActionFn = Box<dyn FnMut() -> ActionResult + Send>;

/// Action whose operations are supplied as closures.
///
/// Missing callbacks fail with an [`ActionError`]; a missing redo callback
/// falls back to the execute callback.
pub struct CallbackAction {
    description: String,
    undo_description: Option<String>,
    redo_description: Option<String>,
    execute: Option<ActionFn>,
    undo: Option<ActionFn>,
    redo: Option<ActionFn>,
}

impl fmt::Debug for CallbackAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackAction")
            .field("description", &self.description)
            .field("undo_description", &self.undo_description)
            .field("redo_description", &self.redo_description)
            .field("has_execute", &self.execute.is_some())
            .field("has_undo", &self.undo.is_some())
            .field("has_redo", &self.redo.is_some())
            .finish()
    }
}

impl CallbackAction {
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            undo_description: None,
            redo_description: None,
            execute: None,
            undo: None,
            redo: None,
        }
    }

    /// Override the undo menu label.
    #[must_use]
    pub fn with_undo_description(mut self, label: impl Into<String>) -> Self {
        self.undo_description = Some(label.into());
        self
    }

    /// Override the redo menu label.
    #[must_use]
    pub fn with_redo_description(mut self, label: impl Into<String>) -> Self {
        self.redo_description = Some(label.into());
        self
    }

    /// Set the execute callback.
    #[must_use]
    pub fn with_execute<F>(mut self, f: F) -> Self
    where
        F: FnMut() -> ActionResult + Send + 'static,
    {
        self.execute = Some(Box::new(f));
        self
    }

    /// Set the undo callback.
    #[must_use]
    pub fn with_undo<F>(mut self, f: F) -> Self
    where
        F: FnMut() -> ActionResult + Send + 'static,
    {
        self.undo = Some(Box::new(f));
        self
    }

    /// Set the redo callback.
    #[must_use]
    pub fn with_redo<F>(mut self, f: F) -> Self
    where
        F: FnMut() -> ActionResult + Send + 'static,
    {
        self.redo = Some(Box::new(f));
        self
    }
}

impl Action for CallbackAction {
    fn description(&self) -> &str {
        &self.description
    }

    fn undo_description(&self) -> &str {
        self.undo_description.as_deref().unwrap_or(&self.description)
    }

    fn redo_description(&self) -> &str {
        self.redo_description.as_deref().unwrap_or(&self.description)
    }

    fn execute(&mut self) -> ActionResult {
        match self.execute.as_mut() {
            Some(f) => f(),
            None => Err(ActionError::new("no execute callback set")),
        }
    }

    fn undo(&mut self) -> ActionResult {
        match self.undo.as_mut() {
            Some(f) => f(),
            None => Err(ActionError::new("no undo callback set")),
        }
    }

    fn redo(&mut self) -> ActionResult {
        match self.redo.as_mut() {
            Some(f) => f(),
            None => self.execute(),
        }
    }
}
