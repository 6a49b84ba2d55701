#![forbid(unsafe_code)]

//! Stored handle for one executed action.

use std::fmt;

use futures_util::FutureExt;
use futures_util::future::{self, BoxFuture};

use crate::action::{ActionKind, ActionResult, Operation};

/// One action held in the undo or redo buffer, with its descriptions cached.
pub struct ActionRecord {
    seq: u64,
    kind: ActionKind,
    description: String,
    undo_description: String,
    redo_description: String,
}

impl ActionRecord {
    pub(crate) fn new(seq: u64, kind: ActionKind) -> Self {
        let mut record = Self {
            seq,
            kind,
            description: String::new(),
            undo_description: String::new(),
            redo_description: String::new(),
        };
        record.refresh_descriptions();
        record
    }

    /// Re-read the descriptions from the wrapped action.
    pub(crate) fn refresh_descriptions(&mut self) {
        self.description = self.kind.description().to_owned();
        self.undo_description = self.kind.undo_description().to_owned();
        self.redo_description = self.kind.redo_description().to_owned();
    }

    /// Sequence number assigned by the owning history.
    #[must_use]
    pub fn seq(&self) -> u64 {
        self.seq
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn undo_description(&self) -> &str {
        &self.undo_description
    }

    #[must_use]
    pub fn redo_description(&self) -> &str {
        &self.redo_description
    }

    /// Label matching the call about to run.
    pub(crate) fn description_for(&self, op: Operation) -> &str {
        match op {
            Operation::Execute => &self.description,
            Operation::Undo => &self.undo_description,
            Operation::Redo => &self.redo_description,
        }
    }

    /// Whether undo/redo run through the awaitable entry points.
    #[must_use]
    pub fn is_async(&self) -> bool {
        self.kind.is_async()
    }

    /// Run `op` synchronously.
    pub(crate) fn invoke(&mut self, op: Operation) -> ActionResult {
        match &mut self.kind {
            ActionKind::Sync(action) => op.apply(action.as_mut()),
            ActionKind::Async(action) => op.apply(action.as_mut()),
        }
    }

    /// Run `op` through the awaitable entry point; sync actions resolve
    /// immediately.
    pub(crate) fn invoke_async(&mut self, op: Operation) -> BoxFuture<'_, ActionResult> {
        match &mut self.kind {
            ActionKind::Async(action) => op.apply_async(action.as_mut()),
            ActionKind::Sync(action) => future::ready(op.apply(action.as_mut())).boxed(),
        }
    }
}

impl fmt::Debug for ActionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionRecord")
            .field("seq", &self.seq)
            .field("description", &self.description)
            .field("is_async", &self.is_async())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::CallbackAction;

    #[test]
    fn caches_descriptions() {
        let record = ActionRecord::new(
            7,
            ActionKind::Sync(Box::new(
                CallbackAction::new("Paint")
                    .with_undo_description("Undo paint")
                    .with_redo_description("Redo paint"),
            )),
        );
        assert_eq!(record.seq(), 7);
        assert_eq!(record.description(), "Paint");
        assert_eq!(record.undo_description(), "Undo paint");
        assert_eq!(record.redo_description(), "Redo paint");
        assert!(!record.is_async());
    }

    #[test]
    fn sync_invoke_async_resolves_immediately() {
        let mut record = ActionRecord::new(
            1,
            ActionKind::Sync(Box::new(CallbackAction::new("Noop").with_execute(|| Ok(())))),
        );
        let result = record.invoke_async(Operation::Execute).now_or_never();
        assert!(matches!(result, Some(Ok(()))));
    }
}
