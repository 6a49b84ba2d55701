#![forbid(unsafe_code)]

//! Idle/Executing state cell.
//!
//! The history accepts one request at a time. Acceptance is a single
//! compare-and-swap from `Idle`, so two near-simultaneous callers can never
//! both observe `Idle` and proceed. The winner holds an [`ExecutionGuard`];
//! dropping it is the only way back to `Idle`.
//!
//! ```text
//!            try_begin (CAS)
//!   Idle ──────────────────────► Executing(mode)
//!    ▲                               │
//!    └──────── guard dropped ────────┘
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

const IDLE: u8 = 0;
const EXECUTING_SYNC: u8 = 1;
const EXECUTING_ASYNC: u8 = 2;

/// How the in-flight call runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutionMode {
    /// Runs to completion inside the history call.
    Sync,
    /// Runs as a future the caller awaits.
    Async,
}

impl ExecutionMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sync => "sync",
            Self::Async => "async",
        }
    }

    const fn code(self) -> u8 {
        match self {
            Self::Sync => EXECUTING_SYNC,
            Self::Async => EXECUTING_ASYNC,
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Observable state of the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExecutionState {
    #[default]
    Idle,
    Executing(ExecutionMode),
}

impl ExecutionState {
    #[must_use]
    pub const fn is_executing(self) -> bool {
        matches!(self, Self::Executing(_))
    }

    #[must_use]
    pub const fn is_async(self) -> bool {
        matches!(self, Self::Executing(ExecutionMode::Async))
    }

    fn decode(code: u8) -> Self {
        match code {
            IDLE => Self::Idle,
            EXECUTING_ASYNC => Self::Executing(ExecutionMode::Async),
            _ => Self::Executing(ExecutionMode::Sync),
        }
    }
}

/// Atomic holder of the [`ExecutionState`].
#[derive(Debug, Default)]
pub(crate) struct StateCell(AtomicU8);

impl StateCell {
    pub(crate) const fn new() -> Self {
        Self(AtomicU8::new(IDLE))
    }

    pub(crate) fn load(&self) -> ExecutionState {
        ExecutionState::decode(self.0.load(Ordering::Acquire))
    }

    /// Transition `Idle -> Executing(mode)`.
    ///
    /// On failure returns the mode of the call already in flight.
    pub(crate) fn try_begin(&self, mode: ExecutionMode) -> Result<ExecutionGuard<'_>, ExecutionMode> {
        match self
            .0
            .compare_exchange(IDLE, mode.code(), Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => Ok(ExecutionGuard { cell: self }),
            Err(current) => match ExecutionState::decode(current) {
                ExecutionState::Executing(ongoing) => Err(ongoing),
                ExecutionState::Idle => Err(ExecutionMode::Sync),
            },
        }
    }
}

/// Proof of holding the `Executing` state. Returns the cell to `Idle` on drop.
#[derive(Debug)]
pub(crate) struct ExecutionGuard<'a> {
    cell: &'a StateCell,
}

impl ExecutionGuard<'_> {
    /// Re-tag the in-flight call once its shape is known.
    pub(crate) fn set_mode(&self, mode: ExecutionMode) {
        self.cell.0.store(mode.code(), Ordering::Release);
    }
}

impl Drop for ExecutionGuard<'_> {
    fn drop(&mut self) {
        self.cell.0.store(IDLE, Ordering::Release);
    }
}
