#![forbid(unsafe_code)]

//! Undo/redo orchestrator.
//!
//! [`ActionHistory`] runs actions and keeps them in two bounded buffers so
//! they can be undone and redone:
//!
//! - **Undo buffer**: newest executed (or redone) action on top
//! - **Redo buffer**: newest undone action on top
//! - **Branching**: a successful execute clears the redo buffer
//! - **Single flight**: one request at a time; others get [`HistoryError::Busy`]
//!
//! ```text
//! execute(A), execute(B), execute(C)     capacity 2
//! ┌──────────────────────────────┐
//! │ Undo: [C, B]   (A evicted)   │
//! │ Redo: []                     │
//! └──────────────────────────────┘
//!
//! undo()
//! ┌──────────────────────────────┐
//! │ Undo: [B]                    │
//! │ Redo: [C]                    │
//! └──────────────────────────────┘
//! ```
//!
//! # Invariants
//!
//! 1. Buffers change only after the wrapped call returns `Ok`.
//! 2. With [`UndoLimit::Disabled`] both buffers stay empty.
//! 3. A failed or abandoned undo/redo discards the popped record.
//! 4. The buffer lock is never held across an action call or an `.await`.
//! 5. Records leaving the history are dropped after the lock is released.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use rewind_core::BoundedCircularBuffer;
use tracing::Instrument;
use web_time::Instant;

use crate::action::{Action, ActionKind, ActionResult, AsyncAction, Operation};
use crate::config::HistoryConfig;
use crate::error::HistoryError;
use crate::limit::UndoLimit;
use crate::record::ActionRecord;
use crate::state::{ExecutionGuard, ExecutionMode, ExecutionState, StateCell};
use crate::telemetry::{self, Counters, HistoryStats, TARGET};

const UNDO_BUFFER: &str = "undo";
const REDO_BUFFER: &str = "redo";

// ============================================================================
// Buffers
// ============================================================================

struct Buffers {
    undo: BoundedCircularBuffer<ActionRecord>,
    redo: BoundedCircularBuffer<ActionRecord>,
    limit: UndoLimit,
}

impl Buffers {
    fn new(limit: UndoLimit) -> Self {
        let capacity = limit.buffer_capacity().unwrap_or_default();
        Self {
            undo: BoundedCircularBuffer::new(capacity),
            redo: BoundedCircularBuffer::new(capacity),
            limit,
        }
    }
}

/// Move every record out so it can be dropped outside the lock.
fn drain(buffer: &mut BoundedCircularBuffer<ActionRecord>, out: &mut Vec<ActionRecord>) {
    out.reserve(buffer.len());
    while let Some(record) = buffer.try_pop() {
        out.push(record);
    }
}

// ============================================================================
// ActionHistory
// ============================================================================

/// Bounded undo/redo history of executed actions.
///
/// All methods take `&self`; the history is `Send + Sync` and can be shared
/// behind an `Arc`.
pub struct ActionHistory {
    buffers: Mutex<Buffers>,
    state: StateCell,
    next_seq: AtomicU64,
    counters: Counters,
}

impl fmt::Debug for ActionHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let buffers = self.lock();
        f.debug_struct("ActionHistory")
            .field("limit", &buffers.limit)
            .field("undo_len", &buffers.undo.len())
            .field("redo_len", &buffers.redo.len())
            .field("state", &self.state.load())
            .finish()
    }
}

impl Default for ActionHistory {
    fn default() -> Self {
        Self::with_limit(UndoLimit::default())
    }
}

impl ActionHistory {
    /// History keeping the default 100 actions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_limit(limit: UndoLimit) -> Self {
        Self {
            buffers: Mutex::new(Buffers::new(limit)),
            state: StateCell::new(),
            next_seq: AtomicU64::new(0),
            counters: Counters::default(),
        }
    }

    /// History from a raw `max_undo_actions` value (`-1`, `0` or positive).
    ///
    /// # Errors
    ///
    /// [`HistoryError::InvalidLimit`] for other negative values.
    pub fn with_max_undo_actions(raw: i64) -> Result<Self, HistoryError> {
        UndoLimit::from_raw(raw).map(Self::with_limit)
    }

    /// History configured from a [`HistoryConfig`].
    ///
    /// # Errors
    ///
    /// [`HistoryError::InvalidLimit`] if `max_undo_actions` is out of range.
    pub fn from_config(config: &HistoryConfig) -> Result<Self, HistoryError> {
        config.undo_limit().map(Self::with_limit)
    }

    fn lock(&self) -> MutexGuard<'_, Buffers> {
        self.buffers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(
        &self,
        request: &'static str,
        mode: ExecutionMode,
    ) -> Result<ExecutionGuard<'_>, HistoryError> {
        self.state.try_begin(mode).map_err(|ongoing| {
            telemetry::warn_rejected(request, ongoing);
            self.counters.record_rejected();
            HistoryError::Busy { ongoing }
        })
    }

    fn next_seq(&self) -> u64 {
        self.next_seq.fetch_add(1, Ordering::Relaxed)
    }

    // ========================================================================
    // Entry points
    // ========================================================================

    /// Run `action` and record it for undo.
    ///
    /// On success the redo buffer is cleared and, unless history is
    /// disabled, the action is pushed onto the undo buffer (evicting the
    /// oldest record when full). On failure nothing is recorded.
    ///
    /// Async-capable actions passed here run through their synchronous
    /// methods and are recorded as sync.
    ///
    /// # Errors
    ///
    /// [`HistoryError::Busy`] if another action is in flight, or
    /// [`HistoryError::ActionFailed`] if `execute` fails.
    pub fn execute_action<A>(&self, action: A) -> Result<(), HistoryError>
    where
        A: Action + 'static,
    {
        let _guard = self.begin(Operation::Execute.as_str(), ExecutionMode::Sync)?;
        let record = ActionRecord::new(self.next_seq(), ActionKind::Sync(Box::new(action)));
        self.run_sync(Operation::Execute, record)
    }

    /// Start `action` and return a future that completes it.
    ///
    /// The history stays busy until the returned [`PendingAction`] resolves.
    /// Bookkeeping on completion matches [`execute_action`](Self::execute_action).
    /// Dropping the future first abandons the action: nothing is recorded.
    ///
    /// # Errors
    ///
    /// [`HistoryError::Busy`] if another action is in flight. Action
    /// failures surface from the returned future.
    pub fn execute_action_async<A>(&self, action: A) -> Result<PendingAction<'_>, HistoryError>
    where
        A: AsyncAction + 'static,
    {
        let guard = self.begin(Operation::Execute.as_str(), ExecutionMode::Async)?;
        let record = ActionRecord::new(self.next_seq(), ActionKind::Async(Box::new(action)));
        Ok(self.pending(Operation::Execute, record, guard))
    }

    /// Run an already boxed action in the shape its tag selects.
    ///
    /// # Errors
    ///
    /// As [`execute_action`](Self::execute_action).
    pub fn submit(&self, action: ActionKind) -> Result<Completion<'_>, HistoryError> {
        let mode = if action.is_async() {
            ExecutionMode::Async
        } else {
            ExecutionMode::Sync
        };
        let guard = self.begin(Operation::Execute.as_str(), mode)?;
        let record = ActionRecord::new(self.next_seq(), action);
        self.start(Operation::Execute, record, guard)
    }

    /// Undo the newest recorded action.
    ///
    /// Sync records complete inline ([`Completion::Done`]); async records
    /// return [`Completion::Pending`]. On success the record moves to the
    /// redo buffer; on failure it is discarded.
    ///
    /// # Errors
    ///
    /// [`HistoryError::Busy`], [`HistoryError::NothingToUndo`], or
    /// [`HistoryError::ActionFailed`] from a sync undo.
    pub fn undo(&self) -> Result<Completion<'_>, HistoryError> {
        self.step(Operation::Undo)
    }

    /// Redo the newest undone action.
    ///
    /// # Errors
    ///
    /// [`HistoryError::Busy`], [`HistoryError::NothingToRedo`], or
    /// [`HistoryError::ActionFailed`] from a sync redo.
    pub fn redo(&self) -> Result<Completion<'_>, HistoryError> {
        self.step(Operation::Redo)
    }

    /// Drop every recorded action.
    ///
    /// # Errors
    ///
    /// [`HistoryError::Busy`] if an action is in flight.
    pub fn clear(&self) -> Result<(), HistoryError> {
        let _guard = self.begin("clear", ExecutionMode::Sync)?;
        let mut dropped = Vec::new();
        {
            let mut buffers = self.lock();
            drain(&mut buffers.undo, &mut dropped);
            drain(&mut buffers.redo, &mut dropped);
        }
        tracing::debug!(target: TARGET, dropped = dropped.len(), "history cleared");
        drop(dropped);
        Ok(())
    }

    fn step(&self, op: Operation) -> Result<Completion<'_>, HistoryError> {
        let guard = self.begin(op.as_str(), ExecutionMode::Sync)?;
        let popped = {
            let mut buffers = self.lock();
            match op {
                Operation::Redo => buffers.redo.try_pop(),
                _ => buffers.undo.try_pop(),
            }
        };
        let Some(record) = popped else {
            return Err(match op {
                Operation::Redo => HistoryError::NothingToRedo,
                _ => HistoryError::NothingToUndo,
            });
        };
        self.start(op, record, guard)
    }

    fn start<'a>(
        &'a self,
        op: Operation,
        record: ActionRecord,
        guard: ExecutionGuard<'a>,
    ) -> Result<Completion<'a>, HistoryError> {
        if record.is_async() {
            guard.set_mode(ExecutionMode::Async);
            return Ok(Completion::Pending(self.pending(op, record, guard)));
        }
        let result = self.run_sync(op, record);
        drop(guard);
        result.map(|()| Completion::Done)
    }

    fn run_sync(&self, op: Operation, mut record: ActionRecord) -> Result<(), HistoryError> {
        let seq = record.seq();
        let span = telemetry::action_span(op, seq, ExecutionMode::Sync);
        let result = {
            let _entered = span.enter();
            telemetry::record_started(op, seq, record.description_for(op), ExecutionMode::Sync);
            let start = Instant::now();
            let result = record.invoke(op);
            telemetry::record_finished(&span, op, seq, start, &result);
            result
        };
        self.finish(op, record, result)
    }

    fn pending<'a>(
        &'a self,
        op: Operation,
        mut record: ActionRecord,
        guard: ExecutionGuard<'a>,
    ) -> PendingAction<'a> {
        let seq = record.seq();
        let span = telemetry::action_span(op, seq, ExecutionMode::Async);
        span.in_scope(|| {
            telemetry::record_started(op, seq, record.description_for(op), ExecutionMode::Async);
        });
        let completion_span = span.clone();
        let in_flight = InFlight {
            history: self,
            op,
            seq,
            completed: false,
            _guard: guard,
        };

        let inner = async move {
            let start = Instant::now();
            let result = record.invoke_async(op).await;
            telemetry::record_finished(&completion_span, op, seq, start, &result);
            let outcome = self.finish(op, record, result);
            in_flight.complete();
            outcome
        }
        .instrument(span)
        .boxed();

        PendingAction {
            operation: op,
            seq,
            inner,
        }
    }

    /// Bookkeeping after the wrapped call returned.
    fn finish(&self, op: Operation, mut record: ActionRecord, result: ActionResult) -> Result<(), HistoryError> {
        match result {
            Ok(()) => {
                self.counters.record_success(op);
                record.refresh_descriptions();
                let dropped = self.commit(op, record);
                drop(dropped);
                Ok(())
            }
            Err(source) => {
                self.counters.record_failure();
                Err(HistoryError::ActionFailed {
                    operation: op,
                    source,
                })
            }
        }
    }

    /// Push `record` where `op` sends it. Returns records to drop unlocked.
    fn commit(&self, op: Operation, record: ActionRecord) -> Vec<ActionRecord> {
        let mut dropped = Vec::new();
        let mut buffers = self.lock();
        if buffers.limit.is_disabled() {
            dropped.push(record);
            return dropped;
        }

        let (target, name) = match op {
            Operation::Execute => {
                drain(&mut buffers.redo, &mut dropped);
                (&mut buffers.undo, UNDO_BUFFER)
            }
            Operation::Undo => (&mut buffers.redo, REDO_BUFFER),
            Operation::Redo => (&mut buffers.undo, UNDO_BUFFER),
        };
        if let Some(evicted) = target.push(record) {
            telemetry::trace_evicted(name, evicted.seq());
            self.counters.record_evicted(1);
            dropped.push(evicted);
        }
        dropped
    }

    // ========================================================================
    // Limit
    // ========================================================================

    /// Raw `max_undo_actions`: `-1` unlimited, `0` disabled, else the bound.
    #[must_use]
    pub fn max_undo_actions(&self) -> i64 {
        self.undo_limit().as_raw()
    }

    #[must_use]
    pub fn undo_limit(&self) -> UndoLimit {
        self.lock().limit
    }

    /// Change the limit, resizing both buffers.
    ///
    /// Shrinking evicts the oldest records. Switching into or out of
    /// [`UndoLimit::Disabled`] clears both buffers.
    pub fn set_undo_limit(&self, limit: UndoLimit) {
        let mut dropped = Vec::new();
        {
            let mut guard = self.lock();
            let buffers = &mut *guard;
            let from = buffers.limit;
            if from == limit {
                return;
            }
            if from.is_disabled() || limit.is_disabled() {
                drain(&mut buffers.undo, &mut dropped);
                drain(&mut buffers.redo, &mut dropped);
            }
            if let Some(capacity) = limit.buffer_capacity() {
                for (name, buffer) in [
                    (UNDO_BUFFER, &mut buffers.undo),
                    (REDO_BUFFER, &mut buffers.redo),
                ] {
                    let evicted = buffer.set_capacity(capacity);
                    self.counters.record_evicted(evicted.len());
                    for record in &evicted {
                        telemetry::trace_evicted(name, record.seq());
                    }
                    dropped.extend(evicted);
                }
            }
            buffers.limit = limit;
            tracing::info!(target: TARGET, from = %from, to = %limit, "undo limit changed");
        }
        drop(dropped);
    }

    /// Change the limit from a raw `max_undo_actions` value.
    ///
    /// # Errors
    ///
    /// [`HistoryError::InvalidLimit`] for out-of-range values; the current
    /// limit is kept.
    pub fn set_max_undo_actions(&self, raw: i64) -> Result<(), HistoryError> {
        let limit = UndoLimit::from_raw(raw)?;
        self.set_undo_limit(limit);
        Ok(())
    }

    #[must_use]
    pub fn is_undo_redo_actions_disabled(&self) -> bool {
        self.undo_limit().is_disabled()
    }

    #[must_use]
    pub fn is_unlimited_undo_redo_actions(&self) -> bool {
        self.undo_limit().is_unlimited()
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Undo label of the action `undo` would revert.
    #[must_use]
    pub fn current_undo_description(&self) -> Option<String> {
        let buffers = self.lock();
        if buffers.limit.is_disabled() {
            return None;
        }
        buffers.undo.try_peek().map(|r| r.undo_description().to_owned())
    }

    /// Redo label of the action `redo` would reapply.
    #[must_use]
    pub fn current_redo_description(&self) -> Option<String> {
        let buffers = self.lock();
        if buffers.limit.is_disabled() {
            return None;
        }
        buffers.redo.try_peek().map(|r| r.redo_description().to_owned())
    }

    /// Whether the next undo runs asynchronously; `None` when empty.
    #[must_use]
    pub fn is_pending_undo_action_async(&self) -> Option<bool> {
        self.lock().undo.try_peek().map(ActionRecord::is_async)
    }

    /// Whether the next redo runs asynchronously; `None` when empty.
    #[must_use]
    pub fn is_pending_redo_action_async(&self) -> Option<bool> {
        self.lock().redo.try_peek().map(ActionRecord::is_async)
    }

    /// Undo labels, newest first, at most `limit` of them.
    #[must_use]
    pub fn undo_descriptions(&self, limit: usize) -> Vec<String> {
        self.lock()
            .undo
            .iter()
            .take(limit)
            .map(|r| r.undo_description().to_owned())
            .collect()
    }

    /// Redo labels, newest first, at most `limit` of them.
    #[must_use]
    pub fn redo_descriptions(&self, limit: usize) -> Vec<String> {
        self.lock()
            .redo
            .iter()
            .take(limit)
            .map(|r| r.redo_description().to_owned())
            .collect()
    }

    #[must_use]
    pub fn undo_buffer_count(&self) -> usize {
        self.lock().undo.len()
    }

    #[must_use]
    pub fn redo_buffer_count(&self) -> usize {
        self.lock().redo.len()
    }

    #[must_use]
    pub fn is_undo_buffer_empty(&self) -> bool {
        self.lock().undo.is_empty()
    }

    #[must_use]
    pub fn is_redo_buffer_empty(&self) -> bool {
        self.lock().redo.is_empty()
    }

    /// Whether `undo` would be accepted right now.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.is_action_executing() && !self.is_undo_buffer_empty()
    }

    /// Whether `redo` would be accepted right now.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.is_action_executing() && !self.is_redo_buffer_empty()
    }

    #[must_use]
    pub fn execution_state(&self) -> ExecutionState {
        self.state.load()
    }

    /// True while any request is in flight.
    #[must_use]
    pub fn is_action_executing(&self) -> bool {
        self.state.load().is_executing()
    }

    /// True while a [`PendingAction`] is unresolved.
    #[must_use]
    pub fn is_async_action_ongoing(&self) -> bool {
        self.state.load().is_async()
    }

    #[must_use]
    pub fn stats(&self) -> HistoryStats {
        self.counters.snapshot()
    }
}

// ============================================================================
// Pending work
// ============================================================================

/// Keeps the history busy for the lifetime of an async call.
struct InFlight<'a> {
    history: &'a ActionHistory,
    op: Operation,
    seq: u64,
    completed: bool,
    _guard: ExecutionGuard<'a>,
}

impl InFlight<'_> {
    fn complete(mut self) {
        self.completed = true;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.completed {
            telemetry::warn_abandoned(self.op, self.seq);
            self.history.counters.record_abandoned();
        }
    }
}

/// Unresolved async execute, undo or redo.
///
/// Await it (or poll it on any executor) to finish the call. The history
/// stays busy until it resolves or is dropped.
#[must_use = "dropping a PendingAction abandons the action"]
pub struct PendingAction<'a> {
    operation: Operation,
    seq: u64,
    inner: BoxFuture<'a, Result<(), HistoryError>>,
}

impl PendingAction<'_> {
    #[must_use]
    pub fn operation(&self) -> Operation {
        self.operation
    }

    #[must_use]
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

impl Future for PendingAction<'_> {
    type Output = Result<(), HistoryError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.poll_unpin(cx)
    }
}

impl fmt::Debug for PendingAction<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingAction")
            .field("operation", &self.operation)
            .field("seq", &self.seq)
            .finish_non_exhaustive()
    }
}

/// Outcome of an accepted undo, redo or submit.
#[must_use = "a pending completion must be awaited"]
#[derive(Debug)]
pub enum Completion<'a> {
    /// Finished inline.
    Done,
    /// Async call still running.
    Pending(PendingAction<'a>),
}

impl<'a> Completion<'a> {
    #[must_use]
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }

    #[must_use]
    pub fn into_pending(self) -> Option<PendingAction<'a>> {
        match self {
            Self::Done => None,
            Self::Pending(pending) => Some(pending),
        }
    }

    /// Wait for the call to finish, whichever shape it took.
    pub async fn wait(self) -> Result<(), HistoryError> {
        match self {
            Self::Done => Ok(()),
            Self::Pending(pending) => pending.await,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
