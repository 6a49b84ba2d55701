#![forbid(unsafe_code)]

//! History observability: tracing spans and per-history counters.
//!
//! - **Spans**: every accepted request runs inside a `history.action` debug
//!   span with `operation`, `seq`, `mode`, and (on completion) `duration_us`
//!   and `result`.
//! - **Counters**: monotonic per-history totals exposed as a
//!   [`HistoryStats`] snapshot.
//!
//! All events use the `rewind.history` target.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::Span;
use web_time::Instant;

use crate::action::{ActionResult, Operation};
use crate::state::ExecutionMode;

pub(crate) const TARGET: &str = "rewind.history";

/// Snapshot of a history's monotonic counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HistoryStats {
    /// Successful `execute` calls (sync and async).
    pub executed: u64,
    /// Successful `undo` calls.
    pub undone: u64,
    /// Successful `redo` calls.
    pub redone: u64,
    /// Action calls that reported failure.
    pub failed: u64,
    /// Records dropped by capacity eviction.
    pub evicted: u64,
    /// Pending actions dropped before they resolved.
    pub abandoned: u64,
    /// Requests turned away while busy.
    pub rejected: u64,
}

#[derive(Debug, Default)]
pub(crate) struct Counters {
    executed: AtomicU64,
    undone: AtomicU64,
    redone: AtomicU64,
    failed: AtomicU64,
    evicted: AtomicU64,
    abandoned: AtomicU64,
    rejected: AtomicU64,
}

impl Counters {
    pub(crate) fn record_success(&self, op: Operation) {
        let counter = match op {
            Operation::Execute => &self.executed,
            Operation::Undo => &self.undone,
            Operation::Redo => &self.redone,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failure(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_evicted(&self, count: usize) {
        if count > 0 {
            self.evicted.fetch_add(count as u64, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_abandoned(&self) {
        self.abandoned.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> HistoryStats {
        HistoryStats {
            executed: self.executed.load(Ordering::Relaxed),
            undone: self.undone.load(Ordering::Relaxed),
            redone: self.redone.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            evicted: self.evicted.load(Ordering::Relaxed),
            abandoned: self.abandoned.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
        }
    }
}

/// Span wrapping one accepted request.
pub(crate) fn action_span(op: Operation, seq: u64, mode: ExecutionMode) -> Span {
    tracing::debug_span!(
        target: TARGET,
        "history.action",
        operation = %op,
        seq = seq,
        mode = %mode,
        duration_us = tracing::field::Empty,
        result = tracing::field::Empty,
    )
}

/// Log acceptance of a request.
pub(crate) fn record_started(op: Operation, seq: u64, description: &str, mode: ExecutionMode) {
    tracing::debug!(
        target: TARGET,
        operation = %op,
        seq = seq,
        description = %description,
        mode = %mode,
        "action started"
    );
}

/// Fill in the span's completion fields and log the outcome.
pub(crate) fn record_finished(span: &Span, op: Operation, seq: u64, start: Instant, result: &ActionResult) {
    let duration_us = start.elapsed().as_micros() as u64;
    let outcome = if result.is_ok() { "ok" } else { "error" };
    span.record("duration_us", duration_us);
    span.record("result", outcome);

    match result {
        Ok(()) => tracing::debug!(
            target: TARGET,
            operation = %op,
            seq = seq,
            duration_us = duration_us,
            "action completed"
        ),
        Err(err) => tracing::debug!(
            target: TARGET,
            operation = %op,
            seq = seq,
            duration_us = duration_us,
            error = %err,
            "action failed"
        ),
    }
}

pub(crate) fn warn_rejected(request: &'static str, ongoing: ExecutionMode) {
    tracing::warn!(
        target: TARGET,
        operation = request,
        ongoing = %ongoing,
        "request rejected while an action is executing"
    );
}

pub(crate) fn warn_abandoned(op: Operation, seq: u64) {
    tracing::warn!(
        target: TARGET,
        operation = %op,
        seq = seq,
        "pending action dropped before completion; nothing recorded"
    );
}

pub(crate) fn trace_evicted(buffer: &'static str, seq: u64) {
    tracing::trace!(target: TARGET, buffer = buffer, seq = seq, "record evicted");
}
