#![forbid(unsafe_code)]

//! Property tests for [`ActionHistory`] invariants.
//!
//! Validates:
//! - Random execute/undo/redo/resize sequences match a two-stack model.
//! - Buffer counts never exceed the configured limit.
//! - Failed actions leave both buffers untouched and the history idle.
//! - A disabled history never records anything.
//! - Undoing everything restores the initial state.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use proptest::prelude::*;

use rewind_runtime::{ActionHistory, CallbackAction, HistoryError, UndoLimit};

// ============================================================================
// Strategy helpers
// ============================================================================

#[derive(Debug, Clone)]
enum Op {
    Execute(i64),
    FailingExecute,
    Undo,
    Redo,
    SetLimit(i64),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (-50i64..50).prop_map(Op::Execute),
        1 => Just(Op::FailingExecute),
        3 => Just(Op::Undo),
        2 => Just(Op::Redo),
        1 => prop_oneof![Just(-1i64), Just(0i64), 1i64..8].prop_map(Op::SetLimit),
    ]
}

fn ops_strategy(max_len: usize) -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(op_strategy(), 1..=max_len)
}

fn adder(total: &Arc<AtomicI64>, delta: i64) -> CallbackAction {
    let on_execute = Arc::clone(total);
    let on_undo = Arc::clone(total);
    CallbackAction::new(delta.to_string())
        .with_execute(move || {
            on_execute.fetch_add(delta, Ordering::SeqCst);
            Ok(())
        })
        .with_undo(move || {
            on_undo.fetch_sub(delta, Ordering::SeqCst);
            Ok(())
        })
}

// ============================================================================
// Model
// ============================================================================

/// Newest-last stacks of action labels.
#[derive(Debug, Default)]
struct Model {
    undo: Vec<String>,
    redo: Vec<String>,
    limit: Option<UndoLimit>,
}

impl Model {
    fn limit(&self) -> UndoLimit {
        self.limit.unwrap_or_default()
    }

    fn push(stack: &mut Vec<String>, limit: UndoLimit, label: String) {
        match limit {
            UndoLimit::Disabled => {}
            UndoLimit::Unlimited => stack.push(label),
            UndoLimit::Bounded(n) => {
                stack.push(label);
                if stack.len() > n.get() {
                    stack.remove(0);
                }
            }
        }
    }

    fn truncate(stack: &mut Vec<String>, limit: UndoLimit) {
        if let UndoLimit::Bounded(n) = limit {
            let excess = stack.len().saturating_sub(n.get());
            stack.drain(..excess);
        }
    }

    fn execute(&mut self, label: String) {
        self.redo.clear();
        let limit = self.limit();
        Self::push(&mut self.undo, limit, label);
    }

    fn undo(&mut self) -> bool {
        let Some(label) = self.undo.pop() else {
            return false;
        };
        let limit = self.limit();
        Self::push(&mut self.redo, limit, label);
        true
    }

    fn redo(&mut self) -> bool {
        let Some(label) = self.redo.pop() else {
            return false;
        };
        let limit = self.limit();
        Self::push(&mut self.undo, limit, label);
        true
    }

    fn set_limit(&mut self, limit: UndoLimit) {
        let from = self.limit();
        if from == limit {
            return;
        }
        if from.is_disabled() || limit.is_disabled() {
            self.undo.clear();
            self.redo.clear();
        }
        Self::truncate(&mut self.undo, limit);
        Self::truncate(&mut self.redo, limit);
        self.limit = Some(limit);
    }

    fn newest_first(stack: &[String]) -> Vec<String> {
        stack.iter().rev().cloned().collect()
    }
}

// ============================================================================
// Invariant 1: history matches the two-stack model
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn history_matches_model(ops in ops_strategy(80)) {
        let total = Arc::new(AtomicI64::new(0));
        let history = ActionHistory::new();
        let mut model = Model::default();

        for op in ops {
            match op {
                Op::Execute(delta) => {
                    history.execute_action(adder(&total, delta)).unwrap();
                    model.execute(delta.to_string());
                }
                Op::FailingExecute => {
                    let failing = CallbackAction::new("fail").with_execute(|| Err("no".into()));
                    let err = history.execute_action(failing).unwrap_err();
                    let is_failure = matches!(err, HistoryError::ActionFailed { .. });
                    prop_assert!(is_failure);
                }
                Op::Undo => {
                    let expected = model.undo();
                    match history.undo() {
                        Ok(done) => {
                            prop_assert!(expected);
                            prop_assert!(done.is_done());
                        }
                        Err(err) => {
                            prop_assert!(!expected);
                            let is_empty = matches!(err, HistoryError::NothingToUndo);
                            prop_assert!(is_empty);
                        }
                    }
                }
                Op::Redo => {
                    let expected = model.redo();
                    match history.redo() {
                        Ok(done) => {
                            prop_assert!(expected);
                            prop_assert!(done.is_done());
                        }
                        Err(err) => {
                            prop_assert!(!expected);
                            let is_empty = matches!(err, HistoryError::NothingToRedo);
                            prop_assert!(is_empty);
                        }
                    }
                }
                Op::SetLimit(raw) => {
                    history.set_max_undo_actions(raw).unwrap();
                    model.set_limit(UndoLimit::from_raw(raw).unwrap());
                }
            }

            prop_assert!(!history.is_action_executing());
            prop_assert_eq!(history.undo_descriptions(usize::MAX), Model::newest_first(&model.undo));
            prop_assert_eq!(history.redo_descriptions(usize::MAX), Model::newest_first(&model.redo));
            if let UndoLimit::Bounded(n) = history.undo_limit() {
                prop_assert!(history.undo_buffer_count() <= n.get());
                prop_assert!(history.redo_buffer_count() <= n.get());
            }
        }
    }
}

// ============================================================================
// Invariant 2: undoing everything restores the initial state
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn undo_all_restores_initial_total(deltas in prop::collection::vec(-100i64..100, 1..60)) {
        let total = Arc::new(AtomicI64::new(0));
        let history = ActionHistory::with_limit(UndoLimit::Unlimited);

        for delta in &deltas {
            history.execute_action(adder(&total, *delta)).unwrap();
        }
        prop_assert_eq!(total.load(Ordering::SeqCst), deltas.iter().sum::<i64>());

        while history.can_undo() {
            prop_assert!(history.undo().unwrap().is_done());
        }
        prop_assert_eq!(total.load(Ordering::SeqCst), 0);
        prop_assert_eq!(history.redo_buffer_count(), deltas.len());

        while history.can_redo() {
            prop_assert!(history.redo().unwrap().is_done());
        }
        prop_assert_eq!(total.load(Ordering::SeqCst), deltas.iter().sum::<i64>());
    }
}

// ============================================================================
// Invariant 3: a disabled history never records
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn disabled_history_never_records(deltas in prop::collection::vec(-10i64..10, 0..40)) {
        let total = Arc::new(AtomicI64::new(0));
        let history = ActionHistory::with_limit(UndoLimit::Disabled);

        for delta in &deltas {
            history.execute_action(adder(&total, *delta)).unwrap();
            prop_assert_eq!(history.undo_buffer_count(), 0);
            prop_assert_eq!(history.redo_buffer_count(), 0);
            prop_assert!(history.current_undo_description().is_none());
        }
        prop_assert_eq!(total.load(Ordering::SeqCst), deltas.iter().sum::<i64>());
        prop_assert_eq!(history.stats().executed, deltas.len() as u64);
    }
}

// ============================================================================
// Invariant 4: bounded history keeps the most recent actions
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn bounded_history_keeps_most_recent(limit in 1usize..10, count in 0usize..40) {
        let total = Arc::new(AtomicI64::new(0));
        let history = ActionHistory::with_limit(UndoLimit::bounded(limit));

        for i in 0..count {
            history.execute_action(adder(&total, i as i64)).unwrap();
        }

        let expected: Vec<String> = (0..count).rev().take(limit).map(|i| i.to_string()).collect();
        prop_assert_eq!(history.undo_descriptions(usize::MAX), expected);
        prop_assert_eq!(history.stats().evicted, count.saturating_sub(limit) as u64);
    }
}
