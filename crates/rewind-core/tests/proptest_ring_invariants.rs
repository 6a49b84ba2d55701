#![forbid(unsafe_code)]

//! Property tests for [`BoundedCircularBuffer`] invariants.
//!
//! Validates:
//! - The ring behaves exactly like a `VecDeque` model under random operations.
//! - Structural invariants (closed ring, link agreement, no leaked slots) hold
//!   after every operation.
//! - `len == min(pushes, capacity)` and contents are the most recent pushes.
//! - Any mutation invalidates an open cursor.

use std::collections::VecDeque;

use proptest::prelude::*;
use rewind_core::{BoundedCircularBuffer, BufferError, Capacity};

// ============================================================================
// Strategy helpers
// ============================================================================

#[derive(Debug, Clone)]
enum Op {
    Push(i32),
    PushRange(Vec<i32>),
    Pop,
    SetCapacity(usize),
    Clear,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        5 => any::<i32>().prop_map(Op::Push),
        2 => prop::collection::vec(any::<i32>(), 0..12).prop_map(Op::PushRange),
        3 => Just(Op::Pop),
        1 => (0usize..10).prop_map(Op::SetCapacity),
        1 => Just(Op::Clear),
    ]
}

/// Reference model: front is newest.
struct Model {
    items: VecDeque<i32>,
    limit: Option<usize>,
}

impl Model {
    fn trim(&mut self) {
        if let Some(limit) = self.limit {
            self.items.truncate(limit);
        }
    }

    fn apply(&mut self, op: &Op) -> Option<i32> {
        match op {
            Op::Push(v) => {
                self.items.push_front(*v);
                self.trim();
                None
            }
            Op::PushRange(values) => {
                for v in values {
                    self.items.push_front(*v);
                }
                self.trim();
                None
            }
            Op::Pop => self.items.pop_front(),
            Op::SetCapacity(raw) => {
                self.limit = Capacity::new(*raw).limit();
                self.trim();
                None
            }
            Op::Clear => {
                self.items.clear();
                None
            }
        }
    }
}

fn apply(buf: &mut BoundedCircularBuffer<i32>, op: &Op) -> Option<i32> {
    match op {
        Op::Push(v) => {
            buf.push(*v);
            None
        }
        Op::PushRange(values) => {
            buf.push_range(values.iter().copied());
            None
        }
        Op::Pop => buf.try_pop(),
        Op::SetCapacity(raw) => {
            buf.set_capacity(Capacity::new(*raw));
            None
        }
        Op::Clear => {
            buf.clear();
            None
        }
    }
}

// ============================================================================
// Invariant 1: matches the VecDeque model
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn matches_model_under_random_ops(
        initial in 0usize..8,
        ops in prop::collection::vec(op_strategy(), 1..120)
    ) {
        let mut buf = BoundedCircularBuffer::new(Capacity::new(initial));
        let mut model = Model { items: VecDeque::new(), limit: Capacity::new(initial).limit() };

        for op in &ops {
            let got = apply(&mut buf, op);
            let expected = model.apply(op);
            prop_assert_eq!(got, expected, "pop mismatch after {:?}", op);
            buf.debug_validate_invariants();
            prop_assert_eq!(buf.len(), model.items.len());
            prop_assert_eq!(buf.to_vec(), model.items.iter().copied().collect::<Vec<_>>());
            prop_assert_eq!(buf.try_peek(), model.items.front());
            prop_assert_eq!(buf.peek_oldest(), model.items.back());
        }
    }
}

// ============================================================================
// Invariant 2: N pushes into capacity C keep min(N, C) most recent
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn keeps_most_recent_pushes(
        cap in 1usize..32,
        values in prop::collection::vec(any::<i64>(), 0..100)
    ) {
        let mut buf = BoundedCircularBuffer::new(Capacity::new(cap));
        for v in &values {
            buf.push(*v);
            prop_assert!(buf.len() <= cap);
        }
        prop_assert_eq!(buf.len(), values.len().min(cap));
        let expected: Vec<i64> = values.iter().rev().take(cap).copied().collect();
        prop_assert_eq!(buf.to_vec(), expected);
    }
}

// ============================================================================
// Invariant 3: push_range equals repeated push
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn push_range_equals_repeated_push(
        cap in 0usize..16,
        existing in prop::collection::vec(any::<i32>(), 0..20),
        incoming in prop::collection::vec(any::<i32>(), 0..40)
    ) {
        let mut bulk = BoundedCircularBuffer::new(Capacity::new(cap));
        let mut single = BoundedCircularBuffer::new(Capacity::new(cap));
        bulk.push_range(existing.iter().copied());
        single.push_range(existing.iter().copied());

        bulk.push_range(incoming.iter().copied());
        for v in &incoming {
            single.push(*v);
        }

        bulk.debug_validate_invariants();
        prop_assert_eq!(bulk.to_vec(), single.to_vec());
    }
}

// ============================================================================
// Invariant 4: any mutation invalidates an open cursor
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn mutation_invalidates_cursor(
        values in prop::collection::vec(any::<i32>(), 1..20),
        op in op_strategy()
    ) {
        let mut buf: BoundedCircularBuffer<i32> = values.iter().copied().collect();
        let mut cursor = buf.cursor();
        prop_assert!(cursor.advance(&buf).unwrap().is_some());

        let before = buf.version();
        apply(&mut buf, &op);
        if buf.version() != before {
            let is_modified = matches!(cursor.advance(&buf), Err(BufferError::Modified { .. }));
            prop_assert!(is_modified);
        }
    }
}
