#![no_main]

use std::collections::VecDeque;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use rewind_core::{BoundedCircularBuffer, Capacity};

#[derive(Debug, Arbitrary)]
enum Op {
    Push(u16),
    PushRange(Vec<u16>),
    Pop,
    Peek,
    Clear,
    SetCapacity(u8),
    Iterate,
}

#[derive(Debug, Arbitrary)]
struct Input {
    capacity: u8,
    ops: Vec<Op>,
}

/// Front = newest.
fn model_push(model: &mut VecDeque<u16>, limit: Option<usize>, value: u16) -> Option<u16> {
    model.push_front(value);
    match limit {
        Some(limit) if model.len() > limit => model.pop_back(),
        _ => None,
    }
}

fuzz_target!(|input: Input| {
    let mut capacity = Capacity::new(usize::from(input.capacity % 32));
    let mut buf = BoundedCircularBuffer::new(capacity);
    let mut model: VecDeque<u16> = VecDeque::new();

    for op in input.ops.into_iter().take(512) {
        match op {
            Op::Push(v) => {
                let evicted = buf.push(v);
                assert_eq!(evicted, model_push(&mut model, capacity.limit(), v));
            }
            Op::PushRange(values) => {
                let values: Vec<u16> = values.into_iter().take(64).collect();
                for &v in &values {
                    model_push(&mut model, capacity.limit(), v);
                }
                buf.push_range(values);
            }
            Op::Pop => assert_eq!(buf.try_pop(), model.pop_front()),
            Op::Peek => assert_eq!(buf.try_peek(), model.front()),
            Op::Clear => {
                buf.clear();
                model.clear();
            }
            Op::SetCapacity(raw) => {
                capacity = Capacity::new(usize::from(raw % 32));
                let mut evicted = buf.set_capacity(capacity);
                let mut expected = Vec::new();
                if let Some(limit) = capacity.limit() {
                    while model.len() > limit {
                        expected.extend(model.pop_back());
                    }
                }
                evicted.sort_unstable();
                expected.sort_unstable();
                assert_eq!(evicted, expected);
            }
            Op::Iterate => {
                let seen: Vec<u16> = buf.iter().copied().collect();
                assert!(seen.iter().eq(model.iter()));
            }
        }

        assert_eq!(buf.len(), model.len());
        if let Some(limit) = capacity.limit() {
            assert!(buf.len() <= limit, "len exceeds capacity");
        }
        #[cfg(debug_assertions)]
        buf.debug_validate_invariants();
    }
});
