#![forbid(unsafe_code)]

//! Bounded, stack-ordered circular buffer.
//!
//! [`BoundedCircularBuffer`] is a LIFO stack with an optional element limit.
//! When a push overflows the limit the **oldest** element is evicted in O(1)
//! instead of growing or rejecting.
//!
//! # Layout
//!
//! Nodes live in a slab (`Vec<Slot<T>>`) and link to each other by index,
//! forming a closed doubly-linked ring. `head` is the newest node; following
//! `next` walks towards older nodes; `head.prev` is the oldest node and the
//! eviction candidate.
//!
//! ```text
//!            next            next            next
//!   head ─────────► n1 ─────────► n2 ─────────► oldest
//!    ▲                                            │
//!    └──────────────────── next ──────────────────┘
//!
//!   push(v): splice v between oldest and head, v becomes head
//!   evict:   unlink head.prev
//! ```
//!
//! Removed nodes become `Vacant` slots threaded onto a free list, so their
//! links are gone and the slot is reused by the next push.
//!
//! # Invariants
//!
//! 1. Following `next` from `head` returns to `head` after exactly `len` steps.
//! 2. `slots[i].next.prev == i` for every occupied slot.
//! 3. Occupied slot count equals `len`.
//! 4. If bounded, `len <= limit` after every public operation.
//! 5. `version` changes on every mutation.
//!
//! # Enumeration
//!
//! [`iter`](BoundedCircularBuffer::iter) borrows the buffer, so mutation while
//! it is alive is a compile error. [`Cursor`] is detached: it stores only the
//! buffer id and a version snapshot, and every
//! [`advance`](Cursor::advance) fails with [`BufferError::Modified`] once the
//! buffer has changed.

use std::fmt;
use std::iter::FusedIterator;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::capacity::Capacity;
use crate::error::BufferError;

static NEXT_BUFFER_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug)]
enum Slot<T> {
    Occupied { value: T, next: usize, prev: usize },
    Vacant { next_free: Option<usize> },
}

/// Capacity-limited stack on a circular slab-indexed ring.
pub struct BoundedCircularBuffer<T> {
    slots: Vec<Slot<T>>,
    /// Head of the vacant-slot free list.
    free: Option<usize>,
    /// Newest node.
    head: Option<usize>,
    len: usize,
    capacity: Capacity,
    version: u64,
    /// Identity checked by cursors.
    id: u64,
}

impl<T> BoundedCircularBuffer<T> {
    /// Create an empty buffer with the given capacity.
    #[must_use]
    pub fn new(capacity: Capacity) -> Self {
        Self {
            slots: Vec::new(),
            free: None,
            head: None,
            len: 0,
            capacity,
            version: 0,
            id: NEXT_BUFFER_ID.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Create an empty buffer from a raw capacity (`0` = unbounded).
    ///
    /// # Errors
    ///
    /// [`BufferError::InvalidCapacity`] if `raw` is negative.
    pub fn with_max_capacity(raw: i64) -> Result<Self, BufferError> {
        Ok(Self::new(Capacity::from_raw(raw)?))
    }

    /// Create an empty buffer that never evicts.
    #[must_use]
    pub fn unbounded() -> Self {
        Self::new(Capacity::Unbounded)
    }

    // ========================================================================
    // Info
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    #[must_use]
    pub fn capacity(&self) -> Capacity {
        self.capacity
    }

    /// Raw capacity (`0` = unbounded).
    #[must_use]
    pub fn max_capacity(&self) -> i64 {
        self.capacity.as_raw()
    }

    /// Mutation counter. Strictly increases on every mutating call.
    #[inline]
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    // ========================================================================
    // Stack operations
    // ========================================================================

    /// Push `value` as the new top.
    ///
    /// Returns the evicted oldest value when the push overflowed the limit.
    pub fn push(&mut self, value: T) -> Option<T> {
        self.link_head(value);
        self.bump();
        match self.capacity.limit() {
            Some(limit) if self.len > limit => self.evict_oldest(),
            _ => None,
        }
    }

    /// Push every value in order; the last one ends up on top.
    ///
    /// Room is made up front: if the input fills the whole capacity the
    /// buffer is cleared first and only the last `limit` inputs are kept,
    /// otherwise exactly the overflowing number of oldest entries is evicted
    /// before splicing.
    pub fn push_range<I>(&mut self, values: I)
    where
        I: IntoIterator<Item = T>,
    {
        let mut incoming: Vec<T> = values.into_iter().collect();
        if incoming.is_empty() {
            return;
        }

        if let Some(limit) = self.capacity.limit() {
            if incoming.len() >= limit {
                self.clear();
                let skip = incoming.len() - limit;
                incoming.drain(..skip);
            } else {
                let overflow = (self.len + incoming.len()).saturating_sub(limit);
                for _ in 0..overflow {
                    self.evict_oldest();
                }
            }
        }

        self.slots.reserve(incoming.len());
        for value in incoming {
            self.link_head(value);
        }
        self.bump();
    }

    /// Remove and return the top value.
    ///
    /// # Errors
    ///
    /// [`BufferError::Empty`] if the buffer is empty.
    pub fn pop(&mut self) -> Result<T, BufferError> {
        self.try_pop().ok_or(BufferError::Empty)
    }

    /// Remove and return the top value, or `None` if empty.
    pub fn try_pop(&mut self) -> Option<T> {
        let head = self.head?;
        let value = self.unlink(head);
        self.bump();
        Some(value)
    }

    /// Borrow the top value.
    ///
    /// # Errors
    ///
    /// [`BufferError::Empty`] if the buffer is empty.
    pub fn peek(&self) -> Result<&T, BufferError> {
        self.try_peek().ok_or(BufferError::Empty)
    }

    /// Borrow the top value, or `None` if empty.
    #[must_use]
    pub fn try_peek(&self) -> Option<&T> {
        self.head.map(|head| self.value(head))
    }

    /// Borrow the oldest value (next eviction candidate).
    #[must_use]
    pub fn peek_oldest(&self) -> Option<&T> {
        let head = self.head?;
        let (_, oldest) = self.links(head);
        Some(self.value(oldest))
    }

    /// Drop every element.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free = None;
        self.head = None;
        self.len = 0;
        self.bump();
    }

    // ========================================================================
    // Capacity
    // ========================================================================

    /// Change the capacity, evicting oldest entries if the buffer shrank
    /// below its length. Growing or going unbounded never evicts.
    ///
    /// Returns the evicted values, oldest first.
    pub fn set_capacity(&mut self, capacity: Capacity) -> Vec<T> {
        self.capacity = capacity;
        let Some(limit) = capacity.limit() else {
            return Vec::new();
        };

        let excess = self.len.saturating_sub(limit);
        let mut evicted = Vec::with_capacity(excess);
        while self.len > limit {
            match self.evict_oldest() {
                Some(value) => evicted.push(value),
                None => break,
            }
        }
        if !evicted.is_empty() {
            #[cfg(feature = "tracing")]
            tracing::trace!(
                target: "rewind.buffer",
                evicted = evicted.len(),
                limit = limit,
                "capacity shrink evicted entries"
            );
            self.bump();
        }
        evicted
    }

    /// Raw form of [`set_capacity`](Self::set_capacity).
    ///
    /// # Errors
    ///
    /// [`BufferError::InvalidCapacity`] if `raw` is negative; the buffer is
    /// left untouched.
    pub fn set_max_capacity(&mut self, raw: i64) -> Result<Vec<T>, BufferError> {
        let capacity = Capacity::from_raw(raw)?;
        Ok(self.set_capacity(capacity))
    }

    // ========================================================================
    // Enumeration
    // ========================================================================

    /// Iterate from newest to oldest.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            buffer: self,
            next: self.head,
            remaining: self.len,
        }
    }

    /// Detached cursor pinned to the current version.
    #[must_use]
    pub fn cursor(&self) -> Cursor {
        Cursor {
            buffer_id: self.id,
            epoch: self.version,
            start: self.head,
            next: self.head,
            len: self.len,
            remaining: self.len,
        }
    }

    /// Whether any element equals `value`.
    pub fn contains(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.iter().any(|v| v == value)
    }

    /// Clone the contents, newest first.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }

    /// Panic if any ring invariant is violated.
    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        let occupied = self
            .slots
            .iter()
            .filter(|slot| matches!(slot, Slot::Occupied { .. }))
            .count();
        assert_eq!(occupied, self.len, "occupied slots != len");

        if let Some(limit) = self.capacity.limit() {
            assert!(self.len <= limit, "len {} exceeds limit {limit}", self.len);
        }

        match self.head {
            None => assert_eq!(self.len, 0, "no head but len {}", self.len),
            Some(head) => {
                let mut idx = head;
                for step in 0..self.len {
                    let (next, _) = self.links(idx);
                    let (_, back) = self.links(next);
                    assert_eq!(back, idx, "prev/next disagree at slot {idx}");
                    if step + 1 < self.len {
                        assert_ne!(next, head, "ring closed early at step {step}");
                    }
                    idx = next;
                }
                assert_eq!(idx, head, "ring not closed after {} steps", self.len);
            }
        }

        let mut vacant = 0;
        let mut cursor = self.free;
        while let Some(idx) = cursor {
            match &self.slots[idx] {
                Slot::Vacant { next_free } => {
                    vacant += 1;
                    cursor = *next_free;
                }
                Slot::Occupied { .. } => panic!("occupied slot {idx} on free list"),
            }
        }
        assert_eq!(vacant + self.len, self.slots.len(), "leaked slots");
    }

    // ========================================================================
    // Slab plumbing
    // ========================================================================

    fn bump(&mut self) {
        self.version = self.version.wrapping_add(1);
    }

    /// Take a slot for `value`, linked to itself.
    fn alloc(&mut self, value: T) -> usize {
        match self.free {
            Some(idx) => {
                self.free = match self.slots[idx] {
                    Slot::Vacant { next_free } => next_free,
                    Slot::Occupied { .. } => unreachable!("occupied slot {idx} on free list"),
                };
                self.slots[idx] = Slot::Occupied {
                    value,
                    next: idx,
                    prev: idx,
                };
                idx
            }
            None => {
                let idx = self.slots.len();
                self.slots.push(Slot::Occupied {
                    value,
                    next: idx,
                    prev: idx,
                });
                idx
            }
        }
    }

    fn release(&mut self, idx: usize) -> T {
        let slot = std::mem::replace(
            &mut self.slots[idx],
            Slot::Vacant {
                next_free: self.free,
            },
        );
        self.free = Some(idx);
        match slot {
            Slot::Occupied { value, .. } => value,
            Slot::Vacant { .. } => unreachable!("released vacant slot {idx}"),
        }
    }

    /// `(next, prev)` of a live node.
    fn links(&self, idx: usize) -> (usize, usize) {
        match &self.slots[idx] {
            Slot::Occupied { next, prev, .. } => (*next, *prev),
            Slot::Vacant { .. } => unreachable!("vacant slot {idx} linked into ring"),
        }
    }

    fn value(&self, idx: usize) -> &T {
        match &self.slots[idx] {
            Slot::Occupied { value, .. } => value,
            Slot::Vacant { .. } => unreachable!("vacant slot {idx} linked into ring"),
        }
    }

    fn set_links(&mut self, idx: usize, new_next: usize, new_prev: usize) {
        if let Slot::Occupied { next, prev, .. } = &mut self.slots[idx] {
            *next = new_next;
            *prev = new_prev;
        }
    }

    fn set_next(&mut self, idx: usize, new_next: usize) {
        if let Slot::Occupied { next, .. } = &mut self.slots[idx] {
            *next = new_next;
        }
    }

    fn set_prev(&mut self, idx: usize, new_prev: usize) {
        if let Slot::Occupied { prev, .. } = &mut self.slots[idx] {
            *prev = new_prev;
        }
    }

    /// Splice `value` in between the oldest node and the head.
    fn link_head(&mut self, value: T) {
        let idx = self.alloc(value);
        if let Some(head) = self.head {
            let (_, oldest) = self.links(head);
            self.set_links(idx, head, oldest);
            self.set_next(oldest, idx);
            self.set_prev(head, idx);
        }
        self.head = Some(idx);
        self.len += 1;
    }

    /// Remove a live node from the ring. Does not bump the version.
    fn unlink(&mut self, idx: usize) -> T {
        if self.len == 1 {
            self.head = None;
        } else {
            let (next, prev) = self.links(idx);
            self.set_next(prev, next);
            self.set_prev(next, prev);
            if self.head == Some(idx) {
                self.head = Some(next);
            }
        }
        self.len -= 1;
        let value = self.release(idx);
        if self.len == 0 {
            self.slots.clear();
            self.free = None;
        }
        value
    }

    fn evict_oldest(&mut self) -> Option<T> {
        let head = self.head?;
        let (_, oldest) = self.links(head);
        #[cfg(feature = "tracing")]
        tracing::trace!(target: "rewind.buffer", len = self.len, "evicting oldest entry");
        Some(self.unlink(oldest))
    }
}

impl<T> Default for BoundedCircularBuffer<T> {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl<T: fmt::Debug> fmt::Debug for BoundedCircularBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedCircularBuffer")
            .field("len", &self.len)
            .field("capacity", &self.capacity)
            .field("version", &self.version)
            .field("entries", &self.iter().collect::<Vec<_>>())
            .finish()
    }
}

impl<T> Extend<T> for BoundedCircularBuffer<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.push_range(iter);
    }
}

impl<T> FromIterator<T> for BoundedCircularBuffer<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut buffer = Self::unbounded();
        buffer.push_range(iter);
        buffer
    }
}

impl<'a, T> IntoIterator for &'a BoundedCircularBuffer<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ============================================================================
// Iterators
// ============================================================================

/// Borrowing iterator, newest to oldest.
pub struct Iter<'a, T> {
    buffer: &'a BoundedCircularBuffer<T>,
    next: Option<usize>,
    remaining: usize,
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            buffer: self.buffer,
            next: self.next,
            remaining: self.remaining,
        }
    }
}

impl<T> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter")
            .field("remaining", &self.remaining)
            .finish()
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let idx = self.next?;
        let (next, _) = self.buffer.links(idx);
        self.next = Some(next);
        self.remaining -= 1;
        Some(self.buffer.value(idx))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

/// Detached enumeration handle with a version snapshot.
///
/// A cursor does not borrow its buffer. Each [`advance`](Self::advance)
/// re-checks that the buffer is the one it came from and that nothing was
/// mutated since the snapshot, so a stale cursor fails instead of yielding
/// data from a changed ring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    buffer_id: u64,
    epoch: u64,
    start: Option<usize>,
    next: Option<usize>,
    len: usize,
    remaining: usize,
}

impl Cursor {
    /// Yield the next value, newest to oldest; `Ok(None)` when exhausted.
    ///
    /// # Errors
    ///
    /// - [`BufferError::ForeignCursor`] if `buffer` did not create this cursor.
    /// - [`BufferError::Modified`] if `buffer` changed since the snapshot.
    pub fn advance<'a, T>(
        &mut self,
        buffer: &'a BoundedCircularBuffer<T>,
    ) -> Result<Option<&'a T>, BufferError> {
        self.check(buffer)?;
        if self.remaining == 0 {
            return Ok(None);
        }
        let Some(idx) = self.next else {
            return Ok(None);
        };
        let (next, _) = buffer.links(idx);
        self.next = Some(next);
        self.remaining -= 1;
        Ok(Some(buffer.value(idx)))
    }

    /// Rewind to the newest element of the same snapshot.
    ///
    /// # Errors
    ///
    /// Same as [`advance`](Self::advance): a modified buffer cannot be
    /// rewound into; take a fresh [`cursor`](BoundedCircularBuffer::cursor).
    pub fn reset<T>(&mut self, buffer: &BoundedCircularBuffer<T>) -> Result<(), BufferError> {
        self.check(buffer)?;
        self.next = self.start;
        self.remaining = self.len;
        Ok(())
    }

    /// Version captured at creation.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Values left to yield.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    fn check<T>(&self, buffer: &BoundedCircularBuffer<T>) -> Result<(), BufferError> {
        if buffer.id != self.buffer_id {
            return Err(BufferError::ForeignCursor);
        }
        if buffer.version != self.epoch {
            return Err(BufferError::Modified {
                expected: self.epoch,
                found: buffer.version,
            });
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
