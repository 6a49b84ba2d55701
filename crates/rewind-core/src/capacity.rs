#![forbid(unsafe_code)]

//! Buffer capacity and its raw sentinel encoding.
//!
//! At the buffer layer a raw capacity of `0` means **unbounded**: the buffer
//! never evicts. Positive values cap the element count. Negative values are
//! rejected.

use std::fmt;
use std::num::NonZeroUsize;

use crate::error::BufferError;

/// Maximum element count of a [`BoundedCircularBuffer`](crate::BoundedCircularBuffer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Capacity {
    /// Never evict.
    #[default]
    Unbounded,
    /// Keep at most this many elements; the oldest is evicted on overflow.
    Bounded(NonZeroUsize),
}

impl Capacity {
    /// Raw value meaning "unbounded".
    pub const UNBOUNDED_SENTINEL: i64 = 0;

    /// Bounded capacity, or [`Capacity::Unbounded`] when `limit == 0`.
    #[must_use]
    pub const fn new(limit: usize) -> Self {
        match NonZeroUsize::new(limit) {
            Some(n) => Self::Bounded(n),
            None => Self::Unbounded,
        }
    }

    /// Decode a raw capacity value.
    ///
    /// # Errors
    ///
    /// [`BufferError::InvalidCapacity`] for any negative value.
    pub fn from_raw(raw: i64) -> Result<Self, BufferError> {
        if raw < 0 {
            return Err(BufferError::InvalidCapacity(raw));
        }
        let limit = usize::try_from(raw).map_err(|_| BufferError::InvalidCapacity(raw))?;
        Ok(Self::new(limit))
    }

    /// Raw encoding; saturates at `i64::MAX`.
    #[must_use]
    pub fn as_raw(self) -> i64 {
        match self {
            Self::Unbounded => Self::UNBOUNDED_SENTINEL,
            Self::Bounded(n) => i64::try_from(n.get()).unwrap_or(i64::MAX),
        }
    }

    /// Element limit, or `None` when unbounded.
    #[inline]
    #[must_use]
    pub const fn limit(self) -> Option<usize> {
        match self {
            Self::Unbounded => None,
            Self::Bounded(n) => Some(n.get()),
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_unbounded(self) -> bool {
        matches!(self, Self::Unbounded)
    }
}

impl From<NonZeroUsize> for Capacity {
    fn from(limit: NonZeroUsize) -> Self {
        Self::Bounded(limit)
    }
}

impl TryFrom<i64> for Capacity {
    type Error = BufferError;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        Self::from_raw(raw)
    }
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unbounded => f.write_str("unbounded"),
            Self::Bounded(n) => write!(f, "{n}"),
        }
    }
}
