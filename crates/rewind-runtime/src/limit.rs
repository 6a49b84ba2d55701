#![forbid(unsafe_code)]

//! History size regimes.
//!
//! The history's raw `max_undo_actions` setting uses different sentinels
//! than the buffer layer:
//!
//! | raw   | history regime | buffer capacity |
//! |-------|----------------|-----------------|
//! | `0`   | Disabled       | (never pushed)  |
//! | `-1`  | Unlimited      | `0` (unbounded) |
//! | `n>0` | Bounded(n)     | `n`             |
//!
//! A disabled history must not be expressed as a capacity-0 buffer, which
//! would keep everything.

use std::fmt;
use std::num::NonZeroUsize;

use rewind_core::Capacity;

use crate::error::HistoryError;

/// Raw default for `max_undo_actions`.
pub const DEFAULT_MAX_UNDO_ACTIONS: i64 = 100;

/// How many actions the history retains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UndoLimit {
    /// Actions still run, but nothing is recorded.
    Disabled,
    /// Record everything, never evict.
    Unlimited,
    /// Keep at most this many records per buffer.
    Bounded(NonZeroUsize),
}

impl UndoLimit {
    /// Raw value meaning "keep no history".
    pub const DISABLED_SENTINEL: i64 = 0;
    /// Raw value meaning "keep everything".
    pub const UNLIMITED_SENTINEL: i64 = -1;

    /// Bounded limit, or [`UndoLimit::Disabled`] when `limit == 0`.
    #[must_use]
    pub const fn bounded(limit: usize) -> Self {
        match NonZeroUsize::new(limit) {
            Some(n) => Self::Bounded(n),
            None => Self::Disabled,
        }
    }

    /// Decode a raw `max_undo_actions` value.
    ///
    /// # Errors
    ///
    /// [`HistoryError::InvalidLimit`] for negative values other than
    /// [`UNLIMITED_SENTINEL`](Self::UNLIMITED_SENTINEL).
    pub fn from_raw(raw: i64) -> Result<Self, HistoryError> {
        match raw {
            Self::DISABLED_SENTINEL => Ok(Self::Disabled),
            Self::UNLIMITED_SENTINEL => Ok(Self::Unlimited),
            n if n > 0 => usize::try_from(n)
                .map(Self::bounded)
                .map_err(|_| HistoryError::InvalidLimit(raw)),
            _ => Err(HistoryError::InvalidLimit(raw)),
        }
    }

    /// Raw encoding; saturates at `i64::MAX`.
    #[must_use]
    pub fn as_raw(self) -> i64 {
        match self {
            Self::Disabled => Self::DISABLED_SENTINEL,
            Self::Unlimited => Self::UNLIMITED_SENTINEL,
            Self::Bounded(n) => i64::try_from(n.get()).unwrap_or(i64::MAX),
        }
    }

    /// Capacity for the undo/redo buffers; `None` when disabled.
    #[must_use]
    pub fn buffer_capacity(self) -> Option<Capacity> {
        match self {
            Self::Disabled => None,
            Self::Unlimited => Some(Capacity::Unbounded),
            Self::Bounded(n) => Some(Capacity::Bounded(n)),
        }
    }

    #[must_use]
    pub const fn is_disabled(self) -> bool {
        matches!(self, Self::Disabled)
    }

    #[must_use]
    pub const fn is_unlimited(self) -> bool {
        matches!(self, Self::Unlimited)
    }
}

impl Default for UndoLimit {
    fn default() -> Self {
        Self::bounded(DEFAULT_MAX_UNDO_ACTIONS as usize)
    }
}

impl TryFrom<i64> for UndoLimit {
    type Error = HistoryError;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        Self::from_raw(raw)
    }
}

impl From<UndoLimit> for i64 {
    fn from(limit: UndoLimit) -> Self {
        limit.as_raw()
    }
}

impl fmt::Display for UndoLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => f.write_str("disabled"),
            Self::Unlimited => f.write_str("unlimited"),
            Self::Bounded(n) => write!(f, "{n}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinels_decode() {
        assert_eq!(UndoLimit::from_raw(0).unwrap(), UndoLimit::Disabled);
        assert_eq!(UndoLimit::from_raw(-1).unwrap(), UndoLimit::Unlimited);
        assert_eq!(UndoLimit::from_raw(3).unwrap(), UndoLimit::bounded(3));
        assert!(matches!(
            UndoLimit::from_raw(-2),
            Err(HistoryError::InvalidLimit(-2))
        ));
    }

    #[test]
    fn raw_round_trip_of_sentinels() {
        assert_eq!(UndoLimit::Disabled.as_raw(), 0);
        assert_eq!(UndoLimit::Unlimited.as_raw(), -1);
        assert_eq!(i64::from(UndoLimit::bounded(42)), 42);
    }

    #[test]
    fn disabled_has_no_buffer_capacity() {
        assert_eq!(UndoLimit::Disabled.buffer_capacity(), None);
        assert_eq!(
            UndoLimit::Unlimited.buffer_capacity(),
            Some(Capacity::Unbounded)
        );
        assert_eq!(
            UndoLimit::bounded(5).buffer_capacity(),
            Some(Capacity::new(5))
        );
    }

    #[test]
    fn default_is_bounded_hundred() {
        assert_eq!(UndoLimit::default().as_raw(), DEFAULT_MAX_UNDO_ACTIONS);
        assert_eq!(UndoLimit::default().to_string(), "100");
    }
}
