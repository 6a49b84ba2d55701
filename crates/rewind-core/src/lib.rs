#![forbid(unsafe_code)]

//! Rewind Core
//!
//! Leaf crate of the Rewind workspace: the bounded, stack-ordered circular
//! buffer that backs undo and redo history, plus the error taxonomy shared
//! with the runtime crate.
//!
//! # Key Components
//!
//! - [`BoundedCircularBuffer`] - LIFO stack with O(1) push/pop/peek and O(1)
//!   eviction of the oldest entry on overflow
//! - [`Capacity`] - element limit; raw `0` means unbounded
//! - [`Cursor`] - detached, version-checked enumeration handle
//! - [`BufferError`] / [`ErrorKind`] - failures and their category
//!
//! # Example
//!
//! ```
//! use rewind_core::{BoundedCircularBuffer, Capacity};
//! use std::num::NonZeroUsize;
//!
//! let mut buf = BoundedCircularBuffer::new(Capacity::from(NonZeroUsize::new(2).unwrap()));
//! buf.push("a");
//! buf.push("b");
//! assert_eq!(buf.push("c"), Some("a"));
//! assert_eq!(buf.to_vec(), vec!["c", "b"]);
//! ```

pub mod capacity;
pub mod error;
pub mod ring;

pub use capacity::Capacity;
pub use error::{BufferError, ErrorKind};
pub use ring::{BoundedCircularBuffer, Cursor, Iter};
