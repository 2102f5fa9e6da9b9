//! # rexpandable - An Expandable Array with Pluggable Allocators
//!
//! This crate provides [`ExpandableArray`], a contiguous array whose capacity
//! is managed explicitly by the caller, and the [`Allocator`] abstraction it
//! draws its storage from.
//!
//! ## Overview
//!
//! Unlike `Vec`, the array never grows behind your back. Capacity changes only
//! when you ask for it:
//!
//! ```text
//!   reserve(8) on [a, b, c] (capacity 4):
//!
//!   old ┌───┬───┬───┬───┐
//!       │ a │ b │ c │   │ ──── clone a, b, c ────┐
//!       └───┴───┴───┴───┘                        ▼
//!   new ┌───┬───┬───┬───┬───┬───┬───┬───┐
//!       │ a │ b │ c │   │   │   │   │   │
//!       └───┴───┴───┴───┴───┴───┴───┴───┘
//!
//!   The old elements are destroyed and the old block is released only
//!   after the new block is fully populated.
//! ```
//!
//! Growth policy in one table:
//!
//! ```text
//!   operation              allocated slots
//!   ─────────────────────  ───────────────────────────
//!   new()                  4
//!   from_elem(n, v)        2n
//!   from_slice / list      2 * length
//!   reserve(c)             exactly c   (c < len truncates!)
//!   resize(n, v)           2n, then fill or truncate to n
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//!   rexpandable
//!   ├── array      - ExpandableArray
//!   ├── element    - Element trait, recursive destruction of [T; N]
//!   ├── allocator  - Allocator trait, Global
//!   ├── bump       - BumpAllocator over an mmap'd region (unix)
//!   ├── block      - Block metadata structure (internal)
//!   ├── config     - BumpConfig, SearchMode
//!   ├── error      - AllocError, ArrayError
//!   ├── align      - Alignment macros (align!, align_to!)
//!   └── macros     - expandable! literal lists
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use rexpandable::{BumpAllocator, BumpConfig, ExpandableArray, expandable};
//!
//! let mut numbers = expandable![1, 2, 3];
//! numbers.resize(5, 0).unwrap();
//! assert_eq!(numbers.as_slice(), &[1, 2, 3, 0, 0]);
//!
//! // Storage from a region allocator, shared by reference.
//! let bump = BumpAllocator::new(BumpConfig::default()).unwrap();
//! let words = ExpandableArray::from_slice_in(&["a", "b"], &bump).unwrap();
//! assert_eq!(words.len(), 2);
//! ```
//!
//! ## Element Lifetimes
//!
//! Elements are built and torn down through the allocator's `construct` and
//! `destroy`. Element types implement [`Element`]; fixed-length arrays
//! `[T; N]` are destroyed leaf by leaf, at any nesting depth. Use
//! [`scalar_element!`] for your own types.
//!
//! ## Limitations
//!
//! - **Single-threaded only**: no synchronization primitives
//! - **No element access operators**: read through `as_slice`
//! - **No push/pop**: capacity is the caller's job
//! - **Unix-only bump allocator**: requires `libc` and `mmap`

pub mod align;
mod allocator;
mod array;
#[cfg(unix)]
mod block;
#[cfg(unix)]
mod bump;
#[cfg(unix)]
mod config;
pub mod element;
mod error;
mod macros;

pub use allocator::{Allocator, Global};
pub use array::{DEFAULT_CAPACITY, ExpandableArray, HEADROOM_FACTOR};
#[cfg(unix)]
pub use bump::BumpAllocator;
#[cfg(unix)]
pub use config::{BumpConfig, SearchMode};
pub use element::Element;
pub use error::{AllocError, ArrayError};
