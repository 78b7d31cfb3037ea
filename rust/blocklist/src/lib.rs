//! Large, block-backed lists addressed by 64-bit indices.
//!
//! `blocklist` provides [`LongList`], a growable sequence that stores its
//! elements in fixed-size blocks rather than in one contiguous buffer. It is
//! meant for collections large enough that a single allocation (and the copy on
//! every reallocation) becomes a liability.
//!
//! # Core Concepts
//!
//! ## Block Layout
//!
//! Every list has a power-of-two block size (16384 elements by default). A
//! logical index `i` lives at block `i >> shift`, offset `i & mask`; the
//! [`BlockLayout`] holds the precomputed shift and mask. The ordered sequence
//! of blocks is the list's *directory*.
//!
//! ## Pooled Blocks
//!
//! Blocks are rented from a [`BlockPool`] and handed back when the list
//! shrinks, is cleared or is dropped, so workloads that build and discard many
//! lists reuse the same buffers. Lists created with [`LongList::new`] share a
//! process-wide pool per element type; [`LongList::with_pool`] takes an
//! explicit one.
//!
//! ## Growth
//!
//! The first allocation rounds the requested capacity up to a whole block;
//! after that the capacity doubles until it fits the request. The directory
//! is always populated with blocks up to the capacity.
//!
//! ## Splicing
//!
//! [`LongList::insert_range`] inserts a whole range mid-list in one pass:
//! blocks before the splice point are moved into the new layout untouched and
//! only the affected tail is rewritten.
//!
//! ## Search
//!
//! [`LongList::index_of`] scans block by block and switches to a parallel scan
//! on the `rayon` pool once the list is longer than
//! [`ListOptions::parallel_search_threshold`]. Both paths report the lowest
//! matching index.
//!
//! ## Iteration
//!
//! [`LongList::iter`] borrows the list and performs no checks.
//! [`LongList::cursor`] returns a detached [`VersionedCursor`] that detects
//! mutations made between its steps and fails with a concurrent-modification
//! error instead of yielding stale data.
//!
//! # Example
//!
//! ```
//! use blocklist::{ListOptions, LongList};
//!
//! let mut list = LongList::<u64>::with_options(
//!     ListOptions::default().with_block_size(1024),
//! )
//! .unwrap();
//! list.extend(0..5000);
//! list.insert_range(10, [7, 7, 7]).unwrap();
//!
//! assert_eq!(list.long_len(), 5003);
//! assert_eq!(list[11], 7);
//! assert_eq!(list.index_of(&4999), Some(5002));
//! ```

pub mod compat;
pub mod directory;
pub mod iter;
pub mod layout;
pub mod list;
pub mod options;
mod search;
pub mod sort;
mod splice;
pub mod version;

pub use blocklist_common::{Result, error::Error, error::ErrorKind};
pub use blocklist_pool::{Block, BlockPool, PoolConfig, PoolStats};
pub use compat::LongIndexed;
pub use iter::{Iter, IterMut};
pub use layout::BlockLayout;
pub use list::LongList;
pub use options::ListOptions;
pub use sort::{FastRandIndexSource, RandomIndexSource};
pub use version::{Version, VersionedCursor};
