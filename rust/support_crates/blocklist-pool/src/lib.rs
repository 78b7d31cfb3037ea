//! Block-size keyed memory pool.
//!
//! The pool hands out fixed-length [`Block`]s and takes them back when a
//! collection shrinks, clears or is dropped, so that large collections recycle
//! their backing buffers instead of allocating and discarding them on every
//! resize.
//!
//! # Structure
//!
//! ```text
//! BlockPool<T>
//!   ├── buckets:     block size -> PoolBucket<T>   (lazily created, RwLock)
//!   │                 └── free-list of Block<T>     (bounded, Mutex)
//!   └── directories: free-list of Vec<Block<T>>    (directory spines, Mutex)
//! ```
//!
//! Every bucket retains at most [`PoolConfig::max_retained_blocks`] blocks; a
//! block returned to a full bucket is simply dropped. The pool is an
//! optimization: it never guarantees reuse.
//!
//! Blocks shorter than [`PoolConfig::min_pooled_block_size`] bypass the pool
//! entirely, since an allocation is cheaper than the free-list bookkeeping for
//! such small buffers.
//!
//! # Sharing
//!
//! [`BlockPool`] is a cheaply cloneable handle. [`BlockPool::shared`] returns the
//! process-wide pool for an element type; it is safe to rent from and return to
//! it concurrently from unrelated collections on different threads.
//!
//! ```
//! use blocklist_pool::{BlockPool, PoolConfig};
//!
//! let pool = BlockPool::<u64>::with_config(PoolConfig::default()).unwrap();
//! let block = pool.rent(4096);
//! assert_eq!(block.len(), 4096);
//! pool.return_block(block, false);
//!
//! let again = pool.rent(4096);
//! assert_eq!(pool.stats().allocated_blocks, 1);
//! assert_eq!(pool.stats().reused_blocks, 1);
//! # drop(again);
//! ```

pub mod block;
pub mod bucket;
pub mod config;
pub mod pool;
pub mod stats;

pub use block::Block;
pub use bucket::PoolBucket;
pub use config::PoolConfig;
pub use pool::BlockPool;
pub use stats::PoolStats;
