use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time snapshot of a pool's counters.
///
/// **Note**: counters are updated with relaxed ordering and are intended for
/// diagnostics and tests; a snapshot taken while other threads use the pool
/// may be slightly outdated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Blocks allocated because no free block of the requested size was available
    /// (including blocks below the pooling threshold and pre-warmed blocks).
    pub allocated_blocks: u64,
    /// Rent requests served from a bucket's free-list.
    pub reused_blocks: u64,
    /// Returned blocks that were kept in a free-list.
    pub retained_blocks: u64,
    /// Returned blocks that were dropped (bucket full or size not pooled).
    pub dropped_blocks: u64,
    /// Directory spines allocated fresh.
    pub allocated_directories: u64,
    /// Directory spine requests served from the free-list.
    pub reused_directories: u64,
}

#[derive(Default)]
pub(crate) struct PoolCounters {
    allocated_blocks: AtomicU64,
    reused_blocks: AtomicU64,
    retained_blocks: AtomicU64,
    dropped_blocks: AtomicU64,
    allocated_directories: AtomicU64,
    reused_directories: AtomicU64,
}

impl PoolCounters {
    #[inline]
    pub fn block_allocated(&self) {
        self.allocated_blocks.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn block_reused(&self) {
        self.reused_blocks.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn block_retained(&self) {
        self.retained_blocks.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn block_dropped(&self) {
        self.dropped_blocks.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn directory_allocated(&self) {
        self.allocated_directories.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn directory_reused(&self) {
        self.reused_directories.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> PoolStats {
        PoolStats {
            allocated_blocks: self.allocated_blocks.load(Ordering::Relaxed),
            reused_blocks: self.reused_blocks.load(Ordering::Relaxed),
            retained_blocks: self.retained_blocks.load(Ordering::Relaxed),
            dropped_blocks: self.dropped_blocks.load(Ordering::Relaxed),
            allocated_directories: self.allocated_directories.load(Ordering::Relaxed),
            reused_directories: self.reused_directories.load(Ordering::Relaxed),
        }
    }
}
