use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use blocklist_common::{Result, error::Error};

use crate::{block::Block, config::PoolConfig, stats::PoolCounters};

/// Free-list of blocks of one specific size.
///
/// The free-list is a LIFO stack behind a mutex; both rent and return are a
/// single push or pop under the lock. A bucket never holds more than its
/// retention bound: surplus returns are dropped.
pub struct PoolBucket<T> {
    block_size: usize,
    max_retained: usize,
    free: Mutex<Vec<Block<T>>>,
    counters: Arc<PoolCounters>,
}

impl<T: Default> PoolBucket<T> {
    pub(crate) fn new(
        block_size: usize,
        config: &PoolConfig,
        counters: Arc<PoolCounters>,
    ) -> PoolBucket<T> {
        let max_retained = config.max_retained_blocks;
        let prewarm = config.min_retained_blocks.min(max_retained);
        let free = (0..prewarm)
            .map(|_| {
                counters.block_allocated();
                Block::new(block_size)
            })
            .collect::<Vec<_>>();
        PoolBucket {
            block_size,
            max_retained,
            free: Mutex::new(free),
            counters,
        }
    }

    /// Takes a block from the free-list, or allocates a fresh one when the
    /// free-list is empty.
    pub fn rent(&self) -> Block<T> {
        if let Some(block) = self.lock().pop() {
            self.counters.block_reused();
            return block;
        }
        self.counters.block_allocated();
        Block::new(self.block_size)
    }

    /// Same as [`rent`](Self::rent), but checks that the caller asked for this
    /// bucket's block size.
    pub fn rent_exact(&self, size: usize) -> Result<Block<T>> {
        if size != self.block_size {
            return Err(Error::size_mismatch(self.block_size, size));
        }
        Ok(self.rent())
    }

    /// Returns a block to the free-list.
    ///
    /// Fails when the block's length differs from the bucket's block size.
    /// When `clear` is set every slot is reset to `T::default()` first.
    pub fn give_back(&self, block: Block<T>, clear: bool) -> Result<()> {
        if block.len() != self.block_size {
            return Err(Error::size_mismatch(self.block_size, block.len()));
        }
        self.retain(block, clear);
        Ok(())
    }

    pub(crate) fn retain(&self, mut block: Block<T>, clear: bool) {
        debug_assert_eq!(block.len(), self.block_size);
        if clear {
            block.clear();
        }
        let mut free = self.lock();
        if free.len() < self.max_retained {
            free.push(block);
            drop(free);
            self.counters.block_retained();
        } else {
            drop(free);
            self.counters.block_dropped();
        }
    }
}

impl<T> PoolBucket<T> {
    #[inline]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    #[inline]
    pub fn max_retained(&self) -> usize {
        self.max_retained
    }

    /// Number of free blocks currently held by the bucket.
    pub fn retained_count(&self) -> usize {
        self.lock().len()
    }

    /// Drops every free block held by the bucket.
    pub fn trim(&self) {
        let drained = std::mem::take(&mut *self.lock());
        drop(drained);
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Block<T>>> {
        self.free.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> std::fmt::Debug for PoolBucket<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolBucket")
            .field("block_size", &self.block_size)
            .field("max_retained", &self.max_retained)
            .field("retained", &self.retained_count())
            .finish()
    }
}
