//! The block pool handle and its per-type shared registry.

use std::{
    any::{Any, TypeId},
    sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError, RwLock},
};

use ahash::AHashMap;
use blocklist_common::Result;

use crate::{
    block::Block,
    bucket::PoolBucket,
    config::PoolConfig,
    stats::{PoolCounters, PoolStats},
};

type Registry = RwLock<AHashMap<TypeId, Box<dyn Any + Send + Sync>>>;

static SHARED_POOLS: OnceLock<Registry> = OnceLock::new();

/// A pool of fixed-size blocks of `T`, keyed by block size.
///
/// Cloning a `BlockPool` produces another handle to the same pool.
pub struct BlockPool<T>(Arc<PoolInner<T>>);

struct PoolInner<T> {
    config: PoolConfig,
    buckets: RwLock<AHashMap<usize, Arc<PoolBucket<T>>>>,
    directories: Mutex<Vec<Vec<Block<T>>>>,
    counters: Arc<PoolCounters>,
}

impl<T> Clone for BlockPool<T> {
    fn clone(&self) -> Self {
        BlockPool(self.0.clone())
    }
}

impl<T: Default> Default for BlockPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Default + Send + 'static> BlockPool<T> {
    /// Returns the process-wide pool for element type `T`.
    ///
    /// The pool is created with [`PoolConfig::default`] on first use.
    pub fn shared() -> BlockPool<T> {
        let registry = SHARED_POOLS.get_or_init(Default::default);
        let key = TypeId::of::<T>();
        if let Some(pool) = registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .and_then(|pool| pool.downcast_ref::<BlockPool<T>>())
        {
            return pool.clone();
        }

        let mut pools = registry.write().unwrap_or_else(PoisonError::into_inner);
        let entry = pools.entry(key).or_insert_with(|| {
            log::debug!(
                "creating shared block pool for {}",
                std::any::type_name::<T>()
            );
            Box::new(BlockPool::<T>::new()) as Box<dyn Any + Send + Sync>
        });
        match entry.downcast_ref::<BlockPool<T>>() {
            Some(pool) => pool.clone(),
            None => BlockPool::new(),
        }
    }
}

impl<T: Default> BlockPool<T> {
    /// Creates a private pool with the default configuration.
    pub fn new() -> BlockPool<T> {
        Self::from_valid_config(PoolConfig::default())
    }

    /// Creates a private pool with the given configuration.
    pub fn with_config(config: PoolConfig) -> Result<BlockPool<T>> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: PoolConfig) -> BlockPool<T> {
        BlockPool(Arc::new(PoolInner {
            config,
            buckets: RwLock::new(AHashMap::new()),
            directories: Mutex::new(Vec::new()),
            counters: Arc::new(PoolCounters::default()),
        }))
    }

    /// Rents a block of exactly `size` elements.
    ///
    /// The slots of a reused block hold whatever values they had when the
    /// block was returned, unless it was returned with `clear` set.
    pub fn rent(&self, size: usize) -> Block<T> {
        match self.bucket(size) {
            Some(bucket) => bucket.rent(),
            None => {
                self.0.counters.block_allocated();
                Block::new(size)
            }
        }
    }

    /// Returns a block to the bucket matching its length.
    ///
    /// The block is dropped when its size is below the pooling threshold or
    /// when the bucket is already at its retention bound. `clear` resets the
    /// slots to `T::default()` before the block is retained; it must be set
    /// whenever `T` owns resources that a pooled slot should not keep alive.
    pub fn return_block(&self, block: Block<T>, clear: bool) {
        match self.bucket(block.len()) {
            Some(bucket) => bucket.retain(block, clear),
            None => self.0.counters.block_dropped(),
        }
    }

    /// Returns the bucket for `size`, creating it on first use.
    ///
    /// Returns `None` for sizes below the pooling threshold. Concurrent first
    /// requests for the same size all observe the same bucket.
    pub fn bucket(&self, size: usize) -> Option<Arc<PoolBucket<T>>> {
        if !self.is_pooled_size(size) {
            return None;
        }
        if let Some(bucket) = self
            .0
            .buckets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&size)
        {
            return Some(bucket.clone());
        }

        let mut buckets = self
            .0
            .buckets
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let bucket = buckets.entry(size).or_insert_with(|| {
            log::debug!(
                "creating pool bucket: block_size={size}, max_retained={}",
                self.0.config.max_retained_blocks
            );
            Arc::new(PoolBucket::new(
                size,
                &self.0.config,
                self.0.counters.clone(),
            ))
        });
        Some(bucket.clone())
    }

    /// Rents an empty directory spine able to hold at least `min_slots` block
    /// handles without reallocating.
    pub fn rent_directory(&self, min_slots: usize) -> Vec<Block<T>> {
        if min_slots >= self.0.config.min_pooled_directory_len {
            let mut spines = self.lock_directories();
            let best = spines
                .iter()
                .enumerate()
                .filter(|(_, spine)| spine.capacity() >= min_slots)
                .min_by_key(|(_, spine)| spine.capacity())
                .map(|(pos, _)| pos);
            if let Some(pos) = best {
                let spine = spines.swap_remove(pos);
                drop(spines);
                self.0.counters.directory_reused();
                return spine;
            }
        }
        self.0.counters.directory_allocated();
        Vec::with_capacity(min_slots)
    }

    /// Returns a directory spine to the pool.
    ///
    /// Any blocks still held by the spine are returned to their buckets first.
    pub fn return_directory(&self, mut spine: Vec<Block<T>>) {
        let clear = std::mem::needs_drop::<T>();
        for block in spine.drain(..) {
            self.return_block(block, clear);
        }
        if spine.capacity() < self.0.config.min_pooled_directory_len {
            return;
        }
        let mut spines = self.lock_directories();
        if spines.len() < self.0.config.max_retained_directories {
            spines.push(spine);
        }
    }
}

impl<T> BlockPool<T> {
    pub fn config(&self) -> &PoolConfig {
        &self.0.config
    }

    /// Returns `true` when blocks of `size` elements go through a bucket.
    #[inline]
    pub fn is_pooled_size(&self, size: usize) -> bool {
        size >= self.0.config.min_pooled_block_size
    }

    pub fn stats(&self) -> PoolStats {
        self.0.counters.snapshot()
    }

    /// Returns `true` if both handles refer to the same pool.
    pub fn ptr_eq(&self, other: &BlockPool<T>) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Number of free directory spines currently retained.
    pub fn retained_directories(&self) -> usize {
        self.lock_directories().len()
    }

    /// Drops every free block and spine held by the pool.
    pub fn trim(&self) {
        let buckets = self
            .0
            .buckets
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        for bucket in buckets.values() {
            bucket.trim();
        }
        drop(buckets);
        let spines = std::mem::take(&mut *self.lock_directories());
        drop(spines);
    }

    fn lock_directories(&self) -> MutexGuard<'_, Vec<Vec<Block<T>>>> {
        self.0
            .directories
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> std::fmt::Debug for BlockPool<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockPool")
            .field("config", &self.0.config)
            .field("stats", &self.stats())
            .finish()
    }
}
