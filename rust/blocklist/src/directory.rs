//! The block directory: an ordered spine of owned blocks backed by a pool.

use blocklist_pool::{Block, BlockPool};

/// Ordered sequence of owned [`Block`]s.
///
/// The directory owns its blocks and the spine (`Vec`) that holds them, and
/// returns both to its pool when dropped, so every block rented into a
/// directory is released exactly once on every exit path, unwinding included.
pub struct BlockDirectory<T: Default> {
    blocks: Vec<Block<T>>,
    pool: BlockPool<T>,
}

impl<T: Default> BlockDirectory<T> {
    /// Creates an empty directory without renting a spine.
    pub fn new(pool: BlockPool<T>) -> BlockDirectory<T> {
        BlockDirectory {
            blocks: Vec::new(),
            pool,
        }
    }

    /// Creates an empty directory whose spine can hold `slots` blocks.
    pub fn with_slots(pool: BlockPool<T>, slots: usize) -> BlockDirectory<T> {
        let blocks = pool.rent_directory(slots);
        BlockDirectory { blocks, pool }
    }

    #[inline]
    pub fn pool(&self) -> &BlockPool<T> {
        &self.pool
    }

    /// Number of blocks in the directory.
    #[inline]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Number of block slots the spine holds without reallocating.
    #[inline]
    pub fn spine_capacity(&self) -> usize {
        self.blocks.capacity()
    }

    #[inline]
    pub fn blocks(&self) -> &[Block<T>] {
        &self.blocks
    }

    #[inline]
    pub fn blocks_mut(&mut self) -> &mut [Block<T>] {
        &mut self.blocks
    }

    #[inline]
    pub(crate) fn last_mut(&mut self) -> Option<&mut Block<T>> {
        self.blocks.last_mut()
    }

    /// Appends a block, replacing the spine first if it is full.
    pub fn push(&mut self, block: Block<T>) {
        if self.blocks.len() == self.blocks.capacity() {
            self.reserve_slots(self.blocks.len() + 1);
        }
        self.blocks.push(block);
    }

    /// Removes the first `count` blocks, yielding them in order.
    pub(crate) fn drain_front(&mut self, count: usize) -> std::vec::Drain<'_, Block<T>> {
        self.blocks.drain(..count)
    }

    /// Rents a block of `block_size` elements from the directory's pool.
    #[inline]
    pub fn rent_block(&self, block_size: usize) -> Block<T> {
        self.pool.rent(block_size)
    }

    /// Rents blocks until the directory holds `slots` of them.
    pub fn fill_to(&mut self, slots: usize, block_size: usize) {
        if slots <= self.blocks.len() {
            return;
        }
        self.reserve_slots(slots);
        while self.blocks.len() < slots {
            let block = self.pool.rent(block_size);
            self.blocks.push(block);
        }
    }

    /// Returns every block past the first `slots` to the pool, then installs a
    /// smaller spine when the current one is mostly unused.
    pub fn truncate(&mut self, slots: usize) {
        if slots >= self.blocks.len() {
            return;
        }
        let clear = std::mem::needs_drop::<T>();
        for block in self.blocks.drain(slots..) {
            self.pool.return_block(block, clear);
        }
        if slots == 0 {
            let spine = std::mem::take(&mut self.blocks);
            self.pool.return_directory(spine);
        } else if slots.saturating_mul(4) <= self.blocks.capacity() {
            let mut spine = self.pool.rent_directory(slots);
            spine.append(&mut self.blocks);
            let old = std::mem::replace(&mut self.blocks, spine);
            self.pool.return_directory(old);
            log::trace!(
                "directory spine shrunk to {} slots",
                self.blocks.capacity()
            );
        }
    }

    /// Returns every block and the spine to the pool.
    pub fn release(&mut self) {
        self.truncate(0);
        let spine = std::mem::take(&mut self.blocks);
        if spine.capacity() != 0 {
            self.pool.return_directory(spine);
        }
    }

    /// Makes sure the spine holds at least `slots` entries, replacing it
    /// wholesale with a larger rented spine when needed.
    fn reserve_slots(&mut self, slots: usize) {
        if slots <= self.blocks.capacity() {
            return;
        }
        let mut spine = self.pool.rent_directory(slots.next_power_of_two());
        spine.append(&mut self.blocks);
        let old = std::mem::replace(&mut self.blocks, spine);
        if old.capacity() != 0 {
            self.pool.return_directory(old);
        }
        log::trace!("directory spine grown to {} slots", self.blocks.capacity());
    }
}

impl<T: Default> Drop for BlockDirectory<T> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<T: Default> std::fmt::Debug for BlockDirectory<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockDirectory")
            .field("len", &self.blocks.len())
            .field("spine_capacity", &self.blocks.capacity())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use blocklist_pool::PoolConfig;

    use super::*;

    fn pool() -> BlockPool<u32> {
        BlockPool::with_config(PoolConfig::default().with_max_retained_blocks(64)).unwrap()
    }

    #[test]
    fn test_fill_and_truncate() {
        let pool = pool();
        let mut dir = BlockDirectory::new(pool.clone());
        dir.fill_to(5, 128);
        assert_eq!(dir.len(), 5);
        assert!(dir.blocks().iter().all(|b| b.len() == 128));
        assert_eq!(pool.stats().allocated_blocks, 5);

        dir.truncate(2);
        assert_eq!(dir.len(), 2);
        assert_eq!(pool.bucket(128).unwrap().retained_count(), 3);

        dir.fill_to(5, 128);
        assert_eq!(pool.stats().reused_blocks, 3);
        assert_eq!(pool.stats().allocated_blocks, 5);
    }

    #[test]
    fn test_drop_returns_blocks() {
        let pool = pool();
        {
            let mut dir = BlockDirectory::new(pool.clone());
            dir.fill_to(4, 256);
        }
        assert_eq!(pool.bucket(256).unwrap().retained_count(), 4);
    }

    #[test]
    fn test_spine_growth_replaces_spine() {
        let pool = pool();
        let mut dir = BlockDirectory::new(pool.clone());
        dir.fill_to(3, 64);
        assert!(dir.spine_capacity() >= 3);
        dir.fill_to(100, 64);
        assert_eq!(dir.len(), 100);
        assert!(dir.spine_capacity() >= 128);
        assert!(pool.stats().allocated_directories >= 2);
    }

    #[test]
    fn test_push_keeps_order() {
        let pool = pool();
        let mut dir = BlockDirectory::new(pool.clone());
        for i in 0..10u32 {
            let mut block = dir.rent_block(64);
            block[0] = i;
            dir.push(block);
        }
        let firsts = dir.blocks().iter().map(|b| b[0]).collect::<Vec<_>>();
        assert_eq!(firsts, (0..10).collect::<Vec<_>>());
        let front = dir.drain_front(3).map(|b| b[0]).collect::<Vec<_>>();
        assert_eq!(front, vec![0, 1, 2]);
        assert_eq!(dir.len(), 7);
        assert_eq!(dir.blocks()[0][0], 3);
    }

    #[test]
    fn test_release_empties_directory() {
        let pool = pool();
        let mut dir = BlockDirectory::with_slots(pool.clone(), 8);
        dir.fill_to(8, 64);
        dir.release();
        assert!(dir.is_empty());
        assert_eq!(dir.spine_capacity(), 0);
        assert_eq!(pool.bucket(64).unwrap().retained_count(), 8);
    }
}
