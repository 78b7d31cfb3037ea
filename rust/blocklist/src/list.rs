//! The long-indexed list core.

use std::ops::{Index, IndexMut};

use blocklist_common::{Result, error::Error, verify_arg, verify_index};
use blocklist_pool::{Block, BlockPool};

use crate::{
    directory::BlockDirectory,
    iter::{Iter, IterMut},
    layout::BlockLayout,
    options::ListOptions,
    version::{Version, VersionedCursor},
};

/// A growable list indexed by `u64`, stored across fixed-size pooled blocks.
///
/// Elements live in a [`BlockDirectory`] of power-of-two sized blocks rented
/// from a [`BlockPool`]. A logical index maps onto its block and offset with a
/// shift and a mask; growing the list rents more blocks instead of reallocating
/// and copying one contiguous buffer, and shrinking or dropping the list hands
/// the blocks back to the pool for reuse.
///
/// The whole directory up to [`capacity`](Self::capacity) is always populated
/// with blocks, so appends only touch the pool when the capacity is exhausted.
///
/// `T: Default` fills the slots of fresh blocks and the vacated slot after a
/// removal.
pub struct LongList<T: Default> {
    pub(crate) directory: BlockDirectory<T>,
    pub(crate) layout: BlockLayout,
    pub(crate) parallel_search_threshold: u64,
    /// Number of elements the directory can hold (a multiple of the block size).
    pub(crate) capacity: u64,
    /// Number of elements in the list.
    pub(crate) long_count: u64,
    /// Directory index of the block holding the last element.
    pub(crate) last_block_with_data: usize,
    /// Offset within `next_item_block_index` where the next append lands.
    pub(crate) next_item_index: usize,
    pub(crate) next_item_block_index: usize,
    pub(crate) version: Version,
}

impl<T: Default + Send + 'static> LongList<T> {
    /// Creates an empty list with the default options, backed by the shared
    /// pool for `T`.
    pub fn new() -> LongList<T> {
        Self::from_parts(
            BlockPool::shared(),
            BlockLayout::default(),
            ListOptions::default().parallel_search_threshold,
        )
    }

    /// Creates an empty list with `block_size` elements per block, backed by
    /// the shared pool for `T`.
    pub fn with_block_size(block_size: usize) -> Result<LongList<T>> {
        Self::with_options(ListOptions::default().with_block_size(block_size))
    }

    pub fn with_options(options: ListOptions) -> Result<LongList<T>> {
        Self::with_pool(BlockPool::shared(), options)
    }

    /// Creates an empty list able to hold `capacity` elements without growing.
    pub fn with_capacity(capacity: u64) -> LongList<T> {
        let mut list = Self::new();
        list.ensure_capacity(capacity);
        list
    }
}

impl<T: Default + Send + 'static> Default for LongList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Default> LongList<T> {
    /// Creates an empty list backed by `pool`.
    pub fn with_pool(pool: BlockPool<T>, options: ListOptions) -> Result<LongList<T>> {
        let layout = options.layout()?;
        Ok(Self::from_parts(
            pool,
            layout,
            options.parallel_search_threshold,
        ))
    }

    fn from_parts(
        pool: BlockPool<T>,
        layout: BlockLayout,
        parallel_search_threshold: u64,
    ) -> LongList<T> {
        LongList {
            directory: BlockDirectory::new(pool),
            layout,
            parallel_search_threshold,
            capacity: 0,
            long_count: 0,
            last_block_with_data: 0,
            next_item_index: 0,
            next_item_block_index: 0,
            version: Version::default(),
        }
    }

    /// Creates an empty list sharing this list's pool and options.
    pub fn new_like(&self) -> LongList<T> {
        Self::from_parts(
            self.directory.pool().clone(),
            self.layout,
            self.parallel_search_threshold,
        )
    }

    /// Number of elements, saturated to `usize::MAX` where `usize` is narrower
    /// than 64 bits.
    #[inline]
    pub fn len(&self) -> usize {
        usize::try_from(self.long_count).unwrap_or(usize::MAX)
    }

    /// Number of elements.
    #[inline]
    pub fn long_len(&self) -> u64 {
        self.long_count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.long_count == 0
    }

    /// Number of elements the list holds without renting more blocks.
    #[inline]
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    #[inline]
    pub fn block_size(&self) -> usize {
        self.layout.block_size()
    }

    #[inline]
    pub fn layout(&self) -> BlockLayout {
        self.layout
    }

    #[inline]
    pub fn version(&self) -> Version {
        self.version
    }

    #[inline]
    pub fn pool(&self) -> &BlockPool<T> {
        self.directory.pool()
    }

    #[inline]
    pub fn parallel_search_threshold(&self) -> u64 {
        self.parallel_search_threshold
    }

    pub fn set_parallel_search_threshold(&mut self, threshold: u64) {
        self.parallel_search_threshold = threshold;
    }

    /// Number of blocks in the directory (`capacity / block_size`).
    #[inline]
    pub fn directory_len(&self) -> usize {
        self.directory.len()
    }

    /// The directory's blocks, including unused capacity past the last element.
    #[inline]
    pub fn blocks(&self) -> &[Block<T>] {
        self.directory.blocks()
    }

    #[inline]
    pub fn last_block_with_data(&self) -> usize {
        self.last_block_with_data
    }

    #[inline]
    pub fn next_item_index(&self) -> usize {
        self.next_item_index
    }

    #[inline]
    pub fn next_item_block_index(&self) -> usize {
        self.next_item_block_index
    }

    /// Iterates over the populated part of each block, in order.
    pub fn chunks(&self) -> impl Iterator<Item = &[T]> + '_ {
        let blocks = self.layout.blocks_for(self.long_count);
        let tail = self.next_item_index;
        self.directory.blocks()[..blocks]
            .iter()
            .enumerate()
            .map(move |(i, block)| {
                if i + 1 == blocks && tail != 0 {
                    &block[..tail]
                } else {
                    &block[..]
                }
            })
    }

    /// Appends an element.
    #[inline]
    pub fn push(&mut self, item: T) {
        if self.long_count == self.capacity {
            self.grow(self.long_count + 1);
        }
        let block = self.next_item_block_index;
        self.directory.blocks_mut()[block][self.next_item_index] = item;
        self.last_block_with_data = block;
        self.next_item_index += 1;
        if self.next_item_index == self.layout.block_size() {
            self.next_item_index = 0;
            self.next_item_block_index += 1;
        }
        self.long_count += 1;
        self.version.bump();
    }

    pub fn get(&self, index: u64) -> Result<&T> {
        verify_index!(index, index, self.long_count);
        let (block, offset) = self.layout.map_index(index);
        Ok(&self.directory.blocks()[block][offset])
    }

    pub fn get_mut(&mut self, index: u64) -> Result<&mut T> {
        verify_index!(index, index, self.long_count);
        let (block, offset) = self.layout.map_index(index);
        Ok(&mut self.directory.blocks_mut()[block][offset])
    }

    /// Replaces the element at `index`, returning the previous value.
    pub fn set(&mut self, index: u64, item: T) -> Result<T> {
        let slot = self.get_mut(index)?;
        let previous = std::mem::replace(slot, item);
        self.version.bump();
        Ok(previous)
    }

    pub fn first(&self) -> Result<&T> {
        if self.long_count == 0 {
            return Err(Error::empty("first"));
        }
        self.get(0)
    }

    pub fn last(&self) -> Result<&T> {
        if self.long_count == 0 {
            return Err(Error::empty("last"));
        }
        self.get(self.long_count - 1)
    }

    /// Inserts `item` at `index`, shifting every later element one slot right.
    ///
    /// `index == long_len()` appends.
    pub fn insert(&mut self, index: u64, item: T) -> Result<()> {
        if index > self.long_count {
            return Err(Error::index_out_of_range("index", index, self.long_count));
        }
        if index == self.long_count {
            self.push(item);
            return Ok(());
        }
        if self.long_count == self.capacity {
            self.grow(self.long_count + 1);
        }

        let block_size = self.layout.block_size();
        let (first_block, first_offset) = self.layout.map_index(index);
        let (last_block, last_offset) = self.layout.map_index(self.long_count);
        let blocks = self.directory.blocks_mut();
        // Each block's last element is carried into the head of the next block.
        let mut carry = item;
        for block in first_block..=last_block {
            let start = if block == first_block { first_offset } else { 0 };
            let end = if block == last_block {
                last_offset + 1
            } else {
                block_size
            };
            let slots = &mut blocks[block][start..end];
            slots.rotate_right(1);
            std::mem::swap(&mut slots[0], &mut carry);
        }

        self.long_count += 1;
        self.sync_cursor();
        self.version.bump();
        Ok(())
    }

    /// Removes and returns the element at `index`, shifting every later
    /// element one slot left.
    pub fn remove_at(&mut self, index: u64) -> Result<T> {
        verify_index!(index, index, self.long_count);

        let block_size = self.layout.block_size();
        let (first_block, first_offset) = self.layout.map_index(index);
        let (last_block, last_offset) = self.layout.map_index(self.long_count - 1);
        let blocks = self.directory.blocks_mut();
        // Walk backwards: each block's head is carried into the tail of the
        // previous block; the vacated last slot receives `T::default()`.
        let mut carry = T::default();
        for block in (first_block..=last_block).rev() {
            let start = if block == first_block { first_offset } else { 0 };
            let end = if block == last_block {
                last_offset + 1
            } else {
                block_size
            };
            let slots = &mut blocks[block][start..end];
            slots.rotate_left(1);
            std::mem::swap(&mut slots[end - start - 1], &mut carry);
        }

        self.long_count -= 1;
        self.sync_cursor();
        self.version.bump();
        Ok(carry)
    }

    /// Removes and returns the last element.
    pub fn pop(&mut self) -> Result<T> {
        if self.long_count == 0 {
            return Err(Error::empty("pop"));
        }
        let (block, offset) = self.layout.map_index(self.long_count - 1);
        let item = std::mem::take(&mut self.directory.blocks_mut()[block][offset]);
        self.long_count -= 1;
        self.sync_cursor();
        self.version.bump();
        Ok(item)
    }

    /// Swaps the elements at `a` and `b`.
    pub fn swap(&mut self, a: u64, b: u64) -> Result<()> {
        verify_index!(a, a, self.long_count);
        verify_index!(b, b, self.long_count);
        self.swap_slots(a, b);
        Ok(())
    }

    /// Swaps two slots; both indices must be below `long_len()`.
    pub(crate) fn swap_slots(&mut self, a: u64, b: u64) {
        let (block_a, offset_a) = self.layout.map_index(a);
        let (block_b, offset_b) = self.layout.map_index(b);
        let blocks = self.directory.blocks_mut();
        if block_a == block_b {
            blocks[block_a].swap(offset_a, offset_b);
        } else {
            let (lo, lo_offset, hi, hi_offset) = if block_a < block_b {
                (block_a, offset_a, block_b, offset_b)
            } else {
                (block_b, offset_b, block_a, offset_a)
            };
            let (head, tail) = blocks.split_at_mut(hi);
            std::mem::swap(&mut head[lo][lo_offset], &mut tail[0][hi_offset]);
        }
        self.version.bump();
    }

    /// Removes every element and returns all blocks to the pool.
    pub fn clear(&mut self) {
        self.directory.release();
        self.capacity = 0;
        self.long_count = 0;
        self.sync_cursor();
        self.version.bump();
    }

    /// Grows the capacity, following the doubling policy, so that at least
    /// `min_capacity` elements fit.
    pub fn ensure_capacity(&mut self, min_capacity: u64) {
        if min_capacity > self.capacity {
            self.grow(min_capacity);
        }
    }

    /// Makes room for at least `additional` more elements.
    pub fn reserve(&mut self, additional: u64) {
        self.ensure_capacity(self.long_count.saturating_add(additional));
    }

    /// Sets the capacity.
    ///
    /// Growing follows the doubling policy of [`ensure_capacity`]; shrinking
    /// rounds `capacity` up to a whole block and returns the surplus blocks to
    /// the pool. Fails when `capacity` is below the element count.
    ///
    /// [`ensure_capacity`]: Self::ensure_capacity
    pub fn set_capacity(&mut self, capacity: u64) -> Result<()> {
        verify_arg!(capacity, capacity >= self.long_count);
        if capacity > self.capacity {
            self.grow(capacity);
        } else {
            let aligned = self.layout.round_up(capacity);
            if aligned < self.capacity {
                self.resize_directory(aligned);
            }
        }
        Ok(())
    }

    /// Returns unused whole blocks to the pool.
    pub fn shrink_to_fit(&mut self) {
        let aligned = self.layout.round_up(self.long_count);
        if aligned < self.capacity {
            self.resize_directory(aligned);
        }
    }

    /// Starts a version-checked traversal.
    pub fn cursor(&self) -> VersionedCursor {
        VersionedCursor::new(self.version)
    }

    /// Iterates over the elements without version checks.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self.directory.blocks(), self.long_count)
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        let len = self.long_count;
        IterMut::new(self.directory.blocks_mut(), len)
    }

    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }

    #[cold]
    pub(crate) fn grow(&mut self, min_capacity: u64) {
        let capacity = self.layout.grown_capacity(self.capacity, min_capacity);
        log::trace!(
            "growing list capacity {} -> {} (block_size={})",
            self.capacity,
            capacity,
            self.layout.block_size()
        );
        self.resize_directory(capacity);
    }

    fn resize_directory(&mut self, capacity: u64) {
        let slots = self.layout.blocks_for(capacity);
        if capacity > self.capacity {
            self.directory.fill_to(slots, self.layout.block_size());
        } else {
            self.directory.truncate(slots);
        }
        self.capacity = capacity;
    }

    /// Recomputes the append position from `long_count`.
    pub(crate) fn sync_cursor(&mut self) {
        let (block, offset) = self.layout.map_index(self.long_count);
        self.next_item_block_index = block;
        self.next_item_index = offset;
        self.last_block_with_data = if self.long_count == 0 {
            0
        } else {
            self.layout.map_index(self.long_count - 1).0
        };
    }
}

impl<T: Default> Index<u64> for LongList<T> {
    type Output = T;

    /// # Panics
    ///
    /// Panics if `index` is out of bounds, same as slice indexing.
    #[inline]
    fn index(&self, index: u64) -> &T {
        match self.get(index) {
            Ok(item) => item,
            Err(e) => panic!("{e}"),
        }
    }
}

impl<T: Default> IndexMut<u64> for LongList<T> {
    #[inline]
    fn index_mut(&mut self, index: u64) -> &mut T {
        match self.get_mut(index) {
            Ok(item) => item,
            Err(e) => panic!("{e}"),
        }
    }
}

impl<'a, T: Default> IntoIterator for &'a LongList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<'a, T: Default> IntoIterator for &'a mut LongList<T> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> IterMut<'a, T> {
        self.iter_mut()
    }
}

impl<T: Default> Extend<T> for LongList<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.reserve(iter.size_hint().0 as u64);
        for item in iter {
            self.push(item);
        }
    }
}

impl<T: Default + Send + 'static> FromIterator<T> for LongList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = LongList::new();
        list.extend(iter);
        list
    }
}

impl<T: Default + Clone> Clone for LongList<T> {
    fn clone(&self) -> Self {
        let mut list = self.new_like();
        list.ensure_capacity(self.long_count);
        for chunk in self.chunks() {
            list.extend(chunk.iter().cloned());
        }
        list
    }
}

impl<T: Default + PartialEq> PartialEq for LongList<T> {
    fn eq(&self, other: &Self) -> bool {
        self.long_count == other.long_count && self.iter().eq(other.iter())
    }
}

impl<T: Default + std::fmt::Debug> std::fmt::Debug for LongList<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
