//! Range insertion: re-lays out the blocks from the splice point onward.

use blocklist_common::{Result, error::Error};
use blocklist_pool::BlockPool;

use crate::{directory::BlockDirectory, layout::BlockLayout, list::LongList};

/// Sequential writer filling a fresh directory block by block.
///
/// The directory it builds is dropped, and its blocks returned to the pool,
/// if the writer is abandoned halfway.
struct BlockWriter<T: Default> {
    directory: BlockDirectory<T>,
    block_size: usize,
    /// Write offset within the last block; `block_size` once that block is full.
    offset: usize,
}

impl<T: Default> BlockWriter<T> {
    fn new(pool: BlockPool<T>, slots: usize, block_size: usize) -> BlockWriter<T> {
        BlockWriter {
            directory: BlockDirectory::with_slots(pool, slots),
            block_size,
            offset: block_size,
        }
    }

    /// Appends a block that is already full.
    fn push_full(&mut self, block: blocklist_pool::Block<T>) {
        self.directory.push(block);
        self.offset = self.block_size;
    }

    /// Returns the writable tail of the last block, renting a new block when
    /// the current one is full.
    fn room(&mut self) -> &mut [T] {
        if self.offset == self.block_size {
            let block = self.directory.rent_block(self.block_size);
            self.directory.push(block);
            self.offset = 0;
        }
        let offset = self.offset;
        match self.directory.last_mut() {
            Some(block) => &mut block[offset..],
            None => &mut [],
        }
    }

    fn write(&mut self, item: T) {
        self.room()[0] = item;
        self.offset += 1;
    }

    /// Moves as much of `src` as fits into the current block, leaving the
    /// displaced slot values behind in `src`. Returns the number moved.
    fn write_swapped(&mut self, src: &mut [T]) -> usize {
        let room = self.room();
        let n = room.len().min(src.len());
        room[..n].swap_with_slice(&mut src[..n]);
        self.offset += n;
        n
    }

    fn finish(self) -> BlockDirectory<T> {
        self.directory
    }
}

impl<T: Default> LongList<T> {
    /// Inserts `items` at `index`, shifting every element at or after `index`
    /// right by the number of inserted items.
    ///
    /// Blocks before the one holding `index` are moved into the new layout
    /// without touching their elements; everything from the splice point on is
    /// streamed into freshly rented blocks and the old blocks go back to the
    /// pool. Inserting at `long_len()` is a bulk append and an empty `items`
    /// is a no-op.
    ///
    /// If `items` panics, the list is left empty.
    pub fn insert_range<I>(&mut self, index: u64, items: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        if index > self.long_count {
            return Err(Error::index_out_of_range("index", index, self.long_count));
        }
        let items = items.into_iter();
        let inserted = items.len() as u64;
        if inserted == 0 {
            return Ok(());
        }
        let Some(total) = self.long_count.checked_add(inserted) else {
            return Err(Error::invalid_arg("items", "list length overflows u64"));
        };
        if index == self.long_count {
            self.ensure_capacity(total);
            for item in items {
                self.push(item);
            }
            return Ok(());
        }

        let layout = self.layout;
        let old_count = self.long_count;
        let planned = layout.grown_capacity(self.capacity, total);
        log::trace!(
            "splicing {} items at {} into list of {} (capacity {} -> {})",
            inserted,
            index,
            old_count,
            self.capacity,
            planned
        );

        // Detach the old directory and leave the list empty until the new
        // layout is installed.
        let pool = self.directory.pool().clone();
        let mut old = std::mem::replace(&mut self.directory, BlockDirectory::new(pool.clone()));
        self.capacity = 0;
        self.long_count = 0;
        self.sync_cursor();
        self.version.bump();

        let (target_block, offset) = layout.map_index(index);
        let mut writer = BlockWriter::new(pool, layout.blocks_for(planned), layout.block_size());
        for block in old.drain_front(target_block) {
            writer.push_full(block);
        }
        // `old` now starts at the target block.
        if offset != 0 {
            writer.write_swapped(&mut old.blocks_mut()[0][..offset]);
        }

        let mut written = 0u64;
        for item in items {
            writer.write(item);
            written += 1;
        }

        move_suffix(&mut writer, &mut old, &layout, index, old_count, target_block);

        let count = old_count + written;
        let capacity = layout.grown_capacity(planned, count);
        let mut directory = writer.finish();
        directory.fill_to(layout.blocks_for(capacity), layout.block_size());

        self.directory = directory;
        self.capacity = capacity;
        self.long_count = count;
        self.sync_cursor();
        self.version.bump();
        Ok(())
    }
}

/// Streams the elements `start..count` of the old layout into `writer`.
/// `old` holds the old blocks from `first_block` onward.
fn move_suffix<T: Default>(
    writer: &mut BlockWriter<T>,
    old: &mut BlockDirectory<T>,
    layout: &BlockLayout,
    start: u64,
    count: u64,
    first_block: usize,
) {
    let mut pos = start;
    while pos < count {
        let (block, offset) = layout.map_index(pos);
        let available = (layout.block_size() - offset).min((count - pos) as usize);
        let src = &mut old.blocks_mut()[block - first_block][offset..offset + available];
        let mut moved = 0;
        while moved < available {
            moved += writer.write_swapped(&mut src[moved..]);
        }
        pos += available as u64;
    }
}
