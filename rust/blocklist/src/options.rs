//! Per-list configuration.

use blocklist_common::Result;

use crate::layout::BlockLayout;

/// Default number of elements per block.
pub const DEFAULT_BLOCK_SIZE: usize = 16 * 1024;

/// Lists with more elements than this are searched in parallel.
pub const DEFAULT_PARALLEL_SEARCH_THRESHOLD: u64 = 850_000;

/// Configuration of a [`LongList`](crate::LongList).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListOptions {
    /// Number of elements per block. Must be a power of two greater than 1.
    pub block_size: usize,
    /// Element count above which `index_of` fans out across worker threads.
    pub parallel_search_threshold: u64,
}

impl Default for ListOptions {
    fn default() -> Self {
        ListOptions {
            block_size: DEFAULT_BLOCK_SIZE,
            parallel_search_threshold: DEFAULT_PARALLEL_SEARCH_THRESHOLD,
        }
    }
}

impl ListOptions {
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    pub fn with_parallel_search_threshold(mut self, threshold: u64) -> Self {
        self.parallel_search_threshold = threshold;
        self
    }

    /// Validates the options and returns the block layout they describe.
    pub fn layout(&self) -> Result<BlockLayout> {
        BlockLayout::new(self.block_size)
    }

    pub fn validate(&self) -> Result<()> {
        self.layout().map(|_| ())
    }
}
