//! Pool retention limits.

use blocklist_common::{Result, verify_arg};

/// Blocks shorter than this many elements are allocated and dropped directly.
pub const DEFAULT_MIN_POOLED_BLOCK_SIZE: usize = 64;

/// Maximum number of free blocks kept per bucket.
pub const DEFAULT_MAX_RETAINED_BLOCKS: usize = 64;

/// Directory spines with fewer slots than this are not pooled.
pub const DEFAULT_MIN_POOLED_DIRECTORY_LEN: usize = 64;

/// Maximum number of free directory spines kept by a pool.
pub const DEFAULT_MAX_RETAINED_DIRECTORIES: usize = 16;

/// Configuration of a [`BlockPool`](crate::BlockPool).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    /// Smallest block length (in elements) that goes through a bucket.
    pub min_pooled_block_size: usize,
    /// Number of blocks allocated up front when a bucket is created.
    pub min_retained_blocks: usize,
    /// Upper bound on the free blocks retained by a single bucket.
    pub max_retained_blocks: usize,
    /// Smallest directory spine capacity (in slots) that is pooled.
    pub min_pooled_directory_len: usize,
    /// Upper bound on the free directory spines retained by the pool.
    pub max_retained_directories: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        PoolConfig {
            min_pooled_block_size: DEFAULT_MIN_POOLED_BLOCK_SIZE,
            min_retained_blocks: 0,
            max_retained_blocks: DEFAULT_MAX_RETAINED_BLOCKS,
            min_pooled_directory_len: DEFAULT_MIN_POOLED_DIRECTORY_LEN,
            max_retained_directories: DEFAULT_MAX_RETAINED_DIRECTORIES,
        }
    }
}

impl PoolConfig {
    /// A configuration that retains nothing: every rent allocates and every
    /// return drops.
    pub fn unpooled() -> PoolConfig {
        PoolConfig {
            max_retained_blocks: 0,
            max_retained_directories: 0,
            ..Default::default()
        }
    }

    pub fn with_max_retained_blocks(mut self, max_retained_blocks: usize) -> Self {
        self.max_retained_blocks = max_retained_blocks;
        self
    }

    pub fn with_min_retained_blocks(mut self, min_retained_blocks: usize) -> Self {
        self.min_retained_blocks = min_retained_blocks;
        self
    }

    pub fn with_min_pooled_block_size(mut self, min_pooled_block_size: usize) -> Self {
        self.min_pooled_block_size = min_pooled_block_size;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        verify_arg!(min_pooled_block_size, self.min_pooled_block_size > 0);
        verify_arg!(
            min_retained_blocks,
            self.min_retained_blocks <= self.max_retained_blocks
        );
        Ok(())
    }
}
