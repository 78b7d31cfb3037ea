//! Index arithmetic and the capacity growth policy.

use blocklist_common::{Result, verify_arg};

/// Largest supported block size (elements).
pub const MAX_BLOCK_SIZE: usize = 1 << 30;

/// Maps logical 64-bit indices onto `(block, offset)` pairs for a power-of-two
/// block size, using shifts and masks only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockLayout {
    block_size: usize,
    shift: u32,
    mask: u64,
}

impl BlockLayout {
    pub fn new(block_size: usize) -> Result<BlockLayout> {
        verify_arg!(block_size, block_size > 1);
        verify_arg!(block_size, block_size.is_power_of_two());
        verify_arg!(block_size, block_size <= MAX_BLOCK_SIZE);
        Ok(Self::from_power_of_two(block_size))
    }

    const fn from_power_of_two(block_size: usize) -> BlockLayout {
        BlockLayout {
            block_size,
            shift: block_size.trailing_zeros(),
            mask: block_size as u64 - 1,
        }
    }

    #[inline]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// `log2(block_size)`.
    #[inline]
    pub fn shift(&self) -> u32 {
        self.shift
    }

    /// `block_size - 1`.
    #[inline]
    pub fn mask(&self) -> u64 {
        self.mask
    }

    /// Maps a logical index to a `(block, offset)` pair.
    #[inline]
    pub fn map_index(&self, index: u64) -> (usize, usize) {
        ((index >> self.shift) as usize, (index & self.mask) as usize)
    }

    /// Logical index of the first slot of `block`.
    #[inline]
    pub fn block_start(&self, block: usize) -> u64 {
        (block as u64) << self.shift
    }

    /// Number of whole blocks covering `capacity` elements.
    #[inline]
    pub fn blocks_for(&self, capacity: u64) -> usize {
        (self.round_up(capacity) >> self.shift) as usize
    }

    /// Largest capacity representable as a whole number of blocks.
    #[inline]
    pub fn max_capacity(&self) -> u64 {
        u64::MAX & !self.mask
    }

    /// Rounds `n` up to a multiple of the block size (saturating).
    #[inline]
    pub fn round_up(&self, n: u64) -> u64 {
        match n.checked_add(self.mask) {
            Some(n) => n & !self.mask,
            None => self.max_capacity(),
        }
    }

    /// Capacity after growing from `current` to hold at least `requested`
    /// elements.
    ///
    /// An empty list jumps straight to `requested` rounded up to a whole block;
    /// otherwise the capacity doubles until it reaches `requested`. The result
    /// is never below `current`.
    pub fn grown_capacity(&self, current: u64, requested: u64) -> u64 {
        if requested <= current {
            return current;
        }
        if current == 0 {
            return self.round_up(requested);
        }
        let mut capacity = current;
        while capacity < requested {
            capacity = match capacity.checked_mul(2) {
                Some(doubled) => doubled,
                None => return self.max_capacity(),
            };
        }
        capacity
    }
}

impl Default for BlockLayout {
    fn default() -> Self {
        Self::from_power_of_two(crate::options::DEFAULT_BLOCK_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_index_matches_div_mod() {
        let layout = BlockLayout::new(16).unwrap();
        for i in 0..1000u64 {
            let (block, offset) = layout.map_index(i);
            assert_eq!(block as u64, i / 16);
            assert_eq!(offset as u64, i % 16);
            assert_eq!(layout.block_start(block) + offset as u64, i);
        }
    }

    #[test]
    fn test_map_index_beyond_u32() {
        let layout = BlockLayout::default();
        let index = (1u64 << 40) + 12345;
        let (block, offset) = layout.map_index(index);
        assert_eq!(block as u64, index >> 14);
        assert_eq!(offset, 12345);
    }

    #[test]
    fn test_round_up_and_blocks_for() {
        let layout = BlockLayout::new(4).unwrap();
        assert_eq!(layout.round_up(0), 0);
        assert_eq!(layout.round_up(1), 4);
        assert_eq!(layout.round_up(4), 4);
        assert_eq!(layout.round_up(5), 8);
        assert_eq!(layout.blocks_for(0), 0);
        assert_eq!(layout.blocks_for(9), 3);
        assert_eq!(layout.round_up(u64::MAX), layout.max_capacity());
    }

    #[test]
    fn test_grown_capacity_from_empty() {
        let layout = BlockLayout::new(4).unwrap();
        assert_eq!(layout.grown_capacity(0, 1), 4);
        assert_eq!(layout.grown_capacity(0, 10), 12);
        assert_eq!(layout.grown_capacity(0, 0), 0);
    }

    #[test]
    fn test_grown_capacity_doubles() {
        let layout = BlockLayout::new(4).unwrap();
        assert_eq!(layout.grown_capacity(4, 5), 8);
        assert_eq!(layout.grown_capacity(4, 9), 16);
        assert_eq!(layout.grown_capacity(12, 13), 24);
        assert_eq!(layout.grown_capacity(12, 49), 96);
        assert_eq!(layout.grown_capacity(16, 3), 16);
    }

    #[test]
    fn test_grown_capacity_is_smallest_doubling() {
        let layout = BlockLayout::new(8).unwrap();
        for current in [8u64, 24, 64, 1000 * 8] {
            for requested in current + 1..current * 5 {
                let capacity = layout.grown_capacity(current, requested);
                assert!(capacity >= requested);
                assert_eq!(capacity % 8, 0);
                let ratio = capacity / current;
                assert!(ratio.is_power_of_two());
                assert!(capacity / 2 < requested, "{current} -> {requested}: {capacity}");
            }
        }
    }

    #[test]
    fn test_grown_capacity_saturates() {
        let layout = BlockLayout::new(4).unwrap();
        let current = 1u64 << 63;
        assert_eq!(
            layout.grown_capacity(current, current + 1),
            layout.max_capacity()
        );
    }

    #[test]
    fn test_invalid_layouts() {
        assert!(BlockLayout::new(0).is_err());
        assert!(BlockLayout::new(1).is_err());
        assert!(BlockLayout::new(6).is_err());
        assert!(BlockLayout::new(MAX_BLOCK_SIZE * 2).is_err());
        assert!(BlockLayout::new(2).is_ok());
    }
}
