use std::ops::{Deref, DerefMut};

/// A fixed-length buffer of `T`.
///
/// Every slot always holds a valid value: fresh blocks are filled with
/// `T::default()`, and a block returned to the pool keeps whatever values it
/// held unless it is cleared. The length never changes after construction.
pub struct Block<T> {
    slots: Box<[T]>,
}

impl<T: Default> Block<T> {
    /// Allocates a block of `size` default-initialized slots.
    pub fn new(size: usize) -> Block<T> {
        Block {
            slots: std::iter::repeat_with(T::default).take(size).collect(),
        }
    }

    /// Resets every slot to `T::default()`, dropping the previous values.
    pub fn clear(&mut self) {
        self.slots.fill_with(T::default);
    }
}

impl<T> Block<T> {
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.slots
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.slots
    }
}

impl<T> Deref for Block<T> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        &self.slots
    }
}

impl<T> DerefMut for Block<T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        &mut self.slots
    }
}

impl<T> std::fmt::Debug for Block<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Block").field("len", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_block_is_default_filled() {
        let block = Block::<u32>::new(8);
        assert_eq!(block.len(), 8);
        assert!(block.iter().all(|&v| v == 0));
    }

    #[test]
    fn test_clear_drops_values() {
        let mut block = Block::<String>::new(3);
        block[1] = "abc".to_string();
        block.clear();
        assert!(block.iter().all(String::is_empty));
        assert_eq!(block.len(), 3);
    }

    #[test]
    fn test_slice_views() {
        let mut block = Block::<u8>::new(3);
        block.as_mut_slice().copy_from_slice(&[1, 2, 3]);
        assert_eq!(block.as_slice(), &[1, 2, 3]);
        assert!(!block.is_empty());
    }
}
