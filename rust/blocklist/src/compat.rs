//! Index-and-swap adapter shared by [`LongList`] and plain slices.
//!
//! Algorithms written against [`LongIndexed`] (such as
//! [`sort_by`](crate::sort::sort_by)) only need a length, read access by
//! logical index and an in-place swap, so they run unchanged on a
//! [`LongList`], a `Vec` or a slice.

use crate::list::LongList;

/// A sequence addressable by `u64` index whose elements can be swapped in
/// place.
pub trait LongIndexed {
    type Item;

    fn long_len(&self) -> u64;

    /// Returns the element at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.long_len()`.
    fn at(&self, index: u64) -> &Self::Item;

    /// Swaps the elements at `a` and `b`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    fn swap_at(&mut self, a: u64, b: u64);
}

impl<T: Default> LongIndexed for LongList<T> {
    type Item = T;

    #[inline]
    fn long_len(&self) -> u64 {
        self.long_count
    }

    #[inline]
    fn at(&self, index: u64) -> &T {
        &self[index]
    }

    #[inline]
    fn swap_at(&mut self, a: u64, b: u64) {
        if let Err(e) = self.swap(a, b) {
            panic!("{e}");
        }
    }
}

impl<T> LongIndexed for [T] {
    type Item = T;

    #[inline]
    fn long_len(&self) -> u64 {
        self.len() as u64
    }

    #[inline]
    fn at(&self, index: u64) -> &T {
        &self[to_usize(index)]
    }

    #[inline]
    fn swap_at(&mut self, a: u64, b: u64) {
        self.swap(to_usize(a), to_usize(b));
    }
}

impl<T> LongIndexed for Vec<T> {
    type Item = T;

    #[inline]
    fn long_len(&self) -> u64 {
        self.as_slice().long_len()
    }

    #[inline]
    fn at(&self, index: u64) -> &T {
        self.as_slice().at(index)
    }

    #[inline]
    fn swap_at(&mut self, a: u64, b: u64) {
        self.as_mut_slice().swap_at(a, b);
    }
}

#[inline]
fn to_usize(index: u64) -> usize {
    usize::try_from(index).unwrap_or(usize::MAX)
}
