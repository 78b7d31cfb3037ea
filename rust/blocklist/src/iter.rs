//! Unversioned iteration over a list's blocks.

use std::iter::FusedIterator;

use blocklist_pool::Block;

/// Borrowing iterator over the elements of a [`LongList`](crate::LongList).
///
/// Walks the directory block by block. No version checks are performed: the
/// shared borrow already rules out mutation for the iterator's lifetime.
pub struct Iter<'a, T> {
    blocks: std::slice::Iter<'a, Block<T>>,
    current: std::slice::Iter<'a, T>,
    remaining: u64,
}

impl<'a, T> Iter<'a, T> {
    pub(crate) fn new(blocks: &'a [Block<T>], len: u64) -> Iter<'a, T> {
        Iter {
            blocks: blocks.iter(),
            current: Default::default(),
            remaining: len,
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<&'a T> {
        loop {
            if self.remaining == 0 {
                return None;
            }
            if let Some(item) = self.current.next() {
                self.remaining -= 1;
                return Some(item);
            }
            self.current = self.blocks.next()?.iter();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.remaining).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

/// Mutable counterpart of [`Iter`].
pub struct IterMut<'a, T> {
    blocks: std::slice::IterMut<'a, Block<T>>,
    current: std::slice::IterMut<'a, T>,
    remaining: u64,
}

impl<'a, T> IterMut<'a, T> {
    pub(crate) fn new(blocks: &'a mut [Block<T>], len: u64) -> IterMut<'a, T> {
        IterMut {
            blocks: blocks.iter_mut(),
            current: Default::default(),
            remaining: len,
        }
    }
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    #[inline]
    fn next(&mut self) -> Option<&'a mut T> {
        loop {
            if self.remaining == 0 {
                return None;
            }
            if let Some(item) = self.current.next() {
                self.remaining -= 1;
                return Some(item);
            }
            self.current = self.blocks.next()?.iter_mut();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.remaining).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}

impl<T> ExactSizeIterator for IterMut<'_, T> {}

impl<T> FusedIterator for IterMut<'_, T> {}
