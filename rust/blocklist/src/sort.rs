//! Comparison sort over any [`LongIndexed`] sequence.
//!
//! Short ranges use insertion sort; longer ones use quicksort with a Hoare
//! partition around a randomly chosen pivot. The pivot source is pluggable
//! through [`RandomIndexSource`] so tests can drive it deterministically.

use std::{cmp::Ordering, ops::Range};

use crate::{compat::LongIndexed, list::LongList};

/// Ranges shorter than this are insertion sorted.
pub const INSERTION_SORT_THRESHOLD: u64 = 16;

/// Source of pivot positions.
pub trait RandomIndexSource {
    /// Returns an index in `range`; `range` is never empty.
    fn next_index(&mut self, range: Range<u64>) -> u64;
}

/// [`RandomIndexSource`] backed by a `fastrand` generator.
#[derive(Debug, Clone)]
pub struct FastRandIndexSource(fastrand::Rng);

impl FastRandIndexSource {
    pub fn new() -> FastRandIndexSource {
        FastRandIndexSource(fastrand::Rng::new())
    }

    pub fn with_seed(seed: u64) -> FastRandIndexSource {
        FastRandIndexSource(fastrand::Rng::with_seed(seed))
    }
}

impl Default for FastRandIndexSource {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomIndexSource for FastRandIndexSource {
    #[inline]
    fn next_index(&mut self, range: Range<u64>) -> u64 {
        self.0.u64(range)
    }
}

/// Sorts `seq` in place with `compare`. Not stable.
pub fn sort_by<S, F, R>(seq: &mut S, mut compare: F, rng: &mut R)
where
    S: LongIndexed + ?Sized,
    F: FnMut(&S::Item, &S::Item) -> Ordering,
    R: RandomIndexSource + ?Sized,
{
    let len = seq.long_len();
    quicksort(seq, 0..len, &mut compare, rng);
}

fn quicksort<S, F, R>(seq: &mut S, range: Range<u64>, compare: &mut F, rng: &mut R)
where
    S: LongIndexed + ?Sized,
    F: FnMut(&S::Item, &S::Item) -> Ordering,
    R: RandomIndexSource + ?Sized,
{
    let Range { mut start, mut end } = range;
    while end - start > 1 {
        if end - start < INSERTION_SORT_THRESHOLD {
            insertion_sort(seq, start..end, compare);
            return;
        }
        let pivot = partition(seq, start..end, compare, rng);
        // Recurse into the smaller side, loop on the larger one.
        if pivot - start < end - pivot - 1 {
            quicksort(seq, start..pivot, compare, rng);
            start = pivot + 1;
        } else {
            quicksort(seq, pivot + 1..end, compare, rng);
            end = pivot;
        }
    }
}

fn insertion_sort<S, F>(seq: &mut S, range: Range<u64>, compare: &mut F)
where
    S: LongIndexed + ?Sized,
    F: FnMut(&S::Item, &S::Item) -> Ordering,
{
    for i in range.start + 1..range.end {
        let mut j = i;
        while j > range.start && compare(seq.at(j - 1), seq.at(j)) == Ordering::Greater {
            seq.swap_at(j - 1, j);
            j -= 1;
        }
    }
}

/// Partitions `range` (at least two elements) around a random pivot and
/// returns the pivot's final position. Everything before it compares
/// less than or equal, everything after it greater than or equal.
fn partition<S, F, R>(seq: &mut S, range: Range<u64>, compare: &mut F, rng: &mut R) -> u64
where
    S: LongIndexed + ?Sized,
    F: FnMut(&S::Item, &S::Item) -> Ordering,
    R: RandomIndexSource + ?Sized,
{
    let lo = range.start;
    let pivot = rng.next_index(range.clone());
    seq.swap_at(lo, pivot);

    let mut i = lo + 1;
    let mut j = range.end - 1;
    loop {
        while i <= j && compare(seq.at(i), seq.at(lo)) == Ordering::Less {
            i += 1;
        }
        while i <= j && compare(seq.at(j), seq.at(lo)) == Ordering::Greater {
            j -= 1;
        }
        if i >= j {
            break;
        }
        seq.swap_at(i, j);
        i += 1;
        j -= 1;
    }
    seq.swap_at(lo, j);
    j
}

impl<T: Default> LongList<T> {
    /// Sorts the list with `compare`, drawing pivots from a fresh
    /// [`FastRandIndexSource`]. Not stable.
    pub fn sort_by<F>(&mut self, compare: F)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        sort_by(self, compare, &mut FastRandIndexSource::new());
    }

    pub fn sort(&mut self)
    where
        T: Ord,
    {
        self.sort_by(T::cmp);
    }

    /// Sorts the list with `compare`, drawing pivots from `rng`.
    pub fn sort_with<F, R>(&mut self, compare: F, rng: &mut R)
    where
        F: FnMut(&T, &T) -> Ordering,
        R: RandomIndexSource + ?Sized,
    {
        sort_by(self, compare, rng);
    }

    /// Returns whether the list is sorted according to `compare`.
    pub fn is_sorted_by<F>(&self, mut compare: F) -> bool
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        let mut previous: Option<&T> = None;
        for item in self.iter() {
            if let Some(prev) = previous {
                if compare(prev, item) == Ordering::Greater {
                    return false;
                }
            }
            previous = Some(item);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Always picks the first index: the worst case for a naive quicksort.
    struct FirstIndex;

    impl RandomIndexSource for FirstIndex {
        fn next_index(&mut self, range: Range<u64>) -> u64 {
            range.start
        }
    }

    /// Cycles through offsets into the requested range.
    struct Cycling(u64);

    impl RandomIndexSource for Cycling {
        fn next_index(&mut self, range: Range<u64>) -> u64 {
            self.0 = self.0.wrapping_add(7);
            range.start + self.0 % (range.end - range.start)
        }
    }

    fn shuffled(n: u32, seed: u64) -> Vec<u32> {
        let mut rng = fastrand::Rng::with_seed(seed);
        let mut items = (0..n).collect::<Vec<_>>();
        rng.shuffle(&mut items);
        items
    }

    #[test]
    fn test_sort_vec_small_and_large() {
        for n in [0, 1, 2, 15, 16, 17, 100, 1000] {
            let mut items = shuffled(n, n as u64);
            sort_by(&mut items, u32::cmp, &mut Cycling(0));
            assert_eq!(items, (0..n).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_sort_with_worst_pivots() {
        let mut sorted = (0..500u32).collect::<Vec<_>>();
        sort_by(&mut sorted, u32::cmp, &mut FirstIndex);
        assert_eq!(sorted, (0..500).collect::<Vec<_>>());

        let mut reversed = (0..500u32).rev().collect::<Vec<_>>();
        sort_by(&mut reversed, u32::cmp, &mut FirstIndex);
        assert_eq!(reversed, (0..500).collect::<Vec<_>>());
    }

    #[test]
    fn test_sort_duplicates() {
        let mut rng = fastrand::Rng::with_seed(11);
        let mut items = (0..2000).map(|_| rng.u32(0..8)).collect::<Vec<_>>();
        let mut expected = items.clone();
        expected.sort();
        sort_by(&mut items, u32::cmp, &mut FastRandIndexSource::with_seed(3));
        assert_eq!(items, expected);
    }

    #[test]
    fn test_sort_list_across_blocks() {
        let mut list = LongList::<u32>::with_block_size(4).unwrap();
        list.extend(shuffled(300, 5));
        list.sort_with(u32::cmp, &mut Cycling(3));
        assert_eq!(list.to_vec(), (0..300).collect::<Vec<_>>());
        assert!(list.is_sorted_by(u32::cmp));

        list.sort_by(|a, b| b.cmp(a));
        assert_eq!(list.to_vec(), (0..300).rev().collect::<Vec<_>>());
        list.sort();
        assert_eq!(*list.first().unwrap(), 0);
        assert_eq!(*list.last().unwrap(), 299);
    }
}
