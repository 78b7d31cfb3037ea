//! Sequential and parallel element search.

use std::{
    any::Any,
    convert::Infallible,
    ops::Range,
    panic::{AssertUnwindSafe, catch_unwind, resume_unwind},
    sync::{
        Mutex, PoisonError,
        atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
    },
};

use crate::list::LongList;

/// Number of consecutive blocks a single parallel task scans.
const BLOCKS_PER_TASK: usize = 4;

const NOT_FOUND: u64 = u64::MAX;

impl<T: Default> LongList<T> {
    /// Returns the index of the first element equal to `item`.
    ///
    /// Lists longer than [`parallel_search_threshold`] are scanned in
    /// parallel; the result is the same either way.
    ///
    /// [`parallel_search_threshold`]: Self::parallel_search_threshold
    pub fn index_of(&self, item: &T) -> Option<u64>
    where
        T: PartialEq + Sync,
    {
        self.position(|x| x == item)
    }

    /// Same as [`index_of`](Self::index_of).
    #[inline]
    pub fn long_index_of(&self, item: &T) -> Option<u64>
    where
        T: PartialEq + Sync,
    {
        self.index_of(item)
    }

    pub fn index_of_sequential(&self, item: &T) -> Option<u64>
    where
        T: PartialEq,
    {
        let found = self.scan_sequential(&|x: &T| Ok::<_, Infallible>(x == item));
        match found {
            Ok(index) => index,
            Err(never) => match never {},
        }
    }

    /// Scans the list in parallel regardless of its length.
    pub fn index_of_parallel(&self, item: &T) -> Option<u64>
    where
        T: PartialEq + Sync,
    {
        let found = self.scan_parallel(&|x: &T| Ok::<_, Infallible>(x == item));
        match found {
            Ok(index) => index,
            Err(never) => match never {},
        }
    }

    pub fn contains(&self, item: &T) -> bool
    where
        T: PartialEq + Sync,
    {
        self.index_of(item).is_some()
    }

    /// Returns the index of the first element matching `predicate`.
    pub fn position<P>(&self, predicate: P) -> Option<u64>
    where
        T: Sync,
        P: Fn(&T) -> bool + Sync,
    {
        match self.try_position(|x| Ok::<_, Infallible>(predicate(x))) {
            Ok(index) => index,
            Err(never) => match never {},
        }
    }

    /// Returns the index of the first element matching a fallible predicate.
    ///
    /// The first error raised by `predicate` is returned. In a parallel scan
    /// every worker runs to completion before the error surfaces, and a panic
    /// inside `predicate` is resumed on the calling thread.
    pub fn try_position<E, P>(&self, predicate: P) -> Result<Option<u64>, E>
    where
        T: Sync,
        E: Send,
        P: Fn(&T) -> Result<bool, E> + Sync,
    {
        if self.long_count > self.parallel_search_threshold {
            self.scan_parallel(&predicate)
        } else {
            self.scan_sequential(&predicate)
        }
    }

    /// Removes the first element equal to `item`; returns whether one was
    /// found.
    pub fn remove(&mut self, item: &T) -> bool
    where
        T: PartialEq + Sync,
    {
        match self.index_of(item) {
            Some(index) => self.remove_at(index).is_ok(),
            None => false,
        }
    }

    fn scan_sequential<E, P>(&self, predicate: &P) -> Result<Option<u64>, E>
    where
        P: Fn(&T) -> Result<bool, E>,
    {
        let (full_blocks, tail) = self.layout.map_index(self.long_count);
        let blocks = self.directory.blocks();
        let layout = &self.layout;

        let mut quads = blocks[..full_blocks].chunks_exact(4);
        let mut block = 0;
        for quad in &mut quads {
            if let Some(index) = scan_slice(&quad[0], layout.block_start(block), predicate)? {
                return Ok(Some(index));
            }
            if let Some(index) = scan_slice(&quad[1], layout.block_start(block + 1), predicate)? {
                return Ok(Some(index));
            }
            if let Some(index) = scan_slice(&quad[2], layout.block_start(block + 2), predicate)? {
                return Ok(Some(index));
            }
            if let Some(index) = scan_slice(&quad[3], layout.block_start(block + 3), predicate)? {
                return Ok(Some(index));
            }
            block += 4;
        }
        for rest in quads.remainder() {
            if let Some(index) = scan_slice(rest, layout.block_start(block), predicate)? {
                return Ok(Some(index));
            }
            block += 1;
        }
        if tail != 0 {
            return scan_slice(
                &blocks[full_blocks][..tail],
                layout.block_start(full_blocks),
                predicate,
            );
        }
        Ok(None)
    }

    fn scan_parallel<E, P>(&self, predicate: &P) -> Result<Option<u64>, E>
    where
        T: Sync,
        E: Send,
        P: Fn(&T) -> Result<bool, E> + Sync,
    {
        let (full_blocks, tail) = self.layout.map_index(self.long_count);
        let blocks = self.directory.blocks();
        let layout = self.layout;
        let tasks = plan_tasks(full_blocks);
        log::debug!(
            "parallel search over {} elements: {} tasks, tail of {}",
            self.long_count,
            tasks.len(),
            tail
        );

        let ctx = SearchContext::new(tasks.len() + usize::from(tail != 0));
        rayon::scope(|scope| {
            let ctx = &ctx;
            for task in tasks {
                scope.spawn(move |_| {
                    ctx.run(
                        task.map(move |b| (layout.block_start(b), blocks[b].as_slice())),
                        predicate,
                    );
                });
            }
            if tail != 0 {
                let last = (
                    layout.block_start(full_blocks),
                    &blocks[full_blocks][..tail],
                );
                ctx.run(std::iter::once(last), predicate);
            }
        });
        debug_assert_eq!(ctx.pending.load(Ordering::Acquire), 0);
        ctx.into_result()
    }
}

fn scan_slice<T, E, P>(slots: &[T], base: u64, predicate: &P) -> Result<Option<u64>, E>
where
    P: Fn(&T) -> Result<bool, E>,
{
    for (i, slot) in slots.iter().enumerate() {
        if predicate(slot)? {
            return Ok(Some(base + i as u64));
        }
    }
    Ok(None)
}

/// Splits `full_blocks` blocks into ranges of [`BLOCKS_PER_TASK`] blocks,
/// followed by single-block ranges for the remainder.
fn plan_tasks(full_blocks: usize) -> Vec<Range<usize>> {
    let grouped = full_blocks - full_blocks % BLOCKS_PER_TASK;
    let mut tasks = Vec::with_capacity(grouped / BLOCKS_PER_TASK + BLOCKS_PER_TASK);
    tasks.extend(
        (0..grouped)
            .step_by(BLOCKS_PER_TASK)
            .map(|start| start..start + BLOCKS_PER_TASK),
    );
    tasks.extend((grouped..full_blocks).map(|b| b..b + 1));
    tasks
}

enum SearchFailure<E> {
    Error(E),
    Panic(Box<dyn Any + Send>),
}

/// State shared by the participants of a parallel search.
struct SearchContext<E> {
    found: AtomicBool,
    /// Lowest matching index recorded so far, `NOT_FOUND` if none.
    lowest: AtomicU64,
    failed: AtomicBool,
    /// First captured failure; written once, by whoever flips `failed`.
    failure: Mutex<Option<SearchFailure<E>>>,
    pending: AtomicUsize,
}

impl<E> SearchContext<E> {
    fn new(participants: usize) -> SearchContext<E> {
        SearchContext {
            found: AtomicBool::new(false),
            lowest: AtomicU64::new(NOT_FOUND),
            failed: AtomicBool::new(false),
            failure: Mutex::new(None),
            pending: AtomicUsize::new(participants),
        }
    }

    /// Whether the slots starting at `base` can no longer produce a better
    /// result.
    #[inline]
    fn is_settled(&self, base: u64) -> bool {
        self.failed.load(Ordering::Acquire)
            || (self.found.load(Ordering::Acquire) && self.lowest.load(Ordering::Acquire) <= base)
    }

    fn run<'a, T, P>(&self, slices: impl Iterator<Item = (u64, &'a [T])>, predicate: &P)
    where
        T: 'a,
        P: Fn(&T) -> Result<bool, E>,
    {
        let outcome = catch_unwind(AssertUnwindSafe(|| -> Result<Option<u64>, E> {
            for (base, slots) in slices {
                if self.is_settled(base) {
                    break;
                }
                if let Some(index) = scan_slice(slots, base, predicate)? {
                    return Ok(Some(index));
                }
            }
            Ok(None)
        }));
        match outcome {
            Ok(Ok(Some(index))) => self.record(index),
            Ok(Ok(None)) => (),
            Ok(Err(e)) => self.fail(SearchFailure::Error(e)),
            Err(payload) => self.fail(SearchFailure::Panic(payload)),
        }
        self.pending.fetch_sub(1, Ordering::AcqRel);
    }

    fn record(&self, index: u64) {
        self.lowest.fetch_min(index, Ordering::AcqRel);
        self.found.store(true, Ordering::Release);
    }

    fn fail(&self, failure: SearchFailure<E>) {
        if !self.failed.swap(true, Ordering::AcqRel) {
            *self.failure.lock().unwrap_or_else(PoisonError::into_inner) = Some(failure);
        }
    }

    fn into_result(self) -> Result<Option<u64>, E> {
        let failure = self
            .failure
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        match failure {
            Some(SearchFailure::Error(e)) => Err(e),
            Some(SearchFailure::Panic(payload)) => resume_unwind(payload),
            None => match self.lowest.into_inner() {
                NOT_FOUND => Ok(None),
                index => Ok(Some(index)),
            },
        }
    }
}
