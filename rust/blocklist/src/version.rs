//! Generation counter and the versioned cursor.

use blocklist_common::{Result, error::Error};

use crate::list::LongList;

/// Generation number of a list, bumped on every mutation.
///
/// Wraps around on overflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Version(u64);

impl Version {
    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }

    #[inline]
    pub(crate) fn bump(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }
}

/// Detached, version-checked position over a [`LongList`].
///
/// Unlike [`LongList::iter`], a cursor does not borrow the list between steps,
/// so the list may be mutated while the cursor is alive. Every step compares
/// the list's current [`Version`] with the one captured when the cursor was
/// created and fails with a concurrent-modification error on mismatch.
///
/// ```
/// use blocklist::LongList;
///
/// let mut list = LongList::<u32>::with_block_size(4).unwrap();
/// list.extend(0..3);
///
/// let mut cursor = list.cursor();
/// assert_eq!(cursor.advance(&list).unwrap(), Some(&0));
///
/// list.push(3);
/// assert!(cursor.advance(&list).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct VersionedCursor {
    position: u64,
    version: Version,
}

impl VersionedCursor {
    pub(crate) fn new(version: Version) -> VersionedCursor {
        VersionedCursor {
            position: 0,
            version,
        }
    }

    /// Logical index of the element the next step yields.
    #[inline]
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Version snapshot taken when the cursor was created or last reset.
    #[inline]
    pub fn version(&self) -> Version {
        self.version
    }

    /// Yields the next element, `Ok(None)` past the end, or an
    /// invalid-operation error if `list` was mutated since the snapshot.
    pub fn advance<'a, T: Default>(&mut self, list: &'a LongList<T>) -> Result<Option<&'a T>> {
        if list.version() != self.version {
            return Err(Error::concurrent_modification());
        }
        if self.position >= list.long_len() {
            return Ok(None);
        }
        let item = list.get(self.position)?;
        self.position += 1;
        Ok(Some(item))
    }

    /// Rewinds the cursor and re-captures the list's version.
    pub fn reset<T: Default>(&mut self, list: &LongList<T>) {
        self.position = 0;
        self.version = list.version();
    }
}
