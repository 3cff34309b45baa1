use std::{fmt, ops::Deref};

use parking_lot::MappedRwLockReadGuard;

use super::ResourceLease;
use crate::util::Result;

/// A value returned by `DB::get`, borrowed straight out of the memtable.
///
/// Writers to the same database wait until every pinned value is dropped,
/// so copy the bytes out with [`get_dup`] unless the value is needed only
/// briefly.
pub struct PinnedValue<'a> {
    value: MappedRwLockReadGuard<'a, [u8]>,
    _lease: ResourceLease<'a>,
}

impl<'a> PinnedValue<'a> {
    pub(crate) fn new(value: MappedRwLockReadGuard<'a, [u8]>, lease: ResourceLease<'a>) -> Self {
        Self {
            value,
            _lease: lease,
        }
    }
}

impl Deref for PinnedValue<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.value
    }
}

impl AsRef<[u8]> for PinnedValue<'_> {
    fn as_ref(&self) -> &[u8] {
        &self.value
    }
}

impl fmt::Debug for PinnedValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PinnedValue").field(&&*self.value).finish()
    }
}

/// Copy the result of a point lookup into an owned buffer, then release the
/// lookup.
///
/// A failed lookup is returned unchanged and nothing is copied.
///
/// ```
/// use rebelscan::{get_dup, DBConfig, DB};
///
/// let db = DB::open("doc", &DBConfig::new()).unwrap();
/// db.put(b"k", b"v").unwrap();
/// let value = get_dup(db.get(b"k")).unwrap();
/// assert_eq!(b"v".to_vec(), value);
/// assert_eq!(0, db.pinned_values());
/// ```
pub fn get_dup<V: AsRef<[u8]>>(lookup: Result<V>) -> Result<Vec<u8>> {
    let pinned = lookup?;
    let copy = pinned.as_ref().to_vec();
    drop(pinned);
    Ok(copy)
}
