//! Lazy, forward-only scans over a [`CursorSource`].
//!
//! A scan owns one cursor from the moment it is created. Nothing is read
//! until the first pull; the cursor is released as soon as the scan runs
//! out of entries, hits an error, or is dropped, whichever comes first.
//!
//! ```
//! use rebelscan::{scan, DBConfig, DB};
//!
//! let db = DB::open("doc", &DBConfig::new()).unwrap();
//! for (key, value) in [("a", "1"), ("ab", "2"), ("b", "3")] {
//!     db.put(key.as_bytes(), value.as_bytes()).unwrap();
//! }
//! let keys: Vec<Vec<u8>> = scan::prefix(&db, b"a", None)
//!     .unwrap()
//!     .map(|entry| entry.unwrap().0)
//!     .collect();
//! assert_eq!(vec![b"a".to_vec(), b"ab".to_vec()], keys);
//! assert_eq!(0, db.open_cursors());
//! ```

use std::{fmt, iter::FusedIterator, mem, ops::ControlFlow};

use tracing::trace;

pub use self::bound::{exclusive_upper_bound, UpperBound};
use crate::{
    db::ReadConfig,
    iterator::{Cursor, CursorSource},
    util::Result,
};

mod bound;

/// An owned key/value pair copied out of a scan.
pub type KeyValue = (Vec<u8>, Vec<u8>);

enum Start {
    Seek(Vec<u8>),
    First,
    Started,
}

/// A lazy sequence of key/value pairs in ascending key order.
///
/// Pull borrowed entries with [`Scan::next_entry`], push them into a
/// callback with [`Scan::visit`], or use it as an [`Iterator`] of owned
/// pairs. After the first `None` or error, every later pull returns `None`.
pub struct Scan<C: Cursor> {
    cursor: Option<C>,
    start: Start,
    yielded: usize,
}

impl<C: Cursor> Scan<C> {
    fn new(cursor: C, seek: Option<&[u8]>) -> Self {
        Self {
            cursor: Some(cursor),
            start: seek.map_or(Start::First, |target| Start::Seek(target.to_vec())),
            yielded: 0,
        }
    }

    /// Advance and borrow the next entry. The slices are valid until the
    /// next call.
    pub fn next_entry(&mut self) -> Option<Result<(&[u8], &[u8])>> {
        let cursor = self.cursor.as_mut()?;
        match mem::replace(&mut self.start, Start::Started) {
            Start::Seek(target) => cursor.seek(&target),
            Start::First => cursor.seek_to_first(),
            Start::Started => cursor.next(),
        }
        if !cursor.valid() {
            let status = cursor.status();
            self.release(if status.is_ok() { "exhausted" } else { "error" });
            return status.err().map(Err);
        }
        self.yielded += 1;
        let cursor = self.cursor.as_ref()?;
        Some(Ok((cursor.key(), cursor.value())))
    }

    /// Feed every entry to `f` until it breaks or the scan ends.
    ///
    /// Returns the first error the cursor reports. Breaking early is not an
    /// error.
    pub fn visit<F>(mut self, mut f: F) -> Result<()>
    where
        F: FnMut(&[u8], &[u8]) -> ControlFlow<()>,
    {
        while let Some(entry) = self.next_entry() {
            let (key, value) = entry?;
            if f(key, value).is_break() {
                break;
            }
        }
        Ok(())
    }

    /// Whether the cursor has been released.
    pub fn is_finished(&self) -> bool {
        self.cursor.is_none()
    }

    fn release(&mut self, reason: &'static str) {
        if self.cursor.take().is_some() {
            trace!(yielded = self.yielded, reason, "scan released cursor");
        }
    }
}

impl<C: Cursor> Iterator for Scan<C> {
    type Item = Result<KeyValue>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_entry()
            .map(|entry| entry.map(|(key, value)| (key.to_vec(), value.to_vec())))
    }
}

impl<C: Cursor> FusedIterator for Scan<C> {}

impl<C: Cursor> Drop for Scan<C> {
    fn drop(&mut self) {
        self.release("dropped");
    }
}

impl<C: Cursor> fmt::Debug for Scan<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scan")
            .field("yielded", &self.yielded)
            .field("finished", &self.is_finished())
            .finish()
    }
}

/// Every entry whose key starts with `prefix`, in ascending order.
///
/// With `seek`, the scan starts at the first key >= `seek` inside the
/// prefix. An empty prefix matches every key.
pub fn prefix<'a, S>(
    source: &'a S,
    prefix: &[u8],
    seek: Option<&[u8]>,
) -> Result<Scan<S::Cursor<'a>>>
where
    S: CursorSource + ?Sized,
{
    let cursor = prefix_cursor(source, prefix)?;
    Ok(Scan::new(cursor, seek))
}

/// Open an unpositioned cursor restricted to the keys starting with
/// `prefix`.
pub fn prefix_cursor<'a, S>(source: &'a S, prefix: &[u8]) -> Result<S::Cursor<'a>>
where
    S: CursorSource + ?Sized,
{
    let mut config = ReadConfig::new();
    if !prefix.is_empty() {
        config = config.with_lower_bound(prefix);
        config.upper_bound = prefix_upper_bound(prefix)?;
    }
    source.open_cursor(&config)
}

/// Shortest key above every key starting with `prefix`, or `None` if no
/// such key exists.
fn prefix_upper_bound(prefix: &[u8]) -> Result<Option<Vec<u8>>> {
    Ok(exclusive_upper_bound(prefix)?.into_option().map(|mut bound| {
        // zeros left by the carry would admit bound[..i] itself, which sorts
        // below bound but does not start with the prefix
        while bound.last() == Some(&0) {
            bound.pop();
        }
        bound
    }))
}

/// Every entry in the source, starting at the first key >= `seek` if given.
pub fn all<'a, S>(source: &'a S, seek: Option<&[u8]>) -> Result<Scan<S::Cursor<'a>>>
where
    S: CursorSource + ?Sized,
{
    let cursor = source.open_cursor(&ReadConfig::new())?;
    Ok(Scan::new(cursor, seek))
}

/// Every entry with `start <= key < end`. `None` leaves the end open.
pub fn range<'a, S>(
    source: &'a S,
    start: &[u8],
    end: Option<&[u8]>,
) -> Result<Scan<S::Cursor<'a>>>
where
    S: CursorSource + ?Sized,
{
    let mut config = ReadConfig::new().with_lower_bound(start);
    config.upper_bound = end.map(<[u8]>::to_vec);
    let cursor = source.open_cursor(&config)?;
    Ok(Scan::new(cursor, None))
}
