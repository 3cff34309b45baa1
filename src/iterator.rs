//! Cursor traits consumed by the scan helpers.

use crate::{db::ReadConfig, util::Result};

/// A forward cursor over an ordered keyspace.
///
/// A fresh cursor is unpositioned and not valid. Key and value slices are
/// only valid until the cursor is moved or dropped. Dropping the cursor
/// releases whatever the storage engine holds for it.
pub trait Cursor {
    fn valid(&self) -> bool;
    /// Position at the first entry within the bounds.
    fn seek_to_first(&mut self);
    /// Position at the first entry with key >= `target`, clipped to the
    /// lower bound.
    fn seek(&mut self, target: &[u8]);
    /// Requires `valid()`.
    fn next(&mut self);
    /// Requires `valid()`.
    fn key(&self) -> &[u8];
    /// Requires `valid()`.
    fn value(&self) -> &[u8];
    /// Error encountered while positioning, if any. A cursor that hit an
    /// error is not valid.
    fn status(&self) -> Result<()>;
}

/// A storage handle that hands out cursors restricted to a bound pair.
///
/// Each call returns an independent cursor owned by the caller. Opening can
/// fail; there is no retry at this layer.
pub trait CursorSource {
    type Cursor<'a>: Cursor
    where
        Self: 'a;

    fn open_cursor(&self, config: &ReadConfig) -> Result<Self::Cursor<'_>>;
}
