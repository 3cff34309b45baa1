//! In-memory database handle: point writes and lookups plus bounded,
//! snapshot-consistent cursors.

use std::{
    fmt,
    sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
};

use parking_lot::{RwLock, RwLockReadGuard};
use tracing::{debug, warn};

pub use self::{
    config::{DBConfig, ReadConfig},
    db_iter::DBIter,
    pinned::{get_dup, PinnedValue},
    write_batch::{WriteBatch, WriteBatchHandler},
};
use crate::{
    dbformat::{InternalKeyComparator, LookupKey, SequenceNumber, MAX_SEQUENCE_NUMBER},
    iterator::CursorSource,
    memtable::MemTable,
    util::BytewiseComparator,
    Error, Result,
};

mod config;
mod db_iter;
mod pinned;
mod write_batch;

/// Counted claim on a handle resource, returned on drop.
pub(crate) struct ResourceLease<'a> {
    counter: &'a AtomicUsize,
}

impl<'a> ResourceLease<'a> {
    fn acquire(counter: &'a AtomicUsize, limit: Option<usize>) -> Result<Self> {
        counter
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |open| match limit {
                Some(limit) if open >= limit => None,
                _ => Some(open + 1),
            })
            .map_err(|open| {
                Error::resource_exhausted(&format!("limit reached with {} already open", open))
            })?;
        Ok(Self { counter })
    }
}

impl Drop for ResourceLease<'_> {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::AcqRel);
    }
}

pub struct DB {
    name: String,
    config: DBConfig,
    mem: RwLock<MemTable>,
    last_sequence: AtomicU64,
    open_cursors: AtomicUsize,
    pinned_values: AtomicUsize,
    closed: AtomicBool,
}

impl DB {
    pub fn open(name: &str, config: &DBConfig) -> Result<Self> {
        if name.is_empty() {
            return Err(Error::invalid_argument("database name is empty"));
        }
        let comparator = InternalKeyComparator::new(Box::new(BytewiseComparator::new()));
        debug!(db = name, max_open_cursors = ?config.max_open_cursors, "opened database");
        Ok(Self {
            name: name.to_owned(),
            config: config.clone(),
            mem: RwLock::new(MemTable::new(comparator)),
            last_sequence: AtomicU64::new(0),
            open_cursors: AtomicUsize::new(0),
            pinned_values: AtomicUsize::new(0),
            closed: AtomicBool::new(false),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        let mut batch = WriteBatch::new();
        batch.put(key, value);
        self.write(&batch)
    }

    pub fn delete(&self, key: &[u8]) -> Result<()> {
        let mut batch = WriteBatch::new();
        batch.delete(key);
        self.write(&batch)
    }

    /// Apply every update in `updates` atomically: a cursor opened
    /// concurrently sees all of them or none.
    pub fn write(&self, updates: &WriteBatch) -> Result<()> {
        self.check_open()?;
        if updates.is_empty() {
            return Ok(());
        }
        let mut mem = self.mem.write();
        let first = self.last_sequence.load(Ordering::Acquire) + 1;
        let last = first + u64::from(updates.count()) - 1;
        if last > MAX_SEQUENCE_NUMBER {
            return Err(Error::not_supported("sequence numbers exhausted"));
        }
        let mut batch = updates.clone();
        batch.set_sequence(first);
        batch.insert_into(&mut mem)?;
        // publish only after the whole batch is in the memtable
        self.last_sequence.store(last, Ordering::Release);
        Ok(())
    }

    /// Look up `key`, returning its value pinned in place.
    ///
    /// Returns a NotFound error if the key is absent or deleted.
    pub fn get(&self, key: &[u8]) -> Result<PinnedValue<'_>> {
        self.check_open()?;
        let lease = ResourceLease::acquire(&self.pinned_values, None)?;
        let mem = self.mem.read_recursive();
        let snapshot = self.last_sequence.load(Ordering::Acquire);
        let position = match mem.get(&LookupKey::new(key, snapshot)) {
            Some(Ok(position)) => position,
            Some(Err(error)) => return Err(error),
            None => return Err(Error::not_found("key not found")),
        };
        let value = RwLockReadGuard::map(mem, |mem| mem.value(position));
        Ok(PinnedValue::new(value, lease))
    }

    /// Open a cursor restricted to the bound pair in `config`.
    ///
    /// Fails if the handle is closed, the bounds are inverted, or the
    /// configured cursor limit is reached.
    pub fn new_iterator(&self, config: &ReadConfig) -> Result<DBIter<'_>> {
        self.check_open()?;
        config.validate()?;
        let lease = ResourceLease::acquire(&self.open_cursors, self.config.max_open_cursors)?;
        let snapshot = self.last_sequence.load(Ordering::Acquire);
        debug!(
            db = %self.name,
            snapshot,
            lower = ?config.lower_bound,
            upper = ?config.upper_bound,
            "opened cursor"
        );
        Ok(DBIter::new(&self.mem, config.clone(), snapshot, lease))
    }

    pub fn open_cursors(&self) -> usize {
        self.open_cursors.load(Ordering::Acquire)
    }

    pub fn pinned_values(&self) -> usize {
        self.pinned_values.load(Ordering::Acquire)
    }

    pub fn last_sequence(&self) -> SequenceNumber {
        self.last_sequence.load(Ordering::Acquire)
    }

    pub fn approximate_memory_usage(&self) -> usize {
        self.mem.read_recursive().approximate_memory_usage()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Close the handle. Later operations fail with a Closed error.
    ///
    /// Outstanding cursors or pinned values are reported as a Busy error;
    /// the handle is closed regardless.
    pub fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Err(Error::closed("database already closed"));
        }
        let cursors = self.open_cursors();
        let pinned = self.pinned_values();
        if cursors > 0 || pinned > 0 {
            warn!(db = %self.name, cursors, pinned, "closed database with leaked resources");
            return Err(Error::busy(&format!(
                "leaked {} cursors and {} pinned values",
                cursors, pinned
            )));
        }
        debug!(db = %self.name, last_sequence = self.last_sequence(), "closed database");
        Ok(())
    }

    fn check_open(&self) -> Result<()> {
        if self.is_closed() {
            Err(Error::closed(&format!("database {} is closed", self.name)))
        } else {
            Ok(())
        }
    }
}

impl fmt::Debug for DB {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DB")
            .field("name", &self.name)
            .field("last_sequence", &self.last_sequence())
            .field("open_cursors", &self.open_cursors())
            .field("pinned_values", &self.pinned_values())
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl CursorSource for DB {
    type Cursor<'a>
        = DBIter<'a>
    where
        Self: 'a;

    fn open_cursor(&self, config: &ReadConfig) -> Result<DBIter<'_>> {
        self.new_iterator(config)
    }
}
