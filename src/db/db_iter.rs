use std::{fmt, mem};

use parking_lot::RwLock;
use tracing::trace;

use super::{config::ReadConfig, ResourceLease};
use crate::{
    dbformat::{parse_internal_key, LookupKey, SequenceNumber, ValueType},
    iterator::Cursor,
    memtable::{MemTable, Position},
    util::Result,
};

/// User-facing cursor over a `DB`.
///
/// Sees the database as of the sequence number current when it was opened.
/// Only the newest visible version of each user key is exposed and deleted
/// keys are skipped. The memtable lock is held only inside positioning
/// calls; the current entry is copied into buffers the cursor owns.
pub struct DBIter<'a> {
    mem: &'a RwLock<MemTable>,
    config: ReadConfig,
    snapshot: SequenceNumber,
    position: Option<Position>,
    key: Vec<u8>,
    value: Vec<u8>,
    valid: bool,
    status: Result<()>,
    _lease: ResourceLease<'a>,
}

impl<'a> DBIter<'a> {
    pub(crate) fn new(
        mem: &'a RwLock<MemTable>,
        config: ReadConfig,
        snapshot: SequenceNumber,
        lease: ResourceLease<'a>,
    ) -> Self {
        Self {
            mem,
            config,
            snapshot,
            position: None,
            key: Vec::new(),
            value: Vec::new(),
            valid: false,
            status: Ok(()),
            _lease: lease,
        }
    }

    pub fn snapshot(&self) -> SequenceNumber {
        self.snapshot
    }

    /// Walk forward from `position` to the first visible value. Entries with
    /// a user key <= `skip` are hidden.
    fn find_next_user_entry(
        &mut self,
        mem: &MemTable,
        mut position: Option<Position>,
        mut skip: Option<Vec<u8>>,
    ) {
        self.valid = false;
        while let Some(current) = position {
            let (internal_key, value) = mem.entry(current);
            let parsed = match parse_internal_key(internal_key) {
                Ok(parsed) => parsed,
                Err(error) => {
                    self.status = Err(error);
                    self.position = None;
                    return;
                }
            };
            if parsed.sequence <= self.snapshot {
                if !self.config.below_upper_bound(parsed.user_key) {
                    break;
                }
                match parsed.type_ {
                    ValueType::Deletion => {
                        // older versions of this key sort right after it
                        skip = Some(parsed.user_key.to_vec());
                    }
                    ValueType::Value => {
                        let hidden = skip
                            .as_deref()
                            .is_some_and(|skip| parsed.user_key <= skip);
                        if !hidden {
                            self.key.clear();
                            self.key.extend_from_slice(parsed.user_key);
                            self.value.clear();
                            self.value.extend_from_slice(value);
                            self.position = Some(current);
                            self.valid = true;
                            return;
                        }
                    }
                }
            }
            position = mem.next(current);
        }
        self.position = None;
    }
}

impl<'a> Cursor for DBIter<'a> {
    fn valid(&self) -> bool {
        self.valid
    }

    fn seek_to_first(&mut self) {
        if let Some(lower) = self.config.lower_bound.clone() {
            return self.seek(&lower);
        }
        let lock = self.mem;
        let mem = lock.read_recursive();
        let position = mem.first();
        self.find_next_user_entry(&mem, position, None);
    }

    fn seek(&mut self, target: &[u8]) {
        let target = match &self.config.lower_bound {
            Some(lower) if target < lower.as_slice() => lower.clone(),
            _ => target.to_vec(),
        };
        let lock = self.mem;
        let mem = lock.read_recursive();
        let position = mem.seek(LookupKey::new(&target, self.snapshot).internal_key());
        self.find_next_user_entry(&mem, position, None);
    }

    fn next(&mut self) {
        debug_assert!(self.valid);
        let Some(current) = self.position.filter(|_| self.valid) else {
            return;
        };
        let skip = mem::take(&mut self.key);
        let lock = self.mem;
        let mem = lock.read_recursive();
        let position = mem.next(current);
        self.find_next_user_entry(&mem, position, Some(skip));
    }

    fn key(&self) -> &[u8] {
        debug_assert!(self.valid);
        &self.key
    }

    fn value(&self) -> &[u8] {
        debug_assert!(self.valid);
        &self.value
    }

    fn status(&self) -> Result<()> {
        self.status.clone()
    }
}

impl fmt::Debug for DBIter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DBIter")
            .field("config", &self.config)
            .field("snapshot", &self.snapshot)
            .field("valid", &self.valid)
            .finish()
    }
}

impl Drop for DBIter<'_> {
    fn drop(&mut self) {
        trace!(snapshot = self.snapshot, "cursor released");
    }
}
