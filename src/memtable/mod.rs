mod skiplist;

use std::cmp::Ordering;

use skiplist::{KeyComparator, SkipList};

pub use skiplist::Position;

use crate::{
    dbformat::{
        parse_internal_key, InternalKeyComparator, LookupKey, ParsedInternalKey, SequenceNumber,
        ValueType,
    },
    util::{
        decode_size_prefixed_slice, extend_size_prefixed_slice, varint_size, Comparator, Error,
        Result,
    },
};

/// Split an entry into (internal key, value). Lookup targets carry no value
/// part and decode with an empty one.
fn decode_entry(entry: &[u8]) -> (&[u8], &[u8]) {
    match decode_size_prefixed_slice(entry) {
        Some((internal_key, offset)) => {
            let value = decode_size_prefixed_slice(&entry[offset..]).map_or(&[][..], |(v, _)| v);
            (internal_key, value)
        }
        None => (&[][..], &[][..]),
    }
}

pub struct MemTableKeyComparator {
    comparator: InternalKeyComparator,
}

impl MemTableKeyComparator {
    pub fn new(comparator: InternalKeyComparator) -> Self {
        Self { comparator }
    }
}

/// compare the internal keys the entries start with
impl KeyComparator<Vec<u8>> for MemTableKeyComparator {
    fn compare(&self, a: &Vec<u8>, b: &Vec<u8>) -> Ordering {
        let (a, _) = decode_entry(a);
        let (b, _) = decode_entry(b);
        self.comparator.compare(a, b)
    }
}

pub struct MemTable {
    table: SkipList<Vec<u8>, MemTableKeyComparator>,
    memory_usage: usize,
}

impl MemTable {
    pub fn new(comparator: InternalKeyComparator) -> Self {
        Self {
            table: SkipList::new(MemTableKeyComparator::new(comparator), Vec::new()),
            memory_usage: 0,
        }
    }

    pub fn approximate_memory_usage(&self) -> usize {
        self.memory_usage
    }

    /// Format of an entry is concatenation of:
    ///  key_size     : varint32 of internal_key.size()
    ///  key bytes    : char[internal_key.size()]
    ///  tag          : uint64((sequence << 8) | type)
    ///  value_size   : varint32 of value.size()
    ///  value bytes  : char[value.size()]
    pub fn add(&mut self, seq: SequenceNumber, type_: ValueType, key: &[u8], value: &[u8]) {
        let internal_key = ParsedInternalKey::new(key, seq, type_);
        let internal_key_size = internal_key.encoded_len();
        let encoded_len = varint_size(internal_key_size as u64)
            + internal_key_size
            + varint_size(value.len() as u64)
            + value.len();

        let mut internal_key_buf = Vec::with_capacity(internal_key_size);
        internal_key.encode_to(&mut internal_key_buf);
        let mut entry = Vec::with_capacity(encoded_len);
        extend_size_prefixed_slice(&mut entry, &internal_key_buf);
        extend_size_prefixed_slice(&mut entry, value);
        debug_assert_eq!(encoded_len, entry.len());

        self.memory_usage += encoded_len + std::mem::size_of::<usize>();
        self.table.insert(entry);
    }

    /// If the memtable holds a value for the key, return its position.
    /// If it holds a deletion for the key, return a NotFound error.
    /// Otherwise return None.
    pub fn get(&self, key: &LookupKey) -> Option<Result<Position>> {
        let position = self.table.seek(&key.memtable_key().to_vec())?;
        let (internal_key, _) = decode_entry(self.table.key(position));
        let parsed = match parse_internal_key(internal_key) {
            Ok(parsed) => parsed,
            Err(error) => return Some(Err(error)),
        };
        // We do not check the sequence number since the seek above already
        // skipped all entries newer than the lookup snapshot.
        if self
            .table
            .comparator
            .comparator
            .user_comparator()
            .compare(parsed.user_key, key.user_key())
            != Ordering::Equal
        {
            return None;
        }
        match parsed.type_ {
            ValueType::Value => Some(Ok(position)),
            ValueType::Deletion => Some(Err(Error::not_found("key was deleted"))),
        }
    }

    pub fn first(&self) -> Option<Position> {
        self.table.first()
    }

    /// Position at the first entry whose internal key is >= `internal_key`.
    pub fn seek(&self, internal_key: &[u8]) -> Option<Position> {
        let mut target = Vec::with_capacity(internal_key.len() + 5);
        extend_size_prefixed_slice(&mut target, internal_key);
        self.table.seek(&target)
    }

    pub fn next(&self, position: Position) -> Option<Position> {
        self.table.next(position)
    }

    /// (internal key, value) stored at `position`.
    pub fn entry(&self, position: Position) -> (&[u8], &[u8]) {
        decode_entry(self.table.key(position))
    }

    pub fn value(&self, position: Position) -> &[u8] {
        self.entry(position).1
    }
}
