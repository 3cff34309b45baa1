use crate::{
    dbformat::{SequenceNumber, ValueType},
    memtable::MemTable,
    util::{
        decode_fixed32, decode_fixed64, decode_size_prefixed_slice, encode_fixed32, encode_fixed64,
        extend_size_prefixed_slice,
    },
    Error, Result,
};

// buf := sequence: fixed64
//        count:    fixed32
//        records:  (tag key [value])*
const COUNT_OFFSET: usize = 8;
const HEADER_LEN: usize = 12;

/// Receives the updates of a batch in insertion order.
pub trait WriteBatchHandler {
    fn put(&mut self, key: &[u8], value: &[u8]);
    fn delete(&mut self, key: &[u8]);
}

/// One decoded update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Record<'a> {
    Put(&'a [u8], &'a [u8]),
    Delete(&'a [u8]),
}

/// Decodes the records after the header. Stops after the first error.
struct Records<'a> {
    input: &'a [u8],
}

impl<'a> Records<'a> {
    fn slice(&mut self, what: &str) -> Result<&'a [u8]> {
        let (slice, used) = decode_size_prefixed_slice(self.input)
            .ok_or_else(|| Error::corruption(&format!("truncated {} in write batch", what)))?;
        self.input = &self.input[used..];
        Ok(slice)
    }

    fn record(&mut self) -> Result<Record<'a>> {
        let (&tag, rest) = self
            .input
            .split_first()
            .ok_or_else(|| Error::corruption("empty write batch record"))?;
        self.input = rest;
        match ValueType::try_from(tag)? {
            ValueType::Value => Ok(Record::Put(self.slice("key")?, self.slice("value")?)),
            ValueType::Deletion => Ok(Record::Delete(self.slice("key")?)),
        }
    }
}

impl<'a> Iterator for Records<'a> {
    type Item = Result<Record<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.input.is_empty() {
            return None;
        }
        let record = self.record();
        if record.is_err() {
            self.input = &[];
        }
        Some(record)
    }
}

/// An ordered set of updates applied atomically by `DB::write`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteBatch {
    buf: Vec<u8>,
}

impl Default for WriteBatch {
    fn default() -> Self {
        Self::new()
    }
}

impl WriteBatch {
    pub fn new() -> Self {
        Self {
            buf: vec![0; HEADER_LEN],
        }
    }

    pub fn put(&mut self, key: &[u8], value: &[u8]) {
        self.push_record(ValueType::Value, key, Some(value));
    }

    pub fn delete(&mut self, key: &[u8]) {
        self.push_record(ValueType::Deletion, key, None);
    }

    /// Drop every update. The sequence number is reset as well.
    pub fn clear(&mut self) {
        self.buf.truncate(HEADER_LEN);
        self.buf.fill(0);
    }

    /// Size of the encoded batch in bytes.
    pub fn approximate_size(&self) -> usize {
        self.buf.len()
    }

    /// Add the updates of `other` after the ones already in this batch.
    pub fn append(&mut self, other: &WriteBatch) {
        self.set_count(self.count() + other.count());
        self.buf.extend_from_slice(&other.buf[HEADER_LEN..]);
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Number of updates in the batch.
    pub fn count(&self) -> u32 {
        decode_fixed32(&self.buf[COUNT_OFFSET..HEADER_LEN])
    }

    /// Replay the updates into `handler`.
    ///
    /// Returns a Corruption error if a record is truncated, carries an
    /// unknown tag, or the number of records disagrees with the header.
    /// Records before the bad one have already been handed out.
    pub fn iterate(&self, handler: &mut dyn WriteBatchHandler) -> Result<()> {
        let mut found = 0;
        for record in self.records()? {
            match record? {
                Record::Put(key, value) => handler.put(key, value),
                Record::Delete(key) => handler.delete(key),
            }
            found += 1;
        }
        if found != self.count() {
            return Err(Error::corruption(&format!(
                "write batch holds {} records, header says {}",
                found,
                self.count()
            )));
        }
        Ok(())
    }

    fn records(&self) -> Result<Records<'_>> {
        match self.buf.get(HEADER_LEN..) {
            Some(input) => Ok(Records { input }),
            None => Err(Error::corruption("write batch shorter than its header")),
        }
    }

    fn push_record(&mut self, type_: ValueType, key: &[u8], value: Option<&[u8]>) {
        self.set_count(self.count() + 1);
        self.buf.push(type_ as u8);
        extend_size_prefixed_slice(&mut self.buf, key);
        if let Some(value) = value {
            extend_size_prefixed_slice(&mut self.buf, value);
        }
    }

    pub(crate) fn set_count(&mut self, count: u32) {
        encode_fixed32(&mut self.buf[COUNT_OFFSET..HEADER_LEN], count)
    }

    /// Sequence number of the first update.
    pub(crate) fn sequence(&self) -> SequenceNumber {
        decode_fixed64(&self.buf[..COUNT_OFFSET])
    }

    pub(crate) fn set_sequence(&mut self, sequence: SequenceNumber) {
        encode_fixed64(&mut self.buf[..COUNT_OFFSET], sequence)
    }

    #[cfg(test)]
    pub(crate) fn contents(&self) -> &[u8] {
        &self.buf
    }

    #[cfg(test)]
    pub(crate) fn set_contents(&mut self, contents: &[u8]) {
        self.buf = contents.to_vec()
    }

    /// Add every update to `memtable` with consecutive sequence numbers.
    /// Nothing is inserted unless the whole batch decodes.
    pub(crate) fn insert_into(&self, memtable: &mut MemTable) -> Result<()> {
        struct Validate;
        impl WriteBatchHandler for Validate {
            fn put(&mut self, _key: &[u8], _value: &[u8]) {}
            fn delete(&mut self, _key: &[u8]) {}
        }
        self.iterate(&mut Validate)?;

        let mut sequence = self.sequence();
        for record in self.records()? {
            match record? {
                Record::Put(key, value) => memtable.add(sequence, ValueType::Value, key, value),
                Record::Delete(key) => memtable.add(sequence, ValueType::Deletion, key, &[]),
            }
            sequence += 1;
        }
        Ok(())
    }
}
