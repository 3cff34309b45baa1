//! Internal keys: a user key followed by an eight byte little-endian tag
//! holding `sequence << 8 | value type`.

use std::cmp::Ordering;

use crate::util::{decode_fixed64, extend_fixed64, extend_varint32, Comparator, Error, Result};

pub type SequenceNumber = u64;

/// The low eight bits of a tag hold the value type.
pub const MAX_SEQUENCE_NUMBER: SequenceNumber = (1 << 56) - 1;

const TAG_LEN: usize = 8;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ValueType {
    Deletion = 0,
    Value = 1,
}

impl ValueType {
    /// Highest type, so a seek target sorts before every entry of the same
    /// user key and sequence.
    pub const FOR_SEEK: ValueType = ValueType::Value;
}

impl TryFrom<u8> for ValueType {
    type Error = Error;

    fn try_from(tag: u8) -> Result<Self> {
        match tag {
            0 => Ok(Self::Deletion),
            1 => Ok(Self::Value),
            other => Err(Error::corruption(&format!("unknown value type {}", other))),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) struct ParsedInternalKey<'a> {
    pub user_key: &'a [u8],
    pub sequence: SequenceNumber,
    pub type_: ValueType,
}

impl<'a> ParsedInternalKey<'a> {
    pub fn new(user_key: &'a [u8], sequence: SequenceNumber, type_: ValueType) -> Self {
        debug_assert!(sequence <= MAX_SEQUENCE_NUMBER);
        Self {
            user_key,
            sequence,
            type_,
        }
    }

    pub fn encoded_len(&self) -> usize {
        self.user_key.len() + TAG_LEN
    }

    pub fn encode_to(&self, dst: &mut Vec<u8>) {
        dst.extend_from_slice(self.user_key);
        extend_fixed64(dst, self.sequence << 8 | self.type_ as u64);
    }
}

pub(crate) fn parse_internal_key(internal_key: &[u8]) -> Result<ParsedInternalKey<'_>> {
    let split = internal_key
        .len()
        .checked_sub(TAG_LEN)
        .ok_or_else(|| Error::corruption("internal key shorter than its tag"))?;
    let (user_key, tag) = internal_key.split_at(split);
    let tag = decode_fixed64(tag);
    Ok(ParsedInternalKey {
        user_key,
        sequence: tag >> 8,
        type_: ValueType::try_from(tag as u8)?,
    })
}

/// (user key, tag). A slice too short to carry a tag is all user key.
fn split_internal_key(internal_key: &[u8]) -> (&[u8], u64) {
    match internal_key.len().checked_sub(TAG_LEN) {
        Some(split) => {
            let (user_key, tag) = internal_key.split_at(split);
            (user_key, decode_fixed64(tag))
        }
        None => (internal_key, 0),
    }
}

/// Orders internal keys by ascending user key, then descending tag, so the
/// newest version of a key comes first.
pub struct InternalKeyComparator {
    user_comparator: Box<dyn Comparator>,
}

impl InternalKeyComparator {
    pub fn new(user_comparator: Box<dyn Comparator>) -> Self {
        Self { user_comparator }
    }

    pub fn user_comparator(&self) -> &dyn Comparator {
        &*self.user_comparator
    }
}

impl Comparator for InternalKeyComparator {
    fn compare(&self, a: &[u8], b: &[u8]) -> Ordering {
        let (a_key, a_tag) = split_internal_key(a);
        let (b_key, b_tag) = split_internal_key(b);
        self.user_comparator
            .compare(a_key, b_key)
            .then_with(|| b_tag.cmp(&a_tag))
    }
}

/// Seek target for a point lookup at a snapshot.
///
/// ```text
/// varint32(len(user_key) + 8) | user_key | tag
/// ^ memtable_key              ^ internal_key
///                             ^ user_key
/// ```
pub struct LookupKey {
    buf: Vec<u8>,
    key_offset: usize,
}

impl LookupKey {
    pub fn new(user_key: &[u8], sequence: SequenceNumber) -> Self {
        let key = ParsedInternalKey::new(user_key, sequence, ValueType::FOR_SEEK);
        let mut buf = Vec::with_capacity(key.encoded_len() + 5);
        extend_varint32(&mut buf, key.encoded_len() as u32);
        let key_offset = buf.len();
        key.encode_to(&mut buf);
        Self { buf, key_offset }
    }

    pub fn memtable_key(&self) -> &[u8] {
        &self.buf
    }

    pub fn internal_key(&self) -> &[u8] {
        &self.buf[self.key_offset..]
    }

    pub fn user_key(&self) -> &[u8] {
        &self.buf[self.key_offset..self.buf.len() - TAG_LEN]
    }
}
