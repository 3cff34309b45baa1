//! Little-endian fixed-width integers, LEB128 varints and length-prefixed
//! byte strings.

const CONTINUATION: u8 = 0x80;
const MAX_VARINT32_LEN: usize = 5;

pub fn encode_fixed32(dst: &mut [u8], value: u32) {
    dst[..4].copy_from_slice(&value.to_le_bytes());
}

pub fn encode_fixed64(dst: &mut [u8], value: u64) {
    dst[..8].copy_from_slice(&value.to_le_bytes());
}

/// Panics if `input` is shorter than four bytes.
pub fn decode_fixed32(input: &[u8]) -> u32 {
    let (bytes, _) = input.split_at(4);
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

/// Panics if `input` is shorter than eight bytes.
pub fn decode_fixed64(input: &[u8]) -> u64 {
    let low = decode_fixed32(input) as u64;
    let high = decode_fixed32(&input[4..]) as u64;
    high << 32 | low
}

pub fn extend_fixed64(dst: &mut Vec<u8>, value: u64) {
    dst.extend_from_slice(&value.to_le_bytes());
}

pub fn extend_varint32(dst: &mut Vec<u8>, mut value: u32) {
    while value >= u32::from(CONTINUATION) {
        dst.push(value as u8 | CONTINUATION);
        value >>= 7;
    }
    dst.push(value as u8);
}

/// Decode a varint from the front of `input`, returning the value and the
/// number of bytes it took. `None` if the varint is truncated or longer
/// than five bytes.
pub fn decode_varint32(input: &[u8]) -> Option<(u32, usize)> {
    let mut value = 0u32;
    for (index, &byte) in input.iter().take(MAX_VARINT32_LEN).enumerate() {
        value |= u32::from(byte & !CONTINUATION) << (7 * index);
        if byte & CONTINUATION == 0 {
            return Some((value, index + 1));
        }
    }
    None
}

pub fn extend_size_prefixed_slice(dst: &mut Vec<u8>, value: &[u8]) {
    extend_varint32(dst, value.len() as u32);
    dst.extend_from_slice(value);
}

/// Split a length-prefixed slice off the front of `input`. Returns the slice
/// and the total number of bytes consumed.
pub fn decode_size_prefixed_slice(input: &[u8]) -> Option<(&[u8], usize)> {
    let (len, prefix) = decode_varint32(input)?;
    let end = prefix.checked_add(len as usize)?;
    let slice = input.get(prefix..end)?;
    Some((slice, end))
}

/// Number of bytes `value` takes as a varint.
pub fn varint_size(value: u64) -> usize {
    let bits = (u64::BITS - value.leading_zeros()).max(1) as usize;
    (bits + 6) / 7
}
