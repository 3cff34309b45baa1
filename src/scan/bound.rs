use crate::{Error, Result};

/// Exclusive upper bound of the keys sharing a prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpperBound {
    /// Every key starting with the prefix sorts strictly below this key.
    Exclusive(Vec<u8>),
    /// The prefix is all `0xff` bytes; no finite key bounds it from above.
    Unbounded,
}

impl UpperBound {
    pub fn into_option(self) -> Option<Vec<u8>> {
        match self {
            Self::Exclusive(bound) => Some(bound),
            Self::Unbounded => None,
        }
    }
}

/// Compute the smallest key greater than every key that starts with
/// `prefix`, by adding one to the prefix as a big-endian base-256 number.
///
/// ```text
/// 12 34 56  ->  12 34 57
/// 12 34 ff  ->  12 35 00
/// ff ff ff  ->  unbounded
/// ```
///
/// The result has the same length as `prefix`. The empty prefix has no
/// meaningful bound and is rejected; scanning it is a full scan.
pub fn exclusive_upper_bound(prefix: &[u8]) -> Result<UpperBound> {
    if prefix.is_empty() {
        return Err(Error::invalid_argument("empty prefix has no upper bound"));
    }
    let mut bound = prefix.to_vec();
    for byte in bound.iter_mut().rev() {
        if *byte == u8::MAX {
            *byte = 0;
        } else {
            *byte += 1;
            return Ok(UpperBound::Exclusive(bound));
        }
    }
    Ok(UpperBound::Unbounded)
}
