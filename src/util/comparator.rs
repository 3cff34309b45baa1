use std::cmp::Ordering;

/// Total order over user keys.
pub trait Comparator: Send + Sync {
    fn compare(&self, a: &[u8], b: &[u8]) -> Ordering;
}

/// Plain lexicographic byte order. Prefix bounds computed by
/// `scan::exclusive_upper_bound` are only meaningful under this order.
#[derive(Debug, Default, Clone, Copy)]
pub struct BytewiseComparator {}

impl BytewiseComparator {
    pub fn new() -> Self {
        Self {}
    }
}

impl Comparator for BytewiseComparator {
    fn compare(&self, a: &[u8], b: &[u8]) -> Ordering {
        a.cmp(b)
    }
}
