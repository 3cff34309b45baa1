mod coding;
mod comparator;
mod random;
mod result;

pub use coding::*;
pub use comparator::{BytewiseComparator, Comparator};
pub use random::Random;
pub use result::{Error, Result};
