//! Ordered in-memory key/value store with lazy prefix, full and range scans.

mod db;
mod dbformat;
mod iterator;
mod memtable;
pub mod scan;
mod util;

pub use db::{get_dup, DBConfig, DBIter, PinnedValue, ReadConfig, WriteBatch, WriteBatchHandler, DB};
pub use dbformat::SequenceNumber;
pub use iterator::{Cursor, CursorSource};
pub use scan::{exclusive_upper_bound, KeyValue, Scan, UpperBound};
pub use util::{Error, Result};
