use crate::{Error, Result};

/// Options for a database handle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DBConfig {
    /// Upper limit on cursors open at the same time. `None` is unlimited.
    pub max_open_cursors: Option<usize>,
}

impl DBConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_open_cursors(mut self, limit: usize) -> Self {
        self.max_open_cursors = Some(limit);
        self
    }
}

/// Options for a cursor: the bound pair it is restricted to.
///
/// `lower_bound` is inclusive, `upper_bound` exclusive. `None` leaves that
/// side open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadConfig {
    pub lower_bound: Option<Vec<u8>>,
    pub upper_bound: Option<Vec<u8>>,
}

impl ReadConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lower_bound(mut self, key: &[u8]) -> Self {
        self.lower_bound = Some(key.to_vec());
        self
    }

    pub fn with_upper_bound(mut self, key: &[u8]) -> Self {
        self.upper_bound = Some(key.to_vec());
        self
    }

    /// Rejects a bound pair whose lower bound sorts after its upper bound.
    pub fn validate(&self) -> Result<()> {
        match (&self.lower_bound, &self.upper_bound) {
            (Some(lower), Some(upper)) if lower > upper => Err(Error::invalid_argument(
                "lower bound sorts after upper bound",
            )),
            _ => Ok(()),
        }
    }

    pub(crate) fn below_upper_bound(&self, key: &[u8]) -> bool {
        self.upper_bound
            .as_deref()
            .map_or(true, |upper| key < upper)
    }
}
