use thiserror::Error as ThisError;

/// Status codes shared by the engine and the scan helpers.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum Error {
    #[error("NotFound: {0}")]
    NotFound(String),
    #[error("Corruption: {0}")]
    Corruption(String),
    #[error("NotSupported: {0}")]
    NotSupported(String),
    #[error("InvalidArgument: {0}")]
    InvalidArgument(String),
    #[error("IOError: {0}")]
    IoError(String),
    /// The handle was closed before the operation started.
    #[error("Closed: {0}")]
    Closed(String),
    /// The handle was closed while resources were still outstanding.
    #[error("Busy: {0}")]
    Busy(String),
    /// A configured limit refused a new resource.
    #[error("ResourceExhausted: {0}")]
    ResourceExhausted(String),
}

impl Error {
    pub fn not_found(msg: &str) -> Self {
        Self::NotFound(msg.to_owned())
    }

    pub fn corruption(msg: &str) -> Self {
        Self::Corruption(msg.to_owned())
    }

    pub fn not_supported(msg: &str) -> Self {
        Self::NotSupported(msg.to_owned())
    }

    pub fn invalid_argument(msg: &str) -> Self {
        Self::InvalidArgument(msg.to_owned())
    }

    pub fn io_error(msg: &str) -> Self {
        Self::IoError(msg.to_owned())
    }

    pub fn closed(msg: &str) -> Self {
        Self::Closed(msg.to_owned())
    }

    pub fn busy(msg: &str) -> Self {
        Self::Busy(msg.to_owned())
    }

    pub fn resource_exhausted(msg: &str) -> Self {
        Self::ResourceExhausted(msg.to_owned())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_corruption(&self) -> bool {
        matches!(self, Self::Corruption(_))
    }

    pub fn is_not_supported(&self) -> bool {
        matches!(self, Self::NotSupported(_))
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    pub fn is_io_error(&self) -> bool {
        matches!(self, Self::IoError(_))
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed(_))
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Busy(_))
    }

    pub fn is_resource_exhausted(&self) -> bool {
        matches!(self, Self::ResourceExhausted(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
