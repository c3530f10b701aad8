//! Error types shared by every layer of the crate.

use thiserror::Error;

/// Errors raised by storage, succinct structures and construction stages.
#[derive(Debug, Error)]
pub enum Error {
    /// A disk or RAM file could not be opened, read or written.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A stage needed a cached artifact that is neither registered nor buildable.
    #[error("missing cache artifact `{key}`")]
    MissingDependency { key: String },

    /// Input violated a documented precondition.
    #[error("precondition violated: {0}")]
    Precondition(String),

    /// A rank, select or access query addressed a position outside the structure.
    #[error("index {index} out of range (bound {bound})")]
    OutOfRange { index: usize, bound: usize },

    /// A support object was queried before being bound to a vector.
    #[error("support structure is not bound to a bit vector")]
    Unbound,

    /// A support index was queried against a vector it was not built for.
    #[error("support structure was built for a vector of length {expected}, got {actual}")]
    StaleSupport { expected: usize, actual: usize },

    /// Serialized data did not match the expected layout.
    #[error("format error: {0}")]
    Format(String),

    /// Rename between a RAM file and a disk file.
    #[error("cannot move `{from}` to `{to}` across storage backends")]
    CrossBackend { from: String, to: String },

    /// The cache manifest could not be encoded or decoded.
    #[error("manifest error: {0}")]
    Manifest(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn missing(key: impl Into<String>) -> Self {
        Error::MissingDependency { key: key.into() }
    }

    pub(crate) fn out_of_range(index: usize, bound: usize) -> Self {
        Error::OutOfRange { index, bound }
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;
