#[cfg(feature = "savefile")]
use std::path::PathBuf;

/// Errors of index construction and persistence.
///
/// Per-query conditions (an empty pattern, a pattern symbol absent from the
/// reference alphabet) are not errors. They degrade to an empty hit
/// iterator instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The reference contains the reserved sentinel byte.
    #[error("reference contains the reserved sentinel byte '$' at offset {offset}")]
    SentinelCollision { offset: usize },

    /// A persisted index file exists but does not deserialise consistently.
    #[cfg(feature = "savefile")]
    #[error("index file {path} could not be read: {detail}")]
    IndexUnreadable { path: PathBuf, detail: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
