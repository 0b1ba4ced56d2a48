use std::path::PathBuf;

use thiserror::Error;

/// Core error type shared across metasync crates.
#[derive(Debug, Error)]
pub enum Error {
    /// Reading or writing a snapshot document failed.
    #[error("io error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A snapshot document is malformed or has the wrong shape.
    #[error("cannot decode snapshot {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// A snapshot could not be serialized.
    #[error("cannot encode snapshot: {0}")]
    Encode(#[source] serde_json::Error),
    /// The collector could not reach a database.
    #[error("connection error: {0}")]
    Connection(String),
    /// A catalog query failed or returned something unexpected.
    #[error("query error: {0}")]
    Query(String),
}

/// Convenience alias for results returned by metasync crates.
pub type Result<T> = std::result::Result<T, Error>;
