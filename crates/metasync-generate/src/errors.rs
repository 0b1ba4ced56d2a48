use std::path::PathBuf;

use thiserror::Error;

/// Errors emitted while writing binding files.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("io error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
