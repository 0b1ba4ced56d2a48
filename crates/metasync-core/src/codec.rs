//! Persisted snapshot documents.
//!
//! A snapshot is stored as pretty-printed JSON whose shape mirrors the model:
//! `timestamp`, `env` and a `databases` mapping at the top level, nested
//! mappings below. Empty constraint and index collections are omitted on
//! save and default to empty on load; unknown keys are ignored.

use std::fs::{OpenOptions, create_dir_all};
use std::io::Write;
use std::path::Path;

use schemars::schema::RootSchema;
use schemars::schema_for;

use crate::error::{Error, Result};
use crate::schema::Snapshot;

/// Serialize a snapshot to its document text.
pub fn to_document(snapshot: &Snapshot) -> Result<String> {
    let mut text = serde_json::to_string_pretty(snapshot).map_err(Error::Encode)?;
    text.push('\n');
    Ok(text)
}

/// Parse document text into a snapshot.
///
/// Decode errors from this function carry an empty path; use
/// [`load_snapshot`] to get the file location attached.
pub fn from_document(text: &str) -> Result<Snapshot> {
    serde_json::from_str(text).map_err(|source| Error::Decode {
        path: Default::default(),
        source,
    })
}

/// Write `snapshot` to `path`, creating parent directories and truncating
/// any existing file.
pub fn save_snapshot(path: &Path, snapshot: &Snapshot) -> Result<()> {
    let text = to_document(snapshot)?;
    let io_err = |source: std::io::Error| Error::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            create_dir_all(parent).map_err(io_err)?;
        }
    }

    let mut file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(path)
        .map_err(io_err)?;
    file.write_all(text.as_bytes()).map_err(io_err)?;
    file.flush().map_err(io_err)
}

/// Read and decode the snapshot stored at `path`.
pub fn load_snapshot(path: &Path) -> Result<Snapshot> {
    let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| Error::Decode {
        path: path.to_path_buf(),
        source,
    })
}

/// Emit the JSON Schema of the snapshot document.
pub fn snapshot_json_schema() -> RootSchema {
    schema_for!(Snapshot)
}
