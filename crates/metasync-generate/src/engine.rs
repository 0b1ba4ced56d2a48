use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use metasync_core::Snapshot;
use tracing::{debug, info};

use crate::errors::GenerateError;
use crate::naming::{claim_unique, file_stem, sanitize_path_segment};
use crate::render::render_table;

/// Write one binding file per table under `out_dir`.
///
/// Returns the written paths in emission order (database, schema, table).
/// Names that normalize to the same directory or file stem are kept apart
/// with `_2`, `_3` suffixes in that order.
/// The first failed write aborts the run; files already written are kept.
pub fn generate_bindings(snapshot: &Snapshot, out_dir: &Path) -> Result<Vec<PathBuf>, GenerateError> {
    let mut written = Vec::with_capacity(snapshot.table_count());
    let mut db_dirs = HashSet::new();

    for (db_name, database) in &snapshot.databases {
        let db_dir = out_dir.join(claim_unique(&mut db_dirs, sanitize_path_segment(db_name)));
        let mut schema_dirs = HashSet::new();

        for (schema_name, schema) in &database.schemas {
            let schema_dir =
                db_dir.join(claim_unique(&mut schema_dirs, sanitize_path_segment(schema_name)));
            fs::create_dir_all(&schema_dir).map_err(|source| GenerateError::Io {
                path: schema_dir.clone(),
                source,
            })?;

            let mut stems = HashSet::new();
            for (table_name, table) in &schema.tables {
                let stem = claim_unique(&mut stems, file_stem(table_name));
                let path = schema_dir.join(format!("{stem}.rs"));
                fs::write(&path, render_table(table)).map_err(|source| GenerateError::Io {
                    path: path.clone(),
                    source,
                })?;
                debug!(event = "binding_written", table = %table_name, path = %path.display());
                written.push(path);
            }
        }
    }

    info!(
        event = "bindings_generated",
        out_dir = %out_dir.display(),
        files = written.len(),
    );
    Ok(written)
}
