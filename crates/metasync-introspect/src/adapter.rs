use async_trait::async_trait;

use metasync_core::{DatabaseSnapshot, Result};

use crate::options::CollectOptions;

/// Trait implemented by database adapters that can read a catalog.
#[async_trait]
pub trait Adapter {
    /// Returns the engine identifier (e.g. `postgres`).
    fn engine(&self) -> &'static str;

    /// Read the catalog of the connected database and return its snapshot.
    async fn collect_database(&self, name: &str, opts: &CollectOptions) -> Result<DatabaseSnapshot>;
}
