//! Catalog collectors that turn a live database into a snapshot.

pub mod adapter;
pub mod options;
pub mod postgres;

pub use adapter::Adapter;
pub use options::CollectOptions;
pub use postgres::{PostgresAdapter, collect_snapshot, parse_index_columns};

pub use metasync_core::Snapshot;
