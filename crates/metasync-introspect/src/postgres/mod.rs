use std::collections::BTreeMap;
use std::time::Duration;

use chrono::Utc;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use metasync_core::{DatabaseSnapshot, Error, Result, Snapshot, redact_dsn};

use crate::adapter::Adapter;
use crate::options::CollectOptions;

mod mapper;
mod queries;
mod utils;

pub use utils::parse_index_columns;

/// Adapter for PostgreSQL databases.
#[derive(Debug, Clone)]
pub struct PostgresAdapter {
    pool: PgPool,
}

impl PostgresAdapter {
    /// Create a new adapter using a pre-configured pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a small pool against `dsn`.
    pub async fn connect(dsn: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .acquire_timeout(Duration::from_secs(10))
            .connect(dsn)
            .await
            .map_err(|err| {
                Error::Connection(format!("connecting to {}: {err}", redact_dsn(dsn)))
            })?;
        Ok(Self::new(pool))
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait::async_trait]
impl Adapter for PostgresAdapter {
    fn engine(&self) -> &'static str {
        "postgres"
    }

    async fn collect_database(&self, name: &str, opts: &CollectOptions) -> Result<DatabaseSnapshot> {
        collect_database(&self.pool, name, opts).await
    }
}

/// Read every selected schema of one database.
pub async fn collect_database(
    pool: &PgPool,
    name: &str,
    opts: &CollectOptions,
) -> Result<DatabaseSnapshot> {
    let schemas = mapper::filter_schemas(queries::list_schemas(pool).await?, opts);
    let relkinds = opts.relkinds();

    let mut snapshot = DatabaseSnapshot {
        db_name: name.to_string(),
        schemas: BTreeMap::new(),
    };

    for schema_name in schemas {
        let raw = mapper::RawSchema {
            tables: queries::list_tables(pool, &schema_name, &relkinds).await?,
            columns: queries::list_columns(pool, &schema_name).await?,
            primary_keys: queries::list_key_constraints(pool, &schema_name, "p").await?,
            uniques: queries::list_key_constraints(pool, &schema_name, "u").await?,
            checks: queries::list_check_constraints(pool, &schema_name).await?,
            foreign_keys: queries::list_foreign_keys(pool, &schema_name).await?,
            indexes: if opts.include_indexes {
                queries::list_indexes(pool, &schema_name).await?
            } else {
                Vec::new()
            },
        };

        let schema = mapper::map_schema(&schema_name, raw)?;
        tracing::debug!(
            event = "schema_collected",
            database = name,
            schema = %schema_name,
            tables = schema.tables.len(),
        );
        snapshot.schemas.insert(schema_name, schema);
    }

    Ok(snapshot)
}

/// Collect a full snapshot from every configured database.
///
/// `dsns` maps the logical database name to its connection string. The
/// snapshot timestamp is taken before the first connection is opened and any
/// failure aborts the whole collection.
pub async fn collect_snapshot(
    env: &str,
    dsns: &BTreeMap<String, String>,
    opts: &CollectOptions,
) -> Result<Snapshot> {
    let mut snapshot = Snapshot::new(env, Utc::now());

    for (name, dsn) in dsns {
        let adapter = PostgresAdapter::connect(dsn).await?;
        let collected = adapter.collect_database(name, opts).await;
        adapter.close().await;
        let database = collected?;

        tracing::info!(
            event = "database_collected",
            engine = adapter.engine(),
            database = %name,
            schemas = database.schemas.len(),
        );
        snapshot.databases.insert(name.clone(), database);
    }

    Ok(snapshot)
}
