use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::constraints::{ForeignKey, Index};

/// Point-in-time capture of one or more database catalogs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Snapshot {
    /// Moment the collector finished reading the catalogs.
    pub timestamp: DateTime<Utc>,
    /// Environment label (e.g. `dev`, `prod`).
    pub env: String,
    /// Databases keyed by name.
    #[serde(default)]
    pub databases: BTreeMap<String, DatabaseSnapshot>,
}

/// Catalog structure of a single database.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DatabaseSnapshot {
    pub db_name: String,
    /// Schemas keyed by name.
    #[serde(default)]
    pub schemas: BTreeMap<String, SchemaSnapshot>,
}

/// A namespace and the tables it contains.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SchemaSnapshot {
    pub name: String,
    /// Tables keyed by name.
    #[serde(default)]
    pub tables: BTreeMap<String, TableSnapshot>,
}

/// Columns, keys, constraints and indexes of one table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TableSnapshot {
    pub name: String,
    /// Column name to raw catalog type (e.g. `character varying`).
    #[serde(default)]
    pub columns: BTreeMap<String, String>,
    /// Primary key columns in key order; empty when the table has none.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub primary_key: Vec<String>,
    /// Unique constraint name to member columns in key order.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub unique_constraints: BTreeMap<String, Vec<String>>,
    /// Check constraint name to expression text.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub check_constraints: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub foreign_keys: BTreeMap<String, ForeignKey>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub indexes: BTreeMap<String, Index>,
}

impl Snapshot {
    /// Create an empty snapshot stamped with the given time.
    pub fn new(env: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            env: env.into(),
            databases: BTreeMap::new(),
        }
    }

    /// Total number of tables across every database and schema.
    pub fn table_count(&self) -> usize {
        self.databases
            .values()
            .flat_map(|db| db.schemas.values())
            .map(|schema| schema.tables.len())
            .sum()
    }
}

impl TableSnapshot {
    /// Create a table with no columns or constraints.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Returns true when `column` is part of the primary key.
    pub fn is_primary_key_column(&self, column: &str) -> bool {
        self.primary_key.iter().any(|item| item == column)
    }
}
