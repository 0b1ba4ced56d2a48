use std::collections::BTreeMap;

use metasync_core::{Error, ForeignKey, Index, Result, SchemaSnapshot, TableSnapshot};

use crate::options::CollectOptions;
use crate::postgres::utils::{fk_rule_from_code, is_system_schema, parse_index_columns};

use super::queries::{RawCheckConstraint, RawColumn, RawForeignKey, RawIndex, RawKeyConstraint};

/// Everything read from the catalog for a single schema.
#[derive(Debug, Default)]
pub struct RawSchema {
    pub tables: Vec<String>,
    pub columns: Vec<RawColumn>,
    pub primary_keys: Vec<RawKeyConstraint>,
    pub uniques: Vec<RawKeyConstraint>,
    pub checks: Vec<RawCheckConstraint>,
    pub foreign_keys: Vec<RawForeignKey>,
    pub indexes: Vec<RawIndex>,
}

pub fn filter_schemas(raw: Vec<String>, opts: &CollectOptions) -> Vec<String> {
    raw.into_iter()
        .filter(|schema| match &opts.schemas {
            Some(list) => list.iter().any(|item| item == schema),
            None => opts.include_system_schemas || !is_system_schema(schema),
        })
        .collect()
}

/// Assemble a schema snapshot. Rows for tables outside `raw.tables` are dropped.
pub fn map_schema(name: &str, raw: RawSchema) -> Result<SchemaSnapshot> {
    let mut tables: BTreeMap<String, TableSnapshot> = raw
        .tables
        .into_iter()
        .map(|table| (table.clone(), TableSnapshot::new(table)))
        .collect();

    for column in raw.columns {
        if let Some(table) = tables.get_mut(&column.table_name) {
            table.columns.insert(column.name, column.data_type);
        }
    }

    for pk in raw.primary_keys {
        if let Some(table) = tables.get_mut(&pk.table_name) {
            table.primary_key = pk.columns;
        }
    }

    for unique in raw.uniques {
        if let Some(table) = tables.get_mut(&unique.table_name) {
            table.unique_constraints.insert(unique.name, unique.columns);
        }
    }

    for check in raw.checks {
        if let Some(table) = tables.get_mut(&check.table_name) {
            table.check_constraints.insert(check.name, check.expression);
        }
    }

    for fk in raw.foreign_keys {
        let Some(table) = tables.get_mut(&fk.table_name) else {
            continue;
        };
        let foreign_key = map_foreign_key(name, fk)?;
        table
            .foreign_keys
            .insert(foreign_key.name.clone(), foreign_key);
    }

    for idx in raw.indexes {
        if let Some(table) = tables.get_mut(&idx.table_name) {
            table.indexes.insert(
                idx.name.clone(),
                Index {
                    columns: parse_index_columns(&idx.definition),
                    name: idx.name,
                    unique: idx.is_unique,
                    definition: idx.definition,
                },
            );
        }
    }

    Ok(SchemaSnapshot {
        name: name.to_string(),
        tables,
    })
}

fn map_foreign_key(schema: &str, fk: RawForeignKey) -> Result<ForeignKey> {
    let rule = |code: i8| {
        fk_rule_from_code(code).ok_or_else(|| {
            Error::Query(format!(
                "foreign key {schema}.{}.{} has unknown action code {:?}",
                fk.table_name, fk.name, code as u8 as char
            ))
        })
    };
    let update_rule = rule(fk.on_update_code)?;
    let delete_rule = rule(fk.on_delete_code)?;

    Ok(ForeignKey {
        name: fk.name,
        columns: fk.columns,
        ref_schema: fk.ref_schema,
        ref_table: fk.ref_table,
        ref_columns: fk.ref_columns,
        update_rule,
        delete_rule,
    })
}
