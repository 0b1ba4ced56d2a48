use std::collections::BTreeMap;

use serde::Serialize;

use crate::schema::{Snapshot, TableSnapshot};

/// A single invariant violation found in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub code: &'static str,
    /// Dotted location of the offending entity.
    pub path: String,
    pub message: String,
}

/// Issues collected by [`validate_snapshot`], in walk order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// Returns true when no issue was found.
    pub fn is_ok(&self) -> bool {
        self.issues.is_empty()
    }

    fn push(&mut self, code: &'static str, path: String, message: String) {
        self.issues.push(ValidationIssue {
            code,
            path,
            message,
        });
    }
}

/// Check the structural invariants of a snapshot without modifying it.
///
/// This checks:
/// - container keys match the names stored on the entities
/// - primary key, unique and foreign key columns exist on the table
/// - foreign keys pair every local column with a referenced column
/// - indexes carry their definition text
pub fn validate_snapshot(snapshot: &Snapshot) -> ValidationReport {
    let mut report = ValidationReport::default();

    for (db_key, db) in &snapshot.databases {
        check_name(&mut report, db_key, &db.db_name, db_key);
        for (schema_key, schema) in &db.schemas {
            let schema_path = format!("{db_key}.{schema_key}");
            check_name(&mut report, schema_key, &schema.name, &schema_path);
            for (table_key, table) in &schema.tables {
                let table_path = format!("{schema_path}.{table_key}");
                check_name(&mut report, table_key, &table.name, &table_path);
                check_table(&mut report, table, &table_path);
            }
        }
    }

    report
}

fn check_name(report: &mut ValidationReport, key: &str, name: &str, path: &str) {
    if key != name {
        report.push(
            "name_mismatch",
            path.to_string(),
            format!("keyed as '{key}' but named '{name}'"),
        );
    }
}

fn check_table(report: &mut ValidationReport, table: &TableSnapshot, path: &str) {
    for column in &table.primary_key {
        if !table.columns.contains_key(column) {
            report.push(
                "primary_key_column_missing",
                path.to_string(),
                format!("primary key column not found: {column}"),
            );
        }
    }

    check_members(report, table, &table.unique_constraints, "unique_column_missing", path);

    for (key, fk) in &table.foreign_keys {
        let fk_path = format!("{path}.{key}");
        check_name(report, key, &fk.name, &fk_path);
        if fk.columns.len() != fk.ref_columns.len() {
            report.push(
                "foreign_key_arity",
                fk_path.clone(),
                format!(
                    "{} local columns but {} referenced columns",
                    fk.columns.len(),
                    fk.ref_columns.len()
                ),
            );
        }
        for column in &fk.columns {
            if !table.columns.contains_key(column) {
                report.push(
                    "foreign_key_column_missing",
                    fk_path.clone(),
                    format!("foreign key column not found: {column}"),
                );
            }
        }
    }

    for (key, index) in &table.indexes {
        let index_path = format!("{path}.{key}");
        check_name(report, key, &index.name, &index_path);
        if index.definition.trim().is_empty() {
            report.push(
                "index_definition_missing",
                index_path,
                "index has no definition text".to_string(),
            );
        }
    }
}

fn check_members(
    report: &mut ValidationReport,
    table: &TableSnapshot,
    constraints: &BTreeMap<String, Vec<String>>,
    code: &'static str,
    path: &str,
) {
    for (name, columns) in constraints {
        for column in columns {
            if !table.columns.contains_key(column) {
                report.push(
                    code,
                    format!("{path}.{name}"),
                    format!("constraint column not found: {column}"),
                );
            }
        }
    }
}
