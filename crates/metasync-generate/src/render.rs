use std::collections::{BTreeSet, HashSet};

use metasync_core::TableSnapshot;

use crate::naming::{field_ident, to_pascal_case};
use crate::types::map_sql_type;

pub const HEADER: &str = "// @generated by metasync. Do not edit.";

struct Field {
    ident: String,
    column: String,
    rust_type: &'static str,
    notes: Vec<String>,
}

/// Render the binding source for one table.
pub fn render_table(table: &TableSnapshot) -> String {
    let mut chrono_names = BTreeSet::new();
    let mut used_idents = HashSet::new();
    let mut fields = Vec::with_capacity(table.columns.len());

    for (column, raw_type) in &table.columns {
        let rust_type = map_sql_type(raw_type);
        chrono_names.extend(rust_type.chrono_imports().iter().copied());

        let base = field_ident(column);
        let mut ident = base.clone();
        let mut suffix = 2;
        while !used_idents.insert(ident.clone()) {
            ident = format!("{}_{suffix}", base.trim_start_matches("r#"));
            suffix += 1;
        }

        fields.push(Field {
            ident,
            column: column.clone(),
            rust_type: rust_type.as_str(),
            notes: column_notes(table, column),
        });
    }

    let mut out = String::new();
    line(&mut out, HEADER);
    out.push('\n');
    if !chrono_names.is_empty() {
        let names: Vec<&str> = chrono_names.into_iter().collect();
        if names.len() == 1 {
            line(&mut out, &format!("use chrono::{};", names[0]));
        } else {
            line(&mut out, &format!("use chrono::{{{}}};", names.join(", ")));
        }
    }
    out.push_str("use serde::{Deserialize, Serialize};\n\n");

    line(&mut out, &format!("/// Row of table `{}`.", table.name));
    out.push_str("#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]\n");
    line(&mut out, &format!("pub struct {} {{", to_pascal_case(&table.name)));
    for field in &fields {
        for note in &field.notes {
            line(&mut out, &format!("    /// {note}"));
        }
        if field.ident.trim_start_matches("r#") != field.column {
            line(&mut out, &format!("    #[serde(rename = {:?})]", field.column));
        }
        line(&mut out, &format!("    pub {}: {},", field.ident, field.rust_type));
    }
    out.push_str("}\n");
    out
}

fn line(out: &mut String, text: &str) {
    out.push_str(text);
    out.push('\n');
}

fn column_notes(table: &TableSnapshot, column: &str) -> Vec<String> {
    let mut notes = Vec::new();

    if let Some(position) = table.primary_key.iter().position(|pk| pk == column) {
        notes.push(format!("Primary key (position {}).", position + 1));
    }

    for (name, members) in &table.unique_constraints {
        if members.iter().any(|member| member == column) {
            notes.push(format!("Unique constraint `{name}`."));
        }
    }

    for (name, fk) in &table.foreign_keys {
        if let Some(idx) = fk.columns.iter().position(|local| local == column) {
            let target = fk.ref_columns.get(idx).map(String::as_str).unwrap_or("?");
            notes.push(format!(
                "Foreign key `{name}` -> `{}.{}.{target}`.",
                fk.ref_schema, fk.ref_table
            ));
        }
    }

    for (name, index) in &table.indexes {
        if index.columns.iter().any(|member| member == column) {
            let kind = if index.unique { "unique index" } else { "index" };
            notes.push(format!("Member of {kind} `{name}`."));
        }
    }

    notes
}
