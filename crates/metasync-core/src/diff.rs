//! Structural drift detection between two snapshots.
//!
//! Every level (database, schema, table, and the per-table column and
//! constraint maps) is split into added, removed and common keys. Added and
//! removed keys produce one event each; common containers are walked one
//! level deeper and common leaves are compared by value. Maps are
//! `BTreeMap`s, so walking them yields names in lexicographic order and the
//! output is stable across runs.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constraints::{ForeignKey, Index};
use crate::schema::{SchemaSnapshot, Snapshot, TableSnapshot};

/// Classification of a single structural change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    SchemaAdded,
    SchemaRemoved,
    TableAdded,
    TableRemoved,
    ColumnAdded,
    ColumnRemoved,
    ColumnTypeChanged,
    PrimaryKeySet,
    PrimaryKeyDropped,
    PrimaryKeyChanged,
    UniqueAdded,
    UniqueRemoved,
    UniqueChanged,
    CheckAdded,
    CheckRemoved,
    CheckChanged,
    ForeignKeyAdded,
    ForeignKeyRemoved,
    ForeignKeyChanged,
    IndexAdded,
    IndexRemoved,
    IndexChanged,
}

/// Direction of a change, shared by every kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeAction {
    Added,
    Removed,
    Changed,
}

impl ChangeKind {
    pub fn action(self) -> ChangeAction {
        use ChangeKind::*;
        match self {
            SchemaAdded | TableAdded | ColumnAdded | PrimaryKeySet | UniqueAdded | CheckAdded
            | ForeignKeyAdded | IndexAdded => ChangeAction::Added,
            SchemaRemoved | TableRemoved | ColumnRemoved | PrimaryKeyDropped | UniqueRemoved
            | CheckRemoved | ForeignKeyRemoved | IndexRemoved => ChangeAction::Removed,
            ColumnTypeChanged | PrimaryKeyChanged | UniqueChanged | CheckChanged
            | ForeignKeyChanged | IndexChanged => ChangeAction::Changed,
        }
    }

    /// One-character marker used in rendered output.
    pub fn glyph(self) -> char {
        match self.action() {
            ChangeAction::Added => '+',
            ChangeAction::Removed => '-',
            ChangeAction::Changed => '~',
        }
    }

    /// Fixed human-readable tag.
    pub fn tag(self) -> &'static str {
        use ChangeKind::*;
        match self {
            SchemaAdded => "schema added",
            SchemaRemoved => "schema dropped",
            TableAdded => "table added",
            TableRemoved => "table dropped",
            ColumnAdded => "column added",
            ColumnRemoved => "column dropped",
            ColumnTypeChanged => "column type changed",
            PrimaryKeySet => "primary key set",
            PrimaryKeyDropped => "primary key dropped",
            PrimaryKeyChanged => "primary key changed",
            UniqueAdded => "unique constraint added",
            UniqueRemoved => "unique constraint dropped",
            UniqueChanged => "unique constraint changed",
            CheckAdded => "check constraint added",
            CheckRemoved => "check constraint dropped",
            CheckChanged => "check constraint changed",
            ForeignKeyAdded => "foreign key added",
            ForeignKeyRemoved => "foreign key dropped",
            ForeignKeyChanged => "foreign key changed",
            IndexAdded => "index added",
            IndexRemoved => "index dropped",
            IndexChanged => "index changed",
        }
    }
}

/// Value on one side of a change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Detail {
    /// Raw column type.
    Type(String),
    /// Ordered key columns (primary key or unique constraint).
    Columns(Vec<String>),
    /// Check constraint expression.
    Expression(String),
    ForeignKey(ForeignKey),
    Index(Index),
}

impl fmt::Display for Detail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Detail::Type(value) | Detail::Expression(value) => f.write_str(value),
            Detail::Columns(columns) => write!(f, "[{}]", columns.join(", ")),
            Detail::ForeignKey(fk) => fmt::Display::fmt(fk, f),
            Detail::Index(index) => fmt::Display::fmt(index, f),
        }
    }
}

/// One classified unit of drift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    pub kind: ChangeKind,
    pub database: String,
    pub schema: String,
    /// Absent for schema-level changes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    /// Column or constraint name; absent for schema, table and primary key changes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<Detail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<Detail>,
}

impl Change {
    /// Dotted location: `database.schema[.table[.name]]`.
    pub fn path(&self) -> String {
        let mut path = format!("{}.{}", self.database, self.schema);
        for part in [&self.table, &self.name].into_iter().flatten() {
            path.push('.');
            path.push_str(part);
        }
        path
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.kind.glyph(), self.kind.tag(), self.path())?;
        match (&self.before, &self.after) {
            (Some(before), Some(after)) => write!(f, " ({before} -> {after})"),
            (None, Some(after)) => write!(f, " ({after})"),
            (Some(before), None) => write!(f, " (was {before})"),
            (None, None) => Ok(()),
        }
    }
}

/// Event counts per direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiffSummary {
    pub added: usize,
    pub removed: usize,
    pub changed: usize,
}

impl DiffSummary {
    pub fn from_changes(changes: &[Change]) -> Self {
        let mut summary = Self::default();
        for change in changes {
            match change.kind.action() {
                ChangeAction::Added => summary.added += 1,
                ChangeAction::Removed => summary.removed += 1,
                ChangeAction::Changed => summary.changed += 1,
            }
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.added + self.removed + self.changed
    }
}

/// Compare two snapshots and return every structural change from `old` to `new`.
///
/// A database present on only one side is treated as having no schemas on
/// the other, so each of its schemas is reported as added or removed.
pub fn diff(old: &Snapshot, new: &Snapshot) -> Vec<Change> {
    let empty = BTreeMap::new();
    let names: BTreeSet<&str> = old
        .databases
        .keys()
        .chain(new.databases.keys())
        .map(String::as_str)
        .collect();

    let mut changes = Vec::new();
    for database in names {
        let old_schemas = old.databases.get(database).map_or(&empty, |db| &db.schemas);
        let new_schemas = new.databases.get(database).map_or(&empty, |db| &db.schemas);
        diff_schemas(database, old_schemas, new_schemas, &mut changes);
    }
    changes
}

struct Partition<'a, V> {
    added: Vec<(&'a str, &'a V)>,
    removed: Vec<(&'a str, &'a V)>,
    common: Vec<(&'a str, &'a V, &'a V)>,
}

fn partition<'a, V>(old: &'a BTreeMap<String, V>, new: &'a BTreeMap<String, V>) -> Partition<'a, V> {
    let added = new
        .iter()
        .filter(|(key, _)| !old.contains_key(*key))
        .map(|(key, value)| (key.as_str(), value))
        .collect();

    let mut removed = Vec::new();
    let mut common = Vec::new();
    for (key, old_value) in old {
        match new.get(key) {
            Some(new_value) => common.push((key.as_str(), old_value, new_value)),
            None => removed.push((key.as_str(), old_value)),
        }
    }

    Partition {
        added,
        removed,
        common,
    }
}

/// Where events are being emitted.
struct Location<'a> {
    database: &'a str,
    schema: &'a str,
    table: Option<&'a str>,
}

impl Location<'_> {
    fn change(
        &self,
        kind: ChangeKind,
        name: Option<&str>,
        before: Option<Detail>,
        after: Option<Detail>,
    ) -> Change {
        Change {
            kind,
            database: self.database.to_string(),
            schema: self.schema.to_string(),
            table: self.table.map(str::to_string),
            name: name.map(str::to_string),
            before,
            after,
        }
    }
}

fn diff_schemas(
    database: &str,
    old: &BTreeMap<String, SchemaSnapshot>,
    new: &BTreeMap<String, SchemaSnapshot>,
    out: &mut Vec<Change>,
) {
    let parts = partition(old, new);
    let at = |schema| Location {
        database,
        schema,
        table: None,
    };

    for (schema, _) in parts.added {
        out.push(at(schema).change(ChangeKind::SchemaAdded, None, None, None));
    }
    for (schema, _) in parts.removed {
        out.push(at(schema).change(ChangeKind::SchemaRemoved, None, None, None));
    }
    for (schema, old_schema, new_schema) in parts.common {
        diff_tables(&at(schema), &old_schema.tables, &new_schema.tables, out);
    }
}

fn diff_tables(
    loc: &Location<'_>,
    old: &BTreeMap<String, TableSnapshot>,
    new: &BTreeMap<String, TableSnapshot>,
    out: &mut Vec<Change>,
) {
    let parts = partition(old, new);
    let at = |table| Location {
        database: loc.database,
        schema: loc.schema,
        table: Some(table),
    };

    for (table, _) in parts.added {
        out.push(at(table).change(ChangeKind::TableAdded, None, None, None));
    }
    for (table, _) in parts.removed {
        out.push(at(table).change(ChangeKind::TableRemoved, None, None, None));
    }
    for (table, old_table, new_table) in parts.common {
        diff_table(&at(table), old_table, new_table, out);
    }
}

fn diff_table(loc: &Location<'_>, old: &TableSnapshot, new: &TableSnapshot, out: &mut Vec<Change>) {
    diff_entries(
        loc,
        &old.columns,
        &new.columns,
        EntryKinds {
            added: ChangeKind::ColumnAdded,
            removed: ChangeKind::ColumnRemoved,
            changed: ChangeKind::ColumnTypeChanged,
        },
        |left, right| left == right,
        |data_type| Detail::Type(data_type.clone()),
        out,
    );

    diff_primary_key(loc, &old.primary_key, &new.primary_key, out);

    diff_entries(
        loc,
        &old.unique_constraints,
        &new.unique_constraints,
        EntryKinds {
            added: ChangeKind::UniqueAdded,
            removed: ChangeKind::UniqueRemoved,
            changed: ChangeKind::UniqueChanged,
        },
        |left, right| left == right,
        |columns| Detail::Columns(columns.clone()),
        out,
    );

    diff_entries(
        loc,
        &old.check_constraints,
        &new.check_constraints,
        EntryKinds {
            added: ChangeKind::CheckAdded,
            removed: ChangeKind::CheckRemoved,
            changed: ChangeKind::CheckChanged,
        },
        |left, right| left == right,
        |expression| Detail::Expression(expression.clone()),
        out,
    );

    diff_entries(
        loc,
        &old.foreign_keys,
        &new.foreign_keys,
        EntryKinds {
            added: ChangeKind::ForeignKeyAdded,
            removed: ChangeKind::ForeignKeyRemoved,
            changed: ChangeKind::ForeignKeyChanged,
        },
        same_foreign_key,
        |fk| Detail::ForeignKey(fk.clone()),
        out,
    );

    diff_entries(
        loc,
        &old.indexes,
        &new.indexes,
        EntryKinds {
            added: ChangeKind::IndexAdded,
            removed: ChangeKind::IndexRemoved,
            changed: ChangeKind::IndexChanged,
        },
        same_index,
        |index| Detail::Index(index.clone()),
        out,
    );
}

struct EntryKinds {
    added: ChangeKind,
    removed: ChangeKind,
    changed: ChangeKind,
}

fn diff_entries<V>(
    loc: &Location<'_>,
    old: &BTreeMap<String, V>,
    new: &BTreeMap<String, V>,
    kinds: EntryKinds,
    same: impl Fn(&V, &V) -> bool,
    detail: impl Fn(&V) -> Detail,
    out: &mut Vec<Change>,
) {
    let parts = partition(old, new);

    for (name, value) in parts.added {
        out.push(loc.change(kinds.added, Some(name), None, Some(detail(value))));
    }
    for (name, value) in parts.removed {
        out.push(loc.change(kinds.removed, Some(name), Some(detail(value)), None));
    }
    for (name, old_value, new_value) in parts.common {
        if !same(old_value, new_value) {
            out.push(loc.change(
                kinds.changed,
                Some(name),
                Some(detail(old_value)),
                Some(detail(new_value)),
            ));
        }
    }
}

fn diff_primary_key(loc: &Location<'_>, old: &[String], new: &[String], out: &mut Vec<Change>) {
    if old == new {
        return;
    }

    let kind = match (old.is_empty(), new.is_empty()) {
        (true, false) => ChangeKind::PrimaryKeySet,
        (false, true) => ChangeKind::PrimaryKeyDropped,
        _ => ChangeKind::PrimaryKeyChanged,
    };
    let before = (!old.is_empty()).then(|| Detail::Columns(old.to_vec()));
    let after = (!new.is_empty()).then(|| Detail::Columns(new.to_vec()));
    out.push(loc.change(kind, None, before, after));
}

fn same_foreign_key(left: &ForeignKey, right: &ForeignKey) -> bool {
    left.columns == right.columns
        && left.ref_schema == right.ref_schema
        && left.ref_table == right.ref_table
        && left.ref_columns == right.ref_columns
        && left.update_rule == right.update_rule
        && left.delete_rule == right.delete_rule
}

fn same_index(left: &Index, right: &Index) -> bool {
    left.unique == right.unique
        && left.definition == right.definition
        && left.columns == right.columns
}
