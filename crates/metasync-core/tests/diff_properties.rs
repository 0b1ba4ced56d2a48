use std::collections::BTreeMap;

use metasync_core::{
    ChangeAction, ChangeKind, DatabaseSnapshot, FkRule, ForeignKey, Index, SchemaSnapshot,
    Snapshot, TableSnapshot, diff,
};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

fn table(name: &str, columns: &[(&str, &str)]) -> TableSnapshot {
    let mut table = TableSnapshot::new(name);
    for (column, data_type) in columns {
        table
            .columns
            .insert(column.to_string(), data_type.to_string());
    }
    table
}

fn schema(name: &str, tables: Vec<TableSnapshot>) -> SchemaSnapshot {
    SchemaSnapshot {
        name: name.to_string(),
        tables: tables
            .into_iter()
            .map(|table| (table.name.clone(), table))
            .collect(),
    }
}

fn snapshot(databases: Vec<(&str, Vec<SchemaSnapshot>)>) -> Snapshot {
    let mut snapshot = Snapshot::new("test", chrono::DateTime::<chrono::Utc>::UNIX_EPOCH);
    for (name, schemas) in databases {
        snapshot.databases.insert(
            name.to_string(),
            DatabaseSnapshot {
                db_name: name.to_string(),
                schemas: schemas
                    .into_iter()
                    .map(|schema| (schema.name.clone(), schema))
                    .collect(),
            },
        );
    }
    snapshot
}

fn baseline() -> Snapshot {
    let mut users = table("users", &[("id", "integer"), ("email", "text"), ("age", "integer")]);
    users.primary_key = strings(&["id"]);
    users
        .unique_constraints
        .insert("users_email_key".to_string(), strings(&["email"]));
    users
        .check_constraints
        .insert("users_age_check".to_string(), "CHECK (age >= 0)".to_string());
    users.indexes.insert(
        "users_email_idx".to_string(),
        Index {
            name: "users_email_idx".to_string(),
            columns: strings(&["email"]),
            unique: false,
            definition: "CREATE INDEX users_email_idx ON public.users USING btree (email)"
                .to_string(),
        },
    );

    let mut orders = table("orders", &[("id", "bigint"), ("user_id", "integer")]);
    orders.primary_key = strings(&["id"]);
    orders.foreign_keys.insert(
        "fk_user".to_string(),
        ForeignKey {
            name: "fk_user".to_string(),
            columns: strings(&["user_id"]),
            ref_schema: "public".to_string(),
            ref_table: "users".to_string(),
            ref_columns: strings(&["id"]),
            update_rule: FkRule::NoAction,
            delete_rule: FkRule::Cascade,
        },
    );

    snapshot(vec![
        (
            "shop",
            vec![
                schema("public", vec![users, orders]),
                schema("audit", vec![table("events", &[("id", "bigint")])]),
            ],
        ),
        ("billing", vec![schema("public", vec![table("invoices", &[("id", "uuid")])])]),
    ])
}

fn drifted() -> Snapshot {
    let mut next = baseline();
    let shop = next.databases.get_mut("shop").unwrap();
    shop.schemas.remove("audit");
    shop.schemas.insert("reporting".to_string(), schema("reporting", Vec::new()));

    let public = shop.schemas.get_mut("public").unwrap();
    public
        .tables
        .insert("payments".to_string(), table("payments", &[("id", "bigint")]));

    let users = public.tables.get_mut("users").unwrap();
    users.columns.insert("age".to_string(), "bigint".to_string());
    users.columns.remove("email");
    users
        .columns
        .insert("display_name".to_string(), "text".to_string());
    users.unique_constraints.clear();
    users
        .check_constraints
        .insert("users_age_check".to_string(), "CHECK (age > 0)".to_string());
    users.indexes.clear();

    let orders = public.tables.get_mut("orders").unwrap();
    orders.primary_key.clear();
    orders.foreign_keys.get_mut("fk_user").unwrap().delete_rule = FkRule::Restrict;

    next.databases.remove("billing");
    next.databases.insert(
        "crm".to_string(),
        DatabaseSnapshot {
            db_name: "crm".to_string(),
            schemas: BTreeMap::new(),
        },
    );
    next
}

fn key(change: &metasync_core::Change) -> String {
    change.path()
}

#[test]
fn diff_of_snapshot_with_itself_is_empty() {
    let snapshot = baseline();
    assert!(diff(&snapshot, &snapshot).is_empty());
    assert!(diff(&drifted(), &drifted()).is_empty());
}

#[test]
fn diff_is_deterministic() {
    let first: Vec<String> = diff(&baseline(), &drifted())
        .iter()
        .map(ToString::to_string)
        .collect();
    let second: Vec<String> = diff(&baseline(), &drifted())
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(first, second);
}

#[test]
fn diff_produces_expected_ordered_log() {
    let lines: Vec<String> = diff(&baseline(), &drifted())
        .iter()
        .map(ToString::to_string)
        .collect();

    assert_eq!(
        lines,
        vec![
            "- schema dropped: billing.public",
            "+ schema added: shop.reporting",
            "- schema dropped: shop.audit",
            "+ table added: shop.public.payments",
            "- primary key dropped: shop.public.orders (was [id])",
            "~ foreign key changed: shop.public.orders.fk_user ([user_id] -> public.users [id] on update NO ACTION on delete CASCADE -> [user_id] -> public.users [id] on update NO ACTION on delete RESTRICT)",
            "+ column added: shop.public.users.display_name (text)",
            "- column dropped: shop.public.users.email (was text)",
            "~ column type changed: shop.public.users.age (integer -> bigint)",
            "- unique constraint dropped: shop.public.users.users_email_key (was [email])",
            "~ check constraint changed: shop.public.users.users_age_check (CHECK (age >= 0) -> CHECK (age > 0))",
            "- index dropped: shop.public.users.users_email_idx (was unique=false cols=[email])",
        ]
    );
}

#[test]
fn added_and_removed_events_mirror_when_reversed() {
    let forward = diff(&baseline(), &drifted());
    let backward = diff(&drifted(), &baseline());

    let mirror = |kind: ChangeKind| -> Option<ChangeKind> {
        use ChangeKind::*;
        Some(match kind {
            SchemaAdded => SchemaRemoved,
            SchemaRemoved => SchemaAdded,
            TableAdded => TableRemoved,
            TableRemoved => TableAdded,
            ColumnAdded => ColumnRemoved,
            ColumnRemoved => ColumnAdded,
            PrimaryKeySet => PrimaryKeyDropped,
            PrimaryKeyDropped => PrimaryKeySet,
            UniqueAdded => UniqueRemoved,
            UniqueRemoved => UniqueAdded,
            CheckAdded => CheckRemoved,
            CheckRemoved => CheckAdded,
            ForeignKeyAdded => ForeignKeyRemoved,
            ForeignKeyRemoved => ForeignKeyAdded,
            IndexAdded => IndexRemoved,
            IndexRemoved => IndexAdded,
            _ => return None,
        })
    };

    for change in &forward {
        match mirror(change.kind) {
            Some(expected) => assert!(
                backward
                    .iter()
                    .any(|other| other.kind == expected && key(other) == key(change)),
                "no mirror for {change}"
            ),
            None => assert!(
                backward.iter().any(|other| other.kind == change.kind
                    && key(other) == key(change)
                    && other.before == change.after
                    && other.after == change.before),
                "no reversed change for {change}"
            ),
        }
    }
    assert_eq!(forward.len(), backward.len());
}

#[test]
fn database_missing_from_old_reports_all_schemas_added() {
    let old = snapshot(Vec::new());
    let new = snapshot(vec![(
        "fresh",
        vec![
            schema("public", vec![table("a", &[("id", "integer")])]),
            schema("app", Vec::new()),
        ],
    )]);

    let changes = diff(&old, &new);
    let kinds: Vec<(ChangeKind, String)> = changes
        .iter()
        .map(|change| (change.kind, change.schema.clone()))
        .collect();
    assert_eq!(
        kinds,
        vec![
            (ChangeKind::SchemaAdded, "app".to_string()),
            (ChangeKind::SchemaAdded, "public".to_string()),
        ]
    );
    assert!(
        changes
            .iter()
            .all(|change| change.kind.action() == ChangeAction::Added)
    );
}

#[test]
fn changes_serialize_with_snake_case_kinds() {
    let changes = diff(&baseline(), &drifted());
    let json = serde_json::to_value(&changes).expect("serialize changes");
    assert_eq!(json[0]["kind"], "schema_removed");
    assert_eq!(json[0]["database"], "billing");
    assert!(json[0].get("table").is_none());
    assert_eq!(json[8]["before"]["type"], "type");
    assert_eq!(json[8]["after"]["value"], "bigint");
}
