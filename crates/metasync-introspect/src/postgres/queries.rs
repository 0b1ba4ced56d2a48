use sqlx::PgPool;

use metasync_core::{Error, Result};

fn query_error(what: &str, schema: &str, err: sqlx::Error) -> Error {
    Error::Query(format!("{what} in schema {schema}: {err}"))
}

pub async fn list_schemas(pool: &PgPool) -> Result<Vec<String>> {
    sqlx::query_scalar::<_, String>(
        r#"
        select nspname::text
        from pg_catalog.pg_namespace
        order by nspname
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(|err| Error::Query(format!("listing schemas: {err}")))
}

pub async fn list_tables(pool: &PgPool, schema: &str, relkinds: &[String]) -> Result<Vec<String>> {
    sqlx::query_scalar::<_, String>(
        r#"
        select c.relname::text
        from pg_catalog.pg_class c
        join pg_catalog.pg_namespace n on n.oid = c.relnamespace
        where n.nspname = $1
          and c.relkind::text = any($2)
        order by c.relname
        "#,
    )
    .bind(schema)
    .bind(relkinds)
    .fetch_all(pool)
    .await
    .map_err(|err| query_error("listing tables", schema, err))
}

#[derive(Debug, sqlx::FromRow)]
pub struct RawColumn {
    pub table_name: String,
    pub name: String,
    pub data_type: String,
}

pub async fn list_columns(pool: &PgPool, schema: &str) -> Result<Vec<RawColumn>> {
    sqlx::query_as::<_, RawColumn>(
        r#"
        select
          table_name::text as table_name,
          column_name::text as name,
          data_type::text as data_type
        from information_schema.columns
        where table_schema = $1
        order by table_name, ordinal_position
        "#,
    )
    .bind(schema)
    .fetch_all(pool)
    .await
    .map_err(|err| query_error("listing columns", schema, err))
}

/// Primary key or unique constraint with its columns in key order.
#[derive(Debug, sqlx::FromRow)]
pub struct RawKeyConstraint {
    pub table_name: String,
    pub name: String,
    pub columns: Vec<String>,
}

/// `contype` is `p` for primary keys and `u` for unique constraints.
pub async fn list_key_constraints(
    pool: &PgPool,
    schema: &str,
    contype: &str,
) -> Result<Vec<RawKeyConstraint>> {
    sqlx::query_as::<_, RawKeyConstraint>(
        r#"
        select
          rel.relname::text as table_name,
          con.conname::text as name,
          array_agg(att.attname::text order by k.ordinality) as columns
        from pg_catalog.pg_constraint con
        join pg_catalog.pg_class rel on rel.oid = con.conrelid
        join pg_catalog.pg_namespace nsp on nsp.oid = rel.relnamespace
        join unnest(con.conkey) with ordinality as k(attnum, ordinality) on true
        join pg_catalog.pg_attribute att on att.attrelid = rel.oid and att.attnum = k.attnum
        where nsp.nspname = $1
          and con.contype::text = $2
        group by rel.relname, con.conname
        order by rel.relname, con.conname
        "#,
    )
    .bind(schema)
    .bind(contype)
    .fetch_all(pool)
    .await
    .map_err(|err| query_error("listing key constraints", schema, err))
}

#[derive(Debug, sqlx::FromRow)]
pub struct RawCheckConstraint {
    pub table_name: String,
    pub name: String,
    pub expression: String,
}

pub async fn list_check_constraints(pool: &PgPool, schema: &str) -> Result<Vec<RawCheckConstraint>> {
    sqlx::query_as::<_, RawCheckConstraint>(
        r#"
        select
          rel.relname::text as table_name,
          con.conname::text as name,
          pg_catalog.pg_get_constraintdef(con.oid, true) as expression
        from pg_catalog.pg_constraint con
        join pg_catalog.pg_class rel on rel.oid = con.conrelid
        join pg_catalog.pg_namespace nsp on nsp.oid = rel.relnamespace
        where nsp.nspname = $1
          and con.contype = 'c'
        order by rel.relname, con.conname
        "#,
    )
    .bind(schema)
    .fetch_all(pool)
    .await
    .map_err(|err| query_error("listing check constraints", schema, err))
}

#[derive(Debug, sqlx::FromRow)]
pub struct RawForeignKey {
    pub table_name: String,
    pub name: String,
    pub columns: Vec<String>,
    pub ref_schema: String,
    pub ref_table: String,
    pub ref_columns: Vec<String>,
    pub on_update_code: i8,
    pub on_delete_code: i8,
}

pub async fn list_foreign_keys(pool: &PgPool, schema: &str) -> Result<Vec<RawForeignKey>> {
    sqlx::query_as::<_, RawForeignKey>(
        r#"
        select
          rel.relname::text as table_name,
          con.conname::text as name,
          array_agg(src_att.attname::text order by k.ordinality) as columns,
          ref_nsp.nspname::text as ref_schema,
          ref_rel.relname::text as ref_table,
          array_agg(ref_att.attname::text order by k.ordinality) as ref_columns,
          con.confupdtype as on_update_code,
          con.confdeltype as on_delete_code
        from pg_catalog.pg_constraint con
        join pg_catalog.pg_class rel on rel.oid = con.conrelid
        join pg_catalog.pg_namespace nsp on nsp.oid = rel.relnamespace
        join pg_catalog.pg_class ref_rel on ref_rel.oid = con.confrelid
        join pg_catalog.pg_namespace ref_nsp on ref_nsp.oid = ref_rel.relnamespace
        join unnest(con.conkey, con.confkey) with ordinality as k(attnum, ref_attnum, ordinality) on true
        join pg_catalog.pg_attribute src_att on src_att.attrelid = rel.oid and src_att.attnum = k.attnum
        join pg_catalog.pg_attribute ref_att on ref_att.attrelid = ref_rel.oid and ref_att.attnum = k.ref_attnum
        where nsp.nspname = $1
          and con.contype = 'f'
        group by
          rel.relname, con.conname, ref_nsp.nspname, ref_rel.relname,
          con.confupdtype, con.confdeltype
        order by rel.relname, con.conname
        "#,
    )
    .bind(schema)
    .fetch_all(pool)
    .await
    .map_err(|err| query_error("listing foreign keys", schema, err))
}

#[derive(Debug, sqlx::FromRow)]
pub struct RawIndex {
    pub table_name: String,
    pub name: String,
    pub is_unique: bool,
    pub definition: String,
}

pub async fn list_indexes(pool: &PgPool, schema: &str) -> Result<Vec<RawIndex>> {
    sqlx::query_as::<_, RawIndex>(
        r#"
        select
          tbl.relname::text as table_name,
          idx.relname::text as name,
          i.indisunique as is_unique,
          pg_catalog.pg_get_indexdef(i.indexrelid) as definition
        from pg_catalog.pg_index i
        join pg_catalog.pg_class tbl on tbl.oid = i.indrelid
        join pg_catalog.pg_namespace nsp on nsp.oid = tbl.relnamespace
        join pg_catalog.pg_class idx on idx.oid = i.indexrelid
        where nsp.nspname = $1
        order by tbl.relname, idx.relname
        "#,
    )
    .bind(schema)
    .fetch_all(pool)
    .await
    .map_err(|err| query_error("listing indexes", schema, err))
}
