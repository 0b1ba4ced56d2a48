/// Options that control which catalog objects are collected.
#[derive(Debug, Clone)]
pub struct CollectOptions {
    /// Keep `pg_*` and `information_schema` namespaces.
    pub include_system_schemas: bool,
    /// Treat views and materialized views as tables.
    pub include_views: bool,
    pub include_indexes: bool,
    /// Restrict collection to these schemas when set.
    pub schemas: Option<Vec<String>>,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            include_system_schemas: false,
            include_views: true,
            include_indexes: true,
            schemas: None,
        }
    }
}

impl CollectOptions {
    /// `pg_class.relkind` codes collected as tables.
    pub fn relkinds(&self) -> Vec<String> {
        let mut kinds = vec!["r", "p", "f"];
        if self.include_views {
            kinds.extend(["v", "m"]);
        }
        kinds.into_iter().map(str::to_string).collect()
    }
}
