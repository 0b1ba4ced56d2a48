use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Referential action applied on update or delete of the referenced row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum FkRule {
    #[default]
    #[serde(rename = "NO ACTION")]
    NoAction,
    #[serde(rename = "CASCADE")]
    Cascade,
    #[serde(rename = "SET NULL")]
    SetNull,
    #[serde(rename = "SET DEFAULT")]
    SetDefault,
    #[serde(rename = "RESTRICT")]
    Restrict,
}

impl FkRule {
    /// SQL spelling of the rule.
    pub fn as_sql(self) -> &'static str {
        match self {
            FkRule::NoAction => "NO ACTION",
            FkRule::Cascade => "CASCADE",
            FkRule::SetNull => "SET NULL",
            FkRule::SetDefault => "SET DEFAULT",
            FkRule::Restrict => "RESTRICT",
        }
    }
}

impl fmt::Display for FkRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Foreign key definition preserving column ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ForeignKey {
    pub name: String,
    /// Local columns in key order.
    #[serde(default)]
    pub columns: Vec<String>,
    pub ref_schema: String,
    pub ref_table: String,
    /// Referenced columns, positionally paired with `columns`.
    #[serde(default)]
    pub ref_columns: Vec<String>,
    #[serde(default)]
    pub update_rule: FkRule,
    #[serde(default)]
    pub delete_rule: FkRule,
}

impl fmt::Display for ForeignKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] -> {}.{} [{}] on update {} on delete {}",
            self.columns.join(", "),
            self.ref_schema,
            self.ref_table,
            self.ref_columns.join(", "),
            self.update_rule,
            self.delete_rule
        )
    }
}

/// Index definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Index {
    pub name: String,
    /// Key columns parsed from `definition`; empty for expression indexes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<String>,
    #[serde(default)]
    pub unique: bool,
    /// Full `CREATE INDEX` text as reported by the catalog.
    pub definition: String,
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.columns.is_empty() {
            write!(f, "unique={} {}", self.unique, self.definition)
        } else {
            write!(f, "unique={} cols=[{}]", self.unique, self.columns.join(", "))
        }
    }
}
