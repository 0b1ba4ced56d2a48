use std::sync::LazyLock;

use regex::Regex;

use metasync_core::FkRule;

/// Decode `pg_constraint.confupdtype` / `confdeltype`.
pub fn fk_rule_from_code(code: i8) -> Option<FkRule> {
    match code as u8 {
        b'a' => Some(FkRule::NoAction),
        b'r' => Some(FkRule::Restrict),
        b'c' => Some(FkRule::Cascade),
        b'n' => Some(FkRule::SetNull),
        b'd' => Some(FkRule::SetDefault),
        _ => None,
    }
}

pub fn is_system_schema(schema: &str) -> bool {
    schema.starts_with("pg_") || schema == "information_schema"
}

/// Extract the plain column list from a `pg_get_indexdef` statement.
///
/// Expression indexes have no column list and yield an empty vector.
pub fn parse_index_columns(definition: &str) -> Vec<String> {
    key_list(definition)
        .map(|list| {
            let mut columns = Vec::new();
            for part in split_top_level(list) {
                match plain_column(part) {
                    Some(column) => columns.push(column),
                    None => return Vec::new(),
                }
            }
            columns
        })
        .unwrap_or_default()
}

fn key_list(definition: &str) -> Option<&str> {
    let start = definition
        .find(" USING ")
        .or_else(|| definition.find(" ON "))?;
    let rest = &definition[start..];
    let open = rest.find('(')?;

    let mut depth = 0usize;
    let mut in_quotes = false;
    for (idx, ch) in rest[open..].char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            '(' if !in_quotes => depth += 1,
            ')' if !in_quotes => {
                depth -= 1;
                if depth == 0 {
                    return Some(&rest[open + 1..open + idx]);
                }
            }
            _ => {}
        }
    }
    None
}

fn split_top_level(list: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut in_quotes = false;
    let mut start = 0;
    for (idx, ch) in list.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            '(' if !in_quotes => depth += 1,
            ')' if !in_quotes => depth = depth.saturating_sub(1),
            ',' if !in_quotes && depth == 0 => {
                parts.push(list[start..idx].trim());
                start = idx + 1;
            }
            _ => {}
        }
    }
    parts.push(list[start..].trim());
    parts
}

// Quoted or bare identifier, optionally followed by ordering options.
static PLAIN_COLUMN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r#"^(?:"((?:[^"]|"")+)"|([A-Za-z_][A-Za-z0-9_$]*))(?:\s+.*)?$"#).ok()
});

fn plain_column(part: &str) -> Option<String> {
    let re = PLAIN_COLUMN.as_ref()?;
    let caps = re.captures(part)?;
    if let Some(quoted) = caps.get(1) {
        return Some(quoted.as_str().replace("\"\"", "\""));
    }
    caps.get(2).map(|m| m.as_str().to_string())
}
