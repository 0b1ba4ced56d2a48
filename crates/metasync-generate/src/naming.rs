use std::collections::HashSet;

const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do",
    "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in",
    "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe", "unsized",
    "use", "virtual", "where", "while", "yield",
];

// Cannot be written as raw identifiers.
const RESERVED: &[&str] = &["crate", "self", "super", "Self", "_"];

fn words(name: &str) -> Vec<String> {
    let chars: Vec<char> = name.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (idx, &ch) in chars.iter().enumerate() {
        if !ch.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }
        if ch.is_uppercase() && !current.is_empty() {
            let prev = chars[idx - 1];
            let next_is_lower = chars.get(idx + 1).is_some_and(|next| next.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower)
            {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(ch);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// `order_items` -> `OrderItems`, `userID` -> `UserId`.
pub fn to_pascal_case(name: &str) -> String {
    let mut out: String = words(name)
        .iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect();
    if out.is_empty() {
        out.push_str("Table");
    } else if out.starts_with(|ch: char| ch.is_ascii_digit()) {
        out.insert_str(0, "Table");
    }
    out
}

/// `createdAt` -> `created_at`, `Order Items` -> `order_items`.
pub fn to_snake_case(name: &str) -> String {
    words(name)
        .iter()
        .map(|word| word.to_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// Snake-case field identifier that is valid Rust source.
pub fn field_ident(column: &str) -> String {
    let mut ident = to_snake_case(column);
    if ident.is_empty() {
        ident.push_str("column");
    } else if ident.starts_with(|ch: char| ch.is_ascii_digit()) {
        ident.insert(0, '_');
    }

    if RESERVED.contains(&ident.as_str()) {
        ident.push('_');
    } else if KEYWORDS.contains(&ident.as_str()) {
        ident.insert_str(0, "r#");
    }
    ident
}

/// Make a database or schema name safe as a directory name.
pub fn sanitize_path_segment(name: &str) -> String {
    name.replace([' ', '.', '-'], "_")
}

/// File stem for a table's binding file.
pub fn file_stem(table: &str) -> String {
    let stem = to_snake_case(table);
    if stem.is_empty() {
        "table".to_string()
    } else {
        stem
    }
}

/// Return `base`, or `base_2`, `base_3`, ... if an earlier sibling already
/// claimed it. Comparison ignores ASCII case so case-insensitive filesystems
/// keep every entry apart.
pub fn claim_unique(used: &mut HashSet<String>, base: String) -> String {
    let mut candidate = base.clone();
    let mut suffix = 2;
    while !used.insert(candidate.to_ascii_lowercase()) {
        candidate = format!("{base}_{suffix}");
        suffix += 1;
    }
    candidate
}
