use std::fmt;

/// Rust type chosen for a column in generated bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RustType {
    I16,
    I32,
    I64,
    F32,
    F64,
    Bool,
    String,
    Bytes,
    DateTimeUtc,
    NaiveDateTime,
    NaiveDate,
    NaiveTime,
    /// Fallback for types with no direct mapping.
    Opaque,
}

impl RustType {
    pub fn as_str(self) -> &'static str {
        match self {
            RustType::I16 => "i16",
            RustType::I32 => "i32",
            RustType::I64 => "i64",
            RustType::F32 => "f32",
            RustType::F64 => "f64",
            RustType::Bool => "bool",
            RustType::String => "String",
            RustType::Bytes => "Vec<u8>",
            RustType::DateTimeUtc => "DateTime<Utc>",
            RustType::NaiveDateTime => "NaiveDateTime",
            RustType::NaiveDate => "NaiveDate",
            RustType::NaiveTime => "NaiveTime",
            RustType::Opaque => "serde_json::Value",
        }
    }

    /// Names this type needs from `chrono`.
    pub fn chrono_imports(self) -> &'static [&'static str] {
        match self {
            RustType::DateTimeUtc => &["DateTime", "Utc"],
            RustType::NaiveDateTime => &["NaiveDateTime"],
            RustType::NaiveDate => &["NaiveDate"],
            RustType::NaiveTime => &["NaiveTime"],
            _ => &[],
        }
    }
}

impl fmt::Display for RustType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a catalog type name to the Rust type used in bindings.
///
/// Matching is case-insensitive and ignores type modifiers such as
/// `(255)` or `(12,2)`.
pub fn map_sql_type(raw: &str) -> RustType {
    let lowered = raw.trim().to_lowercase();
    let normalized = strip_modifiers(&lowered);

    match normalized.as_str() {
        "smallint" | "int2" | "smallserial" => RustType::I16,
        "integer" | "int" | "int4" | "serial" => RustType::I32,
        "bigint" | "int8" | "bigserial" => RustType::I64,
        "real" | "float4" => RustType::F32,
        "double precision" | "float8" | "float" => RustType::F64,
        "numeric" | "decimal" | "money" => RustType::String,
        "boolean" | "bool" => RustType::Bool,
        "timestamp with time zone" | "timestamptz" => RustType::DateTimeUtc,
        "timestamp" | "timestamp without time zone" => RustType::NaiveDateTime,
        "date" => RustType::NaiveDate,
        "time" | "time without time zone" | "time with time zone" | "timetz" => {
            RustType::NaiveTime
        }
        "json" | "jsonb" => RustType::Bytes,
        "uuid" => RustType::String,
        "char" | "character" | "bpchar" | "varchar" | "character varying" | "text"
        | "citext" | "enum" | "name" => RustType::String,
        "bytea" | "binary" | "varbinary" => RustType::Bytes,
        _ => RustType::Opaque,
    }
}

fn strip_modifiers(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut depth = 0usize;
    for ch in name.chars() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(ch),
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}
