//! Rust binding generator for metasync snapshots.
//!
//! Each table of a snapshot becomes one source file holding a serde-ready
//! struct, laid out as `<out>/<database>/<schema>/<table>.rs`.

pub mod engine;
pub mod errors;
pub mod naming;
pub mod render;
pub mod types;

pub use engine::generate_bindings;
pub use errors::GenerateError;
pub use render::render_table;
pub use types::{RustType, map_sql_type};
