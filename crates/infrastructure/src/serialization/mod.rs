//! Deterministic JSON output for reports.
//!
//! - Object keys in declaration order, maps sorted (`BTreeMap` in domain types)
//! - 2-space indentation
//! - Trailing newline

mod json;

pub use json::{SerializationError, to_json_stable};
