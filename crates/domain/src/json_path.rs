//! JSON path lookup over `serde_json::Value`.
//!
//! Supports a small, explicit subset of JSONPath:
//!
//! - `$` (the root), with or without a leading `$.`
//! - dotted keys: `$.user.name`, `user.name`
//! - bracket indices: `$.items[0].id`
//! - quoted bracket keys: `$['content-type']`
//! - numeric dotted segments index arrays: `items.0.id`
//!
//! Wildcards, slices and filters are not supported and are rejected at parse
//! time.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::error::{DomainError, DomainResult};

/// One step of a parsed path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Object key (also used to index arrays when numeric).
    Key(String),
    /// Array index from bracket syntax.
    Index(usize),
    /// Array index counted from the end, `[-1]` being the last element.
    FromEnd(usize),
}

/// A parsed JSON path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonPath {
    raw: String,
    segments: Vec<PathSegment>,
}

impl JsonPath {
    /// Parses a path expression.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidJsonPath` for empty segments, unclosed
    /// brackets, or unsupported bracket expressions.
    pub fn parse(input: &str) -> DomainResult<Self> {
        let trimmed = input.trim();
        let rest = trimmed.strip_prefix('$').unwrap_or(trimmed);
        let invalid = |message: &str| DomainError::InvalidJsonPath {
            path: input.to_string(),
            message: message.to_string(),
        };

        let mut segments = Vec::new();
        let mut key = String::new();
        let mut after_dot = false;
        let mut at_start = true;
        let mut chars = rest.chars();

        while let Some(ch) = chars.next() {
            match ch {
                '.' => {
                    if key.is_empty() {
                        if after_dot || (!at_start && segments.is_empty()) {
                            return Err(invalid("empty path segment"));
                        }
                    } else {
                        segments.push(PathSegment::Key(std::mem::take(&mut key)));
                    }
                    after_dot = true;
                }
                '[' => {
                    if !key.is_empty() {
                        segments.push(PathSegment::Key(std::mem::take(&mut key)));
                    }
                    let mut inner = String::new();
                    let mut closed = false;
                    for c in chars.by_ref() {
                        if c == ']' {
                            closed = true;
                            break;
                        }
                        inner.push(c);
                    }
                    if !closed {
                        return Err(invalid("unclosed '['"));
                    }
                    segments.push(parse_bracket(inner.trim()).map_err(|m| invalid(&m))?);
                    after_dot = false;
                }
                ']' => return Err(invalid("unexpected ']'")),
                _ => {
                    key.push(ch);
                    after_dot = false;
                }
            }
            at_start = false;
        }

        if !key.is_empty() {
            segments.push(PathSegment::Key(key));
        } else if after_dot && !segments.is_empty() {
            return Err(invalid("path ends with '.'"));
        }

        Ok(Self {
            raw: trimmed.to_string(),
            segments,
        })
    }

    /// Returns the path as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns the parsed segments.
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Resolves the path against a document. `None` means the path does not
    /// exist in it.
    #[must_use]
    pub fn lookup<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        let mut current = root;
        for segment in &self.segments {
            current = match (segment, current) {
                (PathSegment::Key(key), Value::Object(map)) => map.get(key)?,
                (PathSegment::Key(key), Value::Array(items)) => {
                    items.get(key.parse::<usize>().ok()?)?
                }
                (PathSegment::Index(index), Value::Array(items)) => items.get(*index)?,
                (PathSegment::FromEnd(n), Value::Array(items)) => {
                    items.get(items.len().checked_sub(*n)?)?
                }
                _ => return None,
            };
        }
        Some(current)
    }
}

fn parse_bracket(inner: &str) -> Result<PathSegment, String> {
    if inner.is_empty() {
        return Err("empty brackets".to_string());
    }
    if inner == "*" {
        return Err("wildcards are not supported".to_string());
    }
    for quote in ['\'', '"'] {
        if let Some(key) = inner
            .strip_prefix(quote)
            .and_then(|s| s.strip_suffix(quote))
        {
            return Ok(PathSegment::Key(key.to_string()));
        }
    }
    let unsupported = || format!("unsupported bracket expression '[{inner}]'");
    match inner.strip_prefix('-') {
        Some(n) => match n.parse::<usize>() {
            Ok(0) | Err(_) => Err(unsupported()),
            Ok(n) => Ok(PathSegment::FromEnd(n)),
        },
        None => inner.parse::<usize>().map(PathSegment::Index).map_err(|_| unsupported()),
    }
}

impl FromStr for JsonPath {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Structural equality for JSON values.
///
/// Containers compare element-wise. Numbers compare by value, so `1` equals
/// `1.0`; every other scalar must match exactly.
#[must_use]
pub fn json_equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => {
            if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
                x == y
            } else if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
                x == y
            } else {
                #[allow(clippy::float_cmp)]
                match (a.as_f64(), b.as_f64()) {
                    (Some(x), Some(y)) => x == y,
                    _ => false,
                }
            }
        }
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| json_equals(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a
                    .iter()
                    .all(|(k, v)| b.get(k).is_some_and(|other| json_equals(v, other)))
        }
        _ => left == right,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn doc() -> Value {
        json!({
            "user": {"id": 123, "name": "John", "tags": ["a", "b"]},
            "items": [{"id": 1}, {"id": 2}],
            "content-type": "json",
            "empty": null
        })
    }

    #[test]
    fn test_dotted_lookup() {
        let path = JsonPath::parse("$.user.name").unwrap();
        assert_eq!(path.lookup(&doc()), Some(&json!("John")));
    }

    #[test]
    fn test_lookup_without_dollar() {
        let path = JsonPath::parse("user.id").unwrap();
        assert_eq!(path.lookup(&doc()), Some(&json!(123)));
    }

    #[test]
    fn test_bracket_index() {
        let path = JsonPath::parse("$.items[1].id").unwrap();
        assert_eq!(path.lookup(&doc()), Some(&json!(2)));
    }

    #[test]
    fn test_negative_index_counts_from_end() {
        let doc = doc();
        let last = JsonPath::parse("$.user.tags[-1]").unwrap();
        assert_eq!(last.segments()[2], PathSegment::FromEnd(1));
        assert_eq!(last.lookup(&doc), Some(&json!("b")));

        let path = JsonPath::parse("$.items[-2].id").unwrap();
        assert_eq!(path.lookup(&doc), Some(&json!(1)));

        let past_start = JsonPath::parse("$.user.tags[-3]").unwrap();
        assert_eq!(past_start.lookup(&doc), None);
    }

    #[test]
    fn test_numeric_dotted_segment_indexes_array() {
        let path = JsonPath::parse("items.0.id").unwrap();
        assert_eq!(path.lookup(&doc()), Some(&json!(1)));
    }

    #[test]
    fn test_quoted_bracket_key() {
        let path = JsonPath::parse("$['content-type']").unwrap();
        assert_eq!(path.lookup(&doc()), Some(&json!("json")));
    }

    #[test]
    fn test_root() {
        let path = JsonPath::parse("$").unwrap();
        assert!(path.segments().is_empty());
        assert_eq!(path.lookup(&doc()), Some(&doc()));
    }

    #[test]
    fn test_null_value_exists() {
        let path = JsonPath::parse("$.empty").unwrap();
        assert_eq!(path.lookup(&doc()), Some(&Value::Null));
    }

    #[test]
    fn test_missing_paths() {
        let doc = doc();
        for raw in ["$.user.missing", "$.items[5]", "$.user.name.first", "$.items.x"] {
            let path = JsonPath::parse(raw).unwrap();
            assert_eq!(path.lookup(&doc), None, "{raw}");
        }
    }

    #[test]
    fn test_parse_errors() {
        for raw in [
            "$.a..b",
            "$.a.",
            "$.items[0",
            "$.items[*]",
            "$.items[x]",
            "$.a]",
            "$.items[-0]",
            "$.items[-]",
        ] {
            assert!(JsonPath::parse(raw).is_err(), "{raw}");
        }
    }

    #[test]
    fn test_json_equals_numbers() {
        assert!(json_equals(&json!(1), &json!(1.0)));
        assert!(json_equals(&json!(-3), &json!(-3)));
        assert!(!json_equals(&json!(1), &json!(2)));
        assert!(!json_equals(&json!(1), &json!("1")));
    }

    #[test]
    fn test_json_equals_containers() {
        assert!(json_equals(
            &json!({"a": [1, 2, {"b": true}]}),
            &json!({"a": [1.0, 2, {"b": true}]})
        ));
        assert!(!json_equals(&json!([1, 2]), &json!([2, 1])));
        assert!(!json_equals(&json!({"a": 1}), &json!({"a": 1, "b": 2})));
    }
}
