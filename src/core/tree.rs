//! Translation tree model and dotted-path addressing.
//!
//! A translation tree is a JSON object loaded with `preserve_order`, so key
//! order survives a load/save cycle. Traversal never inspects raw `Value`
//! variants directly; it goes through [`Node`], which splits every value into
//! the three shapes the diff and merge engines care about.

use serde_json::{Map, Value};

/// A translation tree: the root object of a locale file.
pub type Tree = Map<String, Value>;

/// Borrowed, tagged view of a tree value.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    /// String, number, boolean or null. Always a leaf.
    Scalar(&'a Value),
    /// Arrays are leaves too; they are translated as a whole.
    Array(&'a [Value]),
    /// Nested subtree, recursed into.
    Object(&'a Tree),
}

impl<'a> Node<'a> {
    pub fn of(value: &'a Value) -> Self {
        match value {
            Value::Object(map) => Node::Object(map),
            Value::Array(items) => Node::Array(items),
            other => Node::Scalar(other),
        }
    }
}

/// Human-readable name of a value's shape, used in warnings.
pub fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Append `key` to a dotted path prefix.
pub fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

/// Whether `key` can be a path segment.
///
/// Keys that are empty or contain `.` cannot be addressed by a dotted path.
pub fn is_addressable_key(key: &str) -> bool {
    !key.is_empty() && !key.contains('.')
}

/// Split a dotted path into its segments.
///
/// Returns `None` for an empty path or one with an empty segment
/// (`"a..b"`, `".a"`, `"a."`).
pub fn split_path(path: &str) -> Option<Vec<&str>> {
    let parts: Vec<&str> = path.split('.').collect();
    if parts.iter().any(|part| part.is_empty()) {
        return None;
    }
    Some(parts)
}

/// Look up the value at a dotted path.
pub fn get_path<'a>(tree: &'a Tree, path: &str) -> Option<&'a Value> {
    let parts = split_path(path)?;
    let (last, parents) = parts.split_last()?;

    let mut current = tree;
    for part in parents {
        match current.get(*part) {
            Some(Value::Object(map)) => current = map,
            _ => return None,
        }
    }
    current.get(*last)
}

pub fn contains_path(tree: &Tree, path: &str) -> bool {
    get_path(tree, path).is_some()
}

/// Structural equality that ignores object key order.
///
/// Arrays compare element by element; numbers compare by value, so `1` and
/// `1.0` are equal.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Object(left), Value::Object(right)) => {
            left.len() == right.len()
                && left
                    .iter()
                    .all(|(key, value)| right.get(key).is_some_and(|other| values_equal(value, other)))
        }
        (Value::Array(left), Value::Array(right)) => {
            left.len() == right.len()
                && left
                    .iter()
                    .zip(right)
                    .all(|(value, other)| values_equal(value, other))
        }
        (Value::Number(left), Value::Number(right)) => {
            left == right || left.as_f64().is_some_and(|l| right.as_f64() == Some(l))
        }
        _ => a == b,
    }
}
