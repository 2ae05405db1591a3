//! Merge engine: writes translated values back into a target tree.

use std::collections::{HashMap, HashSet};

use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use super::task::TranslationTask;
use super::tree::{Tree, kind_name, split_path};
use crate::provider::TranslationResult;

/// What happened to the key written by [`set_nested_property`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Added,
    Updated,
    /// An intermediate segment held a non-object value that was replaced by an
    /// object to make room for the path. The old value is lost.
    Replaced,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeError {
    #[error("invalid key path \"{0}\"")]
    InvalidPath(String),
    #[error("\"{0}\" was not requested in this run")]
    UnexpectedKey(String),
    #[error("expected {expected} for \"{path}\", got {found}")]
    ShapeMismatch {
        path: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// Set `value` at a dotted `path`, creating intermediate objects as needed.
///
/// **Destructive**: an existing non-object value at an intermediate segment is
/// overwritten with a fresh object. This is reported as [`KeyAction::Replaced`]
/// so callers can surface the loss.
pub fn set_nested_property(
    tree: &mut Tree,
    path: &str,
    value: Value,
) -> Result<KeyAction, MergeError> {
    let parts = split_path(path).ok_or_else(|| MergeError::InvalidPath(path.to_string()))?;
    let (last, parents) = parts
        .split_last()
        .ok_or_else(|| MergeError::InvalidPath(path.to_string()))?;

    let mut replaced = false;
    let mut current = tree;
    for part in parents {
        let slot = current
            .entry(part.to_string())
            .or_insert_with(|| Value::Object(Tree::new()));

        if !slot.is_object() {
            *slot = Value::Object(Tree::new());
            replaced = true;
        }

        current = match slot {
            Value::Object(map) => map,
            _ => return Err(MergeError::InvalidPath(path.to_string())),
        };
    }

    let action = match current.insert(last.to_string(), value) {
        Some(_) => KeyAction::Updated,
        None => KeyAction::Added,
    };

    Ok(if replaced { KeyAction::Replaced } else { action })
}

/// Interpret a provider reply.
///
/// Plain text is returned verbatim. Text that looks like a JSON object or
/// array is parsed, falling back to the raw text when parsing fails. A parsed
/// object whose keys are exactly `"0".."N-1"` in order becomes an array.
pub fn parse_translated_value(raw: &str) -> Value {
    if !raw.starts_with('{') && !raw.starts_with('[') {
        return Value::String(raw.to_string());
    }

    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) if is_numbered_object(&map) => {
            Value::Array(map.into_iter().map(|(_, v)| v).collect())
        }
        Ok(value) => value,
        Err(_) => Value::String(raw.to_string()),
    }
}

fn is_numbered_object(map: &Tree) -> bool {
    !map.is_empty()
        && map
            .keys()
            .enumerate()
            .all(|(index, key)| *key == index.to_string())
}

/// Parse a reply and coerce it to the shape of the source value.
///
/// String sources always stay strings and array sources must come back as
/// arrays. Numbers, booleans and null only accept a reply of the same JSON
/// type, so `3` never turns into `"3"`.
pub fn conform_to_source(path: &str, source: &Value, raw: &str) -> Result<Value, MergeError> {
    let mismatch = |found: &Value| MergeError::ShapeMismatch {
        path: path.to_string(),
        expected: kind_name(source),
        found: kind_name(found),
    };

    match source {
        Value::String(_) => match parse_translated_value(raw) {
            parsed @ Value::String(_) => Ok(parsed),
            _ => Ok(Value::String(raw.to_string())),
        },
        Value::Array(_) => match parse_translated_value(raw) {
            parsed @ Value::Array(_) => Ok(parsed),
            other => Err(mismatch(&other)),
        },
        Value::Object(_) => Ok(parse_translated_value(raw)),
        _ => {
            let parsed = serde_json::from_str::<Value>(raw.trim())
                .unwrap_or_else(|_| Value::String(raw.to_string()));
            if kind_name(&parsed) == kind_name(source) {
                Ok(parsed)
            } else {
                Err(mismatch(&parsed))
            }
        }
    }
}

/// Outcome of merging a set of results into one tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub applied: usize,
    pub skipped: usize,
    pub applied_paths: HashSet<String>,
}

/// Apply provider results to `tree`.
///
/// Only results for paths present in `tasks` are applied. Every other failure
/// is logged and skipped without affecting the remaining results.
pub fn apply_results(
    tree: &mut Tree,
    tasks: &[TranslationTask],
    results: &[TranslationResult],
) -> MergeStats {
    let sources: HashMap<&str, &Value> = tasks
        .iter()
        .map(|task| (task.path.as_str(), &task.source))
        .collect();

    let mut stats = MergeStats::default();
    for result in results {
        match apply_one(tree, &sources, result) {
            Ok(action) => {
                if action == KeyAction::Replaced {
                    warn!(key = %result.key, "overwrote a non-object value to create this key");
                }
                stats.applied += 1;
                stats.applied_paths.insert(result.key.clone());
            }
            Err(err) => {
                warn!("Could not apply translation for {}: {}", result.key, err);
                stats.skipped += 1;
            }
        }
    }
    stats
}

fn apply_one(
    tree: &mut Tree,
    sources: &HashMap<&str, &Value>,
    result: &TranslationResult,
) -> Result<KeyAction, MergeError> {
    let source = sources
        .get(result.key.as_str())
        .ok_or_else(|| MergeError::UnexpectedKey(result.key.clone()))?;
    let value = conform_to_source(&result.key, source, &result.translation)?;
    set_nested_property(tree, &result.key, value)
}
