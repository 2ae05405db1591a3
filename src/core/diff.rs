//! Tree diff engine.
//!
//! Computes which leaves of the base-language tree need translating for a
//! target language:
//!
//! - **Missing**: the leaf exists in the base tree but not in the target tree.
//! - **Changed**: the leaf's base value differs from the last-synced snapshot
//!   and the target already holds a (now stale) translation.
//!
//! Every task addresses a single leaf by dotted path. Subtrees are never
//! emitted as a whole. Keys that cannot be written back through a dotted path
//! (empty, or containing `.`) are skipped.

use std::collections::HashSet;

use tracing::warn;

use super::task::TranslationTask;
use super::tree::{Node, Tree, contains_path, is_addressable_key, join_path, values_equal};

/// Tasks computed for one (language, file) pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPlan {
    pub missing: Vec<TranslationTask>,
    pub changed: Vec<TranslationTask>,
    /// False when no snapshot existed, so change detection was skipped.
    pub baseline_present: bool,
}

impl TaskPlan {
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.changed.is_empty()
    }

    /// Missing tasks followed by changed tasks, each in document order.
    pub fn into_tasks(self) -> Vec<TranslationTask> {
        let mut tasks = self.missing;
        tasks.extend(self.changed);
        tasks
    }
}

/// Find leaves of `base` that are absent from `target`.
///
/// A key that exists in both trees with at least one side being a scalar is
/// treated as present, even when the types differ.
pub fn find_missing_keys(base: &Tree, target: &Tree) -> Vec<TranslationTask> {
    let mut missing = Vec::new();
    collect_missing(base, Some(target), "", &mut missing);
    missing
}

fn collect_missing(
    base: &Tree,
    target: Option<&Tree>,
    prefix: &str,
    out: &mut Vec<TranslationTask>,
) {
    for (key, value) in base {
        if !is_addressable_key(key) {
            warn!(
                "Skipping key \"{}\" in \"{}\": keys must be non-empty and contain no '.'",
                key,
                if prefix.is_empty() { "<root>" } else { prefix }
            );
            continue;
        }
        let path = join_path(prefix, key);
        let existing = target.and_then(|t| t.get(key));

        match (Node::of(value), existing.map(Node::of)) {
            // Whole branch missing: emit every leaf under it individually
            (Node::Object(sub), None) => collect_missing(sub, None, &path, out),
            (_, None) => out.push(TranslationTask::missing(path, value.clone())),
            (Node::Object(sub), Some(Node::Object(existing))) => {
                collect_missing(sub, Some(existing), &path, out)
            }
            _ => {}
        }
    }
}

/// Find leaves whose value differs between `old_base` and `new_base`.
///
/// Keys new in `new_base` are not changes, and keys removed from it are not
/// reported.
pub fn find_changed_keys(old_base: &Tree, new_base: &Tree) -> Vec<TranslationTask> {
    let mut changed = Vec::new();
    collect_changed(old_base, new_base, "", &mut changed);
    changed
}

fn collect_changed(old: &Tree, new: &Tree, prefix: &str, out: &mut Vec<TranslationTask>) {
    for (key, new_value) in new {
        if !is_addressable_key(key) {
            continue;
        }
        let Some(old_value) = old.get(key) else {
            continue;
        };
        let path = join_path(prefix, key);

        match (Node::of(old_value), Node::of(new_value)) {
            (Node::Object(old_sub), Node::Object(new_sub)) => {
                collect_changed(old_sub, new_sub, &path, out)
            }
            // A leaf that became a subtree only introduces new paths
            (_, Node::Object(_)) => {}
            _ => {
                if !values_equal(old_value, new_value) {
                    out.push(TranslationTask::changed(path, new_value.clone()));
                }
            }
        }
    }
}

/// Keep only changed tasks whose path already exists in `target`.
///
/// Paths absent from the target are covered by missing-key detection.
pub fn retain_existing(changed: Vec<TranslationTask>, target: &Tree) -> Vec<TranslationTask> {
    changed
        .into_iter()
        .filter(|task| contains_path(target, &task.path))
        .collect()
}

/// Compute the full task plan for one file.
///
/// Without a snapshot only missing keys are reported and
/// `baseline_present` is false.
pub fn plan_tasks(base: &Tree, target: &Tree, snapshot: Option<&Tree>) -> TaskPlan {
    let missing = find_missing_keys(base, target);

    let Some(snapshot) = snapshot else {
        return TaskPlan {
            missing,
            changed: Vec::new(),
            baseline_present: false,
        };
    };

    let missing_paths: HashSet<&str> = missing.iter().map(|t| t.path.as_str()).collect();
    let changed: Vec<TranslationTask> = retain_existing(find_changed_keys(snapshot, base), target)
        .into_iter()
        .filter(|task| !missing_paths.contains(task.path.as_str()))
        .collect();

    TaskPlan {
        missing,
        changed,
        baseline_present: true,
    }
}
