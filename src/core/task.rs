use serde::Serialize;
use serde_json::Value;

use crate::provider::BatchItem;

/// Why a leaf needs translating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    /// The leaf does not exist in the target tree.
    Missing,
    /// The base value changed since the last sync and the target holds a stale translation.
    Changed,
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskKind::Missing => write!(f, "missing"),
            TaskKind::Changed => write!(f, "changed"),
        }
    }
}

/// One leaf to translate: its path, the base-language value, and why.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationTask {
    pub path: String,
    /// Scalar or array; subtrees are always expanded into leaf tasks.
    pub source: Value,
    pub kind: TaskKind,
}

impl TranslationTask {
    pub fn missing(path: impl Into<String>, source: Value) -> Self {
        Self {
            path: path.into(),
            source,
            kind: TaskKind::Missing,
        }
    }

    pub fn changed(path: impl Into<String>, source: Value) -> Self {
        Self {
            path: path.into(),
            source,
            kind: TaskKind::Changed,
        }
    }

    /// True when the leaf lives below the top level of the tree.
    pub fn is_nested(&self) -> bool {
        self.path.contains('.')
    }

    /// The source value as text for the provider: strings verbatim, anything else as JSON.
    pub fn source_text(&self) -> String {
        match &self.source {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    pub fn to_batch_item(&self) -> BatchItem {
        BatchItem {
            key: self.path.clone(),
            english: self.source_text(),
        }
    }
}
