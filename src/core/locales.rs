//! Locale directory layout and tree I/O.
//!
//! ```text
//! <locales>/
//!   en/
//!     translation.json
//!     translation.json.bak   <- snapshot of the last synced base tree
//!   de/
//!     translation.json
//! ```
//!
//! Trees are written pretty-printed with 2-space indentation and a trailing
//! newline. Key order is preserved.

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use glob::Pattern;
use serde_json::Value;
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::error::SyncError;
use super::snapshot::{SNAPSHOT_EXTENSION, SnapshotStore};
use super::tree::Tree;

/// Read a translation tree from a JSON file. The root must be an object.
pub fn read_tree(path: &Path) -> Result<Tree> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse JSON: {}", path.display()))?;
    match value {
        Value::Object(map) => Ok(map),
        _ => bail!("Root of JSON file must be an object: {}", path.display()),
    }
}

/// Write a translation tree, creating parent directories as needed.
pub fn write_tree(path: &Path, tree: &Tree) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let content = serde_json::to_string_pretty(tree).context("Failed to serialize JSON")?;

    fs::write(path, format!("{}\n", content))
        .with_context(|| format!("Failed to write file: {}", path.display()))?;

    Ok(())
}

/// Access to `<locales>/<language>/<filename>` trees.
#[derive(Debug, Clone)]
pub struct LocaleStore {
    root: PathBuf,
    base_language: String,
}

impl LocaleStore {
    /// Open a locales directory.
    ///
    /// A missing root is a run-level failure; nothing can be synced without it.
    pub fn open(root: impl Into<PathBuf>, base_language: impl Into<String>) -> Result<Self, SyncError> {
        let root = root.into();
        if !root.exists() {
            return Err(SyncError::LocalesDirMissing(root));
        }
        if !root.is_dir() {
            return Err(SyncError::LocalesDirNotADirectory(root));
        }

        Ok(Self {
            root,
            base_language: base_language.into(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn base_language(&self) -> &str {
        &self.base_language
    }

    pub fn file_path(&self, language: &str, filename: &str) -> PathBuf {
        self.root.join(language).join(filename)
    }

    pub fn snapshots(&self) -> SnapshotStore {
        SnapshotStore::new(&self.root, &self.base_language)
    }

    pub fn load_tree(&self, language: &str, filename: &str) -> Result<Tree> {
        read_tree(&self.file_path(language, filename))
    }

    /// Load a target tree, treating a missing or unreadable file as empty.
    pub fn load_tree_or_empty(&self, language: &str, filename: &str) -> Tree {
        let path = self.file_path(language, filename);
        match read_tree(&path) {
            Ok(tree) => tree,
            Err(err) => {
                if path.exists() {
                    warn!("Could not load {}: {:#}", path.display(), err);
                } else {
                    debug!("{} does not exist yet, starting from an empty tree", path.display());
                }
                Tree::new()
            }
        }
    }

    pub fn save_tree(&self, language: &str, filename: &str, tree: &Tree) -> Result<()> {
        write_tree(&self.file_path(language, filename), tree)
    }

    /// Language directories under the root, excluding the base language, sorted.
    pub fn languages(&self) -> Result<Vec<String>, SyncError> {
        let mut languages = Vec::new();
        for entry in WalkDir::new(&self.root).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|source| SyncError::LocalesDirUnreadable {
                path: self.root.clone(),
                source,
            })?;
            if !entry.file_type().is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str()
                && name != self.base_language
                && !name.starts_with('.')
            {
                languages.push(name.to_string());
            }
        }
        languages.sort();
        Ok(languages)
    }

    /// Resolve configured translation files against the base-language directory.
    ///
    /// Literal names are kept when the base file exists. Entries containing `*`
    /// or `?` are glob patterns matched against the directory listing.
    /// Order follows the configuration; duplicates are dropped.
    pub fn translation_files(&self, configured: &[String]) -> Vec<String> {
        let base_dir = self.root.join(&self.base_language);
        let mut files: Vec<String> = Vec::new();

        for entry in configured {
            if is_glob(entry) {
                let Ok(pattern) = Pattern::new(entry) else {
                    warn!("Ignoring invalid translation file pattern \"{}\"", entry);
                    continue;
                };
                for name in list_base_files(&base_dir) {
                    if pattern.matches(&name) && !files.contains(&name) {
                        files.push(name);
                    }
                }
            } else if base_dir.join(entry).is_file() {
                if !files.contains(entry) {
                    files.push(entry.clone());
                }
            } else {
                debug!("{} not found in {}", entry, base_dir.display());
            }
        }

        files
    }
}

pub fn is_glob(entry: &str) -> bool {
    entry.contains('*') || entry.contains('?')
}

fn list_base_files(base_dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = WalkDir::new(base_dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                if err.io_error().map(|e| e.kind()) != Some(ErrorKind::NotFound) {
                    warn!("Could not list {}: {}", base_dir.display(), err);
                }
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.file_name().to_str().map(String::from))
        .filter(|name| !name.ends_with(SNAPSHOT_EXTENSION))
        .collect();
    names.sort();
    names
}
