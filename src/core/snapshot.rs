//! Snapshots of the base-language tree as of the last successful sync.
//!
//! Change detection compares the current base tree against its snapshot, so a
//! snapshot must only be rewritten once every change it hides has been
//! translated.

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::warn;

use super::locales::{read_tree, write_tree};
use super::tree::Tree;

pub const SNAPSHOT_EXTENSION: &str = ".bak";

/// Snapshot files for one base language, stored next to the base files.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(locales_dir: &Path, base_language: &str) -> Self {
        Self {
            dir: locales_dir.join(base_language),
        }
    }

    /// `<locales>/<base>/<filename>.bak`
    pub fn path(&self, filename: &str) -> PathBuf {
        self.dir.join(format!("{}{}", filename, SNAPSHOT_EXTENSION))
    }

    pub fn exists(&self, filename: &str) -> bool {
        self.path(filename).is_file()
    }

    /// Load the snapshot for `filename`.
    ///
    /// Returns `None` when it is absent. A corrupt snapshot is logged and also
    /// treated as absent so it gets replaced on the next successful sync.
    pub fn load(&self, filename: &str) -> Option<Tree> {
        if !self.exists(filename) {
            return None;
        }
        let path = self.path(filename);
        match read_tree(&path) {
            Ok(tree) => Some(tree),
            Err(err) => {
                warn!("Ignoring unreadable snapshot {}: {:#}", path.display(), err);
                None
            }
        }
    }

    pub fn save(&self, filename: &str, tree: &Tree) -> Result<()> {
        write_tree(&self.path(filename), tree)
    }
}
