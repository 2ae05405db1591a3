//! Translation tree reconciliation engine.
//!
//! ## Module Structure
//!
//! - `tree`: JSON tree view and dotted path addressing
//! - `task`: a single leaf to translate
//! - `diff`: missing and changed key detection
//! - `batch`: splitting tasks into provider requests
//! - `merge`: writing translations back into a tree
//! - `retry`: backoff between provider retries
//! - `locales`: locale directory layout and tree I/O
//! - `snapshot`: last-synced base trees
//! - `sync`: the per-language, per-file sync pipeline
//! - `analyze`: read-only dry-run reports

pub mod analyze;
pub mod batch;
pub mod diff;
pub mod error;
pub mod locales;
pub mod merge;
pub mod retry;
pub mod snapshot;
pub mod sync;
pub mod task;
pub mod tree;

pub use analyze::{AnalysisReport, analyze_languages};
pub use error::SyncError;
pub use locales::LocaleStore;
pub use sync::{FileStatus, LanguageSummary, SyncCounts, SyncSummary, Syncer};
pub use tree::Tree;
