//! Sync orchestrator.
//!
//! Per file: load base, target and snapshot, diff, batch, translate, merge,
//! persist. Languages, files and batches run strictly one after another.
//!
//! Base trees and snapshots are read once per run. A snapshot is shared by
//! every target language, so it is only rewritten after all requested
//! languages have processed the file and none of them still has an
//! unapplied change.

use std::{fmt, ops::AddAssign, time::Duration};

use backoff::backoff::Backoff;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::batch::create_batches;
use super::diff::plan_tasks;
use super::locales::LocaleStore;
use super::merge::apply_results;
use super::retry::LinearBackoff;
use super::task::{TaskKind, TranslationTask};
use super::tree::Tree;
use crate::config::Config;
use crate::provider::{BatchItem, ProviderError, TranslationProvider, TranslationResult};

/// Pipeline stages of one file, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStage {
    Loading,
    Diffing,
    Batching,
    Translating,
    Merging,
    Persisting,
    Done,
}

impl fmt::Display for FileStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileStage::Loading => "loading",
            FileStage::Diffing => "diffing",
            FileStage::Batching => "batching",
            FileStage::Translating => "translating",
            FileStage::Merging => "merging",
            FileStage::Persisting => "persisting",
            FileStage::Done => "done",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    /// Nothing missing or changed.
    UpToDate,
    /// At least one translation was written.
    Synced,
    /// Tasks existed but no result could be applied. The target is untouched.
    NothingApplied,
    /// Stopped between batches. Results received so far were written.
    Cancelled,
    /// Could not be processed. [`FileOutcome::stage`] tells where.
    Failed { reason: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncCounts {
    pub missing: usize,
    pub changed: usize,
    pub applied: usize,
    pub skipped: usize,
    pub failed_batches: usize,
    pub files_processed: usize,
}

impl SyncCounts {
    /// Tasks found, missing and changed together.
    pub fn pending(&self) -> usize {
        self.missing + self.changed
    }
}

impl AddAssign for SyncCounts {
    fn add_assign(&mut self, other: Self) {
        self.missing += other.missing;
        self.changed += other.changed;
        self.applied += other.applied;
        self.skipped += other.skipped;
        self.failed_batches += other.failed_batches;
        self.files_processed += other.files_processed;
    }
}

/// Result of syncing one file for one language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    pub filename: String,
    pub status: FileStatus,
    /// The last stage the file entered.
    pub stage: FileStage,
    pub counts: SyncCounts,
    /// No snapshot existed, so changed keys could not be detected.
    pub baseline_missing: bool,
    /// The target now reflects every detected base change.
    pub baseline_current: bool,
}

impl FileOutcome {
    fn new(filename: &str, baseline_missing: bool) -> Self {
        Self {
            filename: filename.to_string(),
            status: FileStatus::UpToDate,
            stage: FileStage::Loading,
            counts: SyncCounts::default(),
            baseline_missing,
            baseline_current: false,
        }
    }

    fn enter(&mut self, stage: FileStage) {
        self.stage = stage;
    }

    fn failed(mut self, reason: impl Into<String>) -> Self {
        self.status = FileStatus::Failed {
            reason: reason.into(),
        };
        self.counts.files_processed = 0;
        self.baseline_current = false;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageSummary {
    pub language: String,
    pub language_name: String,
    pub files: Vec<FileOutcome>,
    pub counts: SyncCounts,
}

impl LanguageSummary {
    /// A language succeeds when at least one of its files could be processed.
    pub fn is_success(&self) -> bool {
        self.counts.files_processed > 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncSummary {
    /// Number of languages requested, including any skipped by cancellation.
    pub requested: usize,
    pub languages: Vec<LanguageSummary>,
    pub files: Vec<String>,
    /// Files whose snapshot was created or rewritten during this run.
    pub snapshots_updated: Vec<String>,
    pub cancelled: bool,
}

impl SyncSummary {
    pub fn succeeded(&self) -> usize {
        self.languages.iter().filter(|l| l.is_success()).count()
    }

    pub fn totals(&self) -> SyncCounts {
        let mut totals = SyncCounts::default();
        for language in &self.languages {
            totals += language.counts;
        }
        totals
    }

    pub fn is_success(&self) -> bool {
        !self.cancelled && self.requested > 0 && self.succeeded() == self.requested
    }
}

/// A base-language file as read at the start of a run.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub filename: String,
    /// The base tree, or why it could not be used.
    pub base: Result<Tree, String>,
    /// Snapshot from the previous run, `None` when there is no baseline.
    pub snapshot: Option<Tree>,
    /// The snapshot was written from the current base at the start of this run.
    pub baseline_created: bool,
}

impl SourceFile {
    /// Read a base file and its snapshot without writing anything.
    pub fn load(store: &LocaleStore, filename: &str) -> Self {
        let base = match store.load_tree(store.base_language(), filename) {
            Ok(tree) if tree.is_empty() => Err("base file is empty".to_string()),
            Ok(tree) => Ok(tree),
            Err(err) => Err(format!("{:#}", err)),
        };
        Self {
            filename: filename.to_string(),
            base,
            snapshot: store.snapshots().load(filename),
            baseline_created: false,
        }
    }

    /// Load every file in `filenames`.
    pub fn load_all(store: &LocaleStore, filenames: &[String]) -> Vec<Self> {
        filenames
            .iter()
            .map(|filename| Self::load(store, filename))
            .collect()
    }
}

#[derive(Debug, Default)]
struct TranslationRun {
    results: Vec<TranslationResult>,
    failed_batches: usize,
    cancelled: bool,
}

/// Drives a sync run against one locales directory with one provider.
pub struct Syncer<'a, P> {
    config: &'a Config,
    store: &'a LocaleStore,
    provider: &'a P,
    cancel: CancellationToken,
}

impl<'a, P: TranslationProvider> Syncer<'a, P> {
    pub fn new(config: &'a Config, store: &'a LocaleStore, provider: &'a P) -> Self {
        Self {
            config,
            store,
            provider,
            cancel: CancellationToken::new(),
        }
    }

    /// Stop between batches once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Sync every language in `languages`, then advance snapshots.
    pub async fn sync_languages(&self, languages: &[String]) -> SyncSummary {
        let filenames = self.store.translation_files(&self.config.translation_files);
        let mut summary = SyncSummary {
            requested: languages.len(),
            files: filenames.clone(),
            ..Default::default()
        };
        if languages.is_empty() {
            return summary;
        }

        info!(
            "Syncing {} from {} ({})",
            languages.join(", "),
            self.store.base_language(),
            filenames.join(", ")
        );

        let mut sources = SourceFile::load_all(self.store, &filenames);
        for source in &mut sources {
            if self.ensure_baseline(source) {
                summary.snapshots_updated.push(source.filename.clone());
            }
        }

        for language in languages {
            if self.cancel.is_cancelled() {
                summary.cancelled = true;
                break;
            }
            let result = self.sync_language(language, &sources).await;
            summary.languages.push(result);
        }
        if self.cancel.is_cancelled() {
            summary.cancelled = true;
        }

        if !summary.cancelled {
            for source in &sources {
                if self.advance_baseline(source, &summary.languages)
                    && !summary.snapshots_updated.contains(&source.filename)
                {
                    summary.snapshots_updated.push(source.filename.clone());
                }
            }
        }

        summary
    }

    /// Sync every prepared file for one language.
    pub async fn sync_language(&self, language: &str, sources: &[SourceFile]) -> LanguageSummary {
        let language_name = self.config.language_name(language);
        info!("Processing {} ({})", language, language_name);

        let mut summary = LanguageSummary {
            language: language.to_string(),
            language_name,
            files: Vec::with_capacity(sources.len()),
            counts: SyncCounts::default(),
        };

        for source in sources {
            if self.cancel.is_cancelled() {
                break;
            }
            let outcome = self.sync_file(language, source).await;
            summary.counts += outcome.counts;
            summary.files.push(outcome);
        }

        if summary.counts.files_processed == 0 {
            error!("{}: no files could be processed", language);
        }

        summary
    }

    /// Sync one file for one language.
    pub async fn sync_file(&self, language: &str, source: &SourceFile) -> FileOutcome {
        let filename = source.filename.as_str();
        let outcome = FileOutcome::new(filename, source.snapshot.is_none());

        let base = match &source.base {
            Ok(base) => base,
            Err(reason) => {
                warn!("Could not load base {}, skipping: {}", filename, reason);
                return outcome.failed(reason.clone());
            }
        };

        let target = self.store.load_tree_or_empty(language, filename);
        self.translate_file(language, base, target, source.snapshot.as_ref(), outcome)
            .await
    }

    async fn translate_file(
        &self,
        language: &str,
        base: &Tree,
        mut target: Tree,
        snapshot: Option<&Tree>,
        mut outcome: FileOutcome,
    ) -> FileOutcome {
        let filename = outcome.filename.clone();

        outcome.enter(FileStage::Diffing);
        let plan = plan_tasks(base, &target, snapshot);
        outcome.counts.missing = plan.missing.len();
        outcome.counts.changed = plan.changed.len();
        outcome.counts.files_processed = 1;

        if plan.is_empty() {
            info!("{}/{}: all translations are up to date", language, filename);
            outcome.enter(FileStage::Done);
            outcome.baseline_current = true;
            return outcome;
        }

        info!(
            "{}/{}: {} missing, {} changed",
            language,
            filename,
            plan.missing.len(),
            plan.changed.len()
        );

        let tasks = plan.into_tasks();

        outcome.enter(FileStage::Batching);
        let items: Vec<BatchItem> = tasks.iter().map(TranslationTask::to_batch_item).collect();
        let batches = create_batches(&items, self.config.batch_size);

        outcome.enter(FileStage::Translating);
        let language_name = self.config.language_name(language);
        let run = self.translate_batches(&batches, &language_name).await;
        outcome.counts.failed_batches = run.failed_batches;

        if run.results.is_empty() {
            if run.cancelled {
                outcome.status = FileStatus::Cancelled;
            } else {
                error!("{}/{}: no translations received", language, filename);
                outcome.status = FileStatus::NothingApplied;
            }
            return outcome;
        }

        outcome.enter(FileStage::Merging);
        let stats = apply_results(&mut target, &tasks, &run.results);
        outcome.counts.applied = stats.applied;
        outcome.counts.skipped = stats.skipped;

        if stats.applied == 0 {
            outcome.status = if run.cancelled {
                FileStatus::Cancelled
            } else {
                FileStatus::NothingApplied
            };
            return outcome;
        }

        outcome.enter(FileStage::Persisting);
        if let Err(err) = self.store.save_tree(language, &filename, &target) {
            error!("{}/{}: {:#}", language, filename, err);
            return outcome.failed(format!("{:#}", err));
        }
        outcome.enter(FileStage::Done);

        info!(
            "{}/{}: applied {}/{} translations",
            language,
            filename,
            stats.applied,
            tasks.len()
        );

        outcome.baseline_current = !run.cancelled
            && tasks
                .iter()
                .filter(|task| task.kind == TaskKind::Changed)
                .all(|task| stats.applied_paths.contains(&task.path));
        outcome.status = if run.cancelled {
            FileStatus::Cancelled
        } else {
            FileStatus::Synced
        };
        outcome
    }

    async fn translate_batches(
        &self,
        batches: &[Vec<BatchItem>],
        language_name: &str,
    ) -> TranslationRun {
        let mut run = TranslationRun::default();

        for (index, batch) in batches.iter().enumerate() {
            if index > 0 && !self.pause(self.batch_delay()).await {
                run.cancelled = true;
                break;
            }
            if self.cancel.is_cancelled() {
                run.cancelled = true;
                break;
            }

            info!("Batch {}/{} ({} items)", index + 1, batches.len(), batch.len());
            match self.request_batch(batch, language_name).await {
                Ok(results) => run.results.extend(results),
                Err(err) => {
                    error!("Batch {} failed: {}", index + 1, err);
                    run.failed_batches += 1;
                }
            }
        }

        run
    }

    /// One batch, retried up to `batchRetries` times with linear backoff.
    async fn request_batch(
        &self,
        batch: &[BatchItem],
        language_name: &str,
    ) -> Result<Vec<TranslationResult>, ProviderError> {
        let mut backoff = LinearBackoff::new(self.batch_delay(), self.config.batch_retries);
        loop {
            let err = match self.provider.translate(batch, language_name).await {
                Ok(results) => return Ok(results),
                Err(err) => err,
            };
            let Some(delay) = backoff.next_backoff() else {
                return Err(err);
            };
            warn!(
                "Request failed ({}), retrying {}/{}",
                err,
                backoff.attempt(),
                self.config.batch_retries
            );
            if !self.pause(delay).await {
                return Err(err);
            }
        }
    }

    fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.config.batch_delay_ms)
    }

    /// Sleep unless cancelled first. Returns false on cancellation.
    async fn pause(&self, duration: Duration) -> bool {
        if duration.is_zero() {
            return !self.cancel.is_cancelled();
        }
        tokio::select! {
            _ = self.cancel.cancelled() => false,
            _ = tokio::time::sleep(duration) => true,
        }
    }

    /// Write a first snapshot for a file that has none.
    fn ensure_baseline(&self, source: &mut SourceFile) -> bool {
        let Ok(base) = &source.base else {
            return false;
        };
        if source.snapshot.is_some() {
            return false;
        }

        match self.store.snapshots().save(&source.filename, base) {
            Ok(()) => {
                info!(
                    "No baseline for {}, created one. Changed keys are detected from the next run on.",
                    source.filename
                );
                source.baseline_created = true;
                true
            }
            Err(err) => {
                warn!("Could not create baseline for {}: {:#}", source.filename, err);
                false
            }
        }
    }

    /// Rewrite the snapshot once every language is caught up with the base.
    fn advance_baseline(&self, source: &SourceFile, languages: &[LanguageSummary]) -> bool {
        let Ok(base) = &source.base else {
            return false;
        };
        if source.baseline_created || source.snapshot.as_ref() == Some(base) {
            return false;
        }

        let caught_up = languages
            .iter()
            .flat_map(|language| &language.files)
            .filter(|file| file.filename == source.filename)
            .all(|file| file.baseline_current);
        if !caught_up {
            info!(
                "Keeping the baseline for {} until every change is translated",
                source.filename
            );
            return false;
        }

        match self.store.snapshots().save(&source.filename, base) {
            Ok(()) => true,
            Err(err) => {
                warn!("Could not update baseline for {}: {:#}", source.filename, err);
                false
            }
        }
    }
}
