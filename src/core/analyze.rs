//! Dry-run analysis.
//!
//! Computes the same task lists as a sync run but never calls a provider and
//! never writes anything, snapshots included.

use std::collections::BTreeMap;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use super::diff::plan_tasks;
use super::locales::LocaleStore;
use super::sync::SourceFile;
use super::task::TaskKind;
use crate::config::Config;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingTranslation {
    /// `<filename>:<dotted path>`
    pub path: String,
    pub english_value: Value,
    pub is_nested: bool,
    pub filename: String,
    #[serde(rename = "type")]
    pub kind: TaskKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageAnalysis {
    pub language_name: String,
    pub missing_count: usize,
    pub missing: Vec<PendingTranslation>,
    /// Files without a snapshot, where changed keys could not be detected.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub baseline_missing: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    pub total_languages: usize,
    pub total_missing_translations: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub generated_at: String,
    pub base_language: String,
    pub locales_dir: String,
    /// Languages with nothing pending are left out.
    pub languages: BTreeMap<String, LanguageAnalysis>,
    pub summary: AnalysisSummary,
    /// Files checked per language. Not part of the written report.
    #[serde(skip)]
    pub files: Vec<String>,
}

impl AnalysisReport {
    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }
}

/// Analyze `languages` against the base language without side effects.
pub fn analyze_languages(config: &Config, store: &LocaleStore, languages: &[String]) -> AnalysisReport {
    let files = store.translation_files(&config.translation_files);
    let sources = SourceFile::load_all(store, &files);

    let mut report = AnalysisReport {
        generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        base_language: store.base_language().to_string(),
        locales_dir: store.root().display().to_string(),
        languages: BTreeMap::new(),
        summary: AnalysisSummary::default(),
        files,
    };

    for language in languages {
        let analysis = analyze_language(config, store, language, &sources);
        if analysis.missing_count > 0 {
            report.summary.total_missing_translations += analysis.missing_count;
            report.languages.insert(language.clone(), analysis);
        }
    }
    report.summary.total_languages = report.languages.len();

    report
}

fn analyze_language(
    config: &Config,
    store: &LocaleStore,
    language: &str,
    sources: &[SourceFile],
) -> LanguageAnalysis {
    let mut missing = Vec::new();
    let mut baseline_missing = Vec::new();

    for source in sources {
        let base = match &source.base {
            Ok(base) => base,
            Err(reason) => {
                warn!("Could not load base {}, skipping: {}", source.filename, reason);
                continue;
            }
        };
        if source.snapshot.is_none() {
            baseline_missing.push(source.filename.clone());
        }

        let target = store.load_tree_or_empty(language, &source.filename);
        let plan = plan_tasks(base, &target, source.snapshot.as_ref());
        info!(
            "{}/{}: {} missing, {} changed",
            language,
            source.filename,
            plan.missing.len(),
            plan.changed.len()
        );

        missing.extend(plan.into_tasks().into_iter().map(|task| PendingTranslation {
            path: format!("{}:{}", source.filename, task.path),
            is_nested: task.is_nested(),
            english_value: task.source,
            filename: source.filename.clone(),
            kind: task.kind,
        }));
    }

    LanguageAnalysis {
        language_name: config.language_name(language),
        missing_count: missing.len(),
        missing,
        baseline_missing,
    }
}
