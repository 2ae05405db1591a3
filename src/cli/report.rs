//! Report formatting and printing utilities.
//!
//! Separate from the engine so `linguasync` can be used as a library.

use std::{
    io::{self, Write},
    path::Path,
};

use colored::Colorize;
use serde_json::Value;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::core::{
    AnalysisReport, FileStatus, LanguageSummary, SyncSummary, analyze::PendingTranslation,
    sync::FileStage, task::TaskKind,
};

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// Failure mark for consistent output formatting.
pub const FAILURE_MARK: &str = "\u{2718}"; // ✘

/// Maximum display width of a source value in verbose dry-run output.
const MAX_VALUE_WIDTH: usize = 100;

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        format!("{} {}", count, word)
    } else {
        format!("{} {}s", count, word)
    }
}

/// Print the languages found when none were requested.
pub fn print_available_languages(languages: &[String], locales_dir: &Path) {
    print_available_languages_to(languages, locales_dir, &mut io::stdout().lock());
}

pub fn print_available_languages_to<W: Write>(
    languages: &[String],
    locales_dir: &Path,
    writer: &mut W,
) {
    let _ = writeln!(
        writer,
        "No languages specified. Use {} or {}",
        "--all".cyan(),
        "--lang <codes>".cyan()
    );
    if languages.is_empty() {
        let _ = writeln!(
            writer,
            "\nNo language directories found in: {}",
            locales_dir.display()
        );
        let _ = writeln!(writer, "\nExpected structure:");
        for line in [
            "  locales/",
            "    en/",
            "      translation.json",
            "    es/",
            "      translation.json",
        ] {
            let _ = writeln!(writer, "{}", line);
        }
    } else {
        let _ = writeln!(writer, "\nAvailable languages: {}", languages.join(", "));
    }
}

/// Print a dry-run analysis to stdout.
pub fn print_analysis(report: &AnalysisReport, verbose: bool) {
    print_analysis_to(report, verbose, &mut io::stdout().lock());
}

pub fn print_analysis_to<W: Write>(report: &AnalysisReport, verbose: bool, writer: &mut W) {
    let _ = writeln!(
        writer,
        "{}",
        "Dry run: no files will be modified".bold().yellow()
    );

    if report.is_empty() {
        let _ = writeln!(
            writer,
            "{} {}",
            SUCCESS_MARK.green(),
            format!(
                "All translations are up to date ({} checked)",
                plural(report.files.len(), "file")
            )
            .green()
        );
        return;
    }

    for (language, analysis) in &report.languages {
        let _ = writeln!(
            writer,
            "\n{} ({}): would update {} across {}",
            language.bold(),
            analysis.language_name,
            plural(analysis.missing_count, "translation"),
            plural(report.files.len(), "file")
        );

        if verbose {
            print_pending_to(&analysis.language_name, &analysis.missing, writer);
        }

        for filename in &analysis.baseline_missing {
            let _ = writeln!(
                writer,
                "  {} no baseline for {}, changed keys are detected after the first sync",
                "note:".bold().cyan(),
                filename
            );
        }
    }

    let _ = writeln!(
        writer,
        "\nSummary: {} across {}",
        plural(
            report.summary.total_missing_translations,
            "pending translation"
        ),
        plural(report.summary.total_languages, "language")
    );
}

fn print_pending_to<W: Write>(language_name: &str, pending: &[PendingTranslation], writer: &mut W) {
    let rule = "─".repeat(60);
    let _ = writeln!(writer, "{}", rule.dimmed());
    for (index, item) in pending.iter().enumerate() {
        let _ = writeln!(
            writer,
            "{:>3}. {} {}",
            index + 1,
            item.path,
            format!("[{}]", item.kind).dimmed()
        );
        let _ = writeln!(
            writer,
            "     EN: \"{}\"",
            truncate_display(&display_value(&item.english_value), MAX_VALUE_WIDTH)
        );
        let state = match item.kind {
            TaskKind::Missing => "MISSING".red(),
            TaskKind::Changed => "STALE".yellow(),
        };
        let _ = writeln!(writer, "     {}: [{}]", language_name, state);
    }
    let _ = writeln!(writer, "{}", rule.dimmed());
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Truncate `text` to at most `max_width` display columns, marking the cut with `...`.
pub fn truncate_display(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }

    let budget = max_width.saturating_sub(3);
    let mut width = 0;
    let mut out = String::new();
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if width + w > budget {
            break;
        }
        width += w;
        out.push(c);
    }
    out.push_str("...");
    out
}

/// Print the outcome of a sync run to stdout.
pub fn print_sync_summary(summary: &SyncSummary, verbose: bool) {
    print_sync_summary_to(summary, verbose, &mut io::stdout().lock());
}

pub fn print_sync_summary_to<W: Write>(summary: &SyncSummary, verbose: bool, writer: &mut W) {
    for language in &summary.languages {
        print_language_to(language, verbose, writer);
    }

    if summary.cancelled {
        let skipped = summary.requested - summary.languages.len();
        let _ = writeln!(
            writer,
            "\n{} run cancelled, {} skipped",
            "warning:".bold().yellow(),
            plural(skipped, "language")
        );
    }

    if verbose {
        let totals = summary.totals();
        let _ = writeln!(
            writer,
            "\nTotal: {} missing, {} changed, {} applied, {} skipped",
            totals.missing, totals.changed, totals.applied, totals.skipped
        );
    }

    if verbose && !summary.snapshots_updated.is_empty() {
        let _ = writeln!(
            writer,
            "\nBaseline updated: {}",
            summary.snapshots_updated.join(", ")
        );
    }

    let succeeded = summary.succeeded();
    let message = format!(
        "Completed! Successfully updated {}/{} languages",
        succeeded, summary.requested
    );
    if summary.is_success() {
        let _ = writeln!(writer, "\n{} {}", SUCCESS_MARK.green(), message.green());
    } else {
        let _ = writeln!(writer, "\n{} {}", FAILURE_MARK.red(), message.red());
    }
}

fn print_language_to<W: Write>(language: &LanguageSummary, verbose: bool, writer: &mut W) {
    let counts = &language.counts;
    let header = format!("{} ({})", language.language, language.language_name);

    if !language.is_success() {
        let _ = writeln!(
            writer,
            "{} {}: no files could be processed",
            FAILURE_MARK.red(),
            header.bold()
        );
    } else if counts.pending() == 0 {
        let _ = writeln!(
            writer,
            "{} {}: all translation files are up to date",
            SUCCESS_MARK.green(),
            header.bold()
        );
    } else {
        let _ = writeln!(
            writer,
            "{} {}: applied {}/{} translations across {}",
            SUCCESS_MARK.green(),
            header.bold(),
            counts.applied,
            counts.pending(),
            plural(counts.files_processed, "file")
        );
    }

    for file in &language.files {
        let line = match &file.status {
            FileStatus::Failed { reason } => Some(format!(
                "{} {}: failed while {}: {}",
                FAILURE_MARK.red(),
                file.filename,
                file.stage,
                reason
            )),
            FileStatus::NothingApplied if file.stage == FileStage::Merging => Some(format!(
                "{} {}: all {} rejected",
                FAILURE_MARK.red(),
                file.filename,
                plural(file.counts.skipped, "translation")
            )),
            FileStatus::NothingApplied => Some(format!(
                "{} {}: no translations received",
                FAILURE_MARK.red(),
                file.filename
            )),
            FileStatus::Cancelled => Some(format!(
                "{} {}: cancelled after {}",
                "warning:".bold().yellow(),
                file.filename,
                plural(file.counts.applied, "translation")
            )),
            FileStatus::Synced if verbose || file.counts.failed_batches > 0 => Some(format!(
                "  {}: {} missing, {} changed, {} applied, {} failed",
                file.filename,
                file.counts.missing,
                file.counts.changed,
                file.counts.applied,
                plural(file.counts.failed_batches, "batch")
            )),
            FileStatus::UpToDate | FileStatus::Synced => None,
        };
        if let Some(line) = line {
            let _ = writeln!(writer, "  {}", line);
        }
    }
}
