use std::{
    env, fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use colored::Colorize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::super::{
    args::{SyncArgs, SyncCommand},
    exit_status::ExitStatus,
    report::{
        FAILURE_MARK, SUCCESS_MARK, print_analysis, print_available_languages, print_sync_summary,
    },
};
use crate::{
    config::{Config, load_config, validate_locale_name},
    core::{AnalysisReport, LocaleStore, SyncSummary, Syncer, analyze_languages},
    provider::OpenAiProvider,
};

/// Which languages a run should touch.
#[derive(Debug, PartialEq, Eq)]
enum Selection {
    Languages(Vec<String>),
    /// Neither `--all` nor `--lang` was given.
    NotSpecified,
    /// `--all` was given but no language directory exists.
    NoneAvailable,
    Unknown(Vec<String>),
}

fn select_languages(all: bool, requested: &[String], available: &[String]) -> Selection {
    if all {
        if available.is_empty() {
            return Selection::NoneAvailable;
        }
        return Selection::Languages(available.to_vec());
    }

    let mut languages: Vec<String> = Vec::new();
    for code in requested.iter().map(|code| code.trim()) {
        if !code.is_empty() && !languages.iter().any(|l| l == code) {
            languages.push(code.to_string());
        }
    }
    if languages.is_empty() {
        return Selection::NotSpecified;
    }

    let unknown: Vec<String> = languages
        .iter()
        .filter(|code| !available.contains(code))
        .cloned()
        .collect();
    if unknown.is_empty() {
        Selection::Languages(languages)
    } else {
        Selection::Unknown(unknown)
    }
}

/// Merge CLI overrides into the loaded configuration.
fn resolve_config(args: &SyncArgs, cwd: &Path) -> Result<(Config, PathBuf)> {
    let loaded = load_config(cwd, args.common.config.as_deref())?;
    let locales_dir = match &args.common.locales_dir {
        Some(dir) => cwd.join(dir),
        None => loaded.locales_dir(),
    };
    if let Some(source) = &loaded.source {
        info!("Loaded config from {}", source.display());
    }

    let mut config = loaded.config;
    if let Some(base) = &args.common.base_lang {
        validate_locale_name(base).context("Invalid --base-lang")?;
        config.base_language = base.clone();
    }
    if let Some(key) = &args.api_key {
        config.openai_api_key = Some(key.clone());
    }

    Ok((config, locales_dir))
}

pub fn sync(cmd: SyncCommand) -> Result<ExitStatus> {
    let args = cmd.args;
    let verbose = args.common.verbose;
    let cwd = env::current_dir().context("Failed to determine the current directory")?;
    let (config, locales_dir) = resolve_config(&args, &cwd)?;

    // A mutating run needs credentials before anything touches the locales
    let wants_languages = args.all || !args.lang.is_empty();
    let provider = if wants_languages && !args.dry_run {
        Some(OpenAiProvider::new(&config)?)
    } else {
        None
    };

    let store = LocaleStore::open(&locales_dir, &config.base_language)?;
    let available = store.languages()?;

    let languages = match select_languages(args.all, &args.lang, &available) {
        Selection::Languages(languages) => languages,
        Selection::NotSpecified => {
            print_available_languages(&available, store.root());
            return Ok(ExitStatus::Failure);
        }
        Selection::NoneAvailable => {
            eprintln!("{} No language directories found", FAILURE_MARK.red());
            eprintln!("Looking in: {}", store.root().display());
            return Ok(ExitStatus::Failure);
        }
        Selection::Unknown(unknown) => {
            eprintln!(
                "{} Invalid language codes: {}",
                FAILURE_MARK.red(),
                unknown.join(", ")
            );
            eprintln!("Available languages: {}", available.join(", "));
            return Ok(ExitStatus::Failure);
        }
    };

    if args.dry_run {
        let report = analyze_languages(&config, &store, &languages);
        print_analysis(&report, verbose);
        if let Some(output) = &args.output {
            let path = cwd.join(output);
            write_report(&path, &report)?;
            println!(
                "{} Report saved to: {}",
                SUCCESS_MARK.green(),
                output.display()
            );
        }
        return Ok(ExitStatus::Success);
    }

    let Some(provider) = provider else {
        return Ok(ExitStatus::Failure);
    };

    let summary = run_sync(&config, &store, &provider, &languages)?;
    print_sync_summary(&summary, verbose);

    Ok(if summary.is_success() {
        ExitStatus::Success
    } else {
        ExitStatus::Failure
    })
}

fn write_report(path: &Path, report: &AnalysisReport) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    let content = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
    fs::write(path, format!("{}\n", content))
        .with_context(|| format!("Failed to write report: {}", path.display()))
}

/// Run the sync on a single-threaded runtime. Ctrl-C stops between batches.
fn run_sync(
    config: &Config,
    store: &LocaleStore,
    provider: &OpenAiProvider,
    languages: &[String],
) -> Result<SyncSummary> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start the async runtime")?
        .block_on(async {
            let token = CancellationToken::new();
            let interrupt = token.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupted, stopping after the current batch");
                    interrupt.cancel();
                }
            });

            let summary = Syncer::new(config, store, provider)
                .with_cancellation(token)
                .sync_languages(languages)
                .await;
            Ok(summary)
        })
}
