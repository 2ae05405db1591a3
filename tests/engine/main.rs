//! End-to-end runs of the sync engine with a scripted provider.

use std::{fs, path::Path, sync::Mutex};

use anyhow::Result;
use linguasync::{
    config::Config,
    core::{FileStatus, LocaleStore, Syncer, analyze_languages},
    provider::{BatchItem, ProviderError, TranslationProvider, TranslationResult},
};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tempfile::TempDir;

/// Uppercases every source text and records each batch it receives.
#[derive(Default)]
struct ShoutingProvider {
    batches: Mutex<Vec<Vec<String>>>,
}

impl ShoutingProvider {
    fn batches(&self) -> Vec<Vec<String>> {
        self.batches.lock().unwrap().clone()
    }
}

impl TranslationProvider for ShoutingProvider {
    async fn translate(
        &self,
        items: &[BatchItem],
        _language_name: &str,
    ) -> Result<Vec<TranslationResult>, ProviderError> {
        self.batches
            .lock()
            .unwrap()
            .push(items.iter().map(|item| item.key.clone()).collect());
        Ok(items
            .iter()
            .map(|item| TranslationResult {
                key: item.key.clone(),
                translation: item.english.to_uppercase(),
            })
            .collect())
    }
}

fn write_json(root: &Path, path: &str, value: &Value) {
    let file_path = root.join(path);
    fs::create_dir_all(file_path.parent().unwrap()).unwrap();
    fs::write(file_path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}

fn read_json(root: &Path, path: &str) -> Value {
    serde_json::from_str(&fs::read_to_string(root.join(path)).unwrap()).unwrap()
}

fn config() -> Config {
    Config {
        batch_delay_ms: 0,
        ..Default::default()
    }
}

fn languages(codes: &[&str]) -> Vec<String> {
    codes.iter().map(|c| c.to_string()).collect()
}

#[tokio::test]
async fn test_snapshot_lifecycle_across_runs() -> Result<()> {
    let dir = TempDir::new()?;
    let root = dir.path();
    write_json(root, "en/translation.json", &json!({"title": "Welcome", "menu": {"save": "Save"}}));
    write_json(root, "de/translation.json", &json!({"title": "Willkommen"}));

    let config = config();
    let store = LocaleStore::open(root, "en")?;
    let provider = ShoutingProvider::default();

    // First run: no baseline, only missing keys
    let first = Syncer::new(&config, &store, &provider)
        .sync_languages(&languages(&["de"]))
        .await;
    assert!(first.is_success());
    assert!(first.languages[0].files[0].baseline_missing);
    assert_eq!(
        read_json(root, "de/translation.json"),
        json!({"title": "Willkommen", "menu": {"save": "SAVE"}})
    );
    assert!(root.join("en/translation.json.bak").exists());

    // The base text changes between runs
    write_json(root, "en/translation.json", &json!({"title": "Welcome back", "menu": {"save": "Save"}}));

    let report = analyze_languages(&config, &store, &languages(&["de"]));
    assert_eq!(report.summary.total_missing_translations, 1);
    assert_eq!(report.languages["de"].missing[0].path, "translation.json:title");

    let second = Syncer::new(&config, &store, &provider)
        .sync_languages(&languages(&["de"]))
        .await;
    assert_eq!(second.languages[0].counts.changed, 1);
    assert_eq!(
        read_json(root, "de/translation.json"),
        json!({"title": "WELCOME BACK", "menu": {"save": "SAVE"}})
    );
    assert_eq!(
        read_json(root, "en/translation.json.bak"),
        read_json(root, "en/translation.json")
    );

    // Third run has nothing to do
    let third = Syncer::new(&config, &store, &provider)
        .sync_languages(&languages(&["de"]))
        .await;
    assert_eq!(third.languages[0].files[0].status, FileStatus::UpToDate);
    assert_eq!(provider.batches().len(), 2);

    Ok(())
}

#[tokio::test]
async fn test_batches_follow_batch_size() -> Result<()> {
    let dir = TempDir::new()?;
    let root = dir.path();
    let base: serde_json::Map<String, Value> = (0..45)
        .map(|i| (format!("key{:02}", i), json!(format!("text {}", i))))
        .collect();
    write_json(root, "en/translation.json", &Value::Object(base));
    write_json(root, "ja/translation.json", &json!({}));

    let config = config();
    let store = LocaleStore::open(root, "en")?;
    let provider = ShoutingProvider::default();

    let summary = Syncer::new(&config, &store, &provider)
        .sync_languages(&languages(&["ja"]))
        .await;

    let sizes: Vec<usize> = provider.batches().iter().map(Vec::len).collect();
    assert_eq!(sizes, vec![20, 20, 5]);
    assert_eq!(provider.batches()[0][0], "key00");
    assert_eq!(summary.totals().applied, 45);

    Ok(())
}

#[tokio::test]
async fn test_multiple_files_and_languages() -> Result<()> {
    let dir = TempDir::new()?;
    let root = dir.path();
    write_json(root, "en/translation.json", &json!({"a": "one"}));
    write_json(root, "en/quotes.json", &json!({"q": {"first": "be kind"}}));
    write_json(root, "de/translation.json", &json!({"a": "eins"}));
    write_json(root, "es/quotes.json", &json!({"q": {}}));

    let config = Config {
        translation_files: languages(&["translation.json", "quotes.json"]),
        ..config()
    };
    let store = LocaleStore::open(root, "en")?;
    let provider = ShoutingProvider::default();

    let summary = Syncer::new(&config, &store, &provider)
        .sync_languages(&store.languages()?)
        .await;

    assert_eq!(summary.requested, 2);
    assert_eq!(summary.succeeded(), 2);
    assert_eq!(
        read_json(root, "de/quotes.json"),
        json!({"q": {"first": "BE KIND"}})
    );
    assert_eq!(read_json(root, "es/translation.json"), json!({"a": "ONE"}));
    assert_eq!(
        read_json(root, "es/quotes.json"),
        json!({"q": {"first": "BE KIND"}})
    );
    assert_eq!(summary.totals().applied, 3);

    Ok(())
}

async fn sync_with_batch_size(batch_size: usize) -> Result<Value> {
    let dir = TempDir::new()?;
    let root = dir.path();
    write_json(
        root,
        "en/translation.json",
        &json!({
            "title": "Welcome back",
            "menu": {"save": "Save", "open": "Open", "recent": {"none": "Nothing yet"}},
            "tags": ["new", "hot"],
            "limit": 10,
            "footer": "Bye"
        }),
    );
    write_json(
        root,
        "en/translation.json.bak",
        &json!({"title": "Welcome", "menu": {"save": "Save"}, "footer": "Bye"}),
    );
    write_json(
        root,
        "de/translation.json",
        &json!({
            "title": "Willkommen",
            "menu": {"save": "Speichern"},
            "footer": "Tschüss",
            "extra": "x"
        }),
    );

    let config = Config {
        batch_size,
        ..config()
    };
    let store = LocaleStore::open(root, "en")?;
    let provider = ShoutingProvider::default();

    let summary = Syncer::new(&config, &store, &provider)
        .sync_languages(&languages(&["de"]))
        .await;
    assert!(summary.is_success());
    assert_eq!(summary.totals().applied, 5);

    Ok(read_json(root, "de/translation.json"))
}

#[tokio::test]
async fn test_result_does_not_depend_on_batch_size() -> Result<()> {
    let single = sync_with_batch_size(1).await?;
    let pairs = sync_with_batch_size(2).await?;
    let default = sync_with_batch_size(20).await?;

    assert_eq!(single, pairs);
    assert_eq!(single, default);
    assert_eq!(
        default,
        json!({
            "title": "WELCOME BACK",
            "menu": {"save": "Speichern", "open": "OPEN", "recent": {"none": "NOTHING YET"}},
            "footer": "Tschüss",
            "extra": "x",
            "tags": ["NEW", "HOT"],
            "limit": 10
        })
    );

    Ok(())
}
