use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use glob::Pattern;
use serde::{Deserialize, Serialize};

use crate::core::locales::is_glob;

pub const CONFIG_FILE_NAME: &str = "linguasync.config.json";

/// Looked up in this order in every directory.
pub const CONFIG_FILE_NAMES: &[&str] = &[CONFIG_FILE_NAME, ".linguasync.config.json"];

/// Display names handed to the provider. `customLanguageNames` takes precedence.
pub const LANGUAGE_NAMES: &[(&str, &str)] = &[
    ("es", "Spanish"),
    ("de", "German"),
    ("el", "Greek"),
    ("jp", "Japanese"),
    ("ua", "Ukrainian"),
    ("it", "Italian"),
    ("fr", "French"),
    ("ru", "Russian"),
    ("tr", "Turkish"),
    ("ko", "Korean"),
    ("vi", "Vietnamese"),
    ("ar", "Arabic"),
    ("nl", "Dutch"),
    ("ro", "Romanian"),
    ("zh", "Mandarin Chinese"),
    ("pt", "Portuguese"),
    ("id", "Indonesian"),
    ("no", "Norwegian"),
    ("fi", "Finnish"),
    ("da", "Danish"),
    ("sv", "Swedish"),
    ("pl", "Polish"),
    ("bg", "Bulgarian"),
    ("sl", "Slovenian"),
];

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_locales_dir")]
    pub locales_dir: String,
    #[serde(default = "default_base_language")]
    pub base_language: String,
    #[serde(default = "default_translation_files")]
    pub translation_files: Vec<String>,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Pause between provider batches, and the backoff unit for retries.
    #[serde(default = "default_batch_delay_ms")]
    pub batch_delay_ms: u64,
    #[serde(default)]
    pub batch_retries: u32,
    #[serde(default = "default_openai_api_url")]
    pub openai_api_url: String,
    /// Never written back to disk. Usually supplied through `OPENAI_API_KEY`.
    #[serde(default, skip_serializing)]
    pub openai_api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub custom_language_names: HashMap<String, String>,
}

fn default_locales_dir() -> String {
    "./locales".to_string()
}

fn default_base_language() -> String {
    "en".to_string()
}

fn default_translation_files() -> Vec<String> {
    vec!["translation.json".to_string()]
}

fn default_batch_size() -> usize {
    20
}

fn default_batch_delay_ms() -> u64 {
    1000
}

fn default_openai_api_url() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

fn default_max_tokens() -> u32 {
    2000
}

fn default_request_timeout_secs() -> u64 {
    60
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locales_dir: default_locales_dir(),
            base_language: default_base_language(),
            translation_files: default_translation_files(),
            batch_size: default_batch_size(),
            batch_delay_ms: default_batch_delay_ms(),
            batch_retries: 0,
            openai_api_url: default_openai_api_url(),
            openai_api_key: None,
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            request_timeout_secs: default_request_timeout_secs(),
            custom_language_names: HashMap::new(),
        }
    }
}

impl Config {
    /// Display name for a language code, falling back to the code itself.
    pub fn language_name(&self, code: &str) -> String {
        if let Some(name) = self.custom_language_names.get(code) {
            return name.clone();
        }
        LANGUAGE_NAMES
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, name)| name.to_string())
            .unwrap_or_else(|| code.to_string())
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            bail!("'batchSize' must be greater than 0");
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            bail!(
                "'temperature' must be between 0 and 2, got {}",
                self.temperature
            );
        }
        if self.max_tokens == 0 {
            bail!("'maxTokens' must be greater than 0");
        }
        if self.request_timeout_secs == 0 {
            bail!("'requestTimeoutSecs' must be greater than 0");
        }

        validate_locale_name(&self.base_language).context("Invalid 'baseLanguage'")?;

        if self.translation_files.is_empty() {
            bail!("'translationFiles' must list at least one file");
        }
        for entry in &self.translation_files {
            if entry.is_empty() || entry.contains('/') || entry.contains('\\') || entry == ".." {
                bail!(
                    "Invalid entry in 'translationFiles': \"{}\" (expected a file name)",
                    entry
                );
            }
            // Literal names are taken as-is, so `[` in a file name needs no escaping
            if is_glob(entry) {
                Pattern::new(entry).with_context(|| {
                    format!("Invalid glob pattern in 'translationFiles': \"{}\"", entry)
                })?;
            }
        }

        Ok(())
    }
}

/// Language codes double as directory names.
pub fn validate_locale_name(locale: &str) -> Result<()> {
    if locale.is_empty() {
        bail!("Language code must not be empty");
    }
    if !locale
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        bail!(
            "Invalid language code \"{}\": only letters, digits, '-' and '_' are allowed",
            locale
        );
    }
    Ok(())
}

pub fn default_config_json() -> Result<String> {
    let config = Config::default();
    serde_json::to_string_pretty(&config).context("Failed to generate default config.")
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        for name in CONFIG_FILE_NAMES {
            let config_path = current.join(name);
            if config_path.is_file() {
                return Some(config_path);
            }
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    pub config: Config,
    /// The file the config was read from, `None` when using defaults.
    pub source: Option<PathBuf>,
    /// Directory relative paths in the config resolve against.
    pub base_dir: PathBuf,
}

impl ConfigLoadResult {
    pub fn locales_dir(&self) -> PathBuf {
        self.base_dir.join(&self.config.locales_dir)
    }
}

/// Load configuration from `explicit`, or search upward from `start_dir`.
pub fn load_config(start_dir: &Path, explicit: Option<&Path>) -> Result<ConfigLoadResult> {
    let path = match explicit {
        Some(path) => {
            if !path.is_file() {
                bail!("Config file not found: {}", path.display());
            }
            Some(path.to_path_buf())
        }
        None => find_config_file(start_dir),
    };

    let Some(path) = path else {
        return Ok(ConfigLoadResult {
            config: Config::default(),
            source: None,
            base_dir: start_dir.to_path_buf(),
        });
    };

    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: Config = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("Invalid config file: {}", path.display()))?;

    let base_dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => start_dir.to_path_buf(),
    };

    Ok(ConfigLoadResult {
        config,
        source: Some(path),
        base_dir,
    })
}
