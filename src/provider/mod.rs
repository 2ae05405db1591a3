//! Translation provider interface.
//!
//! The sync engine sees a provider as an opaque, fallible function from a
//! batch of `{key, english}` items to a batch of `{key, translation}` results.
//! Any failure is reported as a [`ProviderError`]; the engine decides what a
//! failed batch means.
//!
//! ## Module Structure
//!
//! - `openai`: OpenAI chat-completions implementation

use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod openai;

pub use openai::{OpenAiProvider, build_prompt, parse_completion};

/// One item sent to the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchItem {
    /// Dotted path of the leaf.
    pub key: String,
    /// Source text; non-string values are JSON-encoded.
    pub english: String,
}

/// One translation returned by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationResult {
    pub key: String,
    /// Translated text, possibly containing a JSON array or object.
    pub translation: String,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("provider returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to encode request: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("malformed provider response: {0}")]
    Malformed(String),
}

pub trait TranslationProvider {
    /// Translate `items` into the language called `language_name`.
    fn translate(
        &self,
        items: &[BatchItem],
        language_name: &str,
    ) -> impl Future<Output = Result<Vec<TranslationResult>, ProviderError>> + Send;
}
