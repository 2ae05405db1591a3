use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{BatchItem, ProviderError, TranslationProvider, TranslationResult};
use crate::config::Config;
use crate::core::SyncError;

const SYSTEM_PROMPT: &str = "You are a professional translator specializing in software localization. Always return valid JSON in the exact format requested.";

/// Translation provider backed by the OpenAI chat-completions API.
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAiProvider {
    /// Build a provider from the resolved configuration.
    ///
    /// Fails with [`SyncError::MissingApiKey`] when no API key is configured.
    pub fn new(config: &Config) -> Result<Self, SyncError> {
        let api_key = config
            .openai_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(SyncError::MissingApiKey)?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_url: config.openai_api_url.clone(),
            api_key: api_key.to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    fn request_payload<'a>(&'a self, prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

impl TranslationProvider for OpenAiProvider {
    async fn translate(
        &self,
        items: &[BatchItem],
        language_name: &str,
    ) -> Result<Vec<TranslationResult>, ProviderError> {
        let prompt = build_prompt(items, language_name)?;
        let payload = self.request_payload(&prompt);

        debug!(
            items = items.len(),
            prompt_chars = prompt.len(),
            "requesting translations into {}",
            language_name
        );

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        parse_completion(&body)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TranslationsEnvelope {
    #[serde(default)]
    translations: Vec<RawTranslation>,
}

#[derive(Debug, Deserialize)]
struct RawTranslation {
    key: String,
    translation: Value,
}

/// Build the user prompt for one batch.
pub fn build_prompt(items: &[BatchItem], language_name: &str) -> Result<String, ProviderError> {
    let items_json = serde_json::to_string_pretty(items)?;

    Ok(format!(
        r#"You are a professional translator. Translate the following English text to {lang}.

IMPORTANT INSTRUCTIONS:
1. Maintain the exact same structure and formatting
2. Preserve all placeholders like {{{{variable}}}}, {{{{count}}}}, etc.
3. Keep HTML tags intact if present
4. For technical terms, use appropriate {lang} equivalents
5. Maintain the tone and context appropriate for a software application
6. If the English value is an array, return an array in the translation (NOT an object with numbered keys)
7. If the English value is an object, return an object in the translation
8. Return ONLY a JSON object with the translations

Translate these English texts:
{items_json}

Return format:
{{
  "translations": [
    {{
      "key": "path.to.key",
      "translation": "translated text in {lang}"
    }}
  ]
}}"#,
        lang = language_name,
        items_json = items_json,
    ))
}

/// Extract translations from a chat-completions response body.
///
/// Non-string translations are re-encoded as JSON text so every result goes
/// through the same parsing rules when merged.
pub fn parse_completion(body: &str) -> Result<Vec<TranslationResult>, ProviderError> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::Malformed(format!("response is not valid JSON: {}", e)))?;

    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| ProviderError::Malformed("response has no message content".to_string()))?;

    let envelope: TranslationsEnvelope = serde_json::from_str(strip_code_fence(&content))
        .map_err(|e| ProviderError::Malformed(format!("content is not a translations object: {}", e)))?;

    Ok(envelope
        .translations
        .into_iter()
        .map(|raw| TranslationResult {
            key: raw.key,
            translation: match raw.translation {
                Value::String(s) => s,
                other => other.to_string(),
            },
        })
        .collect())
}

/// Models sometimes wrap JSON in a markdown code fence.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening line
    let rest = rest.split_once('\n').map_or("", |(_, body)| body);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}
