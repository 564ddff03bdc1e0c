use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use super::traits::Translator;
use crate::errors::CoreError;

const PROVIDER: &str = "Google Translate";
const BASE_URL: &str = "https://translate.googleapis.com";

/// Free Google Translate web endpoint (`client=gtx`), source language auto-detected.
///
/// Used for sector names and news headlines. Callers keep the original text on error.
pub struct GoogleTranslator {
    client: Client,
    base_url: String,
    target: String,
}

impl GoogleTranslator {
    /// Translator into Spanish, the frontend's language.
    pub fn spanish(timeout: Duration) -> Self {
        Self::with_base_url(BASE_URL, "es", timeout)
    }

    pub fn with_base_url(base_url: impl Into<String>, target: &str, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            target: target.to_string(),
        }
    }
}

/// The endpoint answers with nested arrays; the first element holds
/// `[translated, original, ...]` segments that must be concatenated.
pub(crate) fn parse_translation(body: &Value) -> Option<String> {
    let segments = body.get(0)?.as_array()?;
    let text: String = segments
        .iter()
        .filter_map(|seg| seg.get(0).and_then(Value::as_str))
        .collect();
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str) -> Result<String, CoreError> {
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }

        let body: Value = self
            .client
            .get(format!("{}/translate_a/single", self.base_url))
            .query(&[
                ("client", "gtx"),
                ("sl", "auto"),
                ("tl", self.target.as_str()),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .map_err(|e| CoreError::ParseFailure(format!("{PROVIDER}: {e}")))?;

        parse_translation(&body)
            .ok_or_else(|| CoreError::ParseFailure(format!("{PROVIDER}: empty translation")))
    }
}

/// Identity translator, used when translation is disabled.
pub struct NoopTranslator;

#[async_trait]
impl Translator for NoopTranslator {
    async fn translate(&self, text: &str) -> Result<String, CoreError> {
        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn joins_segments() {
        let body = json!([[["Hola. ", "Hello. ", null], ["Mundo", "World", null]], null, "en"]);
        assert_eq!(parse_translation(&body).as_deref(), Some("Hola. Mundo"));
    }

    #[test]
    fn rejects_unexpected_shape() {
        assert!(parse_translation(&json!({"error": "x"})).is_none());
        assert!(parse_translation(&json!([[]])).is_none());
    }
}
