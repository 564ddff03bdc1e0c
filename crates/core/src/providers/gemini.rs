use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::traits::SentimentScorer;
use crate::errors::CoreError;
use crate::models::sentiment::{normalize_score, SentimentLabel, SentimentResult};

const PROVIDER: &str = "Gemini";
const BASE_URL: &str = "https://generativelanguage.googleapis.com";
const MODEL: &str = "gemini-2.0-flash";
const DEFAULT_CONFIDENCE: f64 = 0.5;

/// Maximum number of headlines included in one prompt.
pub const MAX_PROMPT_HEADLINES: usize = 10;

/// Remote language-model sentiment scorer (Google Gemini).
///
/// One `generateContent` call per analysis. Any transport, status or
/// parse problem is an error so the chain falls through to the next scorer.
pub struct GeminiScorer {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiScorer {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: MODEL.to_string(),
        }
    }
}

// ── Gemini API request/response types ───────────────────────────────

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Structured verdict the prompt asks the model for.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelVerdict {
    /// Raw score in [-1, 1].
    pub score: f64,
    pub label: Option<String>,
    pub confidence: Option<f64>,
    pub summary: Option<String>,
    pub recommendation: Option<String>,
}

pub fn build_prompt(symbol: &str, headlines: &[String]) -> String {
    let news_text = headlines
        .iter()
        .take(MAX_PROMPT_HEADLINES)
        .map(|h| format!("- {h}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Analiza los siguientes titulares financieros sobre la acción {symbol} y actúa como un experto financiero senior.\n\
         \n\
         Titulares:\n\
         {news_text}\n\
         \n\
         Responde ÚNICAMENTE con un objeto JSON (sin markdown) con este formato:\n\
         {{\n\
         \"score\": <float entre -1.0 (Muy Negativo) y 1.0 (Muy Positivo)>,\n\
         \"label\": <\"Bullish\" o \"Bearish\" o \"Neutral\">,\n\
         \"confidence\": <float entre 0.0 y 1.0>,\n\
         \"summary\": <Resumen conciso en Español de lo que pasa en 2 frases>,\n\
         \"recommendation\": <\"Comprar\", \"Vender\" o \"Mantener\">\n\
         }}"
    )
}

/// Remove markdown code fences the model sometimes adds despite the prompt.
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

/// Parse the model's reply. `score` is mandatory; everything else is optional.
pub fn parse_verdict(reply: &str) -> Result<ModelVerdict, CoreError> {
    let cleaned = strip_code_fences(reply);
    let value: Value = serde_json::from_str(&cleaned)
        .map_err(|e| CoreError::ParseFailure(format!("{PROVIDER} reply is not JSON: {e}")))?;

    let score = value
        .get("score")
        .and_then(Value::as_f64)
        .filter(|s| s.is_finite())
        .ok_or_else(|| CoreError::ParseFailure(format!("{PROVIDER} reply has no numeric score")))?;

    let text = |key: &str| {
        value
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
            .filter(|s| !s.trim().is_empty())
    };

    Ok(ModelVerdict {
        score,
        label: text("label"),
        confidence: value.get("confidence").and_then(Value::as_f64),
        summary: text("summary"),
        recommendation: text("recommendation"),
    })
}

impl ModelVerdict {
    pub fn into_result(self, symbol: &str, news_count: usize) -> SentimentResult {
        let polarity_label = SentimentLabel::from_polarity(self.score);
        let label = self
            .label
            .as_deref()
            .and_then(SentimentLabel::parse)
            .unwrap_or(polarity_label);

        SentimentResult {
            symbol: symbol.to_uppercase(),
            score: normalize_score(self.score),
            label,
            // Color follows the raw score, not the model's label.
            color: polarity_label.color(),
            confidence: self.confidence.unwrap_or(DEFAULT_CONFIDENCE).clamp(0.0, 1.0),
            summary: self.summary.unwrap_or_default(),
            recommendation: self
                .recommendation
                .unwrap_or_else(|| label.recommendation().to_string()),
            news_count,
        }
    }
}

#[async_trait]
impl SentimentScorer for GeminiScorer {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn score(&self, symbol: &str, headlines: &[String]) -> Result<SentimentResult, CoreError> {
        let submitted = &headlines[..headlines.len().min(MAX_PROMPT_HEADLINES)];
        let prompt = build_prompt(symbol, submitted);
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: &prompt }],
            }],
        };

        let resp = self
            .client
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.base_url, self.model
            ))
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(CoreError::upstream(PROVIDER, format!("HTTP {status}")));
        }

        let body: GenerateResponse = resp
            .json()
            .await
            .map_err(|e| CoreError::ParseFailure(format!("{PROVIDER} response: {e}")))?;

        let reply: String = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .filter(|t: &String| !t.trim().is_empty())
            .ok_or_else(|| CoreError::ParseFailure(format!("{PROVIDER} returned no text")))?;

        tracing::debug!(symbol, reply = %reply, "Gemini sentiment reply");

        Ok(parse_verdict(&reply)?.into_result(symbol, submitted.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_lists_at_most_ten_headlines() {
        let headlines: Vec<String> = (0..15).map(|i| format!("headline {i}")).collect();
        let prompt = build_prompt("AAPL", &headlines);
        assert!(prompt.contains("- headline 9"));
        assert!(!prompt.contains("- headline 10"));
        assert!(prompt.contains("AAPL"));
    }

    #[test]
    fn strips_fences() {
        assert_eq!(strip_code_fences("```json\n{\"score\": 1}\n```"), "{\"score\": 1}");
    }
}
