use serde::{Deserialize, Serialize};
use std::fmt;

/// Polarity band above which headlines count as positive (and below its negation, negative).
pub const POLARITY_THRESHOLD: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SentimentLabel {
    Bullish,
    Bearish,
    Neutral,
}

impl SentimentLabel {
    /// Band a raw polarity in [-1, 1] using the ±0.1 thresholds.
    pub fn from_polarity(polarity: f64) -> Self {
        if polarity > POLARITY_THRESHOLD {
            SentimentLabel::Bullish
        } else if polarity < -POLARITY_THRESHOLD {
            SentimentLabel::Bearish
        } else {
            SentimentLabel::Neutral
        }
    }

    /// Case-insensitive parse of a model-provided label.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "bullish" => Some(SentimentLabel::Bullish),
            "bearish" => Some(SentimentLabel::Bearish),
            "neutral" => Some(SentimentLabel::Neutral),
            _ => None,
        }
    }

    /// Spanish buy/sell/hold recommendation shown next to the label.
    pub fn recommendation(&self) -> &'static str {
        match self {
            SentimentLabel::Bullish => "Comprar",
            SentimentLabel::Bearish => "Vender",
            SentimentLabel::Neutral => "Mantener",
        }
    }

    pub fn color(&self) -> SentimentColor {
        match self {
            SentimentLabel::Bullish => SentimentColor::Green,
            SentimentLabel::Bearish => SentimentColor::Red,
            SentimentLabel::Neutral => SentimentColor::Gray,
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SentimentLabel::Bullish => write!(f, "Bullish"),
            SentimentLabel::Bearish => write!(f, "Bearish"),
            SentimentLabel::Neutral => write!(f, "Neutral"),
        }
    }
}

/// UI color tag for per-symbol sentiment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentColor {
    Green,
    Red,
    Gray,
}

/// Map a raw score in [-1, 1] onto the 0–100 gauge: −1 → 0, 0 → 50, 1 → 100.
///
/// Out-of-range input is clamped first; the result is truncated like an integer cast.
pub fn normalize_score(raw: f64) -> u8 {
    if raw.is_nan() {
        return 50;
    }
    let clamped = raw.clamp(-1.0, 1.0);
    (((clamped + 1.0) / 2.0) * 100.0) as u8
}

/// Per-symbol news sentiment served by `/api/sentiment/{symbol}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub symbol: String,
    /// 0–100 gauge value.
    pub score: u8,
    pub label: SentimentLabel,
    pub color: SentimentColor,
    pub confidence: f64,
    pub summary: String,
    pub recommendation: String,
    pub news_count: usize,
}

impl SentimentResult {
    /// Result returned when no headlines could be retrieved at all.
    pub fn no_news(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_uppercase(),
            score: 0,
            label: SentimentLabel::Neutral,
            color: SentimentColor::Gray,
            confidence: 0.0,
            summary: "No hay noticias recientes.".to_string(),
            recommendation: SentimentLabel::Neutral.recommendation().to_string(),
            news_count: 0,
        }
    }
}
