use serde::{Deserialize, Serialize};

/// Five-band color scale of the market-wide fear/greed gauge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketColor {
    Red,
    Orange,
    Gray,
    Blue,
    Green,
}

impl MarketColor {
    /// <25 red, <45 orange, <55 gray, <75 blue, otherwise green.
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=24 => MarketColor::Red,
            25..=44 => MarketColor::Orange,
            45..=54 => MarketColor::Gray,
            55..=74 => MarketColor::Blue,
            _ => MarketColor::Green,
        }
    }
}

/// Raw reading from a fear/greed index feed.
#[derive(Debug, Clone, PartialEq)]
pub struct FearGreedReading {
    pub score: f64,
    pub rating: String,
    pub timestamp: Option<String>,
}

/// Bullish/bearish percentages scraped from the weekly investor survey.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurveyReading {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bullish: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bearish: Option<f64>,
}

impl SurveyReading {
    pub fn is_empty(&self) -> bool {
        self.bullish.is_none() && self.bearish.is_none()
    }
}

/// Market-wide sentiment aggregate served by `/api/market-sentiment`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSentiment {
    pub index: String,
    /// Always within 0..=100.
    pub value: u8,
    pub color: MarketColor,
    pub summary: String,
    pub vix: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aaii: Option<SurveyReading>,
    pub sources: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl Default for MarketSentiment {
    fn default() -> Self {
        Self {
            index: "Neutral".to_string(),
            value: 50,
            color: MarketColor::Gray,
            summary: "Analizando...".to_string(),
            vix: 0.0,
            aaii: None,
            sources: Vec::new(),
            timestamp: None,
        }
    }
}
