use std::sync::Arc;

use crate::models::market::{FearGreedReading, MarketColor, MarketSentiment};
use crate::providers::traits::{FearGreedSource, MarketDataProvider, SurveySource};

/// Volatility index symbol used for the fallback estimate and display.
pub const VIX_SYMBOL: &str = "^VIX";

const VIX_FEAR_ABOVE: f64 = 30.0;
const VIX_GREED_BELOW: f64 = 15.0;

/// Spanish label for a fear/greed rating; unknown ratings pass through.
pub fn rating_label(rating: &str) -> String {
    let titled = title_case(rating.trim());
    match titled.as_str() {
        "Extreme Fear" => "Miedo Extremo".to_string(),
        "Fear" => "Miedo".to_string(),
        "Neutral" => "Neutral".to_string(),
        "Greed" => "Codicia".to_string(),
        "Extreme Greed" => "Codicia Extrema".to_string(),
        _ => rating.to_string(),
    }
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Fear/greed score as a gauge value: clamped to 0..=100, fraction dropped.
pub fn gauge_value(score: f64) -> u8 {
    if score.is_nan() {
        return 50;
    }
    score.clamp(0.0, 100.0) as u8
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Market-wide mood: fear/greed index, VIX level and investor survey.
///
/// Every source is optional; whatever fails leaves the neutral defaults in place.
pub struct MarketSentimentService {
    fear_greed: Arc<dyn FearGreedSource>,
    survey: Arc<dyn SurveySource>,
    market: Arc<dyn MarketDataProvider>,
}

impl MarketSentimentService {
    pub fn new(
        fear_greed: Arc<dyn FearGreedSource>,
        survey: Arc<dyn SurveySource>,
        market: Arc<dyn MarketDataProvider>,
    ) -> Self {
        Self {
            fear_greed,
            survey,
            market,
        }
    }

    pub async fn get_market_sentiment(&self) -> MarketSentiment {
        let mut sentiment = MarketSentiment::default();

        let fear_greed = self.fear_greed.reading().await;
        // The VIX is looked up once and serves both the fallback estimate and display.
        let vix = self.vix_level().await;

        match fear_greed {
            Ok(reading) => {
                self.apply_fear_greed(&mut sentiment, reading);
            }
            Err(e) => {
                tracing::warn!(source = self.fear_greed.name(), error = %e, "fear/greed index unavailable, estimating from VIX");
                if let Some(level) = vix {
                    apply_vix_estimate(&mut sentiment, level);
                }
            }
        }

        if let Some(level) = vix {
            sentiment.vix = round2(level);
        }

        match self.survey.reading().await {
            Ok(reading) if !reading.is_empty() => {
                sentiment.aaii = Some(reading);
                sentiment.sources.push("AAII".to_string());
            }
            Ok(_) => {
                tracing::debug!(source = self.survey.name(), "survey page had no percentages");
            }
            Err(e) => {
                tracing::warn!(source = self.survey.name(), error = %e, "survey scrape failed");
            }
        }

        sentiment
    }

    fn apply_fear_greed(&self, sentiment: &mut MarketSentiment, reading: FearGreedReading) {
        let value = gauge_value(reading.score);
        let label = rating_label(&reading.rating);

        sentiment.summary = format!("Índice de Miedo y Codicia: {value} ({label})");
        sentiment.index = label;
        sentiment.value = value;
        sentiment.color = MarketColor::from_score(value);
        sentiment.timestamp = reading.timestamp;
        sentiment.sources.push("CNN Money".to_string());
    }

    /// Current VIX: fast lookup, else the last close of recent daily bars.
    async fn vix_level(&self) -> Option<f64> {
        match self.market.fast_quote(VIX_SYMBOL).await {
            Ok(quote) if quote.last_price > 0.0 && quote.last_price.is_finite() => {
                return Some(quote.last_price);
            }
            Ok(_) => tracing::debug!("VIX fast lookup returned no price"),
            Err(e) => tracing::warn!(error = %e, "VIX fast lookup failed"),
        }

        match self.market.history(VIX_SYMBOL, "5d", "1d").await {
            Ok(bars) => bars
                .iter()
                .max_by_key(|b| b.date)
                .map(|b| b.close)
                .filter(|c| *c > 0.0 && c.is_finite()),
            Err(e) => {
                tracing::warn!(error = %e, "VIX history lookup failed");
                None
            }
        }
    }
}

fn apply_vix_estimate(sentiment: &mut MarketSentiment, vix: f64) {
    if vix > VIX_FEAR_ABOVE {
        sentiment.value = 20;
        sentiment.index = "Fear".to_string();
        sentiment.color = MarketColor::Red;
    } else if vix < VIX_GREED_BELOW {
        sentiment.value = 80;
        sentiment.index = "Greed".to_string();
        sentiment.color = MarketColor::Green;
    }
    sentiment.summary = "Estimado vía VIX (CNN no disponible)".to_string();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_labels_are_case_insensitive() {
        assert_eq!(rating_label("extreme fear"), "Miedo Extremo");
        assert_eq!(rating_label("GREED"), "Codicia");
        assert_eq!(rating_label("neutral"), "Neutral");
        assert_eq!(rating_label("sideways"), "sideways");
    }

    #[test]
    fn gauge_value_clamps_and_truncates() {
        assert_eq!(gauge_value(63.9), 63);
        assert_eq!(gauge_value(-4.0), 0);
        assert_eq!(gauge_value(140.0), 100);
        assert_eq!(gauge_value(f64::NAN), 50);
    }

    #[test]
    fn vix_estimate_bands() {
        let mut high = MarketSentiment::default();
        apply_vix_estimate(&mut high, 35.2);
        assert_eq!((high.value, high.color), (20, MarketColor::Red));

        let mut calm = MarketSentiment::default();
        apply_vix_estimate(&mut calm, 12.0);
        assert_eq!((calm.value, calm.color), (80, MarketColor::Green));

        let mut middle = MarketSentiment::default();
        apply_vix_estimate(&mut middle, 20.0);
        assert_eq!(middle.value, 50);
        assert_eq!(middle.summary, "Estimado vía VIX (CNN no disponible)");
    }
}
