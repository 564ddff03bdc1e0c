use async_trait::async_trait;

use super::traits::SentimentScorer;
use crate::errors::CoreError;
use crate::models::sentiment::{normalize_score, SentimentLabel, SentimentResult};

/// Offline bag-of-words scorer. Last link of the sentiment chain: never fails.
///
/// Each headline's polarity is the mean polarity of the lexicon words it
/// contains (0 when none match). A negation within the three preceding words
/// flips and halves a word's polarity; an intensifier right before it scales it.
pub struct LexiconScorer;

const SUMMARY: &str = "Análisis básico de palabras clave (Modo Offline).";
const CONFIDENCE: f64 = 0.5;
const NEGATION_WINDOW: usize = 3;

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "don't", "doesn't", "didn't", "isn't", "aren't", "wasn't",
    "weren't", "won't", "can't", "cannot", "without", "hardly", "barely", "nor",
];

const INTENSIFIERS: &[(&str, f64)] = &[
    ("very", 1.3),
    ("extremely", 1.5),
    ("sharply", 1.4),
    ("highly", 1.3),
    ("deeply", 1.3),
    ("strongly", 1.3),
    ("slightly", 0.6),
    ("modestly", 0.7),
];

const LEXICON: &[(&str, f64)] = &[
    // positive
    ("beat", 0.6),
    ("beats", 0.6),
    ("bullish", 0.8),
    ("boost", 0.5),
    ("boosts", 0.5),
    ("breakthrough", 0.7),
    ("buy", 0.4),
    ("buyback", 0.4),
    ("climb", 0.4),
    ("climbs", 0.4),
    ("dividend", 0.2),
    ("exceed", 0.5),
    ("exceeds", 0.5),
    ("gain", 0.5),
    ("gains", 0.5),
    ("good", 0.7),
    ("great", 0.8),
    ("growth", 0.5),
    ("high", 0.16),
    ("higher", 0.25),
    ("jump", 0.5),
    ("jumps", 0.5),
    ("optimistic", 0.6),
    ("outperform", 0.6),
    ("positive", 0.45),
    ("profit", 0.4),
    ("rally", 0.6),
    ("rallies", 0.6),
    ("rebound", 0.4),
    ("record", 0.3),
    ("rise", 0.4),
    ("rises", 0.4),
    ("robust", 0.5),
    ("soar", 0.7),
    ("soars", 0.7),
    ("strong", 0.43),
    ("success", 0.6),
    ("surge", 0.6),
    ("surges", 0.6),
    ("top", 0.5),
    ("upgrade", 0.6),
    ("upgraded", 0.6),
    ("upside", 0.4),
    ("win", 0.8),
    ("wins", 0.8),
    // negative
    ("bad", -0.7),
    ("bankruptcy", -0.8),
    ("bearish", -0.8),
    ("concern", -0.4),
    ("concerns", -0.4),
    ("crash", -0.8),
    ("cut", -0.4),
    ("cuts", -0.4),
    ("decline", -0.5),
    ("declines", -0.5),
    ("default", -0.6),
    ("disappoint", -0.6),
    ("disappointing", -0.6),
    ("downgrade", -0.6),
    ("downgraded", -0.6),
    ("drop", -0.5),
    ("drops", -0.5),
    ("fall", -0.5),
    ("falls", -0.5),
    ("fear", -0.6),
    ("fears", -0.6),
    ("fraud", -0.9),
    ("investigation", -0.5),
    ("lawsuit", -0.5),
    ("layoffs", -0.5),
    ("lose", -0.5),
    ("loss", -0.5),
    ("losses", -0.5),
    ("low", -0.2),
    ("lower", -0.25),
    ("miss", -0.5),
    ("misses", -0.5),
    ("negative", -0.3),
    ("plunge", -0.8),
    ("plunges", -0.8),
    ("probe", -0.4),
    ("recall", -0.4),
    ("risk", -0.3),
    ("sell", -0.4),
    ("selloff", -0.6),
    ("slump", -0.6),
    ("slumps", -0.6),
    ("tumble", -0.6),
    ("tumbles", -0.6),
    ("underperform", -0.6),
    ("warning", -0.5),
    ("weak", -0.5),
    ("worst", -1.0),
];

fn lookup(table: &[(&str, f64)], word: &str) -> Option<f64> {
    table.iter().find(|(w, _)| *w == word).map(|(_, v)| *v)
}

impl LexiconScorer {
    pub fn new() -> Self {
        Self
    }

    /// Polarity of a single text in [-1, 1].
    pub fn polarity(&self, text: &str) -> f64 {
        let lower = text.to_lowercase();
        let words: Vec<&str> = lower
            .split(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '-'))
            .map(|w| w.trim_matches(|c| c == '\'' || c == '-'))
            .filter(|w| !w.is_empty())
            .collect();

        let mut hits = Vec::new();
        for (i, word) in words.iter().enumerate() {
            let Some(mut polarity) = lookup(LEXICON, word) else {
                continue;
            };
            if i > 0 {
                if let Some(factor) = lookup(INTENSIFIERS, words[i - 1]) {
                    polarity *= factor;
                }
            }
            let window = &words[i.saturating_sub(NEGATION_WINDOW)..i];
            if window.iter().any(|w| NEGATIONS.contains(w)) {
                polarity *= -0.5;
            }
            hits.push(polarity.clamp(-1.0, 1.0));
        }

        if hits.is_empty() {
            0.0
        } else {
            hits.iter().sum::<f64>() / hits.len() as f64
        }
    }

    /// Mean polarity over non-empty headlines.
    pub fn average_polarity(&self, headlines: &[String]) -> (f64, usize) {
        let scored: Vec<f64> = headlines
            .iter()
            .filter(|h| !h.trim().is_empty())
            .map(|h| self.polarity(h))
            .collect();
        if scored.is_empty() {
            (0.0, 0)
        } else {
            (scored.iter().sum::<f64>() / scored.len() as f64, scored.len())
        }
    }
}

impl Default for LexiconScorer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SentimentScorer for LexiconScorer {
    fn name(&self) -> &str {
        "Lexicon"
    }

    async fn score(&self, symbol: &str, headlines: &[String]) -> Result<SentimentResult, CoreError> {
        let (polarity, count) = self.average_polarity(headlines);
        let label = SentimentLabel::from_polarity(polarity);

        Ok(SentimentResult {
            symbol: symbol.to_uppercase(),
            score: normalize_score(polarity),
            label,
            color: label.color(),
            confidence: CONFIDENCE,
            summary: SUMMARY.to_string(),
            recommendation: label.recommendation().to_string(),
            news_count: count,
        })
    }
}
