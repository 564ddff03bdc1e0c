use std::sync::Arc;

use crate::models::sentiment::SentimentResult;
use crate::providers::lexicon::LexiconScorer;
use crate::providers::traits::SentimentScorer;
use crate::services::news_service::NewsService;

/// Per-symbol news sentiment through an ordered chain of scorers.
///
/// The first scorer that succeeds wins. The chain always ends with the
/// offline `LexiconScorer`, which cannot fail.
pub struct SentimentService {
    news: Arc<NewsService>,
    scorers: Vec<Box<dyn SentimentScorer>>,
    fallback: LexiconScorer,
}

impl SentimentService {
    /// `scorers` run in order before the lexicon fallback; pass an empty
    /// list to score offline only.
    pub fn new(news: Arc<NewsService>, scorers: Vec<Box<dyn SentimentScorer>>) -> Self {
        Self {
            news,
            scorers,
            fallback: LexiconScorer::new(),
        }
    }

    /// Names of the scorers in chain order, fallback included.
    pub fn chain(&self) -> Vec<&str> {
        self.scorers
            .iter()
            .map(|s| s.name())
            .chain(std::iter::once(self.fallback.name()))
            .collect()
    }

    pub async fn analyze(&self, symbol: &str) -> SentimentResult {
        let symbol = symbol.trim().to_uppercase();
        let headlines: Vec<String> = self
            .news
            .headlines(&symbol)
            .await
            .into_iter()
            .map(|item| item.title)
            .collect();

        self.score_headlines(&symbol, &headlines).await
    }

    /// Score already-fetched headline titles.
    pub async fn score_headlines(&self, symbol: &str, headlines: &[String]) -> SentimentResult {
        if headlines.is_empty() {
            return SentimentResult::no_news(symbol);
        }

        for scorer in &self.scorers {
            match scorer.score(symbol, headlines).await {
                Ok(result) => return result,
                Err(e) => {
                    tracing::warn!(symbol, scorer = scorer.name(), error = %e, "sentiment scorer failed, trying next");
                }
            }
        }

        match self.fallback.score(symbol, headlines).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(symbol, error = %e, "lexicon scorer failed");
                SentimentResult::no_news(symbol)
            }
        }
    }
}
