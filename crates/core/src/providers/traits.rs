use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::CoreError;
use crate::models::chart::{ChartPoint, DividendEvent};
use crate::models::market::{FearGreedReading, SurveyReading};
use crate::models::news::NewsItem;
use crate::models::quote::{FastQuote, QuoteSummary, SymbolMatch};
use crate::models::sentiment::SentimentResult;

/// Trait abstraction over the finance-data provider.
///
/// Services only talk to this trait, so an upstream that breaks or changes
/// is replaced by swapping one implementation.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Lightweight price-only lookup.
    async fn fast_quote(&self, symbol: &str) -> Result<FastQuote, CoreError>;

    /// Full descriptive lookup (names, type, currency, ratios, sector).
    async fn quote_summary(&self, symbol: &str) -> Result<QuoteSummary, CoreError>;

    /// OHLCV bars for a period such as `1mo` at an interval such as `1d`, oldest first.
    async fn history(
        &self,
        symbol: &str,
        period: &str,
        interval: &str,
    ) -> Result<Vec<ChartPoint>, CoreError>;

    /// Daily bars with `from <= date < to`, oldest first.
    async fn history_between(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<ChartPoint>, CoreError>;

    /// Every known dividend payment, in any order.
    async fn dividends(&self, symbol: &str) -> Result<Vec<DividendEvent>, CoreError>;

    /// Free-text symbol search.
    async fn search(&self, query: &str) -> Result<Vec<SymbolMatch>, CoreError>;
}

/// A per-symbol headline source.
#[async_trait]
pub trait NewsSource: Send + Sync {
    fn name(&self) -> &str;

    /// Headlines newest first, as the source presents them.
    async fn headlines(&self, symbol: &str) -> Result<Vec<NewsItem>, CoreError>;
}

/// One strategy in the sentiment fallback chain.
#[async_trait]
pub trait SentimentScorer: Send + Sync {
    fn name(&self) -> &str;

    /// Score a non-empty list of headline titles.
    async fn score(&self, symbol: &str, headlines: &[String]) -> Result<SentimentResult, CoreError>;
}

/// Market-wide fear/greed index feed.
#[async_trait]
pub trait FearGreedSource: Send + Sync {
    fn name(&self) -> &str;

    async fn reading(&self) -> Result<FearGreedReading, CoreError>;
}

/// Investor sentiment survey (bullish/bearish percentages).
#[async_trait]
pub trait SurveySource: Send + Sync {
    fn name(&self) -> &str;

    async fn reading(&self) -> Result<SurveyReading, CoreError>;
}

/// Text translation to the frontend's language.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str) -> Result<String, CoreError>;
}
