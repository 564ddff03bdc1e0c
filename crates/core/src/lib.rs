pub mod errors;
pub mod models;
pub mod providers;
pub mod services;
pub mod storage;

use chrono::NaiveDate;
use std::sync::Arc;

use errors::CoreError;
use models::{
    chart::{ChartPoint, DividendEvent, PriceAtDate},
    market::MarketSentiment,
    news::NewsItem,
    portfolio::PortfolioRecord,
    quote::{BatchQuotes, Quote, SymbolMatch},
    sentiment::SentimentResult,
    settings::Settings,
};
use providers::{
    aaii::AaiiSurveyScraper,
    cnn::CnnFearGreedProvider,
    finviz::FinvizNewsScraper,
    gemini::GeminiScorer,
    google_translate::{GoogleTranslator, NoopTranslator},
    traits::{
        FearGreedSource, MarketDataProvider, NewsSource, SentimentScorer, SurveySource,
        Translator,
    },
    yahoo_finance::YahooFinanceProvider,
};
use services::{
    market_sentiment_service::MarketSentimentService, news_service::NewsService,
    quote_service::QuoteService, sentiment_service::SentimentService,
};
use storage::{local::LocalFileBackend, manager::PortfolioStore, remote::SupabaseBackend};

/// Chart period when the caller gives none.
pub const DEFAULT_CHART_PERIOD: &str = "1mo";
/// Chart bar interval when the caller gives none.
pub const DEFAULT_CHART_INTERVAL: &str = "1d";

/// Date format accepted by `price_at_date`.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Every upstream and sink the facade needs, for wiring without `Settings`.
pub struct Components {
    pub market_data: Arc<dyn MarketDataProvider>,
    pub news: Arc<dyn NewsSource>,
    /// Tried in order before the offline lexicon scorer.
    pub scorers: Vec<Box<dyn SentimentScorer>>,
    pub fear_greed: Arc<dyn FearGreedSource>,
    pub survey: Arc<dyn SurveySource>,
    pub translator: Arc<dyn Translator>,
    pub store: PortfolioStore,
}

/// Main entry point for the BolsaIA core library.
/// Holds one instance of each service; all operations are stateless per call.
#[must_use]
pub struct BolsaIa {
    quotes: QuoteService,
    news: Arc<NewsService>,
    sentiment: SentimentService,
    market: MarketSentimentService,
    portfolios: PortfolioStore,
}

impl std::fmt::Debug for BolsaIa {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BolsaIa")
            .field("sentiment_chain", &self.sentiment.chain())
            .field("remote_portfolios", &self.portfolios.has_remote())
            .finish()
    }
}

impl BolsaIa {
    /// Wire the real upstreams from runtime settings.
    pub fn new(settings: &Settings) -> Result<Self, CoreError> {
        let timeout = settings.scrape_timeout;

        let translator: Arc<dyn Translator> = if settings.translate {
            Arc::new(GoogleTranslator::spanish(timeout))
        } else {
            Arc::new(NoopTranslator)
        };

        let mut scorers: Vec<Box<dyn SentimentScorer>> = Vec::new();
        if let Some(key) = &settings.gemini_api_key {
            scorers.push(Box::new(GeminiScorer::new(key.clone())));
        }

        let remote = settings
            .supabase
            .clone()
            .map(|s| Box::new(SupabaseBackend::new(s)) as Box<dyn storage::backend::PortfolioBackend>);
        let store = PortfolioStore::new(
            remote,
            Box::new(LocalFileBackend::new(settings.portfolio_file.clone())),
        );

        let tracker = Self::from_parts(Components {
            market_data: Arc::new(YahooFinanceProvider::new()?),
            news: Arc::new(FinvizNewsScraper::new(timeout)),
            scorers,
            fear_greed: Arc::new(CnnFearGreedProvider::new(timeout)),
            survey: Arc::new(AaiiSurveyScraper::new(timeout)),
            translator,
            store,
        });
        tracing::info!(?tracker, "BolsaIA core initialized");
        Ok(tracker)
    }

    /// Build from injected components.
    pub fn from_parts(parts: Components) -> Self {
        let news = Arc::new(NewsService::new(parts.news, Arc::clone(&parts.translator)));
        Self {
            quotes: QuoteService::new(Arc::clone(&parts.market_data), parts.translator),
            sentiment: SentimentService::new(Arc::clone(&news), parts.scorers),
            market: MarketSentimentService::new(parts.fear_greed, parts.survey, parts.market_data),
            news,
            portfolios: parts.store,
        }
    }

    // ── Quotes ──────────────────────────────────────────────────────

    pub async fn quote(&self, symbol: &str) -> Result<Quote, CoreError> {
        self.quotes.get_quote(symbol).await
    }

    pub async fn batch_quotes(&self, symbols: &[String]) -> BatchQuotes {
        self.quotes.get_batch_quotes(symbols).await
    }

    pub async fn search(&self, query: &str) -> Vec<SymbolMatch> {
        self.quotes.search(query).await
    }

    // ── History ─────────────────────────────────────────────────────

    /// OHLCV bars; `None` falls back to one month of daily bars.
    pub async fn chart(
        &self,
        symbol: &str,
        period: Option<&str>,
        interval: Option<&str>,
    ) -> Result<Vec<ChartPoint>, CoreError> {
        self.quotes
            .get_history(
                symbol,
                period.unwrap_or(DEFAULT_CHART_PERIOD),
                interval.unwrap_or(DEFAULT_CHART_INTERVAL),
            )
            .await
    }

    pub async fn dividends(&self, symbol: &str) -> Vec<DividendEvent> {
        self.quotes.get_dividends(symbol).await
    }

    /// Close on or before `date` (`YYYY-MM-DD`).
    pub async fn price_at_date(&self, symbol: &str, date: &str) -> Result<PriceAtDate, CoreError> {
        self.quotes.get_price_at_date(symbol, date).await
    }

    // ── News & sentiment ────────────────────────────────────────────

    /// Translated headlines, or a single placeholder item when there are none.
    pub async fn news(&self, symbol: &str) -> Vec<NewsItem> {
        self.news.translated_headlines(symbol).await
    }

    pub async fn sentiment(&self, symbol: &str) -> SentimentResult {
        self.sentiment.analyze(symbol).await
    }

    pub async fn market_sentiment(&self) -> MarketSentiment {
        self.market.get_market_sentiment().await
    }

    // ── Portfolios ──────────────────────────────────────────────────

    pub async fn load_portfolios(&self) -> Vec<PortfolioRecord> {
        self.portfolios.load().await
    }

    /// Replace the stored portfolio list. Returns overall success.
    pub async fn save_portfolios(&self, records: &[PortfolioRecord]) -> bool {
        self.portfolios.save(records).await
    }
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(text: &str) -> Result<NaiveDate, CoreError> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT)
        .map_err(|e| CoreError::InvalidInput(format!("Invalid date '{text}': {e}")))
}
