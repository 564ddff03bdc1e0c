use chrono::Duration;
use std::sync::Arc;

use crate::errors::CoreError;
use crate::models::chart::{ChartPoint, DividendEvent, PriceAtDate};
use crate::models::quote::{BatchQuote, BatchQuoteEntry, BatchQuotes, Quote, QuoteSummary, SymbolMatch};
use crate::providers::traits::{MarketDataProvider, Translator};
use crate::services::currency_service::CurrencyService;
use crate::parse_date;
use crate::services::translate_or_keep;

/// Days searched backwards from the requested date in `get_price_at_date`.
const PRICE_AT_DATE_LOOKBACK_DAYS: i64 = 5;

/// Localized label for an upstream quote type; unknown values pass through.
pub fn asset_type_label(quote_type: &str) -> String {
    match quote_type {
        "EQUITY" => "Acción",
        "ETF" => "ETF",
        "MUTUALFUND" => "Fondo",
        "CRYPTOCURRENCY" => "Cripto",
        "FUTURE" => "Futuro",
        "INDEX" => "Índice",
        "CURRENCY" => "Divisa",
        other => other,
    }
    .to_string()
}

/// Display name for a batch entry: long name, else short name, else the symbol.
/// Some listings carry a trailing ` R` share-class marker, which is dropped.
pub fn display_name(summary: &QuoteSummary, symbol: &str) -> String {
    let raw = summary
        .long_name
        .as_deref()
        .or(summary.short_name.as_deref())
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(symbol);
    raw.strip_suffix(" R").unwrap_or(raw).trim().to_string()
}

/// Upstream data client: quotes, batches, charts, dividends, price-at-date, search.
///
/// Provider failures are converted to empty results or explicit error
/// markers, except `get_quote`, `get_history` and `get_price_at_date`, which
/// return the error for the caller to surface.
pub struct QuoteService {
    provider: Arc<dyn MarketDataProvider>,
    translator: Arc<dyn Translator>,
    currency_service: CurrencyService,
}

impl QuoteService {
    pub fn new(provider: Arc<dyn MarketDataProvider>, translator: Arc<dyn Translator>) -> Self {
        Self {
            provider,
            translator,
            currency_service: CurrencyService::new(),
        }
    }

    /// Full quote for one symbol. `NotFound` when the upstream knows nothing about it.
    pub async fn get_quote(&self, symbol: &str) -> Result<Quote, CoreError> {
        let lookup = symbol.trim().to_uppercase();
        if lookup.is_empty() {
            return Err(CoreError::InvalidInput("empty symbol".into()));
        }

        let summary = self.provider.quote_summary(&lookup).await?;
        if summary.is_empty() {
            return Err(CoreError::NotFound(format!("No quote data for {lookup}")));
        }

        let sector = match summary.sector.as_deref() {
            Some(sector) => Some(translate_or_keep(self.translator.as_ref(), sector).await),
            None => None,
        };
        let currency = self
            .currency_service
            .resolve(&lookup, summary.currency.as_deref());

        Ok(Quote {
            price: summary.best_price(),
            symbol: lookup,
            short_name: summary.short_name,
            change: summary.change_percent,
            market_cap: summary.market_cap,
            volume: summary.volume,
            sector,
            website: summary.website,
            logo_url: summary.logo_url,
            trailing_pe: summary.trailing_pe,
            forward_pe: summary.forward_pe,
            dividend_yield: summary.dividend_yield,
            dividend_rate: summary.dividend_rate,
            currency,
        })
    }

    /// Quotes for many symbols at once, keyed by the symbol as given.
    ///
    /// Never fails as a whole: a symbol whose price cannot be resolved gets
    /// the `{"error": "N/A"}` marker while the others still succeed.
    pub async fn get_batch_quotes(&self, symbols: &[String]) -> BatchQuotes {
        let mut results = BatchQuotes::new();
        for symbol in symbols {
            if results.contains_key(symbol) {
                continue;
            }
            let entry = self.batch_entry(symbol).await;
            results.insert(symbol.clone(), entry);
        }
        results
    }

    async fn batch_entry(&self, symbol: &str) -> BatchQuoteEntry {
        let lookup = symbol.trim().to_uppercase();
        if lookup.is_empty() {
            return BatchQuoteEntry::unavailable();
        }

        // Price and metadata are fetched independently; each call happens once.
        let fast = self.provider.fast_quote(&lookup).await;
        if let Err(e) = &fast {
            tracing::debug!(symbol = %lookup, error = %e, "fast lookup failed, using full quote price");
        }
        let summary = self.provider.quote_summary(&lookup).await;
        if let Err(e) = &summary {
            tracing::warn!(symbol = %lookup, error = %e, "metadata lookup failed");
        }

        let (price, change) = match (&fast, &summary) {
            (Ok(f), _) if f.last_price != 0.0 => (f.last_price, f.change_percent()),
            (_, Ok(s)) => (
                s.best_price().unwrap_or(0.0),
                s.change_percent.unwrap_or(0.0),
            ),
            _ => (0.0, 0.0),
        };

        if price == 0.0 || !price.is_finite() {
            return BatchQuoteEntry::unavailable();
        }

        let fast_currency = fast.ok().and_then(|f| f.currency).filter(|c| !c.is_empty());
        let (name, asset_type, currency) = match summary {
            Ok(s) => (
                display_name(&s, symbol),
                asset_type_label(s.quote_type.as_deref().unwrap_or("UNKNOWN")),
                self.currency_service
                    .resolve(&lookup, s.currency.as_deref().or(fast_currency.as_deref())),
            ),
            Err(_) => (
                symbol.to_string(),
                "Unknown".to_string(),
                self.currency_service.infer_or_default(&lookup),
            ),
        };

        BatchQuoteEntry::Quote(BatchQuote {
            price,
            change: if change.is_finite() { change } else { 0.0 },
            name,
            asset_type,
            currency,
        })
    }

    /// OHLCV history for charts, oldest first.
    pub async fn get_history(
        &self,
        symbol: &str,
        period: &str,
        interval: &str,
    ) -> Result<Vec<ChartPoint>, CoreError> {
        let mut points = self
            .provider
            .history(&symbol.trim().to_uppercase(), period, interval)
            .await?;
        points.sort_by_key(|p| p.date);
        Ok(points)
    }

    /// Dividend history, newest first. Empty on any failure.
    pub async fn get_dividends(&self, symbol: &str) -> Vec<DividendEvent> {
        match self.provider.dividends(&symbol.trim().to_uppercase()).await {
            Ok(mut dividends) => {
                dividends.sort_by(|a, b| b.date.cmp(&a.date));
                dividends
            }
            Err(e) => {
                tracing::warn!(symbol, error = %e, "dividend lookup failed");
                Vec::new()
            }
        }
    }

    /// Close of the latest trading day on or before `date` (`YYYY-MM-DD`),
    /// searching back five days.
    pub async fn get_price_at_date(
        &self,
        symbol: &str,
        date: &str,
    ) -> Result<PriceAtDate, CoreError> {
        let requested = date;
        let date = parse_date(requested)?;
        let lookup = symbol.trim().to_uppercase();
        let from = date - Duration::days(PRICE_AT_DATE_LOOKBACK_DAYS);
        let to = date + Duration::days(1);

        let bars = self.provider.history_between(&lookup, from, to).await?;
        if bars.is_empty() {
            return Err(CoreError::NotFound("No data found for this range".into()));
        }

        let bar = bars
            .iter()
            .filter(|b| b.date <= date)
            .max_by_key(|b| b.date)
            .ok_or_else(|| {
                CoreError::NotFound("No trading data found on or before this date".into())
            })?;

        Ok(PriceAtDate {
            symbol: lookup,
            request_date: requested.to_string(),
            found_date: bar.date,
            close: bar.close,
        })
    }

    /// Symbol search. Empty on blank query or any failure.
    pub async fn search(&self, query: &str) -> Vec<SymbolMatch> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }
        match self.provider.search(query).await {
            Ok(matches) => matches,
            Err(e) => {
                tracing::warn!(query, error = %e, "symbol search failed");
                Vec::new()
            }
        }
    }
}
