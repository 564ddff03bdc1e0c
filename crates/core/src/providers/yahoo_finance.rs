use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use yahoo_finance_api::{YResponse, YahooConnector};

use super::traits::MarketDataProvider;
use crate::errors::CoreError;
use crate::models::chart::{ChartPoint, DividendEvent};
use crate::models::quote::{FastQuote, QuoteSummary, SymbolMatch};

const PROVIDER: &str = "Yahoo Finance";
const QUERY_BASE_URL: &str = "https://query2.finance.yahoo.com";
const COOKIE_URL: &str = "https://fc.yahoo.com";
const SUMMARY_MODULES: &str = "price,summaryDetail,assetProfile,financialData";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Yahoo Finance provider for quotes, charts, dividends and symbol search.
///
/// - **Free**: No API key required.
/// - **Chart data** (fast lookup, history, dividends) goes through the
///   `yahoo_finance_api` connector.
/// - **Quote summary and search** are plain JSON endpoints fetched with
///   `reqwest`; the summary endpoint wants a session cookie plus crumb.
///
/// No timeout is set on these calls.
pub struct YahooFinanceProvider {
    connector: YahooConnector,
    client: Client,
    base_url: String,
    /// `None` skips the cookie/crumb handshake (custom endpoints in tests).
    cookie_url: Option<String>,
    /// Session crumb, fetched on first use and dropped when Yahoo rejects it.
    crumb: Mutex<Option<String>>,
}

impl YahooFinanceProvider {
    pub fn new() -> Result<Self, CoreError> {
        Ok(Self::with_base_url(QUERY_BASE_URL)?.with_cookie_url(COOKIE_URL))
    }

    /// Enable the cookie/crumb handshake against `cookie_url`.
    pub fn with_cookie_url(mut self, cookie_url: impl Into<String>) -> Self {
        self.cookie_url = Some(cookie_url.into());
        self
    }

    /// Point the summary and search calls at a different host.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, CoreError> {
        let connector = YahooConnector::new()
            .map_err(|e| CoreError::upstream(PROVIDER, format!("Failed to create connector: {e}")))?;
        let client = Client::builder()
            .cookie_store(true)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            connector,
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            cookie_url: None,
            crumb: Mutex::new(None),
        })
    }

    /// Convert a `chrono::NaiveDate` to `time::OffsetDateTime` (midnight UTC).
    fn to_offset_datetime(date: NaiveDate) -> Result<OffsetDateTime, CoreError> {
        let ts = date.and_time(NaiveTime::MIN).and_utc().timestamp();
        OffsetDateTime::from_unix_timestamp(ts)
            .map_err(|e| CoreError::InvalidInput(format!("Invalid date {date}: {e}")))
    }

    /// Calendar date of a unix timestamp on the exchange's wall clock.
    fn timestamp_to_naive_date(ts: i64, gmt_offset: i64) -> Option<NaiveDate> {
        chrono::DateTime::from_timestamp(ts + gmt_offset, 0).map(|dt| dt.date_naive())
    }

    /// Exchange UTC offset in seconds; zero when the response has no metadata.
    fn gmt_offset(resp: &YResponse) -> i64 {
        resp.metadata().map(|m| i64::from(m.gmtoffset)).unwrap_or(0)
    }

    fn to_chart_points(resp: &YResponse, symbol: &str) -> Result<Vec<ChartPoint>, CoreError> {
        let offset = Self::gmt_offset(resp);
        let quotes = resp
            .quotes()
            .map_err(|e| CoreError::upstream(PROVIDER, format!("Failed to parse quotes for {symbol}: {e}")))?;
        Ok(quotes
            .iter()
            .filter_map(|q| {
                Some(ChartPoint {
                    date: Self::timestamp_to_naive_date(q.timestamp, offset)?,
                    open: q.open,
                    high: q.high,
                    low: q.low,
                    close: q.close,
                    volume: q.volume,
                })
            })
            .collect())
    }

    /// Crumb for the summary endpoint, reused across calls once obtained.
    async fn crumb(&self) -> Option<String> {
        let cookie_url = self.cookie_url.as_ref()?;
        let mut cached = self.crumb.lock().await;
        if cached.is_none() {
            *cached = self.fetch_crumb(cookie_url).await;
        }
        cached.clone()
    }

    /// Best-effort handshake. Failures just mean no crumb.
    async fn fetch_crumb(&self, cookie_url: &str) -> Option<String> {
        // fc.yahoo.com answers 404 but sets the session cookie we need.
        if let Err(e) = self.client.get(cookie_url).send().await {
            tracing::debug!(error = %e, "Yahoo cookie handshake failed");
        }
        let resp = self
            .client
            .get(format!("{}/v1/test/getcrumb", self.base_url))
            .send()
            .await
            .ok()?;
        if !resp.status().is_success() {
            return None;
        }
        let crumb = resp.text().await.ok()?.trim().to_string();
        if crumb.is_empty() || crumb.contains('<') {
            None
        } else {
            Some(crumb)
        }
    }
}

// ── Yahoo JSON response types ───────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryResponse {
    quote_summary: QuoteSummaryEnvelope,
}

#[derive(Deserialize)]
struct QuoteSummaryEnvelope {
    result: Option<Vec<SummaryResult>>,
    error: Option<YahooApiError>,
}

#[derive(Deserialize)]
struct YahooApiError {
    code: Option<String>,
    description: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryResult {
    price: Option<PriceModule>,
    summary_detail: Option<SummaryDetailModule>,
    asset_profile: Option<AssetProfileModule>,
    financial_data: Option<FinancialDataModule>,
}

/// Yahoo wraps numbers as `{"raw": 1.23, "fmt": "1.23"}` (or `{}` when unknown).
#[derive(Deserialize)]
struct RawValue {
    raw: Option<f64>,
}

fn raw(v: &Option<RawValue>) -> Option<f64> {
    v.as_ref().and_then(|r| r.raw)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceModule {
    short_name: Option<String>,
    long_name: Option<String>,
    quote_type: Option<String>,
    currency: Option<String>,
    regular_market_price: Option<RawValue>,
    regular_market_change_percent: Option<RawValue>,
    market_cap: Option<RawValue>,
    regular_market_volume: Option<RawValue>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryDetailModule {
    currency: Option<String>,
    #[serde(rename = "trailingPE")]
    trailing_pe: Option<RawValue>,
    #[serde(rename = "forwardPE")]
    forward_pe: Option<RawValue>,
    dividend_yield: Option<RawValue>,
    dividend_rate: Option<RawValue>,
    volume: Option<RawValue>,
}

#[derive(Deserialize)]
struct AssetProfileModule {
    sector: Option<String>,
    website: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FinancialDataModule {
    current_price: Option<RawValue>,
}

impl From<SummaryResult> for QuoteSummary {
    fn from(r: SummaryResult) -> Self {
        let price = r.price;
        let detail = r.summary_detail;
        let profile = r.asset_profile;

        let volume = price
            .as_ref()
            .and_then(|p| raw(&p.regular_market_volume))
            .or_else(|| detail.as_ref().and_then(|d| raw(&d.volume)))
            .map(|v| v.max(0.0) as u64);

        QuoteSummary {
            short_name: price.as_ref().and_then(|p| p.short_name.clone()),
            long_name: price.as_ref().and_then(|p| p.long_name.clone()),
            quote_type: price.as_ref().and_then(|p| p.quote_type.clone()),
            currency: price
                .as_ref()
                .and_then(|p| p.currency.clone())
                .or_else(|| detail.as_ref().and_then(|d| d.currency.clone()))
                .filter(|c| !c.is_empty()),
            current_price: r.financial_data.as_ref().and_then(|f| raw(&f.current_price)),
            regular_market_price: price.as_ref().and_then(|p| raw(&p.regular_market_price)),
            // Yahoo reports the change as a fraction (0.0123 == 1.23%).
            change_percent: price
                .as_ref()
                .and_then(|p| raw(&p.regular_market_change_percent))
                .map(|c| c * 100.0),
            market_cap: price.as_ref().and_then(|p| raw(&p.market_cap)),
            volume,
            sector: profile.as_ref().and_then(|a| a.sector.clone()),
            website: profile.as_ref().and_then(|a| a.website.clone()),
            logo_url: None,
            trailing_pe: detail.as_ref().and_then(|d| raw(&d.trailing_pe)),
            forward_pe: detail.as_ref().and_then(|d| raw(&d.forward_pe)),
            dividend_yield: detail.as_ref().and_then(|d| raw(&d.dividend_yield)),
            dividend_rate: detail.as_ref().and_then(|d| raw(&d.dividend_rate)),
        }
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    quotes: Vec<SearchQuote>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchQuote {
    symbol: Option<String>,
    longname: Option<String>,
    shortname: Option<String>,
    quote_type: Option<String>,
    exchange: Option<String>,
}

impl SearchQuote {
    fn into_match(self) -> Option<SymbolMatch> {
        let symbol = self.symbol?;
        Some(SymbolMatch {
            name: self
                .longname
                .or(self.shortname)
                .unwrap_or_else(|| symbol.clone()),
            asset_type: self.quote_type.unwrap_or_else(|| "Unknown".to_string()),
            exchange: self.exchange.unwrap_or_else(|| "Unknown".to_string()),
            symbol,
        })
    }
}

#[async_trait]
impl MarketDataProvider for YahooFinanceProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn fast_quote(&self, symbol: &str) -> Result<FastQuote, CoreError> {
        let resp = self
            .connector
            .get_latest_quotes(symbol, "1d")
            .await
            .map_err(|e| CoreError::upstream(PROVIDER, format!("Failed to fetch latest quote for {symbol}: {e}")))?;

        let currency = resp.metadata().ok().and_then(|m| m.currency).filter(|c| !c.is_empty());
        let quotes = resp
            .quotes()
            .map_err(|e| CoreError::upstream(PROVIDER, format!("No quote data for {symbol}: {e}")))?;

        let mut closes = quotes.iter().rev().map(|q| q.close).filter(|c| *c > 0.0);
        let last_price = closes
            .next()
            .ok_or_else(|| CoreError::NotFound(format!("No recent price for {symbol}")))?;

        Ok(FastQuote {
            last_price,
            previous_close: closes.next(),
            currency,
        })
    }

    async fn quote_summary(&self, symbol: &str) -> Result<QuoteSummary, CoreError> {
        let mut request = self
            .client
            .get(format!("{}/v10/finance/quoteSummary/{}", self.base_url, symbol))
            .query(&[("modules", SUMMARY_MODULES)]);
        if let Some(crumb) = self.crumb().await {
            request = request.query(&[("crumb", crumb)]);
        }

        let resp = request.send().await?;
        if resp.status() == StatusCode::UNAUTHORIZED {
            *self.crumb.lock().await = None;
            return Err(CoreError::upstream(PROVIDER, format!("Quote summary for {symbol} rejected the session crumb")));
        }
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(CoreError::NotFound(format!("No quote summary for {symbol}")));
        }

        let body: QuoteSummaryResponse = resp.json().await.map_err(|e| {
            CoreError::ParseFailure(format!("Failed to parse quote summary for {symbol}: {e}"))
        })?;

        if let Some(err) = body.quote_summary.error {
            let message = err
                .description
                .or(err.code)
                .unwrap_or_else(|| "unknown error".to_string());
            return Err(CoreError::NotFound(format!("{symbol}: {message}")));
        }

        body.quote_summary
            .result
            .and_then(|r| r.into_iter().next())
            .map(QuoteSummary::from)
            .ok_or_else(|| CoreError::NotFound(format!("No quote summary for {symbol}")))
    }

    async fn history(
        &self,
        symbol: &str,
        period: &str,
        interval: &str,
    ) -> Result<Vec<ChartPoint>, CoreError> {
        let resp = self
            .connector
            .get_quote_range(symbol, interval, period)
            .await
            .map_err(|e| CoreError::upstream(PROVIDER, format!("Failed to fetch {period}/{interval} history for {symbol}: {e}")))?;

        Self::to_chart_points(&resp, symbol)
    }

    async fn history_between(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<ChartPoint>, CoreError> {
        let start = Self::to_offset_datetime(from)?;
        let end = Self::to_offset_datetime(to)?;

        let resp = self
            .connector
            .get_quote_history(symbol, start, end)
            .await
            .map_err(|e| CoreError::upstream(PROVIDER, format!("Failed to fetch history for {symbol} ({from}..{to}): {e}")))?;

        Ok(Self::to_chart_points(&resp, symbol)?
            .into_iter()
            .filter(|p| p.date >= from && p.date < to)
            .collect())
    }

    async fn dividends(&self, symbol: &str) -> Result<Vec<DividendEvent>, CoreError> {
        let resp = self
            .connector
            .get_quote_range(symbol, "1d", "max")
            .await
            .map_err(|e| CoreError::upstream(PROVIDER, format!("Failed to fetch dividends for {symbol}: {e}")))?;

        let offset = Self::gmt_offset(&resp);
        let dividends = resp
            .dividends()
            .map_err(|e| CoreError::upstream(PROVIDER, format!("Failed to parse dividends for {symbol}: {e}")))?;

        Ok(dividends
            .iter()
            .filter_map(|d| {
                let date = Self::timestamp_to_naive_date(d.date, offset)?;
                Some(DividendEvent::new(date, d.amount))
            })
            .collect())
    }

    async fn search(&self, query: &str) -> Result<Vec<SymbolMatch>, CoreError> {
        let resp: SearchResponse = self
            .client
            .get(format!("{}/v1/finance/search", self.base_url))
            .query(&[("q", query)])
            .send()
            .await?
            .json()
            .await
            .map_err(|e| CoreError::ParseFailure(format!("Failed to parse search results for {query}: {e}")))?;

        Ok(resp
            .quotes
            .into_iter()
            .filter_map(SearchQuote::into_match)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2024-01-04 23:00:00 UTC, the open of the Jan 5 session in Sydney (UTC+11).
    const ASX_OPEN: i64 = 1_704_409_200;

    #[test]
    fn bar_dates_use_exchange_local_calendar() {
        let jan = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
        assert_eq!(YahooFinanceProvider::timestamp_to_naive_date(ASX_OPEN, 0), Some(jan(4)));
        assert_eq!(YahooFinanceProvider::timestamp_to_naive_date(ASX_OPEN, 39_600), Some(jan(5)));
        // New York open 14:30 UTC stays on the same day at UTC-5.
        assert_eq!(
            YahooFinanceProvider::timestamp_to_naive_date(1_704_465_000, -18_000),
            Some(jan(5))
        );
    }
}
