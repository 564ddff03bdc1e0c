use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Full quote snapshot for a single symbol, as served by `/api/quote/{symbol}`.
///
/// Fetched fresh on every request, never cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub symbol: String,
    pub short_name: Option<String>,
    pub price: Option<f64>,
    /// Percent change of the regular session (1.5 means +1.5%).
    pub change: Option<f64>,
    pub market_cap: Option<f64>,
    pub volume: Option<u64>,
    pub sector: Option<String>,
    pub website: Option<String>,
    #[serde(rename = "logo_url")]
    pub logo_url: Option<String>,
    #[serde(rename = "trailingPE")]
    pub trailing_pe: Option<f64>,
    #[serde(rename = "forwardPE")]
    pub forward_pe: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub dividend_rate: Option<f64>,
    /// Always non-empty; resolved through the suffix table when the upstream omits it.
    pub currency: String,
}

/// Descriptive record returned by the provider's full (slow) lookup.
/// Every field is optional: upstream omits whatever it does not know.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuoteSummary {
    pub short_name: Option<String>,
    pub long_name: Option<String>,
    pub quote_type: Option<String>,
    pub currency: Option<String>,
    pub current_price: Option<f64>,
    pub regular_market_price: Option<f64>,
    /// Percent change (already multiplied by 100).
    pub change_percent: Option<f64>,
    pub market_cap: Option<f64>,
    pub volume: Option<u64>,
    pub sector: Option<String>,
    pub website: Option<String>,
    pub logo_url: Option<String>,
    pub trailing_pe: Option<f64>,
    pub forward_pe: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub dividend_rate: Option<f64>,
}

impl QuoteSummary {
    /// `currentPrice` wins over `regularMarketPrice`; zero counts as missing.
    pub fn best_price(&self) -> Option<f64> {
        self.current_price
            .filter(|p| *p != 0.0)
            .or(self.regular_market_price.filter(|p| *p != 0.0))
    }

    /// True when the upstream returned nothing usable for the symbol.
    pub fn is_empty(&self) -> bool {
        self.best_price().is_none() && self.short_name.is_none() && self.long_name.is_none()
    }
}

/// Lightweight price-only lookup result.
#[derive(Debug, Clone, PartialEq)]
pub struct FastQuote {
    pub last_price: f64,
    pub previous_close: Option<f64>,
    pub currency: Option<String>,
}

impl FastQuote {
    /// Percent change against the previous close; zero when it is unknown.
    pub fn change_percent(&self) -> f64 {
        match self.previous_close {
            Some(prev) if prev != 0.0 => (self.last_price - prev) / prev * 100.0,
            _ => 0.0,
        }
    }
}

/// Compact per-symbol entry in a batch quote response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchQuote {
    pub price: f64,
    pub change: f64,
    pub name: String,
    #[serde(rename = "type")]
    pub asset_type: String,
    pub currency: String,
}

/// Either a resolved quote or the explicit `{"error": "N/A"}` marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BatchQuoteEntry {
    Quote(BatchQuote),
    Error { error: String },
}

impl BatchQuoteEntry {
    pub const UNAVAILABLE: &'static str = "N/A";

    pub fn unavailable() -> Self {
        BatchQuoteEntry::Error {
            error: Self::UNAVAILABLE.to_string(),
        }
    }

    pub fn as_quote(&self) -> Option<&BatchQuote> {
        match self {
            BatchQuoteEntry::Quote(q) => Some(q),
            BatchQuoteEntry::Error { .. } => None,
        }
    }
}

/// Batch response keyed by the symbol exactly as the caller sent it.
pub type BatchQuotes = BTreeMap<String, BatchQuoteEntry>;

/// One hit from the symbol search endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolMatch {
    pub symbol: String,
    pub name: String,
    #[serde(rename = "type")]
    pub asset_type: String,
    pub exchange: String,
}
