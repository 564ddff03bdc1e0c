use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// One OHLCV bar, ready for the frontend chart.
///
/// The date serializes as `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Closing price found for a requested calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceAtDate {
    pub symbol: String,
    /// The date text exactly as the caller sent it.
    pub request_date: String,
    /// Latest trading day on or before the requested date.
    pub found_date: NaiveDate,
    pub close: f64,
}

/// A single dividend payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DividendEvent {
    pub date: NaiveDate,
    pub year: i32,
    pub amount: f64,
}

impl DividendEvent {
    pub fn new(date: NaiveDate, amount: f64) -> Self {
        Self {
            date,
            year: date.year(),
            amount,
        }
    }
}
