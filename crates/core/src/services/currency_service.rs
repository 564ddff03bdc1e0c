/// Currency used whenever nothing better is known.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Exchange suffix → trading currency.
///
/// The only source of suffix inference: both the single-quote and the
/// batch-quote paths go through `CurrencyService`.
const SUFFIX_CURRENCIES: &[(&str, &str)] = &[
    ("MI", "EUR"), // Milan
    ("PA", "EUR"), // Paris
    ("MC", "EUR"), // Madrid
    ("DE", "EUR"), // XETRA
    ("AS", "EUR"), // Amsterdam
    ("BR", "EUR"), // Brussels
    ("LS", "EUR"), // Lisbon
    ("VI", "EUR"), // Vienna
    ("IR", "EUR"), // Dublin
    ("L", "GBP"),  // London
    ("TO", "CAD"), // Toronto
];

/// Resolves the trading currency of a symbol.
pub struct CurrencyService;

impl CurrencyService {
    pub fn new() -> Self {
        Self
    }

    /// Exchange suffix of a ticker (`"VOD.L"` → `"L"`), if any.
    pub fn suffix(symbol: &str) -> Option<&str> {
        symbol
            .rsplit_once('.')
            .map(|(_, suffix)| suffix)
            .filter(|s| !s.is_empty())
    }

    /// Currency implied by the symbol's exchange suffix alone.
    pub fn infer_from_suffix(&self, symbol: &str) -> Option<&'static str> {
        let suffix = Self::suffix(symbol)?.to_uppercase();
        SUFFIX_CURRENCIES
            .iter()
            .find(|(s, _)| *s == suffix)
            .map(|(_, currency)| *currency)
    }

    /// Suffix inference with the USD default.
    pub fn infer_or_default(&self, symbol: &str) -> String {
        self.infer_from_suffix(symbol)
            .unwrap_or(DEFAULT_CURRENCY)
            .to_string()
    }

    /// Currency for a full quote.
    ///
    /// The upstream value wins unless it is missing or `USD`: listings on
    /// European/UK/Canadian exchanges are often mislabelled as USD, so the
    /// suffix table overrides in that case.
    pub fn resolve(&self, symbol: &str, reported: Option<&str>) -> String {
        let reported = reported.map(str::trim).filter(|c| !c.is_empty());
        match reported {
            Some(c) if !c.eq_ignore_ascii_case(DEFAULT_CURRENCY) => c.to_string(),
            _ => self.infer_or_default(symbol),
        }
    }
}

impl Default for CurrencyService {
    fn default() -> Self {
        Self::new()
    }
}
