use thiserror::Error;

/// Unified error type for the entire bolsa-ia-core library.
///
/// Most service operations swallow these and degrade to empty or placeholder
/// values; only the single-quote and chart lookups hand them to the caller.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Upstream / Network ──────────────────────────────────────────
    #[error("Upstream unavailable ({provider}): {message}")]
    UpstreamUnavailable {
        provider: String,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    // ── Lookup ──────────────────────────────────────────────────────
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // ── Parsing ─────────────────────────────────────────────────────
    #[error("Parse failure: {0}")]
    ParseFailure(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    // ── Persistence ─────────────────────────────────────────────────
    #[error("File I/O error: {0}")]
    FileIO(String),

    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),
}

impl CoreError {
    /// Shorthand for an upstream failure attributed to a named provider.
    pub fn upstream(provider: &str, message: impl Into<String>) -> Self {
        CoreError::UpstreamUnavailable {
            provider: provider.to_string(),
            message: message.into(),
        }
    }

    /// True for errors that mean "the upstream has nothing for this key".
    pub fn is_not_found(&self) -> bool {
        matches!(self, CoreError::NotFound(_))
    }

    /// Message suitable for API clients: lookup and input errors without the
    /// category prefix, everything else as displayed.
    pub fn detail(&self) -> String {
        match self {
            CoreError::NotFound(msg) | CoreError::InvalidInput(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::FileIO(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // Strip query parameters: API keys travel in the query string.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}
