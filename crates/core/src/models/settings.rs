use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_PORTFOLIO_FILE: &str = "portfolios.json";
const DEFAULT_SCRAPE_TIMEOUT_SECS: u64 = 5;

/// Connection settings for the remote portfolio table.
#[derive(Debug, Clone, PartialEq)]
pub struct SupabaseSettings {
    pub url: String,
    pub anon_key: String,
}

/// Runtime configuration, read once at startup and handed to each component.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Enables the remote language-model sentiment scorer when present.
    pub gemini_api_key: Option<String>,

    /// Enables the remote portfolio sink when present.
    pub supabase: Option<SupabaseSettings>,

    /// Local JSON copy of the portfolio list.
    pub portfolio_file: PathBuf,

    /// Fixed timeout for scraping calls (news page, fear/greed feed, survey page).
    pub scrape_timeout: Duration,

    /// Translate sectors and headlines to Spanish.
    pub translate: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            supabase: None,
            portfolio_file: PathBuf::from(DEFAULT_PORTFOLIO_FILE),
            scrape_timeout: Duration::from_secs(DEFAULT_SCRAPE_TIMEOUT_SECS),
            translate: true,
        }
    }
}

impl Settings {
    /// Load from process environment variables. Empty values count as unset.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup (used by `from_env` and tests).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let supabase_url = get("SUPABASE_URL").or_else(|| get("VITE_SUPABASE_URL"));
        let supabase_key = get("SUPABASE_ANON_KEY").or_else(|| get("VITE_SUPABASE_ANON_KEY"));
        let supabase = match (supabase_url, supabase_key) {
            (Some(url), Some(anon_key)) => Some(SupabaseSettings {
                url: url.trim_end_matches('/').to_string(),
                anon_key,
            }),
            _ => None,
        };

        let scrape_timeout = get("BOLSA_SCRAPE_TIMEOUT_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_SCRAPE_TIMEOUT_SECS);

        let translate = get("BOLSA_TRANSLATE")
            .map(|s| !matches!(s.to_lowercase().as_str(), "0" | "false" | "no" | "off"))
            .unwrap_or(true);

        Self {
            gemini_api_key: get("GEMINI_API_KEY"),
            supabase,
            portfolio_file: get("PORTFOLIO_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PORTFOLIO_FILE)),
            scrape_timeout: Duration::from_secs(scrape_timeout),
            translate,
        }
    }
}
