use async_trait::async_trait;
use regex_lite::Regex;
use reqwest::Client;
use std::sync::OnceLock;
use std::time::Duration;

use super::finviz::clean_text;
use super::traits::SurveySource;
use crate::errors::CoreError;
use crate::models::market::SurveyReading;

const PROVIDER: &str = "AAII";
const BASE_URL: &str = "https://www.aaii.com";

/// AAII weekly investor sentiment survey, scraped by text pattern.
///
/// Best effort only: the page is rendered for humans and the match is a
/// plain `Bullish ... NN.N%` search over the page text.
pub struct AaiiSurveyScraper {
    client: Client,
    base_url: String,
}

impl AaiiSurveyScraper {
    pub fn new(timeout: Duration) -> Self {
        Self::with_base_url(BASE_URL, timeout)
    }

    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .user_agent("Mozilla/5.0")
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

fn bullish_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)Bullish.*?(\d+\.?\d*)%").expect("static regex"))
}

fn bearish_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)Bearish.*?(\d+\.?\d*)%").expect("static regex"))
}

fn first_percentage(re: &Regex, text: &str) -> Option<f64> {
    re.captures(text)?.get(1)?.as_str().parse().ok()
}

/// Pull bullish/bearish percentages out of the survey page.
pub fn parse_survey(html: &str) -> SurveyReading {
    let text = clean_text(html);
    SurveyReading {
        bullish: first_percentage(bullish_re(), &text),
        bearish: first_percentage(bearish_re(), &text),
    }
}

#[async_trait]
impl SurveySource for AaiiSurveyScraper {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn reading(&self) -> Result<SurveyReading, CoreError> {
        let html = self
            .client
            .get(format!("{}/sentimentsurvey", self.base_url))
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        Ok(parse_survey(&html))
    }
}
