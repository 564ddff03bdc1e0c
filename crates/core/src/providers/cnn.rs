use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use super::traits::FearGreedSource;
use crate::errors::CoreError;
use crate::models::market::FearGreedReading;

const PROVIDER: &str = "CNN Money";
const BASE_URL: &str = "https://production.dataviz.cnn.io";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// CNN Fear & Greed index (public dataviz JSON feed).
///
/// The feed rejects requests that do not look like they come from cnn.com,
/// hence the browser User-Agent plus Referer/Origin headers.
pub struct CnnFearGreedProvider {
    client: Client,
    base_url: String,
}

impl CnnFearGreedProvider {
    pub fn new(timeout: Duration) -> Self {
        Self::with_base_url(BASE_URL, timeout)
    }

    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .user_agent(USER_AGENT)
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[derive(Deserialize)]
struct GraphData {
    fear_and_greed: FearAndGreed,
}

#[derive(Deserialize)]
struct FearAndGreed {
    score: f64,
    rating: String,
    timestamp: Option<Value>,
}

#[async_trait]
impl FearGreedSource for CnnFearGreedProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn reading(&self) -> Result<FearGreedReading, CoreError> {
        let resp = self
            .client
            .get(format!("{}/index/fearandgreed/graphdata", self.base_url))
            .header("Referer", "https://edition.cnn.com/")
            .header("Origin", "https://edition.cnn.com")
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(CoreError::upstream(PROVIDER, format!("HTTP {status}")));
        }

        let data: GraphData = resp
            .json()
            .await
            .map_err(|e| CoreError::ParseFailure(format!("{PROVIDER} graphdata: {e}")))?;

        let fng = data.fear_and_greed;
        if !fng.score.is_finite() {
            return Err(CoreError::ParseFailure(format!("{PROVIDER} score is not a number")));
        }

        let timestamp = fng.timestamp.and_then(|t| match t {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        });

        Ok(FearGreedReading {
            score: fng.score,
            rating: fng.rating,
            timestamp,
        })
    }
}
