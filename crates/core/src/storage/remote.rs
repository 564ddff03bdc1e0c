use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::backend::PortfolioBackend;
use crate::errors::CoreError;
use crate::models::portfolio::PortfolioRecord;
use crate::models::settings::SupabaseSettings;

/// Table holding the portfolio blob.
pub const TABLE: &str = "portfolios_v2";
/// Fixed row id: the whole portfolio list lives in a single row.
pub const ROW_ID: &str = "current_portfolio";

/// Supabase (PostgREST) key-value table: one row `{id, data}` where `data`
/// is the portfolio list as an opaque JSON blob.
pub struct SupabaseBackend {
    client: Client,
    settings: SupabaseSettings,
}

impl SupabaseBackend {
    pub fn new(settings: SupabaseSettings) -> Self {
        Self {
            client: Client::new(),
            settings,
        }
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{TABLE}", self.settings.url)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.settings.anon_key)
            .bearer_auth(&self.settings.anon_key)
    }
}

#[derive(Deserialize)]
struct Row {
    data: Option<Value>,
}

#[derive(Serialize)]
struct Upsert<'a> {
    id: &'a str,
    data: &'a [PortfolioRecord],
}

#[async_trait]
impl PortfolioBackend for SupabaseBackend {
    fn name(&self) -> &str {
        "supabase"
    }

    async fn load(&self) -> Result<Option<Vec<PortfolioRecord>>, CoreError> {
        let id_filter = format!("eq.{ROW_ID}");
        let resp = self
            .authorized(self.client.get(self.table_url()))
            .query(&[("select", "data"), ("id", id_filter.as_str())])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(CoreError::PersistenceFailure(format!(
                "supabase select returned HTTP {status}"
            )));
        }

        let rows: Vec<Row> = resp
            .json()
            .await
            .map_err(|e| CoreError::ParseFailure(format!("supabase rows: {e}")))?;

        match rows.into_iter().next().and_then(|r| r.data) {
            None | Some(Value::Null) => Ok(None),
            Some(data) => {
                let records = serde_json::from_value(data).map_err(|e| {
                    CoreError::Serialization(format!("supabase portfolio payload: {e}"))
                })?;
                Ok(Some(records))
            }
        }
    }

    async fn save(&self, records: &[PortfolioRecord]) -> Result<(), CoreError> {
        let resp = self
            .authorized(self.client.post(self.table_url()))
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&Upsert {
                id: ROW_ID,
                data: records,
            })
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = resp.text().await.unwrap_or_default();
            Err(CoreError::PersistenceFailure(format!(
                "supabase upsert returned HTTP {status}: {body}"
            )))
        }
    }
}
