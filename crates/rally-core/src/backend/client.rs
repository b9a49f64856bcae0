//! REST implementation of the row interface.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;

use crate::backend::{Filter, Order, RowStore};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::util::compact_text;

/// HTTP client for the managed backend's row interface.
///
/// Explicitly constructed from a [`ClientConfig`] and passed to services;
/// there is no process-wide client instance.
#[derive(Clone)]
pub struct RestClient {
    base_url: String,
    api_key: String,
    access_token: Option<String>,
    client: reqwest::Client,
}

impl RestClient {
    /// Build a client from validated configuration.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Ok(Self {
            base_url: config.backend_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            access_token: config.access_token.clone(),
            client: reqwest::Client::builder().build()?,
        })
    }

    fn table_url(&self, table: &str, pairs: &[(String, String)]) -> String {
        let base = format!("{}/rest/v1/{table}", self.base_url);
        if pairs.is_empty() {
            return base;
        }
        let query = pairs
            .iter()
            .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&");
        format!("{base}?{query}")
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let bearer = self.access_token.as_deref().unwrap_or(&self.api_key);
        request
            .header("apikey", &self.api_key)
            .bearer_auth(bearer)
            .header(reqwest::header::ACCEPT, "application/json")
    }

    async fn error_from(response: reqwest::Response) -> Error {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Error::Api(parse_api_error(status, &body))
    }

    /// Unwrap a `return=representation` response, which is an array holding
    /// the affected rows.
    fn single_row(mut rows: Vec<Value>, table: &str) -> Result<Value> {
        if rows.is_empty() {
            return Err(Error::NotFound(format!(
                "write to '{table}' affected no rows"
            )));
        }
        Ok(rows.remove(0))
    }
}

#[async_trait]
impl RowStore for RestClient {
    async fn fetch_rows(
        &self,
        table: &str,
        filter: &Filter,
        order: &Order,
    ) -> Result<Vec<Value>> {
        let mut pairs = filter.to_query();
        pairs.push(("order".to_string(), order.to_query_value()));

        let response = self
            .authorize(self.client.get(self.table_url(table, &pairs)))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        Ok(response.json::<Vec<Value>>().await?)
    }

    async fn insert_row(&self, table: &str, row: Value) -> Result<Value> {
        let response = self
            .authorize(self.client.post(self.table_url(table, &[])).json(&row))
            .header("Prefer", "return=representation")
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        Self::single_row(response.json::<Vec<Value>>().await?, table)
    }

    async fn update_row(&self, table: &str, filter: &Filter, patch: Value) -> Result<Value> {
        let pairs = filter.to_query();
        let response = self
            .authorize(
                self.client
                    .patch(self.table_url(table, &pairs))
                    .json(&patch),
            )
            .header("Prefer", "return=representation")
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        Self::single_row(response.json::<Vec<Value>>().await?, table)
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
    message: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(message) = payload.message.or(payload.error) {
            return format!("{} ({})", message.trim(), status.as_u16());
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", compact_text(trimmed), status.as_u16())
    }
}
