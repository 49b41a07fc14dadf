use async_trait::async_trait;
use common::config::CatalogConfig;
use common::models::{Asset, Column, PiiRule};
use common::{Error, Result};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

use crate::CatalogSource;
use crate::models::{Envelope, ListPayload};
use crate::utils::retry::retry_with_backoff;

/// Read-only client for the data catalog backend.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: Client,
    base_url: Url,
    api_token: Option<String>,
    max_retries: u32,
    base_delay_ms: u64,
}

impl CatalogClient {
    pub fn new(config: &CatalogConfig) -> Result<Self> {
        let base_url = config
            .base_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| Error::InvalidInput("catalog.base_url is not configured".into()))?;
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidInput(format!(
                "catalog.base_url '{}' cannot be used as a base URL",
                base_url
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url,
            api_token: config.api_token.clone().filter(|t| !t.trim().is_empty()),
            max_retries: config.max_retries,
            base_delay_ms: config.base_delay_ms,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::InvalidInput(format!("invalid catalog base URL: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        retry_with_backoff(self.max_retries, self.base_delay_ms, || {
            let url = url.clone();
            async move {
                debug!(%url, "GET");
                let mut request = self.client.get(url);
                if let Some(token) = &self.api_token {
                    request = request.bearer_auth(token);
                }

                let response = request.send().await?;
                let status = response.status();
                if !status.is_success() {
                    let body = response.text().await.unwrap_or_default();
                    return Err(status_error(status, body));
                }

                let envelope: Envelope<T> = response.json().await?;
                envelope.into_result()
            }
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn list_assets(&self) -> Result<Vec<Asset>> {
        let url = self.endpoint(&["api", "assets"])?;
        let payload: ListPayload<Asset> = self.get_json(url).await?;
        Ok(payload.into_vec())
    }

    #[instrument(skip(self))]
    pub async fn asset_columns(&self, asset_id: &str) -> Result<Vec<Column>> {
        let asset_id = asset_id.trim();
        if asset_id.is_empty() {
            return Err(Error::InvalidInput("asset id must not be empty".into()));
        }

        let url = self.endpoint(&["api", "catalog", "assets", asset_id, "columns"])?;
        let payload: ListPayload<Column> = self.get_json(url).await?;
        Ok(payload.into_vec())
    }

    #[instrument(skip(self))]
    pub async fn pii_rules(&self) -> Result<Vec<PiiRule>> {
        let url = self.endpoint(&["api", "pii-rules"])?;
        let payload: ListPayload<PiiRule> = self.get_json(url).await?;
        Ok(payload.into_vec())
    }
}

fn status_error(status: StatusCode, body: String) -> Error {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::Forbidden,
        StatusCode::TOO_MANY_REQUESTS => Error::RateLimit,
        StatusCode::GATEWAY_TIMEOUT => Error::GatewayTimeout,
        StatusCode::NOT_FOUND => Error::NotFound(if body.is_empty() {
            "catalog resource not found".into()
        } else {
            body
        }),
        _ => Error::Upstream {
            status: status.as_u16(),
            message: body,
        },
    }
}

#[async_trait]
impl CatalogSource for CatalogClient {
    async fn list_assets(&self) -> Result<Vec<Asset>> {
        CatalogClient::list_assets(self).await
    }

    async fn asset_columns(&self, asset_id: &str) -> Result<Vec<Column>> {
        CatalogClient::asset_columns(self, asset_id).await
    }

    async fn pii_rules(&self) -> Result<Vec<PiiRule>> {
        CatalogClient::pii_rules(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> CatalogConfig {
        CatalogConfig {
            base_url: Some(base_url.to_string()),
            ..CatalogConfig::default()
        }
    }

    #[test]
    fn requires_base_url() {
        let err = CatalogClient::new(&CatalogConfig::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn endpoints_are_encoded_under_base() {
        let client = CatalogClient::new(&config("http://catalog.local/v1/")).unwrap();
        let url = client
            .endpoint(&["api", "catalog", "assets", "a b/c", "columns"])
            .unwrap();
        assert_eq!(url.as_str(), "http://catalog.local/v1/api/catalog/assets/a%20b%2Fc/columns");
    }

    #[test]
    fn status_mapping() {
        assert!(matches!(status_error(StatusCode::UNAUTHORIZED, String::new()), Error::Forbidden));
        assert!(matches!(status_error(StatusCode::TOO_MANY_REQUESTS, String::new()), Error::RateLimit));
        assert!(matches!(status_error(StatusCode::NOT_FOUND, String::new()), Error::NotFound(_)));
        assert!(matches!(
            status_error(StatusCode::BAD_GATEWAY, "down".into()),
            Error::Upstream { status: 502, .. }
        ));
    }
}
