//! HTTP inventory source backed by `reqwest`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::{parse_snapshot, InventorySource};
use crate::config::DashboardConfig;
use crate::errors::FetchError;
use crate::types::InventorySnapshot;

/// Issues `GET <url>` and parses the JSON body. No auth, no request body.
pub struct HttpInventorySource {
    http: Client,
    url: String,
}

impl HttpInventorySource {
    /// Create a source for the given inventory URL.
    ///
    /// Without a timeout the transport default applies.
    pub fn new(url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, FetchError> {
        let url = url.into();
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(|e| FetchError::Client {
            message: e.to_string(),
        })?;
        Ok(HttpInventorySource { http, url })
    }

    pub fn from_config(config: &DashboardConfig) -> Result<Self, FetchError> {
        Self::new(config.inventory_url(), config.request_timeout())
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn network_error(&self, e: reqwest::Error) -> FetchError {
        let message = if e.is_timeout() {
            format!("request timed out: {}", e)
        } else {
            e.to_string()
        };
        FetchError::Network {
            url: self.url.clone(),
            message,
        }
    }
}

#[async_trait]
impl InventorySource for HttpInventorySource {
    async fn fetch(&self) -> Result<InventorySnapshot, FetchError> {
        let response = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.network_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| self.network_error(e))?;
        parse_snapshot(&body)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}
