use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::types::{ChatReply, ChatRequest, HealthReport};
use super::ChatBackend;
use crate::config::Config;
use crate::error::{DeskError, DeskResult};

/// HTTP client for a SmartDesk backend rooted at `base_url`.
#[derive(Clone)]
pub struct DeskClient {
    client: Client,
    base_url: String,
}

impl DeskClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Like [`DeskClient::new`], but every request fails once `timeout` elapses.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> DeskResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Build a client for `base_url`, applying the configured timeout if any.
    pub fn from_config(base_url: &str, config: &Config) -> DeskResult<Self> {
        match config.request_timeout() {
            Some(timeout) => Self::with_timeout(base_url, timeout),
            None => Ok(Self::new(base_url)),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> DeskResult<T> {
        let status = response.status();
        if !status.is_success() {
            return Err(DeskError::Http { status });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl ChatBackend for DeskClient {
    async fn health(&self) -> DeskResult<HealthReport> {
        let url = format!("{}/health", self.base_url);
        debug!(%url, "checking backend health");

        let response = self.client.get(&url).send().await?;
        Self::decode(response).await
    }

    async fn chat(&self, request: &ChatRequest) -> DeskResult<ChatReply> {
        let url = format!("{}/chat", self.base_url);
        debug!(%url, user_id = %request.user_id, "posting chat message");

        let response = self.client.post(&url).json(request).send().await?;
        Self::decode(response).await
    }
}
