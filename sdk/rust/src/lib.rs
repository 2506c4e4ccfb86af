//! Async client for the composer admin API.

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("admin API returned {status}: {message}")]
    Api { status: StatusCode, message: String },
}

impl ClientError {
    /// HTTP status of an API error, if the server answered.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Transport(e) => e.status(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub version: String,
    pub status: String,
    pub revision: u64,
    pub subscribers: usize,
}

/// Result of a feature update.
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub revision: Option<u64>,
    pub configuration: Value,
}

pub struct ComposerClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl ComposerClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    pub async fn status(&self) -> Result<Status, ClientError> {
        self.get_json("/admin/status").await
    }

    /// The composed configuration as raw JSON.
    pub async fn config(&self) -> Result<Value, ClientError> {
        self.get_json("/admin/config").await
    }

    /// Fragments keyed by feature id.
    pub async fn features(&self) -> Result<Value, ClientError> {
        self.get_json("/admin/features").await
    }

    pub async fn update_feature(&self, feature: &str, params: &Value) -> Result<Update, ClientError> {
        let resp = self
            .authorized(self.client.put(self.url(&format!("/admin/features/{feature}"))))
            .json(params)
            .send()
            .await?;
        let resp = check(resp).await?;

        let revision = resp
            .headers()
            .get("x-config-revision")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());
        Ok(Update {
            revision,
            configuration: resp.json().await?,
        })
    }

    pub async fn advise(&self, advisor: &str, input: &Value) -> Result<Value, ClientError> {
        let resp = self
            .authorized(self.client.post(self.url(&format!("/admin/advisory/{advisor}"))))
            .json(input)
            .send()
            .await?;
        Ok(check(resp).await?.json().await?)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.bearer_auth(&self.api_key)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let resp = self.authorized(self.client.get(self.url(path))).send().await?;
        Ok(check(resp).await?.json().await?)
    }
}

async fn check(resp: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let text = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&text)
        .ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(String::from))
        .unwrap_or(text);
    Err(ClientError::Api { status, message })
}
