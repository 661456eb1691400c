//! HTTP client for the remote text-generation endpoint.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

use medscan_core::config::EnhancementConfig;

use crate::extraction::{ExtractionError, ExtractionResult};

/// Sends a prompt, returns the raw response body.
#[async_trait]
pub trait EnhancementClient: Send + Sync {
    async fn generate(&self, prompt: &str) -> ExtractionResult<String>;
}

/// Request body sent to the endpoint.
#[derive(Serialize)]
struct GenerateRequest<'a> {
    text: &'a str,
}

/// reqwest client for a JSON text-generation endpoint.
pub struct HttpEnhancementClient {
    endpoint: String,
    api_key: Option<String>,
    timeout_secs: Option<u64>,
    client: reqwest::Client,
}

impl HttpEnhancementClient {
    /// Create a client. No timeout unless `timeout_secs` is set.
    pub fn new(
        endpoint: &str,
        api_key: Option<String>,
        timeout_secs: Option<u64>,
    ) -> ExtractionResult<Self> {
        let mut builder =
            reqwest::Client::builder().user_agent(concat!("medscan/", env!("CARGO_PKG_VERSION")));
        if let Some(secs) = timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| ExtractionError::Http(e.to_string()))?;

        Ok(Self {
            endpoint: endpoint.trim().to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            timeout_secs,
            client,
        })
    }

    /// Build from configuration. `None` when enhancement is disabled or has no endpoint.
    pub fn from_config(config: &EnhancementConfig) -> ExtractionResult<Option<Self>> {
        match (&config.endpoint, config.is_usable()) {
            (Some(endpoint), true) => {
                Self::new(endpoint, config.api_key.clone(), config.timeout_secs).map(Some)
            }
            _ => Ok(None),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn map_send_error(&self, e: reqwest::Error) -> ExtractionError {
        if e.is_connect() {
            ExtractionError::Connection(self.endpoint.clone())
        } else if e.is_timeout() {
            ExtractionError::Timeout(self.timeout_secs.unwrap_or_default())
        } else {
            ExtractionError::Http(e.to_string())
        }
    }
}

#[async_trait]
impl EnhancementClient for HttpEnhancementClient {
    async fn generate(&self, prompt: &str) -> ExtractionResult<String> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&GenerateRequest { text: prompt });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response.text().await.map_err(|e| self.map_send_error(e))
    }
}

/// Mock client for testing without a network.
pub struct MockEnhancementClient {
    response: Result<String, String>,
}

impl MockEnhancementClient {
    /// Always answers with `body`.
    pub fn new(body: &str) -> Self {
        Self {
            response: Ok(body.to_string()),
        }
    }

    /// Always fails as if the endpoint were down.
    pub fn failing(reason: &str) -> Self {
        Self {
            response: Err(reason.to_string()),
        }
    }
}

#[async_trait]
impl EnhancementClient for MockEnhancementClient {
    async fn generate(&self, _prompt: &str) -> ExtractionResult<String> {
        self.response.clone().map_err(ExtractionError::Connection)
    }
}
