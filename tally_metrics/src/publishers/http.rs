use async_trait::async_trait;
use std::time::Duration;
use tally_core::{PublishRequest, Publisher, Result, TallyError};
use tracing::debug;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// POSTs each request as JSON to a collector endpoint.
#[derive(Debug, Clone)]
pub struct HttpPublisher {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpPublisher {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TallyError::InvalidConfig(format!("HTTP client: {}", e)))?;

        Ok(Self::with_client(client, endpoint))
    }

    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Publisher for HttpPublisher {
    async fn publish_batch(&self, request: &PublishRequest) -> Result<()> {
        debug!(endpoint = %self.endpoint, metrics = request.len(), "Posting batch");

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| TallyError::PublishFailed(format!("{}: {}", self.endpoint, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TallyError::PublishFailed(format!(
                "{} answered {}",
                self.endpoint, status
            )));
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "http"
    }
}
