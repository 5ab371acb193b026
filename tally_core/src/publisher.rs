use crate::{datum::PublishRequest, error::Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Outbound boundary to a telemetry backend.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Deliver one batch. An error means the backend did not accept it.
    async fn publish_batch(&self, request: &PublishRequest) -> Result<()>;

    /// Get the name of this publisher
    fn name(&self) -> &str;
}

pub type DynPublisher = Arc<dyn Publisher>;
