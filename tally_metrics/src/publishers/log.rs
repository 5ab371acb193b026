use async_trait::async_trait;
use tally_core::{PublishRequest, Publisher, Result};
use tracing::info;

/// Writes every datum as a structured `tracing` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogPublisher;

impl LogPublisher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Publisher for LogPublisher {
    async fn publish_batch(&self, request: &PublishRequest) -> Result<()> {
        for datum in &request.metric_data {
            let stats = &datum.statistic_values;
            info!(
                namespace = %request.namespace,
                metric = %datum.metric_name,
                unit = %datum.unit,
                dimensions = %datum.dimensions,
                count = stats.sample_count,
                sum = stats.sum,
                min = stats.minimum,
                max = stats.maximum,
                timestamp = %datum.timestamp,
                "metric"
            );
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}
