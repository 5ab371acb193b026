use crate::{dimension::Dimensions, summary::StatisticSummary, unit::MetricUnit};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One-minute aggregation at the backend.
pub const DEFAULT_STORAGE_RESOLUTION: u32 = 60;
/// One-second aggregation at the backend.
pub const HIGH_STORAGE_RESOLUTION: u32 = 1;

/// A named summary as handed to the publisher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDatum {
    pub metric_name: String,
    pub statistic_values: StatisticSummary,
    pub unit: MetricUnit,
    pub dimensions: Dimensions,
    /// Time of the first observation in the current cycle.
    pub timestamp: DateTime<Utc>,
    #[serde(default = "default_storage_resolution")]
    pub storage_resolution: u32,
}

fn default_storage_resolution() -> u32 {
    DEFAULT_STORAGE_RESOLUTION
}

impl MetricDatum {
    pub fn new(
        metric_name: impl Into<String>,
        value: f64,
        unit: MetricUnit,
        dimensions: Dimensions,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            metric_name: metric_name.into(),
            statistic_values: StatisticSummary::from_value(value),
            unit,
            dimensions,
            timestamp,
            storage_resolution: DEFAULT_STORAGE_RESOLUTION,
        }
    }

    pub fn with_storage_resolution(mut self, storage_resolution: u32) -> Self {
        self.storage_resolution = storage_resolution;
        self
    }

    /// Folds a later datum for the same name into this one, keeping this
    /// datum's unit and timestamp.
    pub fn merge(&mut self, later: &MetricDatum) {
        self.statistic_values.merge(&later.statistic_values);
    }
}

/// A batch of metric data published under one namespace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishRequest {
    pub namespace: String,
    pub metric_data: Vec<MetricDatum>,
}

impl PublishRequest {
    pub fn new(namespace: impl Into<String>, metric_data: Vec<MetricDatum>) -> Self {
        Self {
            namespace: namespace.into(),
            metric_data,
        }
    }

    pub fn len(&self) -> usize {
        self.metric_data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metric_data.is_empty()
    }

    pub fn get(&self, metric_name: &str) -> Option<&MetricDatum> {
        self.metric_data
            .iter()
            .find(|d| d.metric_name == metric_name)
    }
}
