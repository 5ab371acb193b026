use serde::{Deserialize, Serialize};

/// Running aggregate of every value observed under one metric name.
///
/// There is no empty state: a summary is always built from its first value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatisticSummary {
    pub sample_count: u64,
    pub sum: f64,
    pub minimum: f64,
    pub maximum: f64,
}

impl StatisticSummary {
    pub fn from_value(value: f64) -> Self {
        Self {
            sample_count: 1,
            sum: value,
            minimum: value,
            maximum: value,
        }
    }

    pub fn absorb(&mut self, value: f64) {
        self.sample_count += 1;
        self.sum += value;
        self.minimum = self.minimum.min(value);
        self.maximum = self.maximum.max(value);
    }

    /// Combines two summaries of disjoint observation sets.
    pub fn merge(&mut self, other: &StatisticSummary) {
        self.sample_count += other.sample_count;
        self.sum += other.sum;
        self.minimum = self.minimum.min(other.minimum);
        self.maximum = self.maximum.max(other.maximum);
    }

    pub fn average(&self) -> f64 {
        self.sum / self.sample_count as f64
    }
}
