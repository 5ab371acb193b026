use serde::{Deserialize, Serialize};
use std::fmt;

/// Unit of a metric, fixed by the first observation of a name in a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricUnit {
    /// Elapsed time, always in milliseconds.
    #[serde(rename = "Milliseconds")]
    Duration,
    #[serde(rename = "Count")]
    Count,
}

impl MetricUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricUnit::Duration => "Milliseconds",
            MetricUnit::Count => "Count",
        }
    }
}

impl fmt::Display for MetricUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
