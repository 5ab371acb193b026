use crate::publishers::LogPublisher;
use crate::table::{AggregateTable, Snapshot};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tally_core::{
    Clock, Dimensions, DynPublisher, MetricUnit, PublishRequest, Result, SystemClock,
    DEFAULT_STORAGE_RESOLUTION,
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Accumulates observations for one application/component scope and
/// publishes them on [`Recorder::flush`].
///
/// Share it between tasks behind an `Arc`. Recording and snapshotting go
/// through one lock; publishing happens after the lock is released.
pub struct Recorder {
    app_name: String,
    dimensions: Dimensions,
    table: Mutex<AggregateTable>,
    publisher: DynPublisher,
    clock: Arc<dyn Clock>,
}

impl Recorder {
    pub fn new(
        namespace: impl Into<String>,
        app_name: impl Into<String>,
        publisher: DynPublisher,
    ) -> Self {
        Self::builder(namespace, app_name).publisher(publisher).build()
    }

    pub fn with_component(
        namespace: impl Into<String>,
        app_name: impl Into<String>,
        component: impl Into<String>,
        publisher: DynPublisher,
    ) -> Self {
        Self::builder(namespace, app_name)
            .component(component)
            .publisher(publisher)
            .build()
    }

    pub fn builder(namespace: impl Into<String>, app_name: impl Into<String>) -> RecorderBuilder {
        RecorderBuilder::new(namespace, app_name)
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn dimensions(&self) -> &Dimensions {
        &self.dimensions
    }

    /// Records the time elapsed since `started_at`, in milliseconds.
    ///
    /// A start time in the future counts as zero elapsed time.
    pub async fn record_time(&self, name: &str, started_at: DateTime<Utc>) -> Result<&Self> {
        let elapsed = (self.clock.now() - started_at).num_milliseconds();
        if elapsed < 0 {
            warn!(
                metric = name,
                skew_ms = -elapsed,
                "Start time is ahead of the clock, recording zero"
            );
        }
        self.absorb(name, elapsed.max(0) as f64, MetricUnit::Duration)
            .await
    }

    /// Records an already measured duration, in milliseconds.
    pub async fn record_duration(&self, name: &str, elapsed: Duration) -> Result<&Self> {
        self.absorb(name, elapsed.as_secs_f64() * 1000.0, MetricUnit::Duration)
            .await
    }

    pub async fn record_scalar(&self, name: &str, count: i64) -> Result<&Self> {
        self.absorb(name, count as f64, MetricUnit::Count).await
    }

    pub async fn increment(&self, name: &str) -> Result<&Self> {
        self.record_scalar(name, 1).await
    }

    async fn absorb(&self, name: &str, value: f64, unit: MetricUnit) -> Result<&Self> {
        let now = self.clock.now();
        self.table
            .lock()
            .await
            .absorb(name, value, unit, &self.dimensions, now)?;
        Ok(self)
    }

    /// Publishes everything accumulated since the last successful flush.
    ///
    /// Returns the number of metrics published; an empty table publishes
    /// nothing and returns `Ok(0)`. If the publisher fails, the taken
    /// entries go back into the table and the error is returned.
    pub async fn flush(&self) -> Result<usize> {
        let snapshot = self.table.lock().await.take();
        if snapshot.is_empty() {
            debug!(app = %self.app_name, "Nothing to flush");
            return Ok(0);
        }

        let request = PublishRequest::new(self.app_name.clone(), snapshot.into_entries());
        match self.publisher.publish_batch(&request).await {
            Ok(()) => {
                info!(
                    app = %self.app_name,
                    publisher = self.publisher.name(),
                    metrics = request.len(),
                    "Flushed metrics"
                );
                Ok(request.len())
            }
            Err(e) => {
                warn!(
                    app = %self.app_name,
                    publisher = self.publisher.name(),
                    metrics = request.len(),
                    error = %e,
                    "Publish failed, keeping metrics for the next flush"
                );
                self.table
                    .lock()
                    .await
                    .restore(Snapshot::from(request.metric_data));
                Err(e)
            }
        }
    }

    /// Number of distinct metric names waiting for the next flush.
    pub async fn pending(&self) -> usize {
        self.table.lock().await.len()
    }

    /// Copy of the pending metrics without clearing them.
    pub async fn peek(&self) -> Snapshot {
        self.table.lock().await.snapshot()
    }
}

pub struct RecorderBuilder {
    namespace: String,
    app_name: String,
    component: Option<String>,
    publisher: Option<DynPublisher>,
    clock: Option<Arc<dyn Clock>>,
    storage_resolution: u32,
}

impl RecorderBuilder {
    pub fn new(namespace: impl Into<String>, app_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            app_name: app_name.into(),
            component: None,
            publisher: None,
            clock: None,
            storage_resolution: DEFAULT_STORAGE_RESOLUTION,
        }
    }

    pub fn component(mut self, component: impl Into<String>) -> Self {
        self.component = Some(component.into());
        self
    }

    pub fn publisher(mut self, publisher: DynPublisher) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn storage_resolution(mut self, storage_resolution: u32) -> Self {
        self.storage_resolution = storage_resolution;
        self
    }

    /// Without a publisher, flushed metrics are written to the log.
    pub fn build(self) -> Recorder {
        Recorder {
            app_name: self.app_name,
            dimensions: Dimensions::for_scope(self.namespace, self.component),
            table: Mutex::new(AggregateTable::new(self.storage_resolution)),
            publisher: self
                .publisher
                .unwrap_or_else(|| Arc::new(LogPublisher::new())),
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::publishers::MemoryPublisher;
    use chrono::Duration as ChronoDuration;
    use tally_core::{ManualClock, TallyError};

    fn start() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn recorder_with(publisher: Arc<MemoryPublisher>, clock: Arc<ManualClock>) -> Recorder {
        Recorder::builder("svc", "search")
            .component("index")
            .publisher(publisher)
            .clock(clock)
            .build()
    }

    #[tokio::test]
    async fn test_record_time_uses_clock() {
        let publisher = Arc::new(MemoryPublisher::new());
        let clock = Arc::new(ManualClock::new(start()));
        let recorder = recorder_with(publisher, clock.clone());

        let t0 = clock.now();
        clock.advance(ChronoDuration::milliseconds(42));
        recorder.record_time("lookup", t0).await.unwrap();

        let datum = recorder.peek().await.get("lookup").cloned().unwrap();
        assert_eq!(datum.unit, MetricUnit::Duration);
        assert_eq!(datum.statistic_values.sum, 42.0);
        assert_eq!(datum.timestamp, clock.now());
    }

    #[tokio::test]
    async fn test_future_start_records_zero() {
        let publisher = Arc::new(MemoryPublisher::new());
        let clock = Arc::new(ManualClock::new(start()));
        let recorder = recorder_with(publisher, clock.clone());

        let later = clock.now() + ChronoDuration::seconds(5);
        recorder.record_time("skewed", later).await.unwrap();

        let datum = recorder.peek().await.get("skewed").cloned().unwrap();
        assert_eq!(datum.statistic_values.sum, 0.0);
        assert_eq!(datum.statistic_values.minimum, 0.0);
    }

    #[tokio::test]
    async fn test_record_duration_in_millis() {
        let recorder = Recorder::new("svc", "search", Arc::new(MemoryPublisher::new()));

        recorder
            .record_duration("io", Duration::from_micros(1500))
            .await
            .unwrap();

        let datum = recorder.peek().await.get("io").cloned().unwrap();
        assert_eq!(datum.statistic_values.sum, 1.5);
        assert_eq!(datum.unit, MetricUnit::Duration);
    }

    #[tokio::test]
    async fn test_chained_recording() {
        let recorder = Recorder::new("svc", "search", Arc::new(MemoryPublisher::new()));

        recorder
            .increment("a")
            .await
            .unwrap()
            .record_scalar("b", 7)
            .await
            .unwrap();

        assert_eq!(recorder.pending().await, 2);
    }

    #[tokio::test]
    async fn test_invalid_observation_is_rejected() {
        let publisher = Arc::new(MemoryPublisher::new());
        let recorder = Recorder::new("svc", "search", publisher.clone());

        let err = recorder.record_scalar("", 1).await.err().unwrap();
        assert!(matches!(err, TallyError::InvalidObservation(_)));
        assert_eq!(recorder.pending().await, 0);

        assert_eq!(recorder.flush().await.unwrap(), 0);
        assert_eq!(publisher.call_count(), 0);
    }

    #[tokio::test]
    async fn test_dimensions_without_component() {
        let recorder = Recorder::new("svc", "search", Arc::new(MemoryPublisher::new()));

        assert_eq!(recorder.app_name(), "search");
        assert_eq!(recorder.dimensions().len(), 1);
        assert_eq!(recorder.dimensions().get("namespace"), Some("svc"));
    }

    #[tokio::test]
    async fn test_flush_failure_keeps_later_observations_once() {
        let publisher = Arc::new(MemoryPublisher::new());
        let recorder = Recorder::new("svc", "search", publisher.clone());

        recorder.increment("hits").await.unwrap();
        publisher.fail_next(1);
        assert!(recorder.flush().await.is_err());

        recorder.increment("hits").await.unwrap();
        assert_eq!(recorder.flush().await.unwrap(), 1);

        let requests = publisher.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].get("hits").unwrap().statistic_values.sample_count,
            2
        );
        assert_eq!(recorder.pending().await, 0);
    }
}
