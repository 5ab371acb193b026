use std::sync::Arc;
use std::time::Duration;
use tally_core::{Result, TallyError};
use tally_metrics::Recorder;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Totals reported when a [`FlushScheduler`] stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushStats {
    pub flushes: usize,
    pub failures: usize,
    pub metrics_published: usize,
}

/// Flushes a recorder every `interval` until cancelled, then once more.
pub struct FlushScheduler {
    recorder: Arc<Recorder>,
    interval: Duration,
}

impl FlushScheduler {
    /// The interval must be non-zero.
    pub fn new(recorder: Arc<Recorder>, interval: Duration) -> Result<Self> {
        if interval.is_zero() {
            return Err(TallyError::InvalidConfig(
                "Flush interval must be > 0".to_string(),
            ));
        }
        Ok(Self { recorder, interval })
    }

    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<FlushStats> {
        tokio::spawn(self.run(cancel))
    }

    pub async fn run(self, cancel: CancellationToken) -> FlushStats {
        let mut stats = FlushStats::default();
        let mut ticker =
            tokio::time::interval_at(tokio::time::Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            app = %self.recorder.app_name(),
            "Flushing every {:?}", self.interval
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => self.flush_once(&mut stats).await,
            }
        }

        info!(app = %self.recorder.app_name(), "Final flush before shutdown");
        self.flush_once(&mut stats).await;
        stats
    }

    async fn flush_once(&self, stats: &mut FlushStats) {
        match self.recorder.flush().await {
            Ok(published) => {
                stats.flushes += 1;
                stats.metrics_published += published;
            }
            Err(e) => {
                stats.failures += 1;
                warn!(app = %self.recorder.app_name(), error = %e, "Scheduled flush failed");
            }
        }
    }
}
