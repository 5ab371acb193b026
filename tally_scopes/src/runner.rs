use crate::config::ScopeConfig;
use crate::scheduler::{FlushScheduler, FlushStats};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tally_core::{DynPublisher, TallyError};
use tally_metrics::Recorder;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservationKind {
    /// `value` is a duration in milliseconds.
    Duration,
    Count,
}

/// One recorded observation, as stored one per line in a replay file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub name: String,
    pub kind: ObservationKind,
    #[serde(default = "default_value")]
    pub value: f64,
}

fn default_value() -> f64 {
    1.0
}

impl Observation {
    pub fn parse_lines(content: &str) -> anyhow::Result<Vec<Observation>> {
        content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(index, line)| {
                serde_json::from_str(line)
                    .with_context(|| format!("Invalid observation on line {}", index + 1))
            })
            .collect()
    }
}

enum Sample<'a> {
    Elapsed(&'a str, Duration),
    Count(&'a str, i64),
}

impl Observation {
    fn to_sample(&self) -> tally_core::Result<Sample<'_>> {
        match self.kind {
            ObservationKind::Duration => Duration::try_from_secs_f64(self.value / 1000.0)
                .map(|elapsed| Sample::Elapsed(&self.name, elapsed))
                .map_err(|e| {
                    TallyError::InvalidObservation(format!("duration for '{}': {}", self.name, e))
                }),
            // i64::MAX as f64 rounds up to 2^63, which is already out of range.
            ObservationKind::Count
                if self.value.fract() == 0.0
                    && self.value >= i64::MIN as f64
                    && self.value < i64::MAX as f64 =>
            {
                Ok(Sample::Count(&self.name, self.value as i64))
            }
            ObservationKind::Count => Err(TallyError::InvalidObservation(format!(
                "count for '{}' must be a whole number in i64 range, got {}",
                self.name, self.value
            ))),
        }
    }
}

/// Feeds observations into `recorder` and returns how many were recorded.
///
/// Every observation is checked first; one bad line records nothing.
pub async fn replay_observations(
    recorder: &Recorder,
    observations: &[Observation],
) -> tally_core::Result<usize> {
    let samples = observations
        .iter()
        .map(|observation| observation.to_sample())
        .collect::<tally_core::Result<Vec<_>>>()?;

    for sample in samples {
        match sample {
            Sample::Elapsed(name, elapsed) => recorder.record_duration(name, elapsed).await?,
            Sample::Count(name, count) => recorder.record_scalar(name, count).await?,
        };
    }
    Ok(observations.len())
}

/// A recorder built from a [`ScopeConfig`], plus the means to drive it.
pub struct ScopeRunner {
    config: ScopeConfig,
    recorder: Arc<Recorder>,
}

impl ScopeRunner {
    pub fn from_config(config: ScopeConfig) -> tally_core::Result<Self> {
        let recorder = Arc::new(config.build_recorder()?);
        Ok(Self { config, recorder })
    }

    pub fn with_publisher(
        config: ScopeConfig,
        publisher: DynPublisher,
    ) -> tally_core::Result<Self> {
        config.validate().map_err(TallyError::InvalidConfig)?;
        let recorder = Arc::new(config.build_recorder_with(publisher));
        Ok(Self { config, recorder })
    }

    pub fn recorder(&self) -> Arc<Recorder> {
        self.recorder.clone()
    }

    /// Replays a JSON-lines observation file and flushes once.
    ///
    /// Returns `(observations recorded, metrics published)`.
    pub async fn replay_file(&self, path: impl AsRef<Path>) -> anyhow::Result<(usize, usize)> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Cannot read {}", path.display()))?;
        let observations = Observation::parse_lines(&contents)?;

        info!(
            "Replaying {} observations into '{}'",
            observations.len(),
            self.config.app_name
        );

        let recorded = replay_observations(&self.recorder, &observations).await?;
        let published = self.recorder.flush().await?;
        Ok((recorded, published))
    }

    /// Starts periodic flushing at the configured interval.
    pub fn start(&self, cancel: CancellationToken) -> tally_core::Result<JoinHandle<FlushStats>> {
        let scheduler = FlushScheduler::new(self.recorder.clone(), self.config.flush_interval)?;
        Ok(scheduler.spawn(cancel))
    }
}
