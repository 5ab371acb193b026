use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tally_core::{DynPublisher, TallyError, DEFAULT_STORAGE_RESOLUTION, HIGH_STORAGE_RESOLUTION};
use tally_metrics::{HttpPublisher, JsonLinesPublisher, LogPublisher, MemoryPublisher, Recorder};

/// Declarative description of one recorder scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopeConfig {
    pub namespace: String,
    pub app_name: String,
    #[serde(default)]
    pub component: Option<String>,
    #[serde(with = "humantime_serde", default = "default_flush_interval")]
    pub flush_interval: Duration,
    #[serde(default = "default_storage_resolution")]
    pub storage_resolution: u32,
    #[serde(default)]
    pub publisher: PublisherConfig,
}

/// TOML files keep the scope under a `[scope]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopeFile {
    pub scope: ScopeConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PublisherConfig {
    #[default]
    Log,
    JsonLines {
        path: PathBuf,
    },
    Http {
        endpoint: String,
        #[serde(with = "humantime_serde", default = "default_http_timeout")]
        timeout: Duration,
    },
    Memory,
}

fn default_flush_interval() -> Duration {
    Duration::from_secs(60)
}

fn default_storage_resolution() -> u32 {
    DEFAULT_STORAGE_RESOLUTION
}

fn default_http_timeout() -> Duration {
    tally_metrics::publishers::http::DEFAULT_TIMEOUT
}

impl PublisherConfig {
    pub const KINDS: [(&'static str, &'static str); 4] = [
        ("log", "write every metric as a structured log event"),
        ("json_lines", "append each batch as a JSON line to `path`"),
        ("http", "POST each batch as JSON to `endpoint`"),
        ("memory", "keep batches in memory (dry runs)"),
    ];

    pub fn kind(&self) -> &'static str {
        match self {
            PublisherConfig::Log => "log",
            PublisherConfig::JsonLines { .. } => "json_lines",
            PublisherConfig::Http { .. } => "http",
            PublisherConfig::Memory => "memory",
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        match self {
            PublisherConfig::JsonLines { path } if path.as_os_str().is_empty() => {
                Err("json_lines publisher needs a path".to_string())
            }
            PublisherConfig::Http { endpoint, .. } if endpoint.trim().is_empty() => {
                Err("http publisher needs an endpoint".to_string())
            }
            PublisherConfig::Http { timeout, .. } if timeout.is_zero() => {
                Err("http publisher timeout must be > 0".to_string())
            }
            _ => Ok(()),
        }
    }

    pub fn build(&self) -> tally_core::Result<DynPublisher> {
        let publisher: DynPublisher = match self {
            PublisherConfig::Log => Arc::new(LogPublisher::new()),
            PublisherConfig::JsonLines { path } => Arc::new(JsonLinesPublisher::new(path.clone())),
            PublisherConfig::Http { endpoint, timeout } => {
                Arc::new(HttpPublisher::new(endpoint.clone(), *timeout)?)
            }
            PublisherConfig::Memory => Arc::new(MemoryPublisher::new()),
        };
        Ok(publisher)
    }
}

impl ScopeConfig {
    pub fn builder() -> ScopeConfigBuilder {
        ScopeConfigBuilder::default()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.namespace.trim().is_empty() {
            return Err("Scope namespace cannot be empty".to_string());
        }

        if self.app_name.trim().is_empty() {
            return Err("Scope app_name cannot be empty".to_string());
        }

        if let Some(component) = &self.component {
            if component.trim().is_empty() {
                return Err("Scope component cannot be empty when given".to_string());
            }
        }

        if self.flush_interval.is_zero() {
            return Err("Flush interval must be > 0".to_string());
        }

        if self.storage_resolution != DEFAULT_STORAGE_RESOLUTION
            && self.storage_resolution != HIGH_STORAGE_RESOLUTION
        {
            return Err(format!(
                "Storage resolution must be {} or {}, got {}",
                DEFAULT_STORAGE_RESOLUTION, HIGH_STORAGE_RESOLUTION, self.storage_resolution
            ));
        }

        self.publisher.validate()
    }

    /// Builds a recorder wired to the configured publisher.
    pub fn build_recorder(&self) -> tally_core::Result<Recorder> {
        self.validate().map_err(TallyError::InvalidConfig)?;
        let publisher = self.publisher.build()?;
        Ok(self.build_recorder_with(publisher))
    }

    /// Like [`ScopeConfig::build_recorder`], with the publisher supplied by the caller.
    pub fn build_recorder_with(&self, publisher: DynPublisher) -> Recorder {
        let mut builder = Recorder::builder(self.namespace.clone(), self.app_name.clone())
            .publisher(publisher)
            .storage_resolution(self.storage_resolution);
        if let Some(component) = &self.component {
            builder = builder.component(component.clone());
        }
        builder.build()
    }
}

#[derive(Default)]
pub struct ScopeConfigBuilder {
    namespace: Option<String>,
    app_name: Option<String>,
    component: Option<String>,
    flush_interval: Option<Duration>,
    storage_resolution: Option<u32>,
    publisher: PublisherConfig,
}

impl ScopeConfigBuilder {
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = Some(app_name.into());
        self
    }

    pub fn component(mut self, component: impl Into<String>) -> Self {
        self.component = Some(component.into());
        self
    }

    pub fn flush_interval(mut self, flush_interval: Duration) -> Self {
        self.flush_interval = Some(flush_interval);
        self
    }

    pub fn storage_resolution(mut self, storage_resolution: u32) -> Self {
        self.storage_resolution = Some(storage_resolution);
        self
    }

    pub fn publisher(mut self, publisher: PublisherConfig) -> Self {
        self.publisher = publisher;
        self
    }

    pub fn build(self) -> ScopeConfig {
        ScopeConfig {
            namespace: self.namespace.unwrap_or_default(),
            app_name: self.app_name.unwrap_or_default(),
            component: self.component,
            flush_interval: self.flush_interval.unwrap_or_else(default_flush_interval),
            storage_resolution: self
                .storage_resolution
                .unwrap_or(DEFAULT_STORAGE_RESOLUTION),
            publisher: self.publisher,
        }
    }
}

mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}
