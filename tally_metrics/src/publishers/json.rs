use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tally_core::{PublishRequest, Publisher, Result};
use tokio::io::AsyncWriteExt;

/// Appends each request to a file as one line of JSON.
#[derive(Debug, Clone)]
pub struct JsonLinesPublisher {
    path: PathBuf,
}

impl JsonLinesPublisher {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn to_line(request: &PublishRequest) -> Result<String> {
        let mut line = serde_json::to_string(request)?;
        line.push('\n');
        Ok(line)
    }
}

#[async_trait]
impl Publisher for JsonLinesPublisher {
    async fn publish_batch(&self, request: &PublishRequest) -> Result<()> {
        let line = Self::to_line(request)?;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    fn name(&self) -> &str {
        "json_lines"
    }
}
