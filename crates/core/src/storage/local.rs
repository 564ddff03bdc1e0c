use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::backend::PortfolioBackend;
use crate::errors::CoreError;
use crate::models::portfolio::PortfolioRecord;

/// Portfolio list kept as a pretty-printed JSON array on local disk.
pub struct LocalFileBackend {
    path: PathBuf,
}

impl LocalFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl PortfolioBackend for LocalFileBackend {
    fn name(&self) -> &str {
        "local file"
    }

    async fn load(&self) -> Result<Option<Vec<PortfolioRecord>>, CoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let records: Vec<PortfolioRecord> = serde_json::from_slice(&bytes).map_err(|e| {
            CoreError::Serialization(format!(
                "Failed to parse portfolios from {}: {e}",
                self.path.display()
            ))
        })?;
        Ok(Some(records))
    }

    async fn save(&self, records: &[PortfolioRecord]) -> Result<(), CoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec_pretty(records)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}
