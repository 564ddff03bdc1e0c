use crate::models::portfolio::PortfolioRecord;

use super::backend::PortfolioBackend;

/// Dual-sink portfolio persistence: an optional remote table first, a local
/// JSON file always.
///
/// Load: remote → local → empty.
/// Save: both sinks are attempted independently; success means the remote
/// write worked, or, with no remote configured, the local write worked.
/// There is no locking: concurrent saves race and the last writer wins.
pub struct PortfolioStore {
    remote: Option<Box<dyn PortfolioBackend>>,
    local: Box<dyn PortfolioBackend>,
}

impl PortfolioStore {
    pub fn new(remote: Option<Box<dyn PortfolioBackend>>, local: Box<dyn PortfolioBackend>) -> Self {
        Self { remote, local }
    }

    /// Local file only.
    pub fn local_only(local: Box<dyn PortfolioBackend>) -> Self {
        Self::new(None, local)
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Load the stored portfolio list. Never fails; falls back to an empty list.
    pub async fn load(&self) -> Vec<PortfolioRecord> {
        if let Some(remote) = &self.remote {
            match remote.load().await {
                Ok(Some(records)) => return records,
                Ok(None) => {
                    tracing::info!(backend = remote.name(), "no stored portfolios, trying local file");
                }
                Err(e) => {
                    tracing::warn!(backend = remote.name(), error = %e, "portfolio load failed");
                }
            }
        }

        match self.local.load().await {
            Ok(Some(records)) => records,
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(backend = self.local.name(), error = %e, "portfolio load failed");
                Vec::new()
            }
        }
    }

    /// Replace the stored list wholesale in every sink. Returns overall success.
    pub async fn save(&self, records: &[PortfolioRecord]) -> bool {
        let remote_ok = match &self.remote {
            Some(remote) => match remote.save(records).await {
                Ok(()) => Some(true),
                Err(e) => {
                    tracing::warn!(backend = remote.name(), error = %e, "portfolio save failed");
                    Some(false)
                }
            },
            None => None,
        };

        // The local copy is written even when the remote succeeded: it is the backup.
        let local_ok = match self.local.save(records).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(backend = self.local.name(), error = %e, "portfolio save failed");
                false
            }
        };

        let success = remote_ok.unwrap_or(local_ok);
        tracing::debug!(count = records.len(), success, "portfolios saved");
        success
    }
}
