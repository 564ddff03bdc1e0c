use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::portfolio::PortfolioRecord;

/// One persistence sink for the portfolio list.
///
/// The list is always stored and replaced as a whole; there is no partial
/// update and no versioning.
#[async_trait]
pub trait PortfolioBackend: Send + Sync {
    /// Human-readable name of this sink (for logs).
    fn name(&self) -> &str;

    /// `Ok(None)` means the sink is reachable but holds nothing yet.
    async fn load(&self) -> Result<Option<Vec<PortfolioRecord>>, CoreError>;

    /// Overwrite the stored list wholesale.
    async fn save(&self, records: &[PortfolioRecord]) -> Result<(), CoreError>;
}
