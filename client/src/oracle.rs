//! Oracle sources for the client.

use std::path::Path;

use escrowfloor_core::interface::load_escrow_data;
use escrowfloor_core::{FloorQuote, PriceOracle as _, ScriptedOracle};

use crate::Result;

/// Async seam to a floor-price index.
///
/// Real deployments implement this against a remote price index; the call
/// may block or fail independently of the ledger, so unavailability must
/// surface to the caller rather than being retried here.
#[async_trait::async_trait]
pub trait OracleSource: Send + Sync {
    /// Current floor-price quote for `collection_id`.
    async fn quote(&self, collection_id: &str) -> Result<FloorQuote>;
}

/// Oracle serving scripted quotes from a JSON file.
pub struct FileOracle {
    quotes: ScriptedOracle,
}

impl FileOracle {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let quotes: ScriptedOracle = load_escrow_data(path)?;
        Ok(Self { quotes })
    }
}

#[async_trait::async_trait]
impl OracleSource for FileOracle {
    async fn quote(&self, collection_id: &str) -> Result<FloorQuote> {
        Ok(self.quotes.quote(collection_id)?)
    }
}
