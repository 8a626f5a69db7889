//! Floor-price quotes and the oracle seam.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{Amount, EscrowError, Result, Timestamp};

/// A floor-price observation for one collection.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct FloorQuote {
    /// Lowest current ask, smallest-denomination units.
    pub floor_price: Amount,
    /// When the index observed this price. Settlement rejects quotes
    /// observed before the escrow's expiry.
    pub observed_at: Timestamp,
}

/// External price-feed collaborator.
///
/// Untrusted for availability and timeliness; assumed correct in value.
/// Unavailability surfaces as [`EscrowError::OracleUnavailable`] and is
/// never masked.
pub trait PriceOracle {
    fn quote(&self, collection_id: &str) -> Result<FloorQuote>;
}

/// Scripted oracle returning pre-seeded quotes. A test and offline
/// substitute for a live price index; serializable so hosts can load the
/// script from a file.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct ScriptedOracle {
    quotes: HashMap<String, FloorQuote>,
}

impl ScriptedOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the quote returned for `collection_id`.
    pub fn set(&mut self, collection_id: impl Into<String>, quote: FloorQuote) {
        self.quotes.insert(collection_id.into(), quote);
    }
}

impl PriceOracle for ScriptedOracle {
    fn quote(&self, collection_id: &str) -> Result<FloorQuote> {
        self.quotes
            .get(collection_id)
            .copied()
            .ok_or_else(|| EscrowError::OracleUnavailable(format!("no quote for {collection_id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_quotes() {
        let mut oracle = ScriptedOracle::new();
        oracle.set(
            "y00ts",
            FloorQuote {
                floor_price: 120,
                observed_at: 4_600,
            },
        );

        assert_eq!(
            oracle.quote("y00ts").unwrap(),
            FloorQuote {
                floor_price: 120,
                observed_at: 4_600,
            }
        );
        assert!(matches!(
            oracle.quote("degods"),
            Err(EscrowError::OracleUnavailable(_))
        ));
    }
}
