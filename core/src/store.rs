//! Escrow record persistence seam.
//!
//! The hosting substrate provides one atomic read-modify-write per
//! invocation; the store itself only gets and puts records by identifier.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_with::hex::Hex;
use serde_with::serde_as;

use crate::escrow::Escrow;
use crate::identity::EscrowId;
use crate::{EscrowError, Result};

/// Keyed access to escrow records.
pub trait RecordStore {
    /// Fetch the record under `id`, or [`EscrowError::NotFound`].
    fn get(&self, id: &EscrowId) -> Result<Escrow>;

    /// Write `record` under its identifier, replacing any prior version.
    fn put(&mut self, record: &Escrow) -> Result<()>;

    fn contains(&self, id: &EscrowId) -> bool;
}

/// In-memory record store holding bincode-encoded records, the way a
/// ledger account holds an opaque byte array. Serializable so a host can
/// persist it as substrate state.
#[serde_as]
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct MemoryStore {
    #[serde_as(as = "HashMap<_, Hex>")]
    records: HashMap<EscrowId, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordStore for MemoryStore {
    fn get(&self, id: &EscrowId) -> Result<Escrow> {
        let bytes = self.records.get(id).ok_or(EscrowError::NotFound(*id))?;
        let (record, _) = bincode::decode_from_slice(bytes, bincode::config::standard())
            .map_err(|e| EscrowError::Codec(e.to_string()))?;
        Ok(record)
    }

    fn put(&mut self, record: &Escrow) -> Result<()> {
        let bytes = bincode::encode_to_vec(record, bincode::config::standard())
            .map_err(|e| EscrowError::Codec(e.to_string()))?;
        self.records.insert(record.escrow_id, bytes);
        Ok(())
    }

    fn contains(&self, id: &EscrowId) -> bool {
        self.records.contains_key(id)
    }
}

#[cfg(test)]
mod tests {
    use core::str::FromStr as _;

    use super::*;
    use crate::interface::CreateParams;
    use crate::Party;

    #[test]
    fn get_put_semantics() {
        let creator = Party::from_str("deadbeef").unwrap();
        let params = CreateParams {
            collection_id: "y00ts".into(),
            predicted_floor: 110,
            margin_amount: 50,
            expiry_timestamp: 4_600,
            creator,
            seed: 1,
        };
        let (escrow, _) = Escrow::create(&params, 1_000).unwrap();

        let mut store = MemoryStore::new();
        assert!(!store.contains(&escrow.escrow_id));
        assert_eq!(
            store.get(&escrow.escrow_id),
            Err(EscrowError::NotFound(escrow.escrow_id))
        );

        store.put(&escrow).unwrap();
        assert!(store.contains(&escrow.escrow_id));
        assert_eq!(store.get(&escrow.escrow_id).unwrap(), escrow);
    }
}
