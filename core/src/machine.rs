//! The escrow state machine composed with its collaborators.
//!
//! Each operation is one read-validate-write unit against a single record:
//! validation runs on a local copy before any custody movement, and the
//! record write happens only after the custody ledger has accepted the
//! intent, so a failure at any step leaves both collaborators unchanged.
//! The oracle quote is fetched by the caller and passed in, keeping the
//! transition logic deterministic and replayable.

use crate::custody::{CustodyLedger, Disbursement};
use crate::escrow::Escrow;
use crate::identity::EscrowId;
use crate::interface::CreateParams;
use crate::oracle::FloorQuote;
use crate::store::RecordStore;
use crate::{EscrowError, Party, Result, Timestamp};

pub struct EscrowMachine<S, L> {
    store: S,
    ledger: L,
}

impl<S: RecordStore, L: CustodyLedger> EscrowMachine<S, L> {
    pub fn new(store: S, ledger: L) -> Self {
        Self { store, ledger }
    }

    /// Allocate a new escrow and lock the creator's margin.
    pub fn create(&mut self, params: &CreateParams, now: Timestamp) -> Result<Escrow> {
        let (escrow, lock) = Escrow::create(params, now)?;
        if self.store.contains(&escrow.escrow_id) {
            return Err(EscrowError::InvalidParameters(format!(
                "escrow {} already exists for this creator and seed",
                escrow.escrow_id
            )));
        }
        self.ledger.apply(&lock)?;
        self.store.put(&escrow)?;
        Ok(escrow)
    }

    /// Bind the bet: lock the counterparty's margin into the same pool.
    pub fn accept(
        &mut self,
        id: &EscrowId,
        counterparty: Party,
        now: Timestamp,
    ) -> Result<Escrow> {
        let mut record = self.store.get(id)?;
        let lock = record.accept(counterparty, now)?;
        self.ledger.apply(&lock)?;
        self.store.put(&record)?;
        Ok(record)
    }

    /// Resolve the bet against `quote`, disbursing the full pool to the
    /// winner. The quote must have been fetched for this escrow's
    /// collection no earlier than its expiry.
    pub fn settle(
        &mut self,
        id: &EscrowId,
        quote: &FloorQuote,
        now: Timestamp,
    ) -> Result<(Escrow, Disbursement)> {
        let mut record = self.store.get(id)?;
        let disbursement = record.settle(quote, now)?;
        self.ledger.apply(&disbursement.clone().into_intent())?;
        self.store.put(&record)?;
        Ok((record, disbursement))
    }

    /// Close out a never-accepted escrow, refunding the creator.
    pub fn cancel(&mut self, id: &EscrowId, caller: &Party, now: Timestamp) -> Result<Escrow> {
        let mut record = self.store.get(id)?;
        let refund = record.cancel(caller, now)?;
        self.ledger.apply(&refund)?;
        self.store.put(&record)?;
        Ok(record)
    }

    pub fn get(&self, id: &EscrowId) -> Result<Escrow> {
        self.store.get(id)
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_parts(self) -> (S, L) {
        (self.store, self.ledger)
    }
}
