//! File-backed host for the Escrowfloor state machine.
//!
//! `FloorClient` loads substrate state (records + custody balances) from a
//! JSON file, applies exactly one transition per call, and persists the
//! state back only when the transition succeeds.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use escrowfloor_core::{
    CreateParams, Escrow, EscrowId, EscrowMachine, MemoryLedger, MemoryStore, Party,
    SettlementReport, Timestamp,
};

pub use error::{ClientError, Result};
use oracle::OracleSource;
use substrate::SubstrateState;

pub mod error;
pub mod oracle;
pub mod substrate;

pub struct FloorClient {
    state_path: PathBuf,
    machine: EscrowMachine<MemoryStore, MemoryLedger>,
}

impl FloorClient {
    /// Loads substrate state from `state_path`.
    pub fn open<P: Into<PathBuf>>(state_path: P) -> Result<Self> {
        let state_path = state_path.into();
        let state = SubstrateState::load(&state_path)?;
        Ok(Self {
            state_path,
            machine: EscrowMachine::new(state.store, state.ledger),
        })
    }

    /// Open a new escrow, locking the creator's margin.
    pub fn create(&mut self, params: &CreateParams) -> Result<Escrow> {
        let now = unix_now()?;
        let escrow = self.machine.create(params, now)?;
        self.persist()?;
        Ok(escrow)
    }

    /// Accept an open escrow as `counterparty`, locking their margin.
    pub fn accept(&mut self, id: &EscrowId, counterparty: Party) -> Result<Escrow> {
        let now = unix_now()?;
        let escrow = self.machine.accept(id, counterparty, now)?;
        self.persist()?;
        Ok(escrow)
    }

    /// Settle an accepted escrow against a quote from `oracle`.
    ///
    /// Eligibility is checked before the oracle round-trip; the fetched
    /// quote is then passed into the transition, which enforces freshness.
    pub async fn settle(
        &mut self,
        id: &EscrowId,
        oracle: &dyn OracleSource,
        at: Option<Timestamp>,
    ) -> Result<SettlementReport> {
        let now = match at {
            Some(t) => t,
            None => unix_now()?,
        };
        let record = self.machine.get(id)?;
        record.ensure_settleable(now)?;

        let quote = oracle.quote(&record.collection_id).await?;
        let (escrow, disbursement) = self.machine.settle(id, &quote, now)?;
        self.persist()?;
        Ok(SettlementReport {
            escrow,
            disbursement,
        })
    }

    /// Cancel a never-accepted escrow, refunding the creator.
    pub fn cancel(
        &mut self,
        id: &EscrowId,
        caller: &Party,
        at: Option<Timestamp>,
    ) -> Result<Escrow> {
        let now = match at {
            Some(t) => t,
            None => unix_now()?,
        };
        let escrow = self.machine.cancel(id, caller, now)?;
        self.persist()?;
        Ok(escrow)
    }

    pub fn get(&self, id: &EscrowId) -> Result<Escrow> {
        Ok(self.machine.get(id)?)
    }

    fn persist(&self) -> Result<()> {
        let state = SubstrateState {
            store: self.machine.store().clone(),
            ledger: self.machine.ledger().clone(),
        };
        state.save(&self.state_path)?;
        Ok(())
    }
}

fn unix_now() -> Result<Timestamp> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|e| ClientError::Clock(e.to_string()))
}
