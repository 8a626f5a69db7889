//! Core library for Escrowfloor: floor-price prediction escrows.
//!
//! Two counterparties stake equal margin on opposing predictions about a
//! collection's floor price at a future time; settlement is resolved
//! deterministically against an oracle quote. Transition logic is pure:
//! the clock and the oracle price are passed in by the caller, never read
//! from the environment.

/// Custody intents, disbursements, and the fund-custody ledger seam
pub mod custody;
/// Escrow entity and state transitions
pub mod escrow;
/// Party identities and deterministic escrow addressing
pub mod identity;
/// State machine composed with its record store and custody ledger
pub mod machine;
/// Floor-price quotes and the oracle seam
pub mod oracle;
/// Escrow record persistence seam
pub mod store;
/// JSON (de)serialization of escrow parameters and reports
pub mod interface;
/// Test helpers
pub mod utils;

pub mod error;
pub use error::EscrowError;

pub type Result<T> = std::result::Result<T, EscrowError>;

/// Seconds since the Unix epoch.
pub type Timestamp = u64;
/// Value in the smallest denomination of the custody ledger.
pub type Amount = u64;

pub use custody::{CustodyIntent, CustodyLedger, Disbursement, MemoryLedger};
pub use escrow::{Escrow, EscrowStatus, MIN_EXPIRY_HORIZON};
pub use identity::{EscrowId, Party};
pub use interface::{CreateParams, SettlementReport};
pub use machine::EscrowMachine;
pub use oracle::{FloorQuote, PriceOracle, ScriptedOracle};
pub use store::{MemoryStore, RecordStore};
