use thiserror::Error;

use crate::identity::EscrowId;
use crate::{Amount, EscrowStatus, Timestamp};

/// Escrow-related errors.
///
/// Every failure leaves the escrow record unchanged from before the call;
/// none are retried inside the state machine. `OracleUnavailable` and
/// `StaleOracleData` are distinct so a caller can tell "retry with fresher
/// data" from "permanently ineligible in its current form".
#[derive(Debug, Error, PartialEq)]
pub enum EscrowError {
    /// A creation constraint was violated.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// Available balance below the required margin, or a custody pool
    /// shorter than the requested release.
    #[error("insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: Amount, available: Amount },

    /// No escrow record under this identifier.
    #[error("escrow not found: {0}")]
    NotFound(EscrowId),

    /// Attempted an invalid state transition.
    #[error("invalid state: expected {expected}, found {actual}")]
    InvalidState {
        expected: EscrowStatus,
        actual: EscrowStatus,
    },

    /// The escrow can no longer be accepted.
    #[error("escrow expired at {expiry}, now {now}")]
    Expired { expiry: Timestamp, now: Timestamp },

    /// Counterparty equals creator.
    #[error("counterparty must differ from creator")]
    SelfDealing,

    /// Settlement or cancellation attempted before the expiry horizon.
    #[error("not eligible before {expiry}, now {now}")]
    NotYetEligible { expiry: Timestamp, now: Timestamp },

    /// The oracle quote predates the escrow's expiry and must not be used
    /// to settle.
    #[error("oracle quote observed at {observed_at} predates expiry {expiry}")]
    StaleOracleData {
        observed_at: Timestamp,
        expiry: Timestamp,
    },

    /// Propagated from the price oracle; never masked.
    #[error("price oracle unavailable: {0}")]
    OracleUnavailable(String),

    #[error("identity error: {0}")]
    Identity(#[from] IdentityError),

    /// Record (de)serialization failure at the store boundary.
    #[error("record codec error: {0}")]
    Codec(String),
}

/// Errors that might occur while parsing a `Party` or `EscrowId`.
#[derive(Debug, Error, PartialEq)]
pub enum IdentityError {
    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("invalid base58: {0}")]
    Base58(#[from] bs58::decode::Error),

    #[error("cannot parse identity from empty string")]
    EmptyIdentity,

    #[error("unsupported identity format")]
    UnsupportedFormat,
}
