//! Core types for JSON (de)serialization of escrow parameters and reports.

use std::fs::File;
use std::path::Path;

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::custody::Disbursement;
use crate::escrow::Escrow;
use crate::{Amount, Party, Timestamp};

/// Default path to the create-params template.
pub const CREATE_PARAMS_PATH: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../templates/create_params.json"
);

/// Default path to the substrate ledger-state template.
pub const LEDGER_STATE_PATH: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../templates/ledger_state.json"
);

/// Default path to the scripted oracle quotes template.
pub const ORACLE_QUOTES_PATH: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../templates/oracle_quotes.json"
);

/// Reads a JSON-encoded file from the given `path` and deserializes into type `T`.
///
/// # Errors
///
/// Returns an `anyhow::Error` if the file cannot be opened, read, or parsed.
pub fn load_escrow_data<P, T>(path: P) -> anyhow::Result<T>
where
    P: AsRef<Path>,
    T: DeserializeOwned,
{
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("loading escrow data: {:?}", path))?;
    serde_json::from_str(&content).with_context(|| format!("parsing JSON from {:?}", path))
}

/// Writes `data` (serializable) as pretty-printed JSON to the given `path`.
///
/// # Errors
///
/// Returns an `anyhow::Error` if the file cannot be created or data cannot be serialized.
pub fn save_escrow_data<P, T>(path: P, data: &T) -> anyhow::Result<()>
where
    P: AsRef<Path>,
    T: Serialize,
{
    let path = path.as_ref();
    let file = File::create(path).with_context(|| format!("creating file {:?}", path))?;
    serde_json::to_writer_pretty(file, data)
        .with_context(|| format!("serializing to JSON to {:?}", path))
}

/// Parameters required to **create** an escrow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateParams {
    /// Collection whose floor price is being predicted.
    pub collection_id: String,

    /// Creator's prediction: the floor at expiry will be at or above this,
    /// in smallest-denomination units.
    pub predicted_floor: Amount,

    /// Stake each party must commit; both sides risk the same amount.
    pub margin_amount: Amount,

    /// Absolute time after which settlement becomes eligible.
    pub expiry_timestamp: Timestamp,

    /// Who is opening (and funding) the escrow.
    pub creator: Party,

    /// Caller-chosen seed distinguishing this creator's escrows.
    pub seed: u64,
}

/// Outcome of a settlement: the terminal record plus its payout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SettlementReport {
    pub escrow: Escrow,
    pub disbursement: Disbursement,
}
