//! File-backed execution substrate for the state machine.
//!
//! One JSON file holds the record store and the custody ledger. An
//! operation loads the state, applies exactly one transition, and writes
//! the file back only on success, which gives the core the atomic
//! read-modify-write it assumes.

use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;

use anyhow::Context;
use escrowfloor_core::{MemoryLedger, MemoryStore};
use serde::{Deserialize, Serialize};

/// Persisted substrate state: escrow records plus custody balances.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubstrateState {
    pub store: MemoryStore,
    pub ledger: MemoryLedger,
}

impl SubstrateState {
    /// Reads substrate state from the given `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                anyhow::bail!(
                    "Substrate state file {:?} not found.
                Please create one from templates/ledger_state.json",
                    path
                );
            }
            Err(e) => return Err(e).context(format!("opening file {:?}", path)),
        };
        serde_json::from_reader(file).with_context(|| format!("parsing JSON from {:?}", path))
    }

    /// Writes substrate state to the given `path`,
    /// creating parent directories as needed.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating directory {:?}", parent))?;
        }
        let file = File::create(path).with_context(|| format!("creating file {:?}", path))?;
        serde_json::to_writer_pretty(file, self)
            .with_context(|| format!("serializing to JSON to {:?}", path))
    }
}
