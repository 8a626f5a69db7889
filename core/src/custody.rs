//! Custody intents and the fund-custody ledger seam.
//!
//! The state machine never owns balances: transitions emit [`CustodyIntent`]s
//! and the hosting substrate applies them atomically with the record write.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::identity::EscrowId;
use crate::{Amount, EscrowError, Party, Result};

/// A fund movement the custody ledger must apply.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum CustodyIntent {
    /// Move `amount` from `account` into the pool tagged `tag`.
    Lock {
        account: Party,
        amount: Amount,
        tag: EscrowId,
    },
    /// Pay `amount` out of the pool tagged `tag` to `recipient`.
    Release {
        tag: EscrowId,
        recipient: Party,
        amount: Amount,
    },
}

/// Settlement payout: the full `2 x margin` pool to the winner.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Disbursement {
    pub escrow_id: EscrowId,
    pub recipient: Party,
    pub amount: Amount,
}

impl Disbursement {
    pub fn into_intent(self) -> CustodyIntent {
        CustodyIntent::Release {
            tag: self.escrow_id,
            recipient: self.recipient,
            amount: self.amount,
        }
    }
}

/// Moves value between party accounts and escrow-held pools.
///
/// Implementors must apply each call atomically with the record mutation
/// of the invocation that emitted it.
pub trait CustodyLedger {
    /// Lock `amount` from `account` into the pool tagged `tag`.
    fn lock(&mut self, account: &Party, amount: Amount, tag: &EscrowId) -> Result<()>;

    /// Release `amount` from the pool tagged `tag` to `recipient`.
    fn release(&mut self, tag: &EscrowId, recipient: &Party, amount: Amount) -> Result<()>;

    /// Total currently held for `tag`.
    fn held(&self, tag: &EscrowId) -> Amount;

    fn apply(&mut self, intent: &CustodyIntent) -> Result<()> {
        match intent {
            CustodyIntent::Lock {
                account,
                amount,
                tag,
            } => self.lock(account, *amount, tag),
            CustodyIntent::Release {
                tag,
                recipient,
                amount,
            } => self.release(tag, recipient, *amount),
        }
    }
}

/// In-memory custody ledger: account balances plus per-escrow held pools.
///
/// Serializable so a host can persist it as substrate state.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct MemoryLedger {
    balances: HashMap<Party, Amount>,
    held: HashMap<EscrowId, Amount>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit an account's available balance.
    pub fn credit(&mut self, account: &Party, amount: Amount) {
        let balance = self.balances.entry(account.clone()).or_default();
        *balance = balance.saturating_add(amount);
    }

    /// Available (unlocked) balance of an account.
    pub fn balance(&self, account: &Party) -> Amount {
        self.balances.get(account).copied().unwrap_or_default()
    }
}

impl CustodyLedger for MemoryLedger {
    fn lock(&mut self, account: &Party, amount: Amount, tag: &EscrowId) -> Result<()> {
        let available = self.balance(account);
        if available < amount {
            return Err(EscrowError::InsufficientFunds {
                needed: amount,
                available,
            });
        }
        self.balances.insert(account.clone(), available - amount);
        let pool = self.held.entry(*tag).or_default();
        *pool = pool.saturating_add(amount);
        Ok(())
    }

    fn release(&mut self, tag: &EscrowId, recipient: &Party, amount: Amount) -> Result<()> {
        let pool = self.held(tag);
        if pool < amount {
            return Err(EscrowError::InsufficientFunds {
                needed: amount,
                available: pool,
            });
        }
        self.held.insert(*tag, pool - amount);
        self.credit(recipient, amount);
        Ok(())
    }

    fn held(&self, tag: &EscrowId) -> Amount {
        self.held.get(tag).copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use core::str::FromStr as _;

    use super::*;
    use crate::utils::assert_err;

    fn party(s: &str) -> Party {
        Party::from_str(s).unwrap()
    }

    #[test]
    fn lock_and_release() {
        let alice = party("deadbeef");
        let bob = party("beefdead");
        let tag = EscrowId::derive(&alice, 1);

        let mut ledger = MemoryLedger::new();
        ledger.credit(&alice, 100);

        ledger.lock(&alice, 60, &tag).unwrap();
        assert_eq!(ledger.balance(&alice), 40);
        assert_eq!(ledger.held(&tag), 60);

        ledger.release(&tag, &bob, 60).unwrap();
        assert_eq!(ledger.held(&tag), 0);
        assert_eq!(ledger.balance(&bob), 60);
    }

    #[test]
    fn lock_rejects_insufficient_balance() {
        let alice = party("deadbeef");
        let tag = EscrowId::derive(&alice, 1);

        let mut ledger = MemoryLedger::new();
        ledger.credit(&alice, 10);
        assert_err(
            ledger.lock(&alice, 25, &tag),
            EscrowError::InsufficientFunds {
                needed: 25,
                available: 10,
            },
        );
        // balance untouched on failure
        assert_eq!(ledger.balance(&alice), 10);
    }

    #[test]
    fn release_rejects_short_pool() {
        let alice = party("deadbeef");
        let tag = EscrowId::derive(&alice, 1);

        let mut ledger = MemoryLedger::new();
        ledger.credit(&alice, 50);
        ledger.lock(&alice, 50, &tag).unwrap();
        assert_err(
            ledger.release(&tag, &alice, 51),
            EscrowError::InsufficientFunds {
                needed: 51,
                available: 50,
            },
        );
    }
}
