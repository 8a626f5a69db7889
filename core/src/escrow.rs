//! Escrow state machine for floor-price prediction bets.

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::custody::{CustodyIntent, Disbursement};
use crate::interface::CreateParams;
use crate::oracle::FloorQuote;
use crate::{Amount, EscrowError, EscrowId, Party, Result, Timestamp};

/// Minimum distance between creation time and expiry, in seconds.
/// Rejects trivially-already-expired bets.
pub const MIN_EXPIRY_HORIZON: u64 = 60;

/// Lifecycle of an escrow.
///
/// `Created -> Accepted -> Settled` or `Created -> Cancelled`; no other
/// transition is legal. `Settled` and `Cancelled` are terminal.
#[derive(Serialize, Deserialize, Encode, Decode, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscrowStatus {
    /// Creator margin locked; awaiting a counterparty.
    Created,
    /// Both margins locked; the bet is binding.
    Accepted,
    /// Resolved against an oracle quote; pool disbursed to the winner.
    Settled,
    /// Never accepted; creator margin refunded after expiry.
    Cancelled,
}

impl AsRef<str> for EscrowStatus {
    fn as_ref(&self) -> &str {
        match self {
            Self::Created => "created",
            Self::Accepted => "accepted",
            Self::Settled => "settled",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for EscrowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// One floor-price prediction bet.
///
/// The creator predicts the collection's floor at expiry will be at or
/// above `predicted_floor`; the counterparty implicitly bets it stays
/// below. Both sides risk the same `margin_amount`.
#[derive(Serialize, Deserialize, Encode, Decode, Debug, Clone, PartialEq)]
pub struct Escrow {
    /// Stable identifier, derived from the creator's identity and a seed.
    pub escrow_id: EscrowId,
    /// Collection whose floor price is being predicted.
    pub collection_id: String,
    /// Who opened the escrow.
    pub creator: Party,
    /// Who accepted it; absent until `accept` succeeds.
    pub counterparty: Option<Party>,
    /// Creator's prediction, smallest-denomination units.
    pub predicted_floor: Amount,
    /// Stake each party commits.
    pub margin_amount: Amount,
    /// Time after which settlement becomes eligible.
    pub expiry_timestamp: Timestamp,
    /// Current state.
    pub status: EscrowStatus,
    /// Creation time; diagnostics only, never settlement logic.
    pub created_at: Timestamp,
}

impl Escrow {
    /// Validates create parameters and allocates a new `Created` escrow,
    /// together with the intent locking the creator's margin.
    pub fn create(params: &CreateParams, now: Timestamp) -> Result<(Self, CustodyIntent)> {
        if params.collection_id.is_empty() {
            return Err(EscrowError::InvalidParameters(
                "collection_id must not be empty".into(),
            ));
        }
        if params.predicted_floor == 0 {
            return Err(EscrowError::InvalidParameters(
                "predicted_floor must be positive".into(),
            ));
        }
        if params.margin_amount == 0 {
            return Err(EscrowError::InvalidParameters(
                "margin_amount must be positive".into(),
            ));
        }
        // The payout pool is 2x margin; reject margins it cannot hold.
        if params.margin_amount.checked_mul(2).is_none() {
            return Err(EscrowError::InvalidParameters(
                "margin_amount overflows the payout pool".into(),
            ));
        }
        if params.expiry_timestamp < now.saturating_add(MIN_EXPIRY_HORIZON) {
            return Err(EscrowError::InvalidParameters(format!(
                "expiry_timestamp must be at least {MIN_EXPIRY_HORIZON}s in the future"
            )));
        }

        let escrow = Self {
            escrow_id: EscrowId::derive(&params.creator, params.seed),
            collection_id: params.collection_id.clone(),
            creator: params.creator.clone(),
            counterparty: None,
            predicted_floor: params.predicted_floor,
            margin_amount: params.margin_amount,
            expiry_timestamp: params.expiry_timestamp,
            status: EscrowStatus::Created,
            created_at: now,
        };
        let lock = CustodyIntent::Lock {
            account: escrow.creator.clone(),
            amount: escrow.margin_amount,
            tag: escrow.escrow_id,
        };
        Ok((escrow, lock))
    }

    /// Binds the bet: sets the counterparty and emits the intent locking
    /// their margin into the same custody pool.
    pub fn accept(&mut self, counterparty: Party, now: Timestamp) -> Result<CustodyIntent> {
        self.expect_status(EscrowStatus::Created)?;
        if counterparty == self.creator {
            return Err(EscrowError::SelfDealing);
        }
        if now >= self.expiry_timestamp {
            return Err(EscrowError::Expired {
                expiry: self.expiry_timestamp,
                now,
            });
        }

        let lock = CustodyIntent::Lock {
            account: counterparty.clone(),
            amount: self.margin_amount,
            tag: self.escrow_id,
        };
        self.counterparty = Some(counterparty);
        self.status = EscrowStatus::Accepted;
        Ok(lock)
    }

    /// Resolves the bet against an oracle quote, paying the full pool to
    /// the winner. Quotes observed before expiry must not be used.
    pub fn settle(&mut self, quote: &FloorQuote, now: Timestamp) -> Result<Disbursement> {
        self.ensure_settleable(now)?;
        if quote.observed_at < self.expiry_timestamp {
            return Err(EscrowError::StaleOracleData {
                observed_at: quote.observed_at,
                expiry: self.expiry_timestamp,
            });
        }
        let Some(counterparty) = self.counterparty.clone() else {
            return Err(EscrowError::InvalidState {
                expected: EscrowStatus::Accepted,
                actual: self.status,
            });
        };

        let winner = if self.creator_wins(quote.floor_price) {
            self.creator.clone()
        } else {
            counterparty
        };
        let pool = self
            .margin_amount
            .checked_mul(2)
            .ok_or_else(|| EscrowError::InvalidParameters("payout pool overflow".into()))?;

        self.status = EscrowStatus::Settled;
        Ok(Disbursement {
            escrow_id: self.escrow_id,
            recipient: winner,
            amount: pool,
        })
    }

    /// Closes out an escrow that never found a counterparty, refunding the
    /// creator's margin. Only the creator may cancel, and only once the
    /// expiry has passed; an escrow still accepting offers cannot be
    /// withdrawn early.
    pub fn cancel(&mut self, caller: &Party, now: Timestamp) -> Result<CustodyIntent> {
        self.expect_status(EscrowStatus::Created)?;
        if caller != &self.creator {
            return Err(EscrowError::InvalidParameters(
                "only the escrow creator may cancel".into(),
            ));
        }
        if now < self.expiry_timestamp {
            return Err(EscrowError::NotYetEligible {
                expiry: self.expiry_timestamp,
                now,
            });
        }

        self.status = EscrowStatus::Cancelled;
        Ok(CustodyIntent::Release {
            tag: self.escrow_id,
            recipient: self.creator.clone(),
            amount: self.margin_amount,
        })
    }

    /// Settlement eligibility checks that precede the oracle call.
    pub fn ensure_settleable(&self, now: Timestamp) -> Result<()> {
        self.expect_status(EscrowStatus::Accepted)?;
        if now < self.expiry_timestamp {
            return Err(EscrowError::NotYetEligible {
                expiry: self.expiry_timestamp,
                now,
            });
        }
        Ok(())
    }

    /// Winner determination. Equality favors the creator: the prediction
    /// is a closed interval on the creator's side.
    pub fn creator_wins(&self, observed_floor: Amount) -> bool {
        observed_floor >= self.predicted_floor
    }

    fn expect_status(&self, expected: EscrowStatus) -> Result<()> {
        if self.status != expected {
            return Err(EscrowError::InvalidState {
                expected,
                actual: self.status,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use core::str::FromStr as _;

    use super::*;
    use crate::utils::assert_err;

    fn params(creator: &Party) -> CreateParams {
        CreateParams {
            collection_id: "y00ts".into(),
            predicted_floor: 110,
            margin_amount: 50,
            expiry_timestamp: 1_000 + 3_600,
            creator: creator.clone(),
            seed: 1,
        }
    }

    fn creator() -> Party {
        Party::from_str("9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin").unwrap()
    }

    fn counterparty() -> Party {
        Party::from_str("GvDMxPzN1sCj7L26YDK2HnMRXEQmQ2aemov8YBtPS7vR").unwrap()
    }

    #[test]
    fn create_locks_creator_margin() {
        let creator = creator();
        let (escrow, lock) = Escrow::create(&params(&creator), 1_000).unwrap();

        assert_eq!(escrow.status, EscrowStatus::Created);
        assert_eq!(escrow.counterparty, None);
        assert_eq!(escrow.created_at, 1_000);
        assert_eq!(
            lock,
            CustodyIntent::Lock {
                account: creator,
                amount: 50,
                tag: escrow.escrow_id,
            }
        );
    }

    #[test]
    fn create_rejects_bad_parameters() {
        let creator = creator();

        let mut p = params(&creator);
        p.predicted_floor = 0;
        assert!(matches!(
            Escrow::create(&p, 1_000),
            Err(EscrowError::InvalidParameters(_))
        ));

        let mut p = params(&creator);
        p.margin_amount = 0;
        assert!(matches!(
            Escrow::create(&p, 1_000),
            Err(EscrowError::InvalidParameters(_))
        ));

        let mut p = params(&creator);
        p.margin_amount = u64::MAX / 2 + 1;
        assert!(matches!(
            Escrow::create(&p, 1_000),
            Err(EscrowError::InvalidParameters(_))
        ));

        // expiry inside the minimum horizon
        let p = params(&creator);
        assert!(matches!(
            Escrow::create(&p, p.expiry_timestamp - MIN_EXPIRY_HORIZON + 1),
            Err(EscrowError::InvalidParameters(_))
        ));
    }

    #[test]
    fn accept_binds_counterparty() {
        let (mut escrow, _) = Escrow::create(&params(&creator()), 1_000).unwrap();
        let lock = escrow.accept(counterparty(), 2_000).unwrap();

        assert_eq!(escrow.status, EscrowStatus::Accepted);
        assert_eq!(escrow.counterparty, Some(counterparty()));
        assert_eq!(
            lock,
            CustodyIntent::Lock {
                account: counterparty(),
                amount: 50,
                tag: escrow.escrow_id,
            }
        );
    }

    #[test]
    fn accept_rejects_creator_as_counterparty() {
        let (mut escrow, _) = Escrow::create(&params(&creator()), 1_000).unwrap();
        assert_err(escrow.accept(creator(), 2_000), EscrowError::SelfDealing);
        assert_eq!(escrow.status, EscrowStatus::Created);
    }

    #[test]
    fn accept_rejects_expired_escrow() {
        let (mut escrow, _) = Escrow::create(&params(&creator()), 1_000).unwrap();
        let expiry = escrow.expiry_timestamp;
        assert_err(
            escrow.accept(counterparty(), expiry),
            EscrowError::Expired { expiry, now: expiry },
        );
    }

    #[test]
    fn settle_pays_double_margin_to_winner() {
        let (mut escrow, _) = Escrow::create(&params(&creator()), 1_000).unwrap();
        escrow.accept(counterparty(), 2_000).unwrap();

        let expiry = escrow.expiry_timestamp;
        let quote = FloorQuote {
            floor_price: 120,
            observed_at: expiry,
        };
        let disbursement = escrow.settle(&quote, expiry).unwrap();

        assert_eq!(escrow.status, EscrowStatus::Settled);
        assert_eq!(disbursement.recipient, creator());
        assert_eq!(disbursement.amount, 100);
    }

    #[test]
    fn winner_boundary_favors_creator() {
        let (mut escrow, _) = Escrow::create(&params(&creator()), 1_000).unwrap();
        escrow.accept(counterparty(), 2_000).unwrap();

        // observed == predicted: creator wins by the closed interval
        assert!(escrow.creator_wins(110));
        assert!(!escrow.creator_wins(109));

        let expiry = escrow.expiry_timestamp;
        let quote = FloorQuote {
            floor_price: 110,
            observed_at: expiry,
        };
        let disbursement = escrow.settle(&quote, expiry).unwrap();
        assert_eq!(disbursement.recipient, creator());
    }

    #[test]
    fn settle_rejects_stale_quote() {
        let (mut escrow, _) = Escrow::create(&params(&creator()), 1_000).unwrap();
        escrow.accept(counterparty(), 2_000).unwrap();

        let expiry = escrow.expiry_timestamp;
        let quote = FloorQuote {
            floor_price: 120,
            observed_at: expiry - 1,
        };
        assert_err(
            escrow.settle(&quote, expiry),
            EscrowError::StaleOracleData {
                observed_at: expiry - 1,
                expiry,
            },
        );
        assert_eq!(escrow.status, EscrowStatus::Accepted);
    }

    #[test]
    fn cancel_refunds_creator_after_expiry() {
        let creator = creator();
        let (mut escrow, _) = Escrow::create(&params(&creator), 1_000).unwrap();
        let expiry = escrow.expiry_timestamp;

        // too early
        assert_err(
            escrow.cancel(&creator, expiry - 1),
            EscrowError::NotYetEligible {
                expiry,
                now: expiry - 1,
            },
        );

        // wrong caller
        assert!(matches!(
            escrow.cancel(&counterparty(), expiry),
            Err(EscrowError::InvalidParameters(_))
        ));

        let refund = escrow.cancel(&creator, expiry).unwrap();
        assert_eq!(escrow.status, EscrowStatus::Cancelled);
        assert_eq!(
            refund,
            CustodyIntent::Release {
                tag: escrow.escrow_id,
                recipient: creator,
                amount: 50,
            }
        );

        // terminal
        let creator = escrow.creator.clone();
        assert!(matches!(
            escrow.cancel(&creator, expiry),
            Err(EscrowError::InvalidState { .. })
        ));
    }
}
