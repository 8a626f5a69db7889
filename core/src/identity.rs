//! Party identities and deterministic escrow addressing.

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};
use serde_with::hex::Hex;
use serde_with::serde_as;
use sha2::{Digest, Sha256};

use crate::error::IdentityError;

/// Domain separator for escrow identifier derivation.
const ESCROW_ID_DOMAIN: &[u8] = b"escrowfloor:escrow:v1";

/// A participant in an escrow, identified by an opaque account ID.
///
/// Accepts hex (optionally `0x`-prefixed) or base58 strings; the canonical
/// form is kept as given and used for display and escrow addressing.
#[derive(Serialize, Deserialize, Encode, Decode, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Party(String);

impl Party {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Party {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Party {
    type Err = IdentityError;

    /// Parses a party ID, validating that it decodes as hex or base58.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(IdentityError::EmptyIdentity);
        }
        if let Some(rest) = s.strip_prefix("0x") {
            hex::decode(rest)?;
            return Ok(Self(s.to_string()));
        }
        if s.len() % 2 == 0 && s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Ok(Self(s.to_string()));
        }
        bs58::decode(s).into_vec()?;
        Ok(Self(s.to_string()))
    }
}

/// Stable 32-byte escrow identifier.
///
/// Derived as `SHA-256(domain || creator || seed)` so a record can be
/// located from the creator's identity and a caller-chosen seed without a
/// separate index.
#[serde_as]
#[derive(
    Serialize, Deserialize, Encode, Decode, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
pub struct EscrowId(#[serde_as(as = "Hex")] [u8; 32]);

impl EscrowId {
    pub fn derive(creator: &Party, seed: u64) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(ESCROW_ID_DOMAIN);
        hasher.update(creator.as_str().as_bytes());
        hasher.update(seed.to_le_bytes());
        Self(hasher.finalize().into())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Display for EscrowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl std::str::FromStr for EscrowId {
    type Err = IdentityError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        let s = s.strip_prefix("0x").unwrap_or(s);
        if s.is_empty() {
            return Err(IdentityError::EmptyIdentity);
        }
        let bytes = hex::decode(s)?;
        let id: [u8; 32] = bytes
            .try_into()
            .map_err(|_| IdentityError::UnsupportedFormat)?;
        Ok(Self(id))
    }
}

#[cfg(test)]
mod tests {
    use core::str::FromStr as _;

    use super::*;

    #[test]
    fn parse_party_formats() {
        assert!(Party::from_str("0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045").is_ok());
        assert!(Party::from_str("deadbeef").is_ok());
        assert!(Party::from_str("9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin").is_ok());
        assert_eq!(Party::from_str("  "), Err(IdentityError::EmptyIdentity));
        // '0' and 'l' are outside the base58 alphabet
        assert!(Party::from_str("0OIl").is_err());
    }

    #[test]
    fn id_derivation_is_deterministic() {
        let creator = Party::from_str("9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin").unwrap();
        let other = Party::from_str("GvDMxPzN1sCj7L26YDK2HnMRXEQmQ2aemov8YBtPS7vR").unwrap();

        assert_eq!(EscrowId::derive(&creator, 7), EscrowId::derive(&creator, 7));
        assert_ne!(EscrowId::derive(&creator, 7), EscrowId::derive(&creator, 8));
        assert_ne!(EscrowId::derive(&creator, 7), EscrowId::derive(&other, 7));
    }

    #[test]
    fn id_display_roundtrip() {
        let creator = Party::from_str("deadbeef").unwrap();
        let id = EscrowId::derive(&creator, 0);
        assert_eq!(EscrowId::from_str(&id.to_string()).unwrap(), id);
    }
}
