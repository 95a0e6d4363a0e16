//! Peer identifiers and advisory input checks.
//!
//! The contract stores peer ids as plain strings. Two encodings are common:
//! - `Qm...` - legacy base58 sha2-256 multihash (RSA and other large keys)
//! - `12D3Koo...` - base58 identity multihash of an ed25519 key
//!
//! Nothing here is enforced on submission. The contract is authoritative and
//! rejects what it does not accept; these checks exist so callers can warn
//! early.

use crate::{ID_LENGTH, MAX_SLOT};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a peer id is encoded, judged from its prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeerIdFormat {
    /// `Qm...`, sha2-256 multihash.
    Legacy,
    /// `12D3Koo...`, ed25519 identity multihash.
    Ed25519,
    /// Anything else (CIDv1 text, custom encodings).
    Other,
}

/// A peer id within the contract's length limit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PeerId(String);

impl PeerId {
    /// The id as stored on chain.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Encoding inferred from the prefix.
    pub fn format(&self) -> PeerIdFormat {
        if self.0.starts_with("Qm") {
            PeerIdFormat::Legacy
        } else if self.0.starts_with("12D3Koo") {
            PeerIdFormat::Ed25519
        } else {
            PeerIdFormat::Other
        }
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PeerId {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        check_peer_id(s)?;
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for PeerId {
    type Error = InputError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        check_peer_id(&s)?;
        Ok(Self(s))
    }
}

impl From<PeerId> for String {
    fn from(id: PeerId) -> Self {
        id.0
    }
}

/// Check a peer id against the contract's limits. Length is in bytes.
pub fn check_peer_id(s: &str) -> Result<(), InputError> {
    if s.trim().is_empty() {
        return Err(InputError::EmptyPeerId);
    }
    if s.len() > ID_LENGTH {
        return Err(InputError::PeerIdTooLong {
            len: s.len(),
            max: ID_LENGTH,
        });
    }
    Ok(())
}

/// Check a slot index against `0..=MAX_SLOT`.
pub fn check_slot(slot: u8) -> Result<(), InputError> {
    if slot > MAX_SLOT {
        return Err(InputError::SlotOutOfRange(slot));
    }
    Ok(())
}

/// Input the contract is expected to reject.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("peer id cannot be empty")]
    EmptyPeerId,
    #[error("peer id is {len} bytes, limit is {max}")]
    PeerIdTooLong { len: usize, max: usize },
    #[error("slot {0} is out of range (0-{max})", max = MAX_SLOT)]
    SlotOutOfRange(u8),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_ed25519() {
        let id: PeerId = "12D3KooWLudabD69eAYzfoZMVRqJb8XHBLDKsQvRn6Q9hTQqvMuY"
            .parse()
            .unwrap();
        assert_eq!(id.format(), PeerIdFormat::Ed25519);
    }

    #[test]
    fn parse_legacy() {
        let id: PeerId = "QmNnooDu7bfjPFoTZYxMNLWUQJyrVwtbZg5gBMjTezGAJN"
            .parse()
            .unwrap();
        assert_eq!(id.format(), PeerIdFormat::Legacy);
        assert_eq!(id.to_string(), id.as_str());
    }

    #[test]
    fn rejects_empty_and_long() {
        assert_eq!("".parse::<PeerId>(), Err(InputError::EmptyPeerId));
        assert_eq!("   ".parse::<PeerId>(), Err(InputError::EmptyPeerId));

        let long = "a".repeat(ID_LENGTH + 1);
        assert_eq!(
            long.parse::<PeerId>(),
            Err(InputError::PeerIdTooLong {
                len: ID_LENGTH + 1,
                max: ID_LENGTH
            })
        );
        assert!("a".repeat(ID_LENGTH).parse::<PeerId>().is_ok());
    }

    #[test]
    fn serde_goes_through_validation() {
        let id: PeerId = serde_json::from_str("\"12D3KooWabc\"").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"12D3KooWabc\"");
        assert!(serde_json::from_str::<PeerId>("\"\"").is_err());
    }

    #[test]
    fn slot_bounds() {
        assert!(check_slot(0).is_ok());
        assert!(check_slot(31).is_ok());
        assert_eq!(check_slot(32), Err(InputError::SlotOutOfRange(32)));
        assert_eq!(
            InputError::SlotOutOfRange(40).to_string(),
            "slot 40 is out of range (0-31)"
        );
    }
}
