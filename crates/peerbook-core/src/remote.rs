//! Local mirror of the contract's per-account peer list.

use crate::{ClientError, ID_LENGTH, MAX_PEERS};
use serde::{Deserialize, Serialize};

/// Peer list of one account as last read from the contract.
///
/// Built only from a count and a list that agree, so `peer_count` always
/// equals `peer_ids.len()`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRemoteState")]
pub struct RemoteState {
    peer_count: u8,
    peer_ids: Vec<String>,
}

#[derive(Deserialize)]
struct RawRemoteState {
    peer_count: u8,
    peer_ids: Vec<String>,
}

impl TryFrom<RawRemoteState> for RemoteState {
    type Error = ClientError;

    fn try_from(raw: RawRemoteState) -> Result<Self, Self::Error> {
        Self::from_reads(raw.peer_count, raw.peer_ids)
    }
}

impl RemoteState {
    /// Combine the `getPeerCount` and `getAllPeerIds` reads.
    pub fn from_reads(peer_count: u8, peer_ids: Vec<String>) -> Result<Self, ClientError> {
        if usize::from(peer_count) != peer_ids.len() {
            return Err(ClientError::decode(format!(
                "peer count {} does not match list of {} ids",
                peer_count,
                peer_ids.len()
            )));
        }
        Ok(Self {
            peer_count,
            peer_ids,
        })
    }

    pub fn peer_count(&self) -> u8 {
        self.peer_count
    }

    pub fn peer_ids(&self) -> &[String] {
        &self.peer_ids
    }

    pub fn get(&self, slot: u8) -> Option<&str> {
        self.peer_ids.get(usize::from(slot)).map(String::as_str)
    }

    /// Slot holding `peer_id`, if any.
    pub fn position(&self, peer_id: &str) -> Option<u8> {
        self.peer_ids
            .iter()
            .position(|id| id == peer_id)
            .and_then(|i| u8::try_from(i).ok())
    }

    pub fn is_empty(&self) -> bool {
        self.peer_count == 0
    }

    pub fn is_full(&self, limits: &Limits) -> bool {
        self.peer_count >= limits.max_peers
    }

    pub fn free_slots(&self, limits: &Limits) -> u8 {
        limits.max_peers.saturating_sub(self.peer_count)
    }
}

/// Limits published by the contract (`MAX_PEERS`, `ID_LENGTH`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    pub max_peers: u8,
    pub id_length: u16,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_peers: MAX_PEERS,
            id_length: ID_LENGTH as u16,
        }
    }
}
