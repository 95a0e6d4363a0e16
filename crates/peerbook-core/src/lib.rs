//! Core types for the on-chain peer book.
//!
//! This crate knows nothing about wallets or RPC. It defines what the client
//! mirrors (the per-account peer list), how failures are classified, and the
//! state machine a presentation layer observes.

mod error;
mod peer;
mod remote;
mod state;

pub use error::{ClientError, ErrorCategory, ErrorKind};
pub use peer::{InputError, PeerId, PeerIdFormat, check_peer_id, check_slot};
pub use remote::{Limits, RemoteState};
pub use state::{Activity, Event, OperationKind, PendingOperation, SessionStatus, Snapshot};

pub use alloy_primitives::{Address, B256};

/// Maximum number of peer ids per account.
pub const MAX_PEERS: u8 = 32;

/// Highest addressable slot.
pub const MAX_SLOT: u8 = MAX_PEERS - 1;

/// Maximum peer id length in bytes.
pub const ID_LENGTH: usize = 52;
