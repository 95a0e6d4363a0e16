//! Observable client state.
//!
//! One immutable [`Snapshot`] replaces independent flags. The engine never
//! edits it field by field; it feeds [`Event`]s through [`Snapshot::apply`]
//! and publishes the result.

use crate::{ClientError, Limits, RemoteState};
use alloy_primitives::{Address, B256};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Whether a wallet capability was found at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Not probed yet.
    #[default]
    Unknown,
    Available,
    Unavailable,
}

/// User intents that reach the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Add,
    Set,
    Remove,
    Refresh,
}

impl OperationKind {
    /// Whether the operation submits a transaction.
    pub fn is_write(self) -> bool {
        !matches!(self, OperationKind::Refresh)
    }
}

/// The operation currently holding the busy flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingOperation {
    pub kind: OperationKind,
    /// Unix seconds.
    pub submitted_at: u64,
}

impl PendingOperation {
    pub fn start(kind: OperationKind) -> Self {
        Self {
            kind,
            submitted_at: now(),
        }
    }
}

/// What the client is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Activity {
    #[default]
    Idle,
    /// Waiting for the wallet to authorize an account.
    Connecting,
    /// Reading the peer list.
    Synchronizing,
    /// Waiting for the wallet to accept a transaction.
    Submitting { kind: OperationKind },
    /// Transaction accepted, waiting for it to be mined.
    Confirming { kind: OperationKind, tx_hash: B256 },
}

/// Everything a presentation layer needs, in one consistent value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub session: SessionStatus,
    /// Active account, set by a successful connect.
    pub account: Option<Address>,
    /// Contract the binding points at.
    pub contract: Option<Address>,
    /// `None` until the first successful refresh for `account`.
    pub remote: Option<RemoteState>,
    pub limits: Limits,
    pub activity: Activity,
    pub pending: Option<PendingOperation>,
    pub last_error: Option<ClientError>,
    /// Most recent write known to be durable, even if the refresh after it
    /// failed.
    pub last_confirmed: Option<B256>,
}

/// State transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    SessionProbed { available: bool },
    ConnectStarted,
    Connected { account: Address, contract: Address },
    ConnectFailed(ClientError),
    OperationStarted(PendingOperation),
    Submitted { tx_hash: B256 },
    WriteConfirmed { tx_hash: B256 },
    Synchronizing,
    Synchronized(RemoteState),
    LimitsLoaded(Limits),
    Failed(ClientError),
    Settled,
}

impl Snapshot {
    pub fn busy(&self) -> bool {
        self.pending.is_some()
    }

    pub fn is_connected(&self) -> bool {
        self.account.is_some()
    }

    /// Peer count as shown to the user; zero before the first refresh.
    pub fn peer_count(&self) -> u8 {
        self.remote.as_ref().map_or(0, RemoteState::peer_count)
    }

    pub fn peer_ids(&self) -> &[String] {
        match &self.remote {
            Some(remote) => remote.peer_ids(),
            None => &[],
        }
    }

    /// Apply one event, returning the next snapshot.
    pub fn apply(&self, event: Event) -> Snapshot {
        let mut next = self.clone();
        match event {
            Event::SessionProbed { available } => {
                next.session = if available {
                    SessionStatus::Available
                } else {
                    SessionStatus::Unavailable
                };
            }
            Event::ConnectStarted => {
                next.last_error = None;
                next.activity = Activity::Connecting;
            }
            Event::Connected { account, contract } => {
                // A mirror belongs to one account.
                if self.account != Some(account) {
                    next.remote = None;
                    next.last_confirmed = None;
                }
                next.account = Some(account);
                next.contract = Some(contract);
                next.activity = Activity::Idle;
            }
            Event::ConnectFailed(err) => {
                next.activity = Activity::Idle;
                next.last_error = Some(err);
            }
            Event::OperationStarted(op) => {
                next.last_error = None;
                next.pending = Some(op);
                next.activity = if op.kind.is_write() {
                    Activity::Submitting { kind: op.kind }
                } else {
                    Activity::Synchronizing
                };
            }
            Event::Submitted { tx_hash } => {
                if let Some(op) = self.pending {
                    next.activity = Activity::Confirming {
                        kind: op.kind,
                        tx_hash,
                    };
                }
            }
            Event::WriteConfirmed { tx_hash } => {
                next.last_confirmed = Some(tx_hash);
            }
            Event::Synchronizing => {
                next.activity = Activity::Synchronizing;
            }
            Event::Synchronized(remote) => {
                next.remote = Some(remote);
            }
            Event::LimitsLoaded(limits) => {
                next.limits = limits;
            }
            Event::Failed(err) => {
                next.last_error = Some(err);
            }
            Event::Settled => {
                next.pending = None;
                next.activity = Activity::Idle;
            }
        }
        next
    }
}

fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
