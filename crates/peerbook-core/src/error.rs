//! Tagged errors for wallet and contract calls.
//!
//! Every failure keeps its kind up to the caller. Rendering to a single line
//! of text happens in `Display` only.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What went wrong, coarse enough to decide retry vs. fix-your-input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Wallet endpoint unreachable or answered garbage at the HTTP layer.
    Transport,
    /// The user declined the request in the wallet (EIP-1193 4001).
    Rejected,
    /// Account access refused, no accounts, or wrong chain.
    Unauthorized,
    /// The contract rejected the call (validation or execution revert).
    Reverted,
    /// The remote answered something we could not decode.
    Decode,
    /// The transaction was mined but failed.
    Confirmation,
    /// Submitted, but confirmation was not observed (timeout or cancel).
    Unconfirmed,
    /// Another operation is already in flight.
    Busy,
}

/// The three failure families of the wallet/contract lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Could not talk to, or get permission from, the wallet.
    Access,
    /// The remote contract refused or returned something unusable.
    RemoteCall,
    /// A submitted write did not reach confirmed success.
    Confirmation,
}

impl ErrorKind {
    pub fn category(self) -> ErrorCategory {
        match self {
            ErrorKind::Transport | ErrorKind::Rejected | ErrorKind::Unauthorized => {
                ErrorCategory::Access
            }
            ErrorKind::Reverted | ErrorKind::Decode | ErrorKind::Busy => ErrorCategory::RemoteCall,
            ErrorKind::Confirmation | ErrorKind::Unconfirmed => ErrorCategory::Confirmation,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Transport => "transport",
            ErrorKind::Rejected => "rejected",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::Reverted => "reverted",
            ErrorKind::Decode => "decode",
            ErrorKind::Confirmation => "confirmation",
            ErrorKind::Unconfirmed => "unconfirmed",
            ErrorKind::Busy => "busy",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed wallet or contract operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{detail}")]
pub struct ClientError {
    pub kind: ErrorKind,
    pub detail: String,
}

impl ClientError {
    pub fn new(kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    pub fn transport(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::Transport, detail)
    }

    pub fn rejected(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::Rejected, detail)
    }

    pub fn unauthorized(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, detail)
    }

    pub fn reverted(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::Reverted, detail)
    }

    pub fn decode(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::Decode, detail)
    }

    pub fn confirmation(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::Confirmation, detail)
    }

    pub fn unconfirmed(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unconfirmed, detail)
    }

    pub fn busy() -> Self {
        Self::new(ErrorKind::Busy, "another operation is in progress")
    }

    /// Worth trying again unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::Transport | ErrorKind::Unconfirmed | ErrorKind::Busy
        )
    }

    /// The input has to change before a retry can succeed.
    pub fn is_user_input(&self) -> bool {
        self.kind == ErrorKind::Reverted
    }
}
