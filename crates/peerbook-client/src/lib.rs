//! Wallet-backed client for the on-chain peer book.
//!
//! The flow mirrors what a user does:
//! 1. [`session::probe`] looks for a wallet endpoint once at startup.
//! 2. [`PeerBook::connect`] asks the wallet for an account and binds the
//!    registry contract to it.
//! 3. [`PeerBook::refresh`] reads the account's peer list into the
//!    published [`Snapshot`](peerbook_core::Snapshot).
//! 4. [`PeerBook::add`], [`PeerBook::set`] and [`PeerBook::remove`] submit a
//!    transaction, wait for it to be mined, then refresh.
//!
//! Only one operation runs at a time; a second one is turned away with a
//! `Busy` error instead of racing the first.

mod auth;
mod binding;
mod book;
pub mod config;
mod dispatch;
pub mod session;
mod sync;
pub mod transport;

#[cfg(test)]
mod mock;

pub use auth::{Authorization, authorize};
pub use binding::{ContractBinding, IPeerRegistry};
pub use book::{Outcome, PeerBook};
pub use config::{ClientConfig, ConfigError, ConfirmPolicy};
pub use session::{PendingTransaction, Receipt, Session, Signer};
pub use transport::{HttpTransport, WalletRequest, WalletTransport};
