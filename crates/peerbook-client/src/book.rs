//! The client handle.
//!
//! `PeerBook` owns the session, the current contract binding and the
//! published [`Snapshot`]. Connect lives here; refresh is in `sync`, the
//! mutating commands in `dispatch`.

use crate::auth::authorize;
use crate::binding::ContractBinding;
use crate::config::{ClientConfig, ConfirmPolicy};
use crate::session::{self, Session};
use crate::transport::{HttpTransport, WalletTransport};
use alloy_primitives::Address;
use peerbook_core::{ClientError, Event, OperationKind, Snapshot};
use std::sync::{Arc, PoisonError};
use tokio::sync::{Mutex, MutexGuard, RwLock, watch};
use tokio_util::sync::CancellationToken;

/// Result of an operation whose precondition may not hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Precondition not met (no session, not connected); nothing happened.
    Skipped,
    Completed,
}

pub struct PeerBook<T> {
    session: Option<Session<T>>,
    contract: Address,
    chain_id: Option<u64>,
    pub(crate) policy: ConfirmPolicy,
    binding: RwLock<Option<Arc<ContractBinding<T>>>>,
    state: watch::Sender<Snapshot>,
    in_flight: Mutex<()>,
    cancel: std::sync::Mutex<CancellationToken>,
}

impl PeerBook<HttpTransport> {
    /// Probe for a wallet and build a client around whatever was found.
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(session::probe(&config.wallet), config)
    }
}

impl<T: WalletTransport> PeerBook<T> {
    pub fn new(session: Option<Session<T>>, config: &ClientConfig) -> Self {
        let initial = Snapshot::default().apply(Event::SessionProbed {
            available: session.is_some(),
        });
        let (state, _) = watch::channel(initial);
        Self {
            session,
            contract: config.contract.address,
            chain_id: config.contract.chain_id,
            policy: config.confirmation.policy(),
            binding: RwLock::new(None),
            state,
            in_flight: Mutex::new(()),
            cancel: std::sync::Mutex::new(CancellationToken::new()),
        }
    }

    /// Current state.
    pub fn snapshot(&self) -> Snapshot {
        self.state.borrow().clone()
    }

    /// Receive every state change.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.state.subscribe()
    }

    /// Stop waiting for the confirmation of the write in progress. The
    /// transaction itself cannot be withdrawn. Sticks until the next write
    /// starts, so a cancel issued before the wait begins is not lost.
    pub fn cancel_confirmation(&self) {
        self.cancel
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .cancel();
    }

    /// Authorize an account and bind the contract to it.
    ///
    /// Without a session this does nothing. On success limits are loaded
    /// and the peer list is refreshed; a failed refresh is recorded in the
    /// snapshot but does not fail the connect.
    pub async fn connect(&self) -> Result<Outcome, ClientError> {
        let Some(session) = &self.session else {
            tracing::debug!("connect ignored, no wallet session");
            return Ok(Outcome::Skipped);
        };
        let _guard = self.begin()?;

        self.emit(Event::ConnectStarted);
        let settle = self.settle_on_drop();

        let auth = match authorize(session, self.chain_id).await {
            Ok(auth) => auth,
            Err(err) => {
                tracing::warn!(kind = %err.kind, "connect failed: {}", err);
                self.emit(Event::ConnectFailed(err.clone()));
                return Err(err);
            }
        };

        let binding = Arc::new(ContractBinding::new(self.contract, auth.signer));
        *self.binding.write().await = Some(binding.clone());
        self.emit(Event::Connected {
            account: auth.account,
            contract: self.contract,
        });
        drop(settle);
        tracing::info!(account = %auth.account, contract = %self.contract, "wallet connected");

        if let Err(err) = self.read_limits(&binding).await {
            tracing::warn!(kind = %err.kind, "keeping default limits: {}", err);
        }
        let _ = self.refresh_bound(&binding).await;
        Ok(Outcome::Completed)
    }

    /// Re-read `MAX_PEERS` and `ID_LENGTH`. Failures are returned but not
    /// recorded; the limits are advisory.
    pub async fn load_limits(&self) -> Result<Outcome, ClientError> {
        let Some(binding) = self.binding().await else {
            return Ok(Outcome::Skipped);
        };
        self.read_limits(&binding).await?;
        Ok(Outcome::Completed)
    }

    async fn read_limits(&self, binding: &ContractBinding<T>) -> Result<(), ClientError> {
        let limits = binding.limits().await?;
        tracing::debug!(max_peers = limits.max_peers, id_length = limits.id_length, "limits loaded");
        self.emit(Event::LimitsLoaded(limits));
        Ok(())
    }

    pub(crate) async fn binding(&self) -> Option<Arc<ContractBinding<T>>> {
        self.binding.read().await.clone()
    }

    /// Claim the single in-flight slot. Released when the guard drops.
    pub(crate) fn begin(&self) -> Result<MutexGuard<'_, ()>, ClientError> {
        self.in_flight.try_lock().map_err(|_| {
            tracing::debug!("operation rejected, another is in flight");
            ClientError::busy()
        })
    }

    /// Fresh cancel token for a write about to start.
    pub(crate) fn arm_cancel(&self) -> CancellationToken {
        let token = CancellationToken::new();
        *self.cancel.lock().unwrap_or_else(PoisonError::into_inner) = token.clone();
        token
    }

    pub(crate) fn emit(&self, event: Event) {
        self.state.send_modify(|snapshot| *snapshot = snapshot.apply(event));
    }

    pub(crate) fn settle_on_drop(&self) -> Settle<'_> {
        Settle(&self.state)
    }

    /// Record a caught failure and hand it back.
    pub(crate) fn fail(
        &self,
        operation: OperationKind,
        err: ClientError,
    ) -> Result<Outcome, ClientError> {
        tracing::warn!(?operation, kind = %err.kind, "{}", err);
        self.emit(Event::Failed(err.clone()));
        Err(err)
    }
}

/// Clears the busy flag when dropped, whichever way the operation ends.
pub(crate) struct Settle<'a>(&'a watch::Sender<Snapshot>);

impl Drop for Settle<'_> {
    fn drop(&mut self) {
        self.0
            .send_modify(|snapshot| *snapshot = snapshot.apply(Event::Settled));
    }
}
