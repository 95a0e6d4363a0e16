//! State synchronization.

use crate::binding::ContractBinding;
use crate::book::{Outcome, PeerBook};
use crate::transport::WalletTransport;
use peerbook_core::{ClientError, Event, OperationKind, PendingOperation, RemoteState};

impl<T: WalletTransport> PeerBook<T> {
    /// Re-read the peer list of the connected account.
    ///
    /// Does nothing before a successful connect. On failure the previous
    /// mirror stays in place.
    pub async fn refresh(&self) -> Result<Outcome, ClientError> {
        let Some(binding) = self.binding().await else {
            tracing::debug!("refresh ignored, not connected");
            return Ok(Outcome::Skipped);
        };
        if self.snapshot().account.is_none() {
            return Ok(Outcome::Skipped);
        }
        let _guard = self.begin()?;
        self.refresh_bound(&binding).await
    }

    /// Refresh as its own busy operation. Caller holds the in-flight guard.
    pub(crate) async fn refresh_bound(
        &self,
        binding: &ContractBinding<T>,
    ) -> Result<Outcome, ClientError> {
        self.emit(Event::OperationStarted(PendingOperation::start(
            OperationKind::Refresh,
        )));
        let _settle = self.settle_on_drop();

        match self.read_remote(binding).await {
            Ok(remote) => {
                self.emit(Event::Synchronized(remote));
                Ok(Outcome::Completed)
            }
            Err(err) => self.fail(OperationKind::Refresh, err),
        }
    }

    /// Count first, then the list. Nothing is published here, so observers
    /// never see one without the other.
    pub(crate) async fn read_remote(
        &self,
        binding: &ContractBinding<T>,
    ) -> Result<RemoteState, ClientError> {
        let account = binding.account();
        let count = binding.peer_count(account).await?;
        let ids = binding.all_peer_ids(account).await?;
        let remote = RemoteState::from_reads(count, ids)?;
        tracing::debug!(%account, peers = remote.peer_count(), "peer list synchronized");
        Ok(remote)
    }
}
