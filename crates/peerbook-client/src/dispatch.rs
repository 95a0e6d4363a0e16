//! Mutating commands.
//!
//! Each command runs `submit -> confirm -> refresh` while holding the busy
//! flag. Inputs are passed through untouched; the contract decides what is
//! valid and its rejection comes back as the operation's error.

use crate::binding::ContractBinding;
use crate::book::{Outcome, PeerBook};
use crate::session::{PendingTransaction, Receipt};
use crate::transport::WalletTransport;
use peerbook_core::{ClientError, Event, OperationKind, PendingOperation};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Add { peer_id: String },
    Set { slot: u8, peer_id: String },
    Remove { slot: u8 },
}

impl Command {
    fn kind(&self) -> OperationKind {
        match self {
            Command::Add { .. } => OperationKind::Add,
            Command::Set { .. } => OperationKind::Set,
            Command::Remove { .. } => OperationKind::Remove,
        }
    }

    async fn submit<T: WalletTransport>(
        &self,
        binding: &ContractBinding<T>,
    ) -> Result<PendingTransaction<T>, ClientError> {
        match self {
            Command::Add { peer_id } => binding.add_peer_id(peer_id).await,
            Command::Set { slot, peer_id } => binding.set_peer_id(*slot, peer_id).await,
            Command::Remove { slot } => binding.remove_peer_id(*slot).await,
        }
    }
}

impl<T: WalletTransport> PeerBook<T> {
    /// Append a peer id to the connected account's list.
    pub async fn add(&self, peer_id: impl Into<String>) -> Result<Outcome, ClientError> {
        self.dispatch(Command::Add {
            peer_id: peer_id.into(),
        })
        .await
    }

    /// Overwrite the peer id in `slot`.
    pub async fn set(&self, slot: u8, peer_id: impl Into<String>) -> Result<Outcome, ClientError> {
        self.dispatch(Command::Set {
            slot,
            peer_id: peer_id.into(),
        })
        .await
    }

    /// Remove the peer id in `slot`. Whether later slots shift down is up
    /// to the contract.
    pub async fn remove(&self, slot: u8) -> Result<Outcome, ClientError> {
        self.dispatch(Command::Remove { slot }).await
    }

    async fn dispatch(&self, command: Command) -> Result<Outcome, ClientError> {
        let Some(binding) = self.binding().await else {
            tracing::debug!(?command, "command ignored, not connected");
            return Ok(Outcome::Skipped);
        };
        let _guard = self.begin()?;

        let kind = command.kind();
        let cancel = self.arm_cancel();
        self.emit(Event::OperationStarted(PendingOperation::start(kind)));
        let _settle = self.settle_on_drop();
        tracing::info!(?command, account = %binding.account(), "submitting");

        let pending = match command.submit(&binding).await {
            Ok(pending) => pending,
            Err(err) => return self.fail(kind, err),
        };
        let tx_hash = pending.hash();
        self.emit(Event::Submitted { tx_hash });

        let receipt = match self.confirm(&pending, &cancel).await {
            Ok(receipt) => receipt,
            Err(err) => return self.fail(kind, err),
        };
        self.emit(Event::WriteConfirmed { tx_hash });
        tracing::info!(tx = %tx_hash, block = ?receipt.block_number, "transaction confirmed");

        // The write is durable from here on, whatever the refresh does.
        self.emit(Event::Synchronizing);
        match self.read_remote(&binding).await {
            Ok(remote) => {
                self.emit(Event::Synchronized(remote));
                Ok(Outcome::Completed)
            }
            Err(err) => self.fail(kind, err),
        }
    }

    async fn confirm(
        &self,
        pending: &PendingTransaction<T>,
        cancel: &CancellationToken,
    ) -> Result<Receipt, ClientError> {
        tokio::select! {
            result = pending.wait(&self.policy) => result,
            _ = cancel.cancelled() => Err(ClientError::unconfirmed(format!(
                "stopped waiting for transaction {}",
                pending.hash()
            ))),
        }
    }
}
