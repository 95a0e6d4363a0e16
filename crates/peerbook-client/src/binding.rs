//! Contract binding.
//!
//! A fixed address, the fixed registry interface and a signer. Every method
//! is a direct pass-through to one contract function.

use crate::session::{PendingTransaction, Signer};
use crate::transport::WalletTransport;
use alloy_primitives::{Address, Bytes};
use alloy_sol_types::{SolCall, sol};
use peerbook_core::{ClientError, Limits};

sol! {
    /// Per-account fixed-slot store of libp2p peer ids.
    interface IPeerRegistry {
        function MAX_PEERS() external view returns (uint8 maxPeers);
        function ID_LENGTH() external view returns (uint16 idLength);
        function getPeerCount(address owner) external view returns (uint8 count);
        function getAllPeerIds(address owner) external view returns (string[] peerIds);
        function getPeerId(address owner, uint8 slot) external view returns (string peerId);
        function addPeerId(string calldata peerId) external;
        function setPeerId(uint8 slot, string calldata peerId) external;
        function removePeerId(uint8 slot) external;
    }
}

pub struct ContractBinding<T> {
    address: Address,
    signer: Signer<T>,
}

impl<T: WalletTransport> ContractBinding<T> {
    pub fn new(address: Address, signer: Signer<T>) -> Self {
        Self { address, signer }
    }

    /// Contract address.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Account the signer acts for.
    pub fn account(&self) -> Address {
        self.signer.address()
    }

    pub async fn max_peers(&self) -> Result<u8, ClientError> {
        Ok(self.read(IPeerRegistry::MAX_PEERSCall {}).await?.maxPeers)
    }

    pub async fn id_length(&self) -> Result<u16, ClientError> {
        Ok(self.read(IPeerRegistry::ID_LENGTHCall {}).await?.idLength)
    }

    pub async fn limits(&self) -> Result<Limits, ClientError> {
        Ok(Limits {
            max_peers: self.max_peers().await?,
            id_length: self.id_length().await?,
        })
    }

    pub async fn peer_count(&self, owner: Address) -> Result<u8, ClientError> {
        let call = IPeerRegistry::getPeerCountCall { owner };
        Ok(self.read(call).await?.count)
    }

    pub async fn all_peer_ids(&self, owner: Address) -> Result<Vec<String>, ClientError> {
        let call = IPeerRegistry::getAllPeerIdsCall { owner };
        Ok(self.read(call).await?.peerIds)
    }

    pub async fn peer_id_at(&self, owner: Address, slot: u8) -> Result<String, ClientError> {
        let call = IPeerRegistry::getPeerIdCall { owner, slot };
        Ok(self.read(call).await?.peerId)
    }

    pub async fn add_peer_id(&self, peer_id: &str) -> Result<PendingTransaction<T>, ClientError> {
        let call = IPeerRegistry::addPeerIdCall {
            peerId: peer_id.to_string(),
        };
        self.write(call).await
    }

    pub async fn set_peer_id(
        &self,
        slot: u8,
        peer_id: &str,
    ) -> Result<PendingTransaction<T>, ClientError> {
        let call = IPeerRegistry::setPeerIdCall {
            slot,
            peerId: peer_id.to_string(),
        };
        self.write(call).await
    }

    pub async fn remove_peer_id(&self, slot: u8) -> Result<PendingTransaction<T>, ClientError> {
        self.write(IPeerRegistry::removePeerIdCall { slot }).await
    }

    async fn read<C: SolCall + Send>(&self, call: C) -> Result<C::Return, ClientError> {
        let data = Bytes::from(call.abi_encode());
        let output = self.signer.call(self.address, data).await?;
        C::abi_decode_returns(&output, true)
            .map_err(|e| ClientError::decode(format!("{}: {e}", C::SIGNATURE)))
    }

    async fn write<C: SolCall + Send>(
        &self,
        call: C,
    ) -> Result<PendingTransaction<T>, ClientError> {
        tracing::debug!(function = C::SIGNATURE, contract = %self.address, "submitting write");
        let data = Bytes::from(call.abi_encode());
        self.signer.send_transaction(self.address, data).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfirmPolicy;
    use crate::mock::MockWallet;
    use crate::session::Session;
    use peerbook_core::ErrorKind;
    use std::time::Duration;

    const POLICY: ConfirmPolicy = ConfirmPolicy {
        timeout: Duration::from_secs(5),
        poll_interval: Duration::from_millis(5),
    };

    fn bind(wallet: MockWallet) -> ContractBinding<MockWallet> {
        let session = Session::new(wallet);
        let account = Address::repeat_byte(0xaa);
        ContractBinding::new(Address::repeat_byte(0xfe), session.signer(account))
    }

    #[test]
    fn selectors_match_deployed_abi() {
        assert_eq!(IPeerRegistry::addPeerIdCall::SIGNATURE, "addPeerId(string)");
        assert_eq!(
            IPeerRegistry::setPeerIdCall::SIGNATURE,
            "setPeerId(uint8,string)"
        );
        assert_eq!(
            IPeerRegistry::getPeerIdCall::SIGNATURE,
            "getPeerId(address,uint8)"
        );
    }

    #[tokio::test]
    async fn reads_limits_and_peers() {
        let wallet = MockWallet::new();
        wallet.seed(Address::repeat_byte(0xaa), &["QmA", "QmB"]);
        let binding = bind(wallet);

        assert_eq!(binding.limits().await.unwrap(), Limits::default());
        assert_eq!(binding.peer_count(binding.account()).await.unwrap(), 2);
        assert_eq!(
            binding.all_peer_ids(binding.account()).await.unwrap(),
            vec!["QmA".to_string(), "QmB".to_string()]
        );
        assert_eq!(binding.peer_id_at(binding.account(), 1).await.unwrap(), "QmB");
    }

    #[tokio::test]
    async fn write_then_confirm() {
        let binding = bind(MockWallet::new());
        let pending = binding.add_peer_id("12D3KooWx").await.unwrap();
        let receipt = pending.wait(&POLICY).await.unwrap();
        assert_eq!(receipt.transaction_hash, pending.hash());
        assert_eq!(binding.peer_count(binding.account()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn out_of_range_read_reverts() {
        let binding = bind(MockWallet::new());
        let err = binding.peer_id_at(binding.account(), 40).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Reverted);
    }
}
