//! Wallet session and signing handles.

use crate::config::{ConfirmPolicy, WalletConfig};
use crate::transport::{
    BlockTag, CallRequest, HttpTransport, TransactionRequest, WalletRequest, WalletTransport,
};
use alloy_primitives::{Address, B256, Bytes, U64};
use peerbook_core::ClientError;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

/// Look for a wallet capability. Runs once at startup; absence is not an
/// error.
pub fn probe(config: &WalletConfig) -> Option<Session<HttpTransport>> {
    let Some(url) = config.url.as_deref() else {
        tracing::info!("no wallet endpoint configured, session unavailable");
        return None;
    };
    match HttpTransport::new(url) {
        Ok(transport) => {
            tracing::info!(url, "wallet session available");
            Some(Session::new(transport))
        }
        Err(e) => {
            tracing::warn!(url, "wallet transport could not be built: {}", e);
            None
        }
    }
}

/// Connection to a wallet. Cheap to clone.
pub struct Session<T> {
    transport: Arc<T>,
}

impl<T> Clone for Session<T> {
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
        }
    }
}

impl<T: WalletTransport> Session<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Ask the wallet for account access. May prompt the user.
    pub async fn request_accounts(&self) -> Result<Vec<Address>, ClientError> {
        request(&*self.transport, WalletRequest::RequestAccounts).await
    }

    pub async fn chain_id(&self) -> Result<u64, ClientError> {
        let id: U64 = request(&*self.transport, WalletRequest::ChainId).await?;
        Ok(id.to::<u64>())
    }

    /// Signing handle for `account`.
    pub fn signer(&self, account: Address) -> Signer<T> {
        Signer {
            transport: self.transport.clone(),
            address: account,
        }
    }
}

/// Issues calls and transactions as one account.
pub struct Signer<T> {
    transport: Arc<T>,
    address: Address,
}

impl<T> Clone for Signer<T> {
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
            address: self.address,
        }
    }
}

impl<T: WalletTransport> Signer<T> {
    pub fn address(&self) -> Address {
        self.address
    }

    /// `eth_call` against the latest block.
    pub async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ClientError> {
        let call = CallRequest {
            from: Some(self.address),
            to,
            data,
        };
        request(&*self.transport, WalletRequest::Call(call, BlockTag::Latest)).await
    }

    /// Hand a transaction to the wallet. Returns once the wallet has
    /// broadcast it, not once it is mined.
    pub async fn send_transaction(
        &self,
        to: Address,
        data: Bytes,
    ) -> Result<PendingTransaction<T>, ClientError> {
        let tx = TransactionRequest {
            from: self.address,
            to,
            data,
        };
        let hash: B256 = request(&*self.transport, WalletRequest::SendTransaction([tx])).await?;
        tracing::debug!(tx = %hash, from = %self.address, "transaction submitted");
        Ok(PendingTransaction {
            transport: self.transport.clone(),
            hash,
        })
    }
}

/// A submitted transaction whose outcome is not known yet.
pub struct PendingTransaction<T> {
    transport: Arc<T>,
    hash: B256,
}

impl<T: WalletTransport> PendingTransaction<T> {
    pub fn hash(&self) -> B256 {
        self.hash
    }

    /// Wait for the receipt, bounded by `policy.timeout`.
    pub async fn wait(&self, policy: &ConfirmPolicy) -> Result<Receipt, ClientError> {
        match tokio::time::timeout(policy.timeout, self.poll(policy)).await {
            Ok(result) => result,
            Err(_) => Err(ClientError::unconfirmed(format!(
                "transaction {} not confirmed after {:?}",
                self.hash, policy.timeout
            ))),
        }
    }

    async fn poll(&self, policy: &ConfirmPolicy) -> Result<Receipt, ClientError> {
        loop {
            let receipt: Option<Receipt> = request(
                &*self.transport,
                WalletRequest::GetTransactionReceipt([self.hash]),
            )
            .await?;

            if let Some(receipt) = receipt {
                if !receipt.succeeded() {
                    return Err(ClientError::confirmation(format!(
                        "transaction {} failed on chain",
                        self.hash
                    )));
                }
                return Ok(receipt);
            }
            tokio::time::sleep(policy.poll_interval).await;
        }
    }
}

/// The receipt fields the client looks at.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub transaction_hash: B256,
    #[serde(default)]
    pub block_number: Option<U64>,
    /// Absent before Byzantium.
    #[serde(default)]
    pub status: Option<U64>,
}

impl Receipt {
    pub fn succeeded(&self) -> bool {
        self.status != Some(U64::ZERO)
    }
}

async fn request<T, R>(transport: &T, req: WalletRequest) -> Result<R, ClientError>
where
    T: WalletTransport,
    R: DeserializeOwned,
{
    let method = req.method();
    let value: Value = transport.request(req).await?;
    serde_json::from_value(value).map_err(|e| ClientError::decode(format!("{method}: {e}")))
}
