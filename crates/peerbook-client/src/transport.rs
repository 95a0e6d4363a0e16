//! Wallet transport.
//!
//! Requests use the EIP-1193 vocabulary. [`HttpTransport`] carries them as
//! JSON-RPC 2.0 over HTTP to a wallet endpoint; tests plug in an in-memory
//! wallet through the same trait.

use alloy_primitives::{Address, B256, Bytes};
use peerbook_core::ClientError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

/// Something that answers wallet requests.
pub trait WalletTransport: Send + Sync + 'static {
    fn request(
        &self,
        request: WalletRequest,
    ) -> impl Future<Output = Result<Value, ClientError>> + Send;
}

/// The subset of EIP-1193 methods the client issues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "method", content = "params")]
pub enum WalletRequest {
    #[serde(rename = "eth_requestAccounts")]
    RequestAccounts,

    #[serde(rename = "eth_chainId")]
    ChainId,

    #[serde(rename = "eth_call")]
    Call(CallRequest, BlockTag),

    #[serde(rename = "eth_sendTransaction")]
    SendTransaction([TransactionRequest; 1]),

    #[serde(rename = "eth_getTransactionReceipt")]
    GetTransactionReceipt([B256; 1]),
}

impl WalletRequest {
    pub fn method(&self) -> &'static str {
        match self {
            WalletRequest::RequestAccounts => "eth_requestAccounts",
            WalletRequest::ChainId => "eth_chainId",
            WalletRequest::Call(..) => "eth_call",
            WalletRequest::SendTransaction(_) => "eth_sendTransaction",
            WalletRequest::GetTransactionReceipt(_) => "eth_getTransactionReceipt",
        }
    }

    /// JSON-RPC `params`; `[]` for methods without any.
    pub fn params(&self) -> Result<Value, ClientError> {
        let value = serde_json::to_value(self)
            .map_err(|e| ClientError::decode(format!("encode {}: {e}", self.method())))?;
        Ok(value
            .get("params")
            .cloned()
            .unwrap_or_else(|| Value::Array(Vec::new())))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockTag {
    Latest,
}

/// `eth_call` parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    pub to: Address,
    pub data: Bytes,
}

/// `eth_sendTransaction` parameters. Gas and fees are left to the wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionRequest {
    pub from: Address,
    pub to: Address,
    pub data: Bytes,
}

/// Map a JSON-RPC / EIP-1193 error object to a tagged error.
pub fn rpc_error(code: i64, message: &str) -> ClientError {
    match code {
        4001 => ClientError::rejected(message),
        4100 | 4900 | 4901 => ClientError::unauthorized(message),
        3 => ClientError::reverted(message),
        _ if message.to_ascii_lowercase().contains("revert") => ClientError::reverted(message),
        _ => ClientError::transport(message),
    }
}

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// JSON-RPC 2.0 over HTTP.
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl HttpTransport {
    pub fn new(url: impl Into<String>) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ClientError::transport(e.to_string()))?;
        Ok(Self::with_client(url, client))
    }

    /// Use a preconfigured client (proxy, timeouts, headers).
    pub fn with_client(url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            client,
            url: url.into(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl WalletTransport for HttpTransport {
    async fn request(&self, request: WalletRequest) -> Result<Value, ClientError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let method = request.method();
        let body = RpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params: request.params()?,
        };

        tracing::debug!(method, id, "wallet request");

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| ClientError::transport(e.to_string()))?;

        let response: RpcResponse = response
            .json()
            .await
            .map_err(|e| ClientError::decode(format!("{method}: {e}")))?;

        if let Some(err) = response.error {
            tracing::debug!(method, id, code = err.code, "wallet error: {}", err.message);
            return Err(rpc_error(err.code, &err.message));
        }
        Ok(response.result.unwrap_or(Value::Null))
    }
}
