//! In-memory wallet for tests.
//!
//! Executes the registry interface against per-account storage. Removal
//! compacts the list. Writes are applied when submitted and their receipts
//! are available immediately unless withheld.

use crate::binding::IPeerRegistry::{self, IPeerRegistryCalls};
use crate::transport::{WalletRequest, WalletTransport, rpc_error};
use alloy_primitives::{Address, B256, Bytes, keccak256};
use alloy_sol_types::{SolCall, SolInterface};
use peerbook_core::{ClientError, ID_LENGTH, MAX_PEERS};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

#[derive(Clone)]
pub struct MockWallet {
    chain: Arc<Mutex<Chain>>,
    /// `eth_requestAccounts` waits while this is false.
    accounts_open: Arc<watch::Sender<bool>>,
}

impl Default for MockWallet {
    fn default() -> Self {
        Self {
            chain: Arc::default(),
            accounts_open: Arc::new(watch::channel(true).0),
        }
    }
}

struct Chain {
    accounts: Vec<Address>,
    decline_accounts: bool,
    decline_sends: bool,
    chain_id: u64,
    peers: HashMap<Address, Vec<String>>,
    receipts: HashMap<B256, bool>,
    nonce: u64,
    withhold_receipts: bool,
    fail_on_chain: bool,
    break_reads_after_send: bool,
    reads_broken: bool,
    log: Vec<&'static str>,
}

impl Default for Chain {
    fn default() -> Self {
        Self {
            accounts: vec![Address::repeat_byte(0xaa)],
            decline_accounts: false,
            decline_sends: false,
            chain_id: 11_155_111,
            peers: HashMap::new(),
            receipts: HashMap::new(),
            nonce: 0,
            withhold_receipts: false,
            fail_on_chain: false,
            break_reads_after_send: false,
            reads_broken: false,
            log: Vec::new(),
        }
    }
}

fn revert(reason: &str) -> ClientError {
    rpc_error(3, &format!("execution reverted: {reason}"))
}

fn output(encoded: Vec<u8>) -> Result<Value, ClientError> {
    Ok(json!(Bytes::from(encoded)))
}

impl MockWallet {
    pub fn new() -> Self {
        Self::default()
    }

    fn with<R>(&self, f: impl FnOnce(&mut Chain) -> R) -> R {
        let mut chain = self.chain.lock().unwrap();
        f(&mut chain)
    }

    pub fn set_accounts(&self, accounts: Vec<Address>) {
        self.with(|c| c.accounts = accounts);
    }

    pub fn set_chain_id(&self, chain_id: u64) {
        self.with(|c| c.chain_id = chain_id);
    }

    /// Leave account requests pending, as a wallet does while its prompt
    /// is open.
    pub fn hold_accounts(&self, hold: bool) {
        self.accounts_open.send_replace(!hold);
    }

    pub fn decline_accounts(&self) {
        self.with(|c| c.decline_accounts = true);
    }

    pub fn decline_sends(&self, decline: bool) {
        self.with(|c| c.decline_sends = decline);
    }

    pub fn withhold_receipts(&self, withhold: bool) {
        self.with(|c| c.withhold_receipts = withhold);
    }

    /// Mine submitted transactions with status 0 and without effect.
    pub fn fail_on_chain(&self) {
        self.with(|c| c.fail_on_chain = true);
    }

    /// After the next submitted transaction every `eth_call` fails.
    pub fn break_reads_after_send(&self) {
        self.with(|c| c.break_reads_after_send = true);
    }

    pub fn seed(&self, owner: Address, ids: &[&str]) {
        self.with(|c| {
            c.peers
                .insert(owner, ids.iter().map(|s| s.to_string()).collect());
        });
    }

    pub fn peers(&self, owner: Address) -> Vec<String> {
        self.with(|c| c.peers.get(&owner).cloned().unwrap_or_default())
    }

    /// Methods seen so far, in order.
    pub fn log(&self) -> Vec<&'static str> {
        self.with(|c| c.log.clone())
    }

    fn handle(&self, request: WalletRequest) -> Result<Value, ClientError> {
        self.with(|c| {
            c.log.push(request.method());
            match request {
                WalletRequest::RequestAccounts => {
                    if c.decline_accounts {
                        return Err(rpc_error(4001, "User rejected the request."));
                    }
                    Ok(json!(c.accounts))
                }
                WalletRequest::ChainId => Ok(json!(format!("0x{:x}", c.chain_id))),
                WalletRequest::Call(call, _) => {
                    if c.reads_broken {
                        return Err(rpc_error(-32000, "upstream node unavailable"));
                    }
                    c.call(&call.data)
                }
                WalletRequest::SendTransaction([tx]) => {
                    if c.decline_sends {
                        return Err(rpc_error(
                            4001,
                            "MetaMask Tx Signature: User denied transaction signature.",
                        ));
                    }
                    c.send(tx.from, &tx.data)
                }
                WalletRequest::GetTransactionReceipt([hash]) => {
                    if c.withhold_receipts {
                        return Ok(Value::Null);
                    }
                    Ok(match c.receipts.get(&hash) {
                        Some(ok) => json!({
                            "transactionHash": hash,
                            "blockNumber": "0x1",
                            "status": if *ok { "0x1" } else { "0x0" },
                        }),
                        None => Value::Null,
                    })
                }
            }
        })
    }
}

impl Chain {
    fn call(&self, data: &[u8]) -> Result<Value, ClientError> {
        let call = IPeerRegistryCalls::abi_decode(data, true)
            .map_err(|e| rpc_error(-32602, &e.to_string()))?;
        match call {
            IPeerRegistryCalls::MAX_PEERS(_) => output(
                IPeerRegistry::MAX_PEERSCall::abi_encode_returns(&(MAX_PEERS,)),
            ),
            IPeerRegistryCalls::ID_LENGTH(_) => output(
                IPeerRegistry::ID_LENGTHCall::abi_encode_returns(&(ID_LENGTH as u16,)),
            ),
            IPeerRegistryCalls::getPeerCount(c) => {
                let count = self.peers.get(&c.owner).map_or(0, Vec::len) as u8;
                output(
                    IPeerRegistry::getPeerCountCall::abi_encode_returns(&(count,)),
                )
            }
            IPeerRegistryCalls::getAllPeerIds(c) => {
                let ids = self.peers.get(&c.owner).cloned().unwrap_or_default();
                output(
                    IPeerRegistry::getAllPeerIdsCall::abi_encode_returns(&(ids,)),
                )
            }
            IPeerRegistryCalls::getPeerId(c) => {
                let id = self
                    .peers
                    .get(&c.owner)
                    .and_then(|ids| ids.get(usize::from(c.slot)))
                    .cloned()
                    .ok_or_else(|| revert("slot out of range"))?;
                output(
                    IPeerRegistry::getPeerIdCall::abi_encode_returns(&(id,)),
                )
            }
            _ => Err(revert("not a view function")),
        }
    }

    fn send(&mut self, from: Address, data: &[u8]) -> Result<Value, ClientError> {
        let call = IPeerRegistryCalls::abi_decode(data, true)
            .map_err(|e| rpc_error(-32602, &e.to_string()))?;
        let apply = !self.fail_on_chain;
        let ids = self.peers.entry(from).or_default();

        // Validation happens at submission, like a wallet's gas estimate.
        match call {
            IPeerRegistryCalls::addPeerId(c) => {
                if c.peerId.is_empty() || c.peerId.len() > ID_LENGTH {
                    return Err(revert("invalid peer id length"));
                }
                if ids.len() >= usize::from(MAX_PEERS) {
                    return Err(revert("max peers reached"));
                }
                if apply {
                    ids.push(c.peerId);
                }
            }
            IPeerRegistryCalls::setPeerId(c) => {
                let slot = usize::from(c.slot);
                if slot >= ids.len() {
                    return Err(revert("slot out of range"));
                }
                if c.peerId.is_empty() || c.peerId.len() > ID_LENGTH {
                    return Err(revert("invalid peer id length"));
                }
                if apply {
                    ids[slot] = c.peerId;
                }
            }
            IPeerRegistryCalls::removePeerId(c) => {
                let slot = usize::from(c.slot);
                if slot >= ids.len() {
                    return Err(revert("slot out of range"));
                }
                if apply {
                    ids.remove(slot);
                }
            }
            _ => return Err(revert("view function")),
        }

        if self.break_reads_after_send {
            self.reads_broken = true;
        }

        self.nonce += 1;
        let hash = keccak256(self.nonce.to_be_bytes());
        self.receipts.insert(hash, !self.fail_on_chain);
        Ok(json!(hash))
    }
}

impl WalletTransport for MockWallet {
    async fn request(&self, request: WalletRequest) -> Result<Value, ClientError> {
        if matches!(request, WalletRequest::RequestAccounts) {
            let mut open = self.accounts_open.subscribe();
            let _ = open.wait_for(|open| *open).await;
        }
        tokio::task::yield_now().await;
        self.handle(request)
    }
}
