//! Account authorization.

use crate::session::{Session, Signer};
use crate::transport::WalletTransport;
use alloy_primitives::Address;
use peerbook_core::ClientError;

/// An authorized account and a signer bound to it.
pub struct Authorization<T> {
    pub account: Address,
    pub signer: Signer<T>,
}

/// Request account access and bind a signer to the first account returned.
///
/// When `expected_chain_id` is set the wallet must be on that chain.
pub async fn authorize<T: WalletTransport>(
    session: &Session<T>,
    expected_chain_id: Option<u64>,
) -> Result<Authorization<T>, ClientError> {
    let accounts = session.request_accounts().await?;
    let account = accounts
        .first()
        .copied()
        .ok_or_else(|| ClientError::unauthorized("wallet returned no accounts"))?;

    if let Some(expected) = expected_chain_id {
        let chain_id = session.chain_id().await?;
        if chain_id != expected {
            return Err(ClientError::unauthorized(format!(
                "wallet is on chain {chain_id}, expected {expected}"
            )));
        }
    }

    tracing::debug!(%account, accounts = accounts.len(), "account authorized");
    Ok(Authorization {
        account,
        signer: session.signer(account),
    })
}
