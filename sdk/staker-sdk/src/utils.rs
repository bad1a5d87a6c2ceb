use crate::basic::retry::RetryPolicy;
use crate::core::connection::LedgerConnection;
use crate::error::{Result, StakerSdkError};
use crate::types::{AccountName, Asset, ChainInfo, ResourceWeights, Symbol};
use tracing::warn;

//=============================================================================
// Ledger Fetching
//=============================================================================

/// Fetch chain info, retrying transient failures per `policy`.
///
/// With an unbounded policy this only returns once the node answers.
pub async fn fetch_chain_info(
    connection: &impl LedgerConnection,
    policy: &RetryPolicy,
) -> Result<ChainInfo> {
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        match connection.get_chain_info().await {
            Ok(info) => return Ok(info),
            Err(e) => {
                warn!(attempt, error = %e, "Fetching chain info failed");
                if !policy.allows(attempt + 1) {
                    return Err(StakerSdkError::RetriesExhausted {
                        operation: "chain info fetch".to_string(),
                        attempts: attempt,
                    });
                }
                tokio::time::sleep(policy.delay(attempt)).await;
            },
        }
    }
}

/// Fetch the resource weights delegated to an account
pub async fn fetch_resource_weights(
    connection: &impl LedgerConnection,
    account: &AccountName,
) -> Result<ResourceWeights> {
    connection
        .get_account(account)
        .await
        .map_err(|e| StakerSdkError::Connection(format!("getting account {}: {}", account, e)))?
        .ok_or_else(|| StakerSdkError::AccountNotFound(account.clone()))
}

/// Fetch the balance of `symbol` held by `account`; a missing row counts as zero
pub async fn fetch_balance(
    connection: &impl LedgerConnection,
    token_contract: &AccountName,
    account: &AccountName,
    symbol: &Symbol,
) -> Result<Asset> {
    let balances = connection
        .get_currency_balance(token_contract, account, symbol)
        .await
        .map_err(|e| StakerSdkError::Connection(format!("getting balance of {}: {}", account, e)))?;

    match balances.into_iter().find(|a| a.symbol.code() == symbol.code()) {
        Some(balance) if balance.symbol.precision() == symbol.precision() => Ok(balance),
        Some(balance) => Err(StakerSdkError::InvalidAsset(format!(
            "balance {} does not match expected symbol {}",
            balance, symbol
        ))),
        None => Ok(Asset::zero(*symbol)),
    }
}

/// Decode a 64-char hex string into 32 bytes
pub fn parse_hex32(value: &str) -> Result<[u8; 32]> {
    let bytes = hex::decode(value)
        .map_err(|e| StakerSdkError::Connection(format!("invalid hex '{}': {}", value, e)))?;
    bytes
        .try_into()
        .map_err(|_| StakerSdkError::Connection(format!("expected 32 bytes, got '{}'", value)))
}
