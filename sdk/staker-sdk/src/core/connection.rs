use crate::basic::transaction::SignedTransaction;
use crate::types::{AccountName, Asset, ChainInfo, ResourceWeights, Symbol};
use async_trait::async_trait;
use std::error::Error;

/// Remote ledger calls the delegation flow depends on.
///
/// Implementations do no retrying of their own; callers decide which failures
/// are transient.
#[async_trait]
pub trait LedgerConnection: Send + Sync {
    /// Chain id plus the head block used for transaction reference fields
    async fn get_chain_info(&self) -> Result<ChainInfo, Box<dyn Error + Send + Sync>>;

    /// Resource weights delegated to `account`, `None` if the account does not exist
    async fn get_account(
        &self,
        account: &AccountName,
    ) -> Result<Option<ResourceWeights>, Box<dyn Error + Send + Sync>>;

    async fn get_currency_balance(
        &self,
        code: &AccountName,
        account: &AccountName,
        symbol: &Symbol,
    ) -> Result<Vec<Asset>, Box<dyn Error + Send + Sync>>;

    /// Broadcast a signed transaction, returning the transaction id
    async fn push_transaction(
        &self,
        tx: &SignedTransaction,
    ) -> Result<String, Box<dyn Error + Send + Sync>>;
}
