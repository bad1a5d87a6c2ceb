pub mod advanced;
pub mod basic;
pub mod core;
pub mod error;
pub mod types;
pub mod utils;

pub use crate::basic::engine::{BroadcastEngine, DelegationPlan, EngineTimings, RunSummary};
pub use crate::basic::partition::{partition, pending_accounts, Chunk};
pub use crate::basic::progress::ProgressLedger;
pub use crate::basic::retry::{Backoff, RetryPolicy};
pub use crate::basic::transaction::{DelegateBuilder, SignedTransaction, UnsignedTransaction};
pub use crate::core::connection::LedgerConnection;
pub use crate::core::rpc::HttpConnection;
pub use crate::core::signer::{K1Signer, StakerSigner};
pub use crate::error::{Result, StakerSdkError};
pub use crate::types::{AccountName, Asset, ChainInfo, ResourceWeights, Symbol};
pub use crate::utils::{fetch_balance, fetch_chain_info, fetch_resource_weights};
