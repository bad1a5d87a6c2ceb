use crate::basic::partition::Chunk;
use crate::basic::progress::ProgressLedger;
use crate::basic::retry::{Backoff, RetryPolicy};
use crate::basic::transaction::{DelegateBuilder, SignedTransaction};
use crate::core::connection::LedgerConnection;
use crate::core::constants::{
    DEFAULT_EXPIRATION, METADATA_RETRY_BACKOFF, REVALIDATE_WAIT, SETTLE_WAIT,
};
use crate::core::signer::StakerSigner;
use crate::error::{Result, StakerSdkError};
use crate::types::{AccountName, Asset, ResourceWeights};
use crate::utils;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Fixed pauses between broadcast and the on-chain checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineTimings {
    /// Between push and the first validation
    pub settle_wait: Duration,
    /// Between a failed first validation and the second one
    pub revalidate_wait: Duration,
}

impl Default for EngineTimings {
    fn default() -> Self {
        Self {
            settle_wait: SETTLE_WAIT,
            revalidate_wait: REVALIDATE_WAIT,
        }
    }
}

/// What each receiver in every chunk gets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelegationPlan {
    pub custodian: AccountName,
    pub permission: AccountName,
    pub cpu: Asset,
    pub net: Asset,
    pub expiration: Duration,
}

impl DelegationPlan {
    /// CPU-only plan with a zero NET quantity
    pub fn cpu_only(custodian: AccountName, permission: AccountName, cpu: Asset) -> Self {
        Self {
            custodian,
            permission,
            cpu,
            net: Asset::zero(cpu.symbol),
            expiration: DEFAULT_EXPIRATION,
        }
    }

    /// Whether `current` differs from `baseline` in a weight this plan stakes.
    ///
    /// Changes to a resource the plan delegates nothing of are ignored.
    pub fn took_effect(&self, baseline: &ResourceWeights, current: &ResourceWeights) -> bool {
        (self.cpu.amount != 0 && current.cpu != baseline.cpu)
            || (self.net.amount != 0 && current.net != baseline.net)
    }
}

/// States of a single chunk's delegation
#[derive(Debug)]
enum ChunkState {
    BuildAndSign,
    Broadcast(SignedTransaction),
    SettleWait,
    Validate { first_attempt: bool },
    Confirmed,
}

/// Outcome of one confirmed chunk
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkReport {
    pub index: usize,
    pub accounts: usize,
    /// Build&Sign cycles, 1 when the first broadcast took effect
    pub attempts: u32,
    pub transaction_ids: Vec<String>,
}

/// Totals over a whole run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub chunks: usize,
    pub accounts: usize,
    pub rebuilds: u32,
}

/// Pushes one delegation transaction per chunk and confirms it by watching the
/// chunk's sentinel receiver, rebuilding until the weights move.
pub struct BroadcastEngine<'a, C: LedgerConnection> {
    connection: &'a C,
    signers: Vec<&'a dyn StakerSigner>,
    plan: DelegationPlan,
    timings: EngineTimings,
    metadata_policy: RetryPolicy,
    rebuild_policy: RetryPolicy,
}

impl<'a, C: LedgerConnection> BroadcastEngine<'a, C> {
    pub fn new(connection: &'a C, plan: DelegationPlan) -> Self {
        Self {
            connection,
            signers: Vec::new(),
            plan,
            timings: EngineTimings::default(),
            metadata_policy: RetryPolicy::unbounded(Backoff::Fixed(METADATA_RETRY_BACKOFF)),
            rebuild_policy: RetryPolicy::default(),
        }
    }

    pub fn with_signer(mut self, signer: &'a dyn StakerSigner) -> Self {
        self.signers.push(signer);
        self
    }

    pub fn with_timings(mut self, timings: EngineTimings) -> Self {
        self.timings = timings;
        self
    }

    pub fn with_metadata_policy(mut self, policy: RetryPolicy) -> Self {
        self.metadata_policy = policy;
        self
    }

    pub fn with_rebuild_policy(mut self, policy: RetryPolicy) -> Self {
        self.rebuild_policy = policy;
        self
    }

    pub fn plan(&self) -> &DelegationPlan {
        &self.plan
    }

    /// Delegate to every chunk in order, stopping at the first fatal error.
    ///
    /// Chunks confirmed before the error stay recorded in `ledger`.
    pub async fn run(&self, chunks: &[Chunk], ledger: &mut ProgressLedger) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        for chunk in chunks {
            info!(chunk = chunk.index, total = chunks.len(), "Processing chunk");
            let report = self.confirm_chunk(chunk, ledger).await?;
            summary.chunks += 1;
            summary.accounts += report.accounts;
            summary.rebuilds += report.attempts - 1;
        }
        Ok(summary)
    }

    /// Get one chunk's transaction on-chain and observably effective, then record it.
    ///
    /// Any RPC failure other than the chain-info fetch aborts with an error and
    /// leaves the chunk unrecorded.
    #[instrument(skip_all, fields(chunk = chunk.index, size = chunk.len()))]
    pub async fn confirm_chunk(
        &self,
        chunk: &Chunk,
        ledger: &mut ProgressLedger,
    ) -> Result<ChunkReport> {
        if chunk.is_empty() {
            return Err(StakerSdkError::Other(format!("chunk {} is empty", chunk.index)));
        }
        if self.signers.is_empty() {
            return Err(StakerSdkError::Signing("no signing keys configured".into()));
        }

        let sentinel = chunk.sentinel();
        let baseline = utils::fetch_resource_weights(self.connection, sentinel).await?;

        let mut report = ChunkReport {
            index: chunk.index,
            accounts: chunk.len(),
            ..Default::default()
        };
        let mut state = ChunkState::BuildAndSign;

        loop {
            state = match state {
                ChunkState::BuildAndSign => {
                    report.attempts += 1;
                    if !self.rebuild_policy.allows(report.attempts) {
                        return Err(StakerSdkError::RetriesExhausted {
                            operation: format!("delegation of chunk {}", chunk.index),
                            attempts: report.attempts - 1,
                        });
                    }
                    if report.attempts > 1 {
                        tokio::time::sleep(self.rebuild_policy.delay(report.attempts - 1)).await;
                    }

                    let tx = DelegateBuilder::new(self.plan.custodian.clone())
                        .with_permission(self.plan.permission.clone())
                        .with_receivers(&chunk.accounts)
                        .with_cpu(self.plan.cpu)
                        .with_net(self.plan.net)
                        .with_expiration(self.plan.expiration)
                        .build_transaction(self.connection, &self.metadata_policy)
                        .await?;
                    ChunkState::Broadcast(tx.sign(&self.signers)?)
                },
                ChunkState::Broadcast(signed) => {
                    let id = self
                        .connection
                        .push_transaction(&signed)
                        .await
                        .map_err(|e| {
                            StakerSdkError::Connection(format!("pushing transaction: {}", e))
                        })?;
                    info!(
                        transaction_id = %id,
                        attempt = report.attempts,
                        "Transaction pushed, waiting {:?} before validating",
                        self.timings.settle_wait
                    );
                    report.transaction_ids.push(id);
                    ChunkState::SettleWait
                },
                ChunkState::SettleWait => {
                    tokio::time::sleep(self.timings.settle_wait).await;
                    ChunkState::Validate {
                        first_attempt: true,
                    }
                },
                ChunkState::Validate { first_attempt } => {
                    let current = utils::fetch_resource_weights(self.connection, sentinel).await?;
                    if self.plan.took_effect(&baseline, &current) {
                        ChunkState::Confirmed
                    } else if first_attempt {
                        warn!(
                            sentinel = %sentinel,
                            "Resource weights unchanged, re-validating in {:?}",
                            self.timings.revalidate_wait
                        );
                        tokio::time::sleep(self.timings.revalidate_wait).await;
                        ChunkState::Validate {
                            first_attempt: false,
                        }
                    } else {
                        warn!(sentinel = %sentinel, "Could not validate transaction, re-sending");
                        ChunkState::BuildAndSign
                    }
                },
                ChunkState::Confirmed => {
                    ledger.mark_done(&chunk.accounts)?;
                    info!(attempts = report.attempts, "Chunk validated");
                    return Ok(report);
                },
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Symbol;

    fn plan(cpu: i64, net: i64) -> DelegationPlan {
        let wax = Symbol::new("WAX", 8).unwrap();
        let mut plan = DelegationPlan::cpu_only(
            AccountName::new("custodian").unwrap(),
            AccountName::new("active").unwrap(),
            Asset::new(cpu, wax),
        );
        plan.net = Asset::new(net, wax);
        plan
    }

    fn weights(cpu: i64, net: i64) -> ResourceWeights {
        ResourceWeights { cpu, net }
    }

    #[test]
    fn test_cpu_only_plan_ignores_net_changes() {
        let plan = plan(100, 0);
        assert!(!plan.took_effect(&weights(10, 10), &weights(10, 25)));
        assert!(!plan.took_effect(&weights(10, 10), &weights(10, 10)));
        assert!(plan.took_effect(&weights(10, 10), &weights(110, 10)));
    }

    #[test]
    fn test_net_plan_watches_both() {
        let plan = plan(100, 50);
        assert!(plan.took_effect(&weights(10, 10), &weights(10, 60)));
        assert!(plan.took_effect(&weights(10, 10), &weights(110, 10)));
        assert!(!plan.took_effect(&weights(10, 10), &weights(10, 10)));
    }
}
