use crate::config::BotConfiguration;
use anyhow::{bail, Result};
use staker_sdk::basic::allocation::{ensure_sufficient_balance, per_beneficiary};
use staker_sdk::{
    fetch_balance, partition, pending_accounts, AccountName, BroadcastEngine, DelegationPlan,
    LedgerConnection, ProgressLedger, RunSummary, StakerSigner,
};
use tracing::info;

#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Every input account was already in the progress log
    NothingToDo,
    Completed(RunSummary),
}

/// Delegate the configured budget across `accounts`, skipping those already
/// recorded in `progress`.
pub async fn run<C: LedgerConnection>(
    connection: &C,
    signer: &dyn StakerSigner,
    config: &BotConfiguration,
    accounts: &[AccountName],
    progress: &mut ProgressLedger,
) -> Result<Outcome> {
    let pending = pending_accounts(accounts, progress);
    info!(
        loaded = accounts.len(),
        done = progress.len(),
        pending = pending.len(),
        "Accounts loaded"
    );
    if pending.is_empty() {
        info!("Nothing to do, every account is already staked");
        return Ok(Outcome::NothingToDo);
    }

    let chunks = partition(&pending, config.config.chunk_size)?;
    info!(chunks = chunks.len(), chunk_size = config.config.chunk_size, "Partitioned");

    let custodian = config.custodian()?;
    let budget = config.budget()?;
    let balance =
        fetch_balance(connection, &config.token_contract()?, &custodian, &budget.symbol).await?;
    info!(%custodian, %balance, %budget, "Custodian balance");
    ensure_sufficient_balance(balance, budget)?;

    // divided over the full input list, not just the pending part
    let share = match per_beneficiary(budget, accounts.len()) {
        Some(share) if share.amount > 0 => share,
        _ => bail!(
            "budget {} is too small to split across {} accounts",
            budget,
            accounts.len()
        ),
    };
    info!(per_account = %share, "Delegating CPU");

    let mut plan = DelegationPlan::cpu_only(custodian, config.permission()?, share);
    plan.expiration = config.expiration();

    let summary = BroadcastEngine::new(connection, plan)
        .with_signer(signer)
        .with_timings(config.timings())
        .with_metadata_policy(config.metadata_policy())
        .with_rebuild_policy(config.rebuild_policy())
        .run(&chunks, progress)
        .await?;

    info!(
        chunks = summary.chunks,
        accounts = summary.accounts,
        rebuilds = summary.rebuilds,
        "All chunks confirmed"
    );
    Ok(Outcome::Completed(summary))
}
