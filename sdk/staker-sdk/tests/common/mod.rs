#![allow(dead_code)]

use async_trait::async_trait;
use staker_sdk::{
    AccountName, Asset, ChainInfo, K1Signer, LedgerConnection, ResourceWeights,
    SignedTransaction, Symbol,
};
use std::collections::HashMap;
use std::error::Error;
use std::sync::Mutex;

pub const DEV_KEY: &str = "5KQwrPbwdL6PhXujxW37FSSQZ1JiwsST4cqQzDeyXtP79zkvFD3";
pub const CHAIN_ID: [u8; 32] = [0x1a; 32];

pub fn wax() -> Symbol {
    Symbol::new("WAX", 8).unwrap()
}

pub fn name(n: &str) -> AccountName {
    AccountName::new(n).unwrap()
}

pub fn names(list: &[&str]) -> Vec<AccountName> {
    list.iter().map(|n| name(n)).collect()
}

pub fn signer() -> K1Signer {
    K1Signer::from_string(DEV_KEY).unwrap()
}

#[derive(Default)]
struct MockState {
    weights: HashMap<u64, (AccountName, ResourceWeights)>,
    balances: HashMap<String, Vec<Asset>>,
    pushes: Vec<SignedTransaction>,
    chain_info_calls: u32,
    account_reads: u32,
    /// Staged effect of the last accepted push and reads left before it shows
    pending: Option<(u32, Vec<(u64, i64, i64)>)>,
}

/// In-memory ledger with scripted failure modes
pub struct MockLedger {
    state: Mutex<MockState>,
    /// Pushes numbered below this are acknowledged but have no effect
    pub effective_from_push: u32,
    /// Account reads that still return the old weights after an effective push
    pub visible_after_reads: u32,
    pub chain_info_failures: u32,
    pub reject_pushes: bool,
    /// NET weight added to an account by someone else, right after the first account read
    pub foreign_net_change: Option<(AccountName, i64)>,
}

impl MockLedger {
    pub fn new(accounts: &[AccountName]) -> Self {
        let mut state = MockState::default();
        for account in accounts {
            state.weights.insert(
                account.value(),
                (
                    account.clone(),
                    ResourceWeights {
                        cpu: 10_000,
                        net: 10_000,
                    },
                ),
            );
        }
        Self {
            state: Mutex::new(state),
            effective_from_push: 1,
            visible_after_reads: 0,
            chain_info_failures: 0,
            reject_pushes: false,
            foreign_net_change: None,
        }
    }

    pub fn with_balance(self, account: &AccountName, balance: Asset) -> Self {
        self.state
            .lock()
            .unwrap()
            .balances
            .insert(account.to_string(), vec![balance]);
        self
    }

    pub fn pushes(&self) -> Vec<SignedTransaction> {
        self.state.lock().unwrap().pushes.clone()
    }

    pub fn chain_info_calls(&self) -> u32 {
        self.state.lock().unwrap().chain_info_calls
    }

    pub fn account_reads(&self) -> u32 {
        self.state.lock().unwrap().account_reads
    }

    pub fn weights(&self, account: &AccountName) -> ResourceWeights {
        self.state.lock().unwrap().weights[&account.value()].1
    }
}

/// Decode (receiver, net, cpu) from packed delegatebw data
fn decode_delegation(data: &[u8]) -> (u64, i64, i64) {
    let receiver = u64::from_le_bytes(data[8..16].try_into().unwrap());
    let net = i64::from_le_bytes(data[16..24].try_into().unwrap());
    let cpu = i64::from_le_bytes(data[32..40].try_into().unwrap());
    (receiver, net, cpu)
}

#[async_trait]
impl LedgerConnection for MockLedger {
    async fn get_chain_info(&self) -> Result<ChainInfo, Box<dyn Error + Send + Sync>> {
        let mut state = self.state.lock().unwrap();
        state.chain_info_calls += 1;
        if state.chain_info_calls <= self.chain_info_failures {
            return Err("connection reset by peer".into());
        }

        let block_num = 1000 + state.chain_info_calls;
        let mut head_block_id = [0u8; 32];
        head_block_id[..4].copy_from_slice(&block_num.to_be_bytes());
        head_block_id[8..12].copy_from_slice(&block_num.wrapping_mul(0x9e37_79b9).to_le_bytes());
        Ok(ChainInfo {
            chain_id: CHAIN_ID,
            head_block_id,
            head_block_num: block_num,
        })
    }

    async fn get_account(
        &self,
        account: &AccountName,
    ) -> Result<Option<ResourceWeights>, Box<dyn Error + Send + Sync>> {
        let mut state = self.state.lock().unwrap();
        state.account_reads += 1;

        if let Some((reads_left, updates)) = state.pending.take() {
            if reads_left == 0 {
                for (receiver, net, cpu) in updates {
                    if let Some((_, w)) = state.weights.get_mut(&receiver) {
                        w.net += net;
                        w.cpu += cpu;
                    }
                }
            } else {
                state.pending = Some((reads_left - 1, updates));
            }
        }

        let result = state.weights.get(&account.value()).map(|(_, w)| *w);

        if state.account_reads == 1 {
            if let Some((other, delta)) = &self.foreign_net_change {
                if let Some((_, w)) = state.weights.get_mut(&other.value()) {
                    w.net += delta;
                }
            }
        }
        Ok(result)
    }

    async fn get_currency_balance(
        &self,
        _code: &AccountName,
        account: &AccountName,
        _symbol: &Symbol,
    ) -> Result<Vec<Asset>, Box<dyn Error + Send + Sync>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .balances
            .get(account.as_str())
            .cloned()
            .unwrap_or_default())
    }

    async fn push_transaction(
        &self,
        tx: &SignedTransaction,
    ) -> Result<String, Box<dyn Error + Send + Sync>> {
        if self.reject_pushes {
            return Err("assertion failure with message: overdrawn balance".into());
        }

        let mut state = self.state.lock().unwrap();
        state.pushes.push(tx.clone());
        if state.pushes.len() as u32 >= self.effective_from_push {
            let updates = tx
                .transaction
                .actions
                .iter()
                .map(|a| decode_delegation(&a.data))
                .collect();
            state.pending = Some((self.visible_after_reads, updates));
        }
        Ok(tx.id())
    }
}
