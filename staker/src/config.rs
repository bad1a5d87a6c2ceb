use anyhow::{bail, Context, Result};
use serde::Deserialize;
use staker_sdk::core::constants::{
    DEFAULT_EXPIRATION, DEFAULT_PERMISSION, DEFAULT_PRECISION, DEFAULT_SYMBOL,
    DEFAULT_TOKEN_CONTRACT, METADATA_RETRY_BACKOFF, REVALIDATE_WAIT, SETTLE_WAIT,
};
use staker_sdk::{AccountName, Asset, Backoff, EngineTimings, RetryPolicy, Symbol};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level layout of `config.toml`
#[derive(Debug, Deserialize)]
pub struct BotConfiguration {
    pub config: Settings,
    #[serde(default)]
    pub retry: RetrySettings,
}

#[derive(Deserialize)]
pub struct Settings {
    /// Signing key (WIF or PVT_K1)
    pub pkey: String,
    /// Custodian account the stake comes from
    pub account: String,
    pub wax_node: String,
    pub chunk_size: usize,
    /// Total amount to delegate across all receivers, in whole tokens
    pub use_balance: f64,
    #[serde(default = "default_permission")]
    pub permission: String,
    #[serde(default = "default_symbol")]
    pub symbol: String,
    #[serde(default = "default_precision")]
    pub precision: u8,
    #[serde(default = "default_token_contract")]
    pub token_contract: String,
    #[serde(default = "default_accounts_file")]
    pub accounts_file: PathBuf,
    #[serde(default = "default_done_file")]
    pub done_file: PathBuf,
    #[serde(default = "default_settle_wait_ms")]
    pub settle_wait_ms: u64,
    #[serde(default = "default_revalidate_wait_ms")]
    pub revalidate_wait_ms: u64,
    #[serde(default = "default_expiration_secs")]
    pub expiration_secs: u64,
}

// keeps the key out of logs
impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("pkey", &"<redacted>")
            .field("account", &self.account)
            .field("wax_node", &self.wax_node)
            .field("chunk_size", &self.chunk_size)
            .field("use_balance", &self.use_balance)
            .field("permission", &self.permission)
            .field("symbol", &self.symbol)
            .field("precision", &self.precision)
            .field("accounts_file", &self.accounts_file)
            .field("done_file", &self.done_file)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
pub struct RetrySettings {
    #[serde(default = "default_metadata_backoff_ms")]
    pub metadata_backoff_ms: u64,
    #[serde(default)]
    pub metadata_max_attempts: Option<u32>,
    #[serde(default)]
    pub rebuild_max_attempts: Option<u32>,
    #[serde(default)]
    pub rebuild_backoff_ms: u64,
    /// When set, rebuild backoff doubles up to this cap
    #[serde(default)]
    pub rebuild_backoff_max_ms: Option<u64>,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            metadata_backoff_ms: default_metadata_backoff_ms(),
            metadata_max_attempts: None,
            rebuild_max_attempts: None,
            rebuild_backoff_ms: 0,
            rebuild_backoff_max_ms: None,
        }
    }
}

fn default_permission() -> String {
    DEFAULT_PERMISSION.to_string()
}

fn default_symbol() -> String {
    DEFAULT_SYMBOL.to_string()
}

fn default_precision() -> u8 {
    DEFAULT_PRECISION
}

fn default_token_contract() -> String {
    DEFAULT_TOKEN_CONTRACT.to_string()
}

fn default_accounts_file() -> PathBuf {
    PathBuf::from("accounts.txt")
}

fn default_done_file() -> PathBuf {
    PathBuf::from("done.txt")
}

fn default_settle_wait_ms() -> u64 {
    SETTLE_WAIT.as_millis() as u64
}

fn default_revalidate_wait_ms() -> u64 {
    REVALIDATE_WAIT.as_millis() as u64
}

fn default_expiration_secs() -> u64 {
    DEFAULT_EXPIRATION.as_secs()
}

fn default_metadata_backoff_ms() -> u64 {
    METADATA_RETRY_BACKOFF.as_millis() as u64
}

impl BotConfiguration {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("loading {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("loading {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let c = &self.config;
        if c.chunk_size == 0 {
            bail!("chunk_size must be greater than zero");
        }
        if !c.use_balance.is_finite() || c.use_balance <= 0.0 {
            bail!("use_balance must be a positive amount, got {}", c.use_balance);
        }
        if c.wax_node.trim().is_empty() {
            bail!("wax_node must not be empty");
        }
        if c.pkey.trim().is_empty() {
            bail!("pkey must not be empty");
        }
        if matches!(self.retry.rebuild_max_attempts, Some(0))
            || matches!(self.retry.metadata_max_attempts, Some(0))
        {
            bail!("max attempts must be at least 1 when set");
        }
        self.custodian()?;
        self.permission()?;
        self.token_contract()?;
        self.budget()?;
        Ok(())
    }

    pub fn custodian(&self) -> Result<AccountName> {
        AccountName::new(self.config.account.as_str()).context("invalid custodian account")
    }

    pub fn permission(&self) -> Result<AccountName> {
        AccountName::new(self.config.permission.as_str()).context("invalid permission")
    }

    pub fn token_contract(&self) -> Result<AccountName> {
        AccountName::new(self.config.token_contract.as_str()).context("invalid token contract")
    }

    pub fn symbol(&self) -> Result<Symbol> {
        Ok(Symbol::new(&self.config.symbol, self.config.precision)?)
    }

    /// Total budget in integer units
    pub fn budget(&self) -> Result<Asset> {
        Ok(Asset::from_decimal(self.config.use_balance, self.symbol()?)?)
    }

    pub fn timings(&self) -> EngineTimings {
        EngineTimings {
            settle_wait: Duration::from_millis(self.config.settle_wait_ms),
            revalidate_wait: Duration::from_millis(self.config.revalidate_wait_ms),
        }
    }

    pub fn expiration(&self) -> Duration {
        Duration::from_secs(self.config.expiration_secs)
    }

    pub fn metadata_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry.metadata_max_attempts,
            backoff: Backoff::Fixed(Duration::from_millis(self.retry.metadata_backoff_ms)),
        }
    }

    pub fn rebuild_policy(&self) -> RetryPolicy {
        let initial = Duration::from_millis(self.retry.rebuild_backoff_ms);
        let backoff = match self.retry.rebuild_backoff_max_ms {
            Some(max) => Backoff::Exponential {
                initial,
                max: Duration::from_millis(max),
            },
            None => Backoff::Fixed(initial),
        };
        RetryPolicy {
            max_attempts: self.retry.rebuild_max_attempts,
            backoff,
        }
    }
}
