use std::time::Duration;

pub const SYSTEM_CONTRACT: &str = "eosio";
pub const DELEGATE_ACTION: &str = "delegatebw";
pub const DEFAULT_PERMISSION: &str = "active";
pub const DEFAULT_TOKEN_CONTRACT: &str = "eosio.token";
pub const DEFAULT_SYMBOL: &str = "WAX";
pub const DEFAULT_PRECISION: u8 = 8;

/// Account-list and progress-log lines shorter than this are treated as blank
pub const MIN_ACCOUNT_LINE_LEN: usize = 3;

/// Transactions expire 55 minutes after they are built
pub const DEFAULT_EXPIRATION: Duration = Duration::from_secs(55 * 60);

pub const SETTLE_WAIT: Duration = Duration::from_millis(1500);
pub const REVALIDATE_WAIT: Duration = Duration::from_millis(3500);
pub const METADATA_RETRY_BACKOFF: Duration = Duration::from_millis(5);
