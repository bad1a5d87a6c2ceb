use anyhow::{Context, Result};
use staker_sdk::core::constants::MIN_ACCOUNT_LINE_LEN;
use staker_sdk::AccountName;
use std::path::Path;

/// Read receiver accounts, one per line, in file order.
///
/// Duplicates are kept; they are collapsed later against the progress log.
pub fn load_accounts(path: &Path) -> Result<Vec<AccountName>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading accounts from {}", path.display()))?;
    parse_accounts(&content).with_context(|| format!("parsing {}", path.display()))
}

pub fn parse_accounts(content: &str) -> Result<Vec<AccountName>> {
    content
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| line.len() >= MIN_ACCOUNT_LINE_LEN)
        .map(|(number, line)| {
            AccountName::new(line).with_context(|| format!("line {}: '{}'", number, line))
        })
        .collect()
}
