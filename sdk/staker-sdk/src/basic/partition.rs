use crate::basic::progress::ProgressLedger;
use crate::error::{Result, StakerSdkError};
use crate::types::AccountName;
use std::collections::HashSet;

/// Consecutive slice of pending receivers delegated in one transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub index: usize,
    pub accounts: Vec<AccountName>,
}

impl Chunk {
    /// First receiver; its resource weights confirm the whole chunk
    pub fn sentinel(&self) -> &AccountName {
        &self.accounts[0]
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

/// Receivers not yet recorded as done, in input order, each at most once
pub fn pending_accounts(accounts: &[AccountName], ledger: &ProgressLedger) -> Vec<AccountName> {
    let mut seen = HashSet::new();
    accounts
        .iter()
        .filter(|a| !ledger.has(a))
        .filter(|a| seen.insert(a.as_str()))
        .cloned()
        .collect()
}

/// Split `pending` positionally into chunks of at most `chunk_size`
pub fn partition(pending: &[AccountName], chunk_size: usize) -> Result<Vec<Chunk>> {
    if chunk_size == 0 {
        return Err(StakerSdkError::Other("chunk size must be greater than zero".into()));
    }

    Ok(pending
        .chunks(chunk_size)
        .enumerate()
        .map(|(index, accounts)| Chunk {
            index,
            accounts: accounts.to_vec(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<AccountName> {
        list.iter().map(|n| AccountName::new(*n).unwrap()).collect()
    }

    #[test]
    fn test_partition_sizes() {
        let pending = names(&["aaa", "bbb", "ccc", "ddd", "eee", "fff", "ggg"]);
        for chunk_size in 1..=9 {
            let chunks = partition(&pending, chunk_size).unwrap();
            assert_eq!(chunks.len(), (pending.len() + chunk_size - 1) / chunk_size);

            let (last, full) = chunks.split_last().unwrap();
            assert!(full.iter().all(|c| c.len() == chunk_size));
            assert!(last.len() <= chunk_size && !last.is_empty());

            let flat: Vec<_> = chunks.iter().flat_map(|c| c.accounts.clone()).collect();
            assert_eq!(flat, pending);
            assert!(chunks.iter().enumerate().all(|(i, c)| c.index == i));
        }
    }

    #[test]
    fn test_partition_empty_and_zero() {
        assert!(partition(&[], 3).unwrap().is_empty());
        assert!(partition(&names(&["aaa"]), 0).is_err());
    }
}
