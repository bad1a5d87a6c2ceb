use crate::core::constants::MIN_ACCOUNT_LINE_LEN;
use crate::error::Result;
use crate::types::AccountName;
use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Append-only log of receivers whose delegation was confirmed on-chain.
///
/// The file holds one account per line and is never rewritten. It is read
/// once on open; afterwards the in-memory set mirrors every append.
#[derive(Debug)]
pub struct ProgressLedger {
    path: PathBuf,
    done: HashSet<String>,
    /// Last line on disk is unterminated; the next append starts a new line
    unterminated: bool,
}

impl ProgressLedger {
    /// Open the log at `path`, creating an empty one if it does not exist
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let (done, unterminated) = match fs::read_to_string(&path) {
            Ok(content) => {
                let done: HashSet<String> = content
                    .lines()
                    .map(str::trim)
                    .filter(|line| line.len() >= MIN_ACCOUNT_LINE_LEN)
                    .map(str::to_string)
                    .collect();
                (done, !content.is_empty() && !content.ends_with('\n'))
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent)?;
                }
                File::create(&path)?;
                (HashSet::new(), false)
            },
            Err(e) => return Err(e.into()),
        };

        debug!(path = %path.display(), entries = done.len(), "Opened progress log");
        Ok(Self {
            path,
            done,
            unterminated,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn has(&self, account: &AccountName) -> bool {
        self.done.contains(account.as_str())
    }

    pub fn len(&self) -> usize {
        self.done.len()
    }

    pub fn is_empty(&self) -> bool {
        self.done.is_empty()
    }

    /// Append `accounts` in order and fsync before returning
    pub fn mark_done(&mut self, accounts: &[AccountName]) -> Result<()> {
        let mut file = OpenOptions::new().append(true).create(true).open(&self.path)?;

        let mut buf = String::new();
        if self.unterminated {
            buf.push('\n');
        }
        for account in accounts {
            buf.push_str(account.as_str());
            buf.push('\n');
        }
        file.write_all(buf.as_bytes())?;
        file.sync_all()?;
        self.unterminated = false;

        for account in accounts {
            self.done.insert(account.as_str().to_string());
        }
        Ok(())
    }
}
