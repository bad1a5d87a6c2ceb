use crate::types::AccountName;
use thiserror::Error;

/// SDK-specific error types for batch delegation
#[derive(Debug, Error)]
pub enum StakerSdkError {
    /// Connection or RPC error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Account not found on-chain
    #[error("Account not found: {0}")]
    AccountNotFound(AccountName),

    /// Account name violates the base32 name rules
    #[error("Invalid account name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// Asset string or symbol could not be parsed
    #[error("Invalid asset: {0}")]
    InvalidAsset(String),

    /// Private key could not be decoded
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Signing failed
    #[error("Signing error: {0}")]
    Signing(String),

    /// Transaction could not be packed
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Progress log or input file error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A bounded retry policy ran out of attempts
    #[error("{operation} gave up after {attempts} attempts")]
    RetriesExhausted { operation: String, attempts: u32 },

    /// Custodian cannot cover the configured budget
    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientBalance { required: String, available: String },

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Result type alias for SDK operations
pub type Result<T> = std::result::Result<T, StakerSdkError>;
