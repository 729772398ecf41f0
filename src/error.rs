//! Error types for the mortgage ledger

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    /// A payload value the canonical encoder cannot represent.
    #[error("Non-finite value in field '{field}'")]
    NonFiniteValue { field: String },
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
    #[error("Encoding error: {0}")]
    EncodingError(String),
    #[error("Invalid loan terms: {0}")]
    InvalidLoanTerms(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Invalid genesis block: {0}")]
    InvalidGenesis(String),
    #[error("Block at position {position} carries index {found}")]
    IndexMismatch { position: usize, found: u64 },
    #[error("Hash mismatch at block {index}. Stored {stored}, recomputed {recomputed}")]
    HashMismatch {
        index: u64,
        stored: String,
        recomputed: String,
    },
    #[error("Broken link at block {index}. Expected previous hash {expected}, but got {found}")]
    BrokenLink {
        index: u64,
        expected: String,
        found: String,
    },
}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        LedgerError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::EncodingError(err.to_string())
    }
}

impl From<toml::de::Error> for LedgerError {
    fn from(err: toml::de::Error) -> Self {
        LedgerError::ConfigError(err.to_string())
    }
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, LedgerError>;
