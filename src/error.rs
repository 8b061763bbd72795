//! Error types.

use thiserror::Error;

/// A rejected program call. `Display` is the message shown to the user.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProgramError {
    #[error("Allocate: account {0} already in use")]
    AccountInUse(String),

    #[error("Account {0} does not exist")]
    AccountNotFound(String),

    #[error("Unauthorized: signer is not the event authority")]
    Unauthorized,

    #[error("Event already resolved")]
    AlreadyResolved,

    #[error("Event not resolved yet")]
    EventNotResolved,

    #[error("Winnings already claimed")]
    AlreadyClaimed,

    #[error("Bet lost")]
    BetLost,

    #[error("Description too long (max 200 characters)")]
    DescriptionTooLong,

    #[error("Amount must be greater than zero")]
    InvalidAmount,

    #[error("Arithmetic overflow")]
    ArithmeticOverflow,

    /// Anything the transport or wallet reports (user rejection, RPC error…).
    #[error("{0}")]
    Rejected(String),
}

impl ProgramError {
    /// Duplicate-record rejections surface as "already in use".
    pub fn is_duplicate(&self) -> bool {
        self.to_string().contains("already in use")
    }
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ledger file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Load(#[from] config::ConfigError),

    #[error("invalid address for '{key}': {value}")]
    InvalidAddress { key: &'static str, value: String },

    #[error("invalid value for '{key}': {value}")]
    InvalidValue { key: &'static str, value: String },
}
