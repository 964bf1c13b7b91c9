use thiserror::Error;

/// Failures surfaced by the ledger and its components.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("player not found: {0}")]
    UnknownPlayer(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("sender and receiver must be different players")]
    SelfTransfer,

    #[error("insufficient balance: available {available}, requested {requested}")]
    InsufficientFunds { available: u64, requested: u64 },

    #[error("player id already registered: {0}")]
    DuplicateRegistration(String),

    /// Chain linkage or settlement broke; the ledger stops accepting mutations.
    #[error("ledger invariant violated: {0}")]
    InternalInvariantViolation(String),

    #[error("ledger halted after an invariant violation")]
    LedgerHalted,
}

pub type Result<T> = std::result::Result<T, LedgerError>;
