//! Unified error types and result handling for the wallet core.

use thiserror::Error;

/// Error type shared by every wallet, ledger, and rule operation.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid amount: {amount}")]
    InvalidAmount { amount: i64 },

    #[error("Unknown schedule: {value}")]
    InvalidSchedule { value: String },

    #[error("Wallet not found for user: {user_id}")]
    WalletNotFound { user_id: String },

    #[error("Wallet rule not found: {id}")]
    RuleNotFound { id: i64 },

    #[error("Insufficient balance: have {current}, need {required}")]
    InsufficientFunds { current: i64, required: i64 },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
