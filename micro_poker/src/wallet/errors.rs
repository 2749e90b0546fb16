//! Wallet error types.

use crate::game::entities::UserId;
use thiserror::Error;

/// Wallet errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WalletError {
    /// Invalid amount (must be positive)
    #[error("Invalid amount: {0}")]
    InvalidAmount(i64),

    /// Wallet not found
    #[error("Wallet not found for user {0}")]
    WalletNotFound(UserId),
}

impl WalletError {
    /// Get a client-safe error message that doesn't leak user IDs.
    pub fn client_message(&self) -> String {
        match self {
            WalletError::WalletNotFound(_) => "Wallet not found".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for wallet operations
pub type WalletResult<T> = Result<T, WalletError>;
