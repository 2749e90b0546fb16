//! Session registry error types.

use super::config::ConfigError;
use crate::game::{
    entities::{Chips, UserId},
    state_machine::HandError,
};
use thiserror::Error;

/// Errors from starting or playing a session
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// Participant already has a live hand
    #[error("user {0} already has a hand in progress")]
    AlreadyActive(UserId),

    #[error("no hand in progress")]
    NoActiveHand,

    /// Another action on the same hand is being processed
    #[error("hand is busy, try again")]
    HandLocked,

    #[error("wager must be positive and within the stack limit")]
    InvalidWager,

    #[error("user {user_id} has {available} but the wager is {required}")]
    InsufficientBalance {
        user_id: UserId,
        available: i64,
        required: Chips,
    },

    #[error("can't play against yourself")]
    SelfPlay,

    #[error(transparent)]
    Hand(#[from] HandError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl SessionError {
    /// Message safe to show the participant
    pub fn client_message(&self) -> String {
        match self {
            SessionError::AlreadyActive(_) => "You already have a hand in progress".to_string(),
            SessionError::InsufficientBalance { required, .. } => {
                format!("You need at least {required} to play this wager")
            }
            SessionError::Config(_) => "Table is misconfigured".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;
