//! Balance store abstraction the session registry settles hands against.

use super::models::EntryType;
use crate::game::entities::UserId;
use async_trait::async_trait;

/// Trait for balance store operations
///
/// Implementations must serialize changes to the same participant and allow
/// changes to different participants to proceed independently.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Current balance. Participants never seen before report the starting
    /// balance.
    async fn get_balance(&self, user_id: UserId) -> i64;

    /// Apply a signed change atomically. The balance is floored at zero.
    /// Returns the new balance.
    async fn adjust(&self, user_id: UserId, delta: i64) -> i64;

    /// Same as [`Ledger::adjust`], tagged with why the change happened.
    async fn record(&self, user_id: UserId, delta: i64, _entry_type: EntryType) -> i64 {
        self.adjust(user_id, delta).await
    }
}
