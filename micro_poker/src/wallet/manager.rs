//! In-memory wallet manager with a per-participant journal.

use super::{
    errors::{WalletError, WalletResult},
    ledger::Ledger,
    models::{EntryDirection, EntryType, Wallet, WalletEntry},
};
use crate::game::entities::UserId;
use async_trait::async_trait;
use chrono::Utc;
use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};
use tokio::sync::{Mutex, RwLock};

/// Original balance for participants the ledger has never seen
pub const DEFAULT_STARTING_BALANCE: i64 = 100;

#[derive(Debug)]
struct WalletCell {
    wallet: Wallet,
    entries: Vec<WalletEntry>,
}

/// Wallet manager
///
/// Each participant's wallet sits behind its own lock, so adjustments to the
/// same participant are serialized while different participants never wait
/// on each other.
#[derive(Debug)]
pub struct WalletManager {
    starting_balance: i64,
    wallets: RwLock<HashMap<UserId, Arc<Mutex<WalletCell>>>>,
    next_entry_id: AtomicU64,
}

impl Default for WalletManager {
    fn default() -> Self {
        Self::new(DEFAULT_STARTING_BALANCE)
    }
}

impl WalletManager {
    /// Create a new wallet manager
    ///
    /// # Arguments
    ///
    /// * `starting_balance` - Balance given to a participant on first sight
    ///
    /// # Returns
    ///
    /// * `WalletManager` - New wallet manager instance
    pub fn new(starting_balance: i64) -> Self {
        Self {
            starting_balance: starting_balance.max(0),
            wallets: RwLock::new(HashMap::new()),
            next_entry_id: AtomicU64::new(1),
        }
    }

    pub fn starting_balance(&self) -> i64 {
        self.starting_balance
    }

    async fn cell(&self, user_id: UserId) -> Arc<Mutex<WalletCell>> {
        if let Some(cell) = self.wallets.read().await.get(&user_id) {
            return Arc::clone(cell);
        }
        let mut wallets = self.wallets.write().await;
        let cell = wallets.entry(user_id).or_insert_with(|| {
            let now = Utc::now();
            log::debug!(
                "Opening wallet for user {user_id} with {}",
                self.starting_balance
            );
            Arc::new(Mutex::new(WalletCell {
                wallet: Wallet {
                    user_id,
                    balance: self.starting_balance,
                    created_at: now,
                    updated_at: now,
                },
                entries: Vec::new(),
            }))
        });
        Arc::clone(cell)
    }

    /// Get wallet for a participant that has one
    ///
    /// # Returns
    ///
    /// * `WalletResult<Wallet>` - Wallet information or `WalletNotFound`
    pub async fn get_wallet(&self, user_id: UserId) -> WalletResult<Wallet> {
        let cell = self
            .wallets
            .read()
            .await
            .get(&user_id)
            .cloned()
            .ok_or(WalletError::WalletNotFound(user_id))?;
        let cell = cell.lock().await;
        Ok(cell.wallet.clone())
    }

    /// Apply a signed change and journal it
    ///
    /// # Arguments
    ///
    /// * `user_id` - Participant
    /// * `delta` - Signed change; the result is floored at zero
    /// * `entry_type` - Why the change happened
    ///
    /// # Returns
    ///
    /// * `i64` - New balance
    pub async fn apply(&self, user_id: UserId, delta: i64, entry_type: EntryType) -> i64 {
        let cell = self.cell(user_id).await;
        let mut cell = cell.lock().await;
        let before = cell.wallet.balance;
        let after = before.saturating_add(delta).max(0);
        if after == before {
            return after;
        }

        let now = Utc::now();
        let applied = after - before;
        cell.wallet.balance = after;
        cell.wallet.updated_at = now;
        cell.entries.push(WalletEntry {
            id: self.next_entry_id.fetch_add(1, Ordering::Relaxed),
            user_id,
            amount: applied,
            balance_after: after,
            direction: EntryDirection::of(applied),
            entry_type,
            created_at: now,
        });
        if applied != delta {
            log::warn!("Balance floor hit for user {user_id}: asked {delta}, applied {applied}");
        }
        after
    }

    /// Credit chips outside of play (admin top-up)
    ///
    /// # Returns
    ///
    /// * `WalletResult<i64>` - New balance, or `InvalidAmount` unless positive
    pub async fn grant(&self, user_id: UserId, amount: i64) -> WalletResult<i64> {
        if amount <= 0 {
            return Err(WalletError::InvalidAmount(amount));
        }
        let balance = self.apply(user_id, amount, EntryType::Grant).await;
        log::info!("Granted {amount} to user {user_id}, balance now {balance}");
        Ok(balance)
    }

    /// Journal for a participant, oldest first. Empty when never seen.
    pub async fn entries(&self, user_id: UserId) -> Vec<WalletEntry> {
        let Some(cell) = self.wallets.read().await.get(&user_id).cloned() else {
            return Vec::new();
        };
        let cell = cell.lock().await;
        cell.entries.clone()
    }
}

#[async_trait]
impl Ledger for WalletManager {
    async fn get_balance(&self, user_id: UserId) -> i64 {
        let Some(cell) = self.wallets.read().await.get(&user_id).cloned() else {
            return self.starting_balance;
        };
        let cell = cell.lock().await;
        cell.wallet.balance
    }

    async fn adjust(&self, user_id: UserId, delta: i64) -> i64 {
        self.apply(user_id, delta, EntryType::AdminAdjust).await
    }

    async fn record(&self, user_id: UserId, delta: i64, entry_type: EntryType) -> i64 {
        self.apply(user_id, delta, entry_type).await
    }
}
