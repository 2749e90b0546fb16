//! Wallet data models.

use crate::game::entities::{TransferKind, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Wallet model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    pub user_id: UserId,
    pub balance: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Journal line for one balance change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletEntry {
    pub id: u64,
    pub user_id: UserId,
    /// Signed change actually applied, after flooring at zero
    pub amount: i64,
    pub balance_after: i64,
    pub direction: EntryDirection,
    pub entry_type: EntryType,
    pub created_at: DateTime<Utc>,
}

/// Whether an entry took chips away or added them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryDirection {
    Debit,
    Credit,
}

impl EntryDirection {
    /// Zero counts as a credit; zero changes are never journaled anyway.
    pub fn of(amount: i64) -> Self {
        if amount < 0 {
            Self::Debit
        } else {
            Self::Credit
        }
    }
}

impl fmt::Display for EntryDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Debit => "debit",
            Self::Credit => "credit",
        };
        write!(f, "{repr}")
    }
}

/// Why a balance changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    Blind,
    Bet,
    Payout,
    Refund,
    Grant,
    AdminAdjust,
}

impl From<TransferKind> for EntryType {
    fn from(kind: TransferKind) -> Self {
        match kind {
            TransferKind::Blind => Self::Blind,
            TransferKind::Bet => Self::Bet,
            TransferKind::Payout => Self::Payout,
            TransferKind::Refund => Self::Refund,
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Blind => "blind",
            Self::Bet => "bet",
            Self::Payout => "payout",
            Self::Refund => "refund",
            Self::Grant => "grant",
            Self::AdminAdjust => "admin_adjust",
        };
        write!(f, "{repr}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_follows_sign() {
        assert_eq!(EntryDirection::of(-20), EntryDirection::Debit);
        assert_eq!(EntryDirection::of(35), EntryDirection::Credit);
    }

    #[test]
    fn test_transfer_kinds_map_to_entry_types() {
        assert_eq!(EntryType::from(TransferKind::Blind), EntryType::Blind);
        assert_eq!(EntryType::from(TransferKind::Refund), EntryType::Refund);
        assert_eq!(EntryType::AdminAdjust.to_string(), "admin_adjust");
    }
}
