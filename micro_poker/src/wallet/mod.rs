//! Wallet module providing participant balances with a journal of every
//! change.
//!
//! This module implements:
//! - The [`Ledger`] trait the session registry settles hands against
//! - An in-memory [`WalletManager`] with per-participant locking
//! - Balances floored at zero and admin grants
//!
//! ## Example
//!
//! ```
//! use micro_poker::wallet::{Ledger, WalletManager};
//!
//! #[tokio::main]
//! async fn main() {
//!     let wallets = WalletManager::new(100);
//!     assert_eq!(wallets.get_balance(7).await, 100);
//!     assert_eq!(wallets.adjust(7, -30).await, 70);
//!     assert_eq!(wallets.grant(7, 50).await, Ok(120));
//! }
//! ```

pub mod errors;
pub mod ledger;
pub mod manager;
pub mod models;

pub use errors::{WalletError, WalletResult};
pub use ledger::Ledger;
pub use manager::{DEFAULT_STARTING_BALANCE, WalletManager};
pub use models::{EntryDirection, EntryType, Wallet, WalletEntry};
