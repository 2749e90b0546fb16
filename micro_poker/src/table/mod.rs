//! Session registry: one live heads-up hand per participant.
//!
//! This module implements:
//! - TableManager: starts hands, routes actions, plays the house
//! - Lazy and background timeout of idle hands, with full refunds
//! - Table configuration loaded from the environment
//!
//! ## Concurrency
//!
//! Each hand sits behind its own lock. An action that arrives while another
//! action on the same hand is being processed is refused with
//! [`SessionError::HandLocked`] instead of waiting. Hands never block each
//! other.
//!
//! ## Example
//!
//! ```
//! use micro_poker::game::entities::{Action, Stage};
//! use micro_poker::table::{TableConfig, TableManager};
//! use micro_poker::wallet::{Ledger, WalletManager};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let wallets = Arc::new(WalletManager::new(100));
//!     let config = TableConfig {
//!         think_time_min_ms: 0,
//!         think_time_max_ms: 0,
//!         ..TableConfig::default()
//!     };
//!     let manager = TableManager::new(config, wallets.clone()).unwrap();
//!
//!     let view = manager.start(1, 20, Some(2)).await.unwrap();
//!     // Seat 0 is user 1, seat 1 is user 2
//!     let to_act = if view.turn == Some(0) { 1 } else { 2 };
//!     let view = manager.apply_action(to_act, Action::Fold).await.unwrap();
//!     assert_eq!(view.stage, Stage::Folded);
//!     let total = wallets.get_balance(1).await + wallets.get_balance(2).await;
//!     assert_eq!(total, 200);
//! }
//! ```

pub mod config;
pub mod errors;
pub mod manager;

pub use config::{ConfigError, TableConfig};
pub use errors::{SessionError, SessionResult};
pub use manager::{HandId, Opponent, TableManager};
