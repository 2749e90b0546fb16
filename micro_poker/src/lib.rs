//! # Micro Poker
//!
//! A heads-up Texas Hold'em engine for small wagers, played between two
//! participants or against a heuristic house opponent.
//!
//! Every chip movement a hand causes is reported as a signed transfer so the
//! session registry can mirror it into a balance ledger as it happens. A hand
//! that times out or can't finish refunds both seats in full.
//!
//! ## Stages
//!
//! - **PreFlop**: Blinds posted, two hole cards each
//! - **Flop/Turn/River**: Board dealt 3, 1, and 1 cards
//! - **Showdown**: Best five of seven wins, ties split
//! - **Folded/TimedOut/Aborted**: Hand ended early
//!
//! ## Core Modules
//!
//! - [`game`]: Cards, hand evaluation, and the betting state machine
//! - [`bot`]: House opponent decisions and participant profiles
//! - [`wallet`]: Balance ledger with a journal of every change
//! - [`table`]: Session registry tying hands to participants and the ledger
//!
//! ## Example
//!
//! ```
//! use micro_poker::{Hand, HandSettings};
//! use micro_poker::game::entities::{SeatOwner, Stage};
//! use rand::{SeedableRng, rngs::StdRng};
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let (hand, outcome) = Hand::new(
//!     HandSettings::default(),
//!     [SeatOwner::Player(1), SeatOwner::House],
//!     [500, 1000],
//!     &mut rng,
//! )
//! .unwrap();
//! assert_eq!(hand.stage(), Stage::PreFlop);
//! assert_eq!(hand.pot(), 30);
//! assert_eq!(outcome.transfers.len(), 2);
//! ```

/// House opponent decisions and participant profiles.
pub mod bot;

/// Core game logic, entities, and state machine.
pub mod game;
pub use game::{Hand, HandError, HandSettings, IllegalAction, entities, functional};

/// Session registry.
pub mod table;
pub use table::{SessionError, TableConfig, TableManager};

/// Participant balances.
pub mod wallet;
pub use wallet::{Ledger, WalletManager};
