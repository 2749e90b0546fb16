//! House opponent: a heuristic player the registry seats when a participant
//! plays alone.
//!
//! This module implements:
//! - Personalities (aggressive, passive, cautious) drawn per hand
//! - Stage-based fold odds with pressure and exploitation adjustments
//! - Per-participant profiles of observed actions
//! - Human-like pacing with randomized delays
//!
//! ## Personalities
//!
//! ### Aggressive
//! - Raises 35% of the time it continues
//! - Opens unopened pots 45% of the time
//! - Folds 5 points less often
//!
//! ### Passive
//! - Raises 8% of the time it continues
//! - Opens 15% of the time
//!
//! ### Cautious
//! - Raises 15%, opens 25%
//! - Folds 5 points more often
//!
//! ## Example
//!
//! ```
//! use micro_poker::bot::{OpponentDecisionMaker, Personality, decision::DecisionContext};
//! use micro_poker::game::entities::{Action, Stage};
//! use rand::{SeedableRng, rngs::StdRng};
//!
//! let ctx = DecisionContext {
//!     stage: Stage::Flop,
//!     to_call: 0,
//!     current_bet: 0,
//!     round_bet: 0,
//!     stack: 500,
//!     pot: 40,
//!     min_bet: 20,
//!     max_bet: 200,
//!     raise_count: 0,
//!     max_raises: 3,
//!     opponent_all_in: false,
//! };
//! let mut rng = StdRng::seed_from_u64(1);
//! let action = OpponentDecisionMaker::new().decide(&ctx, Personality::Passive, None, &mut rng);
//! assert!(matches!(action, Action::Check | Action::Bet(_)));
//! ```

pub mod decision;
pub mod models;
pub mod profiles;

pub use decision::OpponentDecisionMaker;
pub use models::{OpponentProfile, Personality, PersonalityWeights, ThinkTime};
pub use profiles::ProfileStore;
