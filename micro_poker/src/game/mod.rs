//! Poker game engine: cards, hand evaluation, and the heads-up betting state
//! machine.

pub mod entities;
pub mod functional;
pub mod state_machine;

pub use state_machine::{Hand, HandError, HandSettings, IllegalAction};
