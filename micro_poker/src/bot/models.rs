//! House opponent models and configuration.

use crate::game::entities::Action;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr, time::Duration};

/// Playing style, drawn once per hand.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Personality {
    Aggressive,
    Passive,
    Cautious,
}

impl Personality {
    /// Weighted draw over the three personalities.
    pub fn draw<R: Rng>(weights: &PersonalityWeights, rng: &mut R) -> Self {
        let total = weights.total();
        if total <= 0.0 {
            return Self::Passive;
        }
        let mut roll = rng.random_range(0.0..total);
        for (personality, weight) in [
            (Self::Aggressive, weights.aggressive),
            (Self::Passive, weights.passive),
            (Self::Cautious, weights.cautious),
        ] {
            if roll < weight {
                return personality;
            }
            roll -= weight;
        }
        Self::Cautious
    }
}

impl fmt::Display for Personality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Aggressive => "aggressive",
            Self::Passive => "passive",
            Self::Cautious => "cautious",
        };
        write!(f, "{repr}")
    }
}

impl FromStr for Personality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "aggressive" => Ok(Self::Aggressive),
            "passive" => Ok(Self::Passive),
            "cautious" => Ok(Self::Cautious),
            other => Err(format!("unknown personality: {other}")),
        }
    }
}

/// Relative odds of each personality being drawn. They don't need to sum
/// to one.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct PersonalityWeights {
    pub aggressive: f32,
    pub passive: f32,
    pub cautious: f32,
}

impl Default for PersonalityWeights {
    fn default() -> Self {
        Self {
            aggressive: 0.3,
            passive: 0.4,
            cautious: 0.3,
        }
    }
}

impl PersonalityWeights {
    #[must_use]
    pub fn total(&self) -> f32 {
        self.aggressive + self.passive + self.cautious
    }
}

/// Per-personality tendencies
#[derive(Clone, Debug, PartialEq)]
pub struct PersonalityParams {
    /// Chance of raising when facing a bet (and not folding)
    pub raise_probability: f32,

    /// Chance of opening the betting when nothing is owed
    pub open_probability: f32,

    /// Added to the fold probability
    pub fold_bias: f32,

    /// Raise sizes are drawn from 1..=raise_steps min-bet increments
    pub raise_steps: u32,
}

impl PersonalityParams {
    /// Bets and raises often, folds less
    pub fn aggressive() -> Self {
        Self {
            raise_probability: 0.35,
            open_probability: 0.45,
            fold_bias: -0.05,
            raise_steps: 4,
        }
    }

    /// Mostly checks and calls
    pub fn passive() -> Self {
        Self {
            raise_probability: 0.08,
            open_probability: 0.15,
            fold_bias: 0.0,
            raise_steps: 1,
        }
    }

    /// Folds a little more, bets small
    pub fn cautious() -> Self {
        Self {
            raise_probability: 0.15,
            open_probability: 0.25,
            fold_bias: 0.05,
            raise_steps: 2,
        }
    }

    pub fn from_personality(personality: Personality) -> Self {
        match personality {
            Personality::Aggressive => Self::aggressive(),
            Personality::Passive => Self::passive(),
            Personality::Cautious => Self::cautious(),
        }
    }
}

/// What the house has learned about one participant.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct OpponentProfile {
    pub action_count: u32,
    pub all_in_count: u32,
    pub last_action_at: Option<DateTime<Utc>>,
}

impl OpponentProfile {
    pub fn record(&mut self, action: &Action, at: DateTime<Utc>) {
        self.action_count = self.action_count.saturating_add(1);
        if action.is_all_in() {
            self.all_in_count = self.all_in_count.saturating_add(1);
        }
        self.last_action_at = Some(at);
    }

    /// Fraction of observed actions that were all-ins.
    #[must_use]
    pub fn all_in_rate(&self) -> f32 {
        if self.action_count == 0 {
            0.0
        } else {
            self.all_in_count as f32 / self.action_count as f32
        }
    }
}

/// Bounds for the house's simulated thinking pause.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ThinkTime {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl Default for ThinkTime {
    fn default() -> Self {
        Self {
            min_ms: 800,
            max_ms: 2400,
        }
    }
}

impl ThinkTime {
    /// No pause at all.
    pub const INSTANT: Self = Self {
        min_ms: 0,
        max_ms: 0,
    };

    /// Get thinking delay (uniform within bounds)
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Duration {
        if self.max_ms <= self.min_ms {
            return Duration::from_millis(self.min_ms);
        }
        Duration::from_millis(rng.random_range(self.min_ms..=self.max_ms))
    }
}
