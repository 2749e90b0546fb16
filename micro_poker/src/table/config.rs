//! Table configuration loaded from defaults or `MP_*` environment variables.

use crate::{
    bot::models::{PersonalityWeights, ThinkTime},
    game::{entities::Chips, state_machine::HandSettings},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Table configuration shared by every hand the registry starts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableConfig {
    /// Balance a participant starts with when the ledger first sees them
    pub starting_balance: i64,

    /// Per-street max round-bet, in big blinds
    pub max_bet_multiplier: u32,

    /// Raises allowed per street
    pub max_raises: u8,

    /// Idle time before a hand is timed out and refunded
    pub action_timeout_secs: u64,

    /// Lower bound of the house's thinking pause
    pub think_time_min_ms: u64,

    /// Upper bound of the house's thinking pause
    pub think_time_max_ms: u64,

    /// Chips the house brings to each hand
    pub house_stack: Chips,

    /// Fixed seed for reproducible shuffles and decisions
    pub rng_seed: Option<u64>,

    /// How often the background sweeper looks for idle hands
    pub sweep_interval_secs: u64,

    pub personality_weights: PersonalityWeights,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            starting_balance: 100,
            max_bet_multiplier: 10,
            max_raises: 3,
            action_timeout_secs: 120,
            think_time_min_ms: 800,
            think_time_max_ms: 2400,
            house_stack: 1000,
            rng_seed: None,
            sweep_interval_secs: 5,
            personality_weights: PersonalityWeights::default(),
        }
    }
}

impl TableConfig {
    /// Load configuration from environment variables, falling back to the
    /// defaults for anything unset or unparsable.
    ///
    /// # Returns
    ///
    /// * `Result<TableConfig, ConfigError>` - Loaded configuration or error
    ///
    /// # Errors
    ///
    /// Returns error if the loaded values don't pass [`TableConfig::validate`]
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            starting_balance: parse_env_or("MP_STARTING_BALANCE", defaults.starting_balance),
            max_bet_multiplier: parse_env_or("MP_MAX_BET_MULTIPLIER", defaults.max_bet_multiplier),
            max_raises: parse_env_or("MP_MAX_RAISES", defaults.max_raises),
            action_timeout_secs: parse_env_or(
                "MP_ACTION_TIMEOUT_SECS",
                defaults.action_timeout_secs,
            ),
            think_time_min_ms: parse_env_or("MP_THINK_TIME_MIN_MS", defaults.think_time_min_ms),
            think_time_max_ms: parse_env_or("MP_THINK_TIME_MAX_MS", defaults.think_time_max_ms),
            house_stack: parse_env_or("MP_HOUSE_STACK", defaults.house_stack),
            rng_seed: std::env::var("MP_RNG_SEED")
                .ok()
                .and_then(|v| v.parse().ok()),
            sweep_interval_secs: parse_env_or(
                "MP_SWEEP_INTERVAL_SECS",
                defaults.sweep_interval_secs,
            ),
            personality_weights: PersonalityWeights {
                aggressive: parse_env_or(
                    "MP_WEIGHT_AGGRESSIVE",
                    defaults.personality_weights.aggressive,
                ),
                passive: parse_env_or("MP_WEIGHT_PASSIVE", defaults.personality_weights.passive),
                cautious: parse_env_or(
                    "MP_WEIGHT_CAUTIOUS",
                    defaults.personality_weights.cautious,
                ),
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.starting_balance < 0 {
            return Err(ConfigError::Invalid {
                var: "MP_STARTING_BALANCE".to_string(),
                reason: "Must not be negative".to_string(),
            });
        }

        if self.max_bet_multiplier == 0 {
            return Err(ConfigError::Invalid {
                var: "MP_MAX_BET_MULTIPLIER".to_string(),
                reason: "Must be at least 1".to_string(),
            });
        }

        if self.action_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                var: "MP_ACTION_TIMEOUT_SECS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.think_time_max_ms < self.think_time_min_ms {
            return Err(ConfigError::Invalid {
                var: "MP_THINK_TIME_MAX_MS".to_string(),
                reason: format!(
                    "Must be at least the minimum ({})",
                    self.think_time_min_ms
                ),
            });
        }

        if self.house_stack == 0 {
            return Err(ConfigError::Invalid {
                var: "MP_HOUSE_STACK".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.sweep_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                var: "MP_SWEEP_INTERVAL_SECS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        let weights = &self.personality_weights;
        let all_finite = [weights.aggressive, weights.passive, weights.cautious]
            .iter()
            .all(|w| w.is_finite() && *w >= 0.0);
        if !all_finite || weights.total() <= 0.0 {
            return Err(ConfigError::Invalid {
                var: "MP_WEIGHT_*".to_string(),
                reason: "Weights must be non-negative with a positive total".to_string(),
            });
        }

        Ok(())
    }

    /// Blinds and limits for a hand played at `wager`.
    pub fn hand_settings(&self, wager: Chips) -> HandSettings {
        HandSettings::for_wager(wager, self.max_bet_multiplier, self.max_raises)
    }

    pub fn action_timeout(&self) -> Duration {
        Duration::from_secs(self.action_timeout_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn think_time(&self) -> ThinkTime {
        ThinkTime {
            min_ms: self.think_time_min_ms,
            max_ms: self.think_time_max_ms,
        }
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_default_config_is_valid() {
        let config = TableConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.starting_balance, 100);
        assert_eq!(config.action_timeout(), Duration::from_secs(120));
        assert_eq!(config.think_time(), ThinkTime::default());
    }

    #[test]
    fn test_hand_settings_from_wager() {
        let config = TableConfig::default();
        let settings = config.hand_settings(10);
        assert_eq!(settings.big_blind, 10);
        assert_eq!(settings.small_blind, 5);
        assert_eq!(settings.max_bet, 100);
        assert_eq!(settings.max_raises, 3);
    }

    #[test]
    fn test_config_validation_think_time_inverted() {
        let config = TableConfig {
            think_time_min_ms: 500,
            think_time_max_ms: 100,
            ..TableConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref var, .. } if var == "MP_THINK_TIME_MAX_MS"));
    }

    #[test]
    fn test_config_validation_weights() {
        let config = TableConfig {
            personality_weights: PersonalityWeights {
                aggressive: 0.0,
                passive: 0.0,
                cautious: 0.0,
            },
            ..TableConfig::default()
        };
        assert!(config.validate().is_err());

        let config = TableConfig {
            personality_weights: PersonalityWeights {
                aggressive: -1.0,
                passive: 2.0,
                cautious: 0.0,
            },
            ..TableConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Invalid {
            var: "MP_HOUSE_STACK".to_string(),
            reason: "Must be greater than 0".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("MP_HOUSE_STACK"));
        assert!(msg.contains("greater than 0"));
    }

    #[test]
    #[serial]
    fn test_from_env_overrides_defaults() {
        // SAFETY: serialized with every other test that touches the environment.
        unsafe {
            std::env::set_var("MP_STARTING_BALANCE", "250");
            std::env::set_var("MP_RNG_SEED", "42");
            std::env::set_var("MP_MAX_RAISES", "not-a-number");
        }
        let config = TableConfig::from_env().unwrap();
        unsafe {
            std::env::remove_var("MP_STARTING_BALANCE");
            std::env::remove_var("MP_RNG_SEED");
            std::env::remove_var("MP_MAX_RAISES");
        }

        assert_eq!(config.starting_balance, 250);
        assert_eq!(config.rng_seed, Some(42));
        assert_eq!(config.max_raises, 3);
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_invalid_values() {
        unsafe {
            std::env::set_var("MP_HOUSE_STACK", "0");
        }
        let result = TableConfig::from_env();
        unsafe {
            std::env::remove_var("MP_HOUSE_STACK");
        }
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }
}
