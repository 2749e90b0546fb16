//! House decision-making: stage-based fold odds adjusted by personality and by
//! how often the participant shoves.

use super::models::{OpponentProfile, Personality, PersonalityParams};
use crate::game::entities::{Action, Chips, HandView, SeatIndex, Stage};
use rand::Rng;

/// Configuration for the house's fold probability and raise sizing.
///
/// All probabilities are in range [0.0, 1.0].
///
/// # Examples
///
/// ```
/// use micro_poker::bot::decision::DecisionConfig;
///
/// let config = DecisionConfig::default();
/// assert_eq!(config.preflop_fold, 0.10);
/// assert_eq!(config.river_fold, 0.25);
/// ```
#[derive(Debug, Clone)]
pub struct DecisionConfig {
    /// Base chance to fold to a bet before the flop.
    pub preflop_fold: f32,

    /// Base chance to fold to a bet on the flop.
    pub flop_fold: f32,

    /// Base chance to fold to a bet on the turn.
    pub turn_fold: f32,

    /// Base chance to fold to a bet on the river.
    ///
    /// Later streets fold more since calls are worth less information.
    pub river_fold: f32,

    /// Uniform noise (±) added to the base fold chance.
    ///
    /// **Range**: 0.0-0.1 (typical: 0.05)
    pub fold_jitter: f32,

    /// Added when the participant is all-in or capped.
    ///
    /// **Effect**: 0.15 = folds noticeably more against a shove
    pub all_in_pressure: f32,

    /// How much a shove-happy participant reduces folding.
    ///
    /// **Effect**: fold -= all_in_rate * bluff_sensitivity. A participant who
    /// goes all-in on every action cuts the fold chance by 0.5.
    pub bluff_sensitivity: f32,

    /// Profile samples needed before `bluff_sensitivity` applies.
    pub min_profile_actions: u32,

    /// Fold chance never drops below this.
    pub fold_floor: f32,

    /// Fold chance never rises above this.
    pub fold_ceiling: f32,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            // Stage base odds
            preflop_fold: 0.10,
            flop_fold: 0.15,
            turn_fold: 0.20,
            river_fold: 0.25,
            fold_jitter: 0.05,
            // Pressure and exploitation
            all_in_pressure: 0.15,
            bluff_sensitivity: 0.5,
            min_profile_actions: 3,
            // Bounds
            fold_floor: 0.02,
            fold_ceiling: 0.60,
        }
    }
}

/// Context for house decision making
///
/// Everything the house may know about the hand from its own seat.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionContext {
    pub stage: Stage,

    /// Chips owed to match the current bet
    pub to_call: Chips,

    /// Highest round-bet on this street
    pub current_bet: Chips,

    /// Own round-bet on this street
    pub round_bet: Chips,

    /// Own chips behind
    pub stack: Chips,

    pub pot: Chips,
    pub min_bet: Chips,
    pub max_bet: Chips,
    pub raise_count: u8,
    pub max_raises: u8,

    /// Participant is all-in or capped
    pub opponent_all_in: bool,
}

impl DecisionContext {
    /// Build the context for `seat` from a hand snapshot.
    #[must_use]
    pub fn from_view(view: &HandView, seat: SeatIndex) -> Self {
        let own = view.seats.get(seat);
        let other = view.seats.get(1 - seat.min(1));
        Self {
            stage: view.stage,
            to_call: view.amount_to_call(seat),
            current_bet: view.current_bet,
            round_bet: own.map_or(0, |s| s.round_bet),
            stack: own.map_or(0, |s| s.stack),
            pot: view.pot,
            min_bet: view.min_bet,
            max_bet: view.max_bet,
            raise_count: view.raise_count,
            max_raises: view.max_raises,
            opponent_all_in: other.is_some_and(|s| s.all_in || s.capped),
        }
    }

    /// Whether any raise is still possible for this seat.
    #[must_use]
    pub fn can_raise(&self) -> bool {
        self.raise_count < self.max_raises
            && self.current_bet < self.max_bet
            && self.stack > self.to_call
    }
}

/// House decision maker
#[derive(Debug, Clone, Default)]
pub struct OpponentDecisionMaker {
    config: DecisionConfig,
}

impl OpponentDecisionMaker {
    /// Create a new decision maker with default config
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new decision maker with custom config
    pub fn with_config(config: DecisionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DecisionConfig {
        &self.config
    }

    /// Decide the house action.
    ///
    /// # Arguments
    ///
    /// * `ctx` - Decision context for the house seat
    /// * `personality` - Style drawn for this hand
    /// * `profile` - What's known about the participant, if anything
    /// * `rng` - Randomness source
    ///
    /// # Returns
    ///
    /// * `Action` - Always legal for the given context
    pub fn decide<R: Rng>(
        &self,
        ctx: &DecisionContext,
        personality: Personality,
        profile: Option<&OpponentProfile>,
        rng: &mut R,
    ) -> Action {
        let params = PersonalityParams::from_personality(personality);

        if ctx.to_call > 0 {
            let fold = self.fold_probability(ctx, &params, profile, rng);
            if rng.random_bool(f64::from(fold)) {
                return Action::Fold;
            }
            if ctx.can_raise() && rng.random_bool(f64::from(params.raise_probability)) {
                if let Some(target) = self.raise_target(ctx, &params, rng) {
                    return Action::Raise(target);
                }
            }
            return Action::Call;
        }

        if ctx.can_raise() && rng.random_bool(f64::from(params.open_probability)) {
            if let Some(target) = self.raise_target(ctx, &params, rng) {
                // Pre-flop the big blind is already a bet
                return if ctx.current_bet == 0 {
                    Action::Bet(target)
                } else {
                    Action::Raise(target)
                };
            }
        }
        Action::Check
    }

    /// Chance of folding when facing a bet, after stage, personality,
    /// pressure, and profile adjustments. Always within the configured
    /// floor and ceiling.
    pub fn fold_probability<R: Rng>(
        &self,
        ctx: &DecisionContext,
        params: &PersonalityParams,
        profile: Option<&OpponentProfile>,
        rng: &mut R,
    ) -> f32 {
        let config = &self.config;
        let base = match ctx.stage {
            Stage::PreFlop => config.preflop_fold,
            Stage::Flop => config.flop_fold,
            Stage::Turn => config.turn_fold,
            _ => config.river_fold,
        };
        let jitter = if config.fold_jitter > 0.0 {
            rng.random_range(-config.fold_jitter..=config.fold_jitter)
        } else {
            0.0
        };

        let mut fold = base + jitter + params.fold_bias;
        if ctx.opponent_all_in {
            fold += config.all_in_pressure;
        }
        if let Some(profile) = profile.filter(|p| p.action_count >= config.min_profile_actions) {
            fold -= profile.all_in_rate() * config.bluff_sensitivity;
        }
        fold.clamp(config.fold_floor, config.fold_ceiling)
    }

    /// Pick a "raise to" amount between the minimum raise and the smaller of
    /// the table max, the stack, and the personality's step limit.
    fn raise_target<R: Rng>(
        &self,
        ctx: &DecisionContext,
        params: &PersonalityParams,
        rng: &mut R,
    ) -> Option<Chips> {
        let floor = ctx.current_bet.saturating_add(ctx.min_bet).min(ctx.max_bet);
        let reach = ctx
            .current_bet
            .saturating_add(ctx.min_bet.saturating_mul(params.raise_steps.max(1)));
        let ceiling = ctx
            .max_bet
            .min(ctx.round_bet.saturating_add(ctx.stack))
            .min(reach.max(floor));
        if floor <= ctx.current_bet || ceiling < floor {
            return None;
        }
        Some(rng.random_range(floor..=ceiling))
    }
}
