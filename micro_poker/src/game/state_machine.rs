//! Heads-up betting state machine.
//!
//! A [`Hand`] moves through PreFlop, Flop, Turn, and River and ends in one of
//! the terminal stages. Every accepted action returns an [`ActionOutcome`]
//! listing the chip movements it caused so callers can mirror them into a
//! ledger.

use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use thiserror::Error;

use super::{
    entities::{
        Action, ActionChoice, ActionChoices, ActionOutcome, Card, Chips, Deck, HandEvent,
        HandRank, HandResult, HandView, MAX_STACK, Seat, SeatIndex, SeatOwner, SeatView, Stage,
        Transfer, TransferKind,
    },
    functional::{best_of, compare},
};

/// Why an action was refused. The hand is unchanged when one of these is
/// returned.
#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum IllegalAction {
    #[error("can't check facing ${to_call}")]
    CannotCheck { to_call: Chips },
    #[error("nothing to call")]
    NothingToCall,
    #[error("raise to ${amount} is below the minimum of ${minimum}")]
    BelowMinimum { amount: Chips, minimum: Chips },
    #[error("raise to ${amount} is above the table max of ${cap}")]
    AboveCap { amount: Chips, cap: Chips },
    #[error("only {max_raises} raises allowed per street")]
    RaiseCapReached { max_raises: u8 },
    #[error("need ${required} but only ${available} behind")]
    InsufficientFunds { available: Chips, required: Chips },
    #[error("can't bet into ${current_bet}; raise instead")]
    NotABet { current_bet: Chips },
}

#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum HandError {
    #[error("not your turn")]
    NotYourTurn,
    #[error("hand is over")]
    HandOver,
    #[error("deck exhausted mid-hand")]
    DeckExhausted,
    #[error("invalid seat {0}")]
    InvalidSeat(SeatIndex),
    #[error("stack of ${stack} is above the limit of ${limit}")]
    StackTooLarge { stack: Chips, limit: Chips },
    #[error(transparent)]
    Illegal(#[from] IllegalAction),
}

/// Betting limits for a single hand.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct HandSettings {
    pub small_blind: Chips,
    pub big_blind: Chips,
    /// Smallest raise increment over the current bet.
    pub min_bet: Chips,
    /// Largest round-bet a seat may reach on one street.
    pub max_bet: Chips,
    pub max_raises: u8,
}

impl Default for HandSettings {
    fn default() -> Self {
        Self::for_wager(20, 10, 3)
    }
}

impl HandSettings {
    /// Derive blinds and bet limits from a wager. The wager is the big blind,
    /// the small blind is half of it (at least 1), and the per-street max is
    /// `max_bet_multiplier` big blinds.
    #[must_use]
    pub fn for_wager(wager: Chips, max_bet_multiplier: u32, max_raises: u8) -> Self {
        Self {
            small_blind: (wager / 2).max(1),
            big_blind: wager,
            min_bet: wager,
            max_bet: wager.saturating_mul(max_bet_multiplier),
            max_raises,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.small_blind == 0 {
            return Err("small_blind must be > 0".to_string());
        }
        if self.big_blind < self.small_blind {
            return Err("big_blind must be >= small_blind".to_string());
        }
        if self.min_bet == 0 {
            return Err("min_bet must be > 0".to_string());
        }
        if self.max_bet < self.big_blind || self.max_bet < self.min_bet {
            return Err("max_bet must cover the big blind and min_bet".to_string());
        }
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct Hand {
    deck: Deck,
    board: Vec<Card>,
    seats: [Seat; 2],
    stage: Stage,
    current_bet: Chips,
    raise_count: u8,
    settings: HandSettings,
    pot: Chips,
    small_blind_idx: SeatIndex,
    big_blind_idx: SeatIndex,
    turn: Option<SeatIndex>,
    awaiting_call: Option<SeatIndex>,
    result: Option<HandResult>,
}

impl Hand {
    /// Shuffle a fresh deck, pick the small blind at random, deal, and post
    /// blinds.
    ///
    /// # Arguments
    ///
    /// * `settings` - Blinds and bet limits
    /// * `owners` - Who sits in seat 0 and seat 1
    /// * `stacks` - Chips each seat brings to the hand
    /// * `rng` - Source of randomness for the shuffle and the button
    ///
    /// # Returns
    ///
    /// * The new hand and the blind postings it caused
    pub fn new<R: Rng>(
        settings: HandSettings,
        owners: [SeatOwner; 2],
        stacks: [Chips; 2],
        rng: &mut R,
    ) -> Result<(Self, ActionOutcome), HandError> {
        let mut deck = Deck::default();
        deck.shuffle(rng);
        let small_blind_idx = rng.random_range(0..2);
        Self::with_deck(settings, owners, stacks, deck, small_blind_idx)
    }

    /// Start a hand from an arranged deck. Hole cards go to seat 0 (two
    /// draws) then seat 1 (two draws); the board follows in draw order.
    pub fn with_deck(
        settings: HandSettings,
        owners: [SeatOwner; 2],
        stacks: [Chips; 2],
        mut deck: Deck,
        small_blind_idx: SeatIndex,
    ) -> Result<(Self, ActionOutcome), HandError> {
        if small_blind_idx > 1 {
            return Err(HandError::InvalidSeat(small_blind_idx));
        }
        if let Some(&stack) = stacks.iter().find(|&&stack| stack > MAX_STACK) {
            return Err(HandError::StackTooLarge {
                stack,
                limit: MAX_STACK,
            });
        }
        let mut seats = [
            Seat::new(owners[0], stacks[0]),
            Seat::new(owners[1], stacks[1]),
        ];
        for seat in &mut seats {
            for _ in 0..2 {
                seat.cards.push(deck.draw()?);
            }
        }

        let mut hand = Self {
            deck,
            board: Vec::with_capacity(5),
            seats,
            stage: Stage::PreFlop,
            current_bet: 0,
            raise_count: 0,
            settings,
            pot: 0,
            small_blind_idx,
            big_blind_idx: 1 - small_blind_idx,
            turn: None,
            awaiting_call: None,
            result: None,
        };

        let mut outcome = ActionOutcome::default();
        hand.post_blind(small_blind_idx, hand.settings.small_blind, &mut outcome);
        hand.post_blind(hand.big_blind_idx, hand.settings.big_blind, &mut outcome);
        hand.current_bet = hand.max_round_bet();
        hand.refresh_awaiting_call();
        hand.progress(None, &mut outcome)?;
        Ok((hand, outcome))
    }

    /// Apply an action for `seat`. Nothing changes if an error is returned.
    pub fn apply(&mut self, seat: SeatIndex, action: Action) -> Result<ActionOutcome, HandError> {
        let mut next = self.clone();
        let outcome = next.apply_in_place(seat, action)?;
        *self = next;
        Ok(outcome)
    }

    fn apply_in_place(
        &mut self,
        seat: SeatIndex,
        action: Action,
    ) -> Result<ActionOutcome, HandError> {
        if self.stage.is_terminal() {
            return Err(HandError::HandOver);
        }
        if seat > 1 {
            return Err(HandError::InvalidSeat(seat));
        }
        if self.turn != Some(seat) {
            return Err(HandError::NotYourTurn);
        }

        let mut outcome = ActionOutcome::default();
        let to_call = self.amount_to_call(seat);
        match action {
            Action::Fold => {
                outcome.events.push(HandEvent::Acted { seat, action });
                self.seats[seat].acted = true;
                self.fold(seat, &mut outcome);
                return Ok(outcome);
            }
            Action::Check => {
                if to_call > 0 {
                    return Err(IllegalAction::CannotCheck { to_call }.into());
                }
            }
            Action::Call => {
                if to_call == 0 {
                    return Err(IllegalAction::NothingToCall.into());
                }
                let amount = to_call.min(self.seats[seat].stack);
                self.commit(seat, amount, TransferKind::Bet, &mut outcome);
                if self.seats[seat].stack == 0 {
                    self.seats[seat].all_in = true;
                }
            }
            Action::Bet(target) => {
                if self.current_bet > 0 {
                    return Err(IllegalAction::NotABet {
                        current_bet: self.current_bet,
                    }
                    .into());
                }
                self.raise_to(seat, target, &mut outcome)?;
            }
            Action::Raise(target) => self.raise_to(seat, target, &mut outcome)?,
            Action::AllIn => self.all_in(seat, &mut outcome)?,
        }

        self.seats[seat].acted = true;
        self.current_bet = self.max_round_bet();
        self.refresh_awaiting_call();
        debug!(
            "seat {seat} {action} (pot ${}, current bet ${})",
            self.pot, self.current_bet
        );
        outcome.events.push(HandEvent::Acted { seat, action });
        self.progress(Some(seat), &mut outcome)?;
        debug_assert_eq!(
            self.pot,
            self.seats.iter().map(|s| s.total_bet).sum::<Chips>()
        );
        Ok(outcome)
    }

    fn raise_to(
        &mut self,
        seat: SeatIndex,
        target: Chips,
        outcome: &mut ActionOutcome,
    ) -> Result<(), HandError> {
        let max_bet = self.settings.max_bet;
        if self.raise_count >= self.settings.max_raises {
            return Err(IllegalAction::RaiseCapReached {
                max_raises: self.settings.max_raises,
            }
            .into());
        }
        if target > max_bet || self.current_bet >= max_bet {
            return Err(IllegalAction::AboveCap {
                amount: target,
                cap: max_bet,
            }
            .into());
        }
        let minimum = self.current_bet.saturating_add(self.settings.min_bet).min(max_bet);
        if target < minimum {
            return Err(IllegalAction::BelowMinimum {
                amount: target,
                minimum,
            }
            .into());
        }
        let required = target - self.seats[seat].round_bet;
        let available = self.seats[seat].stack;
        if required > available {
            return Err(IllegalAction::InsufficientFunds {
                available,
                required,
            }
            .into());
        }

        self.commit(seat, required, TransferKind::Bet, outcome);
        self.raise_count += 1;
        let seat = &mut self.seats[seat];
        if seat.stack == 0 {
            seat.all_in = true;
        } else if target == max_bet {
            seat.capped = true;
        }
        Ok(())
    }

    /// Commit the whole stack, limited to the table max. A seat that hits
    /// the max with chips left behind is capped rather than all-in. Going
    /// above the current bet counts as a raise, even when short of the
    /// minimum raise.
    fn all_in(&mut self, seat: SeatIndex, outcome: &mut ActionOutcome) -> Result<(), HandError> {
        let Seat {
            stack, round_bet, ..
        } = self.seats[seat];
        if stack == 0 {
            return Err(IllegalAction::InsufficientFunds {
                available: 0,
                required: self.amount_to_call(seat).max(1),
            }
            .into());
        }
        let max_bet = self.settings.max_bet;
        let full = round_bet + stack;
        let (target, capped) = if full > max_bet {
            (max_bet, true)
        } else {
            (full, false)
        };
        if target > self.current_bet {
            if self.raise_count >= self.settings.max_raises {
                return Err(IllegalAction::RaiseCapReached {
                    max_raises: self.settings.max_raises,
                }
                .into());
            }
            self.raise_count += 1;
        }

        self.commit(
            seat,
            target.saturating_sub(round_bet),
            TransferKind::Bet,
            outcome,
        );
        let seat = &mut self.seats[seat];
        if capped {
            seat.capped = true;
        } else {
            seat.all_in = true;
        }
        Ok(())
    }

    fn post_blind(&mut self, seat: SeatIndex, blind: Chips, outcome: &mut ActionOutcome) {
        let amount = blind.min(self.seats[seat].stack);
        self.commit(seat, amount, TransferKind::Blind, outcome);
        if self.seats[seat].stack == 0 {
            self.seats[seat].all_in = true;
        }
        outcome
            .events
            .push(HandEvent::BlindPosted { seat, amount });
    }

    fn commit(
        &mut self,
        seat_idx: SeatIndex,
        amount: Chips,
        kind: TransferKind,
        outcome: &mut ActionOutcome,
    ) {
        if amount == 0 {
            return;
        }
        let seat = &mut self.seats[seat_idx];
        seat.stack -= amount;
        seat.round_bet += amount;
        seat.total_bet += amount;
        self.pot += amount;
        outcome.transfers.push(Transfer {
            seat: seat_idx,
            owner: seat.owner,
            amount: -i64::from(amount),
            kind,
        });
    }

    fn credit(
        &mut self,
        seat_idx: SeatIndex,
        amount: Chips,
        kind: TransferKind,
        outcome: &mut ActionOutcome,
    ) {
        if amount == 0 {
            return;
        }
        let seat = &mut self.seats[seat_idx];
        seat.stack += amount;
        outcome.transfers.push(Transfer {
            seat: seat_idx,
            owner: seat.owner,
            amount: i64::from(amount),
            kind,
        });
    }

    /// Close the street if betting is done, otherwise hand the turn to the
    /// next seat that can still act.
    fn progress(
        &mut self,
        last_actor: Option<SeatIndex>,
        outcome: &mut ActionOutcome,
    ) -> Result<(), HandError> {
        if self.street_complete() {
            return self.close_street(outcome);
        }
        let order = match last_actor {
            Some(actor) => [1 - actor, actor],
            None => [self.first_to_act(), 1 - self.first_to_act()],
        };
        self.turn = order.into_iter().find(|&i| !self.seats[i].is_settled());
        if self.turn.is_none() {
            return self.close_street(outcome);
        }
        Ok(())
    }

    fn first_to_act(&self) -> SeatIndex {
        match self.stage {
            Stage::PreFlop => self.small_blind_idx,
            _ => self.big_blind_idx,
        }
    }

    fn street_complete(&self) -> bool {
        let [a, b] = &self.seats;
        match (a.is_settled(), b.is_settled()) {
            (true, true) => true,
            (true, false) => b.round_bet >= a.round_bet,
            (false, true) => a.round_bet >= b.round_bet,
            (false, false) => a.acted && b.acted && a.round_bet == b.round_bet,
        }
    }

    fn close_street(&mut self, outcome: &mut ActionOutcome) -> Result<(), HandError> {
        self.return_uncalled(outcome);
        self.turn = None;
        self.awaiting_call = None;
        for seat in &mut self.seats {
            seat.reset_street();
        }
        self.current_bet = 0;
        self.raise_count = 0;

        if self.seats.iter().any(|s| s.all_in) {
            while let Some(next) = self.stage.next_street() {
                self.deal_street(next, outcome)?;
            }
            return self.showdown(outcome);
        }

        match self.stage.next_street() {
            Some(next) => {
                self.deal_street(next, outcome)?;
                self.turn = Some(self.first_to_act());
                Ok(())
            }
            None => self.showdown(outcome),
        }
    }

    /// Give back the part of a round-bet the other seat couldn't match.
    fn return_uncalled(&mut self, outcome: &mut ActionOutcome) {
        let (hi, lo) = if self.seats[0].round_bet >= self.seats[1].round_bet {
            (0, 1)
        } else {
            (1, 0)
        };
        let excess = self.seats[hi].round_bet - self.seats[lo].round_bet;
        if excess == 0 {
            return;
        }
        let seat = &mut self.seats[hi];
        seat.round_bet -= excess;
        seat.total_bet -= excess;
        self.pot -= excess;
        self.credit(hi, excess, TransferKind::Refund, outcome);
        if self.seats[hi].stack > 0 {
            self.seats[hi].all_in = false;
        }
        self.current_bet = self.seats[lo].round_bet;
        outcome.events.push(HandEvent::Refunded {
            seat: hi,
            amount: excess,
        });
    }

    fn deal_street(&mut self, stage: Stage, outcome: &mut ActionOutcome) -> Result<(), HandError> {
        let cards = (0..stage.cards_dealt())
            .map(|_| self.deck.draw())
            .collect::<Result<Vec<_>, _>>()?;
        self.board.extend(&cards);
        self.stage = stage;
        debug!("dealt {stage}: {} cards left", self.deck.remaining());
        outcome
            .events
            .push(HandEvent::StreetDealt { stage, cards });
        Ok(())
    }

    fn best_rank(&self, seat: SeatIndex) -> Result<HandRank, HandError> {
        let cards: Vec<Card> = self.seats[seat]
            .cards
            .iter()
            .chain(&self.board)
            .copied()
            .collect();
        best_of(&cards).ok_or(HandError::DeckExhausted)
    }

    fn showdown(&mut self, outcome: &mut ActionOutcome) -> Result<(), HandError> {
        let ranks = [self.best_rank(0)?, self.best_rank(1)?];
        let pot = self.pot;
        let payouts = match compare(&ranks[0], &ranks[1]) {
            Ordering::Greater => [pot, 0],
            Ordering::Less => [0, pot],
            // Odd chip goes to seat 1.
            Ordering::Equal => [pot / 2, pot - pot / 2],
        };
        for (seat, &amount) in payouts.iter().enumerate() {
            if amount > 0 {
                self.credit(seat, amount, TransferKind::Payout, outcome);
                outcome.events.push(HandEvent::Won { seat, amount });
            }
        }
        self.stage = Stage::Showdown;
        self.turn = None;
        self.result = Some(HandResult::Showdown { ranks, payouts });
        Ok(())
    }

    fn fold(&mut self, seat: SeatIndex, outcome: &mut ActionOutcome) {
        let winner = 1 - seat;
        let payout = self.pot;
        self.credit(winner, payout, TransferKind::Payout, outcome);
        outcome.events.push(HandEvent::Won {
            seat: winner,
            amount: payout,
        });
        self.stage = Stage::Folded;
        self.turn = None;
        self.awaiting_call = None;
        self.result = Some(HandResult::Fold { winner, payout });
    }

    fn refund_all(&mut self, stage: Stage) -> ActionOutcome {
        let mut outcome = ActionOutcome::default();
        if self.stage.is_terminal() {
            return outcome;
        }
        let refunds = [self.seats[0].total_bet, self.seats[1].total_bet];
        for (seat, &amount) in refunds.iter().enumerate() {
            if amount > 0 {
                self.credit(seat, amount, TransferKind::Refund, &mut outcome);
                outcome.events.push(HandEvent::Refunded { seat, amount });
            }
        }
        outcome.events.push(match stage {
            Stage::TimedOut => HandEvent::TimedOut,
            _ => HandEvent::Aborted,
        });
        self.stage = stage;
        self.turn = None;
        self.awaiting_call = None;
        self.result = Some(HandResult::Refunded { refunds });
        outcome
    }

    /// End the hand because the seat to act never did. Both seats get back
    /// everything they put in. Does nothing if the hand is already over.
    pub fn time_out(&mut self) -> ActionOutcome {
        self.refund_all(Stage::TimedOut)
    }

    /// End the hand without a winner and refund both seats.
    pub fn abort(&mut self) -> ActionOutcome {
        self.refund_all(Stage::Aborted)
    }

    /// Legal actions for `seat` right now. Empty when it isn't their turn.
    #[must_use]
    pub fn action_choices(&self, seat: SeatIndex) -> ActionChoices {
        if self.stage.is_terminal() || self.turn != Some(seat) || seat > 1 {
            return ActionChoices::default();
        }
        let s = &self.seats[seat];
        let HandSettings {
            min_bet,
            max_bet,
            max_raises,
            ..
        } = self.settings;
        let to_call = self.amount_to_call(seat);

        let mut choices = vec![ActionChoice::Fold];
        if to_call == 0 {
            choices.push(ActionChoice::Check);
        } else {
            choices.push(ActionChoice::Call(to_call.min(s.stack)));
        }

        let raises_left = self.raise_count < max_raises;
        if raises_left && self.current_bet < max_bet {
            let min = self.current_bet.saturating_add(min_bet).min(max_bet);
            let max = max_bet.min(s.round_bet + s.stack);
            if max >= min {
                choices.push(ActionChoice::Raise { min, max });
            }
        }

        let all_in_target = (s.round_bet + s.stack).min(max_bet);
        if s.stack > 0 && (raises_left || all_in_target <= self.current_bet) {
            choices.push(ActionChoice::AllIn(
                all_in_target.saturating_sub(s.round_bet),
            ));
        }
        ActionChoices::from(choices)
    }

    #[must_use]
    pub fn amount_to_call(&self, seat: SeatIndex) -> Chips {
        self.seats
            .get(seat)
            .map_or(0, |s| self.current_bet.saturating_sub(s.round_bet))
    }

    /// Snapshot of the hand as `viewer` may see it. The opponent's hole
    /// cards are only revealed at showdown; `None` sees no hole cards until
    /// then.
    #[must_use]
    pub fn view(&self, viewer: Option<SeatIndex>) -> HandView {
        let reveal_all = self.stage == Stage::Showdown;
        let seats = self
            .seats
            .iter()
            .enumerate()
            .map(|(i, seat)| {
                let visible = reveal_all || viewer == Some(i);
                SeatView {
                    owner: seat.owner,
                    cards: if visible {
                        seat.cards.clone()
                    } else {
                        Vec::new()
                    },
                    hidden: !visible,
                    stack: seat.stack,
                    round_bet: seat.round_bet,
                    total_bet: seat.total_bet,
                    all_in: seat.all_in,
                    capped: seat.capped,
                }
            })
            .collect();
        HandView {
            hand_id: None,
            viewer,
            stage: self.stage,
            board: self.board.clone(),
            seats,
            pot: self.pot,
            current_bet: self.current_bet,
            min_bet: self.settings.min_bet,
            max_bet: self.settings.max_bet,
            raise_count: self.raise_count,
            max_raises: self.settings.max_raises,
            turn: self.turn,
            result: self.result.clone(),
            status: self.status(),
        }
    }

    fn status(&self) -> String {
        match (&self.result, self.turn) {
            (Some(HandResult::Showdown { ranks, payouts }), _) => {
                if ranks[0] == ranks[1] {
                    format!(
                        "Split pot: both show {}, ${} and ${}",
                        ranks[0], payouts[0], payouts[1]
                    )
                } else {
                    let winner = usize::from(payouts[1] > payouts[0]);
                    format!(
                        "{} wins ${} with {}",
                        self.seats[winner].owner, self.pot, ranks[winner]
                    )
                }
            }
            (Some(HandResult::Fold { winner, payout }), _) => format!(
                "{} folds; {} wins ${payout}",
                self.seats[1 - winner].owner,
                self.seats[*winner].owner
            ),
            (Some(HandResult::Refunded { .. }), _) => match self.stage {
                Stage::TimedOut => "Hand timed out; bets refunded".to_string(),
                _ => "Hand aborted; bets refunded".to_string(),
            },
            (None, Some(seat)) => match self.amount_to_call(seat) {
                0 => format!("{}: {} to act", self.stage, self.seats[seat].owner),
                to_call => format!(
                    "{}: {} to act, ${to_call} to call",
                    self.stage, self.seats[seat].owner
                ),
            },
            (None, None) => self.stage.to_string(),
        }
    }

    fn max_round_bet(&self) -> Chips {
        self.seats[0].round_bet.max(self.seats[1].round_bet)
    }

    fn refresh_awaiting_call(&mut self) {
        self.awaiting_call = (0..2).find(|&i| {
            let seat = &self.seats[i];
            !seat.is_settled() && seat.round_bet < self.current_bet
        });
    }

    #[must_use]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    #[must_use]
    pub fn board(&self) -> &[Card] {
        &self.board
    }

    #[must_use]
    pub fn seats(&self) -> &[Seat; 2] {
        &self.seats
    }

    #[must_use]
    pub fn seat(&self, seat: SeatIndex) -> Option<&Seat> {
        self.seats.get(seat)
    }

    #[must_use]
    pub fn seat_of(&self, owner: SeatOwner) -> Option<SeatIndex> {
        self.seats.iter().position(|s| s.owner == owner)
    }

    #[must_use]
    pub fn pot(&self) -> Chips {
        self.pot
    }

    #[must_use]
    pub fn current_bet(&self) -> Chips {
        self.current_bet
    }

    #[must_use]
    pub fn raise_count(&self) -> u8 {
        self.raise_count
    }

    #[must_use]
    pub fn settings(&self) -> &HandSettings {
        &self.settings
    }

    #[must_use]
    pub fn turn(&self) -> Option<SeatIndex> {
        self.turn
    }

    #[must_use]
    pub fn awaiting_call(&self) -> Option<SeatIndex> {
        self.awaiting_call
    }

    #[must_use]
    pub fn small_blind_idx(&self) -> SeatIndex {
        self.small_blind_idx
    }

    #[must_use]
    pub fn big_blind_idx(&self) -> SeatIndex {
        self.big_blind_idx
    }

    #[must_use]
    pub fn result(&self) -> Option<&HandResult> {
        self.result.as_ref()
    }

    #[must_use]
    pub fn deck_remaining(&self) -> usize {
        self.deck.remaining()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entities::{ACE, KING, Suit};
    use rand::{SeedableRng, rngs::StdRng};

    const ALICE: SeatOwner = SeatOwner::Player(1);
    const BOB: SeatOwner = SeatOwner::Player(2);

    /// Seat 0 holds aces, seat 1 holds seven-deuce, dry board.
    fn aces_vs_rags() -> Deck {
        Deck::from_cards(vec![
            Card(ACE, Suit::Spade),
            Card(ACE, Suit::Heart),
            Card(7, Suit::Club),
            Card(2, Suit::Diamond),
            Card(KING, Suit::Spade),
            Card(9, Suit::Diamond),
            Card(4, Suit::Club),
            Card(3, Suit::Heart),
            Card(11, Suit::Spade),
        ])
    }

    fn new_hand(stacks: [Chips; 2]) -> Hand {
        let (hand, _) = Hand::with_deck(
            HandSettings::default(),
            [ALICE, BOB],
            stacks,
            aces_vs_rags(),
            0,
        )
        .unwrap();
        hand
    }

    #[test]
    fn test_settings_for_wager() {
        let settings = HandSettings::for_wager(20, 10, 3);
        assert_eq!(settings.small_blind, 10);
        assert_eq!(settings.big_blind, 20);
        assert_eq!(settings.min_bet, 20);
        assert_eq!(settings.max_bet, 200);
        assert!(settings.validate().is_ok());

        let tiny = HandSettings::for_wager(1, 10, 3);
        assert_eq!(tiny.small_blind, 1);
        assert!(tiny.validate().is_ok());
    }

    #[test]
    fn test_settings_validation_rejects_bad_limits() {
        let mut settings = HandSettings::default();
        settings.max_bet = 10;
        assert!(settings.validate().is_err());

        let mut settings = HandSettings::default();
        settings.min_bet = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_stacks_above_the_limit_are_refused() {
        let mut rng = StdRng::seed_from_u64(5);
        let result = Hand::new(
            HandSettings::for_wager(3_000_000_000, 10, 3),
            [ALICE, BOB],
            [Chips::MAX, Chips::MAX],
            &mut rng,
        );
        assert_eq!(
            result.map(|_| ()),
            Err(HandError::StackTooLarge {
                stack: Chips::MAX,
                limit: MAX_STACK,
            })
        );
    }

    #[test]
    fn test_all_in_at_the_stack_limit_keeps_the_pot_whole() {
        let settings = HandSettings::for_wager(1_500_000_000, 10, 3);
        assert_eq!(settings.max_bet, Chips::MAX);
        let (mut hand, _) = Hand::with_deck(
            settings,
            [ALICE, BOB],
            [MAX_STACK, MAX_STACK],
            aces_vs_rags(),
            0,
        )
        .unwrap();

        let choices = hand.action_choices(0);
        assert!(!choices.is_empty());
        hand.apply(0, Action::AllIn).unwrap();
        hand.apply(1, Action::Call).unwrap();

        assert_eq!(hand.stage(), Stage::Showdown);
        assert_eq!(hand.pot(), MAX_STACK * 2);
        match hand.result() {
            Some(HandResult::Showdown { payouts, .. }) => {
                assert_eq!(payouts, &[MAX_STACK * 2, 0]);
            }
            other => panic!("unexpected result {other:?}"),
        }
        assert_eq!(hand.seats()[0].stack, MAX_STACK * 2);
    }

    #[test]
    fn test_new_hand_posts_blinds() {
        let mut rng = StdRng::seed_from_u64(3);
        let (hand, outcome) =
            Hand::new(HandSettings::default(), [ALICE, BOB], [500, 500], &mut rng).unwrap();
        let sb = hand.small_blind_idx();
        assert_eq!(hand.stage(), Stage::PreFlop);
        assert_eq!(hand.turn(), Some(sb));
        assert_eq!(hand.current_bet(), 20);
        assert_eq!(hand.pot(), 30);
        assert_eq!(hand.seats()[sb].round_bet, 10);
        assert_eq!(hand.seats()[1 - sb].round_bet, 20);
        assert_eq!(hand.deck_remaining(), 48);
        assert_eq!(outcome.transfers.len(), 2);
        assert_eq!(hand.awaiting_call(), Some(sb));
    }

    #[test]
    fn test_rejected_action_leaves_hand_unchanged() {
        let mut hand = new_hand([500, 500]);
        let before = hand.view(Some(0));
        assert_eq!(
            hand.apply(0, Action::Check),
            Err(HandError::Illegal(IllegalAction::CannotCheck { to_call: 10 }))
        );
        assert_eq!(
            hand.apply(0, Action::Raise(25)),
            Err(HandError::Illegal(IllegalAction::BelowMinimum {
                amount: 25,
                minimum: 40
            }))
        );
        assert_eq!(
            hand.apply(0, Action::Raise(500)),
            Err(HandError::Illegal(IllegalAction::AboveCap {
                amount: 500,
                cap: 200
            }))
        );
        assert_eq!(hand.apply(1, Action::Call), Err(HandError::NotYourTurn));
        assert_eq!(hand.view(Some(0)), before);
    }

    #[test]
    fn test_bet_into_open_bet_is_rejected() {
        let mut hand = new_hand([500, 500]);
        assert_eq!(
            hand.apply(0, Action::Bet(40)),
            Err(HandError::Illegal(IllegalAction::NotABet { current_bet: 20 }))
        );
    }

    #[test]
    fn test_raise_beyond_stack_is_insufficient() {
        let mut hand = new_hand([60, 500]);
        assert_eq!(
            hand.apply(0, Action::Raise(100)),
            Err(HandError::Illegal(IllegalAction::InsufficientFunds {
                available: 50,
                required: 90
            }))
        );
    }

    #[test]
    fn test_big_blind_gets_option() {
        let mut hand = new_hand([500, 500]);
        hand.apply(0, Action::Call).unwrap();
        assert_eq!(hand.stage(), Stage::PreFlop);
        assert_eq!(hand.turn(), Some(1));
        let choices = hand.action_choices(1);
        assert!(choices.contains(&Action::Check));
        assert!(!choices.contains(&Action::Call));

        let outcome = hand.apply(1, Action::Check).unwrap();
        assert_eq!(hand.stage(), Stage::Flop);
        assert_eq!(hand.board().len(), 3);
        assert_eq!(hand.turn(), Some(1));
        assert_eq!(hand.current_bet(), 0);
        assert!(
            outcome
                .events
                .iter()
                .any(|e| matches!(e, HandEvent::StreetDealt { stage: Stage::Flop, .. }))
        );
    }

    #[test]
    fn test_check_down_to_showdown() {
        let mut hand = new_hand([500, 500]);
        hand.apply(0, Action::Call).unwrap();
        hand.apply(1, Action::Check).unwrap();
        for _ in 0..3 {
            hand.apply(1, Action::Check).unwrap();
            hand.apply(0, Action::Check).unwrap();
        }
        assert_eq!(hand.stage(), Stage::Showdown);
        match hand.result() {
            Some(HandResult::Showdown { payouts, .. }) => assert_eq!(payouts, &[40, 0]),
            other => panic!("unexpected result {other:?}"),
        }
        assert_eq!(hand.seats()[0].stack, 520);
        assert_eq!(hand.seats()[1].stack, 480);
    }

    #[test]
    fn test_view_hides_opponent_cards_until_showdown() {
        let mut hand = new_hand([100, 100]);
        let view = hand.view(Some(0));
        assert_eq!(view.seats[0].cards.len(), 2);
        assert!(view.seats[1].cards.is_empty());
        assert!(view.seats[1].hidden);
        assert!(hand.view(None).seats.iter().all(|s| s.hidden));

        hand.apply(0, Action::AllIn).unwrap();
        hand.apply(1, Action::Call).unwrap();
        assert_eq!(hand.stage(), Stage::Showdown);
        let view = hand.view(Some(0));
        assert_eq!(view.seats[1].cards.len(), 2);
    }

    #[test]
    fn test_action_choices_preflop() {
        let hand = new_hand([500, 500]);
        let choices = hand.action_choices(0);
        assert!(choices.contains(&Action::Fold));
        assert!(choices.contains(&Action::Call));
        assert!(choices.contains(&Action::Raise(0)));
        assert!(choices.contains(&Action::AllIn));
        assert!(!choices.contains(&Action::Check));
        assert!(hand.action_choices(1).is_empty());
    }

    #[test]
    fn test_time_out_refunds_everything() {
        let mut hand = new_hand([500, 500]);
        hand.apply(0, Action::Raise(60)).unwrap();
        let outcome = hand.time_out();
        assert_eq!(hand.stage(), Stage::TimedOut);
        assert_eq!(hand.seats()[0].stack, 500);
        assert_eq!(hand.seats()[1].stack, 500);
        let refunded: i64 = outcome.transfers.iter().map(|t| t.amount).sum();
        assert_eq!(refunded, 80);
        assert!(hand.time_out().transfers.is_empty());
        assert_eq!(hand.apply(1, Action::Call), Err(HandError::HandOver));
    }

    #[test]
    fn test_short_deck_reports_exhaustion() {
        let deck = Deck::from_cards(vec![
            Card(ACE, Suit::Spade),
            Card(ACE, Suit::Heart),
            Card(7, Suit::Club),
            Card(2, Suit::Diamond),
            Card(KING, Suit::Spade),
        ]);
        let (mut hand, _) = Hand::with_deck(
            HandSettings::default(),
            [ALICE, BOB],
            [500, 500],
            deck,
            0,
        )
        .unwrap();
        hand.apply(0, Action::Call).unwrap();
        let before = hand.view(Some(0));
        assert_eq!(hand.apply(1, Action::Check), Err(HandError::DeckExhausted));
        assert_eq!(hand.view(Some(0)), before);

        let outcome = hand.abort();
        assert_eq!(hand.stage(), Stage::Aborted);
        assert!(outcome.events.contains(&HandEvent::Aborted));
    }
}
