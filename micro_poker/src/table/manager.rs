//! Session registry: starts hands, routes actions to them, plays the house's
//! turns, and mirrors every chip movement into the ledger.

use super::{
    config::{ConfigError, TableConfig},
    errors::{SessionError, SessionResult},
};
use crate::{
    bot::{
        OpponentDecisionMaker, Personality, ProfileStore, decision::DecisionContext,
        models::ThinkTime,
    },
    game::{
        entities::{
            Action, ActionOutcome, Chips, HandView, MAX_STACK, SeatIndex, SeatOwner, UserId,
        },
        state_machine::{Hand, HandError},
    },
    wallet::Ledger,
};
use log::{debug, info, trace, warn};
use rand::{SeedableRng, rngs::StdRng};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex as StdMutex, PoisonError},
};
use tokio::{
    sync::{Mutex, RwLock},
    task::JoinHandle,
    time::{Instant, MissedTickBehavior, interval},
};
use uuid::Uuid;

pub type HandId = Uuid;

/// Who sits in seat 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opponent {
    House(Personality),
    Player(UserId),
}

struct HandSlot {
    hand: Hand,
    last_action_at: Instant,
}

/// One heads-up hand. Both participants' keys point at the same session.
struct Session {
    id: HandId,
    opponent: Opponent,
    /// Seat order: the initiator is seat 0.
    participants: Vec<UserId>,
    slot: Mutex<HandSlot>,
}

impl Session {
    fn seat_of(&self, user_id: UserId) -> Option<SeatIndex> {
        self.participants.iter().position(|&id| id == user_id)
    }
}

#[derive(Default)]
struct SessionIndex {
    sessions: HashMap<HandId, Arc<Session>>,
    by_participant: HashMap<UserId, HandId>,
}

/// Session registry
pub struct TableManager {
    config: TableConfig,
    ledger: Arc<dyn Ledger>,
    profiles: Arc<ProfileStore>,
    decision_maker: OpponentDecisionMaker,
    think_time: ThinkTime,
    rng: StdMutex<StdRng>,
    index: RwLock<SessionIndex>,
}

impl TableManager {
    /// Create a new registry
    ///
    /// # Arguments
    ///
    /// * `config` - Table configuration
    /// * `ledger` - Balance store hands settle against
    ///
    /// # Returns
    ///
    /// * `SessionResult<TableManager>` - New registry or the config error
    pub fn new(config: TableConfig, ledger: Arc<dyn Ledger>) -> SessionResult<Self> {
        Self::with_profiles(config, ledger, Arc::new(ProfileStore::new()))
    }

    /// Create a registry that shares a profile store with other components
    pub fn with_profiles(
        config: TableConfig,
        ledger: Arc<dyn Ledger>,
        profiles: Arc<ProfileStore>,
    ) -> SessionResult<Self> {
        config.validate()?;
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Ok(Self {
            think_time: config.think_time(),
            config,
            ledger,
            profiles,
            decision_maker: OpponentDecisionMaker::new(),
            rng: StdMutex::new(rng),
            index: RwLock::new(SessionIndex::default()),
        })
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn profiles(&self) -> &Arc<ProfileStore> {
        &self.profiles
    }

    /// Number of hands in progress
    pub async fn active_hands(&self) -> usize {
        self.index.read().await.sessions.len()
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut rng)
    }

    /// Start a hand
    ///
    /// # Arguments
    ///
    /// * `participant` - Initiator, seated in seat 0
    /// * `wager` - Big blind for the hand
    /// * `opponent` - Second participant, or `None` to play the house
    ///
    /// # Returns
    ///
    /// * `SessionResult<HandView>` - The hand as the initiator sees it
    pub async fn start(
        &self,
        participant: UserId,
        wager: Chips,
        opponent: Option<UserId>,
    ) -> SessionResult<HandView> {
        if wager == 0 || wager > MAX_STACK {
            return Err(SessionError::InvalidWager);
        }
        if opponent == Some(participant) {
            return Err(SessionError::SelfPlay);
        }
        let participants: Vec<UserId> = std::iter::once(participant).chain(opponent).collect();
        {
            let index = self.index.read().await;
            if let Some(&busy) = participants
                .iter()
                .find(|&&id| index.by_participant.contains_key(&id))
            {
                return Err(SessionError::AlreadyActive(busy));
            }
        }

        let settings = self.config.hand_settings(wager);
        settings
            .validate()
            .map_err(|reason| ConfigError::Invalid {
                var: "wager".to_string(),
                reason,
            })?;

        let mut stacks: [Chips; 2] = [0; 2];
        for (seat, &user_id) in participants.iter().enumerate() {
            let balance = self.ledger.get_balance(user_id).await;
            if balance < i64::from(wager) {
                return Err(SessionError::InsufficientBalance {
                    user_id,
                    available: balance,
                    required: wager,
                });
            }
            // Balances beyond the stack limit stay in the ledger.
            stacks[seat] = Chips::try_from(balance).map_or(MAX_STACK, |b| b.min(MAX_STACK));
        }

        let (owners, opponent) = match opponent {
            Some(other) => (
                [SeatOwner::Player(participant), SeatOwner::Player(other)],
                Opponent::Player(other),
            ),
            None => {
                // The house covers the table max on every street.
                stacks[1] = self
                    .config
                    .house_stack
                    .max(settings.max_bet.saturating_mul(4))
                    .min(MAX_STACK);
                let personality = self
                    .with_rng(|rng| Personality::draw(&self.config.personality_weights, rng));
                (
                    [SeatOwner::Player(participant), SeatOwner::House],
                    Opponent::House(personality),
                )
            }
        };

        let (hand, outcome) = self.with_rng(|rng| Hand::new(settings, owners, stacks, rng))?;
        let session = Arc::new(Session {
            id: Uuid::new_v4(),
            opponent,
            participants,
            slot: Mutex::new(HandSlot {
                hand,
                last_action_at: Instant::now(),
            }),
        });

        let over = {
            let slot = session.slot.lock().await;
            {
                let mut index = self.index.write().await;
                if let Some(&busy) = session
                    .participants
                    .iter()
                    .find(|&&id| index.by_participant.contains_key(&id))
                {
                    return Err(SessionError::AlreadyActive(busy));
                }
                for &user_id in &session.participants {
                    index.by_participant.insert(user_id, session.id);
                }
                index.sessions.insert(session.id, Arc::clone(&session));
            }
            info!(
                "Hand {} started: user {participant} vs {:?}, wager {wager}",
                session.id, session.opponent
            );
            self.settle(&outcome).await;
            let over = slot.hand.stage().is_terminal();
            if over {
                self.finish(&session, &slot.hand).await;
            }
            over
        };

        if !over {
            self.run_house_turns(&session).await?;
        }
        Ok(self.view_of(&session, Some(0)).await)
    }

    /// Apply a participant's action to their live hand
    ///
    /// House turns run inside this call. If a caller drops the future while
    /// the house is thinking, the next participant action plays the owed
    /// house turns before its own.
    ///
    /// # Returns
    ///
    /// * `SessionResult<HandView>` - The hand after the action and any house
    ///   turns that followed it
    pub async fn apply_action(
        &self,
        participant: UserId,
        action: Action,
    ) -> SessionResult<HandView> {
        let session = self
            .session_of(participant)
            .await
            .ok_or(SessionError::NoActiveHand)?;
        let seat = session
            .seat_of(participant)
            .ok_or(SessionError::NoActiveHand)?;

        let house_owes_turn = {
            let mut slot = session
                .slot
                .try_lock()
                .map_err(|_| SessionError::HandLocked)?;
            if slot.hand.stage().is_terminal() {
                return Err(SessionError::NoActiveHand);
            }
            if slot.last_action_at.elapsed() >= self.config.action_timeout() {
                self.expire(&session, &mut slot).await;
                return Err(SessionError::NoActiveHand);
            }
            house_to_act(&slot.hand).is_some()
        };
        if house_owes_turn {
            debug!("Hand {}: catching up on a pending house turn", session.id);
            self.run_house_turns(&session).await?;
        }

        {
            let mut slot = session
                .slot
                .try_lock()
                .map_err(|_| SessionError::HandLocked)?;
            if slot.hand.stage().is_terminal() {
                return Err(SessionError::NoActiveHand);
            }

            self.apply_to_slot(&session, &mut slot, seat, action.clone())
                .await?;
            self.profiles.record_action(participant, &action).await;
            if slot.hand.stage().is_terminal() {
                self.finish(&session, &slot.hand).await;
                drop(slot);
                return Ok(self.view_of(&session, Some(seat)).await);
            }
        }

        self.run_house_turns(&session).await?;
        Ok(self.view_of(&session, Some(seat)).await)
    }

    /// The participant's live hand, as they may see it.
    pub async fn get_state(&self, participant: UserId) -> Option<HandView> {
        let session = self.session_of(participant).await?;
        let seat = session.seat_of(participant)?;
        Some(self.view_of(&session, Some(seat)).await)
    }

    /// Time out every hand idle for longer than the action timeout. Hands
    /// busy processing an action are skipped.
    ///
    /// # Returns
    ///
    /// * `usize` - Number of hands timed out
    pub async fn sweep_timeouts(&self) -> usize {
        let sessions: Vec<Arc<Session>> =
            self.index.read().await.sessions.values().cloned().collect();
        let timeout = self.config.action_timeout();
        let mut expired = 0;
        for session in sessions {
            let Ok(mut slot) = session.slot.try_lock() else {
                continue;
            };
            if !slot.hand.stage().is_terminal() && slot.last_action_at.elapsed() >= timeout {
                self.expire(&session, &mut slot).await;
                expired += 1;
            }
        }
        expired
    }

    /// Run [`TableManager::sweep_timeouts`] on the configured interval until
    /// the registry is dropped.
    pub fn spawn_timeout_sweeper(self: &Arc<Self>) -> JoinHandle<()> {
        let manager = Arc::downgrade(self);
        let period = self.config.sweep_interval();
        tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(manager) = manager.upgrade() else {
                    break;
                };
                let expired = manager.sweep_timeouts().await;
                if expired > 0 {
                    info!("Timeout sweep refunded {expired} idle hand(s)");
                }
            }
            debug!("Timeout sweeper stopped");
        })
    }

    async fn session_of(&self, participant: UserId) -> Option<Arc<Session>> {
        let index = self.index.read().await;
        let id = index.by_participant.get(&participant)?;
        index.sessions.get(id).cloned()
    }

    async fn view_of(&self, session: &Session, viewer: Option<SeatIndex>) -> HandView {
        let slot = session.slot.lock().await;
        let mut view = slot.hand.view(viewer);
        view.hand_id = Some(session.id);
        view
    }

    /// Apply one action and settle it. Deck exhaustion aborts the hand and
    /// refunds both seats.
    async fn apply_to_slot(
        &self,
        session: &Session,
        slot: &mut HandSlot,
        seat: SeatIndex,
        action: Action,
    ) -> SessionResult<()> {
        match slot.hand.apply(seat, action) {
            Ok(outcome) => {
                slot.last_action_at = Instant::now();
                self.settle(&outcome).await;
                Ok(())
            }
            Err(HandError::DeckExhausted) => {
                warn!("Hand {}: deck exhausted, aborting", session.id);
                let outcome = slot.hand.abort();
                self.settle(&outcome).await;
                self.remove(session).await;
                Err(HandError::DeckExhausted.into())
            }
            Err(err) => {
                debug!("Hand {}: seat {seat} rejected: {err}", session.id);
                Err(err.into())
            }
        }
    }

    /// Play house turns until it's a participant's turn or the hand ends.
    /// The think delay is slept without holding the hand.
    async fn run_house_turns(&self, session: &Session) -> SessionResult<()> {
        let Opponent::House(personality) = session.opponent else {
            return Ok(());
        };
        loop {
            let seat = {
                let slot = session.slot.lock().await;
                match house_to_act(&slot.hand) {
                    Some(seat) => seat,
                    None => return Ok(()),
                }
            };

            let delay = self.with_rng(|rng| self.think_time.sample(rng));
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            let mut slot = session.slot.lock().await;
            if slot.hand.turn() != Some(seat) {
                continue;
            }
            let profile = self.profiles.get_profile(session.participants[0]).await;
            let ctx = DecisionContext::from_view(&slot.hand.view(Some(seat)), seat);
            let action = self.with_rng(|rng| {
                self.decision_maker
                    .decide(&ctx, personality, profile.as_ref(), rng)
            });
            debug!("Hand {}: house ({personality}) {action}", session.id);

            match self.apply_to_slot(session, &mut slot, seat, action).await {
                Ok(()) => {}
                Err(SessionError::Hand(HandError::Illegal(reason))) => {
                    warn!(
                        "Hand {}: house action refused ({reason}), falling back",
                        session.id
                    );
                    let fallback = if ctx.to_call == 0 {
                        Action::Check
                    } else {
                        Action::Call
                    };
                    self.apply_to_slot(session, &mut slot, seat, fallback)
                        .await?;
                }
                Err(err) => return Err(err),
            }

            if slot.hand.stage().is_terminal() {
                self.finish(session, &slot.hand).await;
                return Ok(());
            }
        }
    }

    async fn settle(&self, outcome: &ActionOutcome) {
        for transfer in &outcome.transfers {
            if let SeatOwner::Player(user_id) = transfer.owner {
                let balance = self
                    .ledger
                    .record(user_id, transfer.amount, transfer.kind.into())
                    .await;
                trace!(
                    "user {user_id}: {:+} ({:?}) -> {balance}",
                    transfer.amount, transfer.kind
                );
            }
        }
    }

    async fn expire(&self, session: &Session, slot: &mut HandSlot) {
        let outcome = slot.hand.time_out();
        self.settle(&outcome).await;
        warn!(
            "Hand {} timed out after {:?} idle; bets refunded",
            session.id,
            slot.last_action_at.elapsed()
        );
        self.remove(session).await;
    }

    async fn finish(&self, session: &Session, hand: &Hand) {
        info!("Hand {} finished: {}", session.id, hand.view(None).status);
        self.remove(session).await;
    }

    async fn remove(&self, session: &Session) {
        let mut index = self.index.write().await;
        index.sessions.remove(&session.id);
        for user_id in &session.participants {
            if index.by_participant.get(user_id) == Some(&session.id) {
                index.by_participant.remove(user_id);
            }
        }
    }
}

/// The house's seat, if the hand is waiting on it.
fn house_to_act(hand: &Hand) -> Option<SeatIndex> {
    hand.turn()
        .filter(|&seat| hand.seats()[seat].owner == SeatOwner::House)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        game::{
            entities::{ACE, Card, Deck, Stage, Suit},
            state_machine::HandSettings,
        },
        wallet::{EntryType, WalletManager},
    };
    use std::time::Duration;

    fn quick_config() -> TableConfig {
        TableConfig {
            think_time_min_ms: 0,
            think_time_max_ms: 0,
            rng_seed: Some(17),
            ..TableConfig::default()
        }
    }

    #[tokio::test]
    async fn test_busy_hand_reports_locked() {
        let wallets = Arc::new(WalletManager::new(500));
        let manager = TableManager::new(quick_config(), wallets).unwrap();
        manager.start(1, 20, Some(2)).await.unwrap();

        let session = manager.session_of(1).await.unwrap();
        let _held = session.slot.lock().await;
        assert_eq!(
            manager.apply_action(1, Action::Fold).await,
            Err(SessionError::HandLocked)
        );
        assert_eq!(
            manager.apply_action(2, Action::Fold).await,
            Err(SessionError::HandLocked)
        );
    }

    #[tokio::test]
    async fn test_both_participants_share_one_session() {
        let wallets = Arc::new(WalletManager::new(500));
        let manager = TableManager::new(quick_config(), wallets).unwrap();
        manager.start(1, 20, Some(2)).await.unwrap();

        let a = manager.session_of(1).await.unwrap();
        let b = manager.session_of(2).await.unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.seat_of(1), Some(0));
        assert_eq!(a.seat_of(2), Some(1));
        assert_eq!(manager.active_hands().await, 1);
    }

    #[tokio::test]
    async fn test_invalid_config_is_rejected() {
        let config = TableConfig {
            house_stack: 0,
            ..TableConfig::default()
        };
        let result = TableManager::new(config, Arc::new(WalletManager::default()));
        assert!(matches!(result, Err(SessionError::Config(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_house_turn_is_played_on_next_action() {
        let config = TableConfig {
            think_time_min_ms: 500,
            think_time_max_ms: 500,
            ..quick_config()
        };
        let wallets = Arc::new(WalletManager::new(500));
        let manager = TableManager::new(config, wallets.clone()).unwrap();

        // Give up on each call while the house is still thinking.
        let patience = Duration::from_millis(100);
        if let Ok(view) = tokio::time::timeout(patience, manager.start(1, 20, None)).await {
            assert_eq!(view.unwrap().turn, Some(0));
            let call = tokio::time::timeout(patience, manager.apply_action(1, Action::Call)).await;
            assert!(call.is_err());
        }
        assert_eq!(manager.get_state(1).await.unwrap().turn, Some(1));

        let result = manager.apply_action(1, Action::Fold).await;
        assert!(
            !matches!(result, Err(SessionError::Hand(HandError::NotYourTurn))),
            "house turn was not caught up: {result:?}"
        );
        assert_eq!(manager.active_hands().await, 0);
        let journaled: i64 = wallets.entries(1).await.iter().map(|e| e.amount).sum();
        assert_eq!(wallets.get_balance(1).await, 500 + journaled);
    }

    #[tokio::test]
    async fn test_deck_exhaustion_aborts_and_refunds() {
        let wallets = Arc::new(WalletManager::new(500));
        let manager = TableManager::new(quick_config(), wallets.clone()).unwrap();

        // Hole cards only, so closing pre-flop can't deal the flop.
        let deck = Deck::from_cards(vec![
            Card(ACE, Suit::Spade),
            Card(ACE, Suit::Heart),
            Card(7, Suit::Club),
            Card(2, Suit::Diamond),
        ]);
        let (hand, blinds) = Hand::with_deck(
            HandSettings::default(),
            [SeatOwner::Player(1), SeatOwner::Player(2)],
            [500, 500],
            deck,
            0,
        )
        .unwrap();
        let session = Arc::new(Session {
            id: Uuid::new_v4(),
            opponent: Opponent::Player(2),
            participants: vec![1, 2],
            slot: Mutex::new(HandSlot {
                hand,
                last_action_at: Instant::now(),
            }),
        });
        {
            let mut index = manager.index.write().await;
            index.by_participant.insert(1, session.id);
            index.by_participant.insert(2, session.id);
            index.sessions.insert(session.id, Arc::clone(&session));
        }
        manager.settle(&blinds).await;
        assert_eq!(wallets.get_balance(1).await + wallets.get_balance(2).await, 970);

        manager.apply_action(1, Action::Call).await.unwrap();
        assert_eq!(
            manager.apply_action(2, Action::Check).await,
            Err(SessionError::Hand(HandError::DeckExhausted))
        );

        assert_eq!(manager.active_hands().await, 0);
        assert_eq!(manager.get_state(1).await, None);
        assert_eq!(session.slot.lock().await.hand.stage(), Stage::Aborted);
        assert_eq!(wallets.get_balance(1).await, 500);
        assert_eq!(wallets.get_balance(2).await, 500);
        let refunds = wallets
            .entries(2)
            .await
            .into_iter()
            .filter(|e| e.entry_type == EntryType::Refund)
            .count();
        assert_eq!(refunds, 1);
    }
}
