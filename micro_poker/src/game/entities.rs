use rand::{Rng, seq::SliceRandom};
use serde::{Deserialize, Serialize};
use std::{
    collections::HashSet,
    fmt,
    hash::{Hash, Hasher},
    mem::discriminant,
};

use super::state_machine::HandError;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Suit {
    Club,
    Spade,
    Diamond,
    Heart,
}

impl Suit {
    pub const ALL: [Self; 4] = [Self::Spade, Self::Heart, Self::Diamond, Self::Club];
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Club => "♣",
            Self::Spade => "♠",
            Self::Diamond => "♦",
            Self::Heart => "♥",
        };
        write!(f, "{repr}")
    }
}

/// Placeholder for card values. Deuce is 2u8 and ace is 14u8.
pub type Value = u8;

pub const ACE: Value = 14;
pub const KING: Value = 13;
pub const QUEEN: Value = 12;
pub const JACK: Value = 11;

/// A card is a tuple of a value (2u8 ... ace=14u8) and a suit.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Card(pub Value, pub Suit);

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let value = match self.0 {
            ACE => "A",
            KING => "K",
            QUEEN => "Q",
            JACK => "J",
            v => &v.to_string(),
        };
        write!(f, "{value}{}", self.1)
    }
}

/// Hand categories, weakest first. Discriminants match the numeric
/// category that callers and logs use (0 = high card ... 9 = royal flush).
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Category {
    HighCard = 0,
    OnePair = 1,
    TwoPair = 2,
    ThreeOfAKind = 3,
    Straight = 4,
    Flush = 5,
    FullHouse = 6,
    FourOfAKind = 7,
    StraightFlush = 8,
    RoyalFlush = 9,
}

impl Category {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::HighCard => "High Card",
            Self::OnePair => "Pair",
            Self::TwoPair => "Two Pair",
            Self::ThreeOfAKind => "Three of a Kind",
            Self::Straight => "Straight",
            Self::Flush => "Flush",
            Self::FullHouse => "Full House",
            Self::FourOfAKind => "Four of a Kind",
            Self::StraightFlush => "Straight Flush",
            Self::RoyalFlush => "Royal Flush",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::HighCard => "hi",
            Self::OnePair => "1p",
            Self::TwoPair => "2p",
            Self::ThreeOfAKind => "3k",
            Self::Straight => "s8",
            Self::Flush => "fs",
            Self::FullHouse => "fh",
            Self::FourOfAKind => "4k",
            Self::StraightFlush => "sf",
            Self::RoyalFlush => "rf",
        };
        write!(f, "{repr}")
    }
}

/// Score of a five card combination. Field order matters: the derived
/// ordering compares the category first and then the tie-break values
/// lexicographically.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct HandRank {
    pub category: Category,
    pub tiebreak: Vec<Value>,
}

impl fmt::Display for HandRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.category.name())
    }
}

/// Cards are drawn from the end of the deck.
#[derive(Clone, Debug)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// Build a deck that deals `cards` in the order given. Used to arrange
    /// hands; the deck is not padded to 52 cards.
    #[must_use]
    pub fn from_cards(mut cards: Vec<Card>) -> Self {
        cards.reverse();
        Self { cards }
    }

    pub fn draw(&mut self) -> Result<Card, HandError> {
        self.cards.pop().ok_or(HandError::DeckExhausted)
    }

    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

impl Default for Deck {
    fn default() -> Self {
        let mut cards = Vec::with_capacity(52);
        for value in 2..=ACE {
            for suit in Suit::ALL {
                cards.push(Card(value, suit));
            }
        }
        Self { cards }
    }
}

/// Type alias for whole chips. All bets, stacks, and pots inside a hand are
/// whole chips.
pub type Chips = u32;

/// Largest stack a seat may bring to a hand, so both stacks always fit in
/// one pot.
pub const MAX_STACK: Chips = Chips::MAX / 2;

/// Participant identifier handed to us by the presentation layer.
pub type UserId = i64;

/// Type alias for seat positions during a hand. Heads-up, so 0 or 1.
pub type SeatIndex = usize;

/// Who is sitting in a seat.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum SeatOwner {
    Player(UserId),
    /// The heuristic opponent. Its chips are table chips and never touch
    /// the ledger.
    House,
}

impl SeatOwner {
    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Self::Player(id) => Some(*id),
            Self::House => None,
        }
    }
}

impl fmt::Display for SeatOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player(id) => write!(f, "player {id}"),
            Self::House => write!(f, "house"),
        }
    }
}

/// Betting stages. `Showdown`, `Folded`, `TimedOut`, and `Aborted` are
/// terminal.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Stage {
    PreFlop,
    Flop,
    Turn,
    River,
    Showdown,
    Folded,
    TimedOut,
    Aborted,
}

impl Stage {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Showdown | Self::Folded | Self::TimedOut | Self::Aborted
        )
    }

    /// The street that follows this one, or `None` after the river.
    #[must_use]
    pub fn next_street(&self) -> Option<Self> {
        match self {
            Self::PreFlop => Some(Self::Flop),
            Self::Flop => Some(Self::Turn),
            Self::Turn => Some(Self::River),
            _ => None,
        }
    }

    /// Number of community cards dealt when entering this stage.
    #[must_use]
    pub fn cards_dealt(&self) -> usize {
        match self {
            Self::Flop => 3,
            Self::Turn | Self::River => 1,
            _ => 0,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::PreFlop => "Pre-Flop",
            Self::Flop => "Flop",
            Self::Turn => "Turn",
            Self::River => "River",
            Self::Showdown => "Showdown",
            Self::Folded => "Folded",
            Self::TimedOut => "Timed Out",
            Self::Aborted => "Aborted",
        };
        write!(f, "{repr}")
    }
}

/// A player action. `Bet` and `Raise` carry the seat's new round-bet total
/// ("raise to"), not the increment.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Action {
    AllIn,
    Bet(Chips),
    Call,
    Check,
    Fold,
    Raise(Chips),
}

impl Action {
    #[must_use]
    pub fn is_all_in(&self) -> bool {
        matches!(self, Self::AllIn)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::AllIn => "all-ins",
            Self::Bet(amount) => &format!("bets ${amount}"),
            Self::Call => "calls",
            Self::Check => "checks",
            Self::Fold => "folds",
            Self::Raise(amount) => &format!("raises to ${amount}"),
        };
        write!(f, "{repr}")
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub enum ActionChoice {
    AllIn(Chips),
    Call(Chips),
    Check,
    Fold,
    Raise { min: Chips, max: Chips },
}

impl fmt::Display for ActionChoice {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::AllIn(amount) => format!("all-in (${amount})"),
            Self::Call(amount) => format!("call (== ${amount})"),
            Self::Check => "check".to_string(),
            Self::Fold => "fold".to_string(),
            Self::Raise { min, max } => format!("raise (${min}..=${max})"),
        };
        write!(f, "{repr}")
    }
}

// We don't care about the amounts within `ActionChoice`. Membership checks
// only compare variants; amounts are validated by the state machine.
impl Eq for ActionChoice {}

impl Hash for ActionChoice {
    fn hash<H: Hasher>(&self, state: &mut H) {
        discriminant(self).hash(state);
    }
}

impl PartialEq for ActionChoice {
    fn eq(&self, other: &Self) -> bool {
        discriminant(self) == discriminant(other)
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct ActionChoices(pub HashSet<ActionChoice>);

impl ActionChoices {
    #[must_use]
    pub fn contains(&self, action: &Action) -> bool {
        let action_choice = match action {
            Action::AllIn => ActionChoice::AllIn(0),
            Action::Call => ActionChoice::Call(0),
            Action::Check => ActionChoice::Check,
            Action::Fold => ActionChoice::Fold,
            Action::Bet(_) | Action::Raise(_) => ActionChoice::Raise { min: 0, max: 0 },
        };
        self.0.contains(&action_choice)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ActionChoices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut reprs: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        reprs.sort();
        let num_options = reprs.len();
        let repr = reprs
            .into_iter()
            .enumerate()
            .map(|(i, repr)| match i {
                0 if num_options == 1 => repr,
                0 if num_options == 2 => format!("{repr} "),
                i if i == num_options - 1 && num_options != 1 => format!("or {repr}"),
                _ => format!("{repr}, "),
            })
            .collect::<String>();
        write!(f, "{repr}")
    }
}

impl<I> From<I> for ActionChoices
where
    I: IntoIterator<Item = ActionChoice>,
{
    fn from(iter: I) -> Self {
        Self(iter.into_iter().collect::<HashSet<_>>())
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Seat {
    pub owner: SeatOwner,
    pub cards: Vec<Card>,
    /// Chips still behind, not yet committed to the pot.
    pub stack: Chips,
    /// Committed on the current street.
    pub round_bet: Chips,
    /// Committed over the whole hand.
    pub total_bet: Chips,
    pub acted: bool,
    /// Whole stack is in the pot.
    pub all_in: bool,
    /// Round-bet reached the table max with chips left behind.
    pub capped: bool,
}

impl Seat {
    #[must_use]
    pub fn new(owner: SeatOwner, stack: Chips) -> Self {
        Self {
            owner,
            cards: Vec::with_capacity(2),
            stack,
            round_bet: 0,
            total_bet: 0,
            acted: false,
            all_in: false,
            capped: false,
        }
    }

    /// All-in or capped seats have nothing more to decide this street.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.all_in || self.capped
    }

    pub fn reset_street(&mut self) {
        self.round_bet = 0;
        self.acted = false;
        self.capped = false;
    }
}

/// Signed chip movement for one seat. Negative amounts move chips from the
/// seat into the pot; positive amounts are payouts and refunds.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Transfer {
    pub seat: SeatIndex,
    pub owner: SeatOwner,
    pub amount: i64,
    pub kind: TransferKind,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum TransferKind {
    Blind,
    Bet,
    Payout,
    Refund,
}

/// Events that occur while a hand plays out.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum HandEvent {
    BlindPosted { seat: SeatIndex, amount: Chips },
    Acted { seat: SeatIndex, action: Action },
    StreetDealt { stage: Stage, cards: Vec<Card> },
    Refunded { seat: SeatIndex, amount: Chips },
    Won { seat: SeatIndex, amount: Chips },
    TimedOut,
    Aborted,
}

impl fmt::Display for HandEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::BlindPosted { seat, amount } => format!("seat {seat} posts ${amount}"),
            Self::Acted { seat, action } => format!("seat {seat} {action}"),
            Self::StreetDealt { stage, cards } => {
                let cards = cards
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(" ");
                format!("{stage}: {cards}")
            }
            Self::Refunded { seat, amount } => format!("seat {seat} gets ${amount} back"),
            Self::Won { seat, amount } => format!("seat {seat} won ${amount}"),
            Self::TimedOut => "hand timed out".to_string(),
            Self::Aborted => "hand aborted".to_string(),
        };
        write!(f, "{repr}")
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct ActionOutcome {
    pub transfers: Vec<Transfer>,
    pub events: Vec<HandEvent>,
}

impl ActionOutcome {
    pub fn extend(&mut self, other: Self) {
        self.transfers.extend(other.transfers);
        self.events.extend(other.events);
    }
}

/// How a finished hand was settled.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum HandResult {
    Showdown {
        ranks: [HandRank; 2],
        payouts: [Chips; 2],
    },
    Fold {
        winner: SeatIndex,
        payout: Chips,
    },
    Refunded {
        refunds: [Chips; 2],
    },
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SeatView {
    pub owner: SeatOwner,
    /// Empty when the viewer isn't allowed to see these cards.
    pub cards: Vec<Card>,
    pub hidden: bool,
    pub stack: Chips,
    pub round_bet: Chips,
    pub total_bet: Chips,
    pub all_in: bool,
    pub capped: bool,
}

/// Read-only snapshot of a hand from one viewer's perspective.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct HandView {
    pub hand_id: Option<uuid::Uuid>,
    pub viewer: Option<SeatIndex>,
    pub stage: Stage,
    pub board: Vec<Card>,
    pub seats: Vec<SeatView>,
    pub pot: Chips,
    pub current_bet: Chips,
    pub min_bet: Chips,
    pub max_bet: Chips,
    pub raise_count: u8,
    pub max_raises: u8,
    pub turn: Option<SeatIndex>,
    pub result: Option<HandResult>,
    pub status: String,
}

impl HandView {
    #[must_use]
    pub fn amount_to_call(&self, seat: SeatIndex) -> Chips {
        self.seats
            .get(seat)
            .map_or(0, |s| self.current_bet.saturating_sub(s.round_bet))
    }

    #[must_use]
    pub fn is_turn_of(&self, seat: SeatIndex) -> bool {
        self.turn == Some(seat)
    }
}
