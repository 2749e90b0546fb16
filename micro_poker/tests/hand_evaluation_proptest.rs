/// Property-based tests for hand evaluation using proptest
///
/// These tests check the ordering laws the showdown relies on across
/// randomly generated card combinations.
use micro_poker::game::{
    entities::{Card, Category, HandRank, Suit},
    functional::{argmax, best_of, compare, evaluate},
};
use proptest::prelude::*;
use std::{cmp::Ordering, collections::BTreeSet};

// Strategy to generate a valid card (values 2-14, aces are 14)
fn card_strategy() -> impl Strategy<Value = Card> {
    (2u8..=14, 0usize..4).prop_map(|(value, suit_idx)| Card(value, Suit::ALL[suit_idx]))
}

// Strategy to generate a vec of unique cards (no duplicates)
fn unique_cards_strategy(min: usize, max: usize) -> impl Strategy<Value = Vec<Card>> {
    prop::collection::vec(card_strategy(), min..=max).prop_filter("Cards must be unique", |cards| {
        let set: BTreeSet<_> = cards.iter().collect();
        set.len() == cards.len()
    })
}

fn five_card_strategy() -> impl Strategy<Value = [Card; 5]> {
    unique_cards_strategy(5, 5).prop_map(|cards| [cards[0], cards[1], cards[2], cards[3], cards[4]])
}

// 2 hole + 5 board
fn seven_card_strategy() -> impl Strategy<Value = Vec<Card>> {
    unique_cards_strategy(7, 7)
}

proptest! {
    #[test]
    fn test_evaluate_is_order_independent(
        cards in five_card_strategy(),
        rotation in 0usize..5,
    ) {
        let mut shuffled = cards;
        shuffled.rotate_left(rotation);
        shuffled.swap(0, 4);
        prop_assert_eq!(evaluate(&cards), evaluate(&shuffled));
    }

    #[test]
    fn test_tiebreak_values_are_valid(cards in five_card_strategy()) {
        let rank = evaluate(&cards);
        prop_assert!(!rank.tiebreak.is_empty());
        prop_assert!(rank.tiebreak.len() <= 5);
        for value in &rank.tiebreak {
            prop_assert!((1..=14).contains(value));
        }
    }

    #[test]
    fn test_compare_is_antisymmetric(a in five_card_strategy(), b in five_card_strategy()) {
        let (ra, rb) = (evaluate(&a), evaluate(&b));
        prop_assert_eq!(compare(&ra, &rb), compare(&rb, &ra).reverse());
        prop_assert_eq!(compare(&ra, &ra), Ordering::Equal);
    }

    #[test]
    fn test_compare_is_transitive(
        a in five_card_strategy(),
        b in five_card_strategy(),
        c in five_card_strategy(),
    ) {
        let mut ranks = [evaluate(&a), evaluate(&b), evaluate(&c)];
        ranks.sort_by(compare);
        prop_assert_ne!(compare(&ranks[0], &ranks[2]), Ordering::Greater);
        prop_assert_ne!(compare(&ranks[0], &ranks[1]), Ordering::Greater);
        prop_assert_ne!(compare(&ranks[1], &ranks[2]), Ordering::Greater);
    }

    #[test]
    fn test_best_of_dominates_every_subset(cards in seven_card_strategy()) {
        let best = best_of(&cards).unwrap();
        for skip_a in 0..7 {
            for skip_b in (skip_a + 1)..7 {
                let five: Vec<Card> = cards
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != skip_a && *i != skip_b)
                    .map(|(_, c)| *c)
                    .collect();
                let rank = evaluate(&[five[0], five[1], five[2], five[3], five[4]]);
                prop_assert_ne!(compare(&rank, &best), Ordering::Greater);
            }
        }
    }

    #[test]
    fn test_best_of_is_order_independent(cards in seven_card_strategy()) {
        let mut reversed = cards.clone();
        reversed.reverse();
        prop_assert_eq!(best_of(&cards), best_of(&reversed));
    }

    #[test]
    fn test_best_of_needs_five_cards(cards in unique_cards_strategy(0, 4)) {
        prop_assert!(best_of(&cards).is_none());
    }

    #[test]
    fn test_argmax_identical_ranks_all_win(cards in five_card_strategy()) {
        let rank = evaluate(&cards);
        let winners = argmax(&[rank.clone(), rank.clone(), rank]);
        prop_assert_eq!(winners, vec![0, 1, 2]);
    }

    #[test]
    fn test_argmax_winners_are_maximal(
        hands in prop::collection::vec(five_card_strategy(), 2..=8)
    ) {
        let ranks: Vec<HandRank> = hands.iter().map(evaluate).collect();
        let winners = argmax(&ranks);
        prop_assert!(!winners.is_empty());

        let top = &ranks[winners[0]];
        for (i, rank) in ranks.iter().enumerate() {
            if winners.contains(&i) {
                prop_assert_eq!(compare(rank, top), Ordering::Equal);
            } else {
                prop_assert_eq!(compare(rank, top), Ordering::Less);
            }
        }
    }
}

// Specific hands with known outcomes

fn cards(raw: [(u8, Suit); 5]) -> [Card; 5] {
    raw.map(|(value, suit)| Card(value, suit))
}

#[test]
fn test_category_ladder() {
    use Suit::*;
    let ladder = [
        cards([(2, Club), (5, Heart), (9, Spade), (11, Diamond), (13, Club)]),
        cards([(2, Club), (2, Heart), (9, Spade), (11, Diamond), (13, Club)]),
        cards([(2, Club), (2, Heart), (9, Spade), (9, Diamond), (13, Club)]),
        cards([(2, Club), (2, Heart), (2, Spade), (9, Diamond), (13, Club)]),
        cards([(5, Club), (6, Heart), (7, Spade), (8, Diamond), (9, Club)]),
        cards([(2, Heart), (6, Heart), (9, Heart), (11, Heart), (13, Heart)]),
        cards([(2, Club), (2, Heart), (2, Spade), (9, Diamond), (9, Club)]),
        cards([(2, Club), (2, Heart), (2, Spade), (2, Diamond), (9, Club)]),
        cards([(5, Spade), (6, Spade), (7, Spade), (8, Spade), (9, Spade)]),
        cards([(10, Spade), (11, Spade), (12, Spade), (13, Spade), (14, Spade)]),
    ];
    let expected = [
        Category::HighCard,
        Category::OnePair,
        Category::TwoPair,
        Category::ThreeOfAKind,
        Category::Straight,
        Category::Flush,
        Category::FullHouse,
        Category::FourOfAKind,
        Category::StraightFlush,
        Category::RoyalFlush,
    ];

    let ranks: Vec<HandRank> = ladder.iter().map(evaluate).collect();
    for (rank, category) in ranks.iter().zip(expected) {
        assert_eq!(rank.category, category);
    }
    for pair in ranks.windows(2) {
        assert_eq!(compare(&pair[0], &pair[1]), Ordering::Less);
    }
}

#[test]
fn test_wheel_loses_to_six_high_straight() {
    use Suit::*;
    let wheel = evaluate(&cards([(14, Club), (2, Heart), (3, Spade), (4, Diamond), (5, Club)]));
    let six_high = evaluate(&cards([(2, Club), (3, Heart), (4, Spade), (5, Diamond), (6, Club)]));
    assert_eq!(wheel.category, Category::Straight);
    assert_eq!(wheel.tiebreak, vec![5]);
    assert_eq!(compare(&wheel, &six_high), Ordering::Less);
}
