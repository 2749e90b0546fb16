use std::{cmp::Ordering, collections::BTreeMap};

use super::entities::{ACE, Card, Category, HandRank, Value};

/// Score exactly five cards.
///
/// # Arguments
///
/// * `cards` - Five distinct cards, in any order
///
/// # Returns
///
/// * `HandRank` - Category plus the tie-break values that order hands within
///   that category
pub fn evaluate(cards: &[Card; 5]) -> HandRank {
    let mut values: Vec<Value> = cards.iter().map(|c| c.0).collect();
    values.sort_unstable_by(|a, b| b.cmp(a));

    let is_flush = cards.iter().all(|c| c.1 == cards[0].1);
    let straight_high = straight_high(&values);

    // (count, value) pairs sorted by count then value, both descending.
    let mut counts: BTreeMap<Value, usize> = BTreeMap::new();
    for value in &values {
        *counts.entry(*value).or_default() += 1;
    }
    let mut groups: Vec<(usize, Value)> = counts.into_iter().map(|(v, n)| (n, v)).collect();
    groups.sort_unstable_by(|a, b| b.cmp(a));
    let grouped: Vec<Value> = groups.iter().map(|&(_, v)| v).collect();

    let (category, tiebreak) = match (is_flush, straight_high) {
        (true, Some(ACE)) => (Category::RoyalFlush, vec![ACE]),
        (true, Some(high)) => (Category::StraightFlush, vec![high]),
        _ => match (groups[0].0, groups.get(1).map_or(0, |g| g.0)) {
            (4, _) => (Category::FourOfAKind, grouped),
            (3, 2) => (Category::FullHouse, grouped),
            _ if is_flush => (Category::Flush, values),
            _ if straight_high.is_some() => {
                (Category::Straight, straight_high.into_iter().collect())
            }
            (3, _) => (Category::ThreeOfAKind, grouped),
            (2, 2) => (Category::TwoPair, grouped),
            (2, _) => (Category::OnePair, grouped),
            _ => (Category::HighCard, values),
        },
    };

    HandRank { category, tiebreak }
}

/// High card of a straight, if the descending values form one. The wheel
/// (A-2-3-4-5) is a five-high straight.
fn straight_high(values: &[Value]) -> Option<Value> {
    let distinct = values.windows(2).all(|w| w[0] != w[1]);
    if !distinct || values.len() != 5 {
        return None;
    }
    if values[0] - values[4] == 4 {
        Some(values[0])
    } else if values == [ACE, 5, 4, 3, 2] {
        Some(5)
    } else {
        None
    }
}

/// Every five card subset of `cards`, in lexicographic index order.
fn five_card_subsets(cards: &[Card]) -> Vec<[Card; 5]> {
    let n = cards.len();
    let mut subsets = Vec::new();
    if n < 5 {
        return subsets;
    }
    let mut idx = [0, 1, 2, 3, 4];
    loop {
        subsets.push(idx.map(|i| cards[i]));
        let mut i = 5;
        loop {
            if i == 0 {
                return subsets;
            }
            i -= 1;
            if idx[i] < n - 5 + i {
                break;
            }
        }
        idx[i] += 1;
        for j in i + 1..5 {
            idx[j] = idx[j - 1] + 1;
        }
    }
}

/// Best five card rank from up to seven cards. Every five card subset is
/// scored, so the result is exact. Returns `None` when fewer than five
/// cards are given.
pub fn best_of(cards: &[Card]) -> Option<HandRank> {
    five_card_subsets(cards)
        .iter()
        .map(evaluate)
        .max()
}

#[must_use]
pub fn compare(a: &HandRank, b: &HandRank) -> Ordering {
    a.cmp(b)
}

/// Get all indices that share the max rank.
pub fn argmax(ranks: &[HandRank]) -> Vec<usize> {
    let Some(best) = ranks.iter().max() else {
        return Vec::new();
    };
    ranks
        .iter()
        .enumerate()
        .filter(|(_, rank)| *rank == best)
        .map(|(i, _)| i)
        .collect()
}
