//! Enumerates every scoring pattern available in a pool of dice.
//!
//! The output lists one combination per distinct satisfiable pattern, not only
//! the best one. Indices always refer to the pool passed in, taking the
//! lowest matching positions first.

use crate::model::combination::Combination;
use crate::model::dice::{DiceSet, FaceCounts, MAX_DICE, MAX_FACE, MIN_FACE};
use crate::model::rule::Rule;

pub const DEFAULT_RULE_MULTIPLIER: f64 = 1.0;

const FACES: core::ops::RangeInclusive<u8> = MIN_FACE..=MAX_FACE;

/// All combinations at the default multiplier.
pub fn enumerate(dice: &DiceSet) -> Vec<Combination> {
    enumerate_with(dice, DEFAULT_RULE_MULTIPLIER)
}

/// Raw values are accepted for callers holding unvalidated input; an invalid
/// pool yields no combinations.
pub fn enumerate_values(values: &[u8], multiplier: f64) -> Vec<Combination> {
    match DiceSet::from_values(values) {
        Ok(dice) => enumerate_with(&dice, multiplier),
        Err(_) => Vec::new(),
    }
}

pub fn has_scoring_combination(dice: &DiceSet) -> bool {
    !enumerate(dice).is_empty()
}

pub fn enumerate_with(dice: &DiceSet, multiplier: f64) -> Vec<Combination> {
    if dice.is_empty() || dice.len() > MAX_DICE {
        return Vec::new();
    }

    let pool = Pool::new(dice);
    let mut found = Vec::new();

    push_straights(&pool, multiplier, &mut found);
    push_of_a_kind(&pool, multiplier, &mut found);
    push_full_houses(&pool, multiplier, &mut found);
    push_six_dice_sets(&pool, multiplier, &mut found);
    push_pairs(&pool, multiplier, &mut found);
    push_singles(&pool, multiplier, &mut found);

    found
}

struct Pool {
    len: usize,
    counts: FaceCounts,
    positions: [Vec<usize>; MAX_FACE as usize + 1],
}

impl Pool {
    fn new(dice: &DiceSet) -> Self {
        let positions = std::array::from_fn(|face| {
            if face == 0 {
                Vec::new()
            } else {
                dice.positions_of(face as u8)
            }
        });
        Self {
            len: dice.len(),
            counts: dice.counts(),
            positions,
        }
    }

    fn count(&self, face: u8) -> u8 {
        self.counts[face as usize]
    }

    fn first(&self, face: u8, n: usize) -> &[usize] {
        let slots = &self.positions[face as usize];
        &slots[..n.min(slots.len())]
    }

    fn distinct_faces(&self) -> Vec<u8> {
        FACES.filter(|&face| self.count(face) > 0).collect()
    }

    fn faces_with_at_least(&self, n: u8) -> Vec<u8> {
        FACES.filter(|&face| self.count(face) >= n).collect()
    }
}

fn push_straights(pool: &Pool, multiplier: f64, out: &mut Vec<Combination>) {
    let distinct = pool.distinct_faces();
    if pool.len == MAX_DICE && distinct.len() == MAX_DICE {
        let indices = FACES.flat_map(|face| pool.first(face, 1).to_vec()).collect();
        out.push(Combination::new(
            Rule::LargeStraight,
            Rule::LargeStraight.points(1, multiplier),
            indices,
            "Large straight 1-6",
        ));
    }

    for (run, rule) in [
        (5u8, Rule::FiveStraight),
        (4u8, Rule::FourStraight),
        (3u8, Rule::ThreeStraight),
    ] {
        for start in MIN_FACE..=(MAX_FACE - run + 1) {
            let end = start + run - 1;
            if (start..=end).all(|face| pool.count(face) > 0) {
                let indices = (start..=end)
                    .flat_map(|face| pool.first(face, 1).to_vec())
                    .collect();
                out.push(Combination::new(
                    rule,
                    rule.points(start, multiplier),
                    indices,
                    format!("{} {start}-{end}", rule.label()),
                ));
            }
        }
    }
}

fn push_of_a_kind(pool: &Pool, multiplier: f64, out: &mut Vec<Combination>) {
    for face in FACES {
        let count = pool.count(face);
        for (needed, rule) in [
            (6u8, Rule::SixOfAKind),
            (4u8, Rule::FourOfAKind),
            (3u8, Rule::ThreeOfAKind),
        ] {
            if count >= needed {
                out.push(Combination::new(
                    rule,
                    rule.points(face, multiplier),
                    pool.first(face, needed as usize).to_vec(),
                    format!("{} {face}s", rule.label()),
                ));
            }
        }
    }
}

fn push_full_houses(pool: &Pool, multiplier: f64, out: &mut Vec<Combination>) {
    let distinct = pool.distinct_faces();
    if distinct.len() != 2 {
        return;
    }
    for &triple in &distinct {
        for &pair in &distinct {
            if triple == pair || pool.count(triple) < 3 || pool.count(pair) < 2 {
                continue;
            }
            let mut indices = pool.first(triple, 3).to_vec();
            indices.extend_from_slice(pool.first(pair, 2));
            out.push(Combination::new(
                Rule::FullHouse,
                Rule::FullHouse.points(triple, multiplier),
                indices,
                format!("Full house {triple}s over {pair}s"),
            ));
        }
    }
}

fn push_six_dice_sets(pool: &Pool, multiplier: f64, out: &mut Vec<Combination>) {
    if pool.len != MAX_DICE {
        return;
    }

    let distinct = pool.distinct_faces();
    if distinct.len() == 2 && distinct.iter().all(|&face| pool.count(face) == 3) {
        let indices = distinct
            .iter()
            .flat_map(|&face| pool.first(face, 3).to_vec())
            .collect();
        out.push(Combination::new(
            Rule::TwoSets,
            Rule::TwoSets.points(distinct[0], multiplier),
            indices,
            format!("Two sets {}s and {}s", distinct[0], distinct[1]),
        ));
    }

    let paired = pool.faces_with_at_least(2);
    if paired.len() >= 3 {
        let indices = paired
            .iter()
            .take(3)
            .flat_map(|&face| pool.first(face, 2).to_vec())
            .collect();
        out.push(Combination::new(
            Rule::ThreePairs,
            Rule::ThreePairs.points(paired[0], multiplier),
            indices,
            "Three pairs",
        ));
    }
}

fn push_pairs(pool: &Pool, multiplier: f64, out: &mut Vec<Combination>) {
    let paired = pool.faces_with_at_least(2);

    for (i, &low) in paired.iter().enumerate() {
        for &high in &paired[i + 1..] {
            let mut indices = pool.first(low, 2).to_vec();
            indices.extend_from_slice(pool.first(high, 2));
            out.push(Combination::new(
                Rule::TwoPair,
                Rule::TwoPair.points(low, multiplier),
                indices,
                format!("Two pair {low}s and {high}s"),
            ));
        }
    }

    for &face in &paired {
        out.push(Combination::new(
            Rule::Pair,
            Rule::Pair.points(face, multiplier),
            pool.first(face, 2).to_vec(),
            format!("Pair of {face}s"),
        ));
    }
}

fn push_singles(pool: &Pool, multiplier: f64, out: &mut Vec<Combination>) {
    for (face, rule) in [(1u8, Rule::One), (5u8, Rule::Five)] {
        for &index in &pool.positions[face as usize] {
            out.push(Combination::new(
                rule,
                rule.points(face, multiplier),
                vec![index],
                format!("Single {face}"),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::dice::DiceSet;

    fn combos(values: &[u8]) -> Vec<Combination> {
        enumerate(&DiceSet::from_values(values).unwrap())
    }

    fn count_rule(found: &[Combination], rule: Rule) -> usize {
        found.iter().filter(|c| c.rule() == rule).count()
    }

    #[test]
    fn large_straight_uses_every_die() {
        let found = combos(&[1, 2, 3, 4, 5, 6]);
        let straight = found
            .iter()
            .find(|c| c.rule() == Rule::LargeStraight)
            .expect("large straight");
        assert_eq!(straight.dice_indices(), &[0, 1, 2, 3, 4, 5]);
        assert_eq!(straight.points(), 1500);
        assert_eq!(count_rule(&found, Rule::FiveStraight), 2);
        assert_eq!(count_rule(&found, Rule::FourStraight), 3);
        assert_eq!(count_rule(&found, Rule::ThreeStraight), 4);
        assert_eq!(count_rule(&found, Rule::One), 1);
        assert_eq!(count_rule(&found, Rule::Five), 1);
    }

    #[test]
    fn mixed_pool_reports_low_straight_and_pairs() {
        let found = combos(&[6, 4, 3, 6, 2, 4]);
        let straight = found
            .iter()
            .find(|c| c.rule() == Rule::ThreeStraight)
            .expect("2-3-4 run");
        assert_eq!(straight.points(), 225);
        assert_eq!(straight.dice_indices(), &[1, 2, 4]);

        let pairs: Vec<_> = found.iter().filter(|c| c.rule() == Rule::Pair).collect();
        assert_eq!(pairs.len(), 2);
        assert!(pairs.iter().all(|c| c.points() == 100 && c.dice_used() == 2));
        assert_eq!(count_rule(&found, Rule::TwoPair), 1);
        assert_eq!(count_rule(&found, Rule::ThreePairs), 0);
    }

    #[test]
    fn two_pair_with_ones_keeps_flat_price() {
        let found = combos(&[1, 1, 5, 5]);
        let two: Vec<u32> = found
            .iter()
            .filter(|c| c.rule() == Rule::TwoPair)
            .map(|c| c.points())
            .collect();
        assert_eq!(two, vec![200]);

        let pool = combos(&[1, 1, 5, 5, 3, 4]);
        let best = pool.iter().max_by_key(|c| c.points()).unwrap();
        assert_eq!(best.rule(), Rule::ThreeStraight);
        assert_eq!(best.points(), 225);
    }

    #[test]
    fn double_triple_reports_both_sets_and_all_singles() {
        let found = combos(&[1, 1, 1, 5, 5, 5]);
        let triples: Vec<u32> = found
            .iter()
            .filter(|c| c.rule() == Rule::ThreeOfAKind)
            .map(|c| c.points())
            .collect();
        assert_eq!(triples, vec![1000, 500]);
        assert_eq!(count_rule(&found, Rule::One), 3);
        assert_eq!(count_rule(&found, Rule::Five), 3);
        assert_eq!(count_rule(&found, Rule::TwoSets), 1);
        assert_eq!(count_rule(&found, Rule::FullHouse), 2);
    }

    #[test]
    fn of_a_kind_nests_smaller_sets() {
        let found = combos(&[3, 3, 3, 3, 3, 3]);
        assert_eq!(count_rule(&found, Rule::SixOfAKind), 1);
        assert_eq!(count_rule(&found, Rule::FourOfAKind), 1);
        assert_eq!(count_rule(&found, Rule::ThreeOfAKind), 1);
        let four = found
            .iter()
            .find(|c| c.rule() == Rule::FourOfAKind)
            .unwrap();
        assert_eq!(four.dice_indices(), &[0, 1, 2, 3]);
        assert_eq!(four.points(), 600);
    }

    #[test]
    fn full_house_needs_exactly_two_faces() {
        let found = combos(&[2, 2, 2, 3, 3]);
        let house = found
            .iter()
            .find(|c| c.rule() == Rule::FullHouse)
            .expect("full house");
        assert_eq!(house.points(), 450);
        assert_eq!(house.dice_used(), 5);

        let found = combos(&[2, 2, 2, 3, 3, 4]);
        assert_eq!(count_rule(&found, Rule::FullHouse), 0);
    }

    #[test]
    fn three_pairs_only_on_six_dice() {
        assert_eq!(count_rule(&combos(&[2, 2, 4, 4, 6, 6]), Rule::ThreePairs), 1);
        assert_eq!(count_rule(&combos(&[2, 2, 4, 4, 6]), Rule::ThreePairs), 0);
    }

    #[test]
    fn bust_pool_has_no_combinations() {
        assert!(combos(&[2, 3, 6]).is_empty());
        assert!(combos(&[4, 6]).is_empty());
        assert!(combos(&[2, 3, 6, 4]).len() == 1);
        assert!(combos(&[2]).is_empty());
        assert!(!has_scoring_combination(&DiceSet::from_values(&[3, 6]).unwrap()));
    }

    #[test]
    fn invalid_or_empty_input_yields_nothing() {
        assert!(enumerate(&DiceSet::new()).is_empty());
        assert!(enumerate_values(&[1, 9], 1.0).is_empty());
        assert!(enumerate_values(&[1, 1, 1, 1, 1, 1, 1], 1.0).is_empty());
        assert_eq!(enumerate_values(&[1], 1.0).len(), 1);
    }

    #[test]
    fn multiplier_applies_to_every_rule() {
        let dice = DiceSet::from_values(&[1, 5]).unwrap();
        let found = enumerate_with(&dice, 2.0);
        let points: Vec<u32> = found.iter().map(|c| c.points()).collect();
        assert_eq!(points, vec![200, 100]);
    }
}
