use crate::model::rule::Rule;
use crate::model::tier::Tier;
use core::fmt;
use serde::{Deserialize, Serialize};

/// One way of banking dice out of a particular pool.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Combination {
    rule: Rule,
    points: u32,
    dice_indices: Vec<usize>,
    description: String,
}

impl Combination {
    /// `dice_indices` are sorted; callers are trusted to pass distinct
    /// positions from the pool the combination was found in.
    pub fn new(
        rule: Rule,
        points: u32,
        mut dice_indices: Vec<usize>,
        description: impl Into<String>,
    ) -> Self {
        dice_indices.sort_unstable();
        Self {
            rule,
            points,
            dice_indices,
            description: description.into(),
        }
    }

    pub fn rule(&self) -> Rule {
        self.rule
    }

    pub fn points(&self) -> u32 {
        self.points
    }

    pub fn dice_used(&self) -> usize {
        self.dice_indices.len()
    }

    pub fn dice_indices(&self) -> &[usize] {
        &self.dice_indices
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn tier(&self) -> Tier {
        Tier::classify(self.rule)
    }

    /// Points per die consumed.
    pub fn strategic_value(&self) -> f64 {
        if self.dice_indices.is_empty() {
            return 0.0;
        }
        self.points as f64 / self.dice_indices.len() as f64
    }

    pub fn clears_pool(&self, pool_size: usize) -> bool {
        pool_size > 0 && self.dice_used() == pool_size
    }
}

impl fmt::Display for Combination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} pts, {} dice)",
            self.description,
            self.points,
            self.dice_used()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategic_value_is_points_per_die() {
        let combo = Combination::new(Rule::ThreeStraight, 225, vec![4, 1, 2], "2-3-4");
        assert_eq!(combo.dice_indices(), &[1, 2, 4]);
        assert_eq!(combo.dice_used(), 3);
        assert!((combo.strategic_value() - 75.0).abs() < f64::EPSILON);
        assert_eq!(combo.tier(), Tier::Three);
    }

    #[test]
    fn clears_pool_only_when_every_die_is_used() {
        let combo = Combination::new(Rule::Pair, 100, vec![0, 1], "Pair of 4s");
        assert!(combo.clears_pool(2));
        assert!(!combo.clears_pool(3));
        assert!(!combo.clears_pool(0));
    }

    #[test]
    fn display_mentions_points_and_dice() {
        let combo = Combination::new(Rule::One, 100, vec![3], "Single 1");
        assert_eq!(combo.to_string(), "Single 1 (100 pts, 1 dice)");
    }
}
