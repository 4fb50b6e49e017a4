use crate::model::rule::Rule;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Strategic bucket of a scoring rule. `One` is the strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Tier {
    One = 1,
    Two = 2,
    Three = 3,
    Four = 4,
    Five = 5,
}

impl Tier {
    pub const ALL: [Tier; 5] = [Tier::One, Tier::Two, Tier::Three, Tier::Four, Tier::Five];

    pub const fn rank(self) -> u8 {
        self as u8
    }

    pub const fn value_fraction(self) -> f64 {
        match self {
            Tier::One => 1.0,
            Tier::Two => 0.8,
            Tier::Three => 0.6,
            Tier::Four => 0.4,
            Tier::Five => 0.2,
        }
    }

    pub const fn classify(rule: Rule) -> Tier {
        rule.info().tier
    }

    /// Looks a rule up by name; anything unrecognised lands in the lowest tier.
    pub fn classify_name(name: &str) -> Tier {
        name.parse::<Rule>()
            .map(Tier::classify)
            .unwrap_or(Tier::Five)
    }

    /// True when `self` is a better tier than `other`.
    pub fn outranks(self, other: Tier) -> bool {
        self.rank() < other.rank()
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tier{}", self.rank())
    }
}
