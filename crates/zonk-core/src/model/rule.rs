//! Scoring rules and their metadata.
//!
//! `RULE_TABLE` is the only place that knows how many dice a rule consumes,
//! which tier it belongs to and how it is priced. The catalog, the tier
//! classifier and the bot all read from it.

use crate::model::tier::Tier;
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

pub const PAIR_POINTS: u32 = 100;
pub const FULL_HOUSE_PAIR_BONUS: u32 = 250;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Rule {
    LargeStraight = 0,
    SixOfAKind = 1,
    TwoSets = 2,
    FiveStraight = 3,
    FourOfAKind = 4,
    FullHouse = 5,
    ThreePairs = 6,
    FourStraight = 7,
    ThreeOfAKind = 8,
    ThreeStraight = 9,
    TwoPair = 10,
    Pair = 11,
    One = 12,
    Five = 13,
}

/// How a rule turns its dice into points, before the rule multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointFormula {
    Fixed(u32),
    /// `factor` times the three-of-a-kind value of the primary face.
    FaceScaled { factor: u32 },
    /// Three-of-a-kind value of the primary face plus a flat bonus.
    FacePlus { bonus: u32 },
    /// Pair value of the primary face.
    PairOfFace,
}

#[derive(Debug, Clone, Copy)]
pub struct RuleInfo {
    pub rule: Rule,
    pub key: &'static str,
    pub label: &'static str,
    pub dice_used: u8,
    pub tier: Tier,
    pub formula: PointFormula,
}

const RULE_TABLE: [RuleInfo; 14] = [
    RuleInfo {
        rule: Rule::LargeStraight,
        key: "large_straight",
        label: "Large straight",
        dice_used: 6,
        tier: Tier::One,
        formula: PointFormula::Fixed(1500),
    },
    RuleInfo {
        rule: Rule::SixOfAKind,
        key: "six_of_a_kind",
        label: "Six of a kind",
        dice_used: 6,
        tier: Tier::One,
        formula: PointFormula::FaceScaled { factor: 4 },
    },
    RuleInfo {
        rule: Rule::TwoSets,
        key: "two_sets",
        label: "Two sets",
        dice_used: 6,
        tier: Tier::One,
        formula: PointFormula::Fixed(2500),
    },
    RuleInfo {
        rule: Rule::FiveStraight,
        key: "five_straight",
        label: "Five straight",
        dice_used: 5,
        tier: Tier::One,
        formula: PointFormula::Fixed(750),
    },
    RuleInfo {
        rule: Rule::FourOfAKind,
        key: "four_of_a_kind",
        label: "Four of a kind",
        dice_used: 4,
        tier: Tier::Two,
        formula: PointFormula::FaceScaled { factor: 2 },
    },
    RuleInfo {
        rule: Rule::FullHouse,
        key: "full_house",
        label: "Full house",
        dice_used: 5,
        tier: Tier::Two,
        formula: PointFormula::FacePlus {
            bonus: FULL_HOUSE_PAIR_BONUS,
        },
    },
    RuleInfo {
        rule: Rule::ThreePairs,
        key: "three_pairs",
        label: "Three pairs",
        dice_used: 6,
        tier: Tier::Two,
        formula: PointFormula::Fixed(750),
    },
    RuleInfo {
        rule: Rule::FourStraight,
        key: "four_straight",
        label: "Four straight",
        dice_used: 4,
        tier: Tier::Two,
        formula: PointFormula::Fixed(500),
    },
    RuleInfo {
        rule: Rule::ThreeOfAKind,
        key: "three_of_a_kind",
        label: "Three of a kind",
        dice_used: 3,
        tier: Tier::Three,
        formula: PointFormula::FaceScaled { factor: 1 },
    },
    RuleInfo {
        rule: Rule::ThreeStraight,
        key: "three_straight",
        label: "Three straight",
        dice_used: 3,
        tier: Tier::Three,
        formula: PointFormula::Fixed(225),
    },
    RuleInfo {
        rule: Rule::TwoPair,
        key: "two_pair",
        label: "Two pair",
        dice_used: 4,
        tier: Tier::Four,
        formula: PointFormula::Fixed(200),
    },
    RuleInfo {
        rule: Rule::Pair,
        key: "pair",
        label: "Pair",
        dice_used: 2,
        tier: Tier::Four,
        formula: PointFormula::PairOfFace,
    },
    RuleInfo {
        rule: Rule::One,
        key: "one",
        label: "Single one",
        dice_used: 1,
        tier: Tier::Five,
        formula: PointFormula::Fixed(100),
    },
    RuleInfo {
        rule: Rule::Five,
        key: "five",
        label: "Single five",
        dice_used: 1,
        tier: Tier::Five,
        formula: PointFormula::Fixed(50),
    },
];

impl Rule {
    pub const ALL: [Rule; 14] = [
        Rule::LargeStraight,
        Rule::SixOfAKind,
        Rule::TwoSets,
        Rule::FiveStraight,
        Rule::FourOfAKind,
        Rule::FullHouse,
        Rule::ThreePairs,
        Rule::FourStraight,
        Rule::ThreeOfAKind,
        Rule::ThreeStraight,
        Rule::TwoPair,
        Rule::Pair,
        Rule::One,
        Rule::Five,
    ];

    pub const fn info(self) -> &'static RuleInfo {
        &RULE_TABLE[self as usize]
    }

    pub const fn dice_used(self) -> usize {
        self.info().dice_used as usize
    }

    pub const fn key(self) -> &'static str {
        self.info().key
    }

    pub const fn label(self) -> &'static str {
        self.info().label
    }

    /// Points before the rule multiplier. `face` is the face the pattern is
    /// built on (triple face for a full house); fixed-price rules ignore it.
    pub fn base_points(self, face: u8) -> u32 {
        match self.info().formula {
            PointFormula::Fixed(points) => points,
            PointFormula::FaceScaled { factor } => factor * set_points(face),
            PointFormula::FacePlus { bonus } => set_points(face) + bonus,
            PointFormula::PairOfFace => pair_points(face),
        }
    }

    /// Applies the configurable multiplier; negative or non-finite
    /// multipliers price everything at zero.
    pub fn points(self, face: u8, multiplier: f64) -> u32 {
        let base = self.base_points(face) as f64;
        if !multiplier.is_finite() || multiplier <= 0.0 {
            return 0;
        }
        (base * multiplier).floor() as u32
    }
}

/// Three-of-a-kind value of a face: 1000 for ones, otherwise face × 100.
pub const fn set_points(face: u8) -> u32 {
    if face == 1 { 1000 } else { face as u32 * 100 }
}

pub const fn pair_points(face: u8) -> u32 {
    if face == 1 { 2 * PAIR_POINTS } else { PAIR_POINTS }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRule(pub String);

impl fmt::Display for UnknownRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown scoring rule '{}'", self.0)
    }
}

impl std::error::Error for UnknownRule {}

impl FromStr for Rule {
    type Err = UnknownRule;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Rule::ALL
            .iter()
            .copied()
            .find(|rule| rule.key() == normalized)
            .ok_or_else(|| UnknownRule(s.to_string()))
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
