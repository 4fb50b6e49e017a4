mod analyzer;
mod params;
mod player;
mod risk;
mod select;
mod stop;
mod telemetry;

pub use analyzer::{GameStateAnalyzer, LeadAnalysis, LeadState, TurnPlan};
pub use params::{AiConfig, TurnConfiguration};
pub use player::{AiPlayer, TurnSummary};
pub use risk::{DecisionInputs, RiskModel, StopDecision, StopReason, bust_probability};
pub use select::{CombinationSelector, Selection, SelectionPath, StrategyResult};
pub use stop::StopPlanner;
pub use telemetry::{TelemetryTotals, TurnRecord, TurnTelemetry};

use core::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BehaviorMode {
    /// Behind, or the game is close.
    #[default]
    Aggressive,
    /// Ahead by more than the buffer.
    Passive,
}

impl BehaviorMode {
    pub const fn is_passive(self) -> bool {
        matches!(self, BehaviorMode::Passive)
    }
}

impl fmt::Display for BehaviorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BehaviorMode::Aggressive => f.write_str("aggressive"),
            BehaviorMode::Passive => f.write_str("passive"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStrategy {
    #[default]
    MinimumDice,
    Threshold,
}

impl SelectionStrategy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "minimum_dice" | "minimum-dice" | "min_dice" | "minimum" => {
                Some(SelectionStrategy::MinimumDice)
            }
            "threshold" | "tier" => Some(SelectionStrategy::Threshold),
            _ => None,
        }
    }
}

impl fmt::Display for SelectionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionStrategy::MinimumDice => f.write_str("minimum_dice"),
            SelectionStrategy::Threshold => f.write_str("threshold"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_names_parse_loosely() {
        assert_eq!(
            SelectionStrategy::parse(" Minimum-Dice "),
            Some(SelectionStrategy::MinimumDice)
        );
        assert_eq!(
            SelectionStrategy::parse("threshold"),
            Some(SelectionStrategy::Threshold)
        );
        assert_eq!(SelectionStrategy::parse("greedy"), None);
    }

    #[test]
    fn close_games_default_to_aggressive() {
        assert_eq!(BehaviorMode::default(), BehaviorMode::Aggressive);
        assert!(!BehaviorMode::Aggressive.is_passive());
    }
}
