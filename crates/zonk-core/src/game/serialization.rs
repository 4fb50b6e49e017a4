use super::match_state::MatchState;
use crate::model::seat::Seat;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchSnapshot {
    pub seed: u64,
    pub round_number: u32,
    pub scores: [u32; 2],
    pub target_score: u32,
    pub starting_seat: Seat,
    pub current_seat: Seat,
    #[serde(default)]
    pub turns_played: u32,
}

impl MatchSnapshot {
    pub fn capture(state: &MatchState) -> Self {
        MatchSnapshot {
            seed: state.seed(),
            round_number: state.round_number(),
            scores: *state.scores().standings(),
            target_score: state.target_score(),
            starting_seat: state.starting_seat(),
            current_seat: state.current_seat(),
            turns_played: state.turns_played(),
        }
    }

    pub fn restore(self) -> MatchState {
        MatchState::from_snapshot(&self)
    }

    pub fn to_json(state: &MatchState) -> serde_json::Result<String> {
        let snapshot = Self::capture(state);
        serde_json::to_string_pretty(&snapshot)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
