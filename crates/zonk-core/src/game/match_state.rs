use crate::model::roller::RandomDice;
use crate::model::score::{ScoreBoard, SeatLedger};
use crate::model::seat::Seat;
use rand::SeedableRng;
use rand::rngs::StdRng;

pub const DEFAULT_TARGET_SCORE: u32 = 5000;

/// Salt separating the decision stream from the dice stream of one seed.
const DECISION_STREAM: u64 = 0x9E37_79B9_7F4A_7C15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnAdvance {
    pub round_advanced: bool,
    pub winner: Option<Seat>,
}

#[derive(Debug, Clone)]
pub struct MatchState {
    scores: ScoreBoard,
    round_number: u32,
    starting_seat: Seat,
    current_seat: Seat,
    target_score: u32,
    turns_played: u32,
    winner: Option<Seat>,
    seed: u64,
}

impl MatchState {
    pub fn new(starting_seat: Seat) -> Self {
        let seed: u64 = rand::random();
        Self::with_seed(starting_seat, seed)
    }

    pub fn with_seed(starting_seat: Seat, seed: u64) -> Self {
        Self {
            scores: ScoreBoard::new(),
            round_number: 1,
            starting_seat,
            current_seat: starting_seat,
            target_score: DEFAULT_TARGET_SCORE,
            turns_played: 0,
            winner: None,
            seed,
        }
    }

    pub fn with_target(mut self, target_score: u32) -> Self {
        self.target_score = target_score.max(1);
        self
    }

    pub fn from_snapshot(snapshot: &crate::game::serialization::MatchSnapshot) -> Self {
        let mut state = MatchState::with_seed(snapshot.starting_seat, snapshot.seed)
            .with_target(snapshot.target_score);
        state.round_number = snapshot.round_number.max(1);
        state.current_seat = snapshot.current_seat;
        state.turns_played = snapshot.turns_played;
        state.scores.set_totals(snapshot.scores);
        state.winner = Seat::LOOP
            .iter()
            .copied()
            .find(|seat| state.scores.score(*seat) >= state.target_score);
        state
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn scores(&self) -> &ScoreBoard {
        &self.scores
    }

    pub fn scores_mut(&mut self) -> &mut ScoreBoard {
        &mut self.scores
    }

    /// Ledger for whoever is on turn.
    pub fn current_ledger(&mut self) -> SeatLedger<'_> {
        let seat = self.current_seat;
        self.scores.ledger(seat)
    }

    pub fn round_number(&self) -> u32 {
        self.round_number
    }

    pub fn starting_seat(&self) -> Seat {
        self.starting_seat
    }

    pub fn current_seat(&self) -> Seat {
        self.current_seat
    }

    pub fn target_score(&self) -> u32 {
        self.target_score
    }

    pub fn turns_played(&self) -> u32 {
        self.turns_played
    }

    pub fn winner(&self) -> Option<Seat> {
        self.winner
    }

    pub fn is_finished(&self) -> bool {
        self.winner.is_some()
    }

    /// Dice stream for this match; identical seeds give identical rolls.
    pub fn dice_source(&self) -> RandomDice<StdRng> {
        RandomDice::with_seed(self.seed)
    }

    /// Stream for stop/continue draws, independent of the dice stream.
    pub fn decision_rng(&self) -> StdRng {
        StdRng::seed_from_u64(self.seed ^ DECISION_STREAM)
    }

    /// Closes the current seat's turn after its delta has been committed.
    pub fn finish_turn(&mut self) -> TurnAdvance {
        self.turns_played += 1;
        if self.winner.is_none() && self.scores.score(self.current_seat) >= self.target_score {
            self.winner = Some(self.current_seat);
        }

        self.current_seat = self.current_seat.opponent();
        let round_advanced = self.current_seat == self.starting_seat;
        if round_advanced {
            self.round_number += 1;
        }

        TurnAdvance {
            round_advanced,
            winner: self.winner,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::roller::DiceSource;
    use crate::model::score::ScoreLedger;
    use rand::Rng;

    #[test]
    fn turns_alternate_and_rounds_advance() {
        let mut state = MatchState::with_seed(Seat::Player, 3);
        assert_eq!(state.current_seat(), Seat::Player);
        let first = state.finish_turn();
        assert!(!first.round_advanced);
        assert_eq!(state.current_seat(), Seat::Ai);
        let second = state.finish_turn();
        assert!(second.round_advanced);
        assert_eq!(state.round_number(), 2);
        assert_eq!(state.turns_played(), 2);
    }

    #[test]
    fn reaching_target_declares_winner() {
        let mut state = MatchState::with_seed(Seat::Ai, 11).with_target(500);
        state.current_ledger().commit_turn_score(650);
        let advance = state.finish_turn();
        assert_eq!(advance.winner, Some(Seat::Ai));
        assert!(state.is_finished());
    }

    #[test]
    fn streams_are_reproducible_per_seed() {
        let a = MatchState::with_seed(Seat::Ai, 99);
        let b = MatchState::with_seed(Seat::Ai, 99);
        assert_eq!(
            a.dice_source().roll(6).unwrap(),
            b.dice_source().roll(6).unwrap()
        );
        let x: u64 = a.decision_rng().r#gen();
        let y: u64 = b.decision_rng().r#gen();
        assert_eq!(x, y);
    }
}
