use serde::Serialize;
use zonk_core::model::combination::Combination;
use zonk_core::model::dice::DiceSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnPhase {
    Idle,
    Rolling,
    Evaluating,
    Banking,
    Deciding,
    Ended,
    Busted,
}

impl TurnPhase {
    pub const fn is_terminal(self) -> bool {
        matches!(self, TurnPhase::Ended | TurnPhase::Busted)
    }
}

/// Turn-scoped scratch state, owned by one state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnState {
    current_dice: DiceSet,
    banked_score: u32,
    iteration_count: u32,
    max_iterations: u32,
    successful_combinations: u32,
    hot_streaks: u32,
    completed: Vec<Combination>,
}

impl TurnState {
    pub fn new(max_iterations: u32) -> Self {
        Self {
            current_dice: DiceSet::new(),
            banked_score: 0,
            iteration_count: 0,
            max_iterations,
            successful_combinations: 0,
            hot_streaks: 0,
            completed: Vec::new(),
        }
    }

    pub fn current_dice(&self) -> &DiceSet {
        &self.current_dice
    }

    pub fn banked_score(&self) -> u32 {
        self.banked_score
    }

    pub fn iteration_count(&self) -> u32 {
        self.iteration_count
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    pub fn successful_combinations(&self) -> u32 {
        self.successful_combinations
    }

    pub fn hot_streaks(&self) -> u32 {
        self.hot_streaks
    }

    pub fn completed(&self) -> &[Combination] {
        &self.completed
    }

    pub fn at_iteration_limit(&self) -> bool {
        self.iteration_count >= self.max_iterations
    }

    pub(crate) fn record_roll(&mut self, dice: DiceSet) {
        self.current_dice = dice;
        self.iteration_count += 1;
    }

    pub(crate) fn record_hot_streak(&mut self, dice: DiceSet) {
        self.hot_streaks += 1;
        self.record_roll(dice);
    }

    pub(crate) fn current_dice_mut(&mut self) -> &mut DiceSet {
        &mut self.current_dice
    }

    pub(crate) fn bank(&mut self, combination: Combination) {
        self.banked_score = self.banked_score.saturating_add(combination.points());
        self.successful_combinations += 1;
        self.completed.push(combination);
    }

    /// Returns the points lost.
    pub(crate) fn forfeit(&mut self) -> u32 {
        std::mem::take(&mut self.banked_score)
    }
}
