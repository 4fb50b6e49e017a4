mod driver;
mod events;
mod machine;
mod state;

pub use driver::TurnDriver;
pub use events::{EventSink, NullSink, TurnEvent};
pub use machine::{TurnEnd, TurnOutcome, TurnStateMachine};
pub use state::{TurnPhase, TurnState};

use core::fmt;
use zonk_core::model::dice::DiceError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnError {
    /// The dice source failed or handed back an invalid pool.
    Dice(DiceError),
    /// `step` was called after the turn reached Ended or Busted.
    AlreadyFinished,
    /// The driver gave up after this many steps without a terminal phase.
    StepBudgetExceeded(usize),
}

impl fmt::Display for TurnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnError::Dice(err) => write!(f, "dice source failed: {err}"),
            TurnError::AlreadyFinished => write!(f, "turn has already finished"),
            TurnError::StepBudgetExceeded(steps) => {
                write!(f, "turn did not finish within {steps} steps")
            }
        }
    }
}

impl std::error::Error for TurnError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TurnError::Dice(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DiceError> for TurnError {
    fn from(err: DiceError) -> Self {
        TurnError::Dice(err)
    }
}
