use crate::bot::{BehaviorMode, StopDecision};
use serde::Serialize;
use zonk_core::model::combination::Combination;
use zonk_core::model::dice::DiceSet;

/// Emitted by the turn state machine, in order: one `TurnStarted`, then a
/// `CombinationSelected` per bank with a `DecisionMade` after each one that
/// leaves dice behind, and finally `TurnCompleted` or `Busted`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TurnEvent {
    TurnStarted {
        mode: BehaviorMode,
        points_cap: u32,
        max_iterations: u32,
        initial_dice: DiceSet,
    },
    CombinationSelected {
        combination: Combination,
    },
    DecisionMade {
        decision: StopDecision,
    },
    TurnCompleted {
        final_banked_score: u32,
        iterations_used: u32,
        combinations: Vec<Combination>,
    },
    Busted {
        dice: DiceSet,
        forfeited_points: u32,
        iterations_used: u32,
    },
}

impl TurnEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TurnEvent::TurnCompleted { .. } | TurnEvent::Busted { .. }
        )
    }
}

/// Observer for turn events. Sinks see events after the fact and cannot
/// influence the turn.
pub trait EventSink {
    fn record(&mut self, event: &TurnEvent);
}

impl EventSink for Vec<TurnEvent> {
    fn record(&mut self, event: &TurnEvent) {
        self.push(event.clone());
    }
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn record(&mut self, event: &TurnEvent) {
        (**self).record(event);
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn record(&mut self, _event: &TurnEvent) {}
}
