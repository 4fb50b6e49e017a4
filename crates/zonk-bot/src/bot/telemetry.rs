//! Bounded per-player turn history.

use super::{BehaviorMode, StopReason};
use crate::turn::{EventSink, TurnEvent};
use serde::Serialize;
use std::collections::VecDeque;
use zonk_core::model::dice::DiceSet;
use zonk_core::model::rule::Rule;

pub const DEFAULT_TELEMETRY_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnRecord {
    pub mode: BehaviorMode,
    pub points_cap: u32,
    pub initial_dice: DiceSet,
    pub selections: Vec<Rule>,
    pub decisions: u32,
    pub stop_reason: Option<StopReason>,
    pub final_score: u32,
    pub busted: bool,
    pub iterations: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TelemetryTotals {
    pub turns: u64,
    pub busts: u64,
    pub points: u64,
    pub combinations: u64,
    pub decisions: u64,
}

impl TelemetryTotals {
    pub fn bust_rate(&self) -> f64 {
        if self.turns == 0 {
            return 0.0;
        }
        self.busts as f64 / self.turns as f64
    }

    pub fn mean_points(&self) -> f64 {
        if self.turns == 0 {
            return 0.0;
        }
        self.points as f64 / self.turns as f64
    }
}

/// Keeps the most recent `capacity` turns plus running totals for all of them.
#[derive(Debug, Clone)]
pub struct TurnTelemetry {
    history: VecDeque<TurnRecord>,
    current: Option<TurnRecord>,
    totals: TelemetryTotals,
    capacity: usize,
}

impl TurnTelemetry {
    pub fn new(capacity: usize) -> Self {
        Self {
            history: VecDeque::with_capacity(capacity.min(DEFAULT_TELEMETRY_CAPACITY)),
            current: None,
            totals: TelemetryTotals::default(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &TurnRecord> {
        self.history.iter()
    }

    pub fn last(&self) -> Option<&TurnRecord> {
        self.history.back()
    }

    pub fn totals(&self) -> TelemetryTotals {
        self.totals
    }

    pub fn clear(&mut self) {
        self.history.clear();
        self.current = None;
        self.totals = TelemetryTotals::default();
    }

    fn close_turn(&mut self, final_score: u32, busted: bool, iterations: u32) {
        let Some(mut record) = self.current.take() else {
            return;
        };
        record.final_score = final_score;
        record.busted = busted;
        record.iterations = iterations;

        self.totals.turns += 1;
        self.totals.points += u64::from(final_score);
        self.totals.combinations += record.selections.len() as u64;
        self.totals.decisions += u64::from(record.decisions);
        if busted {
            self.totals.busts += 1;
        }

        if self.capacity == 0 {
            return;
        }
        while self.history.len() >= self.capacity {
            self.history.pop_front();
        }
        self.history.push_back(record);
    }
}

impl Default for TurnTelemetry {
    fn default() -> Self {
        Self::new(DEFAULT_TELEMETRY_CAPACITY)
    }
}

impl EventSink for TurnTelemetry {
    fn record(&mut self, event: &TurnEvent) {
        match event {
            TurnEvent::TurnStarted {
                mode,
                points_cap,
                initial_dice,
                ..
            } => {
                self.current = Some(TurnRecord {
                    mode: *mode,
                    points_cap: *points_cap,
                    initial_dice: initial_dice.clone(),
                    selections: Vec::new(),
                    decisions: 0,
                    stop_reason: None,
                    final_score: 0,
                    busted: false,
                    iterations: 0,
                });
            }
            TurnEvent::CombinationSelected { combination } => {
                if let Some(record) = self.current.as_mut() {
                    record.selections.push(combination.rule());
                }
            }
            TurnEvent::DecisionMade { decision } => {
                if let Some(record) = self.current.as_mut() {
                    record.decisions += 1;
                    if decision.should_stop {
                        record.stop_reason = Some(decision.reason);
                    }
                }
            }
            TurnEvent::TurnCompleted {
                final_banked_score,
                iterations_used,
                ..
            } => self.close_turn(*final_banked_score, false, *iterations_used),
            TurnEvent::Busted {
                iterations_used, ..
            } => self.close_turn(0, true, *iterations_used),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zonk_core::model::combination::Combination;

    fn play_turn(telemetry: &mut TurnTelemetry, score: u32, busted: bool) {
        telemetry.record(&TurnEvent::TurnStarted {
            mode: BehaviorMode::Aggressive,
            points_cap: 1000,
            max_iterations: 5,
            initial_dice: DiceSet::from_values(&[1, 2, 3, 4, 5, 6]).unwrap(),
        });
        telemetry.record(&TurnEvent::CombinationSelected {
            combination: Combination::new(Rule::One, 100, vec![0], "Single 1"),
        });
        if busted {
            telemetry.record(&TurnEvent::Busted {
                dice: DiceSet::from_values(&[2, 3, 6]).unwrap(),
                forfeited_points: 100,
                iterations_used: 2,
            });
        } else {
            telemetry.record(&TurnEvent::TurnCompleted {
                final_banked_score: score,
                iterations_used: 1,
                combinations: Vec::new(),
            });
        }
    }

    #[test]
    fn history_is_bounded_but_totals_are_not() {
        let mut telemetry = TurnTelemetry::new(3);
        for turn in 0..5 {
            play_turn(&mut telemetry, 100 * turn, turn == 4);
        }
        assert_eq!(telemetry.len(), 3);
        assert_eq!(telemetry.totals().turns, 5);
        assert_eq!(telemetry.totals().busts, 1);
        assert_eq!(telemetry.totals().points, 600);
        assert!((telemetry.totals().bust_rate() - 0.2).abs() < 1e-9);
        let last = telemetry.last().unwrap();
        assert!(last.busted);
        assert_eq!(last.final_score, 0);
        assert_eq!(last.selections, vec![Rule::One]);
    }

    #[test]
    fn zero_capacity_only_counts() {
        let mut telemetry = TurnTelemetry::new(0);
        play_turn(&mut telemetry, 300, false);
        assert!(telemetry.is_empty());
        assert_eq!(telemetry.totals().turns, 1);
        assert!((telemetry.totals().mean_points() - 300.0).abs() < 1e-9);
    }
}
