//! Probabilistic stop/continue model.
//!
//! Two independent triggers: a momentum chance that grows with pressure and a
//! cap chance that only exists once the turn has banked past its points cap.
//! Each is rolled on its own draw; either firing stops the turn.

use super::{AiConfig, BehaviorMode};
use core::fmt;
use rand::Rng;
use serde::Serialize;

pub const FIBONACCI: [u32; 9] = [1, 1, 2, 3, 5, 8, 13, 21, 34];

/// Discount on the naive `(4/6)^n` bust estimate, indexed by dice count - 1.
pub const BUST_ADJUSTMENT: [f64; 6] = [1.0, 0.85, 0.7, 0.55, 0.4, 0.25];

const NON_SCORING_FACES: f64 = 4.0 / 6.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    Continue,
    MomentumRoll,
    CapRoll,
    BothRolls,
    IterationLimit,
    LeadPreservation,
    BustRisk,
    EarlySatisfaction,
    LowDiceCount,
}

impl StopReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            StopReason::Continue => "continue",
            StopReason::MomentumRoll => "momentum_roll",
            StopReason::CapRoll => "cap_roll",
            StopReason::BothRolls => "both_rolls",
            StopReason::IterationLimit => "iteration_limit",
            StopReason::LeadPreservation => "lead_preservation",
            StopReason::BustRisk => "bust_risk",
            StopReason::EarlySatisfaction => "early_satisfaction",
            StopReason::LowDiceCount => "low_dice_count",
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StopDecision {
    pub momentum_chance: f64,
    pub cap_chance: f64,
    pub combined_chance: f64,
    pub momentum_roll: bool,
    pub cap_roll: bool,
    pub should_stop: bool,
    pub reason: StopReason,
    pub bust_probability: f64,
}

impl StopDecision {
    /// Decision forced by a rule rather than a roll.
    pub fn forced(reason: StopReason, momentum: f64, cap: f64, bust_probability: f64) -> Self {
        Self {
            momentum_chance: momentum,
            cap_chance: cap,
            combined_chance: RiskModel::combined_chance(momentum, cap),
            momentum_roll: false,
            cap_roll: false,
            should_stop: true,
            reason,
            bust_probability,
        }
    }
}

/// State of the turn at a decision point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecisionInputs {
    pub iteration: u32,
    pub successes: u32,
    pub dice_remaining: usize,
    pub banked: u32,
    pub points_cap: u32,
}

pub fn fibonacci_factor(iteration: i64) -> f64 {
    if iteration <= 0 {
        return 1.0;
    }
    let index = (iteration as usize).min(FIBONACCI.len() - 1);
    f64::from(FIBONACCI[index])
}

/// Rough chance that rolling `dice` dice produces no scoring combination.
pub fn bust_probability(dice: usize) -> f64 {
    if dice == 0 {
        return 0.0;
    }
    let adjustment = BUST_ADJUSTMENT[dice.min(BUST_ADJUSTMENT.len()) - 1];
    NON_SCORING_FACES.powi(dice as i32) * adjustment
}

#[derive(Debug, Clone, Copy)]
pub struct RiskModel<'a> {
    config: &'a AiConfig,
}

impl<'a> RiskModel<'a> {
    pub fn new(config: &'a AiConfig) -> Self {
        Self { config }
    }

    pub fn momentum_chance(
        &self,
        mode: BehaviorMode,
        iteration: u32,
        successes: u32,
        dice_remaining: usize,
    ) -> f64 {
        let config = self.config;
        let success_multiplier = (1.0 - f64::from(successes) * config.momentum_success_reduction)
            .max(config.momentum_min_multiplier);

        let dice_risk_multiplier = if dice_remaining > 2 {
            1.0
        } else {
            let missing = (3 - dice_remaining) as f64;
            1.0 + missing.powf(config.dice_risk_exponent) * config.dice_risk_coefficient
        };

        let pressure_multiplier = if iteration <= 2 {
            1.0
        } else {
            1.0 + f64::from(iteration - 2) * config.iteration_pressure_increase
        };

        let raw = config.momentum_base(mode)
            * fibonacci_factor(i64::from(iteration))
            * success_multiplier
            * dice_risk_multiplier
            * pressure_multiplier;
        raw.clamp(0.0, config.max_momentum_stop_chance)
    }

    pub fn cap_chance(&self, mode: BehaviorMode, banked: u32, points_cap: u32) -> f64 {
        if banked < points_cap {
            return 0.0;
        }
        let config = self.config;
        let steps = (banked - points_cap) / config.cap_growth_interval.max(1);
        let chance = config.base_cap_chance + f64::from(steps) * config.cap_growth(mode);
        chance.clamp(0.0, config.max_cap_chance)
    }

    /// Chance that at least one of two independent triggers fires.
    pub fn combined_chance(momentum: f64, cap: f64) -> f64 {
        let m = momentum.clamp(0.0, 1.0);
        let c = cap.clamp(0.0, 1.0);
        1.0 - (1.0 - m) * (1.0 - c)
    }

    /// Rolls both triggers. Two draws are always taken so the stream stays
    /// aligned whichever way the first one lands.
    pub fn decide<R: Rng + ?Sized>(
        &self,
        mode: BehaviorMode,
        inputs: &DecisionInputs,
        rng: &mut R,
    ) -> StopDecision {
        let momentum = self.momentum_chance(
            mode,
            inputs.iteration,
            inputs.successes,
            inputs.dice_remaining,
        );
        let cap = self.cap_chance(mode, inputs.banked, inputs.points_cap);

        let momentum_draw: f64 = rng.r#gen();
        let cap_draw: f64 = rng.r#gen();
        let momentum_roll = momentum_draw < momentum;
        let cap_roll = cap_draw < cap;

        let reason = match (momentum_roll, cap_roll) {
            (true, true) => StopReason::BothRolls,
            (true, false) => StopReason::MomentumRoll,
            (false, true) => StopReason::CapRoll,
            (false, false) => StopReason::Continue,
        };

        StopDecision {
            momentum_chance: momentum,
            cap_chance: cap,
            combined_chance: Self::combined_chance(momentum, cap),
            momentum_roll,
            cap_roll,
            should_stop: momentum_roll || cap_roll,
            reason,
            bust_probability: bust_probability(inputs.dice_remaining),
        }
    }
}
