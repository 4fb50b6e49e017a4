use super::{BehaviorMode, SelectionStrategy};
use core::ops::Deref;
use serde::{Deserialize, Serialize};

/// Tunables for the decision core. Deserialising a partial document fills the
/// rest from `Default`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub aggressive_points_cap: u32,
    pub passive_points_cap: u32,
    pub initial_buffer_cap: u32,
    pub buffer_floor: u32,
    pub buffer_shrink: u32,
    pub buffer_shrink_every_rounds: u32,
    pub late_game_round: u32,
    pub aggressive_max_iterations: u32,
    pub passive_max_iterations: u32,
    pub aggressive_threshold_initial: f64,
    pub aggressive_threshold_reduction: f64,
    pub passive_threshold_initial: f64,
    pub passive_threshold_reduction: f64,
    pub aggressive_strategic_floor: f64,
    pub passive_strategic_floor: f64,
    pub aggressive_momentum_base: f64,
    pub passive_momentum_base: f64,
    pub momentum_success_reduction: f64,
    pub momentum_min_multiplier: f64,
    pub dice_risk_exponent: f64,
    pub dice_risk_coefficient: f64,
    pub iteration_pressure_increase: f64,
    pub max_momentum_stop_chance: f64,
    pub base_cap_chance: f64,
    pub max_cap_chance: f64,
    pub cap_growth_interval: u32,
    pub aggressive_cap_growth: f64,
    pub passive_cap_growth: f64,
    pub passive_bust_risk_threshold: f64,
    pub passive_early_satisfaction: f64,
    pub passive_two_dice_stop_chance: f64,
    pub passive_one_die_stop_chance: f64,
    pub lead_preservation_bust_threshold: f64,
    /// Pools at least this large are banked points-first.
    pub high_dice_threshold: usize,
    pub selection: SelectionStrategy,
    pub rule_multiplier: f64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            aggressive_points_cap: 1000,
            passive_points_cap: 500,
            initial_buffer_cap: 500,
            buffer_floor: 200,
            buffer_shrink: 50,
            buffer_shrink_every_rounds: 2,
            late_game_round: 10,
            aggressive_max_iterations: 5,
            passive_max_iterations: 2,
            aggressive_threshold_initial: 0.7,
            aggressive_threshold_reduction: 0.1,
            passive_threshold_initial: 0.5,
            passive_threshold_reduction: 0.08,
            aggressive_strategic_floor: 25.0,
            passive_strategic_floor: 40.0,
            aggressive_momentum_base: 0.05,
            passive_momentum_base: 0.12,
            momentum_success_reduction: 0.1,
            momentum_min_multiplier: 0.5,
            dice_risk_exponent: 2.0,
            dice_risk_coefficient: 0.5,
            iteration_pressure_increase: 0.15,
            max_momentum_stop_chance: 0.90,
            base_cap_chance: 0.30,
            max_cap_chance: 0.95,
            cap_growth_interval: 50,
            aggressive_cap_growth: 0.05,
            passive_cap_growth: 0.10,
            passive_bust_risk_threshold: 0.50,
            passive_early_satisfaction: 0.80,
            passive_two_dice_stop_chance: 0.50,
            passive_one_die_stop_chance: 0.75,
            lead_preservation_bust_threshold: 0.20,
            high_dice_threshold: 4,
            selection: SelectionStrategy::MinimumDice,
            rule_multiplier: 1.0,
        }
    }
}

impl AiConfig {
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    pub fn with_overrides<F>(mut self, mut read: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        let read_u32 = |raw: Option<String>| raw.and_then(|raw| raw.trim().parse::<u32>().ok());

        if let Some(cap) = read_u32(read("ZONK_POINTS_CAP_AGGRESSIVE")) {
            self.aggressive_points_cap = cap;
        }
        if let Some(cap) = read_u32(read("ZONK_POINTS_CAP_PASSIVE")) {
            self.passive_points_cap = cap;
        }
        if let Some(limit) = read_u32(read("ZONK_MAX_ITERATIONS_AGGRESSIVE")).filter(|v| *v > 0) {
            self.aggressive_max_iterations = limit;
        }
        if let Some(limit) = read_u32(read("ZONK_MAX_ITERATIONS_PASSIVE")).filter(|v| *v > 0) {
            self.passive_max_iterations = limit;
        }
        if let Some(strategy) = read("ZONK_SELECTION").and_then(|raw| SelectionStrategy::parse(&raw))
        {
            self.selection = strategy;
        }
        self
    }

    /// Copy with every field forced into a usable range. Values that cannot be
    /// repaired fall back to the default for that field.
    pub fn sanitized(&self) -> Self {
        let defaults = AiConfig::default();
        let chance = |value: f64, fallback: f64| {
            if value.is_finite() {
                value.clamp(0.0, 1.0)
            } else {
                fallback
            }
        };
        let non_negative = |value: f64, fallback: f64| {
            if value.is_finite() && value >= 0.0 {
                value
            } else {
                fallback
            }
        };

        let initial_buffer_cap = self.initial_buffer_cap;
        Self {
            aggressive_points_cap: self.aggressive_points_cap,
            passive_points_cap: self.passive_points_cap,
            initial_buffer_cap,
            buffer_floor: self.buffer_floor.min(initial_buffer_cap),
            buffer_shrink: self.buffer_shrink,
            buffer_shrink_every_rounds: self.buffer_shrink_every_rounds.max(1),
            late_game_round: self.late_game_round.max(1),
            aggressive_max_iterations: self.aggressive_max_iterations.max(1),
            passive_max_iterations: self.passive_max_iterations.max(1),
            aggressive_threshold_initial: chance(
                self.aggressive_threshold_initial,
                defaults.aggressive_threshold_initial,
            ),
            aggressive_threshold_reduction: non_negative(
                self.aggressive_threshold_reduction,
                defaults.aggressive_threshold_reduction,
            ),
            passive_threshold_initial: chance(
                self.passive_threshold_initial,
                defaults.passive_threshold_initial,
            ),
            passive_threshold_reduction: non_negative(
                self.passive_threshold_reduction,
                defaults.passive_threshold_reduction,
            ),
            aggressive_strategic_floor: non_negative(
                self.aggressive_strategic_floor,
                defaults.aggressive_strategic_floor,
            ),
            passive_strategic_floor: non_negative(
                self.passive_strategic_floor,
                defaults.passive_strategic_floor,
            ),
            aggressive_momentum_base: chance(
                self.aggressive_momentum_base,
                defaults.aggressive_momentum_base,
            ),
            passive_momentum_base: chance(
                self.passive_momentum_base,
                defaults.passive_momentum_base,
            ),
            momentum_success_reduction: non_negative(
                self.momentum_success_reduction,
                defaults.momentum_success_reduction,
            ),
            momentum_min_multiplier: chance(
                self.momentum_min_multiplier,
                defaults.momentum_min_multiplier,
            ),
            dice_risk_exponent: non_negative(self.dice_risk_exponent, defaults.dice_risk_exponent),
            dice_risk_coefficient: non_negative(
                self.dice_risk_coefficient,
                defaults.dice_risk_coefficient,
            ),
            iteration_pressure_increase: non_negative(
                self.iteration_pressure_increase,
                defaults.iteration_pressure_increase,
            ),
            max_momentum_stop_chance: chance(
                self.max_momentum_stop_chance,
                defaults.max_momentum_stop_chance,
            ),
            base_cap_chance: chance(self.base_cap_chance, defaults.base_cap_chance),
            max_cap_chance: chance(self.max_cap_chance, defaults.max_cap_chance),
            cap_growth_interval: self.cap_growth_interval.max(1),
            aggressive_cap_growth: non_negative(
                self.aggressive_cap_growth,
                defaults.aggressive_cap_growth,
            ),
            passive_cap_growth: non_negative(self.passive_cap_growth, defaults.passive_cap_growth),
            passive_bust_risk_threshold: chance(
                self.passive_bust_risk_threshold,
                defaults.passive_bust_risk_threshold,
            ),
            passive_early_satisfaction: non_negative(
                self.passive_early_satisfaction,
                defaults.passive_early_satisfaction,
            ),
            passive_two_dice_stop_chance: chance(
                self.passive_two_dice_stop_chance,
                defaults.passive_two_dice_stop_chance,
            ),
            passive_one_die_stop_chance: chance(
                self.passive_one_die_stop_chance,
                defaults.passive_one_die_stop_chance,
            ),
            lead_preservation_bust_threshold: chance(
                self.lead_preservation_bust_threshold,
                defaults.lead_preservation_bust_threshold,
            ),
            high_dice_threshold: self.high_dice_threshold.max(1),
            selection: self.selection,
            rule_multiplier: non_negative(self.rule_multiplier, defaults.rule_multiplier),
        }
    }

    pub fn points_cap(&self, mode: BehaviorMode) -> u32 {
        match mode {
            BehaviorMode::Aggressive => self.aggressive_points_cap,
            BehaviorMode::Passive => self.passive_points_cap,
        }
    }

    pub fn max_iterations(&self, mode: BehaviorMode) -> u32 {
        match mode {
            BehaviorMode::Aggressive => self.aggressive_max_iterations,
            BehaviorMode::Passive => self.passive_max_iterations,
        }
    }

    /// `(initial, reduction per missing die)` for the tier threshold.
    pub fn threshold_curve(&self, mode: BehaviorMode) -> (f64, f64) {
        match mode {
            BehaviorMode::Aggressive => (
                self.aggressive_threshold_initial,
                self.aggressive_threshold_reduction,
            ),
            BehaviorMode::Passive => (
                self.passive_threshold_initial,
                self.passive_threshold_reduction,
            ),
        }
    }

    pub fn strategic_floor(&self, mode: BehaviorMode) -> f64 {
        match mode {
            BehaviorMode::Aggressive => self.aggressive_strategic_floor,
            BehaviorMode::Passive => self.passive_strategic_floor,
        }
    }

    pub fn momentum_base(&self, mode: BehaviorMode) -> f64 {
        match mode {
            BehaviorMode::Aggressive => self.aggressive_momentum_base,
            BehaviorMode::Passive => self.passive_momentum_base,
        }
    }

    pub fn cap_growth(&self, mode: BehaviorMode) -> f64 {
        match mode {
            BehaviorMode::Aggressive => self.aggressive_cap_growth,
            BehaviorMode::Passive => self.passive_cap_growth,
        }
    }
}

/// Frozen, sanitised copy of an `AiConfig` taken when a turn starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurnConfiguration {
    config: AiConfig,
}

impl TurnConfiguration {
    pub fn snapshot(config: &AiConfig) -> Self {
        Self {
            config: config.sanitized(),
        }
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }
}

impl Default for TurnConfiguration {
    fn default() -> Self {
        Self::snapshot(&AiConfig::default())
    }
}

impl Deref for TurnConfiguration {
    type Target = AiConfig;

    fn deref(&self) -> &Self::Target {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn overrides_apply_only_valid_values() {
        let mut env = HashMap::new();
        env.insert("ZONK_POINTS_CAP_AGGRESSIVE", "1500".to_string());
        env.insert("ZONK_MAX_ITERATIONS_PASSIVE", "0".to_string());
        env.insert("ZONK_SELECTION", "threshold".to_string());
        env.insert("ZONK_POINTS_CAP_PASSIVE", "lots".to_string());

        let config =
            AiConfig::default().with_overrides(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.aggressive_points_cap, 1500);
        assert_eq!(config.passive_points_cap, 500);
        assert_eq!(config.passive_max_iterations, 2);
        assert_eq!(config.selection, SelectionStrategy::Threshold);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: AiConfig =
            serde_json::from_str(r#"{ "passive_points_cap": 350, "selection": "threshold" }"#)
                .unwrap();
        assert_eq!(config.passive_points_cap, 350);
        assert_eq!(config.selection, SelectionStrategy::Threshold);
        assert_eq!(config.aggressive_points_cap, 1000);
        assert_eq!(config.max_iterations(BehaviorMode::Aggressive), 5);
    }

    #[test]
    fn snapshot_repairs_out_of_range_fields() {
        let config = AiConfig {
            max_cap_chance: 3.0,
            base_cap_chance: f64::NAN,
            aggressive_max_iterations: 0,
            buffer_floor: 900,
            cap_growth_interval: 0,
            ..AiConfig::default()
        };
        let snapshot = TurnConfiguration::snapshot(&config);
        assert_eq!(snapshot.max_cap_chance, 1.0);
        assert_eq!(snapshot.base_cap_chance, 0.30);
        assert_eq!(snapshot.aggressive_max_iterations, 1);
        assert_eq!(snapshot.buffer_floor, snapshot.initial_buffer_cap);
        assert_eq!(snapshot.cap_growth_interval, 1);
    }

    #[test]
    fn snapshot_is_detached_from_source() {
        let mut config = AiConfig::default();
        let snapshot = TurnConfiguration::snapshot(&config);
        config.aggressive_points_cap = 42;
        assert_eq!(snapshot.points_cap(BehaviorMode::Aggressive), 1000);
    }
}
