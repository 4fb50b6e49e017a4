use super::risk::{DecisionInputs, RiskModel, StopDecision, StopReason, bust_probability};
use super::{AiConfig, TurnPlan};
use rand::Rng;

/// Stop/continue verdict at a decision point: the iteration ceiling, then the
/// passive short-circuits, then the two-trigger roll.
pub struct StopPlanner;

impl StopPlanner {
    pub fn decide<R: Rng + ?Sized>(
        config: &AiConfig,
        plan: &TurnPlan,
        inputs: &DecisionInputs,
        rng: &mut R,
    ) -> StopDecision {
        let model = RiskModel::new(config);
        let bust = bust_probability(inputs.dice_remaining);
        let momentum = model.momentum_chance(
            plan.mode,
            inputs.iteration,
            inputs.successes,
            inputs.dice_remaining,
        );
        let cap = model.cap_chance(plan.mode, inputs.banked, inputs.points_cap);

        if inputs.iteration >= plan.max_iterations {
            return StopDecision::forced(StopReason::IterationLimit, momentum, cap, bust);
        }

        if plan.mode.is_passive() {
            if let Some(reason) = Self::passive_short_circuit(config, plan, inputs, bust, rng) {
                return StopDecision::forced(reason, momentum, cap, bust);
            }
        }

        model.decide(plan.mode, inputs, rng)
    }

    fn passive_short_circuit<R: Rng + ?Sized>(
        config: &AiConfig,
        plan: &TurnPlan,
        inputs: &DecisionInputs,
        bust: f64,
        rng: &mut R,
    ) -> Option<StopReason> {
        if plan.lead.recommend_early_end && bust >= config.lead_preservation_bust_threshold {
            return Some(StopReason::LeadPreservation);
        }
        if bust > config.passive_bust_risk_threshold {
            return Some(StopReason::BustRisk);
        }
        let satisfied = f64::from(inputs.points_cap) * config.passive_early_satisfaction;
        if f64::from(inputs.banked) >= satisfied {
            return Some(StopReason::EarlySatisfaction);
        }

        let chance = match inputs.dice_remaining {
            2 => config.passive_two_dice_stop_chance,
            1 => config.passive_one_die_stop_chance,
            _ => return None,
        };
        let draw: f64 = rng.r#gen();
        (draw < chance).then_some(StopReason::LowDiceCount)
    }
}
