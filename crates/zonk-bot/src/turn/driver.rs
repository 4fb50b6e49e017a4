use super::events::EventSink;
use super::machine::{TurnOutcome, TurnStateMachine};
use super::TurnError;
use rand::Rng;
use zonk_core::model::roller::DiceSource;

/// Transitions a single iteration can take: roll, evaluate, bank, decide,
/// plus one spare for a hot-streak reroll.
const STEPS_PER_ITERATION: usize = 5;
const BASE_STEPS: usize = 8;

/// Upper bound on transitions for a turn capped at `max_iterations`. The
/// iteration ceiling always ends the turn inside this budget.
pub fn step_budget(max_iterations: u32) -> usize {
    usize::try_from(max_iterations)
        .unwrap_or(usize::MAX)
        .saturating_mul(STEPS_PER_ITERATION)
        .saturating_add(BASE_STEPS)
}

/// Runs a turn to completion in one synchronous pass, forwarding every event
/// to `sink`.
pub struct TurnDriver;

impl TurnDriver {
    pub fn run<D, R, S>(
        machine: &mut TurnStateMachine,
        dice: &mut D,
        rng: &mut R,
        sink: &mut S,
    ) -> Result<TurnOutcome, TurnError>
    where
        D: DiceSource + ?Sized,
        R: Rng + ?Sized,
        S: EventSink + ?Sized,
    {
        let budget = step_budget(machine.plan().max_iterations);
        for _ in 0..budget {
            if let Some(outcome) = machine.outcome() {
                return Ok(outcome);
            }
            for event in machine.step(dice, rng)? {
                sink.record(&event);
            }
        }
        machine
            .outcome()
            .ok_or(TurnError::StepBudgetExceeded(budget))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::{AiConfig, GameStateAnalyzer, TurnConfiguration};
    use crate::turn::{NullSink, TurnEnd, TurnEvent};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand::rngs::mock::StepRng;
    use zonk_core::model::roller::{RandomDice, ScriptedDice};

    #[test]
    fn seeded_turns_always_terminate() {
        let config = TurnConfiguration::default();
        let analyzer = GameStateAnalyzer::default();
        for seed in 0..200u64 {
            for (ai, player) in [(0, 0), (2000, 0), (0, 2000)] {
                let plan = analyzer.plan_turn(&config, ai, player);
                let mut machine = TurnStateMachine::new(config, plan);
                let mut dice = RandomDice::with_seed(seed);
                let mut rng = StdRng::seed_from_u64(seed ^ 0xABCD);
                let outcome =
                    TurnDriver::run(&mut machine, &mut dice, &mut rng, &mut NullSink).unwrap();
                assert!(outcome.iterations <= plan.max_iterations);
                assert!(outcome.iterations >= 1);
                if outcome.busted {
                    assert_eq!(outcome.final_score, 0);
                }
            }
        }
    }

    #[test]
    fn sink_sees_every_event_in_order() {
        let config = TurnConfiguration::default();
        let plan = GameStateAnalyzer::default().plan_turn(&config, 0, 0);
        let mut machine = TurnStateMachine::new(config, plan);
        let mut dice = RandomDice::with_seed(17);
        let mut rng = StdRng::seed_from_u64(17);
        let mut events: Vec<TurnEvent> = Vec::new();
        TurnDriver::run(&mut machine, &mut dice, &mut rng, &mut events).unwrap();

        assert!(matches!(events.first(), Some(TurnEvent::TurnStarted { .. })));
        assert!(events.last().is_some_and(TurnEvent::is_terminal));
        assert_eq!(events.iter().filter(|e| e.is_terminal()).count(), 1);
    }

    #[test]
    fn budget_grows_with_iteration_ceiling() {
        assert_eq!(step_budget(5), 33);
        assert!(step_budget(200) > 200 * 4);
        assert!(step_budget(u32::MAX) >= u32::MAX as usize);
    }

    #[test]
    fn long_configured_turns_run_to_their_ceiling() {
        let config = TurnConfiguration::snapshot(&AiConfig {
            aggressive_max_iterations: 200,
            ..AiConfig::default()
        });
        let plan = GameStateAnalyzer::default().plan_turn(&config, 0, 0);
        assert_eq!(plan.max_iterations, 200);

        // Four-straight, then a single one, then a one that clears the pool.
        let cycle: [&[u8]; 3] = [&[1, 2, 3, 4, 6, 6], &[1, 3], &[1]];
        let script: Vec<&[u8]> = cycle.iter().copied().cycle().take(3 * 80).collect();
        let mut dice = ScriptedDice::from_values(&script).unwrap();
        let mut never = StepRng::new(u64::MAX, 0);
        let mut machine = TurnStateMachine::new(config, plan);

        let outcome = TurnDriver::run(&mut machine, &mut dice, &mut never, &mut NullSink).unwrap();
        assert!(!outcome.busted);
        assert_eq!(outcome.end, TurnEnd::IterationLimit);
        assert_eq!(outcome.iterations, 200);
    }
}
