use super::events::TurnEvent;
use super::state::{TurnPhase, TurnState};
use super::TurnError;
use crate::bot::{
    CombinationSelector, DecisionInputs, Selection, StopDecision, StopPlanner, StopReason,
    TurnConfiguration, TurnPlan,
};
use rand::Rng;
use serde::Serialize;
use tracing::{Level, event};
use zonk_core::catalog;
use zonk_core::model::combination::Combination;
use zonk_core::model::dice::MAX_DICE;
use zonk_core::model::roller::DiceSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnEnd {
    Stopped(StopReason),
    IterationLimit,
    Busted,
    Forced,
}

impl TurnEnd {
    pub const fn as_str(self) -> &'static str {
        match self {
            TurnEnd::Stopped(_) => "stopped",
            TurnEnd::IterationLimit => "iteration_limit",
            TurnEnd::Busted => "busted",
            TurnEnd::Forced => "forced",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnOutcome {
    /// Delta to hand to the score ledger; zero on a bust.
    pub final_score: u32,
    pub busted: bool,
    pub iterations: u32,
    pub hot_streaks: u32,
    pub combinations: Vec<Combination>,
    pub end: TurnEnd,
}

/// One turn as a step function. Each `step` performs a single phase
/// transition and returns the events it produced; the caller decides pacing.
#[derive(Debug, Clone)]
pub struct TurnStateMachine {
    config: TurnConfiguration,
    plan: TurnPlan,
    phase: TurnPhase,
    state: TurnState,
    pending: Option<Combination>,
    end: Option<TurnEnd>,
}

impl TurnStateMachine {
    pub fn new(config: TurnConfiguration, plan: TurnPlan) -> Self {
        Self {
            config,
            plan,
            phase: TurnPhase::Idle,
            state: TurnState::new(plan.max_iterations),
            pending: None,
            end: None,
        }
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    pub fn state(&self) -> &TurnState {
        &self.state
    }

    pub fn plan(&self) -> &TurnPlan {
        &self.plan
    }

    pub fn config(&self) -> &TurnConfiguration {
        &self.config
    }

    pub fn is_finished(&self) -> bool {
        self.phase.is_terminal()
    }

    pub fn outcome(&self) -> Option<TurnOutcome> {
        let end = self.end?;
        Some(TurnOutcome {
            final_score: self.state.banked_score(),
            busted: self.phase == TurnPhase::Busted,
            iterations: self.state.iteration_count(),
            hot_streaks: self.state.hot_streaks(),
            combinations: self.state.completed().to_vec(),
            end,
        })
    }

    pub fn step<D, R>(&mut self, dice: &mut D, rng: &mut R) -> Result<Vec<TurnEvent>, TurnError>
    where
        D: DiceSource + ?Sized,
        R: Rng + ?Sized,
    {
        match self.phase {
            TurnPhase::Idle => self.start(dice),
            TurnPhase::Rolling => {
                let count = self.state.current_dice().len();
                let roll = dice.roll(count)?;
                self.state.record_roll(roll);
                self.phase = TurnPhase::Evaluating;
                Ok(Vec::new())
            }
            TurnPhase::Evaluating => Ok(self.evaluate()),
            TurnPhase::Banking => self.bank(dice),
            TurnPhase::Deciding => Ok(self.decide(rng)),
            TurnPhase::Ended | TurnPhase::Busted => Err(TurnError::AlreadyFinished),
        }
    }

    /// Ends the turn from any live phase, keeping whatever has been banked.
    /// A combination selected but not yet banked is dropped. No-op once the
    /// turn is over.
    pub fn force_end(&mut self) -> Vec<TurnEvent> {
        if self.is_finished() {
            return Vec::new();
        }
        self.pending = None;
        vec![self.finish(TurnEnd::Forced)]
    }

    fn start<D: DiceSource + ?Sized>(&mut self, dice: &mut D) -> Result<Vec<TurnEvent>, TurnError> {
        let roll = dice.roll(MAX_DICE)?;
        self.state.record_roll(roll.clone());
        self.phase = TurnPhase::Evaluating;
        log_turn_started(&self.plan, &roll.to_string());
        Ok(vec![TurnEvent::TurnStarted {
            mode: self.plan.mode,
            points_cap: self.plan.points_cap,
            max_iterations: self.plan.max_iterations,
            initial_dice: roll,
        }])
    }

    fn evaluate(&mut self) -> Vec<TurnEvent> {
        let pool = self.state.current_dice();
        let combinations = catalog::enumerate_with(pool, self.config.rule_multiplier);
        let choice =
            CombinationSelector::choose(&combinations, pool.len(), self.plan.mode, &self.config);

        match choice {
            Some(selection) => {
                log_selection(&self.plan, &self.state, &selection, combinations.len());
                let combination = selection.result.combination;
                self.pending = Some(combination.clone());
                self.phase = TurnPhase::Banking;
                vec![TurnEvent::CombinationSelected { combination }]
            }
            None => {
                let dice = pool.clone();
                let forfeited_points = self.state.forfeit();
                self.phase = TurnPhase::Busted;
                self.end = Some(TurnEnd::Busted);
                log_bust(&self.plan, &self.state, &dice.to_string(), forfeited_points);
                vec![TurnEvent::Busted {
                    dice,
                    forfeited_points,
                    iterations_used: self.state.iteration_count(),
                }]
            }
        }
    }

    fn bank<D: DiceSource + ?Sized>(&mut self, dice: &mut D) -> Result<Vec<TurnEvent>, TurnError> {
        let Some(combination) = self.pending.take() else {
            self.phase = TurnPhase::Evaluating;
            return Ok(Vec::new());
        };

        self.state
            .current_dice_mut()
            .remove_indices(combination.dice_indices())?;
        self.state.bank(combination);

        if !self.state.current_dice().is_empty() {
            self.phase = TurnPhase::Deciding;
            return Ok(Vec::new());
        }

        if self.state.at_iteration_limit() {
            return Ok(vec![self.finish(TurnEnd::IterationLimit)]);
        }

        let roll = dice.roll(MAX_DICE)?;
        self.state.record_hot_streak(roll);
        self.phase = TurnPhase::Evaluating;
        log_hot_streak(&self.plan, &self.state);
        Ok(Vec::new())
    }

    fn decide<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Vec<TurnEvent> {
        let inputs = DecisionInputs {
            iteration: self.state.iteration_count(),
            successes: self.state.successful_combinations(),
            dice_remaining: self.state.current_dice().len(),
            banked: self.state.banked_score(),
            points_cap: self.plan.points_cap,
        };
        let decision = StopPlanner::decide(&self.config, &self.plan, &inputs, rng);
        log_decision(&self.plan, &inputs, &decision);

        let mut events = vec![TurnEvent::DecisionMade { decision }];
        if decision.should_stop {
            let end = match decision.reason {
                StopReason::IterationLimit => TurnEnd::IterationLimit,
                reason => TurnEnd::Stopped(reason),
            };
            events.push(self.finish(end));
        } else {
            self.phase = TurnPhase::Rolling;
        }
        events
    }

    fn finish(&mut self, end: TurnEnd) -> TurnEvent {
        self.phase = TurnPhase::Ended;
        self.end = Some(end);
        log_turn_end(&self.plan, &self.state, end);
        TurnEvent::TurnCompleted {
            final_banked_score: self.state.banked_score(),
            iterations_used: self.state.iteration_count(),
            combinations: self.state.completed().to_vec(),
        }
    }
}

fn log_turn_started(plan: &TurnPlan, dice: &str) {
    if !tracing::enabled!(Level::INFO) {
        return;
    }
    event!(
        target: "zonk_bot::turn",
        Level::INFO,
        phase = "started",
        mode = %plan.mode,
        round = plan.round,
        points_cap = plan.points_cap,
        max_iterations = plan.max_iterations,
        buffer_cap = plan.buffer_cap,
        lead = plan.lead.score_difference,
        dice = %dice,
    );
}

fn log_selection(plan: &TurnPlan, state: &TurnState, selection: &Selection, options: usize) {
    if !tracing::enabled!(Level::DEBUG) {
        return;
    }
    let result = &selection.result;
    event!(
        target: "zonk_bot::select",
        Level::DEBUG,
        mode = %plan.mode,
        iteration = state.iteration_count(),
        dice = %state.current_dice(),
        options,
        path = selection.path.as_str(),
        rule = result.combination.rule().key(),
        points = result.combination.points(),
        dice_used = result.combination.dice_used(),
        tier = result.tier.rank(),
        strategic_value = result.strategic_value,
        meets_threshold = result.meets_threshold,
    );
}

fn log_hot_streak(plan: &TurnPlan, state: &TurnState) {
    if !tracing::enabled!(Level::DEBUG) {
        return;
    }
    event!(
        target: "zonk_bot::turn",
        Level::DEBUG,
        phase = "hot_streak",
        mode = %plan.mode,
        iteration = state.iteration_count(),
        banked = state.banked_score(),
        dice = %state.current_dice(),
    );
}

fn log_decision(plan: &TurnPlan, inputs: &DecisionInputs, decision: &StopDecision) {
    if !tracing::enabled!(Level::DEBUG) {
        return;
    }
    event!(
        target: "zonk_bot::decision",
        Level::DEBUG,
        mode = %plan.mode,
        iteration = inputs.iteration,
        dice_remaining = inputs.dice_remaining,
        banked = inputs.banked,
        points_cap = inputs.points_cap,
        momentum_chance = decision.momentum_chance,
        cap_chance = decision.cap_chance,
        combined_chance = decision.combined_chance,
        bust_probability = decision.bust_probability,
        should_stop = decision.should_stop,
        reason = decision.reason.as_str(),
    );
}

fn log_bust(plan: &TurnPlan, state: &TurnState, dice: &str, forfeited: u32) {
    if !tracing::enabled!(Level::INFO) {
        return;
    }
    event!(
        target: "zonk_bot::turn",
        Level::INFO,
        phase = "busted",
        mode = %plan.mode,
        iteration = state.iteration_count(),
        forfeited,
        dice = %dice,
    );
}

fn log_turn_end(plan: &TurnPlan, state: &TurnState, end: TurnEnd) {
    if !tracing::enabled!(Level::INFO) {
        return;
    }
    let reason = match end {
        TurnEnd::Stopped(reason) => reason.as_str(),
        other => other.as_str(),
    };
    event!(
        target: "zonk_bot::turn",
        Level::INFO,
        phase = "ended",
        mode = %plan.mode,
        banked = state.banked_score(),
        iterations = state.iteration_count(),
        combinations = state.successful_combinations(),
        hot_streaks = state.hot_streaks(),
        reason,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::GameStateAnalyzer;
    use rand::rngs::mock::StepRng;
    use zonk_core::model::dice::DiceError;
    use zonk_core::model::roller::ScriptedDice;

    fn machine() -> TurnStateMachine {
        let config = TurnConfiguration::default();
        let plan = GameStateAnalyzer::default().plan_turn(&config, 0, 0);
        TurnStateMachine::new(config, plan)
    }

    #[test]
    fn walks_phases_one_transition_at_a_time() {
        let mut machine = machine();
        let mut dice = ScriptedDice::from_values(&[&[1, 1, 1, 2, 6, 6], &[5, 3, 3]]).unwrap();
        let mut never = StepRng::new(u64::MAX, 0);
        assert_eq!(machine.phase(), TurnPhase::Idle);

        let started = machine.step(&mut dice, &mut never).unwrap();
        assert!(matches!(started[..], [TurnEvent::TurnStarted { .. }]));
        assert_eq!(machine.phase(), TurnPhase::Evaluating);
        assert_eq!(machine.state().iteration_count(), 1);

        let selected = machine.step(&mut dice, &mut never).unwrap();
        match &selected[..] {
            [TurnEvent::CombinationSelected { combination }] => {
                assert_eq!(combination.points(), 1000);
            }
            other => panic!("unexpected events {other:?}"),
        }
        assert_eq!(machine.phase(), TurnPhase::Banking);

        assert!(machine.step(&mut dice, &mut never).unwrap().is_empty());
        assert_eq!(machine.phase(), TurnPhase::Deciding);
        assert_eq!(machine.state().current_dice().values(), &[2, 6, 6]);
        assert_eq!(machine.state().banked_score(), 1000);

        let decided = machine.step(&mut dice, &mut never).unwrap();
        assert!(matches!(decided[..], [TurnEvent::DecisionMade { .. }]));
        assert_eq!(machine.phase(), TurnPhase::Rolling);

        assert!(machine.step(&mut dice, &mut never).unwrap().is_empty());
        assert_eq!(machine.state().current_dice().values(), &[5, 3, 3]);
        assert_eq!(machine.state().iteration_count(), 2);
    }

    #[test]
    fn force_end_keeps_banked_points() {
        let mut machine = machine();
        let mut dice = ScriptedDice::from_values(&[&[1, 1, 1, 2, 6, 6]]).unwrap();
        let mut never = StepRng::new(u64::MAX, 0);
        for _ in 0..3 {
            machine.step(&mut dice, &mut never).unwrap();
        }
        let events = machine.force_end();
        assert!(matches!(
            events[..],
            [TurnEvent::TurnCompleted {
                final_banked_score: 1000,
                ..
            }]
        ));
        let outcome = machine.outcome().unwrap();
        assert_eq!(outcome.end, TurnEnd::Forced);
        assert_eq!(outcome.final_score, 1000);
        assert!(machine.force_end().is_empty());
        assert_eq!(
            machine.step(&mut dice, &mut never),
            Err(TurnError::AlreadyFinished)
        );
    }

    #[test]
    fn force_end_drops_unbanked_selection() {
        let mut machine = machine();
        let mut dice = ScriptedDice::from_values(&[&[1, 1, 1, 2, 6, 6]]).unwrap();
        let mut never = StepRng::new(u64::MAX, 0);
        machine.step(&mut dice, &mut never).unwrap();
        machine.step(&mut dice, &mut never).unwrap();
        assert_eq!(machine.phase(), TurnPhase::Banking);
        machine.force_end();
        assert_eq!(machine.outcome().unwrap().final_score, 0);
    }

    #[test]
    fn busted_turn_stays_busted_after_force_end() {
        let mut machine = machine();
        let mut dice = ScriptedDice::from_values(&[&[1, 1, 1, 2, 6, 6], &[2, 3, 6]]).unwrap();
        let mut never = StepRng::new(u64::MAX, 0);
        while !machine.is_finished() {
            machine.step(&mut dice, &mut never).unwrap();
        }
        assert_eq!(machine.phase(), TurnPhase::Busted);
        assert!(machine.force_end().is_empty());
        let outcome = machine.outcome().unwrap();
        assert!(outcome.busted);
        assert_eq!(outcome.final_score, 0);
        assert_eq!(outcome.end, TurnEnd::Busted);
    }

    #[test]
    fn dice_failures_surface_as_errors() {
        let mut machine = machine();
        let mut dice = ScriptedDice::default();
        let mut never = StepRng::new(u64::MAX, 0);
        assert_eq!(
            machine.step(&mut dice, &mut never),
            Err(TurnError::Dice(DiceError::ScriptExhausted))
        );
        assert_eq!(machine.phase(), TurnPhase::Idle);
    }
}
