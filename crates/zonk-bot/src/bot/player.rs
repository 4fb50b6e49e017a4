use super::{AiConfig, GameStateAnalyzer, TurnConfiguration, TurnPlan, TurnTelemetry};
use crate::turn::{
    EventSink, NullSink, TurnDriver, TurnError, TurnEvent, TurnOutcome, TurnStateMachine,
};
use rand::Rng;
use serde::Serialize;
use zonk_core::model::roller::DiceSource;
use zonk_core::model::score::ScoreLedger;
use zonk_core::model::seat::Seat;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnSummary {
    pub seat: Seat,
    pub plan: TurnPlan,
    pub outcome: TurnOutcome,
}

/// Computer opponent for one seat. Configuration changes are staged and only
/// take effect when the next turn starts.
#[derive(Debug, Clone)]
pub struct AiPlayer {
    seat: Seat,
    config: AiConfig,
    pending: Option<AiConfig>,
    analyzer: GameStateAnalyzer,
    telemetry: TurnTelemetry,
}

impl AiPlayer {
    pub fn new(seat: Seat, config: AiConfig) -> Self {
        Self {
            seat,
            analyzer: GameStateAnalyzer::new(&config),
            config,
            pending: None,
            telemetry: TurnTelemetry::default(),
        }
    }

    pub fn seat(&self) -> Seat {
        self.seat
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    pub fn pending_config(&self) -> Option<&AiConfig> {
        self.pending.as_ref()
    }

    pub fn update_config(&mut self, config: AiConfig) {
        self.pending = Some(config);
    }

    pub fn analyzer(&self) -> &GameStateAnalyzer {
        &self.analyzer
    }

    pub fn telemetry(&self) -> &TurnTelemetry {
        &self.telemetry
    }

    pub fn advance_round(&mut self) {
        self.analyzer.advance_round();
    }

    /// Back to round one for a new match. Telemetry is kept.
    pub fn reset_match(&mut self) {
        self.analyzer.reset();
    }

    /// Applies any staged configuration, freezes it and plans the turn.
    pub fn begin_turn(&mut self, own_score: u32, opponent_score: u32) -> TurnStateMachine {
        if let Some(next) = self.pending.take() {
            self.config = next;
            self.analyzer.reconfigure(&self.config);
        }
        let config = TurnConfiguration::snapshot(&self.config);
        let plan = self.analyzer.plan_turn(&config, own_score, opponent_score);
        TurnStateMachine::new(config, plan)
    }

    pub fn take_turn<L, D, R>(
        &mut self,
        ledger: &mut L,
        dice: &mut D,
        rng: &mut R,
    ) -> Result<TurnSummary, TurnError>
    where
        L: ScoreLedger + ?Sized,
        D: DiceSource + ?Sized,
        R: Rng + ?Sized,
    {
        self.take_turn_with_sink(ledger, dice, rng, &mut NullSink)
    }

    /// Plays a full turn and commits its delta to `ledger`. Nothing is
    /// committed when the turn fails.
    pub fn take_turn_with_sink<L, D, R, S>(
        &mut self,
        ledger: &mut L,
        dice: &mut D,
        rng: &mut R,
        sink: &mut S,
    ) -> Result<TurnSummary, TurnError>
    where
        L: ScoreLedger + ?Sized,
        D: DiceSource + ?Sized,
        R: Rng + ?Sized,
        S: EventSink + ?Sized,
    {
        let (own, opponent) = ledger.current_scores();
        let mut machine = self.begin_turn(own, opponent);
        let mut fan_out = FanOut {
            telemetry: &mut self.telemetry,
            external: sink,
        };
        let outcome = TurnDriver::run(&mut machine, dice, rng, &mut fan_out)?;
        ledger.commit_turn_score(outcome.final_score);

        Ok(TurnSummary {
            seat: self.seat,
            plan: *machine.plan(),
            outcome,
        })
    }
}

struct FanOut<'a, S: EventSink + ?Sized> {
    telemetry: &'a mut TurnTelemetry,
    external: &'a mut S,
}

impl<S: EventSink + ?Sized> EventSink for FanOut<'_, S> {
    fn record(&mut self, event: &TurnEvent) {
        self.telemetry.record(event);
        self.external.record(event);
    }
}
