pub mod bot;
pub mod turn;

pub use bot::{
    AiConfig, AiPlayer, BehaviorMode, CombinationSelector, GameStateAnalyzer, LeadAnalysis,
    LeadState, RiskModel, SelectionStrategy, StopDecision, StopPlanner, StopReason,
    StrategyResult, TurnConfiguration, TurnPlan, TurnSummary, TurnTelemetry,
};
pub use turn::{
    EventSink, TurnDriver, TurnEnd, TurnError, TurnEvent, TurnOutcome, TurnPhase, TurnState,
    TurnStateMachine,
};
