use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::rngs::mock::StepRng;
use zonk_bot::{
    AiConfig, AiPlayer, BehaviorMode, GameStateAnalyzer, StopReason, TurnConfiguration,
    TurnDriver, TurnEnd, TurnEvent, TurnPhase, TurnStateMachine,
};
use zonk_core::model::roller::{RandomDice, ScriptedDice};
use zonk_core::model::rule::Rule;
use zonk_core::model::score::ScoreBoard;
use zonk_core::model::seat::Seat;

fn aggressive_machine() -> TurnStateMachine {
    let config = TurnConfiguration::default();
    let plan = GameStateAnalyzer::default().plan_turn(&config, 0, 0);
    assert_eq!(plan.mode, BehaviorMode::Aggressive);
    TurnStateMachine::new(config, plan)
}

fn selected_rules(events: &[TurnEvent]) -> Vec<Rule> {
    events
        .iter()
        .filter_map(|event| match event {
            TurnEvent::CombinationSelected { combination } => Some(combination.rule()),
            _ => None,
        })
        .collect()
}

fn decisions(events: &[TurnEvent]) -> usize {
    events
        .iter()
        .filter(|event| matches!(event, TurnEvent::DecisionMade { .. }))
        .count()
}

#[test]
fn large_straight_refreshes_pool_without_decision() {
    let mut machine = aggressive_machine();
    let mut dice =
        ScriptedDice::from_values(&[&[1, 2, 3, 4, 5, 6], &[2, 2, 3, 4, 6, 6]]).unwrap();
    let mut always = StepRng::new(0, 0);
    let mut events = Vec::new();

    let outcome = TurnDriver::run(&mut machine, &mut dice, &mut always, &mut events).unwrap();

    assert_eq!(
        selected_rules(&events),
        vec![Rule::LargeStraight, Rule::ThreeStraight]
    );
    assert_eq!(decisions(&events), 1);
    assert!(matches!(events[1], TurnEvent::CombinationSelected { .. }));
    assert!(matches!(events[2], TurnEvent::CombinationSelected { .. }));
    assert_eq!(outcome.final_score, 1725);
    assert_eq!(outcome.iterations, 2);
    assert_eq!(outcome.hot_streaks, 1);
    assert!(!outcome.busted);
    assert!(matches!(outcome.end, TurnEnd::Stopped(_)));
}

#[test]
fn scoreless_roll_busts_and_forfeits() {
    let mut machine = aggressive_machine();
    let mut dice = ScriptedDice::from_values(&[&[1, 1, 1, 2, 6, 6], &[2, 3, 6]]).unwrap();
    let mut never = StepRng::new(u64::MAX, 0);
    let mut events = Vec::new();

    let outcome = TurnDriver::run(&mut machine, &mut dice, &mut never, &mut events).unwrap();

    assert!(outcome.busted);
    assert_eq!(outcome.final_score, 0);
    assert_eq!(outcome.end, TurnEnd::Busted);
    assert_eq!(machine.phase(), TurnPhase::Busted);
    let busts: Vec<_> = events
        .iter()
        .filter(|event| matches!(event, TurnEvent::Busted { .. }))
        .collect();
    assert_eq!(busts.len(), 1);
    assert!(matches!(
        busts[0],
        TurnEvent::Busted {
            forfeited_points: 1000,
            ..
        }
    ));
    assert!(!events
        .iter()
        .any(|event| matches!(event, TurnEvent::TurnCompleted { .. })));
}

#[test]
fn endless_hot_streaks_stop_at_iteration_ceiling() {
    let mut machine = aggressive_machine();
    let mut dice = RandomDice::with_seed(3).with_target(1).unwrap();
    let mut never = StepRng::new(u64::MAX, 0);
    let mut events = Vec::new();

    let outcome = TurnDriver::run(&mut machine, &mut dice, &mut never, &mut events).unwrap();

    assert_eq!(outcome.end, TurnEnd::IterationLimit);
    assert_eq!(outcome.iterations, 5);
    assert_eq!(outcome.hot_streaks, 4);
    assert_eq!(outcome.final_score, 5 * 4000);
    assert_eq!(decisions(&events), 0);
    assert_eq!(selected_rules(&events), vec![Rule::SixOfAKind; 5]);
}

#[test]
fn decision_at_ceiling_is_reported() {
    let config = TurnConfiguration::snapshot(&AiConfig {
        aggressive_max_iterations: 1,
        ..AiConfig::default()
    });
    let plan = GameStateAnalyzer::default().plan_turn(&config, 0, 0);
    let mut machine = TurnStateMachine::new(config, plan);
    let mut dice = ScriptedDice::from_values(&[&[1, 1, 1, 2, 6, 6]]).unwrap();
    let mut never = StepRng::new(u64::MAX, 0);
    let mut events = Vec::new();

    let outcome = TurnDriver::run(&mut machine, &mut dice, &mut never, &mut events).unwrap();

    assert_eq!(outcome.end, TurnEnd::IterationLimit);
    let reasons: Vec<StopReason> = events
        .iter()
        .filter_map(|event| match event {
            TurnEvent::DecisionMade { decision } => Some(decision.reason),
            _ => None,
        })
        .collect();
    assert_eq!(reasons, vec![StopReason::IterationLimit]);
}

#[test]
fn identical_seeds_replay_identical_turns() {
    let run = |seed: u64| {
        let mut board = ScoreBoard::new();
        board.set_totals([450, 900]);
        let mut player = AiPlayer::new(Seat::Ai, AiConfig::default());
        let mut dice = RandomDice::with_seed(seed);
        let mut rng = StdRng::seed_from_u64(seed.rotate_left(7));
        let mut events = Vec::new();
        for _ in 0..6 {
            player
                .take_turn_with_sink(&mut board.ledger(Seat::Ai), &mut dice, &mut rng, &mut events)
                .unwrap();
        }
        (events, *board.standings())
    };

    for seed in [1u64, 42, 4242, 987_654_321] {
        let (first_events, first_scores) = run(seed);
        let (second_events, second_scores) = run(seed);
        assert_eq!(first_events, second_events);
        assert_eq!(first_scores, second_scores);
    }
}

#[test]
fn passive_turns_never_exceed_two_rolls() {
    let config = TurnConfiguration::default();
    let analyzer = GameStateAnalyzer::default();
    for seed in 0..300u64 {
        let plan = analyzer.plan_turn(&config, 1800, 200);
        assert_eq!(plan.mode, BehaviorMode::Passive);
        let mut machine = TurnStateMachine::new(config, plan);
        let mut dice = RandomDice::with_seed(seed);
        let mut rng = StdRng::seed_from_u64(seed);
        let mut events = Vec::new();
        let outcome = TurnDriver::run(&mut machine, &mut dice, &mut rng, &mut events).unwrap();
        assert!(outcome.iterations <= 2, "seed {seed}: {outcome:?}");
    }
}
