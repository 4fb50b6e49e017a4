use super::{AiConfig, BehaviorMode, TurnConfiguration};
use serde::Serialize;

/// Lowest points cap a leading passive turn can be squeezed to.
const MIN_PASSIVE_POINTS_CAP: u32 = 100;
const MAX_RISK_AVOIDANCE: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadState {
    Behind,
    Close,
    Leading,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LeadAnalysis {
    pub score_difference: i64,
    pub lead_state: LeadState,
    /// 0 at the buffer, 1 at three times the buffer.
    pub lead_strength: f64,
    pub risk_avoidance_factor: f64,
    pub recommend_early_end: bool,
}

/// Everything fixed at turn start.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TurnPlan {
    pub mode: BehaviorMode,
    pub points_cap: u32,
    pub max_iterations: u32,
    pub buffer_cap: u32,
    pub round: u32,
    pub lead: LeadAnalysis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BufferSchedule {
    initial: u32,
    floor: u32,
    shrink: u32,
    every_rounds: u32,
    late_game_round: u32,
}

impl BufferSchedule {
    fn from_config(config: &AiConfig) -> Self {
        Self {
            initial: config.initial_buffer_cap,
            floor: config.buffer_floor.min(config.initial_buffer_cap),
            shrink: config.buffer_shrink,
            every_rounds: config.buffer_shrink_every_rounds.max(1),
            late_game_round: config.late_game_round.max(1),
        }
    }

    fn cap_at(&self, round: u32) -> u32 {
        let steps = round.saturating_sub(1) / self.every_rounds;
        self.initial
            .saturating_sub(steps.saturating_mul(self.shrink))
            .max(self.floor)
    }

    /// 0 with the buffer untouched, 1 once it has reached the floor.
    fn tightness(&self, cap: u32) -> f64 {
        if self.initial <= self.floor {
            return 1.0;
        }
        f64::from(self.initial - cap) / f64::from(self.initial - self.floor)
    }
}

/// Reads the scoreboard and decides how boldly a turn should be played.
#[derive(Debug, Clone)]
pub struct GameStateAnalyzer {
    schedule: BufferSchedule,
    round: u32,
}

impl GameStateAnalyzer {
    pub fn new(config: &AiConfig) -> Self {
        Self {
            schedule: BufferSchedule::from_config(config),
            round: 1,
        }
    }

    /// Analyzer with a buffer that never shrinks.
    pub fn with_buffer(buffer: u32) -> Self {
        let config = AiConfig {
            initial_buffer_cap: buffer,
            buffer_floor: buffer,
            buffer_shrink: 0,
            ..AiConfig::default()
        };
        Self::new(&config)
    }

    /// Picks up schedule changes without losing the round counter.
    pub fn reconfigure(&mut self, config: &AiConfig) {
        self.schedule = BufferSchedule::from_config(config);
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn advance_round(&mut self) {
        self.round = self.round.saturating_add(1);
    }

    pub fn reset(&mut self) {
        self.round = 1;
    }

    pub fn buffer_cap(&self) -> u32 {
        self.schedule.cap_at(self.round)
    }

    pub fn analyze_mode(&self, ai_score: u32, player_score: u32) -> BehaviorMode {
        let diff = i64::from(ai_score) - i64::from(player_score);
        let buffer = i64::from(self.buffer_cap());
        if diff > buffer {
            BehaviorMode::Passive
        } else {
            BehaviorMode::Aggressive
        }
    }

    pub fn lead_analysis(&self, ai_score: u32, player_score: u32) -> LeadAnalysis {
        let diff = i64::from(ai_score) - i64::from(player_score);
        let cap = self.buffer_cap();
        let buffer = i64::from(cap);

        let lead_state = if diff > buffer {
            LeadState::Leading
        } else if diff < -buffer {
            LeadState::Behind
        } else {
            LeadState::Close
        };

        let lead_strength = match lead_state {
            LeadState::Leading if buffer > 0 => {
                ((diff - buffer) as f64 / (2 * buffer) as f64).clamp(0.0, 1.0)
            }
            LeadState::Leading => 1.0,
            _ => 0.0,
        };

        let round_progress =
            (f64::from(self.round) / f64::from(self.schedule.late_game_round)).min(1.0);
        let tightness = self.schedule.tightness(cap);
        let risk_avoidance_factor = if lead_state == LeadState::Leading {
            (0.5 * lead_strength + 0.2 * round_progress + 0.1 * tightness).min(MAX_RISK_AVOIDANCE)
        } else {
            0.0
        };

        let late_game = self.round >= self.schedule.late_game_round;
        let at_floor = cap <= self.schedule.floor;
        let recommend_early_end = (lead_strength >= 0.6 && tightness >= 0.5)
            || (lead_strength >= 0.3 && late_game)
            || (at_floor && diff > 0);

        LeadAnalysis {
            score_difference: diff,
            lead_state,
            lead_strength,
            risk_avoidance_factor,
            recommend_early_end,
        }
    }

    pub fn plan_turn(
        &self,
        config: &TurnConfiguration,
        ai_score: u32,
        player_score: u32,
    ) -> TurnPlan {
        let mode = self.analyze_mode(ai_score, player_score);
        let lead = self.lead_analysis(ai_score, player_score);
        let base_cap = config.points_cap(mode);
        let points_cap = if mode.is_passive() && lead.lead_state == LeadState::Leading {
            let reduced = (f64::from(base_cap) * (1.0 - lead.risk_avoidance_factor)).round() as u32;
            reduced.max(MIN_PASSIVE_POINTS_CAP).min(base_cap)
        } else {
            base_cap
        };

        TurnPlan {
            mode,
            points_cap,
            max_iterations: config.max_iterations(mode),
            buffer_cap: self.buffer_cap(),
            round: self.round,
            lead,
        }
    }
}

impl Default for GameStateAnalyzer {
    fn default() -> Self {
        Self::new(&AiConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_follows_buffer_with_close_default() {
        let analyzer = GameStateAnalyzer::with_buffer(200);
        assert_eq!(analyzer.analyze_mode(100, 350), BehaviorMode::Aggressive);
        assert_eq!(analyzer.analyze_mode(400, 150), BehaviorMode::Passive);
        assert_eq!(analyzer.analyze_mode(250, 280), BehaviorMode::Aggressive);
        assert_eq!(analyzer.analyze_mode(400, 200), BehaviorMode::Aggressive);
    }

    #[test]
    fn buffer_shrinks_every_other_round_to_floor() {
        let mut analyzer = GameStateAnalyzer::default();
        let mut caps = Vec::new();
        for _ in 0..16 {
            caps.push(analyzer.buffer_cap());
            analyzer.advance_round();
        }
        assert_eq!(&caps[..5], &[500, 500, 450, 450, 400]);
        assert!(caps.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(*caps.last().unwrap(), 200);
    }

    #[test]
    fn lead_strength_saturates_at_three_buffers() {
        let analyzer = GameStateAnalyzer::with_buffer(200);
        let lead = analyzer.lead_analysis(800, 0);
        assert_eq!(lead.lead_state, LeadState::Leading);
        assert_eq!(lead.lead_strength, 1.0);
        let half = analyzer.lead_analysis(400, 0);
        assert!((half.lead_strength - 0.5).abs() < 1e-9);
        let behind = analyzer.lead_analysis(0, 800);
        assert_eq!(behind.lead_state, LeadState::Behind);
        assert_eq!(behind.risk_avoidance_factor, 0.0);
    }

    #[test]
    fn risk_avoidance_never_exceeds_cap() {
        let mut analyzer = GameStateAnalyzer::default();
        for _ in 0..40 {
            analyzer.advance_round();
        }
        let lead = analyzer.lead_analysis(5000, 0);
        assert!(lead.risk_avoidance_factor <= MAX_RISK_AVOIDANCE);
        assert!(lead.recommend_early_end);
    }

    #[test]
    fn floor_buffer_recommends_ending_on_any_lead() {
        let analyzer = GameStateAnalyzer::with_buffer(200);
        assert!(analyzer.lead_analysis(210, 200).recommend_early_end);
        assert!(!analyzer.lead_analysis(200, 210).recommend_early_end);
    }

    #[test]
    fn leading_passive_turn_gets_smaller_cap() {
        let analyzer = GameStateAnalyzer::default();
        let config = TurnConfiguration::default();
        let plan = analyzer.plan_turn(&config, 2000, 0);
        assert_eq!(plan.mode, BehaviorMode::Passive);
        assert_eq!(plan.max_iterations, 2);
        assert!(plan.points_cap < 500);
        assert!(plan.points_cap >= MIN_PASSIVE_POINTS_CAP);

        let behind = analyzer.plan_turn(&config, 0, 2000);
        assert_eq!(behind.mode, BehaviorMode::Aggressive);
        assert_eq!(behind.points_cap, 1000);
        assert_eq!(behind.max_iterations, 5);
    }
}
