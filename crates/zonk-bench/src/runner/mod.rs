mod agents;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use rand::{RngCore, SeedableRng, rngs::StdRng};
use serde::Serialize;
use thiserror::Error;
use tracing::{Level, event};
use zonk_bot::{AiPlayer, TurnError, TurnOutcome};
use zonk_core::game::match_state::MatchState;
use zonk_core::model::seat::Seat;

use crate::analytics::{AnalyticsCollector, AnalyticsError};
use crate::config::{BenchmarkConfig, ResolvedOutputs};
use crate::logging::TELEMETRY_FILE;
use crate::telemetry::{
    TelemetryError, TelemetryOutputs, append_highlights_to_markdown, write_summary_outputs,
};

pub use agents::AgentError;
use agents::AgentBlueprint;

/// Plays seeded AI-vs-AI matches between the two configured agents.
pub struct MatchRunner {
    config: BenchmarkConfig,
    outputs: ResolvedOutputs,
    agents: [AgentBlueprint; 2],
    logging_enabled: bool,
}

/// Summary details returned after a run.
pub struct RunSummary {
    pub matches_played: usize,
    pub draws: usize,
    pub rows_written: usize,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
    pub telemetry_path: Option<PathBuf>,
    pub telemetry_outputs: Option<TelemetryOutputs>,
}

impl MatchRunner {
    /// Build a runner from a validated configuration.
    pub fn new(config: BenchmarkConfig, outputs: ResolvedOutputs) -> Result<Self, RunnerError> {
        let agents: [AgentBlueprint; 2] = AgentBlueprint::from_configs(&config.agents)?
            .try_into()
            .map_err(|found: Vec<AgentBlueprint>| RunnerError::SeatCount { found: found.len() })?;

        Ok(Self {
            logging_enabled: config.logging.enable_structured,
            config,
            outputs,
            agents,
        })
    }

    /// Execute every match, streaming one JSONL row per match to disk.
    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;

        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);
        let mut rng = StdRng::seed_from_u64(self.config.matches.seed.unwrap_or(0));
        let mut rows_written = 0usize;
        let mut draws = 0usize;
        let mut analytics = AnalyticsCollector::new(&self.config);

        for match_index in 0..self.config.matches.count {
            let match_seed = rng.next_u64();
            let outcome = self.play_match(match_index, match_seed)?;
            if outcome.winner.is_none() {
                draws += 1;
            }
            analytics.record_match(&outcome)?;
            write_match_row(&mut writer, &self.config.run_id, &self.agents, &outcome)?;
            rows_written += 1;
        }

        writer.flush()?;

        let summary = analytics.finalize()?;
        summary.write_markdown(&self.outputs.summary_md)?;

        let telemetry_dir = self.outputs.report_dir();
        let telemetry_path = self
            .logging_enabled
            .then(|| telemetry_dir.join(TELEMETRY_FILE));

        let telemetry_outputs = if let Some(path) = telemetry_path.as_ref() {
            write_summary_outputs(path, &telemetry_dir)?
        } else {
            None
        };

        if let Some(outputs) = telemetry_outputs.as_ref() {
            append_highlights_to_markdown(&self.outputs.summary_md, outputs)?;
        }

        Ok(RunSummary {
            matches_played: self.config.matches.count,
            draws,
            rows_written,
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
            telemetry_path,
            telemetry_outputs,
        })
    }

    /// Agent 0 sits at `Seat::Ai`, agent 1 at `Seat::Player`; the opening
    /// seat alternates so each agent starts half of the matches.
    fn play_match(&self, match_index: usize, match_seed: u64) -> Result<MatchOutcome, RunnerError> {
        let starting_seat = if match_index % 2 == 0 {
            Seat::Ai
        } else {
            Seat::Player
        };
        let mut state = MatchState::with_seed(starting_seat, match_seed)
            .with_target(self.config.matches.target_score);
        let mut dice = state.dice_source();
        let mut decisions = state.decision_rng();
        let mut players: [AiPlayer; 2] = [
            self.agents[0].spawn(Seat::Ai),
            self.agents[1].spawn(Seat::Player),
        ];
        let mut stats = [AgentMatchStats::default(), AgentMatchStats::default()];

        while !state.is_finished() && state.turns_played() < self.config.matches.max_turns {
            let seat = state.current_seat();
            let round = state.round_number();
            let summary = players[seat.index()].take_turn(
                &mut state.current_ledger(),
                &mut dice,
                &mut decisions,
            )?;
            stats[seat.index()].record(&summary.outcome);

            if self.logging_enabled && tracing::enabled!(Level::INFO) {
                event!(
                    target: "zonk_bench::turn",
                    Level::INFO,
                    run_id = %self.config.run_id,
                    match_index = match_index as u32,
                    agent = %self.agents[seat.index()].name,
                    round,
                    mode = %summary.plan.mode,
                    points = summary.outcome.final_score,
                    busted = summary.outcome.busted,
                    iterations = summary.outcome.iterations,
                    score = state.scores().score(seat),
                );
            }

            let advance = state.finish_turn();
            if advance.round_advanced {
                for player in &mut players {
                    player.advance_round();
                }
            }
        }

        let winner = state.winner().map(Seat::index);
        let turns = state.turns_played();

        if self.logging_enabled && tracing::enabled!(Level::INFO) {
            let winner_name = winner
                .map(|idx| self.agents[idx].name.as_str())
                .unwrap_or("<draw>");
            event!(
                target: "zonk_bench::match",
                Level::INFO,
                run_id = %self.config.run_id,
                match_index = match_index as u32,
                match_seed,
                winner = winner_name,
                turns,
                score_a = state.scores().score(Seat::Ai),
                score_b = state.scores().score(Seat::Player),
            );
        }

        Ok(MatchOutcome {
            match_index,
            match_seed,
            starting_agent: starting_seat.index(),
            winner,
            final_scores: *state.scores().standings(),
            rounds: turns.div_ceil(2),
            turns,
            agents: stats,
        })
    }
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

fn write_match_row(
    writer: &mut BufWriter<File>,
    run_id: &str,
    agents: &[AgentBlueprint; 2],
    outcome: &MatchOutcome,
) -> Result<(), RunnerError> {
    let results = agents
        .iter()
        .zip(outcome.agents.iter())
        .enumerate()
        .map(|(idx, (agent, stats))| AgentResultRow {
            agent: agent.name.clone(),
            final_score: outcome.final_scores[idx],
            turns: stats.turns,
            busts: stats.busts,
            hot_streaks: stats.hot_streaks,
            avg_turn_points: stats.mean_points(),
        })
        .collect();

    let row = MatchLogRow {
        run_id: run_id.to_string(),
        match_id: format!("M{:05}", outcome.match_index),
        match_index: outcome.match_index,
        match_seed: outcome.match_seed,
        starting_agent: agents[outcome.starting_agent].name.clone(),
        winner: outcome.winner.map(|idx| agents[idx].name.clone()),
        rounds: outcome.rounds,
        turns: outcome.turns,
        results,
    };

    serde_json::to_writer(&mut *writer, &row)?;
    writer.write_all(b"\n")?;
    Ok(())
}

/// Result of one match, indexed by agent (0 or 1).
#[derive(Debug, Clone)]
pub struct MatchOutcome {
    pub match_index: usize,
    pub match_seed: u64,
    pub starting_agent: usize,
    /// `None` when `max_turns` ran out first.
    pub winner: Option<usize>,
    pub final_scores: [u32; 2],
    pub rounds: u32,
    pub turns: u32,
    pub agents: [AgentMatchStats; 2],
}

#[derive(Debug, Clone, Default)]
pub struct AgentMatchStats {
    pub turns: u32,
    pub busts: u32,
    pub hot_streaks: u32,
    pub turn_points: Vec<u32>,
}

impl AgentMatchStats {
    fn record(&mut self, outcome: &TurnOutcome) {
        self.turns += 1;
        if outcome.busted {
            self.busts += 1;
        }
        self.hot_streaks += outcome.hot_streaks;
        self.turn_points.push(outcome.final_score);
    }

    pub fn total_points(&self) -> u64 {
        self.turn_points.iter().map(|&p| u64::from(p)).sum()
    }

    pub fn mean_points(&self) -> f64 {
        if self.turns == 0 {
            0.0
        } else {
            self.total_points() as f64 / f64::from(self.turns)
        }
    }
}

#[derive(Serialize)]
struct MatchLogRow {
    run_id: String,
    match_id: String,
    match_index: usize,
    match_seed: u64,
    starting_agent: String,
    winner: Option<String>,
    rounds: u32,
    turns: u32,
    results: Vec<AgentResultRow>,
}

#[derive(Serialize)]
struct AgentResultRow {
    agent: String,
    final_score: u32,
    turns: u32,
    busts: u32,
    hot_streaks: u32,
    avg_turn_points: f64,
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("{0}")]
    Agent(#[from] AgentError),
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize log row: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
    #[error("turn execution failed: {0}")]
    Turn(#[from] TurnError),
    #[error("configuration requires exactly 2 agents but found {found}")]
    SeatCount { found: usize },
    #[error("analytics error: {0}")]
    Analytics(#[from] AnalyticsError),
    #[error("telemetry summarisation failed: {0}")]
    Telemetry(#[from] TelemetryError),
}
