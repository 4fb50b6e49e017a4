use std::fs;
use std::path::Path;

use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};
use thiserror::Error;

use zonk_bot::SelectionStrategy;

use crate::config::{AgentConfig, BenchmarkConfig};
use crate::runner::MatchOutcome;

const CONFIDENCE_LEVEL: f64 = 0.95;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("match {match_index} references unknown agent index {agent_index}")]
    UnknownAgent {
        match_index: usize,
        agent_index: usize,
    },
    #[error("failed to build normal distribution: {0}")]
    Distribution(String),
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Accumulates per-agent results across a run.
pub struct AnalyticsCollector {
    run_id: String,
    target_score: u32,
    agents: Vec<AgentAccumulator>,
    matches: usize,
    draws: usize,
    starter_wins: usize,
}

impl AnalyticsCollector {
    pub fn new(config: &BenchmarkConfig) -> Self {
        Self {
            run_id: config.run_id.clone(),
            target_score: config.matches.target_score,
            agents: config
                .agents
                .iter()
                .map(|agent| AgentAccumulator::new(agent.clone()))
                .collect(),
            matches: 0,
            draws: 0,
            starter_wins: 0,
        }
    }

    pub fn record_match(&mut self, outcome: &MatchOutcome) -> Result<(), AnalyticsError> {
        for agent_index in outcome.winner.into_iter().chain([outcome.starting_agent]) {
            if agent_index >= self.agents.len() {
                return Err(AnalyticsError::UnknownAgent {
                    match_index: outcome.match_index,
                    agent_index,
                });
            }
        }

        self.matches += 1;
        match outcome.winner {
            None => self.draws += 1,
            Some(winner) if winner == outcome.starting_agent => self.starter_wins += 1,
            Some(_) => {}
        }

        for (idx, (acc, stats)) in self.agents.iter_mut().zip(&outcome.agents).enumerate() {
            acc.matches += 1;
            if outcome.winner == Some(idx) {
                acc.wins += 1;
            }
            acc.turns += u64::from(stats.turns);
            acc.busts += u64::from(stats.busts);
            acc.hot_streaks += u64::from(stats.hot_streaks);
            acc.final_score_total += u64::from(outcome.final_scores[idx]);
            acc.turn_points
                .extend(stats.turn_points.iter().map(|&p| f64::from(p)));
        }

        Ok(())
    }

    pub fn finalize(self) -> Result<AnalyticsSummary, AnalyticsError> {
        let z = z_score(CONFIDENCE_LEVEL)?;
        let agents = self
            .agents
            .into_iter()
            .map(|acc| acc.into_report(z))
            .collect();

        Ok(AnalyticsSummary {
            run_id: self.run_id,
            target_score: self.target_score,
            matches: self.matches,
            draws: self.draws,
            starter_wins: self.starter_wins,
            confidence_z: z,
            agents,
        })
    }
}

struct AgentAccumulator {
    config: AgentConfig,
    matches: usize,
    wins: usize,
    turns: u64,
    busts: u64,
    hot_streaks: u64,
    final_score_total: u64,
    turn_points: Vec<f64>,
}

impl AgentAccumulator {
    fn new(config: AgentConfig) -> Self {
        Self {
            config,
            matches: 0,
            wins: 0,
            turns: 0,
            busts: 0,
            hot_streaks: 0,
            final_score_total: 0,
            turn_points: Vec::new(),
        }
    }

    fn into_report(self, z: f64) -> AgentReport {
        let win_rate = ratio(self.wins as f64, self.matches as f64);
        let mean_points_per_turn = mean(&self.turn_points);

        AgentReport {
            name: self.config.name.clone(),
            strategy: effective_strategy(&self.config).to_string(),
            params: self.config.params.clone(),
            matches: self.matches,
            wins: self.wins,
            win_rate,
            win_ci95: wilson_interval(self.wins, self.matches, z),
            turns: self.turns,
            mean_points_per_turn,
            points_ci95: mean_interval(&self.turn_points, z),
            bust_rate: ratio(self.busts as f64, self.turns as f64),
            hot_streaks: self.hot_streaks,
            mean_final_score: ratio(self.final_score_total as f64, self.matches as f64),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsSummary {
    pub run_id: String,
    pub target_score: u32,
    pub matches: usize,
    pub draws: usize,
    pub starter_wins: usize,
    pub confidence_z: f64,
    pub agents: Vec<AgentReport>,
}

impl AnalyticsSummary {
    pub fn starter_win_rate(&self) -> f64 {
        ratio(self.starter_wins as f64, (self.matches - self.draws) as f64)
    }

    pub fn write_markdown(&self, path: impl AsRef<Path>) -> Result<(), AnalyticsError> {
        let mut rows = String::new();
        rows.push_str("# Match Summary\n\n");
        rows.push_str(&format!(
            "Run `{}`: {} matches to {} points, {} draws. Starting agent won {:.1}% of decided matches.\n\n",
            self.run_id,
            self.matches,
            self.target_score,
            self.draws,
            self.starter_win_rate() * 100.0
        ));
        rows.push_str("| Agent | Strategy | Matches | Win % | 95% CI | Pts/turn | 95% CI | Bust % | Hot streaks | Avg final |\n");
        rows.push_str("|-------|----------|---------|-------|--------|----------|--------|--------|-------------|-----------|\n");

        for agent in &self.agents {
            rows.push_str(&format!(
                "| {name} | {strategy} | {matches} | {win:.1}% | [{win_low:.1}%, {win_high:.1}%] | {ppt:.1} | [{ppt_low:.1}, {ppt_high:.1}] | {bust:.1}% | {hot} | {final_score:.0} |\n",
                name = agent.name,
                strategy = agent.strategy,
                matches = agent.matches,
                win = agent.win_rate * 100.0,
                win_low = agent.win_ci95.0 * 100.0,
                win_high = agent.win_ci95.1 * 100.0,
                ppt = agent.mean_points_per_turn,
                ppt_low = agent.points_ci95.0,
                ppt_high = agent.points_ci95.1,
                bust = agent.bust_rate * 100.0,
                hot = agent.hot_streaks,
                final_score = agent.mean_final_score,
            ));
        }

        fs::write(path.as_ref(), rows).map_err(|e| AnalyticsError::Io {
            context: "writing summary markdown",
            source: e,
        })?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentReport {
    pub name: String,
    pub strategy: String,
    pub params: serde_yaml::Value,
    pub matches: usize,
    pub wins: usize,
    pub win_rate: f64,
    pub win_ci95: (f64, f64),
    pub turns: u64,
    pub mean_points_per_turn: f64,
    pub points_ci95: (f64, f64),
    pub bust_rate: f64,
    pub hot_streaks: u64,
    pub mean_final_score: f64,
}

/// Explicit `strategy` wins over a `selection` key inside `params`.
fn effective_strategy(config: &AgentConfig) -> SelectionStrategy {
    config
        .selection()
        .or_else(|| {
            config
                .params
                .get("selection")
                .and_then(serde_yaml::Value::as_str)
                .and_then(SelectionStrategy::parse)
        })
        .unwrap_or_default()
}

/// Two-sided standard normal quantile for `level`.
fn z_score(level: f64) -> Result<f64, AnalyticsError> {
    let normal = Normal::new(0.0, 1.0).map_err(|e| AnalyticsError::Distribution(e.to_string()))?;
    Ok(normal.inverse_cdf(1.0 - (1.0 - level) / 2.0))
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator <= 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

fn mean(values: &[f64]) -> f64 {
    ratio(values.iter().sum::<f64>(), values.len() as f64)
}

/// Wilson score interval; stays inside [0, 1] for small samples.
fn wilson_interval(successes: usize, trials: usize, z: f64) -> (f64, f64) {
    if trials == 0 {
        return (0.0, 0.0);
    }
    let n = trials as f64;
    let p = successes as f64 / n;
    let z2 = z * z;
    let denom = 1.0 + z2 / n;
    let centre = (p + z2 / (2.0 * n)) / denom;
    let margin = z * (p * (1.0 - p) / n + z2 / (4.0 * n * n)).sqrt() / denom;
    ((centre - margin).max(0.0), (centre + margin).min(1.0))
}

fn mean_interval(points: &[f64], z: f64) -> (f64, f64) {
    if points.is_empty() {
        return (0.0, 0.0);
    }
    let mean = mean(points);
    if points.len() == 1 {
        return (mean, mean);
    }
    let variance = points
        .iter()
        .map(|value| (value - mean).powi(2))
        .sum::<f64>()
        / (points.len() as f64 - 1.0);
    let std_error = (variance / points.len() as f64).sqrt();
    let margin = z * std_error;
    (mean - margin, mean + margin)
}
