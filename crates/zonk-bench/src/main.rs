use std::path::PathBuf;

use clap::Parser;

use zonk_bench::config::{BenchmarkConfig, ResolvedOutputs};
use zonk_bench::logging::init_logging;
use zonk_bench::runner::MatchRunner;

/// Match benchmarking harness for Zonk bots.
#[derive(Debug, Parser)]
#[command(
    name = "zonk-bench",
    author,
    version,
    about = "Deterministic AI-vs-AI Zonk match harness"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "bench/bench.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the number of matches to play.
    #[arg(long, value_name = "COUNT")]
    matches: Option<usize>,

    /// Override the RNG seed that derives per-match seeds.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Exit after validating the configuration (no matches are played).
    #[arg(long)]
    validate_only: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = BenchmarkConfig::from_path(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    if let Some(matches) = cli.matches {
        config.matches.count = matches;
    }

    if let Some(seed) = cli.seed {
        config.matches.seed = Some(seed);
    }

    config.validate()?;

    let outputs: ResolvedOutputs = config.resolved_outputs();
    let run_id = config.run_id.clone();
    let matches = config.matches.count;
    let target = config.matches.target_score;
    let names = config
        .agents
        .iter()
        .map(|agent| agent.name.as_str())
        .collect::<Vec<_>>()
        .join(" vs ");

    println!("Loaded configuration '{run_id}': {names} ({matches} matches to {target} points)");

    let _logging_guard = init_logging(&config.logging, &outputs, &run_id)?;
    let runner = MatchRunner::new(config, outputs)?;

    if cli.validate_only {
        println!("Validation-only mode: match execution skipped.");
        return Ok(());
    }

    let summary = runner.run()?;
    println!(
        "Run complete for '{run_id}': {} matches ({} draws) → {} rows at {}",
        summary.matches_played,
        summary.draws,
        summary.rows_written,
        summary.jsonl_path.display()
    );
    println!("Summary table: {}", summary.summary_path.display());
    if let Some(telemetry_path) = summary.telemetry_path.as_ref() {
        println!("Telemetry log: {}", telemetry_path.display());
    }
    if let Some(outputs) = summary.telemetry_outputs.as_ref() {
        println!("Telemetry summary (JSON): {}", outputs.json_path.display());
        println!(
            "Telemetry summary (Markdown): {}",
            outputs.markdown_path.display()
        );
        println!(
            "  Decisions: {} events, {} stops",
            outputs.summary.decisions.count, outputs.summary.decisions.stops
        );
        if !outputs.summary.decisions.reasons.is_empty() {
            println!("  Stop reasons: {:?}", outputs.summary.decisions.reasons);
        }
    }

    Ok(())
}
