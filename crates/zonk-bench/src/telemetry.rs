use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse telemetry JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Default, Serialize)]
pub struct TelemetrySummary {
    pub turns: TurnTelemetrySummary,
    pub decisions: DecisionTelemetrySummary,
    pub selections: SelectionTelemetrySummary,
}

#[derive(Debug, Default, Serialize)]
pub struct TurnTelemetrySummary {
    pub started: usize,
    pub ended: usize,
    pub busted: usize,
    pub hot_streaks: usize,
    pub avg_banked: Option<f64>,
    pub avg_points_cap: Option<f64>,
    pub end_reasons: BTreeMap<String, usize>,
    pub modes: BTreeMap<String, usize>,
}

#[derive(Debug, Default, Serialize)]
pub struct DecisionTelemetrySummary {
    pub count: usize,
    pub stops: usize,
    pub avg_combined_chance: Option<f64>,
    pub avg_bust_probability: Option<f64>,
    pub reasons: BTreeMap<String, usize>,
}

#[derive(Debug, Default, Serialize)]
pub struct SelectionTelemetrySummary {
    pub count: usize,
    pub avg_options: Option<f64>,
    pub paths: BTreeMap<String, usize>,
    pub rules: BTreeMap<String, usize>,
}

#[derive(Debug)]
struct Average {
    sum: f64,
    count: usize,
}

impl Average {
    fn new() -> Self {
        Self { sum: 0.0, count: 0 }
    }

    fn add(&mut self, value: Option<f64>) {
        if let Some(value) = value {
            self.sum += value;
            self.count += 1;
        }
    }

    fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.sum / self.count as f64)
        }
    }
}

/// Aggregate the `zonk_bot` turn, selection and decision events from a
/// JSON tracing log.
pub fn summarise_telemetry(path: &Path) -> Result<TelemetrySummary, TelemetryError> {
    if !path.exists() {
        return Ok(TelemetrySummary::default());
    }

    let file = File::open(path).map_err(|source| TelemetryError::Io {
        context: "opening telemetry log",
        source,
    })?;
    let reader = BufReader::new(file);

    let mut summary = TelemetrySummary::default();
    let mut banked_avg = Average::new();
    let mut cap_avg = Average::new();
    let mut combined_avg = Average::new();
    let mut bust_avg = Average::new();
    let mut options_avg = Average::new();

    for line in reader.lines() {
        let line = line.map_err(|source| TelemetryError::Io {
            context: "reading telemetry line",
            source,
        })?;
        if line.trim().is_empty() {
            continue;
        }

        let payload: Value = serde_json::from_str(&line)?;
        let target = payload
            .get("target")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let fields = payload
            .get("fields")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        match target {
            "zonk_bot::turn" => {
                let turns = &mut summary.turns;
                match label(&fields, "phase").as_str() {
                    "started" => {
                        turns.started += 1;
                        cap_avg.add(fields.get("points_cap").and_then(Value::as_f64));
                        bump(&mut turns.modes, label(&fields, "mode"));
                    }
                    "ended" => {
                        turns.ended += 1;
                        banked_avg.add(fields.get("banked").and_then(Value::as_f64));
                        bump(&mut turns.end_reasons, label(&fields, "reason"));
                    }
                    "busted" => turns.busted += 1,
                    "hot_streak" => turns.hot_streaks += 1,
                    _ => {}
                }
            }
            "zonk_bot::decision" => {
                let decisions = &mut summary.decisions;
                decisions.count += 1;
                if fields.get("should_stop").and_then(Value::as_bool) == Some(true) {
                    decisions.stops += 1;
                }
                combined_avg.add(fields.get("combined_chance").and_then(Value::as_f64));
                bust_avg.add(fields.get("bust_probability").and_then(Value::as_f64));
                bump(&mut decisions.reasons, label(&fields, "reason"));
            }
            "zonk_bot::select" => {
                let selections = &mut summary.selections;
                selections.count += 1;
                options_avg.add(fields.get("options").and_then(Value::as_f64));
                bump(&mut selections.paths, label(&fields, "path"));
                bump(&mut selections.rules, label(&fields, "rule"));
            }
            _ => {}
        }
    }

    summary.turns.avg_banked = banked_avg.mean();
    summary.turns.avg_points_cap = cap_avg.mean();
    summary.decisions.avg_combined_chance = combined_avg.mean();
    summary.decisions.avg_bust_probability = bust_avg.mean();
    summary.selections.avg_options = options_avg.mean();

    Ok(summary)
}

fn label(fields: &Map<String, Value>, key: &str) -> String {
    fields
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("<unset>")
        .to_string()
}

fn bump(counts: &mut BTreeMap<String, usize>, key: String) {
    *counts.entry(key).or_insert(0) += 1;
}

pub fn write_summary_outputs(
    telemetry_path: &Path,
    output_dir: &Path,
) -> Result<Option<TelemetryOutputs>, TelemetryError> {
    if !telemetry_path.exists() {
        return Ok(None);
    }

    let summary = summarise_telemetry(telemetry_path)?;
    let json_path = output_dir.join("telemetry_summary.json");
    let md_path = output_dir.join("telemetry_summary.md");

    std::fs::write(&json_path, serde_json::to_vec_pretty(&summary)?).map_err(|source| {
        TelemetryError::Io {
            context: "writing telemetry summary json",
            source,
        }
    })?;

    let markdown = render_markdown(&summary, telemetry_path);
    std::fs::write(&md_path, markdown).map_err(|source| TelemetryError::Io {
        context: "writing telemetry summary markdown",
        source,
    })?;

    Ok(Some(TelemetryOutputs {
        summary,
        json_path,
        markdown_path: md_path,
    }))
}

pub fn append_highlights_to_markdown(
    summary_path: &Path,
    outputs: &TelemetryOutputs,
) -> Result<(), TelemetryError> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(summary_path)
        .map_err(|source| TelemetryError::Io {
            context: "opening summary markdown for telemetry append",
            source,
        })?;

    let summary = &outputs.summary;
    let mut section = String::new();
    section.push_str("\n## Telemetry Highlights\n");
    section.push_str(&format!(
        "- Turns logged: {} ({} busted, {} hot streaks)\n",
        summary.turns.started, summary.turns.busted, summary.turns.hot_streaks
    ));
    if let Some(value) = summary.turns.avg_banked {
        section.push_str(&format!("- Avg banked at turn end: {:.1}\n", value));
    }
    section.push_str(&format!(
        "- Stop decisions: {} of {}\n",
        summary.decisions.stops, summary.decisions.count
    ));
    if let Some(value) = summary.decisions.avg_combined_chance {
        section.push_str(&format!("- Avg combined stop chance: {:.3}\n", value));
    }

    section.push_str("\n### Stop Reasons\n");
    push_counts(&mut section, &summary.decisions.reasons);

    write!(file, "{section}").map_err(|source| TelemetryError::Io {
        context: "writing telemetry highlights",
        source,
    })?;

    Ok(())
}

fn push_counts(output: &mut String, counts: &BTreeMap<String, usize>) {
    if counts.is_empty() {
        output.push_str("- <none>\n");
        return;
    }
    for (label, count) in counts {
        output.push_str(&format!("- {}: {}\n", label, count));
    }
}

fn render_markdown(summary: &TelemetrySummary, telemetry_path: &Path) -> String {
    let mut output = String::new();
    output.push_str("# Telemetry Summary\n\n");
    output.push_str(&format!("- Source: `{}`\n", telemetry_path.display()));
    output.push('\n');

    output.push_str("## Turns\n");
    output.push_str(&format!("- Started: {}\n", summary.turns.started));
    output.push_str(&format!("- Ended: {}\n", summary.turns.ended));
    output.push_str(&format!("- Busted: {}\n", summary.turns.busted));
    output.push_str(&format!("- Hot streaks: {}\n", summary.turns.hot_streaks));
    if let Some(value) = summary.turns.avg_points_cap {
        output.push_str(&format!("- Avg points cap: {:.1}\n", value));
    }
    output.push_str("\n### Modes\n");
    push_counts(&mut output, &summary.turns.modes);
    output.push_str("\n### End Reasons\n");
    push_counts(&mut output, &summary.turns.end_reasons);
    output.push('\n');

    output.push_str("## Decisions\n");
    output.push_str(&format!("- Events: {}\n", summary.decisions.count));
    output.push_str(&format!("- Stops: {}\n", summary.decisions.stops));
    if let Some(value) = summary.decisions.avg_bust_probability {
        output.push_str(&format!("- Avg bust probability: {:.3}\n", value));
    }
    output.push_str("\n### Reasons\n");
    push_counts(&mut output, &summary.decisions.reasons);
    output.push('\n');

    output.push_str("## Selections\n");
    output.push_str(&format!("- Events: {}\n", summary.selections.count));
    if let Some(value) = summary.selections.avg_options {
        output.push_str(&format!("- Avg options: {:.2}\n", value));
    }
    output.push_str("\n### Paths\n");
    push_counts(&mut output, &summary.selections.paths);
    output.push_str("\n### Rules\n");
    push_counts(&mut output, &summary.selections.rules);
    output
}

#[derive(Debug)]
pub struct TelemetryOutputs {
    pub summary: TelemetrySummary,
    pub json_path: PathBuf,
    pub markdown_path: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp_file(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        for line in lines {
            writeln!(file, "{line}").expect("write line");
        }
        file
    }

    #[test]
    fn summarises_turn_decision_and_selection_events() {
        let lines = vec![
            r#"{"target":"zonk_bot::turn","fields":{"phase":"started","mode":"aggressive","points_cap":1000}}"#,
            r#"{"target":"zonk_bot::select","fields":{"path":"points_first","rule":"three_of_a_kind","options":4}}"#,
            r#"{"target":"zonk_bot::decision","fields":{"should_stop":false,"reason":"continue","combined_chance":0.1,"bust_probability":0.2}}"#,
            r#"{"target":"zonk_bot::decision","fields":{"should_stop":true,"reason":"cap_roll","combined_chance":0.5,"bust_probability":0.4}}"#,
            r#"{"target":"zonk_bot::turn","fields":{"phase":"ended","banked":1200,"reason":"cap_roll"}}"#,
            r#"{"target":"zonk_bot::turn","fields":{"phase":"started","mode":"passive","points_cap":400}}"#,
            r#"{"target":"zonk_bot::turn","fields":{"phase":"busted","forfeited":300}}"#,
            r#"{"target":"zonk_bench::turn","fields":{"points":0}}"#,
        ];
        let file = write_temp_file(&lines);
        let summary = summarise_telemetry(file.path()).expect("summarise");

        assert_eq!(summary.turns.started, 2);
        assert_eq!(summary.turns.ended, 1);
        assert_eq!(summary.turns.busted, 1);
        assert!((summary.turns.avg_points_cap.unwrap() - 700.0).abs() < 1e-9);
        assert_eq!(summary.turns.modes.get("passive"), Some(&1));
        assert_eq!(summary.turns.end_reasons.get("cap_roll"), Some(&1));

        assert_eq!(summary.decisions.count, 2);
        assert_eq!(summary.decisions.stops, 1);
        assert!((summary.decisions.avg_combined_chance.unwrap() - 0.3).abs() < 1e-9);
        assert_eq!(summary.decisions.reasons.get("continue"), Some(&1));

        assert_eq!(summary.selections.count, 1);
        assert_eq!(summary.selections.paths.get("points_first"), Some(&1));
        assert_eq!(summary.selections.rules.get("three_of_a_kind"), Some(&1));
    }

    #[test]
    fn handles_missing_file() {
        let path = Path::new("tests/does/not/exist.jsonl");
        let summary = summarise_telemetry(path).expect("summarise missing file");
        assert_eq!(summary.turns.started, 0);
        assert!(summary.decisions.avg_combined_chance.is_none());
        assert!(summary.selections.paths.is_empty());
    }

    #[test]
    fn appends_highlights_to_summary_markdown() {
        let mut summary_file = tempfile::NamedTempFile::new().expect("summary temp file");
        writeln!(summary_file, "# Match Summary").expect("seed summary content");

        let mut reasons = BTreeMap::new();
        reasons.insert("momentum_roll".to_string(), 7);
        let outputs = TelemetryOutputs {
            summary: TelemetrySummary {
                turns: TurnTelemetrySummary {
                    started: 20,
                    ended: 16,
                    busted: 4,
                    hot_streaks: 2,
                    avg_banked: Some(512.5),
                    ..Default::default()
                },
                decisions: DecisionTelemetrySummary {
                    count: 30,
                    stops: 12,
                    avg_combined_chance: Some(0.25),
                    reasons,
                    ..Default::default()
                },
                selections: SelectionTelemetrySummary::default(),
            },
            json_path: PathBuf::from("telemetry_summary.json"),
            markdown_path: PathBuf::from("telemetry_summary.md"),
        };

        append_highlights_to_markdown(summary_file.path(), &outputs).expect("append highlights");

        let contents = std::fs::read_to_string(summary_file.path()).expect("read summary file");
        assert!(contents.contains("## Telemetry Highlights"));
        assert!(contents.contains("Turns logged: 20 (4 busted, 2 hot streaks)"));
        assert!(contents.contains("Avg banked at turn end: 512.5"));
        assert!(contents.contains("Stop decisions: 12 of 30"));
        assert!(contents.contains("momentum_roll: 7"));
    }
}
