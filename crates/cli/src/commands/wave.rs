//! `wave-validate`

use std::path::PathBuf;

use clap::Args;
use coherence_engine::{CoherenceEngine, ScoreRequest};
use coherence_wave::{Metric, ScoreReport};
use colored::*;

use crate::output::{mark, percent, print_json, read_input};

#[derive(Args)]
pub struct WaveArgs {
    /// File to score (`-` for stdin)
    pub file: PathBuf,

    /// Minimum overall score, 0-100 (defaults to the configured threshold)
    #[arg(short, long)]
    pub threshold: Option<f64>,
}

/// Score the file. Returns whether the overall score reaches the threshold.
pub fn execute(engine: &CoherenceEngine, args: WaveArgs, json: bool) -> anyhow::Result<bool> {
    let content = read_input(&args.file)?;
    let report = engine.score(&ScoreRequest {
        content,
        threshold: args.threshold,
    })?;

    if json {
        print_json(&report)?;
    } else {
        print_report(&report);
    }

    Ok(report.meets_threshold())
}

fn print_report(report: &ScoreReport) {
    let passed = report.meets_threshold();
    println!(
        "{} Overall Score: {} (threshold {})",
        mark(passed),
        percent(report.overall),
        percent(report.threshold)
    );

    for metric in Metric::ALL {
        println!("  {:<12} {:>6.1}", metric.to_string(), report.metric(metric));
    }

    if !report.violations.is_empty() {
        println!("Violations:");
        for v in &report.violations {
            let severity = match v.severity {
                coherence_wave::Severity::High => v.severity.to_string().red(),
                coherence_wave::Severity::Medium => v.severity.to_string().yellow(),
                coherence_wave::Severity::Low => v.severity.to_string().normal(),
            };
            println!("  [{}] {}", severity, v.message);
        }
    }

    println!("Mode: {}", report.mode);
    for note in &report.notes {
        println!("  {}", note.dimmed());
    }
}
