//! `sphinx`

use std::path::PathBuf;

use clap::Args;
use coherence_engine::{CoherenceEngine, GateRequest};
use coherence_sphinx::SphinxResult;
use colored::*;

use crate::output::{mark, percent, print_json, read_input};

#[derive(Args)]
pub struct SphinxArgs {
    /// File to evaluate (`-` for stdin)
    pub file: PathBuf,

    /// Origin context: an identifier such as CVE-2024-1234 or a description
    #[arg(long, visible_alias = "vulnerability-description")]
    pub context: String,

    /// Binary or artifact the mitigations apply to
    #[arg(long, visible_alias = "target-binary")]
    pub subject: Option<String>,

    /// Declared mitigation (repeatable)
    #[arg(short, long = "mitigation")]
    pub mitigations: Vec<String>,
}

/// Run the gates. Returns the aggregate verdict.
pub async fn execute(engine: &CoherenceEngine, args: SphinxArgs, json: bool) -> anyhow::Result<bool> {
    let content = read_input(&args.file)?;
    let result = engine
        .evaluate_gates(GateRequest {
            content,
            context: args.context,
            subject_ref: args.subject,
            mitigations: args.mitigations,
        })
        .await?;

    if json {
        print_json(&result)?;
    } else {
        print_result(&result);
    }

    Ok(result.passed)
}

fn print_result(result: &SphinxResult) {
    for verdict in &result.gates {
        match &verdict.reason {
            Some(reason) => println!(
                "{} {:<10} {}",
                mark(verdict.passed),
                verdict.gate.name(),
                reason.dimmed()
            ),
            None => println!("{} {}", mark(verdict.passed), verdict.gate),
        }
    }
    println!("Overall Score: {}", percent(result.score.overall));

    if !result.recommendations.is_empty() {
        println!("Recommendations:");
        for rec in &result.recommendations {
            println!("  - {}", rec);
        }
    }

    if result.passed {
        println!("{}", "SPHINX: PASSED".green().bold());
    } else {
        println!(
            "{} ({})",
            "SPHINX: FAILED".red().bold(),
            result.failed_gate_names.join(", ")
        );
    }
}
