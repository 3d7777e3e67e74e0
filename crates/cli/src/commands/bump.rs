//! `bump` and `hash`

use std::path::Path;

use anyhow::Context;
use coherence_bump::BumpPayload;
use coherence_engine::CoherenceEngine;
use serde_json::json;

use crate::output::{mark, print_json, read_json};

/// Validate a payload file. Returns whether the status is ok.
pub async fn validate(engine: &CoherenceEngine, path: &Path, json: bool) -> anyhow::Result<bool> {
    let payload = BumpPayload::from_value(read_json(path)?)
        .with_context(|| format!("{} is not a bump payload", path.display()))?;
    let result = engine.validate_bump(&payload).await;

    if json {
        print_json(&result)?;
    } else {
        println!("{} status: {}", mark(result.is_ok()), result.status);
        println!("  hashOk: {}", result.checks.hash_ok);
        for error in &result.errors {
            println!("  - {}", error);
        }
    }

    Ok(result.is_ok())
}

/// Print the digest to declare for a handoff document.
pub fn hash(engine: &CoherenceEngine, path: &Path, json: bool) -> anyhow::Result<bool> {
    let handoff = read_json(path)?;
    let digest = engine.context_hash(&handoff);

    if json {
        print_json(&json!({ "contextHash": digest }))?;
    } else {
        println!("{}", digest);
    }

    Ok(true)
}
