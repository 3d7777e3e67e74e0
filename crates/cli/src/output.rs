//! Output formatting utilities

use std::io::Read;
use std::path::Path;

use anyhow::Context;
use colored::*;
use serde::Serialize;

/// Read a file, or stdin when the path is `-`.
pub fn read_input(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Read and parse a JSON document.
pub fn read_json(path: &Path) -> anyhow::Result<serde_json::Value> {
    let raw = read_input(path)?;
    serde_json::from_str(&raw).with_context(|| format!("{} is not valid JSON", path.display()))
}

pub fn print_json<T: Serialize>(data: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(data)?);
    Ok(())
}

/// Coloured pass/fail mark
pub fn mark(passed: bool) -> ColoredString {
    if passed {
        "✓".green()
    } else {
        "✗".red()
    }
}

/// A score rendered as a whole percentage.
pub fn percent(score: f64) -> String {
    format!("{}%", score.round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_rounds() {
        assert_eq!(percent(37.5), "38%");
        assert_eq!(percent(100.0), "100%");
        assert_eq!(percent(0.2), "0%");
    }
}
