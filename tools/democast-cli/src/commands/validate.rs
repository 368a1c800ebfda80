//! Validate a scenario file without recording it.

use std::path::PathBuf;

use anyhow::Context;
use democast_model::{validate, Scenario};

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    println!("Validating scenario: {}", path.display());

    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let scenario = Scenario::from_json_str(&json)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    let report = validate(&scenario);

    println!("  Name: {}", scenario.name);
    println!(
        "  Viewport: {}x{}",
        scenario.viewport.width, scenario.viewport.height
    );
    println!(
        "  Output: {:?} {}x{} @ {} fps",
        scenario.output.format, scenario.output.width, scenario.output.height, scenario.output.fps
    );
    println!(
        "  Steps: {} ({} actions)",
        scenario.steps.len(),
        scenario.action_count()
    );

    if !report.warnings.is_empty() {
        println!("\nWarnings:");
        for warning in &report.warnings {
            println!("  - {warning}");
        }
    }

    if report.is_valid() {
        println!("\nScenario is valid.");
        Ok(())
    } else {
        println!("\nErrors:");
        for error in &report.errors {
            println!("  - {error}");
        }
        anyhow::bail!("{} validation error(s) found", report.errors.len())
    }
}
