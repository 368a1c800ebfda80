//! Logical scenario validation.
//!
//! Serde handles shape; this pass checks ranges and the rules a well-formed
//! document can still break (first action must navigate, selectors must be
//! safe to hand to the page). Errors block recording; warnings do not.

use crate::scenario::{Action, OutputFormat, Scenario};

const MIN_DIMENSION: u32 = 100;
const MAX_DIMENSION: u32 = 3840;

/// Result of validating a scenario.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    fn warn(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }
}

/// Whether a selector only uses characters from the safe CSS subset.
///
/// Allowed: ASCII letters and digits, whitespace, and
/// `- _ # . [ ] = " ' : ~ ^ $ | * , > + ( ) @`.
pub fn is_safe_selector(selector: &str) -> bool {
    !selector.is_empty()
        && selector.chars().all(|c| {
            c.is_ascii_alphanumeric()
                || c.is_whitespace()
                || matches!(
                    c,
                    '-' | '_'
                        | '#'
                        | '.'
                        | '['
                        | ']'
                        | '='
                        | '"'
                        | '\''
                        | ':'
                        | '~'
                        | '^'
                        | '$'
                        | '|'
                        | '*'
                        | ','
                        | '>'
                        | '+'
                        | '('
                        | ')'
                        | '@'
                )
        })
}

/// Validate a parsed scenario.
pub fn validate(scenario: &Scenario) -> ValidationReport {
    let mut report = ValidationReport::default();

    if scenario.name.trim().is_empty() {
        report.error("Scenario name must not be empty");
    }

    check_dimension(&mut report, "viewport.width", scenario.viewport.width);
    check_dimension(&mut report, "viewport.height", scenario.viewport.height);

    let output = &scenario.output;
    check_dimension(&mut report, "output.width", output.width);
    check_dimension(&mut report, "output.height", output.height);

    if !(1..=60).contains(&output.fps) {
        report.error(format!("output.fps must be between 1 and 60, got {}", output.fps));
    }
    if !(1..=100).contains(&output.quality) {
        report.error(format!(
            "output.quality must be between 1 and 100, got {}",
            output.quality
        ));
    }
    if output.filename.trim().is_empty() {
        report.error("output.filename must not be empty");
    }

    let effects = &scenario.effects;
    check_range(&mut report, "effects.zoom.scale", effects.zoom.scale, 1.0, 5.0);
    check_range(
        &mut report,
        "effects.zoom.autoZoom.maxScale",
        effects.zoom.auto_zoom.max_scale,
        1.0,
        5.0,
    );
    check_range(
        &mut report,
        "effects.speedRamp.idleSpeed",
        effects.speed_ramp.idle_speed,
        0.5,
        8.0,
    );
    check_range(
        &mut report,
        "effects.speedRamp.actionSpeed",
        effects.speed_ramp.action_speed,
        0.25,
        2.0,
    );
    check_range(
        &mut report,
        "effects.watermark.opacity",
        effects.watermark.opacity,
        0.0,
        1.0,
    );
    if !(1..=30).contains(&effects.cursor.trail_length) {
        report.error(format!(
            "effects.cursor.trailLength must be between 1 and 30, got {}",
            effects.cursor.trail_length
        ));
    }

    if scenario.steps.is_empty() {
        report.error("Scenario must contain at least one step");
    } else {
        match scenario.steps[0].actions.first() {
            Some(Action::Navigate { .. }) => {}
            _ => report.error("First step must start with a navigate action"),
        }
    }

    for (step_idx, step) in scenario.steps.iter().enumerate() {
        for (action_idx, action) in step.actions.iter().enumerate() {
            let location = format!("steps[{step_idx}].actions[{action_idx}]");
            if let Some(selector) = action.selector() {
                if selector.trim().is_empty() {
                    report.error(format!("{location}: selector must not be empty"));
                } else if !is_safe_selector(selector) {
                    report.error(format!(
                        "{location}: selector {selector:?} contains unsupported characters"
                    ));
                }
            }
            if let Action::Navigate { url, .. } = action {
                if url.trim().is_empty() {
                    report.error(format!("{location}: url must not be empty"));
                }
            }
        }
    }

    if output.fps > 30 {
        report.warn(format!(
            "output.fps {} is high; files will be large (30 or less is recommended)",
            output.fps
        ));
    }
    if output.format == OutputFormat::Gif && output.quality > 90 {
        report.warn("GIF quality above 90 rarely improves output and slows encoding");
    }
    if scenario.viewport.width != output.width || scenario.viewport.height != output.height {
        report.warn(format!(
            "viewport {}x{} differs from output {}x{}; frames will be rescaled",
            scenario.viewport.width, scenario.viewport.height, output.width, output.height
        ));
    }

    report
}

fn check_dimension(report: &mut ValidationReport, field: &str, value: u32) {
    if !(MIN_DIMENSION..=MAX_DIMENSION).contains(&value) {
        report.error(format!(
            "{field} must be between {MIN_DIMENSION} and {MAX_DIMENSION}, got {value}"
        ));
    }
}

fn check_range(report: &mut ValidationReport, field: &str, value: f64, min: f64, max: f64) {
    if !(min..=max).contains(&value) {
        report.error(format!("{field} must be between {min} and {max}, got {value}"));
    }
}
