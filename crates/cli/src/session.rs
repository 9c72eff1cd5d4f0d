//! CLI session subcommand: replay a scripted conversation.
//!
//! A script is a JSON object with an optional starting `state`, an
//! optional default `form`, and a list of `steps`. Each step fills slots
//! the way the dialogue manager would from user input, runs one action,
//! and applies the outcome's updates before the next step.
//!
//! ```json
//! {
//!   "form": "cc_payment_form",
//!   "steps": [
//!     { "fill": { "credit_card": "iron bank" }, "action": "validate_credit_card" },
//!     { "fill": { "confirm": true }, "action": "action_submit_cc_payment" }
//!   ]
//! }
//! ```

use std::path::Path;
use std::process;

use serde::{Deserialize, Serialize};
use tally_core::{ConversationState, Outcome};
use tally_eval::Engine;

use crate::render::outcome_lines;
use crate::{print_json, read_json, report_error, OutputFormat};

#[derive(Debug, Deserialize)]
pub(crate) struct Script {
    #[serde(default)]
    pub state: Option<serde_json::Value>,
    #[serde(default)]
    pub form: Option<String>,
    pub steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Step {
    #[serde(default)]
    pub fill: serde_json::Map<String, serde_json::Value>,
    pub action: String,
    #[serde(default)]
    pub entities: serde_json::Value,
    /// Overrides the script's default form for this step.
    #[serde(default)]
    pub form: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct StepReport {
    pub step: usize,
    pub action: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}

/// Run every step, carrying the state forward. Stops at the first step
/// that fails.
pub(crate) fn replay(
    engine: &Engine,
    script: &Script,
) -> Result<(Vec<StepReport>, ConversationState), String> {
    let mut state = match &script.state {
        Some(initial) => ConversationState::from_json(initial)
            .map_err(|e| format!("error: initial state: {}", e))?,
        None => ConversationState::new(),
    };

    let mut reports = Vec::with_capacity(script.steps.len());
    for (index, step) in script.steps.iter().enumerate() {
        let number = index + 1;
        let fail = |e: String| format!("error: step {} ({}): {}", number, step.action, e);

        for (slot, raw) in &step.fill {
            state.fill(slot, raw).map_err(|e| fail(e.to_string()))?;
        }
        let form = step.form.as_deref().or(script.form.as_deref());
        let outcome = engine
            .run_json(&step.action, &state.to_json(), &step.entities, form)
            .map_err(|e| fail(e.to_string()))?;
        state.apply(&outcome.updates).map_err(|e| fail(e.to_string()))?;
        tracing::debug!(step = number, action = %step.action, slots = state.len(), "step applied");

        reports.push(StepReport {
            step: number,
            action: step.action.clone(),
            outcome,
        });
    }
    Ok((reports, state))
}

pub(crate) fn cmd_session(engine: &Engine, script_path: &Path, output: OutputFormat, quiet: bool) {
    let script: Script = match read_json(script_path).and_then(|v| {
        serde_json::from_value(v)
            .map_err(|e| format!("error: invalid script {}: {}", script_path.display(), e))
    }) {
        Ok(s) => s,
        Err(msg) => {
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };

    let (reports, state) = match replay(engine, &script) {
        Ok(result) => result,
        Err(msg) => {
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };

    if quiet {
        return;
    }
    match output {
        OutputFormat::Json => print_json(&serde_json::json!({
            "steps": reports,
            "state": state.to_json(),
        })),
        OutputFormat::Text => {
            for report in &reports {
                println!("[{}] {}", report.step, report.action);
                for line in outcome_lines(&report.outcome) {
                    println!("  {}", line);
                }
            }
            println!("Final state:");
            if state.is_empty() {
                println!("  (empty)");
            }
            for (slot, value) in state.iter() {
                println!("  {} = {}", slot, value);
            }
        }
    }
}
