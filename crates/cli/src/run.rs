//! CLI run subcommand: one action, one turn.

use std::path::Path;
use std::process;

use tally_eval::Engine;

use crate::render::outcome_lines;
use crate::{print_json, read_json, report_error, OutputFormat};

pub(crate) fn cmd_run(
    engine: &Engine,
    action: &str,
    state_path: &Path,
    entities_path: Option<&Path>,
    form: Option<&str>,
    output: OutputFormat,
    quiet: bool,
) {
    let state = match read_json(state_path) {
        Ok(v) => v,
        Err(msg) => {
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };
    let entities = match entities_path.map(read_json).transpose() {
        Ok(v) => v.unwrap_or(serde_json::Value::Null),
        Err(msg) => {
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };

    let outcome = match engine.run_json(action, &state, &entities, form) {
        Ok(outcome) => outcome,
        Err(e) => {
            report_error(&format!("error: {}", e), output, quiet);
            process::exit(1);
        }
    };

    if quiet {
        return;
    }
    match output {
        OutputFormat::Json => print_json(&outcome),
        OutputFormat::Text => {
            println!("{}", action);
            for line in outcome_lines(&outcome) {
                println!("  {}", line);
            }
        }
    }
}
