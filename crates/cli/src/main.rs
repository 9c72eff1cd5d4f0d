mod config;
mod render;
mod run;
mod session;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Tally banking-assistant engine.
#[derive(Parser)]
#[command(name = "tally", version, about = "Tally banking-assistant engine")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// TOML file replacing the built-in reference tables
    #[arg(long, global = true)]
    reference: Option<PathBuf>,

    /// Log filter (e.g. `debug`, `tally_eval=info`); overrides RUST_LOG
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one action against a slot map
    Run {
        /// Action name (e.g. validate_credit_card, action_submit_transfer)
        action: String,
        /// Path to the slot map JSON
        #[arg(long)]
        state: PathBuf,
        /// Path to the turn's entity list JSON
        #[arg(long)]
        entities: Option<PathBuf>,
        /// Active form (cc_payment_form, transact_search_form, transfer_form)
        #[arg(long)]
        form: Option<String>,
    },

    /// Replay a scripted conversation, carrying the state between steps
    Session {
        /// Path to the session script JSON
        script: PathBuf,
    },

    /// Print the effective reference tables
    Reference,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());

    let engine = match config::load_engine(cli.reference.as_deref()) {
        Ok(engine) => engine,
        Err(e) => {
            report_error(&e, cli.output, cli.quiet);
            process::exit(1);
        }
    };

    match cli.command {
        Commands::Run {
            action,
            state,
            entities,
            form,
        } => {
            run::cmd_run(
                &engine,
                &action,
                &state,
                entities.as_deref(),
                form.as_deref(),
                cli.output,
                cli.quiet,
            );
        }
        Commands::Session { script } => {
            session::cmd_session(&engine, &script, cli.output, cli.quiet);
        }
        Commands::Reference => {
            config::cmd_reference(&engine, cli.output, cli.quiet);
        }
    }
}

/// Logs go to stderr so stdout stays machine-readable. `--log-level` wins
/// over `RUST_LOG`; with neither, only warnings are shown.
fn init_logging(level: Option<&str>) {
    let filter = match level {
        Some(directives) => EnvFilter::try_new(directives).ok(),
        None => EnvFilter::try_from_default_env().ok(),
    }
    .unwrap_or_else(|| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Read and parse a JSON file, naming the file in any error.
pub(crate) fn read_json(path: &std::path::Path) -> Result<serde_json::Value, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("error: cannot read {}: {}", path.display(), e))?;
    serde_json::from_str(&text)
        .map_err(|e| format!("error: invalid JSON in {}: {}", path.display(), e))
}

/// Print a JSON value, pretty-printed.
pub(crate) fn print_json(value: &impl serde::Serialize) {
    println!(
        "{}",
        serde_json::to_string_pretty(value)
            .unwrap_or_else(|e| format!("serialization error: {}", e))
    );
}

/// Report an error in the selected output format.
pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}
