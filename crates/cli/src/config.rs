//! Reference-table configuration and the `tally reference` subcommand.
//!
//! Without `--reference` the engine uses its built-in tables. A reference
//! file replaces them wholesale; tables it leaves out are empty.
//!
//! # Example
//!
//! ```toml
//! opening_balance = "550.00"
//! credit_cards = ["iron bank", "gringots"]
//! vendors = ["amazon"]
//!
//! [payment_amounts]
//! "minimum balance" = "85.00"
//!
//! [[transactions.spend.amazon]]
//! amount = "35.95"
//!
//! [[transactions.deposit.employer]]
//! amount = "1250.00"
//! ```

use std::path::Path;

use tally_core::{format_money, SearchType};
use tally_eval::{Engine, ReferenceTables};

use crate::{print_json, OutputFormat};

/// Parse reference tables from TOML text.
pub(crate) fn parse_tables(text: &str) -> Result<ReferenceTables, String> {
    toml::from_str(text).map_err(|e| format!("invalid reference tables: {}", e))
}

/// Build the engine, from `path` when given.
pub(crate) fn load_engine(path: Option<&Path>) -> Result<Engine, String> {
    let Some(path) = path else {
        return Ok(Engine::default());
    };
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("error: cannot read {}: {}", path.display(), e))?;
    let tables = parse_tables(&text).map_err(|e| format!("error: {}: {}", path.display(), e))?;
    let engine =
        Engine::from_tables(tables).map_err(|e| format!("error: {}: {}", path.display(), e))?;
    tracing::info!(path = %path.display(), "loaded reference tables");
    Ok(engine)
}

pub(crate) fn cmd_reference(engine: &Engine, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    let tables = engine.reference().tables();
    match output {
        OutputFormat::Json => print_json(tables),
        OutputFormat::Text => {
            println!("Opening balance: {}", format_money(tables.opening_balance));
            println!("Payment amounts:");
            for (alias, amount) in &tables.payment_amounts {
                println!("  {} = {}", alias, format_money(*amount));
            }
            println!("Credit cards:");
            for card in &tables.credit_cards {
                println!("  {}", card);
            }
            println!("Vendors:");
            for vendor in &tables.vendors {
                println!("  {}", vendor);
            }
            for category in SearchType::ALL {
                let Some(ledgers) = tables.transactions.get(&category) else {
                    continue;
                };
                println!("Transactions ({}):", category);
                for (counterparty, txs) in ledgers {
                    let amounts: Vec<String> =
                        txs.iter().map(|t| format_money(t.amount)).collect();
                    println!("  {}: {}", counterparty, amounts.join(", "));
                }
            }
        }
    }
}
