#![forbid(unsafe_code)]
//! Re-derive every digest of an exported ledger and check its links

use clap::Parser;
use colored::*;
use mortgage_ledger::blockchain::verify_records;
use mortgage_ledger::cli::init_tracing;
use mortgage_ledger::export::from_json;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "ledger-verify", about = "Verify an exported mortgage ledger")]
struct Args {
    /// JSON file produced by ledger-generate --json
    file: PathBuf,
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    init_tracing();
    let args = Args::parse();

    let content = std::fs::read_to_string(&args.file)
        .map_err(|e| format!("Failed to read {}: {}", args.file.display(), e))?;
    let records = from_json(&content)?;

    match verify_records(&records) {
        Ok(count) => {
            println!(
                "{} {}",
                "✅ Ledger intact:".green().bold(),
                format!("{} blocks, every hash and link verified", count).bright_white()
            );
            if let Some(tip) = records.last() {
                println!("   {} {}", "Tip:".bright_white(), tip.hash.bright_magenta());
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("{} {}", "❌ Ledger rejected:".red().bold(), e.to_string().red());
            Ok(ExitCode::FAILURE)
        }
    }
}
