#![forbid(unsafe_code)]
//! Amortize a loan, seal the schedule into a ledger and export it

use clap::Parser;
use colored::*;
use mortgage_ledger::amortization::build_ledger;
use mortgage_ledger::cli::{format_money, init_tracing, ledger_table};
use mortgage_ledger::config::{load_config, load_config_from};
use mortgage_ledger::export::{to_csv, to_json};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ledger-generate", about = "Generate a hash-linked mortgage ledger")]
struct Args {
    /// Configuration file (defaults to ./ledger.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Principal amount, overrides [loan].principal
    #[arg(long)]
    principal: Option<f64>,
    /// Annual interest rate in percent, overrides [loan].annual_rate_percent
    #[arg(long)]
    rate: Option<f64>,
    /// Loan term in years, overrides [loan].years
    #[arg(long)]
    years: Option<u32>,
    /// Write the JSON ledger here (use --json with no value for the configured path)
    #[arg(long, num_args = 0..=1, default_missing_value = "")]
    json: Option<String>,
    /// Write the CSV table here (use --csv with no value for the configured path)
    #[arg(long, num_args = 0..=1, default_missing_value = "")]
    csv: Option<String>,
    /// Number of schedule rows to print
    #[arg(long, default_value_t = 12)]
    rows: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };

    let mut terms = config.loan.terms();
    if let Some(principal) = args.principal {
        terms.principal = principal;
    }
    if let Some(rate) = args.rate {
        terms.annual_rate_percent = rate;
    }
    if let Some(years) = args.years {
        terms.years = years;
    }

    let (ledger, summary) = build_ledger(&terms)?;
    let records = ledger.records();
    let preview_len = config.export.hash_preview_len;

    println!("{}", "🏦 Mortgage Ledger".bright_cyan().bold());
    println!(
        "{}",
        format!(
            "   {} at {}% over {} years, {} blocks sealed",
            format_money(terms.principal),
            terms.annual_rate_percent,
            terms.years,
            ledger.len()
        )
        .cyan()
    );
    println!();
    println!(
        "   {} {}",
        "Monthly Payment:".bright_white(),
        format_money(summary.monthly_payment).bright_green().bold()
    );
    println!(
        "   {} {}",
        "Total Interest: ".bright_white(),
        format_money(summary.total_interest).yellow()
    );
    println!(
        "   {} {}",
        "Total Cost:     ".bright_white(),
        format_money(summary.total_cost).yellow()
    );
    println!(
        "   {} {}",
        "Tip Hash:       ".bright_white(),
        ledger.tip().hash().bright_magenta()
    );
    println!();

    if args.rows > 0 {
        println!("{}", ledger_table(&records, args.rows, preview_len));
        if summary.months as usize > args.rows {
            println!(
                "{}",
                format!("   ... {} more payments", summary.months as usize - args.rows).dimmed()
            );
        }
        println!();
    }

    if let Some(path) = &args.json {
        let path = if path.is_empty() { &config.export.json_path } else { path };
        std::fs::write(path, to_json(&records)?)?;
        println!("{} {}", "📦 Blockchain JSON written to".green(), path.bright_white());
    }
    if let Some(path) = &args.csv {
        let path = if path.is_empty() { &config.export.csv_path } else { path };
        std::fs::write(path, to_csv(&records, preview_len))?;
        println!("{} {}", "📄 Ledger CSV written to".green(), path.bright_white());
    }

    Ok(())
}
