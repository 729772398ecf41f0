#![forbid(unsafe_code)]
//! HTTP API server for mortgage ledgers

use clap::Parser;
use mortgage_ledger::api::{run_api_server, ApiState};
use mortgage_ledger::cli::init_tracing;
use mortgage_ledger::config::{load_config, load_config_from};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ledger-server", about = "Serve the mortgage ledger API")]
struct Args {
    /// Configuration file (defaults to ./ledger.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Listen port, overrides [api].port and $PORT
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };

    let port = args
        .port
        .or_else(|| std::env::var("PORT").ok().and_then(|p| p.parse().ok()))
        .unwrap_or(config.api.port);

    let state = ApiState::new(config.export.hash_preview_len);
    run_api_server(state, port).await
}
