//! Runs one comparison from a request file and prints the result as JSON.
//!
//! ```text
//! compare request.json --providers axa,mcma --pretty
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use motor_quote_aggregator::bootstrap::EngineRuntime;
use motor_quote_aggregator::config::AppConfig;
use motor_quote_aggregator::domain::entities::CanonicalQuoteRequest;
use motor_quote_aggregator::domain::value_objects::ProviderCode;
use motor_quote_aggregator::telemetry::init_tracing;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "compare")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Compare motor insurance quotes across providers", long_about = None)]
struct Cli {
    /// Path to the request JSON file
    request: PathBuf,

    /// Providers to query (default: every enabled provider)
    #[arg(short, long, value_delimiter = ',')]
    providers: Vec<ProviderCode>,

    /// Directory holding default.toml and local.toml
    #[arg(short, long, default_value = "config")]
    config_dir: PathBuf,

    /// Pretty-print the result
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let config = AppConfig::load_from(&cli.config_dir).context("loading configuration")?;
    init_tracing(&config.logging);

    let raw = std::fs::read_to_string(&cli.request)
        .with_context(|| format!("reading {}", cli.request.display()))?;
    let request: CanonicalQuoteRequest =
        serde_json::from_str(&raw).context("parsing request")?;

    let runtime = EngineRuntime::from_config(config)?;
    let subset = (!cli.providers.is_empty()).then_some(cli.providers.as_slice());
    let outcome = runtime.compare(&request, subset).await;
    runtime.shutdown().await;

    let result = outcome?;
    let json = if cli.pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{}", json);
    Ok(())
}
