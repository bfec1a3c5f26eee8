//! Bourse CLI
//!
//! Query Binance through the unified trading schema.
//!
//! # Usage
//!
//! ```bash
//! # Public market data
//! cargo run -p bourse-cli -- ticker BTC/USDT
//!
//! # Futures balance on the testnet
//! BOURSE_SANDBOX=true cargo run -p bourse-cli -- --type future balance
//! ```
//!
//! # Environment Variables
//!
//! - `BOURSE_API_KEY` / `BOURSE_API_SECRET`: Credentials (both or neither)
//! - `BOURSE_SANDBOX`: Use the testnet hosts (default: false)
//! - `BOURSE_TIMEOUT_SECS`: Request timeout (default: 10)
//! - `BOURSE_DEFAULT_TYPE`: spot, margin, future or delivery (default: spot)
//! - `BOURSE_RECV_WINDOW`: Signed request window in ms (default: 5000)

use bourse_cli::{commands, Command, Config};
use bourse_connectors::Binance;
use bourse_domain::MarketType;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "bourse")]
#[command(about = "Binance through a unified trading schema")]
#[command(version)]
struct Cli {
    /// Market type for this call, overriding BOURSE_DEFAULT_TYPE
    #[arg(long = "type", global = true)]
    market_type: Option<MarketType>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays parseable
    let filter = EnvFilter::from_default_env()
        .add_directive("bourse_cli=info".parse()?)
        .add_directive("bourse_connectors=info".parse()?);
    if cli.json_logs {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(filter)
            .init();
    }

    let config = Config::from_env()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        sandbox = config.sandbox,
        default_type = %config.default_type,
        authenticated = config.credentials.is_some(),
        "Bourse CLI"
    );

    let exchange = Binance::new(config.binance_config());
    let output = commands::run(&exchange, cli.command, cli.market_type).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
