//! Subcommands and their execution.
//!
//! Every command calls one unified operation and renders its result as
//! JSON.

use clap::Subcommand;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use bourse_connectors::{Binance, CallParams, OptionOverrides};
use bourse_domain::{Market, MarketType, Timeframe};
use bourse_exchange::Exchange;

use crate::error::CliResult;

/// Operations exposed on the command line.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List markets of the configured families
    Markets {
        /// Bypass the market cache
        #[arg(long)]
        reload: bool,
    },
    /// List currencies (requires credentials)
    Currencies,
    /// 24h ticker of one market
    Ticker { symbol: String },
    /// Order book snapshot
    Book {
        symbol: String,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Candles
    Ohlcv {
        symbol: String,
        #[arg(long, default_value = "1h")]
        timeframe: Timeframe,
        #[arg(long)]
        since: Option<i64>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Recent public trades
    Trades {
        symbol: String,
        #[arg(long)]
        since: Option<i64>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Account balances
    Balance,
    /// Open orders, of one market or the whole account
    OpenOrders {
        symbol: Option<String>,
        /// Allow the account-wide query
        #[arg(long)]
        all: bool,
    },
    /// Own trades of one market
    MyTrades {
        symbol: String,
        #[arg(long)]
        since: Option<i64>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Exchange server time (ms)
    Time,
    /// Whether the exchange is operational
    Status,
}

fn json<T: Serialize>(value: T) -> CliResult<Value> {
    Ok(serde_json::to_value(value)?)
}

/// Run `command` against `exchange`, optionally on a given market type.
pub async fn run(exchange: &Binance, command: Command, market_type: Option<MarketType>) -> CliResult<Value> {
    let mut params = CallParams::new();
    params.market_type = market_type;
    debug!(?command, ?market_type, "Running command");

    match command {
        Command::Markets { reload } => {
            let snapshot = exchange.load_markets(reload).await?;
            let mut markets: Vec<&Market> = snapshot.markets().map(|m| m.as_ref()).collect();
            markets.sort_by(|a, b| a.symbol.cmp(&b.symbol));
            json(markets)
        },
        Command::Currencies => json(exchange.fetch_currencies(&params).await?),
        Command::Ticker { symbol } => json(exchange.fetch_ticker(&symbol, &params).await?),
        Command::Book { symbol, limit } => json(exchange.fetch_order_book(&symbol, limit, &params).await?),
        Command::Ohlcv { symbol, timeframe, since, limit } => {
            json(exchange.fetch_ohlcv(&symbol, timeframe, since, limit, &params).await?)
        },
        Command::Trades { symbol, since, limit } => {
            json(exchange.fetch_trades(&symbol, since, limit, &params).await?)
        },
        Command::Balance => json(exchange.fetch_balance(&params).await?),
        Command::OpenOrders { symbol, all } => {
            if all {
                params = params.with_overrides(OptionOverrides {
                    warn_on_fetch_open_orders_without_symbol: Some(false),
                    ..Default::default()
                });
            }
            json(exchange.fetch_open_orders(symbol.as_deref(), None, None, &params).await?)
        },
        Command::MyTrades { symbol, since, limit } => {
            json(exchange.fetch_my_trades(Some(&symbol), since, limit, &params).await?)
        },
        Command::Time => json(exchange.fetch_time(&params).await?),
        Command::Status => json(exchange.fetch_status(&params).await?),
    }
}

// =============================================================================
// Tests
// =============================================================================
