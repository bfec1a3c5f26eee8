//! Binance adapter.
//!
//! One adapter covers four endpoint families (spot, cross margin, linear
//! and inverse futures). Each call resolves its family from the call
//! parameters, the market, or the configured default.

/// Adapter identifier, prefix of every error message.
pub const ID: &str = "binance";

pub mod client;
pub mod config;
pub mod endpoints;
pub mod errors;
mod exchange;
pub mod models;
pub mod parse;
mod signing;

pub use client::{Binance, Query};
pub use config::{
    BinanceConfig, BinanceOptions, CallParams, CurrencyActivePolicy, FetchTradesMethod,
    NewOrderRespType, NewOrderRespTypes, OptionOverrides,
};
pub use endpoints::{resolve_market_type, ApiClass, Endpoint, EndpointFamily};
