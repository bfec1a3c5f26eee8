//! Bourse Exchange Connectors
//!
//! Exchange adapters implementing the unified `Exchange` interface.
//! Normalizes exchange-specific payloads to domain types.

#![warn(clippy::all)]

// Public modules
pub mod binance;

// Re-exports
pub use binance::{
    Binance, BinanceConfig, BinanceOptions, CallParams, CurrencyActivePolicy, FetchTradesMethod,
    OptionOverrides,
};
