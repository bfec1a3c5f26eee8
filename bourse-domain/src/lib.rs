//! Bourse Domain Layer
//!
//! Unified market, order, trade and account schema shared by exchange
//! adapters. Pure data with zero I/O dependencies.

#![warn(missing_docs)]
#![warn(clippy::all)]

// Public modules
pub mod credentials;
pub mod entities;
pub mod market;
pub mod market_data;
pub mod value_objects;

// Re-export commonly used types
pub use credentials::ApiCredentials;
pub use entities::{
    Balance, Balances, DepositAddress, FundingFees, Order, Position, TradingFee, Transaction,
    Transfer,
};
pub use market::{Currency, CurrencyNetwork, Market, MarketLimits, MarketPrecision};
pub use market_data::{OrderBook, OrderBookLevel, Ohlcv, Ticker, Timestamped, Trade};
pub use value_objects::{
    iso8601, DecimalScale, DomainError, Fee, MarginMode, MarketType, MinMax, OrderSide,
    OrderStatus, OrderType, PositionSide, TakerOrMaker, TimeInForce, Timeframe,
    TransactionStatus, TransactionType,
};
