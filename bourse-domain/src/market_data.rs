//! Market Data Types
//!
//! Unified order books, tickers, candles and trades.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::value_objects::{Fee, OrderSide, OrderType, TakerOrMaker};

/// Anything that can be filtered by a `since` timestamp.
pub trait Timestamped {
    /// Milliseconds since the epoch, when known.
    fn timestamp(&self) -> Option<i64>;
}

// =============================================================================
// Order Book
// =============================================================================

/// One price level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBookLevel {
    pub price: Decimal,
    pub amount: Decimal,
}

impl OrderBookLevel {
    /// Create a price level.
    pub fn new(price: Decimal, amount: Decimal) -> Self {
        Self { price, amount }
    }
}

/// Order book snapshot.
///
/// # Invariants
/// - `bids` descending by price, `asks` ascending
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBook {
    pub symbol: String,
    pub bids: Vec<OrderBookLevel>,
    pub asks: Vec<OrderBookLevel>,
    pub timestamp: Option<i64>,
    pub datetime: Option<String>,
    /// Exchange update sequence (`lastUpdateId`)
    pub nonce: Option<i64>,
}

impl OrderBook {
    /// Best bid, if any.
    pub fn best_bid(&self) -> Option<&OrderBookLevel> {
        self.bids.first()
    }

    /// Best ask, if any.
    pub fn best_ask(&self) -> Option<&OrderBookLevel> {
        self.asks.first()
    }
}

// =============================================================================
// Ticker
// =============================================================================

/// 24h rolling statistics for a symbol.
///
/// # Invariants
/// - `last == close`
/// - `change` and `percentage` are the exchange's values, unmodified
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticker {
    pub symbol: String,
    pub timestamp: Option<i64>,
    pub datetime: Option<String>,
    pub high: Option<Decimal>,
    pub low: Option<Decimal>,
    pub bid: Option<Decimal>,
    pub bid_volume: Option<Decimal>,
    pub ask: Option<Decimal>,
    pub ask_volume: Option<Decimal>,
    pub vwap: Option<Decimal>,
    pub open: Option<Decimal>,
    pub close: Option<Decimal>,
    pub last: Option<Decimal>,
    pub previous_close: Option<Decimal>,
    pub change: Option<Decimal>,
    pub percentage: Option<Decimal>,
    pub base_volume: Option<Decimal>,
    pub quote_volume: Option<Decimal>,
    pub info: serde_json::Value,
}

// =============================================================================
// OHLCV
// =============================================================================

/// One candle. Timestamp is always in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ohlcv {
    pub timestamp: i64,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

impl Ohlcv {
    /// The fixed 6-tuple `[timestamp, open, high, low, close, volume]`.
    pub fn as_row(&self) -> (i64, Decimal, Decimal, Decimal, Decimal, Decimal) {
        (self.timestamp, self.open, self.high, self.low, self.close, self.volume)
    }
}

impl Timestamped for Ohlcv {
    fn timestamp(&self) -> Option<i64> {
        Some(self.timestamp)
    }
}

// =============================================================================
// Trade
// =============================================================================

/// A public trade or one of the account's fills.
///
/// # Invariants
/// - `cost == price * amount` unless the exchange supplied it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: Option<String>,
    /// Linked order id (own trades only)
    pub order: Option<String>,
    pub timestamp: Option<i64>,
    pub datetime: Option<String>,
    pub symbol: Option<String>,
    /// Aggressor side; `None` when the payload carries no side information
    pub side: Option<OrderSide>,
    pub order_type: Option<OrderType>,
    pub taker_or_maker: Option<TakerOrMaker>,
    pub price: Option<Decimal>,
    pub amount: Option<Decimal>,
    pub cost: Option<Decimal>,
    pub fee: Option<Fee>,
    pub info: serde_json::Value,
}

impl Timestamped for Trade {
    fn timestamp(&self) -> Option<i64> {
        self.timestamp
    }
}

// =============================================================================
// Tests
// =============================================================================
