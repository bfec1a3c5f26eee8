//! Value Objects for the unified schema
//!
//! Immutable primitives shared by every entity: sides, types, statuses,
//! timeframes, precision scales and fees.

use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Domain errors for value object validation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// Symbol must be a BASE/QUOTE pair
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// Timeframe not supported by the unified schema
    #[error("Invalid timeframe: {0}")]
    InvalidTimeframe(String),

    /// Market type is not one of spot, margin, future, delivery
    #[error("Invalid market type: {0}")]
    InvalidMarketType(String),

    /// Order side is not buy or sell
    #[error("Invalid order side: {0}")]
    InvalidOrderSide(String),

    /// Order type is unknown
    #[error("Invalid order type: {0}")]
    InvalidOrderType(String),

    /// Precision step must be positive
    #[error("Invalid precision: {0}")]
    InvalidPrecision(String),

    /// Arithmetic on reported amounts left the decimal range
    #[error("Amount overflow: {0}")]
    AmountOverflow(String),
}

// =============================================================================
// Order Side / Type / Status
// =============================================================================

/// Side of an order or trade.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum OrderSide {
    /// Buy the base currency
    Buy,
    /// Sell the base currency
    Sell,
}

impl OrderSide {
    /// Exchange wire form (`BUY`/`SELL`).
    pub fn as_exchange_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "BUY",
            OrderSide::Sell => "SELL",
        }
    }
}

/// Order type in unified (snake_case) form.
///
/// Parsing is case-insensitive so the exchange forms (`STOP_LOSS_LIMIT`)
/// map directly.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum OrderType {
    Limit,
    Market,
    StopLoss,
    StopLossLimit,
    TakeProfit,
    TakeProfitLimit,
    LimitMaker,
    Stop,
    StopMarket,
    TakeProfitMarket,
    TrailingStopMarket,
}

impl OrderType {
    /// Exchange wire form (`STOP_LOSS_LIMIT`).
    pub fn as_exchange_str(&self) -> String {
        self.as_ref().to_ascii_uppercase()
    }

    /// Whether the order needs a `stopPrice` trigger.
    pub fn requires_stop_price(&self) -> bool {
        matches!(
            self,
            OrderType::StopLoss
                | OrderType::StopLossLimit
                | OrderType::TakeProfit
                | OrderType::TakeProfitLimit
                | OrderType::Stop
                | OrderType::StopMarket
                | OrderType::TakeProfitMarket
        )
    }
}

/// Order status.
///
/// Open taxonomy: exchange codes without a unified mapping are kept
/// verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    /// Resting or partially filled
    Open,
    /// Fully filled
    Closed,
    /// Canceled before full fill
    Canceled,
    /// Cancel requested, not yet confirmed
    Canceling,
    /// Rejected by the exchange
    Rejected,
    /// Expired by time-in-force or schedule
    Expired,
    /// Unmapped exchange status
    Other(String),
}

impl OrderStatus {
    /// Unified string form.
    pub fn as_str(&self) -> &str {
        match self {
            OrderStatus::Open => "open",
            OrderStatus::Closed => "closed",
            OrderStatus::Canceled => "canceled",
            OrderStatus::Canceling => "canceling",
            OrderStatus::Rejected => "rejected",
            OrderStatus::Expired => "expired",
            OrderStatus::Other(raw) => raw,
        }
    }
}

impl From<String> for OrderStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "open" => OrderStatus::Open,
            "closed" => OrderStatus::Closed,
            "canceled" => OrderStatus::Canceled,
            "canceling" => OrderStatus::Canceling,
            "rejected" => OrderStatus::Rejected,
            "expired" => OrderStatus::Expired,
            _ => OrderStatus::Other(value),
        }
    }
}

impl From<OrderStatus> for String {
    fn from(value: OrderStatus) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Time in force.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum TimeInForce {
    /// Good till canceled
    Gtc,
    /// Immediate or cancel
    Ioc,
    /// Fill or kill
    Fok,
    /// Good till crossing (post only)
    Gtx,
}

/// Liquidity role of a fill.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TakerOrMaker {
    /// Removed liquidity
    Taker,
    /// Provided liquidity
    Maker,
}

// =============================================================================
// Market Type
// =============================================================================

/// Market type, selecting the endpoint family and response shape.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum MarketType {
    /// Spot trading
    Spot,
    /// Cross/isolated margin on spot pairs
    Margin,
    /// Linear (quote-margined) futures
    Future,
    /// Inverse (coin-margined) delivery futures
    Delivery,
}

impl MarketType {
    /// Futures families (linear or inverse).
    pub fn is_contract(&self) -> bool {
        matches!(self, MarketType::Future | MarketType::Delivery)
    }

    /// Inverse contracts settle in the base currency.
    pub fn is_inverse(&self) -> bool {
        matches!(self, MarketType::Delivery)
    }
}

// =============================================================================
// Funding Types
// =============================================================================

/// Direction of a funding transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TransactionType {
    /// Incoming funds
    Deposit,
    /// Outgoing funds
    Withdrawal,
}

/// Status of a deposit, withdrawal or transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Ok,
    Failed,
    Canceled,
}

/// Position direction for derivatives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PositionSide {
    Long,
    Short,
}

/// Margin mode of a derivatives position.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum MarginMode {
    Isolated,
    #[strum(to_string = "cross", serialize = "crossed")]
    Cross,
}

// =============================================================================
// Timeframe
// =============================================================================

/// Candle interval.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
pub enum Timeframe {
    #[serde(rename = "1m")]
    #[strum(serialize = "1m")]
    Minute1,
    #[serde(rename = "3m")]
    #[strum(serialize = "3m")]
    Minute3,
    #[serde(rename = "5m")]
    #[strum(serialize = "5m")]
    Minute5,
    #[serde(rename = "15m")]
    #[strum(serialize = "15m")]
    Minute15,
    #[serde(rename = "30m")]
    #[strum(serialize = "30m")]
    Minute30,
    #[serde(rename = "1h")]
    #[strum(serialize = "1h")]
    Hour1,
    #[serde(rename = "2h")]
    #[strum(serialize = "2h")]
    Hour2,
    #[serde(rename = "4h")]
    #[strum(serialize = "4h")]
    Hour4,
    #[serde(rename = "6h")]
    #[strum(serialize = "6h")]
    Hour6,
    #[serde(rename = "8h")]
    #[strum(serialize = "8h")]
    Hour8,
    #[serde(rename = "12h")]
    #[strum(serialize = "12h")]
    Hour12,
    #[serde(rename = "1d")]
    #[strum(serialize = "1d")]
    Day1,
    #[serde(rename = "3d")]
    #[strum(serialize = "3d")]
    Day3,
    #[serde(rename = "1w")]
    #[strum(serialize = "1w")]
    Week1,
    #[serde(rename = "1M")]
    #[strum(serialize = "1M")]
    Month1,
}

// =============================================================================
// Decimal Scale
// =============================================================================

/// Number of decimal places of the smallest tradable unit.
///
/// The exchange publishes a step (`0.00000001`); this type stores the
/// positive number of decimal places (8) and exposes the negated exponent
/// form (-8) separately so callers never guess the sign convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DecimalScale(u32);

impl DecimalScale {
    /// Create from a number of decimal places.
    pub fn new(decimal_places: u32) -> Self {
        Self(decimal_places)
    }

    /// Derive the scale from a step size such as `0.0001`.
    ///
    /// Steps of 1 or more have a scale of 0.
    ///
    /// # Errors
    /// Returns `DomainError::InvalidPrecision` if the step is not positive
    pub fn from_step(step: Decimal) -> Result<Self, DomainError> {
        if step <= Decimal::ZERO {
            return Err(DomainError::InvalidPrecision(format!(
                "step must be positive, got {}",
                step
            )));
        }
        Ok(Self(step.normalize().scale()))
    }

    /// Positive convention: `8` for a step of `1e-8`.
    pub fn decimal_places(&self) -> u32 {
        self.0
    }

    /// Negated-exponent convention: `-8` for a step of `1e-8`.
    pub fn exponent(&self) -> i32 {
        -(self.0 as i32)
    }
}

impl fmt::Display for DecimalScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Fee / Limits
// =============================================================================

/// Fee charged on a trade, order or transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fee {
    /// Currency the fee was paid in (unified code)
    pub currency: String,
    /// Absolute fee amount
    pub cost: Decimal,
    /// Fee rate, when known
    pub rate: Option<Decimal>,
}

/// Optional lower and upper bound.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinMax {
    pub min: Option<Decimal>,
    pub max: Option<Decimal>,
}

impl MinMax {
    /// Create a bound pair.
    pub fn new(min: Option<Decimal>, max: Option<Decimal>) -> Self {
        Self { min, max }
    }
}

// =============================================================================
// Time
// =============================================================================

/// Render a millisecond timestamp as ISO-8601 (`2024-01-01T00:00:00.000Z`).
pub fn iso8601(timestamp_ms: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp_millis(timestamp_ms)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}

// =============================================================================
// Tests
// =============================================================================
