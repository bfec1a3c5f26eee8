//! Account Entities
//!
//! Orders, balances, funding movements and derivatives positions.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::market_data::{Timestamped, Trade};
use crate::value_objects::{
    DomainError, Fee, MarginMode, OrderSide, OrderStatus, OrderType, PositionSide, TimeInForce,
    TransactionStatus, TransactionType,
};

// =============================================================================
// Order
// =============================================================================

/// An order in unified form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub client_order_id: Option<String>,
    pub timestamp: Option<i64>,
    pub datetime: Option<String>,
    pub last_trade_timestamp: Option<i64>,
    pub symbol: String,
    pub order_type: Option<OrderType>,
    pub time_in_force: Option<TimeInForce>,
    pub side: Option<OrderSide>,
    pub price: Option<Decimal>,
    pub stop_price: Option<Decimal>,
    /// Average fill price
    pub average: Option<Decimal>,
    pub amount: Option<Decimal>,
    pub filled: Option<Decimal>,
    /// `amount - filled`
    pub remaining: Option<Decimal>,
    /// Filled value in quote (or base for inverse contracts)
    pub cost: Option<Decimal>,
    pub status: OrderStatus,
    pub reduce_only: Option<bool>,
    pub fee: Option<Fee>,
    /// Fills reported with the order
    pub trades: Vec<Trade>,
    pub info: serde_json::Value,
}

impl Timestamped for Order {
    fn timestamp(&self) -> Option<i64> {
        self.timestamp
    }
}

// =============================================================================
// Balance
// =============================================================================

/// Free / used / total amounts of one currency.
///
/// # Invariants
/// - `total == free + used`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub free: Decimal,
    pub used: Decimal,
    pub total: Decimal,
}

impl Balance {
    /// Build a balance from whichever members the exchange reported.
    ///
    /// A missing member is derived from the other two; with only one
    /// member known the rest default to zero.
    ///
    /// # Errors
    /// Returns `DomainError::AmountOverflow` if a derived member does not
    /// fit a `Decimal`
    pub fn from_parts(
        free: Option<Decimal>,
        used: Option<Decimal>,
        total: Option<Decimal>,
    ) -> Result<Self, DomainError> {
        let overflow = || DomainError::AmountOverflow(format!("free={:?} used={:?} total={:?}", free, used, total));
        let balance = match (free, used, total) {
            (Some(free), Some(used), _) => Self {
                free,
                used,
                total: free.checked_add(used).ok_or_else(overflow)?,
            },
            (Some(free), None, Some(total)) => Self {
                free,
                used: total.checked_sub(free).ok_or_else(overflow)?,
                total,
            },
            (None, Some(used), Some(total)) => Self {
                free: total.checked_sub(used).ok_or_else(overflow)?,
                used,
                total,
            },
            (Some(free), None, None) => Self { free, used: Decimal::ZERO, total: free },
            (None, Some(used), None) => Self { free: Decimal::ZERO, used, total: used },
            (None, None, Some(total)) => Self { free: total, used: Decimal::ZERO, total },
            (None, None, None) => Self::default(),
        };
        Ok(balance)
    }
}

/// Account balances keyed by unified currency code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Balances {
    pub timestamp: Option<i64>,
    pub currencies: HashMap<String, Balance>,
    pub info: serde_json::Value,
}

impl Balances {
    /// Balance of one currency.
    pub fn get(&self, code: &str) -> Option<&Balance> {
        self.currencies.get(code)
    }
}

// =============================================================================
// Funding
// =============================================================================

/// A deposit or withdrawal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Option<String>,
    pub txid: Option<String>,
    pub transaction_type: TransactionType,
    pub currency: String,
    pub amount: Option<Decimal>,
    pub address: Option<String>,
    pub tag: Option<String>,
    pub network: Option<String>,
    pub status: Option<TransactionStatus>,
    pub fee: Option<Fee>,
    pub timestamp: Option<i64>,
    pub datetime: Option<String>,
    pub updated: Option<i64>,
    pub info: serde_json::Value,
}

impl Timestamped for Transaction {
    fn timestamp(&self) -> Option<i64> {
        self.timestamp
    }
}

/// A move of funds between the account's own wallets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transfer {
    pub id: Option<String>,
    pub timestamp: Option<i64>,
    pub datetime: Option<String>,
    pub currency: Option<String>,
    pub amount: Option<Decimal>,
    pub from_account: Option<String>,
    pub to_account: Option<String>,
    pub status: Option<TransactionStatus>,
    pub info: serde_json::Value,
}

impl Timestamped for Transfer {
    fn timestamp(&self) -> Option<i64> {
        self.timestamp
    }
}

/// A deposit address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepositAddress {
    pub currency: String,
    pub address: String,
    pub tag: Option<String>,
    pub network: Option<String>,
    pub info: serde_json::Value,
}

/// Withdrawal and deposit fees by currency.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FundingFees {
    /// Fee of the primary network
    pub withdraw: HashMap<String, Decimal>,
    /// Fee per network
    pub withdraw_by_network: HashMap<String, HashMap<String, Decimal>>,
    pub deposit: HashMap<String, Decimal>,
}

/// Maker/taker fee rates for a symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradingFee {
    pub symbol: String,
    pub maker: Option<Decimal>,
    pub taker: Option<Decimal>,
    pub info: serde_json::Value,
}

// =============================================================================
// Position
// =============================================================================

/// An open derivatives position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub side: Option<PositionSide>,
    /// Absolute position size in contracts
    pub contracts: Option<Decimal>,
    pub entry_price: Option<Decimal>,
    pub mark_price: Option<Decimal>,
    pub notional: Option<Decimal>,
    pub unrealized_pnl: Option<Decimal>,
    pub liquidation_price: Option<Decimal>,
    pub leverage: Option<Decimal>,
    pub margin_mode: Option<MarginMode>,
    pub timestamp: Option<i64>,
    pub info: serde_json::Value,
}

// =============================================================================
// Tests
// =============================================================================
