//! Markets and Currencies
//!
//! Listing metadata loaded once per session and cached by the exchange
//! client.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::value_objects::{DecimalScale, DomainError, MarketType, MinMax};

// =============================================================================
// Market
// =============================================================================

/// Precision of prices, amounts and costs on a market.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketPrecision {
    pub price: Option<DecimalScale>,
    pub amount: Option<DecimalScale>,
    pub cost: Option<DecimalScale>,
}

/// Trading limits of a market.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketLimits {
    pub amount: MinMax,
    pub price: MinMax,
    pub cost: MinMax,
}

/// A tradable instrument.
///
/// # Invariants
/// - `symbol` is always `base_id + "/" + quote_id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Market {
    /// Exchange market id (e.g. `BTCUSDT`)
    pub id: String,
    /// Unified symbol (e.g. `BTC/USDT`)
    pub symbol: String,
    /// Unified base currency code
    pub base: String,
    /// Unified quote currency code
    pub quote: String,
    /// Exchange base asset id
    pub base_id: String,
    /// Exchange quote asset id
    pub quote_id: String,
    /// Settlement currency for contracts
    pub settle: Option<String>,
    /// Endpoint family this market trades on
    pub market_type: MarketType,
    /// Open for trading
    pub active: bool,
    /// Margin trading allowed on this pair
    pub margin: bool,
    /// Contract multiplier (inverse contracts)
    pub contract_size: Option<Decimal>,
    pub precision: MarketPrecision,
    pub limits: MarketLimits,
    /// Taker fee rate
    pub taker: Option<Decimal>,
    /// Maker fee rate
    pub maker: Option<Decimal>,
    /// Raw exchange payload
    pub info: serde_json::Value,
}

impl Market {
    /// Build the unified symbol from exchange asset ids.
    pub fn symbol_for(base_id: &str, quote_id: &str) -> String {
        format!("{}/{}", base_id, quote_id)
    }

    /// Split a unified symbol into base and quote.
    ///
    /// # Errors
    /// Returns `DomainError::InvalidSymbol` if the symbol is not `BASE/QUOTE`
    pub fn split_symbol(symbol: &str) -> Result<(&str, &str), DomainError> {
        match symbol.split_once('/') {
            Some((base, quote)) if !base.is_empty() && !quote.is_empty() => Ok((base, quote)),
            _ => Err(DomainError::InvalidSymbol(format!(
                "expected BASE/QUOTE, got {}",
                symbol
            ))),
        }
    }
}

// =============================================================================
// Currency
// =============================================================================

/// One deposit/withdrawal network of a currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyNetwork {
    /// Network identifier (e.g. `ETH`, `BSC`)
    pub network: String,
    pub name: Option<String>,
    pub active: bool,
    pub deposit: bool,
    pub withdraw: bool,
    /// Withdrawal fee on this network
    pub fee: Option<Decimal>,
    pub precision: Option<DecimalScale>,
    /// Withdrawal amount bounds
    pub limits: MinMax,
    pub info: serde_json::Value,
}

/// A currency (asset) listed on the exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Currency {
    /// Exchange asset id
    pub id: String,
    /// Unified currency code
    pub code: String,
    pub name: Option<String>,
    /// Depositable or withdrawable, per the adapter's activity policy
    pub active: bool,
    /// Any network accepts deposits
    pub deposit: bool,
    /// Any network allows withdrawals
    pub withdraw: bool,
    /// Scale of the smallest tradable unit
    pub precision: Option<DecimalScale>,
    /// Withdrawal fee of the primary network
    pub fee: Option<Decimal>,
    /// Withdrawal fee by network
    pub fees: HashMap<String, Decimal>,
    pub networks: HashMap<String, CurrencyNetwork>,
    pub info: serde_json::Value,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_for_uses_ids_verbatim() {
        assert_eq!(Market::symbol_for("BTC", "USDT"), "BTC/USDT");
        assert_eq!(Market::symbol_for("1000SHIB", "BUSD"), "1000SHIB/BUSD");
    }

    #[test]
    fn test_split_symbol() {
        assert_eq!(Market::split_symbol("ETH/BTC").unwrap(), ("ETH", "BTC"));
        assert!(Market::split_symbol("ETHBTC").is_err());
        assert!(Market::split_symbol("/BTC").is_err());
    }
}
