//! Rounding amounts and prices to a market's precision.

use rust_decimal::{Decimal, RoundingStrategy};

use bourse_domain::{DecimalScale, Market};

/// How to drop excess digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundingMode {
    /// Toward zero
    Truncate,
    /// Half away from zero
    Round,
}

/// Round `value` to `scale` decimal places.
pub fn decimal_to_precision(value: Decimal, scale: DecimalScale, mode: RoundingMode) -> Decimal {
    let strategy = match mode {
        RoundingMode::Truncate => RoundingStrategy::ToZero,
        RoundingMode::Round => RoundingStrategy::MidpointAwayFromZero,
    };
    value.round_dp_with_strategy(scale.decimal_places(), strategy)
}

/// Render a decimal for a request parameter, without trailing zeros.
pub fn format_decimal(value: Decimal) -> String {
    value.normalize().to_string()
}

/// Amount truncated to the market's amount precision, as a request string.
///
/// Truncation never sends more than the caller asked for.
pub fn amount_to_precision(market: &Market, amount: Decimal) -> String {
    match market.precision.amount {
        Some(scale) => format_decimal(decimal_to_precision(amount, scale, RoundingMode::Truncate)),
        None => format_decimal(amount),
    }
}

/// Price rounded to the market's price precision, as a request string.
pub fn price_to_precision(market: &Market, price: Decimal) -> String {
    match market.precision.price {
        Some(scale) => format_decimal(decimal_to_precision(price, scale, RoundingMode::Round)),
        None => format_decimal(price),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bourse_domain::{MarketLimits, MarketPrecision, MarketType};
    use rust_decimal_macros::dec;

    fn market(price: u32, amount: u32) -> Market {
        Market {
            id: "ETHBTC".to_string(),
            symbol: "ETH/BTC".to_string(),
            base: "ETH".to_string(),
            quote: "BTC".to_string(),
            base_id: "ETH".to_string(),
            quote_id: "BTC".to_string(),
            settle: None,
            market_type: MarketType::Spot,
            active: true,
            margin: true,
            contract_size: None,
            precision: MarketPrecision {
                price: Some(DecimalScale::new(price)),
                amount: Some(DecimalScale::new(amount)),
                cost: None,
            },
            limits: MarketLimits::default(),
            taker: None,
            maker: None,
            info: serde_json::Value::Null,
        }
    }

    #[test]
    fn test_truncate_and_round() {
        let scale = DecimalScale::new(2);
        assert_eq!(decimal_to_precision(dec!(1.239), scale, RoundingMode::Truncate), dec!(1.23));
        assert_eq!(decimal_to_precision(dec!(1.235), scale, RoundingMode::Round), dec!(1.24));
    }

    #[test]
    fn test_request_strings() {
        let market = market(6, 3);
        assert_eq!(amount_to_precision(&market, dec!(0.12345)), "0.123");
        assert_eq!(price_to_precision(&market, dec!(0.0215005)), "0.021501");
        assert_eq!(amount_to_precision(&market, dec!(2.000)), "2");
    }
}
