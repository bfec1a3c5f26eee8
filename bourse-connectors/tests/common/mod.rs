//! Fixtures shared by the Binance adapter tests.

#![allow(dead_code)]

use bourse_connectors::{Binance, BinanceConfig, OptionOverrides};
use bourse_exchange::{HttpMethod, StubTransport};
use serde_json::{json, Value};
use std::sync::Arc;

pub const EXCHANGE_INFO: &str = "/api/v3/exchangeInfo";
pub const FUTURES_EXCHANGE_INFO: &str = "/fapi/v1/exchangeInfo";
pub const DELIVERY_EXCHANGE_INFO: &str = "/dapi/v1/exchangeInfo";
pub const CAPITAL_CONFIG: &str = "/sapi/v1/capital/config/getall";

/// Adapter without credentials over `stub`.
pub fn public_adapter(stub: &Arc<StubTransport>) -> Binance {
    Binance::with_transport(BinanceConfig::public(), stub.clone())
}

/// Adapter with credentials over `stub`.
pub fn private_adapter(stub: &Arc<StubTransport>) -> Binance {
    Binance::with_transport(BinanceConfig::with_credentials("test-key", "test-secret"), stub.clone())
}

/// Adapter with credentials and adapter-wide overrides.
pub fn adapter_with_options(stub: &Arc<StubTransport>, options: OptionOverrides) -> Binance {
    let config = BinanceConfig::with_credentials("test-key", "test-secret").options(options);
    Binance::with_transport(config, stub.clone())
}

/// Register the spot listing and the currency list.
pub fn register_listing(stub: &StubTransport) {
    stub.respond_json(HttpMethod::Get, EXCHANGE_INFO, spot_exchange_info());
    stub.respond_json(HttpMethod::Get, CAPITAL_CONFIG, currencies());
}

pub fn spot_exchange_info() -> Value {
    json!({
        "timezone": "UTC",
        "serverTime": 1700000000000i64,
        "symbols": [
            {
                "symbol": "ETHBTC",
                "status": "TRADING",
                "baseAsset": "ETH",
                "baseAssetPrecision": 8,
                "quoteAsset": "BTC",
                "quotePrecision": 8,
                "quoteAssetPrecision": 8,
                "isMarginTradingAllowed": true,
                "filters": [
                    {"filterType": "PRICE_FILTER", "minPrice": "0.00000100", "maxPrice": "922327.00000000", "tickSize": "0.00000100"},
                    {"filterType": "LOT_SIZE", "minQty": "0.00010000", "maxQty": "100000.00000000", "stepSize": "0.00010000"},
                    {"filterType": "NOTIONAL", "minNotional": "0.00010000", "maxNotional": "9000000.00000000"}
                ]
            },
            {
                "symbol": "BNBUSDT",
                "status": "TRADING",
                "baseAsset": "BNB",
                "baseAssetPrecision": 8,
                "quoteAsset": "USDT",
                "quotePrecision": 8,
                "quoteAssetPrecision": 8,
                "isMarginTradingAllowed": true,
                "filters": [
                    {"filterType": "PRICE_FILTER", "minPrice": "0.10000000", "maxPrice": "100000.00000000", "tickSize": "0.10000000"},
                    {"filterType": "LOT_SIZE", "minQty": "0.00100000", "maxQty": "900000.00000000", "stepSize": "0.00100000"}
                ]
            },
            {
                "symbol": "BTCUSDT",
                "status": "BREAK",
                "baseAsset": "BTC",
                "quoteAsset": "USDT",
                "filters": []
            }
        ]
    })
}

pub fn futures_exchange_info() -> Value {
    json!({
        "serverTime": 1700000000000i64,
        "symbols": [
            {
                "symbol": "BTCUSDT",
                "status": "TRADING",
                "baseAsset": "BTC",
                "quoteAsset": "USDT",
                "marginAsset": "USDT",
                "pricePrecision": 2,
                "quantityPrecision": 3,
                "filters": [
                    {"filterType": "PRICE_FILTER", "minPrice": "556.80", "maxPrice": "4529764", "tickSize": "0.10"},
                    {"filterType": "LOT_SIZE", "minQty": "0.001", "maxQty": "1000", "stepSize": "0.001"},
                    {"filterType": "MIN_NOTIONAL", "notional": "100"}
                ]
            }
        ]
    })
}

/// Coin-margined perpetual, 100 USD per contract.
pub fn delivery_exchange_info() -> Value {
    json!({
        "serverTime": 1700000000000i64,
        "symbols": [
            {
                "symbol": "BTCUSD_PERP",
                "pair": "BTCUSD",
                "contractType": "PERPETUAL",
                "contractStatus": "TRADING",
                "contractSize": 100,
                "baseAsset": "BTC",
                "quoteAsset": "USD",
                "marginAsset": "BTC",
                "pricePrecision": 1,
                "filters": [
                    {"filterType": "PRICE_FILTER", "minPrice": "1000", "maxPrice": "4520958", "tickSize": "0.1"},
                    {"filterType": "LOT_SIZE", "minQty": "1", "maxQty": "1000000", "stepSize": "1"}
                ]
            }
        ]
    })
}

pub fn currencies() -> Value {
    json!([
        {
            "coin": "ETH",
            "name": "Ethereum",
            "depositAllEnable": true,
            "withdrawAllEnable": true,
            "networkList": [
                {"network": "ETH", "name": "Ethereum (ERC20)", "order": 1, "depositEnable": true, "withdrawEnable": true, "withdrawFee": "0.0012", "withdrawMin": "0.0024", "withdrawMax": "10000", "withdrawIntegerMultiple": "0.0001"},
                {"network": "BSC", "name": "BNB Smart Chain (BEP20)", "order": 2, "depositEnable": true, "withdrawEnable": true, "withdrawFee": "0.000029", "withdrawIntegerMultiple": "0.0001"}
            ]
        },
        {
            "coin": "BTC",
            "name": "Bitcoin",
            "networkList": [
                {"network": "BTC", "order": 0, "depositEnable": true, "withdrawEnable": true, "withdrawFee": "0.0002", "withdrawIntegerMultiple": "0.000001"}
            ]
        },
        {
            "coin": "BNB",
            "name": "BNB",
            "networkList": [
                {"network": "BSC", "depositEnable": true, "withdrawEnable": true, "withdrawFee": "0.0005", "withdrawIntegerMultiple": "0.00000001"}
            ]
        },
        {
            "coin": "USDT",
            "name": "TetherUS",
            "networkList": [
                {"network": "TRX", "order": 3, "depositEnable": false, "withdrawEnable": false, "withdrawFee": "1", "withdrawIntegerMultiple": "0.000001"},
                {"network": "ETH", "order": 1, "depositEnable": false, "withdrawEnable": true, "withdrawFee": "4.5", "withdrawIntegerMultiple": "0.000001"}
            ]
        }
    ])
}
