//! Market listing and public data against a stubbed transport.

mod common;

use bourse_connectors::{CallParams, CurrencyActivePolicy, FetchTradesMethod, OptionOverrides};
use bourse_domain::{DecimalScale, MarketType, OrderSide, Timeframe};
use bourse_exchange::{ErrorKind, Exchange, HttpMethod, StubTransport};
use rust_decimal_macros::dec;
use serde_json::json;
use std::sync::Arc;

use common::*;

#[tokio::test]
async fn test_markets_use_currency_precision() {
    let stub = Arc::new(StubTransport::new());
    register_listing(&stub);
    let exchange = private_adapter(&stub);

    let snapshot = exchange.load_markets(false).await.unwrap();

    let market = snapshot.market("ETH/BTC").unwrap();
    assert_eq!(market.id, "ETHBTC");
    assert_eq!(market.symbol, format!("{}/{}", market.base_id, market.quote_id));
    assert_eq!(market.precision.amount, Some(DecimalScale::new(4)));
    assert_eq!(market.precision.price, Some(DecimalScale::new(6)));
    assert_eq!(market.precision.cost, Some(DecimalScale::new(6)));
    assert_eq!(market.limits.amount.min, Some(dec!(0.0001)));
    assert_eq!(market.limits.cost.max, Some(dec!(9000000)));
    assert!(market.active);
    assert!(market.margin);

    assert!(!snapshot.market("BTC/USDT").unwrap().active);
    assert_eq!(snapshot.market_by_id("BNBUSDT").unwrap().symbol, "BNB/USDT");
}

#[tokio::test]
async fn test_markets_are_loaded_once() -> anyhow::Result<()> {
    let stub = Arc::new(StubTransport::new());
    register_listing(&stub);
    let exchange = private_adapter(&stub);

    let first = exchange.load_markets(false).await?;
    let second = exchange.load_markets(false).await?;
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(stub.requests_to(EXCHANGE_INFO).len(), 1);
    assert_eq!(stub.requests_to(CAPITAL_CONFIG).len(), 1);

    exchange.load_markets(true).await?;
    assert_eq!(stub.requests_to(EXCHANGE_INFO).len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_public_listing_skips_currencies() {
    let stub = Arc::new(StubTransport::new());
    register_listing(&stub);
    let exchange = public_adapter(&stub);

    let markets = exchange.fetch_markets(&CallParams::new()).await.unwrap();

    assert_eq!(markets.len(), 3);
    assert!(stub.requests_to(CAPITAL_CONFIG).is_empty());
    // Falls back to the filter steps
    let eth_btc = markets.iter().find(|m| m.id == "ETHBTC").unwrap();
    assert_eq!(eth_btc.precision.amount, Some(DecimalScale::new(4)));
    assert_eq!(eth_btc.precision.price, Some(DecimalScale::new(6)));
}

#[tokio::test]
async fn test_currencies_active_and_primary_fee() {
    let stub = Arc::new(StubTransport::new());
    register_listing(&stub);
    let exchange = private_adapter(&stub);

    let currencies = exchange.fetch_currencies(&CallParams::new()).await.unwrap();

    let usdt = &currencies["USDT"];
    assert!(usdt.active);
    assert!(!usdt.deposit);
    assert!(usdt.withdraw);
    assert_eq!(usdt.fee, Some(dec!(4.5)));
    assert_eq!(usdt.precision.unwrap().decimal_places(), 6);
    assert_eq!(usdt.precision.unwrap().exponent(), -6);

    let strict = CallParams::new().with_overrides(OptionOverrides {
        currency_active_policy: Some(CurrencyActivePolicy::AllEnabled),
        ..Default::default()
    });
    let currencies = exchange.fetch_currencies(&strict).await.unwrap();
    assert!(!currencies["USDT"].active);
    assert!(currencies["ETH"].active);
}

#[tokio::test]
async fn test_funding_fees_from_currency_list() {
    let stub = Arc::new(StubTransport::new());
    register_listing(&stub);
    let exchange = private_adapter(&stub);

    let codes = vec!["ETH".to_string()];
    let fees = exchange.fetch_funding_fees(Some(&codes), &CallParams::new()).await.unwrap();

    assert_eq!(fees.withdraw.get("ETH"), Some(&dec!(0.0012)));
    assert_eq!(fees.withdraw_by_network["ETH"].get("BSC"), Some(&dec!(0.000029)));
    assert!(!fees.withdraw.contains_key("BTC"));
}

#[tokio::test]
async fn test_unknown_symbol_is_bad_symbol() {
    let stub = Arc::new(StubTransport::new());
    register_listing(&stub);
    let exchange = public_adapter(&stub);

    let err = exchange.fetch_ticker("DOGE/BTC", &CallParams::new()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BadSymbol);
}

#[tokio::test]
async fn test_ticker_last_is_close() {
    let stub = Arc::new(StubTransport::new());
    register_listing(&stub);
    stub.respond_json(
        HttpMethod::Get,
        "/api/v3/ticker/24hr",
        json!({
            "symbol": "BNBUSDT",
            "priceChange": "-94.99999800",
            "priceChangePercent": "-95.960",
            "weightedAvgPrice": "0.29628482",
            "prevClosePrice": "0.10002000",
            "lastPrice": "4.00000200",
            "bidPrice": "4.00000000",
            "bidQty": "100.00000000",
            "askPrice": "4.00000200",
            "askQty": "100.00000000",
            "openPrice": "99.00000000",
            "highPrice": "100.00000000",
            "lowPrice": "0.10000000",
            "volume": "8913.30000000",
            "quoteVolume": "15.30000000",
            "openTime": 1499783499040i64,
            "closeTime": 1499869899040i64
        }),
    );
    let exchange = public_adapter(&stub);

    let ticker = exchange.fetch_ticker("BNB/USDT", &CallParams::new()).await.unwrap();

    assert_eq!(ticker.symbol, "BNB/USDT");
    assert_eq!(ticker.last, Some(dec!(4.000002)));
    assert_eq!(ticker.close, ticker.last);
    assert_eq!(ticker.percentage, Some(dec!(-95.960)));
    assert_eq!(ticker.base_volume, Some(dec!(8913.3)));
    assert_eq!(ticker.datetime.as_deref(), Some("2017-07-12T14:31:39.040Z"));
    assert_eq!(stub.last_request().unwrap().param("symbol").as_deref(), Some("BNBUSDT"));
}

#[tokio::test]
async fn test_tickers_filtered_by_symbols() {
    let stub = Arc::new(StubTransport::new());
    register_listing(&stub);
    stub.respond_json(
        HttpMethod::Get,
        "/api/v3/ticker/24hr",
        json!([
            {"symbol": "ETHBTC", "lastPrice": "0.05"},
            {"symbol": "BNBUSDT", "lastPrice": "300.1"},
            {"symbol": "NEWCOIN", "lastPrice": "1"}
        ]),
    );
    let exchange = public_adapter(&stub);

    let symbols = vec!["ETH/BTC".to_string()];
    let tickers = exchange.fetch_tickers(Some(&symbols), &CallParams::new()).await.unwrap();
    assert_eq!(tickers.len(), 1);
    assert_eq!(tickers["ETH/BTC"].last, Some(dec!(0.05)));

    let all = exchange.fetch_tickers(None, &CallParams::new()).await.unwrap();
    assert_eq!(all.len(), 3);
    assert!(all.contains_key("NEWCOIN"));
}

#[tokio::test]
async fn test_order_book_sorted_on_futures_family() {
    let stub = Arc::new(StubTransport::new());
    stub.respond_json(HttpMethod::Get, FUTURES_EXCHANGE_INFO, futures_exchange_info());
    stub.respond_json(
        HttpMethod::Get,
        "/fapi/v1/depth",
        json!({
            "lastUpdateId": 1027024,
            "E": 1589436922972i64,
            "T": 1589436922959i64,
            "bids": [["4.00000000", "431.00000000"], ["4.10000000", "12.00000000"]],
            "asks": [["4.00000300", "12.00000000"], ["4.00000200", "12.00000000"]]
        }),
    );
    let exchange = public_adapter_of_type(&stub, MarketType::Future);

    let book = exchange.fetch_order_book("BTC/USDT", Some(5), &CallParams::new()).await.unwrap();

    assert_eq!(book.best_bid().unwrap().price, dec!(4.1));
    assert_eq!(book.best_ask().unwrap().price, dec!(4.000002));
    assert_eq!(book.timestamp, Some(1589436922959));
    assert_eq!(book.nonce, Some(1027024));

    let request = stub.last_request().unwrap();
    assert_eq!(request.path(), "/fapi/v1/depth");
    assert_eq!(request.param("limit").as_deref(), Some("5"));
    assert!(stub.requests_to(EXCHANGE_INFO).is_empty());
}

fn public_adapter_of_type(stub: &Arc<StubTransport>, market_type: MarketType) -> bourse_connectors::Binance {
    let config = bourse_connectors::BinanceConfig::public().options(OptionOverrides {
        default_type: Some(market_type),
        ..Default::default()
    });
    bourse_connectors::Binance::with_transport(config, stub.clone())
}

#[tokio::test]
async fn test_ohlcv_rows_in_milliseconds() {
    let stub = Arc::new(StubTransport::new());
    register_listing(&stub);
    stub.respond_json(
        HttpMethod::Get,
        "/api/v3/klines",
        json!([
            [1499040000, "0.01634790", "0.80000000", "0.01575800", "0.01577100", "148976.11427815", 1499644799999i64, "2434.19055334", 308, "1756.87402397", "28.46694368", "0"],
            [1499043600000i64, "0.01577100", "0.01600000", "0.01570000", "0.01590000", "1000.00000000", 1499047199999i64, "15.9", 12, "500", "7.9", "0"]
        ]),
    );
    let exchange = public_adapter(&stub);

    let candles = exchange
        .fetch_ohlcv("ETH/BTC", Timeframe::Hour1, Some(1499040000000), Some(2), &CallParams::new())
        .await
        .unwrap();

    assert_eq!(candles.len(), 2);
    assert_eq!(candles[0].timestamp, 1499040000000);
    assert_eq!(candles[1].timestamp, 1499043600000);
    let (_, open, high, low, close, volume) = candles[0].as_row();
    assert_eq!((open, high, low, close), (dec!(0.0163479), dec!(0.8), dec!(0.015758), dec!(0.015771)));
    assert_eq!(volume, dec!(148976.11427815));

    let request = stub.last_request().unwrap();
    assert_eq!(request.param("interval").as_deref(), Some("1h"));
    assert_eq!(request.param("startTime").as_deref(), Some("1499040000000"));
}

#[tokio::test]
async fn test_agg_trades_window_and_cost() {
    let stub = Arc::new(StubTransport::new());
    register_listing(&stub);
    stub.respond_json(
        HttpMethod::Get,
        "/api/v3/aggTrades",
        json!([
            {"a": 26129, "p": "0.01633102", "q": "4.70443515", "f": 27781, "l": 27781, "T": 1498793709153i64, "m": true, "M": true},
            {"a": 26130, "p": "0.01633200", "q": "1.00000000", "f": 27782, "l": 27782, "T": 1498793709200i64, "m": false, "M": true}
        ]),
    );
    let exchange = public_adapter(&stub);

    let since = 1498793709000;
    let trades = exchange.fetch_trades("ETH/BTC", Some(since), None, &CallParams::new()).await.unwrap();

    assert_eq!(trades.len(), 2);
    assert_eq!(trades[0].id.as_deref(), Some("26129"));
    assert_eq!(trades[0].side, Some(OrderSide::Sell));
    assert_eq!(trades[1].side, Some(OrderSide::Buy));
    assert_eq!(trades[0].cost, Some(dec!(0.01633102) * dec!(4.70443515)));
    assert_eq!(trades[0].symbol.as_deref(), Some("ETH/BTC"));

    let request = stub.last_request().unwrap();
    assert_eq!(request.param("startTime").as_deref(), Some("1498793709000"));
    assert_eq!(request.param("endTime").as_deref(), Some("1498797309000"));
}

#[tokio::test]
async fn test_raw_trades_method() {
    let stub = Arc::new(StubTransport::new());
    register_listing(&stub);
    stub.respond_json(
        HttpMethod::Get,
        "/api/v3/trades",
        json!([
            {"id": 28457, "price": "4.00000100", "qty": "12.00000000", "quoteQty": "48.000012", "time": 1499865549590i64, "isBuyerMaker": true, "isBestMatch": true}
        ]),
    );
    let exchange = public_adapter(&stub);
    let params = CallParams::new().with_overrides(OptionOverrides {
        fetch_trades_method: Some(FetchTradesMethod::Trades),
        ..Default::default()
    });

    let trades = exchange.fetch_trades("BNB/USDT", None, Some(10), &params).await.unwrap();

    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].side, Some(OrderSide::Sell));
    assert_eq!(trades[0].cost, Some(dec!(48.000012)));
    assert!(stub.requests_to("/api/v3/aggTrades").is_empty());
}

#[tokio::test]
async fn test_server_time_and_status() {
    let stub = Arc::new(StubTransport::new());
    stub.respond_json(HttpMethod::Get, "/api/v3/time", json!({"serverTime": 1499827319559i64}));
    stub.respond_json(HttpMethod::Get, "/api/v3/ping", json!({}));
    let exchange = public_adapter(&stub);

    assert_eq!(exchange.fetch_time(&CallParams::new()).await.unwrap(), 1499827319559);
    assert!(exchange.fetch_status(&CallParams::new()).await.unwrap());

    stub.respond(
        HttpMethod::Get,
        "/api/v3/ping",
        503,
        r#"{"code":-1000,"msg":"System is under maintenance."}"#,
    );
    assert!(!exchange.fetch_status(&CallParams::new()).await.unwrap());
}

#[tokio::test]
async fn test_delivery_ticker_volume_in_quote_units() {
    let stub = Arc::new(StubTransport::new());
    stub.respond_json(HttpMethod::Get, DELIVERY_EXCHANGE_INFO, delivery_exchange_info());
    stub.respond_json(
        HttpMethod::Get,
        "/dapi/v1/ticker/24hr",
        json!([{
            "symbol": "BTCUSD_PERP",
            "pair": "BTCUSD",
            "priceChange": "-50.0",
            "priceChangePercent": "-0.100",
            "weightedAvgPrice": "50000.0",
            "lastPrice": "50000.0",
            "openPrice": "50050.0",
            "highPrice": "51000.0",
            "lowPrice": "49000.0",
            "volume": "1000",
            "baseVolume": "2",
            "closeTime": 1700000000000i64
        }]),
    );
    let exchange = public_adapter_of_type(&stub, MarketType::Delivery);

    let ticker = exchange.fetch_ticker("BTC/USD", &CallParams::new()).await.unwrap();

    assert_eq!(ticker.symbol, "BTC/USD");
    assert_eq!(ticker.base_volume, Some(dec!(2)));
    assert_eq!(ticker.quote_volume, Some(dec!(100000)));
}

#[tokio::test]
async fn test_delivery_trade_cost_in_base_units() {
    let stub = Arc::new(StubTransport::new());
    stub.respond_json(HttpMethod::Get, DELIVERY_EXCHANGE_INFO, delivery_exchange_info());
    stub.respond_json(
        HttpMethod::Get,
        "/dapi/v1/aggTrades",
        json!([{"a": 416690, "p": "50000", "q": "10", "f": 1, "l": 3, "T": 1700000000000i64, "m": true}]),
    );
    stub.respond_json(
        HttpMethod::Get,
        "/dapi/v1/trades",
        json!([{"id": 28457, "price": "40000", "qty": "10", "baseQty": "0.025", "time": 1700000000000i64, "isBuyerMaker": false}]),
    );
    let exchange = public_adapter_of_type(&stub, MarketType::Delivery);

    let aggregated = exchange.fetch_trades("BTC/USD", None, None, &CallParams::new()).await.unwrap();
    assert_eq!(aggregated[0].amount, Some(dec!(10)));
    assert_eq!(aggregated[0].cost, Some(dec!(0.02)));

    let params = CallParams::new().with_overrides(OptionOverrides {
        fetch_trades_method: Some(FetchTradesMethod::Trades),
        ..Default::default()
    });
    let raw = exchange.fetch_trades("BTC/USD", None, None, &params).await.unwrap();
    assert_eq!(raw[0].cost, Some(dec!(0.025)));
    assert_eq!(raw[0].side, Some(OrderSide::Buy));
}
