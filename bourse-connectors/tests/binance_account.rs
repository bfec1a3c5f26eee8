//! Balances, wallet history and transfers against a stubbed transport.

mod common;

use bourse_connectors::{CallParams, OptionOverrides};
use bourse_domain::{MarketType, OrderSide, TransactionStatus, TransactionType};
use bourse_exchange::{ErrorKind, Exchange, HttpMethod, StubTransport};
use rust_decimal_macros::dec;
use serde_json::json;
use std::sync::Arc;

use common::*;

#[tokio::test]
async fn test_margin_balance_uses_margin_account() {
    let stub = Arc::new(StubTransport::new());
    stub.respond_json(
        HttpMethod::Get,
        "/sapi/v1/margin/account",
        json!({
            "marginLevel": "11.64405625",
            "userAssets": [
                {"asset": "BTC", "borrowed": "0", "free": "0.00499500", "interest": "0", "locked": "0.00100000", "netAsset": "0.00599500"},
                {"asset": "BNB", "borrowed": "201.66666672", "free": "2346.50000000", "interest": "0", "locked": "0", "netAsset": "2144.83333328"}
            ]
        }),
    );
    let exchange = private_adapter(&stub);

    let balances = exchange.fetch_balance(&CallParams::new().with_type(MarketType::Margin)).await.unwrap();

    let btc = balances.get("BTC").unwrap();
    assert_eq!(btc.free, dec!(0.004995));
    assert_eq!(btc.used, dec!(0.001));
    assert_eq!(btc.total, dec!(0.005995));
    assert_eq!(balances.get("BNB").unwrap().total, dec!(2346.5));
    assert!(stub.requests_to("/api/v3/account").is_empty());
}

#[tokio::test]
async fn test_futures_balance_from_default_type() {
    let stub = Arc::new(StubTransport::new());
    stub.respond_json(
        HttpMethod::Get,
        "/fapi/v2/account",
        json!({
            "updateTime": 1700000000000i64,
            "assets": [
                {"asset": "USDT", "walletBalance": "23.72469206", "marginBalance": "23.72469206", "availableBalance": "20.00000000"}
            ]
        }),
    );
    let exchange = adapter_with_options(
        &stub,
        OptionOverrides {
            default_type: Some(MarketType::Future),
            ..Default::default()
        },
    );

    let balances = exchange.fetch_balance(&CallParams::new()).await.unwrap();

    let usdt = balances.get("USDT").unwrap();
    assert_eq!(usdt.free, dec!(20));
    assert_eq!(usdt.total, dec!(23.72469206));
    assert_eq!(usdt.used, dec!(3.72469206));
    assert_eq!(balances.timestamp, Some(1700000000000));
}

#[tokio::test]
async fn test_default_type_selects_futures_listing() {
    let stub = Arc::new(StubTransport::new());
    stub.respond_json(HttpMethod::Get, FUTURES_EXCHANGE_INFO, futures_exchange_info());
    stub.respond_json(HttpMethod::Get, CAPITAL_CONFIG, currencies());
    let exchange = adapter_with_options(
        &stub,
        OptionOverrides {
            default_type: Some(MarketType::Future),
            ..Default::default()
        },
    );

    let snapshot = exchange.load_markets(false).await.unwrap();

    let market = snapshot.market("BTC/USDT").unwrap();
    assert_eq!(market.market_type, MarketType::Future);
    assert_eq!(market.settle.as_deref(), Some("USDT"));
    assert_eq!(market.limits.cost.min, Some(dec!(100)));
    assert!(stub.requests_to(EXCHANGE_INFO).is_empty());
}

#[tokio::test]
async fn test_dust_trades_pick_listed_market() {
    let stub = Arc::new(StubTransport::new());
    register_listing(&stub);
    stub.respond_json(
        HttpMethod::Get,
        "/sapi/v1/asset/dribblet",
        json!({
            "total": 1,
            "userAssetDribblets": [
                {
                    "operateTime": 1615985535000i64,
                    "totalTransferedAmount": "0.00132256",
                    "totalServiceChargeAmount": "0.00002699",
                    "transId": 45178372831i64,
                    "userAssetDribbletDetails": [
                        {"transId": 4359321, "serviceChargeAmount": "0.000009", "amount": "0.0009", "operateTime": 1615985535000i64, "transferedAmount": "0.000441", "fromAsset": "USDT"},
                        {"transId": 4359321, "serviceChargeAmount": "0.00001799", "amount": "0.0009", "operateTime": 1615985535000i64, "transferedAmount": "0.00088156", "fromAsset": "ETH"}
                    ]
                }
            ]
        }),
    );
    let exchange = private_adapter(&stub);

    let trades = exchange.fetch_my_dust_trades(None, None, &CallParams::new()).await.unwrap();
    assert_eq!(trades.len(), 2);

    let usdt = trades.iter().find(|t| t.symbol.as_deref() == Some("BNB/USDT")).unwrap();
    assert_eq!(usdt.side, Some(OrderSide::Buy));
    assert_eq!(usdt.amount, Some(dec!(0.00045)));
    assert_eq!(usdt.cost, Some(dec!(0.0009)));
    assert_eq!(usdt.price, Some(dec!(2)));

    let eth = trades.iter().find(|t| t.symbol.as_deref() == Some("ETH/BNB")).unwrap();
    assert_eq!(eth.side, Some(OrderSide::Sell));
    assert_eq!(eth.amount, Some(dec!(0.0009)));
    assert_eq!(eth.cost, Some(dec!(0.00089955)));
    let fee = eth.fee.as_ref().unwrap();
    assert_eq!(fee.currency, "BNB");
    assert_eq!(fee.cost, dec!(0.00001799));
}

#[tokio::test]
async fn test_deposits_and_withdrawals() {
    let stub = Arc::new(StubTransport::new());
    register_listing(&stub);
    stub.respond_json(
        HttpMethod::Get,
        "/sapi/v1/capital/deposit/hisrec",
        json!([
            {"id": "769800519366885376", "amount": "0.001", "coin": "BTC", "network": "BTC", "status": 1, "address": "1HPn8Rx2y6nNSfagQBKy27GB99Vbzg89wv", "addressTag": "", "txId": "98f3a9d1ee6c8c8b4e4e0ff9f1d7c0c1b9e6e3a5c7d9f6c8b1f2a4e6d8c0b2a4", "insertTime": 1661493146000i64, "transferType": 0}
        ]),
    );
    stub.respond_json(
        HttpMethod::Get,
        "/sapi/v1/capital/withdraw/history",
        json!([
            {"id": "b6ae22b3aa844210a7041aee7589627c", "amount": "8.91000000", "transactionFee": "0.004", "coin": "USDT", "status": 6, "address": "0x94df8b352de7f46f64b01d3666bf6e936e44ce60", "txId": "0xb5ef8c13b968a406cc62a93a8bd80f9e9a906ef1b3fcf20a2e48573c17659268", "applyTime": "2019-10-12 11:12:02", "network": "ETH"}
        ]),
    );
    let exchange = private_adapter(&stub);

    let deposits = exchange.fetch_deposits(Some("BTC"), None, None, &CallParams::new()).await.unwrap();
    assert_eq!(deposits.len(), 1);
    assert_eq!(deposits[0].transaction_type, TransactionType::Deposit);
    assert_eq!(deposits[0].status, Some(TransactionStatus::Ok));
    assert_eq!(deposits[0].tag, None);
    assert_eq!(stub.last_request().unwrap().param("coin").as_deref(), Some("BTC"));

    let withdrawals = exchange.fetch_withdrawals(None, None, None, &CallParams::new()).await.unwrap();
    let withdrawal = &withdrawals[0];
    assert_eq!(withdrawal.transaction_type, TransactionType::Withdrawal);
    assert_eq!(withdrawal.status, Some(TransactionStatus::Ok));
    assert_eq!(withdrawal.timestamp, Some(1570878722000));
    assert_eq!(withdrawal.fee.as_ref().unwrap().cost, dec!(0.004));
}

#[tokio::test]
async fn test_deposit_address_is_validated() {
    let stub = Arc::new(StubTransport::new());
    register_listing(&stub);
    stub.respond_json(
        HttpMethod::Get,
        "/sapi/v1/capital/deposit/address",
        json!({"address": "0x6915f16f8791d0a1cc2bf47c13a6b2a92000504b", "coin": "ETH", "tag": "", "url": "https://etherscan.io/address/0x6915f16f8791d0a1cc2bf47c13a6b2a92000504b"}),
    );
    let exchange = private_adapter(&stub);

    let address = exchange.fetch_deposit_address("ETH", &CallParams::new()).await.unwrap();
    assert_eq!(address.currency, "ETH");
    assert_eq!(address.tag, None);

    stub.respond_json(
        HttpMethod::Get,
        "/sapi/v1/capital/deposit/address",
        json!({"address": "", "coin": "ETH", "tag": ""}),
    );
    let err = exchange.fetch_deposit_address("ETH", &CallParams::new()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidAddress);
}

#[tokio::test]
async fn test_transfer_between_wallets() {
    let stub = Arc::new(StubTransport::new());
    register_listing(&stub);
    stub.respond_json(HttpMethod::Post, "/sapi/v1/asset/transfer", json!({"tranId": 13526853623i64}));
    let exchange = private_adapter(&stub);

    let transfer = exchange
        .transfer("USDT", dec!(10.50), "spot", "future", &CallParams::new())
        .await
        .unwrap();

    assert_eq!(transfer.id.as_deref(), Some("13526853623"));
    assert_eq!(transfer.from_account.as_deref(), Some("spot"));
    assert_eq!(transfer.to_account.as_deref(), Some("future"));

    let request = stub.last_request().unwrap();
    assert_eq!(request.param("type").as_deref(), Some("MAIN_UMFUTURE"));
    assert_eq!(request.param("asset").as_deref(), Some("USDT"));
    assert_eq!(request.param("amount").as_deref(), Some("10.5"));

    let err = exchange
        .transfer("USDT", dec!(1), "spot", "savings", &CallParams::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BadRequest);
}

#[tokio::test]
async fn test_transfer_history() {
    let stub = Arc::new(StubTransport::new());
    register_listing(&stub);
    stub.respond_json(
        HttpMethod::Get,
        "/sapi/v1/asset/transfer",
        json!({
            "total": 2,
            "rows": [
                {"asset": "USDT", "amount": "1", "type": "MAIN_UMFUTURE", "status": "CONFIRMED", "tranId": 11415955596i64, "timestamp": 1544433328000i64},
                {"asset": "USDT", "amount": "2", "type": "MAIN_UMFUTURE", "status": "CONFIRMED", "tranId": 11366865406i64, "timestamp": 1544433325000i64}
            ]
        }),
    );
    let exchange = private_adapter(&stub);

    let transfers = exchange.fetch_transfers(None, None, Some(10), &CallParams::new()).await.unwrap();

    assert_eq!(transfers.len(), 2);
    assert_eq!(transfers[0].timestamp, Some(1544433325000));
    assert_eq!(transfers[1].from_account.as_deref(), Some("spot"));
    assert_eq!(transfers[1].to_account.as_deref(), Some("future"));
    assert_eq!(transfers[1].status, Some(TransactionStatus::Ok));

    let request = stub.last_request().unwrap();
    assert_eq!(request.param("type").as_deref(), Some("MAIN_UMFUTURE"));
    assert_eq!(request.param("size").as_deref(), Some("10"));

    stub.respond_json(HttpMethod::Get, "/sapi/v1/asset/transfer", json!({"total": 0}));
    assert!(exchange.fetch_transfers(None, None, None, &CallParams::new()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_trading_fees_keyed_by_symbol() {
    let stub = Arc::new(StubTransport::new());
    register_listing(&stub);
    stub.respond_json(
        HttpMethod::Get,
        "/sapi/v1/asset/tradeFee",
        json!([
            {"symbol": "ETHBTC", "makerCommission": "0.001", "takerCommission": "0.001"},
            {"symbol": "BNBUSDT", "makerCommission": "0.00075", "takerCommission": "0.00075"}
        ]),
    );
    let exchange = private_adapter(&stub);

    let fees = exchange.fetch_trading_fees(&CallParams::new()).await.unwrap();
    assert_eq!(fees.len(), 2);
    assert_eq!(fees["BNB/USDT"].maker, Some(dec!(0.00075)));

    let fee = exchange.fetch_trading_fee("ETH/BTC", &CallParams::new()).await.unwrap();
    assert_eq!(fee.symbol, "ETH/BTC");
    assert_eq!(fee.taker, Some(dec!(0.001)));
    assert_eq!(stub.last_request().unwrap().param("symbol").as_deref(), Some("ETHBTC"));
}
