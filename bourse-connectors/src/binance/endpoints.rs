//! Endpoint descriptors per market type.
//!
//! Every market type maps to one static `EndpointFamily`. Operations pick
//! the family once, through [`resolve_market_type`], and then read the
//! endpoint they need from it.

use bourse_domain::{Market, MarketType};
use bourse_exchange::HttpMethod;

// =============================================================================
// API Classes
// =============================================================================

/// Request class, selecting host and signing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiClass {
    /// Spot public (`/api/v3`)
    Public,
    /// Spot signed (`/api/v3`)
    Private,
    /// Wallet, margin and asset endpoints (`/sapi`)
    Sapi,
    FapiPublic,
    FapiPrivate,
    DapiPublic,
    DapiPrivate,
}

impl ApiClass {
    /// Whether requests must carry credentials.
    pub fn is_private(&self) -> bool {
        matches!(
            self,
            ApiClass::Private | ApiClass::Sapi | ApiClass::FapiPrivate | ApiClass::DapiPrivate
        )
    }

    /// Host for this class.
    pub fn base_url(&self, sandbox: bool) -> &'static str {
        match (self, sandbox) {
            (ApiClass::Public | ApiClass::Private | ApiClass::Sapi, false) => "https://api.binance.com",
            (ApiClass::Public | ApiClass::Private | ApiClass::Sapi, true) => "https://testnet.binance.vision",
            (ApiClass::FapiPublic | ApiClass::FapiPrivate, false) => "https://fapi.binance.com",
            (ApiClass::DapiPublic | ApiClass::DapiPrivate, false) => "https://dapi.binance.com",
            (_, true) => "https://testnet.binancefuture.com",
        }
    }
}

/// One REST endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub api: ApiClass,
    pub method: HttpMethod,
    pub path: &'static str,
}

const fn get(api: ApiClass, path: &'static str) -> Endpoint {
    Endpoint { api, method: HttpMethod::Get, path }
}

const fn post(api: ApiClass, path: &'static str) -> Endpoint {
    Endpoint { api, method: HttpMethod::Post, path }
}

const fn delete(api: ApiClass, path: &'static str) -> Endpoint {
    Endpoint { api, method: HttpMethod::Delete, path }
}

// =============================================================================
// Families
// =============================================================================

/// The endpoints of one market type.
#[derive(Debug, PartialEq, Eq)]
pub struct EndpointFamily {
    pub market_type: MarketType,
    pub exchange_info: Endpoint,
    pub depth: Endpoint,
    pub ticker_24hr: Endpoint,
    pub klines: Endpoint,
    pub agg_trades: Endpoint,
    pub trades: Endpoint,
    pub server_time: Endpoint,
    pub my_trades: Endpoint,
    pub create_order: Endpoint,
    pub query_order: Endpoint,
    pub cancel_order: Endpoint,
    pub all_orders: Endpoint,
    pub open_orders: Endpoint,
    pub cancel_all_orders: Endpoint,
    pub account: Endpoint,
    /// Futures only
    pub position_risk: Option<Endpoint>,
}

pub static SPOT: EndpointFamily = EndpointFamily {
    market_type: MarketType::Spot,
    exchange_info: get(ApiClass::Public, "/api/v3/exchangeInfo"),
    depth: get(ApiClass::Public, "/api/v3/depth"),
    ticker_24hr: get(ApiClass::Public, "/api/v3/ticker/24hr"),
    klines: get(ApiClass::Public, "/api/v3/klines"),
    agg_trades: get(ApiClass::Public, "/api/v3/aggTrades"),
    trades: get(ApiClass::Public, "/api/v3/trades"),
    server_time: get(ApiClass::Public, "/api/v3/time"),
    my_trades: get(ApiClass::Private, "/api/v3/myTrades"),
    create_order: post(ApiClass::Private, "/api/v3/order"),
    query_order: get(ApiClass::Private, "/api/v3/order"),
    cancel_order: delete(ApiClass::Private, "/api/v3/order"),
    all_orders: get(ApiClass::Private, "/api/v3/allOrders"),
    open_orders: get(ApiClass::Private, "/api/v3/openOrders"),
    cancel_all_orders: delete(ApiClass::Private, "/api/v3/openOrders"),
    account: get(ApiClass::Private, "/api/v3/account"),
    position_risk: None,
};

/// Margin trades spot pairs: public data comes from the spot endpoints.
pub static MARGIN: EndpointFamily = EndpointFamily {
    market_type: MarketType::Margin,
    exchange_info: get(ApiClass::Public, "/api/v3/exchangeInfo"),
    depth: get(ApiClass::Public, "/api/v3/depth"),
    ticker_24hr: get(ApiClass::Public, "/api/v3/ticker/24hr"),
    klines: get(ApiClass::Public, "/api/v3/klines"),
    agg_trades: get(ApiClass::Public, "/api/v3/aggTrades"),
    trades: get(ApiClass::Public, "/api/v3/trades"),
    server_time: get(ApiClass::Public, "/api/v3/time"),
    my_trades: get(ApiClass::Sapi, "/sapi/v1/margin/myTrades"),
    create_order: post(ApiClass::Sapi, "/sapi/v1/margin/order"),
    query_order: get(ApiClass::Sapi, "/sapi/v1/margin/order"),
    cancel_order: delete(ApiClass::Sapi, "/sapi/v1/margin/order"),
    all_orders: get(ApiClass::Sapi, "/sapi/v1/margin/allOrders"),
    open_orders: get(ApiClass::Sapi, "/sapi/v1/margin/openOrders"),
    cancel_all_orders: delete(ApiClass::Sapi, "/sapi/v1/margin/openOrders"),
    account: get(ApiClass::Sapi, "/sapi/v1/margin/account"),
    position_risk: None,
};

pub static FUTURE: EndpointFamily = EndpointFamily {
    market_type: MarketType::Future,
    exchange_info: get(ApiClass::FapiPublic, "/fapi/v1/exchangeInfo"),
    depth: get(ApiClass::FapiPublic, "/fapi/v1/depth"),
    ticker_24hr: get(ApiClass::FapiPublic, "/fapi/v1/ticker/24hr"),
    klines: get(ApiClass::FapiPublic, "/fapi/v1/klines"),
    agg_trades: get(ApiClass::FapiPublic, "/fapi/v1/aggTrades"),
    trades: get(ApiClass::FapiPublic, "/fapi/v1/trades"),
    server_time: get(ApiClass::FapiPublic, "/fapi/v1/time"),
    my_trades: get(ApiClass::FapiPrivate, "/fapi/v1/userTrades"),
    create_order: post(ApiClass::FapiPrivate, "/fapi/v1/order"),
    query_order: get(ApiClass::FapiPrivate, "/fapi/v1/order"),
    cancel_order: delete(ApiClass::FapiPrivate, "/fapi/v1/order"),
    all_orders: get(ApiClass::FapiPrivate, "/fapi/v1/allOrders"),
    open_orders: get(ApiClass::FapiPrivate, "/fapi/v1/openOrders"),
    cancel_all_orders: delete(ApiClass::FapiPrivate, "/fapi/v1/allOpenOrders"),
    account: get(ApiClass::FapiPrivate, "/fapi/v2/account"),
    position_risk: Some(get(ApiClass::FapiPrivate, "/fapi/v2/positionRisk")),
};

pub static DELIVERY: EndpointFamily = EndpointFamily {
    market_type: MarketType::Delivery,
    exchange_info: get(ApiClass::DapiPublic, "/dapi/v1/exchangeInfo"),
    depth: get(ApiClass::DapiPublic, "/dapi/v1/depth"),
    ticker_24hr: get(ApiClass::DapiPublic, "/dapi/v1/ticker/24hr"),
    klines: get(ApiClass::DapiPublic, "/dapi/v1/klines"),
    agg_trades: get(ApiClass::DapiPublic, "/dapi/v1/aggTrades"),
    trades: get(ApiClass::DapiPublic, "/dapi/v1/trades"),
    server_time: get(ApiClass::DapiPublic, "/dapi/v1/time"),
    my_trades: get(ApiClass::DapiPrivate, "/dapi/v1/userTrades"),
    create_order: post(ApiClass::DapiPrivate, "/dapi/v1/order"),
    query_order: get(ApiClass::DapiPrivate, "/dapi/v1/order"),
    cancel_order: delete(ApiClass::DapiPrivate, "/dapi/v1/order"),
    all_orders: get(ApiClass::DapiPrivate, "/dapi/v1/allOrders"),
    open_orders: get(ApiClass::DapiPrivate, "/dapi/v1/openOrders"),
    cancel_all_orders: delete(ApiClass::DapiPrivate, "/dapi/v1/allOpenOrders"),
    account: get(ApiClass::DapiPrivate, "/dapi/v1/account"),
    position_risk: Some(get(ApiClass::DapiPrivate, "/dapi/v1/positionRisk")),
};

/// Endpoint family of a market type.
pub fn family(market_type: MarketType) -> &'static EndpointFamily {
    match market_type {
        MarketType::Spot => &SPOT,
        MarketType::Margin => &MARGIN,
        MarketType::Future => &FUTURE,
        MarketType::Delivery => &DELIVERY,
    }
}

/// Pick the market type of a call.
///
/// The explicit call-time type wins, then the market's own type, then the
/// adapter default.
pub fn resolve_market_type(
    call: Option<MarketType>,
    market: Option<&Market>,
    default: MarketType,
) -> MarketType {
    call.or_else(|| market.map(|m| m.market_type)).unwrap_or(default)
}

// =============================================================================
// Wallet Endpoints
// =============================================================================

pub const PING: Endpoint = get(ApiClass::Public, "/api/v3/ping");
pub const CAPITAL_CONFIG: Endpoint = get(ApiClass::Sapi, "/sapi/v1/capital/config/getall");
pub const DEPOSIT_ADDRESS: Endpoint = get(ApiClass::Sapi, "/sapi/v1/capital/deposit/address");
pub const DEPOSIT_HISTORY: Endpoint = get(ApiClass::Sapi, "/sapi/v1/capital/deposit/hisrec");
pub const WITHDRAW_HISTORY: Endpoint = get(ApiClass::Sapi, "/sapi/v1/capital/withdraw/history");
pub const ASSET_TRANSFER: Endpoint = post(ApiClass::Sapi, "/sapi/v1/asset/transfer");
pub const ASSET_TRANSFER_HISTORY: Endpoint = get(ApiClass::Sapi, "/sapi/v1/asset/transfer");
pub const TRADE_FEE: Endpoint = get(ApiClass::Sapi, "/sapi/v1/asset/tradeFee");
pub const DUST_LOG: Endpoint = get(ApiClass::Sapi, "/sapi/v1/asset/dribblet");

#[cfg(test)]
mod tests {
    use super::*;
    use bourse_domain::{MarketLimits, MarketPrecision};

    fn market(market_type: MarketType) -> Market {
        Market {
            id: "BTCUSDT".to_string(),
            symbol: "BTC/USDT".to_string(),
            base: "BTC".to_string(),
            quote: "USDT".to_string(),
            base_id: "BTC".to_string(),
            quote_id: "USDT".to_string(),
            settle: None,
            market_type,
            active: true,
            margin: false,
            contract_size: None,
            precision: MarketPrecision::default(),
            limits: MarketLimits::default(),
            taker: None,
            maker: None,
            info: serde_json::Value::Null,
        }
    }

    #[test]
    fn test_resolution_order() {
        let future = market(MarketType::Future);

        assert_eq!(
            resolve_market_type(Some(MarketType::Margin), Some(&future), MarketType::Spot),
            MarketType::Margin
        );
        assert_eq!(resolve_market_type(None, Some(&future), MarketType::Spot), MarketType::Future);
        assert_eq!(resolve_market_type(None, None, MarketType::Delivery), MarketType::Delivery);
    }

    #[test]
    fn test_family_paths() {
        assert_eq!(family(MarketType::Spot).cancel_all_orders.path, "/api/v3/openOrders");
        assert_eq!(family(MarketType::Future).cancel_all_orders.path, "/fapi/v1/allOpenOrders");
        assert_eq!(family(MarketType::Delivery).account.path, "/dapi/v1/account");
        assert_eq!(family(MarketType::Margin).depth, SPOT.depth);
        assert_eq!(family(MarketType::Margin).account.api, ApiClass::Sapi);
        assert!(family(MarketType::Spot).position_risk.is_none());
    }

    #[test]
    fn test_api_class_hosts() {
        assert!(ApiClass::Sapi.is_private());
        assert!(!ApiClass::FapiPublic.is_private());
        assert_eq!(ApiClass::FapiPrivate.base_url(false), "https://fapi.binance.com");
        assert_eq!(ApiClass::DapiPublic.base_url(true), "https://testnet.binancefuture.com");
        assert_eq!(ApiClass::Public.base_url(true), "https://testnet.binance.vision");
    }
}
