//! Exchange client port definitions.
//!
//! `Transport` is the HTTP seam: adapters build a `SignedRequest`, the
//! transport executes it and hands back the raw response. `Exchange` is
//! the unified interface every adapter implements.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use strum::{AsRefStr, Display};

use bourse_domain::{
    Balances, Currency, DepositAddress, FundingFees, Market, Ohlcv, Order, OrderBook, OrderSide,
    OrderType, Position, Ticker, Timeframe, Trade, TradingFee, Transaction, Transfer,
};

use crate::cache::MarketSnapshot;
use crate::error::ExchangeResult;

// =============================================================================
// Transport Port
// =============================================================================

/// HTTP method of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

/// A fully built request, ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    /// Absolute URL including any query string
    pub url: String,
    pub method: HttpMethod,
    /// Form-encoded body for non-GET private calls
    pub body: Option<String>,
    pub headers: Vec<(String, String)>,
}

impl SignedRequest {
    /// URL path without host or query.
    pub fn path(&self) -> &str {
        let without_query = self.url.split('?').next().unwrap_or_default();
        match without_query.find("://") {
            Some(scheme_end) => {
                let rest = &without_query[scheme_end + 3..];
                rest.find('/').map(|i| &rest[i..]).unwrap_or("/")
            },
            None => without_query,
        }
    }

    /// Query string, if any.
    pub fn query(&self) -> Option<&str> {
        self.url.split_once('?').map(|(_, query)| query)
    }

    /// Value of a request parameter, looked up in the query then the body.
    pub fn param(&self, name: &str) -> Option<String> {
        [self.query(), self.body.as_deref()]
            .into_iter()
            .flatten()
            .filter_map(|encoded| serde_urlencoded::from_str::<Vec<(String, String)>>(encoded).ok())
            .flatten()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Value of a header (case-insensitive name).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Raw HTTP response handed back to the adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// Canonical reason phrase (`Bad Request`)
    pub reason: String,
    pub body: String,
}

/// Port for executing HTTP requests.
///
/// Implementations:
/// - `ReqwestTransport` - Real HTTP with a per-request timeout
/// - `StubTransport` - Canned responses for tests
///
/// Transports only move bytes. Non-2xx statuses are returned as responses,
/// not errors, so the adapter can classify them.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute a request.
    ///
    /// # Errors
    /// `Network` on connection failures, `RequestTimeout` when the deadline
    /// passes.
    async fn execute(&self, request: SignedRequest) -> ExchangeResult<HttpResponse>;
}

// =============================================================================
// Unified Exchange Port
// =============================================================================

/// Unified exchange interface.
///
/// `Params` carries call-time option overrides plus raw exchange
/// parameters passed through to the request.
#[async_trait]
pub trait Exchange: Send + Sync {
    /// Per-call parameters understood by the adapter.
    type Params: Default + Send + Sync;

    /// Adapter identifier, also the prefix of every error message.
    fn id(&self) -> &'static str;

    /// Load markets and currencies once and cache them.
    ///
    /// With `reload` false a cached snapshot is returned without a request.
    async fn load_markets(&self, reload: bool) -> ExchangeResult<Arc<MarketSnapshot>>;

    async fn fetch_markets(&self, params: &Self::Params) -> ExchangeResult<Vec<Market>>;

    async fn fetch_currencies(
        &self,
        params: &Self::Params,
    ) -> ExchangeResult<HashMap<String, Currency>>;

    async fn fetch_ticker(&self, symbol: &str, params: &Self::Params) -> ExchangeResult<Ticker>;

    async fn fetch_tickers(
        &self,
        symbols: Option<&[String]>,
        params: &Self::Params,
    ) -> ExchangeResult<HashMap<String, Ticker>>;

    async fn fetch_order_book(
        &self,
        symbol: &str,
        limit: Option<u32>,
        params: &Self::Params,
    ) -> ExchangeResult<OrderBook>;

    async fn fetch_ohlcv(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        since: Option<i64>,
        limit: Option<u32>,
        params: &Self::Params,
    ) -> ExchangeResult<Vec<Ohlcv>>;

    async fn fetch_trades(
        &self,
        symbol: &str,
        since: Option<i64>,
        limit: Option<u32>,
        params: &Self::Params,
    ) -> ExchangeResult<Vec<Trade>>;

    async fn fetch_balance(&self, params: &Self::Params) -> ExchangeResult<Balances>;

    async fn create_order(
        &self,
        symbol: &str,
        order_type: OrderType,
        side: OrderSide,
        amount: Decimal,
        price: Option<Decimal>,
        params: &Self::Params,
    ) -> ExchangeResult<Order>;

    async fn cancel_order(
        &self,
        id: &str,
        symbol: Option<&str>,
        params: &Self::Params,
    ) -> ExchangeResult<Order>;

    async fn cancel_all_orders(
        &self,
        symbol: Option<&str>,
        params: &Self::Params,
    ) -> ExchangeResult<Vec<Order>>;

    async fn fetch_order(
        &self,
        id: &str,
        symbol: Option<&str>,
        params: &Self::Params,
    ) -> ExchangeResult<Order>;

    async fn fetch_orders(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<u32>,
        params: &Self::Params,
    ) -> ExchangeResult<Vec<Order>>;

    async fn fetch_open_orders(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<u32>,
        params: &Self::Params,
    ) -> ExchangeResult<Vec<Order>>;

    async fn fetch_closed_orders(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<u32>,
        params: &Self::Params,
    ) -> ExchangeResult<Vec<Order>>;

    async fn fetch_my_trades(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<u32>,
        params: &Self::Params,
    ) -> ExchangeResult<Vec<Trade>>;

    async fn fetch_positions(
        &self,
        symbols: Option<&[String]>,
        params: &Self::Params,
    ) -> ExchangeResult<Vec<Position>>;

    async fn fetch_deposit_address(
        &self,
        code: &str,
        params: &Self::Params,
    ) -> ExchangeResult<DepositAddress>;

    async fn fetch_deposits(
        &self,
        code: Option<&str>,
        since: Option<i64>,
        limit: Option<u32>,
        params: &Self::Params,
    ) -> ExchangeResult<Vec<Transaction>>;

    async fn fetch_withdrawals(
        &self,
        code: Option<&str>,
        since: Option<i64>,
        limit: Option<u32>,
        params: &Self::Params,
    ) -> ExchangeResult<Vec<Transaction>>;

    /// Move funds between the account's own wallets.
    async fn transfer(
        &self,
        code: &str,
        amount: Decimal,
        from_account: &str,
        to_account: &str,
        params: &Self::Params,
    ) -> ExchangeResult<Transfer>;

    async fn fetch_transfers(
        &self,
        code: Option<&str>,
        since: Option<i64>,
        limit: Option<u32>,
        params: &Self::Params,
    ) -> ExchangeResult<Vec<Transfer>>;

    async fn fetch_trading_fee(
        &self,
        symbol: &str,
        params: &Self::Params,
    ) -> ExchangeResult<TradingFee>;

    async fn fetch_trading_fees(
        &self,
        params: &Self::Params,
    ) -> ExchangeResult<HashMap<String, TradingFee>>;

    async fn fetch_funding_fees(
        &self,
        codes: Option<&[String]>,
        params: &Self::Params,
    ) -> ExchangeResult<FundingFees>;
}
