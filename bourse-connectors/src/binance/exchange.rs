//! Unified operations for Binance.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use bourse_domain::{
    Balances, Currency, DepositAddress, FundingFees, Market, MarketType, Ohlcv, Order, OrderBook,
    OrderSide, OrderStatus, OrderType, Position, Ticker, Timeframe, Trade, TradingFee, Transaction,
    TransactionType, Transfer,
};
use bourse_exchange::parse::filter_by_since_limit;
use bourse_exchange::precision::format_decimal;
use bourse_exchange::{
    amount_to_precision, price_to_precision, Exchange, ExchangeError, ExchangeResult, MarketSnapshot,
};

use super::client::{require_symbol, Binance, Query};
use super::config::{CallParams, FetchTradesMethod};
use super::endpoints::{
    family, resolve_market_type, ASSET_TRANSFER, ASSET_TRANSFER_HISTORY, CAPITAL_CONFIG,
    DEPOSIT_ADDRESS, DEPOSIT_HISTORY, TRADE_FEE, WITHDRAW_HISTORY,
};
use super::parse::{self, array};
use super::ID;

/// Window of an `aggTrades` request anchored at `since`.
const AGG_TRADES_WINDOW_MS: i64 = 60 * 60 * 1000;

/// Exchange limit on client order id length.
const CLIENT_ORDER_ID_MAX_LEN: usize = 36;

/// Uuid hex digits always kept in a generated client order id.
const CLIENT_ORDER_ID_MIN_UNIQUE: usize = 24;

fn set(query: &mut Query, key: &str, value: impl ToString) {
    query.insert(key.to_string(), value.to_string());
}

fn set_opt(query: &mut Query, key: &str, value: Option<impl ToString>) {
    if let Some(value) = value {
        set(query, key, value);
    }
}

fn symbol_query(market: &Market) -> Query {
    let mut query = Query::new();
    set(&mut query, "symbol", &market.id);
    query
}

/// Order types each family accepts.
fn supports_order_type(market_type: MarketType, order_type: OrderType) -> bool {
    match market_type {
        MarketType::Spot | MarketType::Margin => matches!(
            order_type,
            OrderType::Limit
                | OrderType::Market
                | OrderType::StopLoss
                | OrderType::StopLossLimit
                | OrderType::TakeProfit
                | OrderType::TakeProfitLimit
                | OrderType::LimitMaker
        ),
        MarketType::Future | MarketType::Delivery => matches!(
            order_type,
            OrderType::Limit
                | OrderType::Market
                | OrderType::Stop
                | OrderType::StopMarket
                | OrderType::TakeProfit
                | OrderType::TakeProfitMarket
                | OrderType::TrailingStopMarket
        ),
    }
}

/// Whether the order type rests on the book at a limit price.
///
/// Futures `STOP` and `TAKE_PROFIT` are limit orders; on spot the same
/// names trigger market orders.
fn requires_price(market_type: MarketType, order_type: OrderType) -> bool {
    match order_type {
        OrderType::Limit | OrderType::StopLossLimit | OrderType::TakeProfitLimit | OrderType::LimitMaker => true,
        OrderType::Stop | OrderType::TakeProfit => market_type.is_contract(),
        _ => false,
    }
}

impl Binance {
    /// Configured prefix followed by a uuid v7.
    ///
    /// Long prefixes are cut so the id keeps its unique part.
    fn client_order_id(&self, params: &CallParams) -> String {
        let options = self.effective_options(params);
        let max_prefix = CLIENT_ORDER_ID_MAX_LEN - CLIENT_ORDER_ID_MIN_UNIQUE;

        let mut id = String::with_capacity(CLIENT_ORDER_ID_MAX_LEN);
        for c in options.client_order_id_prefix.chars() {
            if id.len() + c.len_utf8() > max_prefix {
                break;
            }
            id.push(c);
        }

        let unique = Uuid::now_v7().simple().to_string();
        let keep = (CLIENT_ORDER_ID_MAX_LEN - id.len()).min(unique.len());
        id.push_str(&unique[..keep]);
        id
    }

    /// Exchange id of a currency code, falling back to the code itself.
    async fn currency_id(&self, code: &str) -> ExchangeResult<String> {
        let snapshot = self.snapshot().await?;
        Ok(snapshot
            .currency(code)
            .map(|c| c.id.clone())
            .unwrap_or_else(|| code.to_string()))
    }

    fn default_type(&self, params: &CallParams) -> MarketType {
        params.market_type.unwrap_or(self.effective_options(params).default_type)
    }

    fn parse_orders(
        &self,
        response: &Value,
        market: Option<&Market>,
        snapshot: &MarketSnapshot,
    ) -> ExchangeResult<Vec<Order>> {
        array(response, "orders")?
            .iter()
            .map(|item| parse::parse_order(item, market, snapshot))
            .collect()
    }

    fn parse_trades(
        &self,
        response: &Value,
        market: Option<&Market>,
        snapshot: &MarketSnapshot,
        params: &CallParams,
    ) -> ExchangeResult<Vec<Trade>> {
        let earned = self.effective_options(params).dust_earned_currency;
        array(response, "trades")?
            .iter()
            .map(|item| parse::parse_trade(item, market, snapshot, &earned))
            .collect()
    }

    async fn fetch_transactions(
        &self,
        transaction_type: TransactionType,
        code: Option<&str>,
        since: Option<i64>,
        limit: Option<u32>,
        params: &CallParams,
    ) -> ExchangeResult<Vec<Transaction>> {
        let mut query = Query::new();
        if let Some(code) = code {
            set(&mut query, "coin", self.currency_id(code).await?);
        }
        set_opt(&mut query, "startTime", since);
        set_opt(&mut query, "limit", limit);

        let endpoint = match transaction_type {
            TransactionType::Deposit => DEPOSIT_HISTORY,
            TransactionType::Withdrawal => WITHDRAW_HISTORY,
        };
        let response = self.request(endpoint, query, params).await?;
        let transactions = array(&response, "transactions")?
            .iter()
            .map(|item| parse::parse_transaction(item, transaction_type))
            .collect::<ExchangeResult<Vec<_>>>()?;
        Ok(filter_by_since_limit(transactions, since, limit))
    }
}

#[async_trait]
impl Exchange for Binance {
    type Params = CallParams;

    fn id(&self) -> &'static str {
        ID
    }

    async fn load_markets(&self, reload: bool) -> ExchangeResult<Arc<MarketSnapshot>> {
        let params = CallParams::default();
        self.cache.load_with(reload, || self.load_listing(&params)).await
    }

    async fn fetch_markets(&self, params: &CallParams) -> ExchangeResult<Vec<Market>> {
        let currencies = self.listing_currencies(params).await?;
        self.list_markets(&currencies, params).await
    }

    async fn fetch_currencies(&self, params: &CallParams) -> ExchangeResult<HashMap<String, Currency>> {
        let response = self.request(CAPITAL_CONFIG, Query::new(), params).await?;
        parse::parse_currencies(&response, self.effective_options(params).currency_active_policy)
    }

    // =========================================================================
    // Market Data
    // =========================================================================

    async fn fetch_ticker(&self, symbol: &str, params: &CallParams) -> ExchangeResult<Ticker> {
        let (_, market) = self.market(symbol).await?;
        let market_type = resolve_market_type(params.market_type, Some(market.as_ref()), self.default_type(params));

        let response = self
            .request(family(market_type).ticker_24hr, symbol_query(&market), params)
            .await?;
        // Delivery answers with a one-element list
        let entry = match &response {
            Value::Array(items) => items.first().ok_or_else(|| {
                ExchangeError::BadResponse(format!("{} fetchTicker() returned no ticker for {}", ID, symbol))
            })?,
            other => other,
        };
        parse::parse_ticker(entry, Some(market.as_ref()))
    }

    async fn fetch_tickers(
        &self,
        symbols: Option<&[String]>,
        params: &CallParams,
    ) -> ExchangeResult<HashMap<String, Ticker>> {
        let snapshot = self.snapshot().await?;
        let first = symbols.and_then(|s| s.first()).and_then(|s| snapshot.market(s));
        let market_type = resolve_market_type(
            params.market_type,
            first.map(|m| m.as_ref()),
            self.default_type(params),
        );

        let response = self.request(family(market_type).ticker_24hr, Query::new(), params).await?;
        let mut tickers = HashMap::new();
        for item in array(&response, "tickers")? {
            let market = item
                .get("symbol")
                .and_then(Value::as_str)
                .and_then(|id| snapshot.market_by_id(id));
            let ticker = parse::parse_ticker(item, market.map(|m| m.as_ref()))?;
            if symbols.map_or(true, |s| s.contains(&ticker.symbol)) {
                tickers.insert(ticker.symbol.clone(), ticker);
            }
        }
        Ok(tickers)
    }

    async fn fetch_order_book(
        &self,
        symbol: &str,
        limit: Option<u32>,
        params: &CallParams,
    ) -> ExchangeResult<OrderBook> {
        let (_, market) = self.market(symbol).await?;
        let market_type = resolve_market_type(params.market_type, Some(market.as_ref()), self.default_type(params));

        let mut query = symbol_query(&market);
        set_opt(&mut query, "limit", limit);
        let response = self.request(family(market_type).depth, query, params).await?;
        parse::parse_order_book(&response, &market.symbol)
    }

    async fn fetch_ohlcv(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        since: Option<i64>,
        limit: Option<u32>,
        params: &CallParams,
    ) -> ExchangeResult<Vec<Ohlcv>> {
        let (_, market) = self.market(symbol).await?;
        let market_type = resolve_market_type(params.market_type, Some(market.as_ref()), self.default_type(params));

        let mut query = symbol_query(&market);
        set(&mut query, "interval", timeframe);
        set_opt(&mut query, "startTime", since);
        set_opt(&mut query, "limit", limit);
        let response = self.request(family(market_type).klines, query, params).await?;
        array(&response, "klines")?.iter().map(parse::parse_ohlcv).collect()
    }

    async fn fetch_trades(
        &self,
        symbol: &str,
        since: Option<i64>,
        limit: Option<u32>,
        params: &CallParams,
    ) -> ExchangeResult<Vec<Trade>> {
        let (snapshot, market) = self.market(symbol).await?;
        let market_type = resolve_market_type(params.market_type, Some(market.as_ref()), self.default_type(params));
        let endpoints = family(market_type);

        let mut query = symbol_query(&market);
        set_opt(&mut query, "limit", limit);
        let endpoint = match self.effective_options(params).fetch_trades_method {
            FetchTradesMethod::AggTrades => {
                if let Some(since) = since {
                    set(&mut query, "startTime", since);
                    set(&mut query, "endTime", since.saturating_add(AGG_TRADES_WINDOW_MS));
                }
                endpoints.agg_trades
            },
            FetchTradesMethod::Trades => endpoints.trades,
        };

        let response = self.request(endpoint, query, params).await?;
        let trades = self.parse_trades(&response, Some(market.as_ref()), &snapshot, params)?;
        Ok(filter_by_since_limit(trades, since, limit))
    }

    // =========================================================================
    // Account
    // =========================================================================

    async fn fetch_balance(&self, params: &CallParams) -> ExchangeResult<Balances> {
        let market_type = self.default_type(params);
        let response = self.request(family(market_type).account, Query::new(), params).await?;
        parse::parse_balance(&response, market_type)
    }

    // =========================================================================
    // Trading
    // =========================================================================

    async fn create_order(
        &self,
        symbol: &str,
        order_type: OrderType,
        side: OrderSide,
        amount: Decimal,
        price: Option<Decimal>,
        params: &CallParams,
    ) -> ExchangeResult<Order> {
        let (snapshot, market) = self.market(symbol).await?;
        let market_type = resolve_market_type(params.market_type, Some(market.as_ref()), self.default_type(params));
        let options = self.effective_options(params);

        if !supports_order_type(market_type, order_type) {
            return Err(ExchangeError::InvalidOrder(format!(
                "{} {} is not a valid order type for the {} market {}",
                ID, order_type, market_type, symbol
            )));
        }
        if amount <= Decimal::ZERO {
            return Err(ExchangeError::InvalidOrder(format!(
                "{} createOrder() amount must be positive, got {}",
                ID, amount
            )));
        }

        // The trigger is formatted with the market precision below
        let mut params = params.clone();
        let stop_price = params.extra.remove("stopPrice");

        let mut query = symbol_query(&market);
        set(&mut query, "side", side.as_exchange_str());
        set(&mut query, "type", order_type.as_exchange_str());
        set(&mut query, "quantity", amount_to_precision(&market, amount));

        if requires_price(market_type, order_type) {
            let price = price.ok_or_else(|| {
                ExchangeError::InvalidOrder(format!("{} createOrder() requires a price argument for a {} order", ID, order_type))
            })?;
            set(&mut query, "price", price_to_precision(&market, price));
            if order_type != OrderType::LimitMaker {
                set(&mut query, "timeInForce", "GTC");
            }
        }

        if order_type.requires_stop_price() {
            let stop_price = stop_price
                .as_deref()
                .and_then(bourse_exchange::safe::parse_decimal)
                .ok_or_else(|| {
                    ExchangeError::InvalidOrder(format!("{} createOrder() requires a stopPrice param for a {} order", ID, order_type))
                })?;
            set(&mut query, "stopPrice", price_to_precision(&market, stop_price));
        }

        set(&mut query, "newClientOrderId", self.client_order_id(&params));
        if !market_type.is_contract() {
            let resp_type = match order_type {
                OrderType::Market => options.new_order_resp_type.market,
                _ => options.new_order_resp_type.limit,
            };
            set(&mut query, "newOrderRespType", resp_type);
        }

        let response = self.request(family(market_type).create_order, query, &params).await?;
        let order = parse::parse_order(&response, Some(market.as_ref()), &snapshot)?;
        info!(id = %order.id, symbol = %order.symbol, side = %side, order_type = %order_type, "Order created");
        Ok(order)
    }

    async fn cancel_order(&self, id: &str, symbol: Option<&str>, params: &CallParams) -> ExchangeResult<Order> {
        let symbol = require_symbol(symbol, "cancelOrder")?;
        let (snapshot, market) = self.market(symbol).await?;
        let market_type = resolve_market_type(params.market_type, Some(market.as_ref()), self.default_type(params));

        let mut query = symbol_query(&market);
        set(&mut query, "orderId", id);
        let response = self.request(family(market_type).cancel_order, query, params).await?;
        parse::parse_order(&response, Some(market.as_ref()), &snapshot)
    }

    async fn cancel_all_orders(&self, symbol: Option<&str>, params: &CallParams) -> ExchangeResult<Vec<Order>> {
        let symbol = require_symbol(symbol, "cancelAllOrders")?;
        let (snapshot, market) = self.market(symbol).await?;
        let market_type = resolve_market_type(params.market_type, Some(market.as_ref()), self.default_type(params));

        let response = self
            .request(family(market_type).cancel_all_orders, symbol_query(&market), params)
            .await?;
        // Futures acknowledge with a status document instead of the orders
        match response {
            Value::Array(_) => self.parse_orders(&response, Some(market.as_ref()), &snapshot),
            _ => Ok(Vec::new()),
        }
    }

    async fn fetch_order(&self, id: &str, symbol: Option<&str>, params: &CallParams) -> ExchangeResult<Order> {
        let symbol = require_symbol(symbol, "fetchOrder")?;
        let (snapshot, market) = self.market(symbol).await?;
        let market_type = resolve_market_type(params.market_type, Some(market.as_ref()), self.default_type(params));

        let mut query = symbol_query(&market);
        set(&mut query, "orderId", id);
        let response = self.request(family(market_type).query_order, query, params).await?;
        parse::parse_order(&response, Some(market.as_ref()), &snapshot)
    }

    async fn fetch_orders(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<u32>,
        params: &CallParams,
    ) -> ExchangeResult<Vec<Order>> {
        let symbol = require_symbol(symbol, "fetchOrders")?;
        let (snapshot, market) = self.market(symbol).await?;
        let market_type = resolve_market_type(params.market_type, Some(market.as_ref()), self.default_type(params));

        let mut query = symbol_query(&market);
        set_opt(&mut query, "startTime", since);
        set_opt(&mut query, "limit", limit);
        let response = self.request(family(market_type).all_orders, query, params).await?;
        let orders = self.parse_orders(&response, Some(market.as_ref()), &snapshot)?;
        Ok(filter_by_since_limit(orders, since, limit))
    }

    async fn fetch_open_orders(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<u32>,
        params: &CallParams,
    ) -> ExchangeResult<Vec<Order>> {
        if symbol.is_none() && self.effective_options(params).warn_on_fetch_open_orders_without_symbol {
            return Err(ExchangeError::Exchange(format!(
                "{} fetchOpenOrders() without a symbol is rate-limited for the whole account; \
                 set warn_on_fetch_open_orders_without_symbol to false to allow it",
                ID
            )));
        }

        let snapshot = self.snapshot().await?;
        let market = match symbol {
            Some(symbol) => Some(self.market(symbol).await?.1),
            None => None,
        };
        let query = market.as_deref().map(symbol_query).unwrap_or_default();
        let market_type = resolve_market_type(params.market_type, market.as_deref(), self.default_type(params));

        let response = self.request(family(market_type).open_orders, query, params).await?;
        let orders = self.parse_orders(&response, market.as_deref(), &snapshot)?;
        Ok(filter_by_since_limit(orders, since, limit))
    }

    async fn fetch_closed_orders(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<u32>,
        params: &CallParams,
    ) -> ExchangeResult<Vec<Order>> {
        // The limit applies to closed orders, not to the raw history
        let mut orders = self.fetch_orders(symbol, since, None, params).await?;
        orders.retain(|order| order.status == OrderStatus::Closed);
        Ok(filter_by_since_limit(orders, since, limit))
    }

    async fn fetch_my_trades(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<u32>,
        params: &CallParams,
    ) -> ExchangeResult<Vec<Trade>> {
        let symbol = require_symbol(symbol, "fetchMyTrades")?;
        let (snapshot, market) = self.market(symbol).await?;
        let market_type = resolve_market_type(params.market_type, Some(market.as_ref()), self.default_type(params));

        let mut query = symbol_query(&market);
        set_opt(&mut query, "startTime", since);
        set_opt(&mut query, "limit", limit);
        let response = self.request(family(market_type).my_trades, query, params).await?;
        let trades = self.parse_trades(&response, Some(market.as_ref()), &snapshot, params)?;
        Ok(filter_by_since_limit(trades, since, limit))
    }

    async fn fetch_positions(
        &self,
        symbols: Option<&[String]>,
        params: &CallParams,
    ) -> ExchangeResult<Vec<Position>> {
        let snapshot = self.snapshot().await?;
        let first = symbols.and_then(|s| s.first()).and_then(|s| snapshot.market(s));
        let market_type = resolve_market_type(
            params.market_type,
            first.map(|m| m.as_ref()),
            self.default_type(params),
        );

        let endpoint = family(market_type).position_risk.ok_or_else(|| {
            ExchangeError::NotSupported(format!(
                "{} fetchPositions() supports future and delivery markets only, got {}",
                ID, market_type
            ))
        })?;

        let response = self.request(endpoint, Query::new(), params).await?;
        let mut positions = Vec::new();
        for item in array(&response, "positions")? {
            let position = parse::parse_position(item, &snapshot)?;
            if symbols.map_or(true, |s| s.contains(&position.symbol)) {
                positions.push(position);
            }
        }
        Ok(positions)
    }

    // =========================================================================
    // Funding
    // =========================================================================

    async fn fetch_deposit_address(&self, code: &str, params: &CallParams) -> ExchangeResult<DepositAddress> {
        let mut query = Query::new();
        set(&mut query, "coin", self.currency_id(code).await?);
        let response = self.request(DEPOSIT_ADDRESS, query, params).await?;
        parse::parse_deposit_address(&response)
    }

    async fn fetch_deposits(
        &self,
        code: Option<&str>,
        since: Option<i64>,
        limit: Option<u32>,
        params: &CallParams,
    ) -> ExchangeResult<Vec<Transaction>> {
        self.fetch_transactions(TransactionType::Deposit, code, since, limit, params).await
    }

    async fn fetch_withdrawals(
        &self,
        code: Option<&str>,
        since: Option<i64>,
        limit: Option<u32>,
        params: &CallParams,
    ) -> ExchangeResult<Vec<Transaction>> {
        self.fetch_transactions(TransactionType::Withdrawal, code, since, limit, params).await
    }

    async fn transfer(
        &self,
        code: &str,
        amount: Decimal,
        from_account: &str,
        to_account: &str,
        params: &CallParams,
    ) -> ExchangeResult<Transfer> {
        let account = |name: &str| {
            parse::account_type_id(name).ok_or_else(|| {
                ExchangeError::BadRequest(format!("{} transfer() does not support the {} account", ID, name))
            })
        };
        let transfer_type = format!("{}_{}", account(from_account)?, account(to_account)?);

        let mut query = Query::new();
        set(&mut query, "asset", self.currency_id(code).await?);
        set(&mut query, "amount", format_decimal(amount));
        set(&mut query, "type", &transfer_type);
        let response = self.request(ASSET_TRANSFER, query, params).await?;
        debug!(%transfer_type, "Transfer submitted");

        Ok(Transfer {
            id: response.get("tranId").map(|id| match id {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            }),
            timestamp: None,
            datetime: None,
            currency: Some(code.to_string()),
            amount: Some(amount),
            from_account: Some(from_account.to_ascii_lowercase()),
            to_account: Some(to_account.to_ascii_lowercase()),
            status: None,
            info: response,
        })
    }

    async fn fetch_transfers(
        &self,
        code: Option<&str>,
        since: Option<i64>,
        limit: Option<u32>,
        params: &CallParams,
    ) -> ExchangeResult<Vec<Transfer>> {
        let mut query = Query::new();
        set(&mut query, "type", self.effective_options(params).default_transfer_type);
        if let Some(code) = code {
            set(&mut query, "asset", self.currency_id(code).await?);
        }
        set_opt(&mut query, "startTime", since);
        set_opt(&mut query, "size", limit);

        let response = self.request(ASSET_TRANSFER_HISTORY, query, params).await?;
        // No history comes back without `rows`
        let transfers = match response.get("rows") {
            Some(rows) => array(rows, "transfers")?
                .iter()
                .map(parse::parse_transfer)
                .collect::<ExchangeResult<Vec<_>>>()?,
            None => Vec::new(),
        };
        Ok(filter_by_since_limit(transfers, since, limit))
    }

    async fn fetch_trading_fee(&self, symbol: &str, params: &CallParams) -> ExchangeResult<TradingFee> {
        let (snapshot, market) = self.market(symbol).await?;
        let response = self.request(TRADE_FEE, symbol_query(&market), params).await?;
        let entry = array(&response, "trading fees")?.first().ok_or_else(|| {
            ExchangeError::BadResponse(format!("{} fetchTradingFee() returned no fee for {}", ID, symbol))
        })?;
        parse::parse_trading_fee(entry, Some(&snapshot))
    }

    async fn fetch_trading_fees(&self, params: &CallParams) -> ExchangeResult<HashMap<String, TradingFee>> {
        let snapshot = self.snapshot().await?;
        let response = self.request(TRADE_FEE, Query::new(), params).await?;
        let mut fees = HashMap::new();
        for item in array(&response, "trading fees")? {
            let fee = parse::parse_trading_fee(item, Some(&snapshot))?;
            fees.insert(fee.symbol.clone(), fee);
        }
        Ok(fees)
    }

    async fn fetch_funding_fees(
        &self,
        codes: Option<&[String]>,
        params: &CallParams,
    ) -> ExchangeResult<FundingFees> {
        let currencies = self.fetch_currencies(params).await?;
        Ok(parse::funding_fees(&currencies, codes))
    }
}
