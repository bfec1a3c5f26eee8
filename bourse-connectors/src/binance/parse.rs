//! Normalizers from raw Binance payloads to the unified schema.
//!
//! Every normalizer takes the raw `&Value`, decodes the typed model from
//! it and keeps the original document as `info`.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::str::FromStr;

use bourse_domain::{
    iso8601, Balance, Balances, Currency, CurrencyNetwork, DecimalScale, DepositAddress, Fee,
    FundingFees, MarginMode, Market, MarketLimits, MarketPrecision, MarketType, MinMax, Ohlcv,
    Order, OrderBook, OrderSide, OrderStatus, OrderType, Position, PositionSide, TakerOrMaker,
    Ticker, TimeInForce, Trade, TradingFee, Transaction, TransactionStatus, TransactionType,
    Transfer,
};
use bourse_exchange::parse::{book_levels, build_balances, safe_cost, sort_book_side};
use bourse_exchange::safe::{decimal_of, integer_of, safe_currency_code, to_millis};
use bourse_exchange::{ExchangeError, ExchangeResult, MarketSnapshot};

use super::config::CurrencyActivePolicy;
use super::models::{
    RawCoin, RawDepositAddress, RawDepth, RawDustTrade, RawFill, RawFuturesAccount,
    RawMarginAccount, RawOrder, RawPositionRisk, RawSpotAccount, RawSymbol, RawSymbolFilter,
    RawTicker, RawTrade, RawTradeFee, RawTradeRecord, RawTransaction, RawTransfer,
};
use super::ID;

/// Binance asset ids that differ from the unified code.
const CURRENCY_OVERRIDES: &[(&str, &str)] = &[("YOYO", "YOYOW")];

/// Unified code of a Binance asset id.
pub fn currency_code(id: &str) -> String {
    safe_currency_code(id, CURRENCY_OVERRIDES)
}

fn decode<T: DeserializeOwned>(value: &Value, what: &str) -> ExchangeResult<T> {
    T::deserialize(value)
        .map_err(|e| ExchangeError::BadResponse(format!("{} invalid {} payload: {}", ID, what, e)))
}

/// Items of a JSON array response.
pub fn array<'a>(value: &'a Value, what: &str) -> ExchangeResult<&'a Vec<Value>> {
    value
        .as_array()
        .ok_or_else(|| ExchangeError::BadResponse(format!("{} expected a list of {}", ID, what)))
}

fn positive(value: Option<Decimal>) -> Option<Decimal> {
    value.filter(|v| *v > Decimal::ZERO)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn market_of<'a>(
    market: Option<&'a Market>,
    snapshot: &'a MarketSnapshot,
    id: Option<&str>,
) -> Option<&'a Market> {
    market.or_else(|| id.and_then(|id| snapshot.market_by_id(id)).map(|m| m.as_ref()))
}

fn symbol_of(market: Option<&Market>, id: Option<&str>) -> Option<String> {
    market.map(|m| m.symbol.clone()).or_else(|| id.map(str::to_string))
}

// =============================================================================
// Currencies
// =============================================================================

/// Normalize one `capital/config/getall` entry.
///
/// The primary network is the one with the lowest declared `order`; ties
/// keep the network listed first. A network without `order` is primary
/// only while no fee has been chosen.
pub fn parse_currency(value: &Value, policy: CurrencyActivePolicy) -> ExchangeResult<Currency> {
    let raw: RawCoin = decode(value, "currency")?;
    let code = currency_code(&raw.coin);

    let mut deposit = raw.deposit_all_enable.unwrap_or(false);
    let mut withdraw = raw.withdraw_all_enable.unwrap_or(false);
    let mut fee: Option<Decimal> = None;
    let mut min_order: Option<i64> = None;
    let mut precision: Option<DecimalScale> = None;
    let mut fees = HashMap::new();
    let mut networks = HashMap::new();

    for (index, network) in raw.network_list.iter().enumerate() {
        deposit |= network.deposit_enable;
        withdraw |= network.withdraw_enable;

        match network.order {
            Some(order) if min_order.map_or(true, |min| order < min) => {
                min_order = Some(order);
                fee = network.withdraw_fee;
            },
            None if fee.is_none() => fee = network.withdraw_fee,
            _ => {},
        }

        let network_precision = network
            .withdraw_integer_multiple
            .and_then(|step| DecimalScale::from_step(step).ok());
        if network_precision > precision {
            precision = network_precision;
        }

        if let Some(withdraw_fee) = network.withdraw_fee {
            fees.insert(network.network.clone(), withdraw_fee);
        }

        let info = value
            .get("networkList")
            .and_then(|list| list.get(index))
            .cloned()
            .unwrap_or(Value::Null);
        networks.insert(
            network.network.clone(),
            CurrencyNetwork {
                network: network.network.clone(),
                name: network.name.clone(),
                active: policy.is_active(network.deposit_enable, network.withdraw_enable),
                deposit: network.deposit_enable,
                withdraw: network.withdraw_enable,
                fee: network.withdraw_fee,
                precision: network_precision,
                limits: MinMax::new(network.withdraw_min, positive(network.withdraw_max)),
                info,
            },
        );
    }

    Ok(Currency {
        id: raw.coin,
        code,
        name: raw.name,
        active: policy.is_active(deposit, withdraw),
        deposit,
        withdraw,
        precision,
        fee,
        fees,
        networks,
        info: value.clone(),
    })
}

/// Normalize the full `capital/config/getall` list, keyed by code.
pub fn parse_currencies(
    value: &Value,
    policy: CurrencyActivePolicy,
) -> ExchangeResult<HashMap<String, Currency>> {
    let mut currencies = HashMap::new();
    for entry in array(value, "currencies")? {
        let currency = parse_currency(entry, policy)?;
        currencies.entry(currency.code.clone()).or_insert(currency);
    }
    Ok(currencies)
}

/// Withdrawal fees of the given currencies (all when `codes` is `None`).
pub fn funding_fees(currencies: &HashMap<String, Currency>, codes: Option<&[String]>) -> FundingFees {
    let mut fees = FundingFees::default();
    for currency in currencies.values() {
        if codes.is_some_and(|codes| !codes.contains(&currency.code)) {
            continue;
        }
        if let Some(fee) = currency.fee {
            fees.withdraw.insert(currency.code.clone(), fee);
        }
        fees.withdraw_by_network.insert(currency.code.clone(), currency.fees.clone());
    }
    fees
}

// =============================================================================
// Markets
// =============================================================================

/// Normalize one `exchangeInfo` symbol record.
///
/// Precision comes from the base (amount) and quote (price, cost)
/// currency scales; without a currency index the record's own steps and
/// declared precisions are used.
pub fn parse_market(
    value: &Value,
    market_type: MarketType,
    currencies_by_id: &HashMap<String, Currency>,
) -> ExchangeResult<Market> {
    let raw: RawSymbol = decode(value, "market")?;

    let mut limits = MarketLimits::default();
    let mut amount_step = None;
    let mut price_tick = None;
    for filter in &raw.filters {
        match filter {
            RawSymbolFilter::PriceFilter { min_price, max_price, tick_size } => {
                limits.price = MinMax::new(positive(*min_price), positive(*max_price));
                price_tick = positive(*tick_size);
            },
            RawSymbolFilter::LotSize { min_qty, max_qty, step_size } => {
                limits.amount = MinMax::new(*min_qty, positive(*max_qty));
                amount_step = positive(*step_size);
            },
            RawSymbolFilter::MinNotional { min_notional } => limits.cost.min = *min_notional,
            RawSymbolFilter::Notional { min_notional, max_notional } => {
                limits.cost = MinMax::new(*min_notional, positive(*max_notional));
            },
            RawSymbolFilter::Other => {},
        }
    }

    let currency_scale = |id: &str| currencies_by_id.get(id).and_then(|c| c.precision);
    let step_scale = |step: Option<Decimal>| step.and_then(|s| DecimalScale::from_step(s).ok());

    let precision = MarketPrecision {
        amount: currency_scale(&raw.base_asset)
            .or_else(|| step_scale(amount_step))
            .or(raw.quantity_precision.map(DecimalScale::new))
            .or(raw.base_asset_precision.map(DecimalScale::new)),
        price: currency_scale(&raw.quote_asset)
            .or_else(|| step_scale(price_tick))
            .or(raw.price_precision.map(DecimalScale::new))
            .or(raw.quote_precision.map(DecimalScale::new)),
        cost: currency_scale(&raw.quote_asset)
            .or(raw.quote_asset_precision.or(raw.quote_precision).map(DecimalScale::new)),
    };

    let fee = parse_trading_fee(value, None)?;
    let status = raw.status.as_deref().or(raw.contract_status.as_deref());

    Ok(Market {
        symbol: Market::symbol_for(&raw.base_asset, &raw.quote_asset),
        base: currency_code(&raw.base_asset),
        quote: currency_code(&raw.quote_asset),
        settle: if market_type.is_contract() {
            raw.margin_asset.as_deref().map(currency_code)
        } else {
            None
        },
        id: raw.symbol,
        base_id: raw.base_asset,
        quote_id: raw.quote_asset,
        market_type,
        active: status == Some("TRADING"),
        margin: raw.is_margin_trading_allowed || market_type == MarketType::Margin,
        contract_size: raw.contract_size,
        precision,
        limits,
        taker: fee.taker,
        maker: fee.maker,
        info: value.clone(),
    })
}

/// Normalize a trading fee record (`asset/tradeFee` or a market record).
pub fn parse_trading_fee(value: &Value, snapshot: Option<&MarketSnapshot>) -> ExchangeResult<TradingFee> {
    let raw: RawTradeFee = decode(value, "trading fee")?;
    let symbol = snapshot
        .and_then(|s| s.market_by_id(&raw.symbol))
        .map(|m| m.symbol.clone())
        .unwrap_or(raw.symbol);

    Ok(TradingFee {
        symbol,
        maker: raw.maker_commission,
        taker: raw.taker_commission,
        info: value.clone(),
    })
}

// =============================================================================
// Market Data
// =============================================================================

/// Normalize a `ticker/24hr` entry.
pub fn parse_ticker(value: &Value, market: Option<&Market>) -> ExchangeResult<Ticker> {
    let raw: RawTicker = decode(value, "ticker")?;

    // Inverse contracts report contracts in `volume` and base in `baseVolume`
    let inverse = market.map_or(raw.base_volume.is_some(), |m| m.market_type.is_inverse());
    let (base_volume, quote_volume) = if inverse {
        let contract_size = market.and_then(|m| m.contract_size);
        let quote = raw
            .volume
            .zip(contract_size)
            .and_then(|(contracts, size)| contracts.checked_mul(size));
        (raw.base_volume, quote)
    } else {
        (raw.volume, raw.quote_volume)
    };

    Ok(Ticker {
        symbol: symbol_of(market, Some(&raw.symbol)).unwrap_or_default(),
        timestamp: raw.close_time,
        datetime: raw.close_time.and_then(iso8601),
        high: raw.high_price,
        low: raw.low_price,
        bid: raw.bid_price,
        bid_volume: raw.bid_qty,
        ask: raw.ask_price,
        ask_volume: raw.ask_qty,
        vwap: raw.weighted_avg_price,
        open: raw.open_price,
        close: raw.last_price,
        last: raw.last_price,
        previous_close: raw.prev_close_price,
        change: raw.price_change,
        percentage: raw.price_change_percent,
        base_volume,
        quote_volume,
        info: value.clone(),
    })
}

/// Normalize a `depth` snapshot.
pub fn parse_order_book(value: &Value, symbol: &str) -> ExchangeResult<OrderBook> {
    let raw: RawDepth = decode(value, "order book")?;
    let timestamp = raw.transaction_time.or(raw.event_time);

    Ok(OrderBook {
        symbol: symbol.to_string(),
        bids: sort_book_side(book_levels(&raw.bids), true),
        asks: sort_book_side(book_levels(&raw.asks), false),
        timestamp,
        datetime: timestamp.and_then(iso8601),
        nonce: raw.last_update_id,
    })
}

/// Normalize one kline row to a candle with a millisecond timestamp.
pub fn parse_ohlcv(row: &Value) -> ExchangeResult<Ohlcv> {
    let invalid = || ExchangeError::BadResponse(format!("{} invalid kline row: {}", ID, row));
    let fields = row.as_array().filter(|f| f.len() >= 6).ok_or_else(invalid)?;
    let decimal = |i: usize| decimal_of(&fields[i]).ok_or_else(invalid);

    Ok(Ohlcv {
        timestamp: integer_of(&fields[0]).map(to_millis).ok_or_else(invalid)?,
        open: decimal(1)?,
        high: decimal(2)?,
        low: decimal(3)?,
        close: decimal(4)?,
        volume: decimal(5)?,
    })
}

// =============================================================================
// Trades
// =============================================================================

/// One step of side inference: if `present` holds, `side` decides.
struct SideRule {
    present: fn(&RawTrade) -> bool,
    side: fn(&RawTrade) -> Option<OrderSide>,
}

fn maker_flag_side(buyer_is_maker: bool) -> OrderSide {
    if buyer_is_maker {
        OrderSide::Sell
    } else {
        OrderSide::Buy
    }
}

fn has_buyer_was_maker(t: &RawTrade) -> bool {
    t.buyer_was_maker.is_some()
}

fn side_from_buyer_was_maker(t: &RawTrade) -> Option<OrderSide> {
    t.buyer_was_maker.map(maker_flag_side)
}

fn has_is_buyer_maker(t: &RawTrade) -> bool {
    t.is_buyer_maker.is_some()
}

fn side_from_is_buyer_maker(t: &RawTrade) -> Option<OrderSide> {
    t.is_buyer_maker.map(maker_flag_side)
}

fn has_side(t: &RawTrade) -> bool {
    t.side.is_some()
}

fn side_from_side(t: &RawTrade) -> Option<OrderSide> {
    t.side.as_deref().and_then(|s| OrderSide::from_str(s).ok())
}

fn has_is_buyer(t: &RawTrade) -> bool {
    t.is_buyer.is_some()
}

fn side_from_is_buyer(t: &RawTrade) -> Option<OrderSide> {
    t.is_buyer.map(|buyer| if buyer { OrderSide::Buy } else { OrderSide::Sell })
}

/// Evaluated top to bottom; the first rule whose field is present decides.
static SIDE_RULES: [SideRule; 4] = [
    SideRule { present: has_buyer_was_maker, side: side_from_buyer_was_maker },
    SideRule { present: has_is_buyer_maker, side: side_from_is_buyer_maker },
    SideRule { present: has_side, side: side_from_side },
    SideRule { present: has_is_buyer, side: side_from_is_buyer },
];

/// Aggressor side of a trade, if the payload says.
pub fn trade_side(raw: &RawTrade) -> Option<OrderSide> {
    SIDE_RULES
        .iter()
        .find(|rule| (rule.present)(raw))
        .and_then(|rule| (rule.side)(raw))
}

/// Cost of a fill in the currency the market settles in.
///
/// Inverse contracts trade a contract count, so their cost is the base
/// amount: the reported `baseQty`, else `qty * contract_size / price`.
fn trade_cost(
    market: Option<&Market>,
    quote_qty: Option<Decimal>,
    base_qty: Option<Decimal>,
    price: Option<Decimal>,
    qty: Option<Decimal>,
) -> Option<Decimal> {
    match market {
        Some(m) if m.market_type.is_inverse() => base_qty.or_else(|| {
            qty?.checked_mul(m.contract_size?)?.checked_div(price?)
        }),
        _ => safe_cost(quote_qty, price, qty),
    }
}

/// Normalize a trade record of any shape.
///
/// Dust conversions need the market index to pick their synthetic
/// symbol, and the currency balances are swept into.
pub fn parse_trade(
    value: &Value,
    market: Option<&Market>,
    snapshot: &MarketSnapshot,
    dust_earned_currency: &str,
) -> ExchangeResult<Trade> {
    match decode::<RawTradeRecord>(value, "trade")? {
        RawTradeRecord::Dust(raw) => parse_dust_trade(raw, value, snapshot, dust_earned_currency),
        RawTradeRecord::Regular(raw) => Ok(parse_regular_trade(&raw, value, market, snapshot)),
    }
}

fn parse_regular_trade(
    raw: &RawTrade,
    value: &Value,
    market: Option<&Market>,
    snapshot: &MarketSnapshot,
) -> Trade {
    let market = market_of(market, snapshot, raw.symbol.as_deref());
    let fee = match (raw.commission, raw.commission_asset.as_deref()) {
        (Some(cost), Some(asset)) => Some(Fee {
            currency: currency_code(asset),
            cost,
            rate: None,
        }),
        _ => None,
    };

    Trade {
        id: raw.agg_id.or(raw.id).map(|id| id.to_string()),
        order: raw.order_id.map(|id| id.to_string()),
        timestamp: raw.time,
        datetime: raw.time.and_then(iso8601),
        symbol: symbol_of(market, raw.symbol.as_deref()),
        side: trade_side(raw),
        order_type: None,
        taker_or_maker: raw
            .is_maker
            .map(|maker| if maker { TakerOrMaker::Maker } else { TakerOrMaker::Taker }),
        price: raw.price,
        amount: raw.qty,
        cost: trade_cost(market, raw.quote_qty, raw.base_qty, raw.price, raw.qty),
        fee,
        info: value.clone(),
    }
}

/// Normalize a dust conversion.
///
/// The dust log reports the earned amount net of the service charge; the
/// trade carries the gross amount and the charge as its fee.
fn parse_dust_trade(
    raw: RawDustTrade,
    value: &Value,
    snapshot: &MarketSnapshot,
    earned_id: &str,
) -> ExchangeResult<Trade> {
    let earned = currency_code(earned_id);
    let gross_earned = raw
        .transfered_amount
        .checked_add(raw.service_charge_amount)
        .ok_or_else(|| ExchangeError::BadResponse(format!("{} dust amount out of range", ID)))?;

    let earned_market = Market::symbol_for(earned_id, &raw.from_asset);
    let (symbol, side, amount, cost) = if snapshot.market(&earned_market).is_some() {
        (earned_market, OrderSide::Buy, gross_earned, raw.amount)
    } else {
        (
            Market::symbol_for(&raw.from_asset, earned_id),
            OrderSide::Sell,
            raw.amount,
            gross_earned,
        )
    };

    Ok(Trade {
        id: raw.trans_id.map(|id| id.to_string()),
        order: None,
        timestamp: raw.operate_time,
        datetime: raw.operate_time.and_then(iso8601),
        symbol: Some(symbol),
        side: Some(side),
        order_type: None,
        taker_or_maker: Some(TakerOrMaker::Taker),
        price: cost.checked_div(amount),
        amount: Some(amount),
        cost: Some(cost),
        fee: Some(Fee {
            currency: earned,
            cost: raw.service_charge_amount,
            rate: None,
        }),
        info: value.clone(),
    })
}

// =============================================================================
// Orders
// =============================================================================

/// Map an exchange order status; unknown codes pass through.
pub fn parse_order_status(status: &str) -> OrderStatus {
    match status {
        "NEW" | "PARTIALLY_FILLED" => OrderStatus::Open,
        "FILLED" => OrderStatus::Closed,
        "CANCELED" => OrderStatus::Canceled,
        "PENDING_CANCEL" => OrderStatus::Canceling,
        "REJECTED" => OrderStatus::Rejected,
        "EXPIRED" => OrderStatus::Expired,
        other => OrderStatus::Other(other.to_string()),
    }
}

/// Status of an order payload without a status field.
pub fn derive_order_status(filled: Option<Decimal>, amount: Option<Decimal>, finished: bool) -> OrderStatus {
    match (filled, amount) {
        (Some(filled), Some(amount)) if filled == amount => OrderStatus::Closed,
        _ if finished => OrderStatus::Canceled,
        _ => OrderStatus::Open,
    }
}

/// Normalize an order of any family.
pub fn parse_order(value: &Value, market: Option<&Market>, snapshot: &MarketSnapshot) -> ExchangeResult<Order> {
    let raw: RawOrder = decode(value, "order")?;
    let market = market_of(market, snapshot, raw.symbol.as_deref());
    let symbol = symbol_of(market, raw.symbol.as_deref()).unwrap_or_default();
    let id = raw.order_id.map(|id| id.to_string()).unwrap_or_default();

    let amount = raw.orig_qty;
    let filled = raw.executed_qty;
    let remaining = match (amount, filled) {
        (Some(amount), Some(filled)) => amount.checked_sub(filled),
        _ => None,
    };

    // Spot reports a negative quote quantity for orders older than its history
    let cost = raw
        .cummulative_quote_qty
        .filter(|c| *c >= Decimal::ZERO)
        .or(raw.cum_quote)
        .or(raw.cum_base);

    let inverse = market.is_some_and(|m| m.market_type.is_inverse());
    let average = positive(raw.avg_price).or_else(|| match (cost, filled) {
        (Some(cost), Some(filled)) if !inverse => cost.checked_div(filled).filter(|a| *a > Decimal::ZERO),
        _ => None,
    });

    let status = match raw.status.as_deref() {
        Some(status) => parse_order_status(status),
        None => derive_order_status(filled, amount, raw.finish_time.is_some()),
    };

    let timestamp = raw.time.or(raw.transact_time);
    let side = raw.side.as_deref().and_then(|s| OrderSide::from_str(s).ok());
    let order_type = raw.order_type.as_deref().and_then(|t| OrderType::from_str(t).ok());

    let mut trades = Vec::with_capacity(raw.fills.len());
    for fill_value in &raw.fills {
        let fill: RawFill = decode(fill_value, "fill")?;
        trades.push(Trade {
            id: fill.trade_id.map(|id| id.to_string()),
            order: Some(id.clone()),
            timestamp,
            datetime: timestamp.and_then(iso8601),
            symbol: Some(symbol.clone()),
            side,
            order_type,
            taker_or_maker: None,
            price: fill.price,
            amount: fill.qty,
            cost: trade_cost(market, None, None, fill.price, fill.qty),
            fee: match (fill.commission, fill.commission_asset.as_deref()) {
                (Some(cost), Some(asset)) => Some(Fee {
                    currency: currency_code(asset),
                    cost,
                    rate: None,
                }),
                _ => None,
            },
            info: fill_value.clone(),
        });
    }

    Ok(Order {
        id,
        client_order_id: raw.client_order_id,
        timestamp,
        datetime: timestamp.and_then(iso8601),
        last_trade_timestamp: raw.update_time,
        symbol,
        order_type,
        time_in_force: raw.time_in_force.as_deref().and_then(|t| TimeInForce::from_str(t).ok()),
        side,
        price: positive(raw.price),
        stop_price: positive(raw.stop_price),
        average,
        amount,
        filled,
        remaining,
        cost,
        status,
        reduce_only: raw.reduce_only,
        fee: aggregate_fee(&trades),
        trades,
        info: value.clone(),
    })
}

/// Sum of fill fees when all fills paid in one currency.
///
/// Mixed currencies leave the order fee unset; each fill keeps its own.
fn aggregate_fee(trades: &[Trade]) -> Option<Fee> {
    let mut fees = trades.iter().filter_map(|t| t.fee.as_ref());
    let first = fees.next()?.clone();
    fees.try_fold(first, |mut total, fee| {
        (fee.currency == total.currency).then(|| {
            total.cost += fee.cost;
            total
        })
    })
}

// =============================================================================
// Balances
// =============================================================================

/// Normalize an account response of the given family.
pub fn parse_balance(value: &Value, market_type: MarketType) -> ExchangeResult<Balances> {
    match market_type {
        MarketType::Spot => {
            let raw: RawSpotAccount = decode(value, "account")?;
            let entries = raw
                .balances
                .into_iter()
                .map(|b| -> ExchangeResult<(String, Balance)> {
                    Ok((currency_code(&b.asset), Balance::from_parts(b.free, b.locked, None)?))
                })
                .collect::<ExchangeResult<Vec<_>>>()?;
            Ok(build_balances(entries, raw.update_time, value.clone())?)
        },
        MarketType::Margin => {
            let raw: RawMarginAccount = decode(value, "margin account")?;
            let entries = raw
                .user_assets
                .into_iter()
                .map(|b| -> ExchangeResult<(String, Balance)> {
                    Ok((currency_code(&b.asset), Balance::from_parts(b.free, b.locked, None)?))
                })
                .collect::<ExchangeResult<Vec<_>>>()?;
            Ok(build_balances(entries, None, value.clone())?)
        },
        MarketType::Future | MarketType::Delivery => {
            let raw: RawFuturesAccount = decode(value, "futures account")?;
            let entries = raw
                .assets
                .into_iter()
                .map(|a| -> ExchangeResult<(String, Balance)> {
                    let total = a.margin_balance.or(a.wallet_balance);
                    Ok((currency_code(&a.asset), Balance::from_parts(a.available_balance, None, total)?))
                })
                .collect::<ExchangeResult<Vec<_>>>()?;
            Ok(build_balances(entries, raw.update_time, value.clone())?)
        },
    }
}

// =============================================================================
// Funding
// =============================================================================

/// Parse a millisecond number or a `YYYY-MM-DD HH:MM:SS` UTC string.
pub fn parse_exchange_time(value: &Value) -> Option<i64> {
    if let Some(ms) = integer_of(value) {
        return Some(ms);
    }
    let text = value.as_str()?;
    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|dt| dt.and_utc().timestamp_millis())
}

/// Map a numeric deposit or withdrawal status.
pub fn parse_transaction_status(transaction_type: TransactionType, status: i64) -> Option<TransactionStatus> {
    match (transaction_type, status) {
        (TransactionType::Deposit, 0) => Some(TransactionStatus::Pending),
        (TransactionType::Deposit, 1 | 6) => Some(TransactionStatus::Ok),
        (TransactionType::Withdrawal, 0 | 2 | 4) => Some(TransactionStatus::Pending),
        (TransactionType::Withdrawal, 1) => Some(TransactionStatus::Canceled),
        (TransactionType::Withdrawal, 3 | 5) => Some(TransactionStatus::Failed),
        (TransactionType::Withdrawal, 6) => Some(TransactionStatus::Ok),
        _ => None,
    }
}

/// Normalize a deposit or withdrawal.
///
/// Deposits carry `insertTime`, withdrawals `applyTime`; `fallback` is
/// used when neither is present.
pub fn parse_transaction(value: &Value, fallback: TransactionType) -> ExchangeResult<Transaction> {
    let raw: RawTransaction = decode(value, "transaction")?;
    let apply_time = raw.apply_time.as_ref().and_then(parse_exchange_time);

    let transaction_type = if raw.insert_time.is_some() {
        TransactionType::Deposit
    } else if apply_time.is_some() {
        TransactionType::Withdrawal
    } else {
        fallback
    };

    let currency = currency_code(&raw.coin);
    let timestamp = raw.insert_time.or(apply_time);
    let id = raw.id.as_ref().and_then(|id| match id {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    });

    Ok(Transaction {
        id,
        txid: non_empty(raw.tx_id),
        transaction_type,
        amount: raw.amount,
        address: non_empty(raw.address),
        tag: non_empty(raw.address_tag),
        network: raw.network,
        status: raw.status.and_then(|s| parse_transaction_status(transaction_type, s)),
        fee: raw.transaction_fee.map(|cost| Fee {
            currency: currency.clone(),
            cost,
            rate: None,
        }),
        currency,
        timestamp,
        datetime: timestamp.and_then(iso8601),
        updated: raw.complete_time.as_ref().and_then(parse_exchange_time),
        info: value.clone(),
    })
}

/// Exchange wallet id of a unified account name.
pub fn account_type_id(name: &str) -> Option<&'static str> {
    match name.to_ascii_lowercase().as_str() {
        "spot" | "main" => Some("MAIN"),
        "margin" => Some("MARGIN"),
        "future" | "linear" | "umfuture" => Some("UMFUTURE"),
        "delivery" | "inverse" | "cmfuture" => Some("CMFUTURE"),
        "funding" => Some("FUNDING"),
        _ => None,
    }
}

/// Unified account name of an exchange wallet id.
pub fn account_name(type_id: &str) -> String {
    match type_id {
        "MAIN" => "spot".to_string(),
        "MARGIN" => "margin".to_string(),
        "UMFUTURE" => "future".to_string(),
        "CMFUTURE" => "delivery".to_string(),
        "FUNDING" => "funding".to_string(),
        other => other.to_ascii_lowercase(),
    }
}

fn parse_transfer_status(status: &str) -> Option<TransactionStatus> {
    match status {
        "CONFIRMED" => Some(TransactionStatus::Ok),
        "PENDING" => Some(TransactionStatus::Pending),
        "FAILED" => Some(TransactionStatus::Failed),
        _ => None,
    }
}

/// Normalize a transfer history row (`type` is `FROM_TO`).
pub fn parse_transfer(value: &Value) -> ExchangeResult<Transfer> {
    let raw: RawTransfer = decode(value, "transfer")?;
    let (from_account, to_account) = match raw.transfer_type.as_deref().and_then(|t| t.split_once('_')) {
        Some((from, to)) => (Some(account_name(from)), Some(account_name(to))),
        None => (None, None),
    };

    Ok(Transfer {
        id: raw.tran_id.map(|id| id.to_string()),
        timestamp: raw.timestamp,
        datetime: raw.timestamp.and_then(iso8601),
        currency: raw.asset.as_deref().map(currency_code),
        amount: raw.amount,
        from_account,
        to_account,
        status: raw.status.as_deref().and_then(parse_transfer_status),
        info: value.clone(),
    })
}

/// Normalize a deposit address, rejecting malformed ones.
pub fn parse_deposit_address(value: &Value) -> ExchangeResult<DepositAddress> {
    let raw: RawDepositAddress = decode(value, "deposit address")?;

    if raw.address.is_empty() || raw.address.chars().any(char::is_whitespace) {
        return Err(ExchangeError::InvalidAddress(format!(
            "{} fetchDepositAddress() returned an invalid address: {:?}",
            ID, raw.address
        )));
    }

    Ok(DepositAddress {
        currency: currency_code(&raw.coin),
        address: raw.address,
        tag: non_empty(raw.tag),
        network: raw.network,
        info: value.clone(),
    })
}

// =============================================================================
// Positions
// =============================================================================

/// Normalize a `positionRisk` entry.
pub fn parse_position(value: &Value, snapshot: &MarketSnapshot) -> ExchangeResult<Position> {
    let raw: RawPositionRisk = decode(value, "position")?;
    let market = snapshot.market_by_id(&raw.symbol).map(|m| m.as_ref());

    let side = match raw.position_side.as_deref() {
        Some("LONG") => Some(PositionSide::Long),
        Some("SHORT") => Some(PositionSide::Short),
        _ => match raw.position_amt {
            Some(amt) if amt > Decimal::ZERO => Some(PositionSide::Long),
            Some(amt) if amt < Decimal::ZERO => Some(PositionSide::Short),
            _ => None,
        },
    };

    Ok(Position {
        symbol: symbol_of(market, Some(&raw.symbol)).unwrap_or_default(),
        side,
        contracts: raw.position_amt.map(|a| a.abs()),
        entry_price: positive(raw.entry_price),
        mark_price: positive(raw.mark_price),
        notional: raw.notional.map(|n| n.abs()),
        unrealized_pnl: raw.un_realized_profit,
        liquidation_price: positive(raw.liquidation_price),
        leverage: raw.leverage,
        margin_mode: raw.margin_type.as_deref().and_then(|m| MarginMode::from_str(m).ok()),
        timestamp: raw.update_time.filter(|t| *t > 0),
        info: value.clone(),
    })
}

// =============================================================================
// Tests
// =============================================================================
