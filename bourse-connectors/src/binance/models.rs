//! Raw Binance payloads.
//!
//! Decoded from `&serde_json::Value` so normalizers can keep the original
//! document as `info`. Fields shared by several endpoint families under
//! different names are unified with aliases.

use rust_decimal::Decimal;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

// =============================================================================
// Wallet
// =============================================================================

/// Entry of `capital/config/getall`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCoin {
    pub coin: String,
    pub name: Option<String>,
    pub deposit_all_enable: Option<bool>,
    pub withdraw_all_enable: Option<bool>,
    #[serde(default)]
    pub network_list: Vec<RawCoinNetwork>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCoinNetwork {
    pub network: String,
    pub name: Option<String>,
    /// Display order; lower sorts first
    pub order: Option<i64>,
    #[serde(default, alias = "depositEnabled")]
    pub deposit_enable: bool,
    #[serde(default, alias = "withdrawEnabled")]
    pub withdraw_enable: bool,
    pub withdraw_fee: Option<Decimal>,
    pub withdraw_min: Option<Decimal>,
    pub withdraw_max: Option<Decimal>,
    pub withdraw_integer_multiple: Option<Decimal>,
}

/// `capital/deposit/address`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDepositAddress {
    pub coin: String,
    pub address: String,
    pub tag: Option<String>,
    pub network: Option<String>,
}

/// Deposit (`insertTime`) or withdrawal (`applyTime`) history entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTransaction {
    pub id: Option<Value>,
    pub amount: Option<Decimal>,
    pub coin: String,
    pub network: Option<String>,
    pub status: Option<i64>,
    pub address: Option<String>,
    pub address_tag: Option<String>,
    pub tx_id: Option<String>,
    pub insert_time: Option<i64>,
    /// Millisecond number or `YYYY-MM-DD HH:MM:SS` string
    pub apply_time: Option<Value>,
    pub complete_time: Option<Value>,
    pub transaction_fee: Option<Decimal>,
}

/// Row of `asset/transfer` history.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTransfer {
    pub asset: Option<String>,
    pub amount: Option<Decimal>,
    #[serde(rename = "type")]
    pub transfer_type: Option<String>,
    pub status: Option<String>,
    pub tran_id: Option<i64>,
    pub timestamp: Option<i64>,
}

/// Entry of `asset/tradeFee`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTradeFee {
    pub symbol: String,
    pub maker_commission: Option<Decimal>,
    pub taker_commission: Option<Decimal>,
}

/// `asset/dribblet`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDustLog {
    #[serde(default)]
    pub user_asset_dribblets: Vec<RawDribblet>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDribblet {
    pub operate_time: Option<i64>,
    #[serde(default)]
    pub user_asset_dribblet_details: Vec<Value>,
}

// =============================================================================
// Markets
// =============================================================================

/// `exchangeInfo`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawExchangeInfo {
    pub server_time: Option<i64>,
    #[serde(default)]
    pub symbols: Vec<Value>,
}

/// Symbol record of `exchangeInfo`, any family.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSymbol {
    pub symbol: String,
    pub status: Option<String>,
    /// Delivery contracts report status here
    pub contract_status: Option<String>,
    pub base_asset: String,
    pub quote_asset: String,
    pub margin_asset: Option<String>,
    pub base_asset_precision: Option<u32>,
    pub quote_precision: Option<u32>,
    pub quote_asset_precision: Option<u32>,
    pub price_precision: Option<u32>,
    pub quantity_precision: Option<u32>,
    pub contract_size: Option<Decimal>,
    #[serde(default)]
    pub is_margin_trading_allowed: bool,
    pub maker_commission: Option<Decimal>,
    pub taker_commission: Option<Decimal>,
    #[serde(default)]
    pub filters: Vec<RawSymbolFilter>,
}

/// Trading rule of a symbol.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "filterType")]
pub enum RawSymbolFilter {
    #[serde(rename = "PRICE_FILTER", rename_all = "camelCase")]
    PriceFilter {
        min_price: Option<Decimal>,
        max_price: Option<Decimal>,
        tick_size: Option<Decimal>,
    },
    #[serde(rename = "LOT_SIZE", rename_all = "camelCase")]
    LotSize {
        min_qty: Option<Decimal>,
        max_qty: Option<Decimal>,
        step_size: Option<Decimal>,
    },
    /// Futures name the minimum `notional`
    #[serde(rename = "MIN_NOTIONAL", rename_all = "camelCase")]
    MinNotional {
        #[serde(alias = "notional")]
        min_notional: Option<Decimal>,
    },
    #[serde(rename = "NOTIONAL", rename_all = "camelCase")]
    Notional {
        min_notional: Option<Decimal>,
        max_notional: Option<Decimal>,
    },
    #[serde(other)]
    Other,
}

// =============================================================================
// Market Data
// =============================================================================

/// `ticker/24hr` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTicker {
    pub symbol: String,
    pub price_change: Option<Decimal>,
    pub price_change_percent: Option<Decimal>,
    pub weighted_avg_price: Option<Decimal>,
    pub prev_close_price: Option<Decimal>,
    pub last_price: Option<Decimal>,
    pub bid_price: Option<Decimal>,
    pub bid_qty: Option<Decimal>,
    pub ask_price: Option<Decimal>,
    pub ask_qty: Option<Decimal>,
    pub open_price: Option<Decimal>,
    pub high_price: Option<Decimal>,
    pub low_price: Option<Decimal>,
    pub volume: Option<Decimal>,
    pub quote_volume: Option<Decimal>,
    /// Delivery contracts report volume in contracts and base separately
    pub base_volume: Option<Decimal>,
    pub close_time: Option<i64>,
}

/// `depth`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDepth {
    pub last_update_id: Option<i64>,
    /// Futures message time
    #[serde(rename = "E")]
    pub event_time: Option<i64>,
    /// Futures transaction time
    #[serde(rename = "T")]
    pub transaction_time: Option<i64>,
    #[serde(default)]
    pub bids: Vec<(Decimal, Decimal)>,
    #[serde(default)]
    pub asks: Vec<(Decimal, Decimal)>,
}

/// A public trade, aggregate trade or own fill.
///
/// Short field names are the aggregate-trade form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTrade {
    /// Aggregate trade id
    #[serde(rename = "a")]
    pub agg_id: Option<i64>,
    pub id: Option<i64>,
    pub order_id: Option<i64>,
    pub symbol: Option<String>,
    #[serde(alias = "p")]
    pub price: Option<Decimal>,
    #[serde(alias = "q")]
    pub qty: Option<Decimal>,
    pub quote_qty: Option<Decimal>,
    /// Base amount of an inverse contract trade
    pub base_qty: Option<Decimal>,
    #[serde(alias = "T")]
    pub time: Option<i64>,
    /// Buyer was the maker (aggregate trades)
    #[serde(rename = "m")]
    pub buyer_was_maker: Option<bool>,
    pub is_buyer_maker: Option<bool>,
    pub side: Option<String>,
    #[serde(alias = "buyer")]
    pub is_buyer: Option<bool>,
    #[serde(alias = "maker")]
    pub is_maker: Option<bool>,
    pub commission: Option<Decimal>,
    pub commission_asset: Option<String>,
}

/// One converted balance of the dust log.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDustTrade {
    pub trans_id: Option<i64>,
    /// Fee, in the earned currency
    pub service_charge_amount: Decimal,
    /// Amount of the swept currency
    pub amount: Decimal,
    pub operate_time: Option<i64>,
    /// Earned amount, net of the fee
    pub transfered_amount: Decimal,
    pub from_asset: String,
}

/// A trade record of either shape.
///
/// Records flagged with `isDustTrade` decode as dust conversions.
#[derive(Debug, Clone)]
pub enum RawTradeRecord {
    Dust(RawDustTrade),
    Regular(RawTrade),
}

impl<'de> Deserialize<'de> for RawTradeRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let is_dust = value.get("isDustTrade").and_then(Value::as_bool).unwrap_or(false);
        if is_dust {
            RawDustTrade::deserialize(&value).map(RawTradeRecord::Dust).map_err(D::Error::custom)
        } else {
            RawTrade::deserialize(&value).map(RawTradeRecord::Regular).map_err(D::Error::custom)
        }
    }
}

// =============================================================================
// Orders
// =============================================================================

/// Order of any family.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOrder {
    pub symbol: Option<String>,
    pub order_id: Option<i64>,
    pub client_order_id: Option<String>,
    pub price: Option<Decimal>,
    pub avg_price: Option<Decimal>,
    pub orig_qty: Option<Decimal>,
    pub executed_qty: Option<Decimal>,
    /// Spot and margin
    pub cummulative_quote_qty: Option<Decimal>,
    /// Linear futures
    pub cum_quote: Option<Decimal>,
    /// Inverse futures
    pub cum_base: Option<Decimal>,
    pub status: Option<String>,
    pub time_in_force: Option<String>,
    #[serde(rename = "type")]
    pub order_type: Option<String>,
    pub side: Option<String>,
    pub stop_price: Option<Decimal>,
    pub reduce_only: Option<bool>,
    pub time: Option<i64>,
    pub transact_time: Option<i64>,
    pub update_time: Option<i64>,
    /// Set once the order left the book
    #[serde(alias = "finishedAt")]
    pub finish_time: Option<i64>,
    #[serde(default)]
    pub fills: Vec<Value>,
}

/// Fill of a `FULL` order response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFill {
    pub price: Option<Decimal>,
    pub qty: Option<Decimal>,
    pub commission: Option<Decimal>,
    pub commission_asset: Option<String>,
    pub trade_id: Option<i64>,
}

// =============================================================================
// Accounts
// =============================================================================

/// Spot `account`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSpotAccount {
    pub update_time: Option<i64>,
    #[serde(default)]
    pub balances: Vec<RawAssetBalance>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAssetBalance {
    pub asset: String,
    pub free: Option<Decimal>,
    #[serde(alias = "frozen")]
    pub locked: Option<Decimal>,
}

/// Cross margin `account`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMarginAccount {
    #[serde(default)]
    pub user_assets: Vec<RawAssetBalance>,
}

/// Futures `account`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFuturesAccount {
    pub update_time: Option<i64>,
    #[serde(default)]
    pub assets: Vec<RawFuturesAsset>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFuturesAsset {
    pub asset: String,
    pub wallet_balance: Option<Decimal>,
    pub available_balance: Option<Decimal>,
    pub margin_balance: Option<Decimal>,
}

/// `positionRisk` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPositionRisk {
    pub symbol: String,
    pub position_amt: Option<Decimal>,
    pub entry_price: Option<Decimal>,
    pub mark_price: Option<Decimal>,
    pub un_realized_profit: Option<Decimal>,
    pub liquidation_price: Option<Decimal>,
    pub leverage: Option<Decimal>,
    pub margin_type: Option<String>,
    pub position_side: Option<String>,
    #[serde(alias = "notionalValue")]
    pub notional: Option<Decimal>,
    pub update_time: Option<i64>,
}
