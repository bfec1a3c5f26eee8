//! Binance adapter state and request pipeline.
//!
//! Every operation goes through [`Binance::request`]: sign, execute,
//! classify, decode.

use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

use bourse_domain::{ApiCredentials, Currency, Market, Trade};
use bourse_exchange::parse::filter_by_since_limit;
use bourse_exchange::{
    Exchange, ExchangeError, ExchangeResult, MarketCache, MarketSnapshot, ReqwestTransport,
    Transport,
};

use super::config::{BinanceConfig, BinanceOptions, CallParams};
use super::endpoints::{family, Endpoint, DUST_LOG, PING};
use super::errors;
use super::models::{RawDustLog, RawExchangeInfo};
use super::parse;
use super::ID;

/// Request parameters, sorted by name.
pub type Query = BTreeMap<String, String>;

/// Binance adapter.
///
/// Holds the transport, the market cache and the effective adapter-wide
/// options. Cheap to share behind an `Arc`.
pub struct Binance {
    pub(crate) config: BinanceConfig,
    pub(crate) options: BinanceOptions,
    transport: Arc<dyn Transport>,
    pub(crate) cache: MarketCache,
    /// Set after the first successful private response
    authenticated: AtomicBool,
}

impl Binance {
    /// Create an adapter that talks HTTP through reqwest.
    pub fn new(config: BinanceConfig) -> Self {
        let transport = Arc::new(ReqwestTransport::new(config.timeout));
        Self::with_transport(config, transport)
    }

    /// Create an adapter over a custom transport.
    pub fn with_transport(config: BinanceConfig, transport: Arc<dyn Transport>) -> Self {
        let options = BinanceOptions::default().merged(&config.options);
        Self {
            config,
            options,
            transport,
            cache: MarketCache::new(),
            authenticated: AtomicBool::new(false),
        }
    }

    /// Adapter-wide options.
    pub fn options(&self) -> &BinanceOptions {
        &self.options
    }

    /// Options in effect for one call.
    pub fn effective_options(&self, params: &CallParams) -> BinanceOptions {
        self.options.merged(&params.overrides)
    }

    pub fn credentials(&self) -> Option<&ApiCredentials> {
        self.config.credentials.as_ref()
    }

    pub fn is_sandbox(&self) -> bool {
        self.config.sandbox
    }

    /// Whether a private request has succeeded on this adapter.
    pub fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::Relaxed)
    }

    /// Classify a raw response.
    ///
    /// # Errors
    /// The taxonomy error the response maps to
    pub fn handle_errors(&self, status: u16, reason: &str, body: &str) -> ExchangeResult<()> {
        errors::handle_errors(status, reason, body, self.is_authenticated())
    }

    // =========================================================================
    // Request Pipeline
    // =========================================================================

    /// Sign and send one request, returning the decoded JSON body.
    ///
    /// Raw parameters of `params` are merged last and win over derived ones.
    pub(crate) async fn request(
        &self,
        endpoint: Endpoint,
        mut query: Query,
        params: &CallParams,
    ) -> ExchangeResult<Value> {
        if endpoint.api.is_private() {
            let recv_window = self.effective_options(params).recv_window;
            query.insert("recvWindow".to_string(), recv_window.to_string());
        }
        query.extend(params.extra.iter().map(|(k, v)| (k.clone(), v.clone())));

        let request = self.sign(endpoint.path, endpoint.api, endpoint.method, &query)?;
        debug!(method = %request.method, path = endpoint.path, "Sending request");

        let response = self.transport.execute(request).await?;
        self.handle_errors(response.status, &response.reason, &response.body)?;

        if endpoint.api.is_private() && !self.authenticated.swap(true, Ordering::Relaxed) {
            debug!("First private request succeeded");
        }

        serde_json::from_str(&response.body).map_err(|e| {
            ExchangeError::BadResponse(format!("{} {} returned invalid JSON: {}", ID, endpoint.path, e))
        })
    }

    // =========================================================================
    // Markets
    // =========================================================================

    /// Fetch currencies and every configured market family.
    ///
    /// Currencies come from a private endpoint; without credentials the
    /// listing carries markets only.
    pub(crate) async fn load_listing(&self, params: &CallParams) -> ExchangeResult<MarketSnapshot> {
        let currencies = self.listing_currencies(params).await?;
        let markets = self.list_markets(&currencies, params).await?;
        Ok(MarketSnapshot::new(markets, currencies))
    }

    /// Currencies feeding market precision, empty without credentials.
    pub(crate) async fn listing_currencies(
        &self,
        params: &CallParams,
    ) -> ExchangeResult<HashMap<String, Currency>> {
        if self.credentials().is_none() {
            debug!("No credentials, skipping currency listing");
            return Ok(HashMap::new());
        }
        self.fetch_currencies(params).await
    }

    /// Normalize the `exchangeInfo` listing of every configured family.
    pub(crate) async fn list_markets(
        &self,
        currencies: &HashMap<String, Currency>,
        params: &CallParams,
    ) -> ExchangeResult<Vec<Market>> {
        let by_id: HashMap<String, Currency> =
            currencies.values().map(|c| (c.id.clone(), c.clone())).collect();

        let mut markets = Vec::new();
        for market_type in self.effective_options(params).market_families() {
            let response = self.request(family(market_type).exchange_info, Query::new(), params).await?;
            let info: RawExchangeInfo = serde_json::from_value(response).map_err(|e| {
                ExchangeError::BadResponse(format!("{} invalid exchangeInfo payload: {}", ID, e))
            })?;
            let before = markets.len();
            for symbol in &info.symbols {
                markets.push(parse::parse_market(symbol, market_type, &by_id)?);
            }
            debug!(market_type = %market_type, count = markets.len() - before, "Listed markets");
        }
        Ok(markets)
    }

    /// Cached listing, loading it on first use.
    pub(crate) async fn snapshot(&self) -> ExchangeResult<Arc<MarketSnapshot>> {
        self.load_markets(false).await
    }

    /// Look up a market by unified symbol.
    ///
    /// # Errors
    /// `BadSymbol` if the symbol is not listed
    pub(crate) async fn market(&self, symbol: &str) -> ExchangeResult<(Arc<MarketSnapshot>, Arc<Market>)> {
        let snapshot = self.snapshot().await?;
        let market = snapshot
            .market(symbol)
            .cloned()
            .ok_or_else(|| ExchangeError::BadSymbol(format!("{} does not have market symbol {}", ID, symbol)))?;
        Ok((snapshot, market))
    }

    // =========================================================================
    // Supplementary Operations
    // =========================================================================

    /// Exchange server time in milliseconds.
    pub async fn fetch_time(&self, params: &CallParams) -> ExchangeResult<i64> {
        let market_type = params.market_type.unwrap_or(self.effective_options(params).default_type);
        let response = self.request(family(market_type).server_time, Query::new(), params).await?;
        response
            .get("serverTime")
            .and_then(Value::as_i64)
            .ok_or_else(|| ExchangeError::BadResponse(format!("{} fetchTime() returned no serverTime", ID)))
    }

    /// Whether the exchange answers.
    ///
    /// Only maintenance and connectivity errors mean "down"; anything else
    /// is returned as an error.
    pub async fn fetch_status(&self, params: &CallParams) -> ExchangeResult<bool> {
        match self.request(PING, Query::new(), params).await {
            Ok(_) => Ok(true),
            Err(ExchangeError::ExchangeNotAvailable(message)) => {
                warn!(%message, "Exchange reports maintenance");
                Ok(false)
            },
            Err(e) => Err(e),
        }
    }

    /// Small-balance conversions from the dust log.
    pub async fn fetch_my_dust_trades(
        &self,
        since: Option<i64>,
        limit: Option<u32>,
        params: &CallParams,
    ) -> ExchangeResult<Vec<Trade>> {
        let snapshot = self.snapshot().await?;
        let earned = self.effective_options(params).dust_earned_currency;

        let mut query = Query::new();
        if let Some(since) = since {
            query.insert("startTime".to_string(), since.to_string());
        }
        let response = self.request(DUST_LOG, query, params).await?;
        let log: RawDustLog = serde_json::from_value(response)
            .map_err(|e| ExchangeError::BadResponse(format!("{} invalid dust log: {}", ID, e)))?;

        let mut trades = Vec::new();
        for dribblet in &log.user_asset_dribblets {
            for detail in &dribblet.user_asset_dribblet_details {
                let mut record = detail.clone();
                if let Value::Object(fields) = &mut record {
                    fields.insert("isDustTrade".to_string(), Value::Bool(true));
                    if !fields.contains_key("operateTime") {
                        if let Some(time) = dribblet.operate_time {
                            fields.insert("operateTime".to_string(), Value::from(time));
                        }
                    }
                }
                trades.push(parse::parse_trade(&record, None, &snapshot, &earned)?);
            }
        }
        Ok(filter_by_since_limit(trades, since, limit))
    }
}

/// Require a symbol argument before any request is made.
pub(crate) fn require_symbol<'a>(symbol: Option<&'a str>, method: &str) -> ExchangeResult<&'a str> {
    symbol.ok_or_else(|| {
        ExchangeError::ArgumentsRequired(format!("{} {}() requires a symbol argument", ID, method))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binance::config::OptionOverrides;

    #[test]
    fn test_require_symbol() {
        assert_eq!(require_symbol(Some("BTC/USDT"), "fetchOrder").unwrap(), "BTC/USDT");

        let err = require_symbol(None, "fetchOrder").unwrap_err();
        assert_eq!(err.to_string(), "binance fetchOrder() requires a symbol argument");
    }

    #[test]
    fn test_options_merge_config_overrides() {
        let config = BinanceConfig::public().options(OptionOverrides {
            recv_window: Some(7000),
            ..Default::default()
        });
        let exchange = Binance::new(config);

        assert_eq!(exchange.options().recv_window, 7000);
        assert!(!exchange.is_authenticated());
        assert!(exchange.credentials().is_none());
    }
}
