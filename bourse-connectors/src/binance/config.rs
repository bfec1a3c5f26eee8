//! Binance adapter configuration.
//!
//! `BinanceOptions` is an immutable value. The options used by a call are
//! the built-in defaults, overlaid with the adapter's `BinanceConfig`
//! overrides, overlaid with the call's own `OptionOverrides`; later layers
//! win field by field.

use bourse_domain::{ApiCredentials, MarketType};
use std::collections::BTreeMap;
use std::time::Duration;
use strum::{AsRefStr, Display, EnumString};

use bourse_exchange::http::DEFAULT_TIMEOUT_SECS;

// =============================================================================
// Option Values
// =============================================================================

/// How currency `active` combines network flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum CurrencyActivePolicy {
    /// Active if any network accepts deposits or allows withdrawals
    #[default]
    AnyEnabled,
    /// Active only if deposits and withdrawals are both enabled
    AllEnabled,
}

impl CurrencyActivePolicy {
    /// Combine the deposit and withdrawal flags.
    pub fn is_active(&self, deposit: bool, withdraw: bool) -> bool {
        match self {
            CurrencyActivePolicy::AnyEnabled => deposit || withdraw,
            CurrencyActivePolicy::AllEnabled => deposit && withdraw,
        }
    }
}

/// Endpoint used for public trades.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(ascii_case_insensitive)]
pub enum FetchTradesMethod {
    /// Compressed aggregate trades (supports `since`)
    #[default]
    #[strum(serialize = "aggTrades")]
    AggTrades,
    /// Recent raw trades
    #[strum(serialize = "trades")]
    Trades,
}

/// Detail level of order placement responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum NewOrderRespType {
    Ack,
    Result,
    Full,
}

/// Response type per order kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewOrderRespTypes {
    /// Market orders fill immediately, so the fills are requested
    pub market: NewOrderRespType,
    pub limit: NewOrderRespType,
}

impl Default for NewOrderRespTypes {
    fn default() -> Self {
        Self {
            market: NewOrderRespType::Full,
            limit: NewOrderRespType::Result,
        }
    }
}

// =============================================================================
// Options
// =============================================================================

/// Effective adapter options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinanceOptions {
    /// Market type used when neither the call nor a market names one
    pub default_type: MarketType,
    /// Families listed by `fetch_markets`; empty means `[default_type]`
    pub fetch_markets: Vec<MarketType>,
    /// Milliseconds a signed request stays valid
    pub recv_window: u64,
    pub currency_active_policy: CurrencyActivePolicy,
    pub fetch_trades_method: FetchTradesMethod,
    pub new_order_resp_type: NewOrderRespTypes,
    /// Refuse `fetch_open_orders` without a symbol
    pub warn_on_fetch_open_orders_without_symbol: bool,
    /// Prefix of generated client order ids
    pub client_order_id_prefix: String,
    /// Currency small balances are swept into
    pub dust_earned_currency: String,
    /// Transfer direction queried by `fetch_transfers`
    pub default_transfer_type: String,
}

impl Default for BinanceOptions {
    fn default() -> Self {
        Self {
            default_type: MarketType::Spot,
            fetch_markets: Vec::new(),
            recv_window: 5000,
            currency_active_policy: CurrencyActivePolicy::default(),
            fetch_trades_method: FetchTradesMethod::default(),
            new_order_resp_type: NewOrderRespTypes::default(),
            warn_on_fetch_open_orders_without_symbol: true,
            client_order_id_prefix: "bourse-".to_string(),
            dust_earned_currency: "BNB".to_string(),
            default_transfer_type: "MAIN_UMFUTURE".to_string(),
        }
    }
}

impl BinanceOptions {
    /// Overlay `overrides` onto these options.
    pub fn merged(&self, overrides: &OptionOverrides) -> Self {
        Self {
            default_type: overrides.default_type.unwrap_or(self.default_type),
            fetch_markets: overrides
                .fetch_markets
                .clone()
                .unwrap_or_else(|| self.fetch_markets.clone()),
            recv_window: overrides.recv_window.unwrap_or(self.recv_window),
            currency_active_policy: overrides
                .currency_active_policy
                .unwrap_or(self.currency_active_policy),
            fetch_trades_method: overrides.fetch_trades_method.unwrap_or(self.fetch_trades_method),
            new_order_resp_type: overrides.new_order_resp_type.unwrap_or(self.new_order_resp_type),
            warn_on_fetch_open_orders_without_symbol: overrides
                .warn_on_fetch_open_orders_without_symbol
                .unwrap_or(self.warn_on_fetch_open_orders_without_symbol),
            client_order_id_prefix: overrides
                .client_order_id_prefix
                .clone()
                .unwrap_or_else(|| self.client_order_id_prefix.clone()),
            dust_earned_currency: overrides
                .dust_earned_currency
                .clone()
                .unwrap_or_else(|| self.dust_earned_currency.clone()),
            default_transfer_type: overrides
                .default_transfer_type
                .clone()
                .unwrap_or_else(|| self.default_transfer_type.clone()),
        }
    }

    /// Families listed by `fetch_markets`.
    pub fn market_families(&self) -> Vec<MarketType> {
        if self.fetch_markets.is_empty() {
            vec![self.default_type]
        } else {
            self.fetch_markets.clone()
        }
    }
}

/// Partial options; `None` keeps the lower layer's value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionOverrides {
    pub default_type: Option<MarketType>,
    pub fetch_markets: Option<Vec<MarketType>>,
    pub recv_window: Option<u64>,
    pub currency_active_policy: Option<CurrencyActivePolicy>,
    pub fetch_trades_method: Option<FetchTradesMethod>,
    pub new_order_resp_type: Option<NewOrderRespTypes>,
    pub warn_on_fetch_open_orders_without_symbol: Option<bool>,
    pub client_order_id_prefix: Option<String>,
    pub dust_earned_currency: Option<String>,
    pub default_transfer_type: Option<String>,
}

// =============================================================================
// Call Parameters
// =============================================================================

/// Per-call parameters.
///
/// `market_type` is the explicit call-time type (first tier of market type
/// resolution). `extra` holds raw exchange parameters sent verbatim; they
/// take precedence over parameters the adapter derives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallParams {
    pub market_type: Option<MarketType>,
    pub overrides: OptionOverrides,
    pub extra: BTreeMap<String, String>,
}

impl CallParams {
    /// No overrides, no extra parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Force the endpoint family for this call.
    pub fn with_type(mut self, market_type: MarketType) -> Self {
        self.market_type = Some(market_type);
        self
    }

    /// Override options for this call.
    pub fn with_overrides(mut self, overrides: OptionOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Add a raw exchange parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Raw parameter value.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.extra.get(key).map(String::as_str)
    }
}

// =============================================================================
// Adapter Configuration
// =============================================================================

/// Adapter construction settings.
#[derive(Debug, Clone)]
pub struct BinanceConfig {
    /// Required for private endpoints
    pub credentials: Option<ApiCredentials>,
    /// Route requests to the testnet hosts
    pub sandbox: bool,
    /// Per-request deadline of the HTTP transport
    pub timeout: Duration,
    /// Adapter-wide option overrides
    pub options: OptionOverrides,
}

impl Default for BinanceConfig {
    fn default() -> Self {
        Self {
            credentials: None,
            sandbox: false,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            options: OptionOverrides::default(),
        }
    }
}

impl BinanceConfig {
    /// Public-only configuration.
    pub fn public() -> Self {
        Self::default()
    }

    /// Configuration with API credentials.
    pub fn with_credentials(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            credentials: Some(ApiCredentials::new(api_key, api_secret)),
            ..Self::default()
        }
    }

    /// Toggle testnet hosts.
    pub fn sandbox(mut self, sandbox: bool) -> Self {
        self.sandbox = sandbox;
        self
    }

    /// Set adapter-wide option overrides.
    pub fn options(mut self, options: OptionOverrides) -> Self {
        self.options = options;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_defaults() {
        let options = BinanceOptions::default();
        assert_eq!(options.default_type, MarketType::Spot);
        assert_eq!(options.recv_window, 5000);
        assert_eq!(options.currency_active_policy, CurrencyActivePolicy::AnyEnabled);
        assert!(options.warn_on_fetch_open_orders_without_symbol);
        assert_eq!(options.market_families(), vec![MarketType::Spot]);
    }

    #[test]
    fn test_later_layers_win_field_by_field() {
        let adapter = OptionOverrides {
            default_type: Some(MarketType::Future),
            recv_window: Some(10_000),
            ..Default::default()
        };
        let call = OptionOverrides {
            recv_window: Some(2_000),
            ..Default::default()
        };

        let effective = BinanceOptions::default().merged(&adapter).merged(&call);

        assert_eq!(effective.default_type, MarketType::Future);
        assert_eq!(effective.recv_window, 2_000);
        assert_eq!(effective.dust_earned_currency, "BNB");
    }

    #[test]
    fn test_option_value_strings() {
        assert_eq!(FetchTradesMethod::AggTrades.to_string(), "aggTrades");
        assert_eq!(FetchTradesMethod::from_str("trades").unwrap(), FetchTradesMethod::Trades);
        assert_eq!(
            CurrencyActivePolicy::from_str("all-enabled").unwrap(),
            CurrencyActivePolicy::AllEnabled
        );
        assert_eq!(NewOrderRespType::Full.to_string(), "FULL");
    }

    #[test]
    fn test_call_params_builder() {
        let params = CallParams::new()
            .with_type(MarketType::Margin)
            .with_param("timeInForce", "IOC");

        assert_eq!(params.market_type, Some(MarketType::Margin));
        assert_eq!(params.param("timeInForce"), Some("IOC"));
        assert_eq!(params.param("stopPrice"), None);
    }
}
