//! CLI configuration.
//!
//! Loads the adapter configuration from environment variables with
//! sensible defaults.

use crate::error::{CliError, CliResult};
use bourse_connectors::{BinanceConfig, OptionOverrides};
use bourse_domain::{ApiCredentials, MarketType};
use std::env;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 10;

// =============================================================================
// Configuration
// =============================================================================

/// CLI configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Present only when both key and secret are set
    pub credentials: Option<ApiCredentials>,
    /// Use the testnet hosts
    pub sandbox: bool,
    /// Per-request timeout
    pub timeout: Duration,
    /// Market type used when a call does not name one
    pub default_type: MarketType,
    /// Signed request validity window (ms); adapter default when unset
    pub recv_window: Option<u64>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> CliResult<Self> {
        // Load .env file if present (ignore errors)
        let _ = dotenvy::dotenv();

        Self::from_vars(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> CliResult<Self> {
        let credentials = match (var("BOURSE_API_KEY"), var("BOURSE_API_SECRET")) {
            (Some(key), Some(secret)) => Some(ApiCredentials::new(key, secret)),
            (None, None) => None,
            _ => {
                return Err(CliError::Config(
                    "BOURSE_API_KEY and BOURSE_API_SECRET must be set together".to_string(),
                ))
            },
        };

        let sandbox = match var("BOURSE_SANDBOX") {
            Some(raw) => parse_bool("BOURSE_SANDBOX", &raw)?,
            None => false,
        };

        let timeout_secs = match var("BOURSE_TIMEOUT_SECS") {
            Some(raw) => parse_number::<u64>("BOURSE_TIMEOUT_SECS", &raw)?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let default_type = match var("BOURSE_DEFAULT_TYPE") {
            Some(raw) => MarketType::from_str(&raw).map_err(|_| {
                CliError::Config(format!(
                    "Invalid BOURSE_DEFAULT_TYPE: {}. Expected: spot, margin, future, delivery",
                    raw
                ))
            })?,
            None => MarketType::Spot,
        };

        let recv_window = var("BOURSE_RECV_WINDOW")
            .map(|raw| parse_number::<u64>("BOURSE_RECV_WINDOW", &raw))
            .transpose()?;

        Ok(Self {
            credentials,
            sandbox,
            timeout: Duration::from_secs(timeout_secs),
            default_type,
            recv_window,
        })
    }

    /// Adapter configuration for these settings.
    pub fn binance_config(&self) -> BinanceConfig {
        BinanceConfig {
            credentials: self.credentials.clone(),
            sandbox: self.sandbox,
            timeout: self.timeout,
            options: OptionOverrides {
                default_type: Some(self.default_type),
                recv_window: self.recv_window,
                ..Default::default()
            },
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            credentials: None,
            sandbox: false,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            default_type: MarketType::Spot,
            recv_window: None,
        }
    }
}

fn parse_bool(key: &str, raw: &str) -> CliResult<bool> {
    match raw.to_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        other => Err(CliError::Config(format!("Invalid {} value: {}", key, other))),
    }
}

fn parse_number<T: FromStr>(key: &str, raw: &str) -> CliResult<T> {
    raw.parse::<T>()
        .map_err(|_| CliError::Config(format!("Invalid {} value: {}", key, raw)))
}

// =============================================================================
// Tests
// =============================================================================
