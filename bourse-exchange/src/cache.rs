//! Market metadata cache.
//!
//! Markets and currencies are loaded once per client and shared as an
//! immutable snapshot. A reload swaps the whole snapshot; concurrent
//! loads race and the last writer wins.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use bourse_domain::{Currency, Market};

use crate::error::ExchangeResult;

/// Immutable index of markets and currencies.
#[derive(Debug, Clone, Default)]
pub struct MarketSnapshot {
    markets: HashMap<String, Arc<Market>>,
    markets_by_id: HashMap<String, Arc<Market>>,
    currencies: HashMap<String, Arc<Currency>>,
}

impl MarketSnapshot {
    /// Index markets by symbol and id.
    ///
    /// When two markets share a symbol or an id the first one listed is
    /// kept.
    pub fn new(markets: Vec<Market>, currencies: HashMap<String, Currency>) -> Self {
        let mut snapshot = Self::default();

        for market in markets {
            let market = Arc::new(market);
            snapshot
                .markets_by_id
                .entry(market.id.clone())
                .or_insert_with(|| market.clone());
            snapshot.markets.entry(market.symbol.clone()).or_insert(market);
        }

        snapshot.currencies = currencies
            .into_iter()
            .map(|(code, currency)| (code, Arc::new(currency)))
            .collect();

        snapshot
    }

    /// Market by unified symbol.
    pub fn market(&self, symbol: &str) -> Option<&Arc<Market>> {
        self.markets.get(symbol)
    }

    /// Market by exchange id.
    pub fn market_by_id(&self, id: &str) -> Option<&Arc<Market>> {
        self.markets_by_id.get(id)
    }

    /// Currency by unified code.
    pub fn currency(&self, code: &str) -> Option<&Arc<Currency>> {
        self.currencies.get(code)
    }

    /// All markets.
    pub fn markets(&self) -> impl Iterator<Item = &Arc<Market>> {
        self.markets.values()
    }

    /// Number of markets.
    pub fn len(&self) -> usize {
        self.markets.len()
    }

    /// No markets loaded.
    pub fn is_empty(&self) -> bool {
        self.markets.is_empty()
    }
}

/// Load-once holder of the current snapshot.
#[derive(Default)]
pub struct MarketCache {
    snapshot: RwLock<Option<Arc<MarketSnapshot>>>,
}

impl MarketCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot, if loaded.
    pub async fn get(&self) -> Option<Arc<MarketSnapshot>> {
        self.snapshot.read().await.clone()
    }

    /// Return the cached snapshot, or run `loader` and cache its result.
    ///
    /// With `reload` the loader always runs. A failed load leaves the
    /// previous snapshot in place.
    pub async fn load_with<F, Fut>(&self, reload: bool, loader: F) -> ExchangeResult<Arc<MarketSnapshot>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ExchangeResult<MarketSnapshot>>,
    {
        if !reload {
            if let Some(snapshot) = self.get().await {
                debug!(markets = snapshot.len(), "Markets served from cache");
                return Ok(snapshot);
            }
        }

        let snapshot = Arc::new(loader().await?);
        *self.snapshot.write().await = Some(snapshot.clone());

        info!(
            markets = snapshot.len(),
            currencies = snapshot.currencies.len(),
            "Markets loaded"
        );
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExchangeError;
    use bourse_domain::{MarketLimits, MarketPrecision, MarketType};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn market(id: &str, symbol: &str, market_type: MarketType) -> Market {
        let (base, quote) = Market::split_symbol(symbol).unwrap();
        Market {
            id: id.to_string(),
            symbol: symbol.to_string(),
            base: base.to_string(),
            quote: quote.to_string(),
            base_id: base.to_string(),
            quote_id: quote.to_string(),
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
    fn test_first_listed_market_owns_symbol() {
        let snapshot = MarketSnapshot::new(
            vec![
                market("BTCUSDT", "BTC/USDT", MarketType::Spot),
                market("BTCUSDT", "BTC/USDT", MarketType::Future),
            ],
            HashMap::new(),
        );

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.market("BTC/USDT").unwrap().market_type, MarketType::Spot);
        assert_eq!(snapshot.market_by_id("BTCUSDT").unwrap().market_type, MarketType::Spot);
        assert!(snapshot.market("ETH/USDT").is_none());
    }

    #[tokio::test]
    async fn test_loader_runs_once_unless_reloaded() {
        let cache = MarketCache::new();
        let counter = AtomicUsize::new(0);
        let loads = &counter;
        let loader = move || async move {
            loads.fetch_add(1, Ordering::SeqCst);
            Ok::<_, ExchangeError>(MarketSnapshot::new(
                vec![market("ETHBTC", "ETH/BTC", MarketType::Spot)],
                HashMap::new(),
            ))
        };

        cache.load_with(false, loader).await.unwrap();
        cache.load_with(false, loader).await.unwrap();
        assert_eq!(loads.load(Ordering::SeqCst), 1);

        cache.load_with(true, loader).await.unwrap();
        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_previous_snapshot() {
        let cache = MarketCache::new();
        cache
            .load_with(false, || async {
                Ok(MarketSnapshot::new(
                    vec![market("ETHBTC", "ETH/BTC", MarketType::Spot)],
                    HashMap::new(),
                ))
            })
            .await
            .unwrap();

        let result = cache
            .load_with(true, || async { Err(ExchangeError::Network("down".into())) })
            .await;

        assert!(result.is_err());
        assert_eq!(cache.get().await.unwrap().len(), 1);
    }
}
