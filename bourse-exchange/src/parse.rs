//! Batch helpers shared by response normalizers.

use rust_decimal::Decimal;
use std::collections::HashMap;

use bourse_domain::{Balance, Balances, DomainError, OrderBookLevel, Timestamped};

/// Sort by timestamp, keep items at or after `since`, then cap at `limit`.
///
/// Without `since` the most recent `limit` items are kept; with it the
/// earliest `limit` items from `since` onwards.
pub fn filter_by_since_limit<T: Timestamped>(
    mut items: Vec<T>,
    since: Option<i64>,
    limit: Option<u32>,
) -> Vec<T> {
    items.sort_by_key(|item| item.timestamp());

    if let Some(since) = since {
        items.retain(|item| item.timestamp().is_some_and(|ts| ts >= since));
    }

    if let Some(limit) = limit.map(|l| l as usize) {
        if items.len() > limit {
            if since.is_some() {
                items.truncate(limit);
            } else {
                items.drain(..items.len() - limit);
            }
        }
    }

    items
}

/// Sort one side of a book: bids descending, asks ascending.
pub fn sort_book_side(mut levels: Vec<OrderBookLevel>, descending: bool) -> Vec<OrderBookLevel> {
    if descending {
        levels.sort_by(|a, b| b.price.cmp(&a.price));
    } else {
        levels.sort_by(|a, b| a.price.cmp(&b.price));
    }
    levels
}

/// Build price levels from `[price, amount]` pairs.
pub fn book_levels(pairs: &[(Decimal, Decimal)]) -> Vec<OrderBookLevel> {
    pairs
        .iter()
        .map(|(price, amount)| OrderBookLevel::new(*price, *amount))
        .collect()
}

/// Assemble account balances, summing entries reported twice for a code.
pub fn build_balances(
    entries: impl IntoIterator<Item = (String, Balance)>,
    timestamp: Option<i64>,
    info: serde_json::Value,
) -> Result<Balances, DomainError> {
    let mut currencies: HashMap<String, Balance> = HashMap::new();
    for (code, balance) in entries {
        let merged = match currencies.get(&code) {
            Some(existing) => {
                let sum = |a: Decimal, b: Decimal| {
                    a.checked_add(b)
                        .ok_or_else(|| DomainError::AmountOverflow(format!("{} balance", code)))
                };
                Balance::from_parts(
                    Some(sum(existing.free, balance.free)?),
                    Some(sum(existing.used, balance.used)?),
                    None,
                )?
            },
            None => balance,
        };
        currencies.insert(code, merged);
    }

    Ok(Balances { timestamp, currencies, info })
}

/// Exchange-supplied cost, or `price * amount` when both are known.
///
/// A product outside the decimal range leaves the cost unknown.
pub fn safe_cost(
    cost: Option<Decimal>,
    price: Option<Decimal>,
    amount: Option<Decimal>,
) -> Option<Decimal> {
    cost.or_else(|| price?.checked_mul(amount?))
}
