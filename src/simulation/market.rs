// Crypto Miner Optimizer - Free and Open Source Software Statement
//
// This project, cmo, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/simulation/market.rs
// Version: 1.0.0
//
// Offline market feed: perturbs the stored coin figures by bounded random
// multipliers.

use crate::core::Record;
use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const LOG_TARGET: &str = "cmo::simulation::market";

/// Lowest price the feed will report.
pub const MIN_PRICE_USD: f64 = 0.0001;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketQuote {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub price_usd: f64,
    pub price_change_24h: f64,
    pub market_cap: f64,
    pub volume_24h: f64,
}

/// The subset of a quote reported by the "current prices" call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    pub price_usd: f64,
    pub price_change_24h: f64,
    pub market_cap: f64,
}

impl From<MarketQuote> for PriceQuote {
    fn from(quote: MarketQuote) -> Self {
        Self {
            symbol: quote.symbol,
            price_usd: quote.price_usd,
            price_change_24h: quote.price_change_24h,
            market_cap: quote.market_cap,
        }
    }
}

/// Number stored under `field`, treating missing, non-numeric and zero as absent.
fn positive_or_absent(coin: &Record, field: &str) -> Option<f64> {
    coin.get(field)
        .and_then(Value::as_f64)
        .filter(|value| *value != 0.0)
}

/// One simulated quote per coin record, in input order.
pub fn simulate_prices<R: Rng + ?Sized>(coins: &[Record], rng: &mut R) -> Vec<MarketQuote> {
    debug!(target: LOG_TARGET, "Simulating quotes for {} coins", coins.len());

    coins
        .iter()
        .map(|coin| {
            let base = positive_or_absent(coin, "price_usd").unwrap_or(1.0);
            let variance = base * (0.02 + rng.gen_range(0.0..1.0) * 0.04);
            let change = (rng.gen_range(0.0..1.0) - 0.5) * 6.0;
            let price = if rng.gen_bool(0.5) {
                base + variance
            } else {
                base - variance
            };
            let cap_base = positive_or_absent(coin, "market_cap").unwrap_or(base * 100_000_000.0);

            MarketQuote {
                symbol: coin.get("symbol").and_then(Value::as_str).map(str::to_string),
                name: coin.get("name").and_then(Value::as_str).map(str::to_string),
                price_usd: price.max(MIN_PRICE_USD),
                price_change_24h: change,
                market_cap: cap_base * (0.98 + rng.gen_range(0.0..1.0) * 0.04),
                volume_24h: base * 20_000_000.0 * (0.6 + rng.gen_range(0.0..1.0) * 0.8),
            }
        })
        .collect()
}
