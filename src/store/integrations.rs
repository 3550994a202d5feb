// Crypto Miner Optimizer - Free and Open Source Software Statement
//
// This project, cmo, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/store/integrations.rs
// Version: 1.0.0
//
// Local replacements for the hosted integrations. `invoke_llm` routes on
// well-known prompt phrases to the simulation functions; `send_email` only
// appends to a capped outbox log.
//
// Tree Location:
// - src/store/integrations.rs (integration shims)
// - Depends on: simulation, store/client

use super::client::{Ack, OfflineClient, prepend_capped};
use super::error::StoreResult;
use super::seed::new_id;
use crate::core::{EntityKind, now_iso};
use crate::simulation::{
    MarketQuote, OptimizationPrediction, PriceQuote, simulate_optimization, simulate_prices,
};
use crate::storage::read_json;
use log::{debug, info};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

static LOG_TARGET: &str = "cmo::integrations";

pub const OPTIMIZATION_PHRASE: &str = "optimization engine for cryptocurrency mining gpus";
pub const MARKET_DATA_PHRASE: &str = "real-time cryptocurrency market data";
pub const PRICES_PHRASE: &str = "current cryptocurrency prices";
pub const FALLBACK_RESULT: &str = "Offline response generated locally.";

/// Payload returned by `invoke_llm`, shaped by the prompt it answers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LlmResponse {
    Optimization(OptimizationPrediction),
    MarketData {
        timestamp: String,
        coins: Vec<MarketQuote>,
    },
    Prices {
        prices: Vec<PriceQuote>,
    },
    Text {
        result: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailLogEntry {
    pub id: String,
    pub to: String,
    pub subject: String,
    pub body: String,
    pub timestamp: String,
}

impl OfflineClient {
    /// Answer `prompt` with locally simulated data.
    ///
    /// Matching is case-insensitive and checks the optimization phrase
    /// first, then market data, then prices.
    pub fn invoke_llm<R: Rng + ?Sized>(&self, prompt: &str, rng: &mut R) -> StoreResult<LlmResponse> {
        let lower = prompt.to_lowercase();

        if lower.contains(OPTIMIZATION_PHRASE) {
            debug!(target: LOG_TARGET, "🧠 Routing prompt to the optimization predictor");
            return Ok(LlmResponse::Optimization(simulate_optimization(prompt, rng)));
        }
        if lower.contains(MARKET_DATA_PHRASE) {
            debug!(target: LOG_TARGET, "📈 Routing prompt to the market data feed");
            let coins = self.entities(EntityKind::CryptoCurrency).list(None, None)?;
            return Ok(LlmResponse::MarketData {
                timestamp: now_iso(),
                coins: simulate_prices(&coins, rng),
            });
        }
        if lower.contains(PRICES_PHRASE) {
            debug!(target: LOG_TARGET, "💲 Routing prompt to the price feed");
            let coins = self.entities(EntityKind::CryptoCurrency).list(None, None)?;
            return Ok(LlmResponse::Prices {
                prices: simulate_prices(&coins, rng)
                    .into_iter()
                    .map(PriceQuote::from)
                    .collect(),
            });
        }

        Ok(LlmResponse::Text {
            result: FALLBACK_RESULT.to_string(),
        })
    }

    /// Append a message to the local outbox. Nothing is delivered.
    pub fn send_email(&self, to: &str, subject: &str, body: &str) -> StoreResult<Ack> {
        let entry = EmailLogEntry {
            id: new_id(),
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
            timestamp: now_iso(),
        };
        prepend_capped(
            self.storage(),
            &self.namespace().email_log_key(),
            serde_json::to_value(entry)?,
            self.config().email_log_cap,
        )?;
        info!(target: LOG_TARGET, "📧 Queued e-mail to {}: {}", to, subject);
        Ok(Ack::OK)
    }

    /// Newest-first outbox.
    pub fn email_log(&self) -> StoreResult<Vec<EmailLogEntry>> {
        let entries: Vec<Value> =
            read_json(self.storage(), &self.namespace().email_log_key())?.unwrap_or_default();
        Ok(entries
            .into_iter()
            .filter_map(|entry| serde_json::from_value(entry).ok())
            .collect())
    }
}
