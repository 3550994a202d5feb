// Crypto Miner Optimizer - Free and Open Source Software Statement
//
// This project, cmo, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/mining/profitability.rs
// Version: 1.0.0
//
// This file implements profitability accounting: the per-device estimate,
// the fleet overview, the per-algorithm comparison, profit snapshots and the
// simulated price refresh that feeds them.
//
// Tree Location:
// - src/mining/profitability.rs (profit accounting)
// - Depends on: store, simulation, mining/models

use super::models::{Coin, Gpu, ProfitSettings};
use crate::core::{EntityKind, Record, now_iso};
use crate::simulation::PriceQuote;
use crate::store::{LlmResponse, OfflineClient, StoreResult};
use log::{debug, info};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

const LOG_TARGET: &str = "cmo::mining::profitability";

/// Hardware price used for the return-on-investment estimate
pub const ESTIMATED_GPU_COST_USD: f64 = 800.0;

/// USD/kWh assumed by the algorithm comparison when no rate is configured
pub const DEFAULT_ELECTRICITY_COST: f64 = 0.12;

const HOURS_PER_DAY: f64 = 24.0;
const DAYS_PER_MONTH: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfitEstimate {
    pub daily_profit: f64,
    pub daily_revenue: f64,
    pub daily_electricity_cost: f64,
    pub monthly_profit: f64,
    /// -1 when the device does not earn
    pub roi_days: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpuProfit {
    pub gpu_id: String,
    pub gpu_name: String,
    pub coin_symbol: String,
    pub algorithm: Option<String>,
    #[serde(flatten)]
    pub estimate: ProfitEstimate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmProfit {
    pub algorithm: Option<String>,
    pub coin_symbol: String,
    pub daily_profit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfitabilityReport {
    pub devices: Vec<GpuProfit>,
    pub algorithms: Vec<AlgorithmProfit>,
    pub total_daily_profit: f64,
    pub total_monthly_profit: f64,
}

fn daily_power_cost(watts: f64, cost_per_kwh: f64) -> f64 {
    watts / 1000.0 * HOURS_PER_DAY * cost_per_kwh
}

/// Daily and monthly earnings of `gpu` mining `coin`.
pub fn calculate_profit(gpu: &Gpu, coin: &Coin, settings: &ProfitSettings) -> ProfitEstimate {
    let daily_reward = gpu.hashrate.unwrap_or(0.0) * coin.daily_reward_per_mh.unwrap_or(0.0);
    let gross_revenue = daily_reward * coin.price_usd;
    let daily_revenue = if settings.include_pool_fees {
        gross_revenue * (1.0 - settings.pool_fee_percent / 100.0)
    } else {
        gross_revenue
    };

    let daily_electricity_cost = daily_power_cost(
        gpu.power_draw.unwrap_or(0.0),
        settings.electricity_cost_per_kwh.unwrap_or(0.0),
    );
    let daily_profit = (daily_revenue - daily_electricity_cost) * settings.mode.multiplier();

    ProfitEstimate {
        daily_profit,
        daily_revenue,
        daily_electricity_cost,
        monthly_profit: daily_profit * DAYS_PER_MONTH,
        roi_days: if daily_profit > 0.0 {
            ESTIMATED_GPU_COST_USD / daily_profit
        } else {
            -1.0
        },
    }
}

/// Pair each device with the first active coin on its algorithm.
/// Devices without such a coin are left out.
pub fn profit_overview(gpus: &[Gpu], coins: &[Coin], settings: &ProfitSettings) -> Vec<GpuProfit> {
    gpus.iter()
        .filter_map(|gpu| {
            let coin = coins
                .iter()
                .find(|coin| coin.is_active && coin.algorithm == gpu.algorithm)?;
            Some(GpuProfit {
                gpu_id: gpu.gpu_id.clone(),
                gpu_name: gpu.name.clone(),
                coin_symbol: coin.symbol.clone(),
                algorithm: gpu.algorithm.clone(),
                estimate: calculate_profit(gpu, coin, settings),
            })
        })
        .collect()
}

/// Daily profit of an average fleet device on every active coin.
///
/// An empty fleet is modelled as one 50 MH/s, 150 W device. Pool fees and
/// the calculation mode do not apply here.
pub fn algorithm_comparison(
    gpus: &[Gpu],
    coins: &[Coin],
    settings: &ProfitSettings,
) -> Vec<AlgorithmProfit> {
    let (avg_hashrate, avg_power) = if gpus.is_empty() {
        (50.0, 150.0)
    } else {
        let count = gpus.len() as f64;
        (
            gpus.iter().map(|g| g.hashrate.unwrap_or(0.0)).sum::<f64>() / count,
            gpus.iter().map(|g| g.power_draw.unwrap_or(0.0)).sum::<f64>() / count,
        )
    };
    let cost_per_kwh = settings
        .electricity_cost_per_kwh
        .filter(|cost| *cost != 0.0)
        .unwrap_or(DEFAULT_ELECTRICITY_COST);

    coins
        .iter()
        .filter(|coin| coin.is_active)
        .map(|coin| {
            let revenue = avg_hashrate * coin.daily_reward_per_mh.unwrap_or(0.0) * coin.price_usd;
            AlgorithmProfit {
                algorithm: coin.algorithm.clone(),
                coin_symbol: coin.symbol.clone(),
                daily_profit: revenue - daily_power_cost(avg_power, cost_per_kwh),
            }
        })
        .collect()
}

pub fn load_gpus(client: &OfflineClient) -> StoreResult<Vec<Gpu>> {
    Ok(client
        .entities(EntityKind::Gpu)
        .list(None, None)?
        .iter()
        .map(Gpu::from_record)
        .collect())
}

pub fn load_coins(client: &OfflineClient) -> StoreResult<Vec<Coin>> {
    Ok(client
        .entities(EntityKind::CryptoCurrency)
        .list(None, None)?
        .iter()
        .map(Coin::from_record)
        .collect())
}

/// First `UserSettings` record, or empty settings when there is none.
pub fn load_settings(client: &OfflineClient) -> StoreResult<ProfitSettings> {
    Ok(client
        .entities(EntityKind::UserSettings)
        .list(None, Some(1))?
        .first()
        .map(ProfitSettings::from_record)
        .unwrap_or_default())
}

pub fn profitability_report(client: &OfflineClient) -> StoreResult<ProfitabilityReport> {
    let gpus = load_gpus(client)?;
    let coins = load_coins(client)?;
    let settings = load_settings(client)?;

    let devices = profit_overview(&gpus, &coins, &settings);
    let total_daily_profit: f64 = devices.iter().map(|d| d.estimate.daily_profit).sum();
    Ok(ProfitabilityReport {
        algorithms: algorithm_comparison(&gpus, &coins, &settings),
        total_monthly_profit: total_daily_profit * DAYS_PER_MONTH,
        total_daily_profit,
        devices,
    })
}

/// Store one `ProfitHistory` record per device/coin pair of the overview.
pub fn record_profit_snapshot(client: &OfflineClient) -> StoreResult<Vec<Record>> {
    let gpus = load_gpus(client)?;
    let coins = load_coins(client)?;
    let settings = load_settings(client)?;
    let history = client.entities(EntityKind::ProfitHistory);
    let timestamp = now_iso();

    let mut written = Vec::new();
    for gpu in &gpus {
        let Some(coin) = coins
            .iter()
            .find(|coin| coin.is_active && coin.algorithm == gpu.algorithm)
        else {
            continue;
        };
        let estimate = calculate_profit(gpu, coin, &settings);
        let entry = json!({
            "gpu_id": gpu.gpu_id,
            "gpu_name": gpu.name,
            "coin_symbol": coin.symbol,
            "algorithm": gpu.algorithm,
            "hashrate": gpu.hashrate.unwrap_or(0.0),
            "power_draw": gpu.power_draw.unwrap_or(0.0),
            "coin_price": coin.price_usd,
            "electricity_cost_per_kwh": settings.electricity_cost_per_kwh.unwrap_or(0.0),
            "daily_revenue": estimate.daily_revenue,
            "daily_electricity_cost": estimate.daily_electricity_cost,
            "daily_profit": estimate.daily_profit,
            "timestamp": timestamp,
        });
        if let Value::Object(record) = entry {
            written.push(history.create(record)?);
        }
    }

    info!(target: LOG_TARGET, "💰 Recorded {} profit snapshots", written.len());
    Ok(written)
}

/// Ask the simulated price feed for fresh quotes, update the matching coins
/// and append a `CryptoPriceHistory` entry for each.
pub fn refresh_prices<R: Rng + ?Sized>(
    client: &OfflineClient,
    rng: &mut R,
) -> StoreResult<Vec<PriceQuote>> {
    let coins = client.entities(EntityKind::CryptoCurrency);
    let listed = coins.list(None, None)?;
    let names: Vec<String> = listed.iter().map(|c| Coin::from_record(c).name).collect();
    let prompt = format!(
        "Get current cryptocurrency prices for: {}. Return the current USD price, 24h price change percentage, and market cap for each coin.",
        names.join(", ")
    );

    let prices = match client.invoke_llm(&prompt, rng)? {
        LlmResponse::Prices { prices } => prices,
        _ => Vec::new(),
    };

    let history = client.entities(EntityKind::CryptoPriceHistory);
    let mut refreshed = Vec::new();
    for record in &listed {
        let coin = Coin::from_record(record);
        let Some(quote) = prices
            .iter()
            .find(|q| q.symbol.as_deref() == Some(coin.symbol.as_str()))
        else {
            continue;
        };
        let timestamp = now_iso();

        let mut patch = Record::new();
        patch.insert("price_usd".to_string(), json!(quote.price_usd));
        patch.insert("price_change_24h".to_string(), json!(quote.price_change_24h));
        patch.insert("last_updated".to_string(), json!(timestamp));
        coins.update(&coin.id, patch)?;

        let mut entry = Record::new();
        entry.insert("coin_symbol".to_string(), json!(coin.symbol));
        entry.insert("coin_name".to_string(), json!(coin.name));
        entry.insert("price_usd".to_string(), json!(quote.price_usd));
        entry.insert("market_cap".to_string(), json!(quote.market_cap));
        entry.insert("price_change_24h".to_string(), json!(quote.price_change_24h));
        entry.insert("timestamp".to_string(), json!(timestamp));
        history.create(entry)?;

        debug!(target: LOG_TARGET, "{} now at ${:.4}", coin.symbol, quote.price_usd);
        refreshed.push(quote.clone());
    }

    info!(target: LOG_TARGET, "📈 Refreshed prices for {} coins", refreshed.len());
    Ok(refreshed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mining::models::CalculationMode;

    fn gpu(hashrate: f64, power: f64, algorithm: &str) -> Gpu {
        Gpu {
            gpu_id: "GPU-X".to_string(),
            hashrate: Some(hashrate),
            power_draw: Some(power),
            algorithm: Some(algorithm.to_string()),
            ..Gpu::default()
        }
    }

    fn coin(symbol: &str, algorithm: &str, price: f64, reward: f64) -> Coin {
        Coin {
            id: symbol.to_lowercase(),
            symbol: symbol.to_string(),
            name: symbol.to_string(),
            algorithm: Some(algorithm.to_string()),
            price_usd: price,
            price_change_24h: 0.0,
            market_cap: None,
            daily_reward_per_mh: Some(reward),
            network_hashrate: None,
            is_active: true,
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn standard_profit() {
        let settings = ProfitSettings {
            electricity_cost_per_kwh: Some(0.12),
            ..ProfitSettings::default()
        };
        let estimate = calculate_profit(&gpu(100.0, 250.0, "Ethash"), &coin("ETC", "Ethash", 20.0, 0.001), &settings);

        // revenue 100 * 0.001 * 20 = 2.0, power 0.25 kW * 24 h * 0.12 = 0.72
        assert!(close(estimate.daily_revenue, 2.0));
        assert!(close(estimate.daily_electricity_cost, 0.72));
        assert!(close(estimate.daily_profit, 1.28));
        assert!(close(estimate.monthly_profit, 38.4));
        assert!(close(estimate.roi_days, 800.0 / 1.28));
    }

    #[test]
    fn pool_fees_and_mode() {
        let settings = ProfitSettings {
            electricity_cost_per_kwh: Some(0.0),
            include_pool_fees: true,
            pool_fee_percent: 10.0,
            mode: CalculationMode::Conservative,
            ..ProfitSettings::default()
        };
        let estimate = calculate_profit(&gpu(100.0, 250.0, "Ethash"), &coin("ETC", "Ethash", 20.0, 0.001), &settings);
        assert!(close(estimate.daily_revenue, 1.8));
        assert!(close(estimate.daily_profit, 1.8 * 0.9));
    }

    #[test]
    fn losing_device_has_no_roi() {
        let settings = ProfitSettings {
            electricity_cost_per_kwh: Some(0.5),
            ..ProfitSettings::default()
        };
        let estimate = calculate_profit(&gpu(1.0, 300.0, "KawPow"), &coin("RVN", "KawPow", 0.02, 0.002), &settings);
        assert!(estimate.daily_profit < 0.0);
        assert_eq!(estimate.roi_days, -1.0);
    }

    #[test]
    fn overview_skips_devices_without_active_coin() {
        let mut inactive = coin("RVN", "KawPow", 0.02, 0.002);
        inactive.is_active = false;
        let coins = vec![coin("ETC", "Ethash", 20.0, 0.001), inactive];
        let gpus = vec![gpu(100.0, 250.0, "Ethash"), gpu(60.0, 200.0, "KawPow")];

        let overview = profit_overview(&gpus, &coins, &ProfitSettings::default());
        assert_eq!(overview.len(), 1);
        assert_eq!(overview[0].coin_symbol, "ETC");
    }

    #[test]
    fn comparison_uses_fleet_average_and_default_rate() {
        let coins = vec![coin("ETC", "Ethash", 20.0, 0.001)];
        let gpus = vec![gpu(100.0, 200.0, "Ethash"), gpu(50.0, 100.0, "KawPow")];

        let rows = algorithm_comparison(&gpus, &coins, &ProfitSettings::default());
        // avg 75 MH/s, 150 W: 75 * 0.001 * 20 - 0.15 * 24 * 0.12
        assert!(close(rows[0].daily_profit, 1.5 - 0.432));

        let empty = algorithm_comparison(&[], &coins, &ProfitSettings::default());
        assert!(close(empty[0].daily_profit, 1.0 - 0.432));
    }

    #[test]
    fn seeded_report_covers_both_devices() {
        let client = OfflineClient::in_memory();
        let report = profitability_report(&client).unwrap();
        assert_eq!(report.devices.len(), 2);
        assert_eq!(report.algorithms.len(), 2);
        let total: f64 = report.devices.iter().map(|d| d.estimate.daily_profit).sum();
        assert!(close(report.total_daily_profit, total));
    }
}
