// Crypto Miner Optimizer - Free and Open Source Software Statement
//
// This project, cmo, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/mining/models.rs
// Version: 1.0.0
//
// Typed read views over the untyped entity records. Every field is optional
// or defaulted, so a record written by hand or by an older build still yields
// a view; values of the wrong JSON type read as absent. Views are never
// written back, the workflows patch the records themselves.
//
// Tree Location:
// - src/mining/models.rs (typed record views)
// - Depends on: serde_json, core/types

use crate::core::{ClockSettings, Record};
use serde_json::Value;

pub fn number(record: &Record, field: &str) -> Option<f64> {
    record.get(field).and_then(Value::as_f64)
}

pub fn text(record: &Record, field: &str) -> Option<String> {
    record.get(field).and_then(Value::as_str).map(str::to_string)
}

pub fn flag(record: &Record, field: &str) -> Option<bool> {
    record.get(field).and_then(Value::as_bool)
}

/// Treats 0 like a missing value, the way the dashboard's `x || fallback` does.
pub fn nonzero_or(value: Option<f64>, fallback: f64) -> f64 {
    value.filter(|v| *v != 0.0).unwrap_or(fallback)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Gpu {
    pub id: String,
    pub gpu_id: String,
    pub name: String,
    pub status: Option<String>,
    pub algorithm: Option<String>,
    pub core_clock: Option<f64>,
    pub memory_clock: Option<f64>,
    pub power_limit: Option<f64>,
    pub hashrate: Option<f64>,
    pub power_draw: Option<f64>,
    pub efficiency: Option<f64>,
    pub temperature: Option<f64>,
    pub fan_speed: Option<f64>,
}

impl Gpu {
    pub fn from_record(record: &Record) -> Self {
        Self {
            id: text(record, "id").unwrap_or_default(),
            gpu_id: text(record, "gpu_id").unwrap_or_default(),
            name: text(record, "name").unwrap_or_default(),
            status: text(record, "status"),
            algorithm: text(record, "algorithm"),
            core_clock: number(record, "core_clock"),
            memory_clock: number(record, "memory_clock"),
            power_limit: number(record, "power_limit"),
            hashrate: number(record, "hashrate"),
            power_draw: number(record, "power_draw"),
            efficiency: number(record, "efficiency"),
            temperature: number(record, "temperature"),
            fan_speed: number(record, "fan_speed"),
        }
    }

    /// Current clocks, using 1500 MHz / 2000 MHz / 100 % for anything unset.
    pub fn clocks(&self) -> ClockSettings {
        ClockSettings {
            core_clock: nonzero_or(self.core_clock, 1500.0).round() as i64,
            memory_clock: nonzero_or(self.memory_clock, 2000.0).round() as i64,
            power_limit: nonzero_or(self.power_limit, 100.0).round() as i64,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Coin {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub algorithm: Option<String>,
    pub price_usd: f64,
    pub price_change_24h: f64,
    pub market_cap: Option<f64>,
    pub daily_reward_per_mh: Option<f64>,
    pub network_hashrate: Option<f64>,
    /// Coins without an explicit flag count as active.
    pub is_active: bool,
}

impl Coin {
    pub fn from_record(record: &Record) -> Self {
        Self {
            id: text(record, "id").unwrap_or_default(),
            symbol: text(record, "symbol").unwrap_or_default(),
            name: text(record, "name").unwrap_or_default(),
            algorithm: text(record, "algorithm"),
            price_usd: number(record, "price_usd").unwrap_or(0.0),
            price_change_24h: number(record, "price_change_24h").unwrap_or(0.0),
            market_cap: number(record, "market_cap"),
            daily_reward_per_mh: number(record, "daily_reward_per_mh"),
            network_hashrate: number(record, "network_hashrate"),
            is_active: flag(record, "is_active").unwrap_or(true),
        }
    }
}

/// How optimistic the profit projection should be
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CalculationMode {
    #[default]
    Standard,
    Conservative,
    Optimistic,
}

impl CalculationMode {
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("conservative") => CalculationMode::Conservative,
            Some("optimistic") => CalculationMode::Optimistic,
            _ => CalculationMode::Standard,
        }
    }

    pub fn multiplier(self) -> f64 {
        match self {
            CalculationMode::Standard => 1.0,
            CalculationMode::Conservative => 0.9,
            CalculationMode::Optimistic => 1.1,
        }
    }
}

/// Profit inputs kept in the `UserSettings` record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfitSettings {
    pub id: Option<String>,
    pub electricity_cost_per_kwh: Option<f64>,
    pub include_pool_fees: bool,
    pub pool_fee_percent: f64,
    pub mode: CalculationMode,
}

impl ProfitSettings {
    pub fn from_record(record: &Record) -> Self {
        Self {
            id: text(record, "id"),
            electricity_cost_per_kwh: number(record, "electricity_cost_per_kwh"),
            include_pool_fees: flag(record, "include_pool_fees").unwrap_or(false),
            pool_fee_percent: number(record, "pool_fee_percent").unwrap_or(0.0),
            mode: CalculationMode::parse(record.get("profit_calculation_mode").and_then(Value::as_str)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GpuProfile {
    pub id: String,
    pub name: String,
    pub gpu_id: Option<String>,
    pub gpu_name: Option<String>,
    pub algorithm: Option<String>,
    pub core_clock: Option<f64>,
    pub memory_clock: Option<f64>,
    pub power_limit: Option<f64>,
}

impl GpuProfile {
    pub fn from_record(record: &Record) -> Self {
        Self {
            id: text(record, "id").unwrap_or_default(),
            name: text(record, "name").unwrap_or_default(),
            gpu_id: text(record, "gpu_id"),
            gpu_name: text(record, "gpu_name"),
            algorithm: text(record, "algorithm"),
            core_clock: number(record, "core_clock"),
            memory_clock: number(record, "memory_clock"),
            power_limit: number(record, "power_limit"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfitHistoryEntry {
    pub gpu_id: String,
    pub coin_symbol: String,
    pub daily_profit: f64,
}

impl ProfitHistoryEntry {
    pub fn from_record(record: &Record) -> Self {
        Self {
            gpu_id: text(record, "gpu_id").unwrap_or_default(),
            coin_symbol: text(record, "coin_symbol").unwrap_or_default(),
            daily_profit: number(record, "daily_profit").unwrap_or(0.0),
        }
    }
}

/// Stored coin-switch recommendation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SwitchPrediction {
    pub id: String,
    pub gpu_id: String,
    pub predicted_coin: Option<String>,
    pub predicted_algorithm: Option<String>,
    pub predicted_profit_24h: f64,
    pub recommended_settings: Option<ClockSettings>,
}

impl SwitchPrediction {
    pub fn from_record(record: &Record) -> Self {
        let recommended_settings = record
            .get("recommended_settings")
            .cloned()
            .and_then(|value| serde_json::from_value(value).ok());
        Self {
            id: text(record, "id").unwrap_or_default(),
            gpu_id: text(record, "gpu_id").unwrap_or_default(),
            predicted_coin: text(record, "predicted_coin"),
            predicted_algorithm: text(record, "predicted_algorithm"),
            predicted_profit_24h: number(record, "predicted_profit_24h").unwrap_or(0.0),
            recommended_settings,
        }
    }
}
