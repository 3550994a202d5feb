// Crypto Miner Optimizer - Free and Open Source Software Statement
//
// This project, cmo, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/core/types.rs
// Version: 1.0.0
//
// This file defines core data structures for cmo, located in the core
// subdirectory. It includes the command-line arguments and subcommands, the
// closed set of entity collections, and the untyped record representation
// shared by the store, the simulations and the HTTP API.
//
// Tree Location:
// - src/core/types.rs (core data structures)
// - Depends on: clap, serde, serde_json, thiserror

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// One stored JSON object. Field order is preserved.
pub type Record = Map<String, Value>;

/// Named collections held by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Gpu,
    GpuProfile,
    CryptoCurrency,
    ProfitHistory,
    CryptoPriceHistory,
    CoinSwitchPrediction,
    AutomationRule,
    HardwareAlert,
    AiTrainingData,
    AiModelHistory,
    OptimizationLog,
    BenchmarkResult,
    PriceAlert,
    UserSettings,
}

impl EntityKind {
    pub const ALL: [EntityKind; 14] = [
        EntityKind::Gpu,
        EntityKind::GpuProfile,
        EntityKind::CryptoCurrency,
        EntityKind::ProfitHistory,
        EntityKind::CryptoPriceHistory,
        EntityKind::CoinSwitchPrediction,
        EntityKind::AutomationRule,
        EntityKind::HardwareAlert,
        EntityKind::AiTrainingData,
        EntityKind::AiModelHistory,
        EntityKind::OptimizationLog,
        EntityKind::BenchmarkResult,
        EntityKind::PriceAlert,
        EntityKind::UserSettings,
    ];

    /// Collection name as it appears in storage keys and API paths
    pub const fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Gpu => "GPU",
            EntityKind::GpuProfile => "GPUProfile",
            EntityKind::CryptoCurrency => "CryptoCurrency",
            EntityKind::ProfitHistory => "ProfitHistory",
            EntityKind::CryptoPriceHistory => "CryptoPriceHistory",
            EntityKind::CoinSwitchPrediction => "CoinSwitchPrediction",
            EntityKind::AutomationRule => "AutomationRule",
            EntityKind::HardwareAlert => "HardwareAlert",
            EntityKind::AiTrainingData => "AITrainingData",
            EntityKind::AiModelHistory => "AIModelHistory",
            EntityKind::OptimizationLog => "OptimizationLog",
            EntityKind::BenchmarkResult => "BenchmarkResult",
            EntityKind::PriceAlert => "PriceAlert",
            EntityKind::UserSettings => "UserSettings",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown entity: {name}")]
pub struct UnknownEntityError {
    pub name: String,
}

impl FromStr for EntityKind {
    type Err = UnknownEntityError;

    /// Matches collection names case-insensitively ("GPU", "gpu", "GpuProfile").
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let trimmed = name.trim();
        EntityKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownEntityError {
                name: name.to_string(),
            })
    }
}

/// Tunable clocks of one device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockSettings {
    /// MHz
    pub core_clock: i64,
    /// MHz
    pub memory_clock: i64,
    /// Percent of the board power
    pub power_limit: i64,
}

impl ClockSettings {
    /// Conservative clocks used when a device misbehaves.
    pub const SAFE_MODE: ClockSettings = ClockSettings {
        core_clock: 1200,
        memory_clock: 1500,
        power_limit: 70,
    };
}

/// Command-line arguments for the cmo tool
#[derive(Parser, Debug)]
#[command(
    name = "cmo",
    version,
    about = "Offline data layer for the Crypto Miner Optimizer GPU mining dashboard",
    long_about = "cmo manages the local entity store behind the Crypto Miner Optimizer dashboard.\n\
                  Devices, profiles, coins, logs and predictions are kept as JSON collections in a\n\
                  data directory (or in memory), and every \"AI\" or market call is simulated locally.\n\n\
                  Examples:\n\
                    List devices:      cmo --data-dir ./data list GPU --sort -created_date\n\
                    Add a device:      cmo --data-dir ./data create GPU '{\"gpu_id\":\"GPU-003\",\"name\":\"Test\"}'\n\
                    Optimize a device: cmo --data-dir ./data optimize GPU-001\n\
                    Local API:         cmo --data-dir ./data serve --bind 127.0.0.1:8080"
)]
pub struct Args {
    /// Directory holding one JSON file per storage key
    /// Omit together with --memory to keep everything in memory
    #[arg(
        long,
        global = true,
        value_name = "DIR",
        help = "Data directory for the file-backed store"
    )]
    pub data_dir: Option<PathBuf>,

    /// Use the in-memory store (nothing survives the process)
    #[arg(
        long,
        global = true,
        default_value = "false",
        help = "Keep the store in memory only"
    )]
    pub memory: bool,

    /// Namespace prefix for every storage key
    #[arg(
        long,
        global = true,
        default_value = "cmo_",
        value_name = "PREFIX",
        help = "Storage key prefix"
    )]
    pub prefix: String,

    /// Log level: error, warn, info, debug, trace
    #[arg(
        long,
        global = true,
        default_value = "info",
        value_name = "LEVEL",
        help = "Log level [error, warn, info, debug, trace]"
    )]
    pub log_level: String,

    /// Also write logs to this file
    #[arg(long, global = true, value_name = "FILE", help = "Optional log file")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Write the starter records (no-op once seeded)
    Seed,
    /// List the records of one entity
    List {
        entity: EntityKind,
        /// Field to sort by, prefix with '-' for descending
        #[arg(long, allow_hyphen_values = true, value_name = "FIELD")]
        sort: Option<String>,
        #[arg(long, value_name = "COUNT")]
        limit: Option<usize>,
    },
    /// Show a single record
    Get { entity: EntityKind, id: String },
    /// Create a record from a JSON object
    Create { entity: EntityKind, json: String },
    /// Merge a JSON object onto a record (creates it when missing)
    Update {
        entity: EntityKind,
        id: String,
        json: String,
    },
    /// Delete a record by id
    Delete { entity: EntityKind, id: String },
    /// Run the simulated AI optimizer against a device (by gpu_id)
    Optimize { gpu_id: String },
    /// Run a simulated benchmark and store the result
    Benchmark {
        gpu_id: String,
        /// Algorithm to benchmark (defaults to the device's current one)
        #[arg(long)]
        algorithm: Option<String>,
        #[arg(long, default_value = "8", value_name = "SECONDS")]
        duration: u64,
    },
    /// Restart a device remotely
    Restart { gpu_id: String },
    /// Write clocks to a device remotely
    RemoteSettings {
        gpu_id: String,
        #[arg(long, value_name = "MHZ")]
        core_clock: i64,
        #[arg(long, value_name = "MHZ")]
        memory_clock: i64,
        #[arg(long, value_name = "PERCENT")]
        power_limit: i64,
    },
    /// Load a saved profile onto its device remotely
    RemoteProfile { profile_id: String },
    /// Make a profile the default of its device
    DefaultProfile { profile_id: String },
    /// Copy a profile under "<name> (Copy)"
    CopyProfile { profile_id: String },
    /// Train the optimizer model on the stored benchmarks
    Train,
    /// Train the failure predictor on alerts and training samples
    TrainFailureModel,
    /// Assess the failure risk of a device
    Health {
        gpu_id: String,
        /// Apply every recommendation of the assessment
        #[arg(long)]
        apply: bool,
    },
    /// Drop a device to safe clocks
    SafeMode { gpu_id: String },
    /// Refresh coin prices with the market simulator
    Prices,
    /// Show per-device profitability and the algorithm comparison
    Profit,
    /// Generate coin-switch predictions for every device
    Predict,
    /// Serve the local HTTP API
    Serve {
        #[arg(long, default_value = "127.0.0.1:8080", value_name = "HOST:PORT")]
        bind: String,
    },
}

impl Args {
    pub fn validate(&self) -> Result<(), String> {
        if self.memory && self.data_dir.is_some() {
            return Err("--memory and --data-dir cannot be used together".to_string());
        }
        if !self.memory && self.data_dir.is_none() {
            return Err("A data directory is required. Use --data-dir DIR or --memory".to_string());
        }

        if self.prefix.is_empty() {
            return Err("Storage prefix cannot be empty".to_string());
        }
        if !self
            .prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(
                "Storage prefix may only contain letters, digits, '_' and '-'".to_string(),
            );
        }

        if self.log_level.parse::<log::LevelFilter>().is_err() {
            return Err(format!(
                "Invalid log level '{}'. Use error, warn, info, debug or trace",
                self.log_level
            ));
        }

        if let Command::Serve { bind } = &self.command {
            if bind.parse::<std::net::SocketAddr>().is_err() {
                return Err(format!(
                    "Bind address must be in format HOST:PORT (e.g., 127.0.0.1:8080), got '{}'",
                    bind
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_names_round_trip() {
        for kind in EntityKind::ALL {
            assert_eq!(kind.as_str().parse::<EntityKind>(), Ok(kind));
        }
    }

    #[test]
    fn entity_parse_ignores_case() {
        assert_eq!("gpu".parse::<EntityKind>(), Ok(EntityKind::Gpu));
        assert_eq!(
            "aitrainingdata".parse::<EntityKind>(),
            Ok(EntityKind::AiTrainingData)
        );
        assert!("Wallet".parse::<EntityKind>().is_err());
    }

    #[test]
    fn validate_requires_exactly_one_backend() {
        let args = Args::parse_from(["cmo", "seed"]);
        assert!(args.validate().is_err());

        let args = Args::parse_from(["cmo", "--memory", "--data-dir", "/tmp/x", "seed"]);
        assert!(args.validate().is_err());

        let args = Args::parse_from(["cmo", "--memory", "seed"]);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn validate_checks_bind_address_and_level() {
        let args = Args::parse_from(["cmo", "--memory", "serve", "--bind", "localhost"]);
        assert!(args.validate().is_err());

        let args = Args::parse_from(["cmo", "--memory", "--log-level", "loud", "seed"]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn remote_settings_take_all_clocks() {
        let args = Args::parse_from([
            "cmo",
            "--memory",
            "remote-settings",
            "GPU-001",
            "--core-clock",
            "2100",
            "--memory-clock",
            "9500",
            "--power-limit",
            "60",
        ]);
        match args.command {
            Command::RemoteSettings {
                gpu_id,
                core_clock,
                memory_clock,
                power_limit,
            } => {
                assert_eq!(gpu_id, "GPU-001");
                assert_eq!((core_clock, memory_clock, power_limit), (2100, 9500, 60));
            }
            other => panic!("unexpected command {:?}", other),
        }

        let args = Args::parse_from(["cmo", "--memory", "health", "GPU-002", "--apply"]);
        assert!(matches!(args.command, Command::Health { apply: true, .. }));
        assert!(Args::try_parse_from(["cmo", "--memory", "remote-settings", "GPU-001"]).is_err());
    }

    #[test]
    fn list_accepts_descending_sort() {
        let args = Args::parse_from([
            "cmo",
            "--memory",
            "list",
            "GPU",
            "--sort",
            "-created_date",
            "--limit",
            "5",
        ]);
        match args.command {
            Command::List {
                entity,
                sort,
                limit,
            } => {
                assert_eq!(entity, EntityKind::Gpu);
                assert_eq!(sort.as_deref(), Some("-created_date"));
                assert_eq!(limit, Some(5));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}

// Changelog:
// - v1.0.0 (2026-10-19): Initial core types.
//   - Purpose: Declares the CLI arguments, the entity collections and the
//     record alias used by every other module.
//   - Features: Case-insensitive entity parsing for the CLI and HTTP paths,
//     argument validation mirroring the rest of the project's HOST:PORT checks.
