// Crypto Miner Optimizer - Free and Open Source Software Statement
//
// This project, cmo, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/simulation/mod.rs
// Version: 1.0.0
//
// This file declares the simulation module: local stand-ins for the tuning
// model, the market data feed and the benchmark run. Every function takes its random source as a
// parameter so callers can pass a seeded generator.
//
// Tree Location:
// - src/simulation/mod.rs (simulation module entry point)
// - Submodules: benchmark, market, optimizer

pub mod benchmark;
pub mod market;
pub mod optimizer;

pub use benchmark::{BENCHMARK_ITERATIONS, BenchmarkConfig, BenchmarkRun, simulate_benchmark};
pub use market::{MIN_PRICE_USD, MarketQuote, PriceQuote, simulate_prices};
pub use optimizer::{OPTIMIZER_REASONING, OptimizationPrediction, simulate_optimization};
