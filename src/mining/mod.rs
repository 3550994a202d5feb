// Crypto Miner Optimizer - Free and Open Source Software Statement
//
// This project, cmo, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/mining/mod.rs
// Version: 1.0.0
//
// This file declares the mining module, the workflows of the dashboard built
// from repository calls and the simulation functions.
//
// Tree Location:
// - src/mining/mod.rs (mining module entry point)
// - Submodules: automation, coin_switch, control, models, profitability, training

pub mod automation;
pub mod coin_switch;
pub mod control;
pub mod models;
pub mod profitability;
pub mod training;

pub use automation::{
    FailurePrediction, Recommendation, RecommendationOutcome, RecommendedAction,
    apply_recommendation, assess_failure_risk, predict_failure, save_settings,
};
pub use coin_switch::{apply_switch, generate_predictions, prediction_accuracy, score_prediction};
pub use control::{
    BASELINE_EFFICIENCY, OptimizationOutcome, apply_settings, duplicate_profile, engage_safe_mode,
    find_gpu, load_profile, optimize_gpu, record_benchmark, remote_apply_settings,
    remote_load_profile, resolve_alert, restart_gpu, run_benchmark, save_profile,
    set_default_profile, toggle_rule,
};
pub use models::{CalculationMode, Coin, Gpu, GpuProfile, ProfitHistoryEntry, ProfitSettings, SwitchPrediction};
pub use profitability::{
    AlgorithmProfit, ESTIMATED_GPU_COST_USD, GpuProfit, ProfitEstimate, ProfitabilityReport,
    algorithm_comparison, calculate_profit, load_coins, load_gpus, load_settings, profit_overview,
    profitability_report, record_profit_snapshot, refresh_prices,
};
pub use training::{TrainingSession, train_failure_model, train_optimizer_model};
