// Crypto Miner Optimizer - Free and Open Source Software Statement
//
// This project, cmo, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/main.rs
// Version: 1.0.0
//
// Entry point of the cmo binary: parses and validates the arguments, sets up
// logging, opens the store and runs one subcommand.

use anyhow::{Context, Result, bail};
use clap::Parser;
use cmo::core::{Args, ClockSettings, Command, Record};
use cmo::logging::init_logging;
use cmo::mining::{
    apply_recommendation, assess_failure_risk, duplicate_profile, engage_safe_mode,
    generate_predictions, optimize_gpu, profitability_report, refresh_prices,
    remote_apply_settings, remote_load_profile, restart_gpu, run_benchmark, set_default_profile,
    train_failure_model, train_optimizer_model,
};
use cmo::server::start_server;
use cmo::storage::{FileStorage, MemoryStorage, StorageAdapter};
use cmo::store::{ClientConfig, OfflineClient, StoreError, into_record};
use cmo::utils::FormatUtils;
use log::{LevelFilter, info};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

const LOG_TARGET: &str = "cmo::main";

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if let Err(err) = args.validate() {
        eprintln!("❌ Error: {}", err);
        std::process::exit(1);
    }

    let level: LevelFilter = args.log_level.parse().unwrap_or(LevelFilter::Info);
    init_logging(level, args.log_file.as_deref())?;

    let client = open_client(&args)?;
    run(client, args.command).await
}

fn open_client(args: &Args) -> Result<OfflineClient> {
    let config = ClientConfig {
        prefix: args.prefix.clone(),
        ..ClientConfig::default()
    };

    let storage: Arc<dyn StorageAdapter> = match &args.data_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Could not create data directory {:?}", dir))?;
            let storage = FileStorage::new(dir.clone())
                .with_context(|| format!("Could not open data directory {:?}", dir))?;
            info!(target: LOG_TARGET, "📁 Using data directory {:?}", dir);
            Arc::new(storage)
        }
        None => {
            info!(target: LOG_TARGET, "🧠 Using in-memory store");
            Arc::new(MemoryStorage::new())
        }
    };

    Ok(OfflineClient::new(storage, config))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_record(json: &str) -> Result<Record> {
    let value: serde_json::Value =
        serde_json::from_str(json).context("Record data is not valid JSON")?;
    Ok(into_record(value)?)
}

async fn run(client: OfflineClient, command: Command) -> Result<()> {
    let mut rng = StdRng::from_entropy();

    match command {
        Command::Seed => {
            if client.seed()? {
                println!("🌱 Starter data written");
            } else {
                println!("✅ Store already seeded");
            }
        }
        Command::List {
            entity,
            sort,
            limit,
        } => print_json(&client.entities(entity).list(sort.as_deref(), limit)?)?,
        Command::Get { entity, id } => match client.entities(entity).get(&id)? {
            Some(record) => print_json(&record)?,
            None => bail!(StoreError::RecordNotFound { entity, id }),
        },
        Command::Create { entity, json } => {
            print_json(&client.entities(entity).create(parse_record(&json)?)?)?
        }
        Command::Update { entity, id, json } => {
            print_json(&client.entities(entity).update(&id, parse_record(&json)?)?)?
        }
        Command::Delete { entity, id } => print_json(&client.entities(entity).delete(&id)?)?,
        Command::Optimize { gpu_id } => {
            let outcome = optimize_gpu(&client, &gpu_id, &mut rng)?;
            let hashrate = outcome.gpu.get("hashrate").and_then(|v| v.as_f64()).unwrap_or(0.0);
            let efficiency = outcome.gpu.get("efficiency").and_then(|v| v.as_f64()).unwrap_or(0.0);
            println!(
                "🧠 {}: core {} MHz, memory {} MHz, power {}% -> {} at {} ({:+.1}%, {:.0}% confidence)",
                gpu_id,
                outcome.settings.core_clock,
                outcome.settings.memory_clock,
                outcome.settings.power_limit,
                FormatUtils::format_hashrate(hashrate),
                FormatUtils::format_efficiency(efficiency),
                outcome.improvement_percent,
                outcome.prediction.confidence
            );
            print_json(&outcome.gpu)?;
        }
        Command::Benchmark {
            gpu_id,
            algorithm,
            duration,
        } => {
            let stored = run_benchmark(
                &client,
                &gpu_id,
                algorithm.as_deref(),
                Duration::from_secs(duration),
                &mut rng,
            )?;
            let number = |field: &str| stored.get(field).and_then(|v| v.as_f64()).unwrap_or(0.0);
            println!(
                "📊 {}: avg {}, peak {}, {:.0} W, {}",
                gpu_id,
                FormatUtils::format_hashrate(number("avg_hashrate")),
                FormatUtils::format_hashrate(number("peak_hashrate")),
                number("avg_power"),
                FormatUtils::format_efficiency(number("efficiency"))
            );
            print_json(&stored)?;
        }
        Command::Restart { gpu_id } => print_json(&restart_gpu(&client, &gpu_id)?)?,
        Command::SafeMode { gpu_id } => print_json(&engage_safe_mode(&client, &gpu_id)?)?,
        Command::RemoteSettings {
            gpu_id,
            core_clock,
            memory_clock,
            power_limit,
        } => {
            let settings = ClockSettings {
                core_clock,
                memory_clock,
                power_limit,
            };
            print_json(&remote_apply_settings(&client, &gpu_id, settings)?)?
        }
        Command::RemoteProfile { profile_id } => match remote_load_profile(&client, &profile_id)? {
            Some(gpu) => print_json(&gpu)?,
            None => println!("⚠️  Profile {} is not bound to a known device", profile_id),
        },
        Command::DefaultProfile { profile_id } => {
            print_json(&set_default_profile(&client, &profile_id)?)?
        }
        Command::CopyProfile { profile_id } => print_json(&duplicate_profile(&client, &profile_id)?)?,
        Command::Train => {
            let session = train_optimizer_model(&client, &mut rng)?;
            println!("🎓 Trained on {} new samples", session.samples.len());
            print_json(&session.history)?;
        }
        Command::TrainFailureModel => print_json(&train_failure_model(&client, &mut rng)?)?,
        Command::Health { gpu_id, apply } => match assess_failure_risk(&client, &gpu_id)? {
            None => println!("ℹ️  No training data yet. Run `cmo train` first"),
            Some(prediction) => {
                println!(
                    "🩺 {}: risk {:.0}/100 ({:.0}% confidence)",
                    gpu_id, prediction.risk_score, prediction.confidence
                );
                if apply {
                    for recommendation in &prediction.recommendations {
                        let outcome = apply_recommendation(&client, &gpu_id, recommendation)?;
                        println!(
                            "✅ {}{}",
                            recommendation.title,
                            if outcome.notified { " (e-mail sent)" } else { "" }
                        );
                    }
                }
                print_json(&prediction)?;
            }
        },
        Command::Prices => {
            for quote in refresh_prices(&client, &mut rng)? {
                println!(
                    "📈 {:<6} {:>12} {:>+7.2}%  cap {}",
                    quote.symbol.as_deref().unwrap_or("?"),
                    FormatUtils::format_usd(quote.price_usd),
                    quote.price_change_24h,
                    FormatUtils::format_number(quote.market_cap)
                );
            }
        }
        Command::Profit => {
            let report = profitability_report(&client)?;
            for device in &report.devices {
                println!(
                    "💰 {:<8} {:<6} daily {:>10}  monthly {:>10}  ROI {}",
                    device.gpu_id,
                    device.coin_symbol,
                    FormatUtils::format_usd(device.estimate.daily_profit),
                    FormatUtils::format_usd(device.estimate.monthly_profit),
                    FormatUtils::format_roi(device.estimate.roi_days)
                );
            }
            for row in &report.algorithms {
                println!(
                    "⚖️  {:<8} {:<6} daily {:>10}",
                    row.algorithm.as_deref().unwrap_or("?"),
                    row.coin_symbol,
                    FormatUtils::format_usd(row.daily_profit)
                );
            }
            println!(
                "📊 Fleet: {} per day, {} per month",
                FormatUtils::format_usd(report.total_daily_profit),
                FormatUtils::format_usd(report.total_monthly_profit)
            );
        }
        Command::Predict => print_json(&generate_predictions(&client, &mut rng)?)?,
        Command::Serve { bind } => {
            let addr: SocketAddr = bind
                .parse()
                .with_context(|| format!("Invalid bind address '{}'", bind))?;
            start_server(Arc::new(client), addr)
                .await
                .context("API server stopped")?;
        }
    }

    Ok(())
}

// Changelog:
// - v1.0.0 (2026-10-19): Initial command-line entry point.
//   - Purpose: Exposes the entity store, the mining workflows and the local
//     API as subcommands.
//   - Features: File-backed or in-memory store, log4rs logging to stderr and
//     an optional log file, pretty JSON output on stdout.
// - v1.0.1 (2026-10-19): Automation and training commands.
//   - Added remote-settings, remote-profile, default-profile, copy-profile,
//     train, train-failure-model and health.
//   - Optimize and benchmark summaries show formatted hashrate and efficiency.
