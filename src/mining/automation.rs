// Crypto Miner Optimizer - Free and Open Source Software Statement
//
// This project, cmo, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/mining/automation.rs
// Version: 1.0.0
//
// This file implements the automation view's health workflows: the failure
// risk assessment of a device, applying one of its recommendations with an
// optional e-mail notification, and saving the alert settings.
//
// Tree Location:
// - src/mining/automation.rs (failure prediction and recommendations)
// - Depends on: store, mining/control, mining/models

use super::control::{engage_safe_mode, find_gpu, remote_load_profile, restart_gpu};
use super::models::{Gpu, flag, number, text};
use crate::core::{EntityKind, Record, parse_timestamp_millis};
use crate::store::{OfflineClient, StoreResult, record_id};
use chrono::Utc;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::json;

const LOG_TARGET: &str = "cmo::mining::automation";

/// Unresolved alerts younger than this count towards the risk score
pub const RECENT_ALERT_WINDOW_MS: i64 = 24 * 60 * 60 * 1000;

/// Risk above which safe mode is recommended
pub const THERMAL_RISK_THRESHOLD: f64 = 60.0;

/// Name of the profile recommended for devices with many recent alerts
pub const CONSERVATIVE_PROFILE: &str = "Conservative";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendedAction {
    SafeMode,
    Restart,
    ApplyProfile,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub action: RecommendedAction,
    pub title: String,
    pub description: String,
    pub priority: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailurePrediction {
    /// 0-100
    pub risk_score: f64,
    pub confidence: f64,
    pub time_to_failure: Option<String>,
    pub failure_type: Option<String>,
    pub recommendations: Vec<Recommendation>,
}

/// What applying a recommendation changed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationOutcome {
    /// Updated device, `None` when the action had nothing to apply
    pub gpu: Option<Record>,
    pub notified: bool,
}

fn recommendation(
    action: RecommendedAction,
    title: &str,
    description: &str,
    priority: &str,
) -> Recommendation {
    Recommendation {
        action,
        title: title.to_string(),
        description: description.to_string(),
        priority: priority.to_string(),
        profile_name: None,
    }
}

/// Score the failure risk of `gpu` from its sensors and recent alerts.
///
/// Returns `None` without training data. `now_ms` is the current time in
/// epoch milliseconds.
pub fn predict_failure(
    gpu: &Gpu,
    training: &[Record],
    alerts: &[Record],
    now_ms: i64,
) -> Option<FailurePrediction> {
    if training.is_empty() {
        return None;
    }

    let temperature = gpu.temperature.unwrap_or(0.0);
    let fan_speed = gpu.fan_speed.unwrap_or(0.0);
    let power_draw = gpu.power_draw.unwrap_or(0.0);

    let temp_risk = if temperature > 75.0 { (temperature - 75.0) * 2.0 } else { 0.0 };
    let fan_risk = if fan_speed > 90.0 { (fan_speed - 90.0) * 3.0 } else { 0.0 };
    let power_risk = if power_draw > 300.0 { (power_draw - 300.0) / 5.0 } else { 0.0 };

    let recent_alerts = alerts
        .iter()
        .filter(|alert| text(alert, "gpu_id").as_deref() == Some(gpu.gpu_id.as_str()))
        .filter(|alert| flag(alert, "is_resolved") != Some(true))
        .filter(|alert| {
            text(alert, "created_date")
                .and_then(|date| parse_timestamp_millis(&date))
                .is_some_and(|created| created > now_ms - RECENT_ALERT_WINDOW_MS)
        })
        .count();
    let alert_risk = recent_alerts as f64 * 10.0;

    let avg_accuracy = training
        .iter()
        .map(|sample| 100.0 - number(sample, "prediction_error").unwrap_or(0.0))
        .sum::<f64>()
        / training.len() as f64;

    let risk_score = (temp_risk + fan_risk + power_risk + alert_risk).min(100.0);
    let mut prediction = FailurePrediction {
        risk_score,
        confidence: (avg_accuracy + training.len() as f64 / 10.0).min(95.0),
        time_to_failure: None,
        failure_type: None,
        recommendations: Vec::new(),
    };

    if risk_score > THERMAL_RISK_THRESHOLD {
        prediction.failure_type = Some("thermal_failure".to_string());
        prediction.time_to_failure = Some(if risk_score > 80.0 { "2-6 hours" } else { "12-24 hours" }.to_string());
        prediction.recommendations.push(recommendation(
            RecommendedAction::SafeMode,
            "Enable Safe Mode",
            "Reduce clocks and power to prevent thermal damage",
            "critical",
        ));
    }

    if fan_speed > 90.0 {
        prediction.failure_type = Some("fan_failure".to_string());
        prediction.time_to_failure = Some("6-12 hours".to_string());
        prediction.recommendations.push(recommendation(
            RecommendedAction::Restart,
            "Restart GPU",
            "Fan controller may need reset",
            "high",
        ));
    }

    if recent_alerts > 3 {
        let mut apply = recommendation(
            RecommendedAction::ApplyProfile,
            "Apply Conservative Profile",
            "Switch to a stable, tested configuration",
            "medium",
        );
        apply.profile_name = Some(CONSERVATIVE_PROFILE.to_string());
        prediction.recommendations.push(apply);
    }

    Some(prediction)
}

/// Failure risk of one device against the stored samples and alerts.
pub fn assess_failure_risk(
    client: &OfflineClient,
    gpu_ref: &str,
) -> StoreResult<Option<FailurePrediction>> {
    let gpu = Gpu::from_record(&find_gpu(client, gpu_ref)?);
    let training = client
        .entities(EntityKind::AiTrainingData)
        .list(Some("-created_date"), Some(100))?;
    let alerts = client
        .entities(EntityKind::HardwareAlert)
        .list(Some("-created_date"), Some(50))?;

    Ok(predict_failure(&gpu, &training, &alerts, Utc::now().timestamp_millis()))
}

/// Carry out `recommendation` on the device, then e-mail the configured
/// address when alert e-mails are enabled.
pub fn apply_recommendation(
    client: &OfflineClient,
    gpu_ref: &str,
    recommendation: &Recommendation,
) -> StoreResult<RecommendationOutcome> {
    let gpu = Gpu::from_record(&find_gpu(client, gpu_ref)?);

    let updated = match recommendation.action {
        RecommendedAction::SafeMode => Some(engage_safe_mode(client, &gpu.id)?),
        RecommendedAction::Restart => Some(restart_gpu(client, &gpu.id)?),
        RecommendedAction::ApplyProfile => {
            let name = recommendation.profile_name.as_deref().unwrap_or_default();
            let profile = client
                .entities(EntityKind::GpuProfile)
                .filter("name", &json!(name))?
                .into_iter()
                .next();
            match profile.as_ref().and_then(record_id) {
                Some(profile_id) => remote_load_profile(client, profile_id)?,
                None => {
                    warn!(target: LOG_TARGET, "No profile named '{}' to apply", name);
                    None
                }
            }
        }
    };

    let settings = client.entities(EntityKind::UserSettings).list(None, Some(1))?;
    let address = settings
        .first()
        .filter(|config| flag(config, "enable_email_alerts") == Some(true))
        .and_then(|config| text(config, "email_address"))
        .filter(|address| !address.is_empty());

    let notified = match address {
        Some(to) => {
            client.send_email(
                &to,
                &format!("GPU Alert: {}", recommendation.title),
                &format!(
                    "AI recommendation applied for {}: {}",
                    gpu.name, recommendation.description
                ),
            )?;
            true
        }
        None => false,
    };

    info!(target: LOG_TARGET,
        "🤖 Applied '{}' to {}{}",
        recommendation.title,
        gpu.gpu_id,
        if notified { " (notified)" } else { "" }
    );
    Ok(RecommendationOutcome {
        gpu: updated,
        notified,
    })
}

/// Merge `data` into the first `UserSettings` record, creating it when the
/// store has none.
pub fn save_settings(client: &OfflineClient, data: Record) -> StoreResult<Record> {
    let repo = client.entities(EntityKind::UserSettings);
    let existing = repo.list(None, Some(1))?;
    match existing.first().and_then(record_id) {
        Some(id) => repo.update(id, data),
        None => repo.create(data),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mining::control::save_profile;
    use crate::store::into_record;

    fn hot_gpu(temperature: f64, fan_speed: f64) -> Gpu {
        Gpu {
            gpu_id: "GPU-001".to_string(),
            name: "NVIDIA RTX 4090".to_string(),
            temperature: Some(temperature),
            fan_speed: Some(fan_speed),
            power_draw: Some(250.0),
            ..Gpu::default()
        }
    }

    fn sample(error: f64) -> Record {
        into_record(json!({"prediction_error": error})).unwrap()
    }

    fn alert(gpu_id: &str, created_date: &str, resolved: bool) -> Record {
        into_record(json!({
            "gpu_id": gpu_id,
            "created_date": created_date,
            "is_resolved": resolved
        }))
        .unwrap()
    }

    const NOW: &str = "2026-10-19T12:00:00.000Z";

    fn now_ms() -> i64 {
        parse_timestamp_millis(NOW).unwrap()
    }

    #[test]
    fn no_training_data_means_no_prediction() {
        assert_eq!(predict_failure(&hot_gpu(95.0, 95.0), &[], &[], now_ms()), None);
    }

    #[test]
    fn thermal_and_fan_risk() {
        // (110 - 75) * 2 = 70 thermal risk, fan at 95 adds 15
        let prediction = predict_failure(&hot_gpu(110.0, 95.0), &[sample(4.0)], &[], now_ms()).unwrap();
        assert!((prediction.risk_score - 85.0).abs() < 1e-9);
        assert_eq!(prediction.failure_type.as_deref(), Some("fan_failure"));
        assert_eq!(prediction.time_to_failure.as_deref(), Some("6-12 hours"));
        let actions: Vec<RecommendedAction> = prediction.recommendations.iter().map(|r| r.action).collect();
        assert_eq!(actions, vec![RecommendedAction::SafeMode, RecommendedAction::Restart]);
        // 96 % average accuracy + 0.1 caps at 95
        assert_eq!(prediction.confidence, 95.0);
    }

    #[test]
    fn only_recent_unresolved_alerts_count() {
        let alerts = vec![
            alert("GPU-001", "2026-10-19T10:00:00.000Z", false),
            alert("GPU-001", "2026-10-19T09:00:00.000Z", false),
            alert("GPU-001", "2026-10-19T08:00:00.000Z", false),
            alert("GPU-001", "2026-10-19T07:00:00.000Z", false),
            alert("GPU-001", "2026-10-19T06:00:00.000Z", true),
            alert("GPU-001", "2026-10-17T06:00:00.000Z", false),
            alert("GPU-002", "2026-10-19T06:00:00.000Z", false),
        ];
        let prediction = predict_failure(&hot_gpu(60.0, 50.0), &[sample(20.0)], &alerts, now_ms()).unwrap();
        assert!((prediction.risk_score - 40.0).abs() < 1e-9);
        assert!((prediction.confidence - 80.1).abs() < 1e-9);
        assert_eq!(prediction.recommendations.len(), 1);
        assert_eq!(prediction.recommendations[0].action, RecommendedAction::ApplyProfile);
        assert_eq!(prediction.recommendations[0].profile_name.as_deref(), Some(CONSERVATIVE_PROFILE));
    }

    #[test]
    fn assessment_reads_store() {
        let client = OfflineClient::in_memory();
        assert_eq!(assess_failure_risk(&client, "GPU-001").unwrap(), None);

        client.entities(EntityKind::AiTrainingData).create(sample(2.0)).unwrap();
        let prediction = assess_failure_risk(&client, "GPU-001").unwrap().unwrap();
        // seeded device runs cool
        assert_eq!(prediction.risk_score, 0.0);
        assert!(prediction.recommendations.is_empty());
    }

    #[test]
    fn recommendation_sends_mail_when_enabled() {
        let client = OfflineClient::in_memory();
        let safe_mode = recommendation(
            RecommendedAction::SafeMode,
            "Enable Safe Mode",
            "Reduce clocks and power to prevent thermal damage",
            "critical",
        );

        let quiet = apply_recommendation(&client, "GPU-001", &safe_mode).unwrap();
        assert!(!quiet.notified);
        assert_eq!(quiet.gpu.unwrap()["core_clock"], 1200);
        assert!(client.email_log().unwrap().is_empty());

        save_settings(
            &client,
            into_record(json!({"enable_email_alerts": true, "email_address": "ops@local"})).unwrap(),
        )
        .unwrap();
        let loud = apply_recommendation(&client, "GPU-001", &safe_mode).unwrap();
        assert!(loud.notified);

        let mail = client.email_log().unwrap();
        assert_eq!(mail.len(), 1);
        assert_eq!(mail[0].to, "ops@local");
        assert_eq!(mail[0].subject, "GPU Alert: Enable Safe Mode");
        assert_eq!(
            mail[0].body,
            "AI recommendation applied for NVIDIA RTX 4090: Reduce clocks and power to prevent thermal damage"
        );
    }

    #[test]
    fn profile_recommendation_loads_named_profile() {
        let client = OfflineClient::in_memory();
        let mut apply = recommendation(RecommendedAction::ApplyProfile, "Apply", "Stable", "medium");
        apply.profile_name = Some(CONSERVATIVE_PROFILE.to_string());

        // no such profile yet
        assert_eq!(apply_recommendation(&client, "GPU-002", &apply).unwrap().gpu, None);

        save_profile(&client, CONSERVATIVE_PROFILE, "GPU-002", None).unwrap();
        let outcome = apply_recommendation(&client, "GPU-002", &apply).unwrap();
        assert_eq!(outcome.gpu.unwrap()["core_clock"], 2350.0);
    }

    #[test]
    fn settings_save_upserts_first_record() {
        let client = OfflineClient::in_memory();
        let repo = client.entities(EntityKind::UserSettings);
        let seeded_id = record_id(&repo.list(None, None).unwrap()[0]).unwrap().to_string();

        let saved = save_settings(&client, into_record(json!({"email_address": "a@b"})).unwrap()).unwrap();
        assert_eq!(record_id(&saved), Some(seeded_id.as_str()));
        assert_eq!(saved["electricity_cost_per_kwh"], 0.12);
        assert_eq!(repo.list(None, None).unwrap().len(), 1);

        repo.delete(&seeded_id).unwrap();
        let created = save_settings(&client, into_record(json!({"email_address": "c@d"})).unwrap()).unwrap();
        assert_ne!(record_id(&created), Some(seeded_id.as_str()));
        assert_eq!(repo.list(None, None).unwrap().len(), 1);
    }
}
