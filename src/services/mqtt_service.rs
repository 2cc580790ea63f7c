//! MQTT evaluation publisher
//!
//! Publishes the latest evaluation as a JSON payload to a configured broker.
//! Topic structure: `{prefix}/evaluation`
//! Birth message (retained): `{prefix}/system/status`

use std::time::Duration;
use rumqttc::{AsyncClient, LastWill, MqttOptions, QoS};
use tracing::{info, warn};

use crate::config::MqttConfig;
use crate::models::evaluation::Evaluation;
use crate::shared_state::AppState;

pub async fn run_publisher(cfg: MqttConfig, state: AppState) {
    if !cfg.enabled || cfg.broker_host.is_empty() {
        info!("[MQTT] Disabled or no broker configured — skipping MQTT publisher");
        return;
    }

    let client_id = if cfg.client_id.is_empty() {
        format!("energy-predictor-{}", uuid::Uuid::new_v4())
    } else {
        cfg.client_id.clone()
    };

    let interval_s = cfg.publish_interval_s.unwrap_or(10).max(1);
    let prefix     = cfg.topic_prefix.trim_end_matches('/').to_string();
    let status_topic = format!("{}/system/status", prefix);

    info!(
        "[MQTT] Connecting to {}:{} (client_id={}, interval={}s)",
        cfg.broker_host, cfg.broker_port, client_id, interval_s
    );

    let mut opts = MqttOptions::new(&client_id, &cfg.broker_host, cfg.broker_port);
    opts.set_keep_alive(Duration::from_secs(30));
    opts.set_clean_session(true);
    opts.set_last_will(LastWill::new(
        &status_topic,
        serde_json::json!({ "status": "OFFLINE" }).to_string(),
        QoS::AtLeastOnce,
        true,
    ));

    if let (Some(user), Some(pass)) = (&cfg.username, &cfg.password) {
        opts.set_credentials(user, pass);
    }

    let (client, mut eventloop) = AsyncClient::new(opts, 64);

    let birth_payload = serde_json::json!({
        "status": "ONLINE",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });
    if let Err(e) = client.publish(
        &status_topic,
        QoS::AtLeastOnce,
        true, // retained
        birth_payload.to_string().as_bytes(),
    ).await {
        warn!("[MQTT] Failed to queue birth message: {}", e);
    }

    let evaluation_topic = format!("{}/evaluation", prefix);
    let mut last_published = None;

    loop {
        // Drain event loop without blocking the publish loop
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs(interval_s)) => {}
            event = eventloop.poll() => {
                match event {
                    Ok(_) => state.set_mqtt_connected(true),
                    Err(e) => {
                        warn!("[MQTT] Event loop error: {} — will reconnect", e);
                        state.set_mqtt_connected(false);
                        tokio::time::sleep(Duration::from_secs(5)).await;
                    }
                }
                continue;
            }
        }

        let Some(evaluation) = state.get_latest() else { continue };
        if last_published == Some(evaluation.timestamp) {
            continue;
        }

        let payload = evaluation_payload(&evaluation);
        if let Err(e) = client.publish(
            &evaluation_topic,
            QoS::AtMostOnce,
            false,
            payload.to_string().as_bytes(),
        ).await {
            warn!("[MQTT] Publish error for {}: {}", evaluation_topic, e);
            state.set_mqtt_connected(false);
        } else {
            last_published = Some(evaluation.timestamp);
        }
    }
}

/// Flat JSON payload for dashboards that do not want the full evaluation tree.
pub fn evaluation_payload(ev: &Evaluation) -> serde_json::Value {
    serde_json::json!({
        "timestamp":  ev.timestamp.to_rfc3339(),
        "local_time": ev.local_time.format("%Y-%m-%d %H:%M:%S").to_string(),
        "location": {
            "city":      ev.location.city,
            "country":   ev.location.country,
            "latitude":  ev.location.point.latitude,
            "longitude": ev.location.point.longitude,
            "timezone":  ev.location.timezone,
        },
        "decision": {
            "label":  ev.decision.label,
            "reason": ev.decision.reason,
            "text":   ev.label_text,
            "detail": ev.reason_text,
        },
        "power": {
            "solar_kw": ev.power.solar_kw,
            "wind_kw":  ev.power.wind_kw,
            "total_kw": ev.power.total_kw,
            "net_kw":   ev.power.net_kw,
        },
        "solar": {
            "elevation_deg":   ev.solar.elevation_deg,
            "irradiance_w_m2": ev.solar.irradiance_w_m2,
        },
        "weather": {
            "temperature_c":   ev.weather.temperature_c,
            "humidity_pct":    ev.weather.humidity_pct,
            "wind_speed_m_s":  ev.weather.wind_speed_m_s,
            "cloud_cover_pct": ev.weather.cloud_cover_pct,
            "pressure_hpa":    ev.weather.pressure_hpa,
            "origin":          ev.weather.origin,
        },
        "microgrid": {
            "load_kw":         ev.microgrid.load_kw,
            "battery_soc_pct": ev.microgrid.battery_soc_pct,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::evaluation::MicrogridState;
    use crate::models::weather::{Location, WeatherSample};
    use crate::services::decision_engine::DecisionPolicy;
    use crate::services::evaluator;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_payload_shape() {
        let now = Utc.with_ymd_and_hms(2025, 6, 21, 6, 30, 0).unwrap();
        let ev = evaluator::evaluate(
            &Location::default_location(),
            WeatherSample::default_sample(),
            now,
            MicrogridState { load_kw: 8.0, battery_soc_pct: 60.0 },
            &DecisionPolicy::default(),
        );
        let p = evaluation_payload(&ev);
        assert_eq!(p["location"]["city"], "Delhi");
        assert_eq!(p["local_time"], "2025-06-21 12:00:00");
        assert_eq!(p["decision"]["label"], "SOLAR_RECOMMENDED");
        assert_eq!(p["decision"]["reason"], "STRONG_SOLAR");
        assert_eq!(p["weather"]["origin"], "default");
        assert_eq!(p["microgrid"]["load_kw"], 8.0);
    }
}
