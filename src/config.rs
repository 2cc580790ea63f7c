use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::services::decision_engine::DecisionPolicy;

fn default_offline_mode() -> bool { false }
fn default_refresh_interval_s() -> u64 { 60 }
fn default_weather_base_url() -> String { "https://api.openweathermap.org/data/2.5".to_string() }
fn default_timeout_s() -> u64 { 10 }
fn default_mqtt_port() -> u16 { 1883 }
fn default_topic_prefix() -> String { "energy-predictor".to_string() }

pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub location: LocationConfig,
    #[serde(default)]
    pub weather: WeatherConfig,
    #[serde(default = "default_offline_mode")]
    pub offline_mode: bool,
    #[serde(default = "default_refresh_interval_s")]
    pub refresh_interval_s: u64,
    #[serde(default)]
    pub microgrid: MicrogridConfig,
    #[serde(default)]
    pub decision: DecisionPolicy,
    #[serde(default)]
    pub mqtt: MqttConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

/// How the site location is obtained.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LocationMode {
    /// Coordinates come from the caller (browser geolocation) per request;
    /// the background loop uses the IP lookup until then.
    Browser,
    Manual,
    #[default]
    Ip,
    Default,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct LocationConfig {
    #[serde(default)]
    pub mode: LocationMode,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub timezone: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WeatherConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_s")]
    pub timeout_s: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_weather_base_url(),
            timeout_s: default_timeout_s(),
        }
    }
}

/// Fixed load / SoC readings. Missing values are synthesized per evaluation.
#[derive(Debug, Deserialize, Clone, Copy, Default)]
pub struct MicrogridConfig {
    pub load_kw: Option<f64>,
    pub battery_soc_pct: Option<f64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MqttConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub broker_host: String,
    #[serde(default = "default_mqtt_port")]
    pub broker_port: u16,
    #[serde(default)]
    pub client_id: String,
    #[serde(default = "default_topic_prefix")]
    pub topic_prefix: String,
    pub publish_interval_s: Option<u64>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            broker_host: String::new(),
            broker_port: default_mqtt_port(),
            client_id: String::new(),
            topic_prefix: default_topic_prefix(),
            publish_interval_s: None,
            username: None,
            password: None,
        }
    }
}

impl Config {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path))?;
        let mut config = Self::from_json(&content)
            .with_context(|| format!("failed to parse {}", path))?;

        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                config.weather.api_key = key;
            }
        }
        Ok(config)
    }

    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(content)?)
    }
}
