use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::weather::{Location, WeatherSample};

// ─── Derived physical quantities ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SolarEstimate {
    /// Sun elevation above the horizon (deg)
    pub elevation_deg: f64,
    /// Estimated global horizontal irradiance (W/m²)
    pub irradiance_w_m2: f64,
}

/// Generation available from each source, plus the balance against load.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PowerOutput {
    pub solar_kw: f64,
    pub wind_kw: f64,
    pub total_kw: f64,
    /// Surplus (positive) or deficit (negative) after serving the load
    pub net_kw: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MicrogridState {
    pub load_kw: f64,
    pub battery_soc_pct: f64,
}

// ─── Decision ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceLabel {
    SolarRecommended,
    WindRecommended,
}

impl SourceLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceLabel::SolarRecommended => "Solar Power Recommended",
            SourceLabel::WindRecommended => "Wind Power Recommended",
        }
    }
}

/// Closed set of rationales the decision engine can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Reason {
    SolarUnavailable,
    LowSolarWindReliable,
    MinimalSolarBeatsWind,
    StrongSolar,
    WindFavorable,
    /// Only produced when the load-aware policy is enabled
    BatteryLowLoadUncovered,
}

impl Reason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Reason::SolarUnavailable => "Solar not available - Night time or low sunlight",
            Reason::LowSolarWindReliable => "Low solar conditions - Wind more reliable",
            Reason::MinimalSolarBeatsWind => "Minimal solar available but better than wind",
            Reason::StrongSolar => "Strong solar conditions detected",
            Reason::WindFavorable => "Wind conditions favorable over solar",
            Reason::BatteryLowLoadUncovered => "Battery low - switching to the source that better covers the load",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Decision {
    pub label: SourceLabel,
    pub reason: Reason,
}

impl Decision {
    pub fn new(label: SourceLabel, reason: Reason) -> Self {
        Self { label, reason }
    }

    /// Human-readable `(label, reason)` pair.
    pub fn as_pair(&self) -> (&'static str, &'static str) {
        (self.label.as_str(), self.reason.as_str())
    }
}

// ─── Evaluation snapshot ─────────────────────────────────────────────────────

/// One complete run of the pipeline for a location at an instant.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Evaluation {
    pub timestamp: DateTime<Utc>,
    /// Wall-clock time at the location, used for the solar geometry
    pub local_time: NaiveDateTime,
    pub location: Location,
    pub weather: WeatherSample,
    pub solar: SolarEstimate,
    pub power: PowerOutput,
    pub microgrid: MicrogridState,
    pub decision: Decision,
    pub label_text: String,
    pub reason_text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CurvePoint {
    pub wind_speed_m_s: f64,
    pub power_kw: f64,
}

// ─── REST API request / response types ───────────────────────────────────────

/// Caller-supplied inputs for a one-off decision.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DecideRequest {
    pub irradiance_w_m2: f64,
    pub wind_speed_m_s: f64,
    pub load_kw: f64,
    pub battery_soc_pct: f64,
    /// Local time as `HH:MM` or `HH:MM:SS`; midday is assumed when absent
    pub local_time: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DecideResponse {
    pub decision: Decision,
    pub label_text: String,
    pub reason_text: String,
    pub power: PowerOutput,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub offline_mode: bool,
    pub mqtt_connected: bool,
    pub last_evaluation: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OfflineModeSetting {
    pub enabled: bool,
}
