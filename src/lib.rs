//! Picks the better renewable source (solar or wind) for a small microgrid
//! from location, time and current weather.
//!
//! The three core operations are pure and re-exported here; everything
//! else (providers, HTTP API, MQTT publisher) is a thin caller around them.

pub mod api_docs;
pub mod config;
pub mod controllers;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod shared_state;
pub mod telemetry;

use chrono::{Datelike, NaiveTime, Timelike};

pub use models::evaluation::{Decision, Reason, SourceLabel};
pub use services::decision_engine::{decide, decide_with_policy, DecisionPolicy};

/// Estimated irradiance in W/m² (≥ 0) at `lat` for a local timestamp.
pub fn estimate_irradiance<T: Datelike + Timelike>(lat: f64, cloud_cover_pct: f64, timestamp: &T) -> f64 {
    services::solar_model::irradiance(lat, cloud_cover_pct, timestamp)
}

/// Turbine output in kW, within [0, 15].
pub fn estimate_wind_power(wind_speed_m_s: f64) -> f64 {
    services::wind_model::power_kw(wind_speed_m_s)
}

/// Recommended source as `(label, reason)` text.
pub fn decide_source(
    irradiance_w_m2: f64,
    wind_speed_m_s: f64,
    load_kw: f64,
    battery_soc_pct: f64,
    local_time: Option<NaiveTime>,
) -> (&'static str, &'static str) {
    decide(irradiance_w_m2, wind_speed_m_s, load_kw, battery_soc_pct, local_time).as_pair()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_public_surface() {
        let t = NaiveDate::from_ymd_opt(2025, 6, 21).unwrap().and_hms_opt(12, 0, 0).unwrap();
        assert!(estimate_irradiance(28.6139, 0.0, &t) > 990.0);
        assert_eq!(estimate_wind_power(13.0), 15.0);

        let (label, reason) = decide_source(5.0, 8.0, 10.0, 50.0, NaiveTime::from_hms_opt(14, 0, 0));
        assert_eq!(label, "Wind Power Recommended");
        assert_eq!(reason, "Solar not available - Night time or low sunlight");
    }
}
