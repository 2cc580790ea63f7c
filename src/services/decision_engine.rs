//! Rule-based choice between solar and wind for the microgrid.
//!
//! The rules are evaluated in order and the first match wins:
//!
//! 1. night (local hour before 06 or after 18) or irradiance below 10 W/m² → wind
//! 2. irradiance below 100 W/m² → wind if the turbine yields more than 1 kW, else solar
//! 3. solar output at least the wind output and irradiance ≥ 200 W/m² → solar
//! 4. otherwise → wind
//!
//! Load and battery state only influence the outcome when
//! [`DecisionPolicy::load_aware`] is set. The evaluation pipeline hands the
//! local wall-clock time to the engine only when
//! [`DecisionPolicy::use_local_hour`] is set; otherwise rule 1 can only fire
//! on irradiance.

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::models::evaluation::{Decision, PowerOutput, Reason, SourceLabel};
use crate::services::wind_model;

/// kW produced per W/m² by the 15 kW array
pub const SOLAR_KW_PER_W_M2: f64 = 0.015;

const NIGHT_BEFORE_HOUR: u32 = 6;
const NIGHT_AFTER_HOUR: u32 = 18;
const NEGLIGIBLE_IRRADIANCE: f64 = 10.0;
const LOW_IRRADIANCE: f64 = 100.0;
const STRONG_IRRADIANCE: f64 = 200.0;
const USEFUL_WIND_KW: f64 = 1.0;

fn default_low_soc_pct() -> f64 { 20.0 }

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecisionPolicy {
    #[serde(default)]
    pub load_aware: bool,
    /// Let the pipeline pass the site's local time, enabling the night hours in rule 1
    #[serde(default)]
    pub use_local_hour: bool,
    /// SoC below which the load-aware override may kick in
    #[serde(default = "default_low_soc_pct")]
    pub low_soc_pct: f64,
}

impl Default for DecisionPolicy {
    fn default() -> Self {
        Self {
            load_aware: false,
            use_local_hour: false,
            low_soc_pct: default_low_soc_pct(),
        }
    }
}

pub fn solar_power_kw(irradiance_w_m2: f64) -> f64 {
    irradiance_w_m2 * SOLAR_KW_PER_W_M2
}

/// Available generation and its balance against the load.
pub fn power_output(irradiance_w_m2: f64, wind_speed_m_s: f64, load_kw: f64) -> PowerOutput {
    let solar_kw = solar_power_kw(irradiance_w_m2);
    let wind_kw = wind_model::power_kw(wind_speed_m_s);
    let total_kw = solar_kw + wind_kw;
    PowerOutput {
        solar_kw,
        wind_kw,
        total_kw,
        net_kw: total_kw - load_kw,
    }
}

/// Classifies the recommended source under the default policy.
///
/// `load_kw` and `battery_soc_pct` are accepted for display purposes and do
/// not change the branch taken. Without `local_time` the hour is taken as 12.
pub fn decide(
    irradiance_w_m2: f64,
    wind_speed_m_s: f64,
    load_kw: f64,
    battery_soc_pct: f64,
    local_time: Option<NaiveTime>,
) -> Decision {
    decide_with_policy(
        &DecisionPolicy::default(),
        irradiance_w_m2,
        wind_speed_m_s,
        load_kw,
        battery_soc_pct,
        local_time,
    )
}

pub fn decide_with_policy(
    policy: &DecisionPolicy,
    irradiance_w_m2: f64,
    wind_speed_m_s: f64,
    load_kw: f64,
    battery_soc_pct: f64,
    local_time: Option<NaiveTime>,
) -> Decision {
    let solar_kw = solar_power_kw(irradiance_w_m2);
    let wind_kw = wind_model::power_kw(wind_speed_m_s);
    let hour = local_time.map(|t| t.hour()).unwrap_or(12);

    let decision = classify(irradiance_w_m2, solar_kw, wind_kw, hour);

    if policy.load_aware {
        apply_load_override(policy, decision, solar_kw, wind_kw, load_kw, battery_soc_pct)
    } else {
        decision
    }
}

fn classify(irradiance_w_m2: f64, solar_kw: f64, wind_kw: f64, hour: u32) -> Decision {
    let is_night = hour < NIGHT_BEFORE_HOUR || hour > NIGHT_AFTER_HOUR;

    if is_night || irradiance_w_m2 < NEGLIGIBLE_IRRADIANCE {
        Decision::new(SourceLabel::WindRecommended, Reason::SolarUnavailable)
    } else if irradiance_w_m2 < LOW_IRRADIANCE {
        // dawn / dusk
        if wind_kw > USEFUL_WIND_KW {
            Decision::new(SourceLabel::WindRecommended, Reason::LowSolarWindReliable)
        } else {
            Decision::new(SourceLabel::SolarRecommended, Reason::MinimalSolarBeatsWind)
        }
    } else if solar_kw >= wind_kw && irradiance_w_m2 >= STRONG_IRRADIANCE {
        Decision::new(SourceLabel::SolarRecommended, Reason::StrongSolar)
    } else {
        Decision::new(SourceLabel::WindRecommended, Reason::WindFavorable)
    }
}

fn apply_load_override(
    policy: &DecisionPolicy,
    decision: Decision,
    solar_kw: f64,
    wind_kw: f64,
    load_kw: f64,
    battery_soc_pct: f64,
) -> Decision {
    // Solar is off the table at night, whatever the load
    if battery_soc_pct >= policy.low_soc_pct || decision.reason == Reason::SolarUnavailable {
        return decision;
    }

    let (chosen_kw, other_kw, other) = match decision.label {
        SourceLabel::SolarRecommended => (solar_kw, wind_kw, SourceLabel::WindRecommended),
        SourceLabel::WindRecommended => (wind_kw, solar_kw, SourceLabel::SolarRecommended),
    };

    if chosen_kw < load_kw && other_kw > chosen_kw {
        Decision::new(other, Reason::BatteryLowLoadUncovered)
    } else {
        decision
    }
}
