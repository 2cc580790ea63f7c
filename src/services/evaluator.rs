use chrono::{DateTime, Utc};
use rand::Rng;

use crate::config::MicrogridConfig;
use crate::models::evaluation::{Evaluation, MicrogridState};
use crate::models::weather::{Location, WeatherSample};
use crate::services::decision_engine::{self, DecisionPolicy};
use crate::services::solar_model;
use crate::services::weather_provider::{self, WeatherProvider};

/// Load and SoC for this evaluation: configured values win, the rest is
/// synthesized around a typical small-site profile.
pub fn microgrid_state<R: Rng + ?Sized>(cfg: &MicrogridConfig, rng: &mut R) -> MicrogridState {
    let load_kw = cfg
        .load_kw
        .unwrap_or_else(|| weather_provider::noisy(rng, 8.5, 1.5));
    let battery_soc_pct = cfg
        .battery_soc_pct
        .unwrap_or_else(|| weather_provider::noisy(rng, 65.0, 10.0).clamp(10.0, 100.0));
    MicrogridState { load_kw, battery_soc_pct }
}

/// Runs solar, wind and decision models for one location at one instant.
///
/// Local time always drives the solar geometry. The decision engine only sees
/// it when `policy.use_local_hour` is set, otherwise it assumes midday.
pub fn evaluate(
    location: &Location,
    weather: WeatherSample,
    now: DateTime<Utc>,
    microgrid: MicrogridState,
    policy: &DecisionPolicy,
) -> Evaluation {
    let local_time = now.with_timezone(&location.tz()).naive_local();

    let solar = solar_model::estimate(location.point.latitude, weather.cloud_cover_pct, &local_time);
    let power = decision_engine::power_output(solar.irradiance_w_m2, weather.wind_speed_m_s, microgrid.load_kw);
    let decision = decision_engine::decide_with_policy(
        policy,
        solar.irradiance_w_m2,
        weather.wind_speed_m_s,
        microgrid.load_kw,
        microgrid.battery_soc_pct,
        policy.use_local_hour.then(|| local_time.time()),
    );
    let (label_text, reason_text) = decision.as_pair();

    Evaluation {
        timestamp: now,
        local_time,
        location: location.clone(),
        weather,
        solar,
        power,
        microgrid,
        decision,
        label_text: label_text.to_string(),
        reason_text: reason_text.to_string(),
    }
}

/// Fetches current weather for `location` and evaluates it at the current time.
pub async fn current_evaluation(
    provider: &WeatherProvider,
    location: &Location,
    offline: bool,
    microgrid: &MicrogridConfig,
    policy: &DecisionPolicy,
) -> Evaluation {
    let weather = provider.current(location.point, offline).await;
    let state = microgrid_state(microgrid, &mut rand::thread_rng());
    evaluate(location, weather, Utc::now(), state, policy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::evaluation::{Reason, SourceLabel};
    use crate::models::weather::{GeoPoint, LocationSource};
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn calm_clear() -> WeatherSample {
        WeatherSample {
            wind_speed_m_s: 2.0,
            cloud_cover_pct: 0.0,
            ..WeatherSample::default_sample()
        }
    }

    #[test]
    fn test_noon_in_delhi_recommends_solar() {
        // 06:30 UTC is 12:00 in Asia/Kolkata
        let now = Utc.with_ymd_and_hms(2025, 6, 21, 6, 30, 0).unwrap();
        let loc = Location::default_location();
        let grid = MicrogridState { load_kw: 10.0, battery_soc_pct: 50.0 };
        let ev = evaluate(&loc, calm_clear(), now, grid, &DecisionPolicy::default());

        assert_eq!(ev.local_time.format("%H:%M").to_string(), "12:00");
        assert!(ev.solar.elevation_deg > 80.0);
        assert!(ev.solar.irradiance_w_m2 > 990.0);
        assert_eq!(ev.power.wind_kw, 0.0);
        assert!((ev.power.net_kw - (ev.power.solar_kw - 10.0)).abs() < 1e-9);
        assert_eq!(ev.decision.label, SourceLabel::SolarRecommended);
        assert_eq!(ev.label_text, "Solar Power Recommended");
    }

    #[test]
    fn test_local_night_recommends_wind() {
        // 18:00 UTC is 23:30 in Delhi
        let now = Utc.with_ymd_and_hms(2025, 6, 21, 18, 0, 0).unwrap();
        let grid = MicrogridState { load_kw: 8.0, battery_soc_pct: 70.0 };
        let ev = evaluate(&Location::default_location(), calm_clear(), now, grid, &DecisionPolicy::default());
        assert_eq!(ev.solar.irradiance_w_m2, 0.0);
        assert_eq!(ev.decision.reason, Reason::SolarUnavailable);
    }

    #[test]
    fn test_light_summer_evening_ignores_clock_by_default() {
        // London at 19:30 in late June: the sun is still up (~93 W/m²)
        let london = Location {
            point: GeoPoint::new(51.5, -0.12),
            city: "London".to_string(),
            country: "United Kingdom".to_string(),
            timezone: "UTC".to_string(),
            source: LocationSource::Manual,
        };
        let now = Utc.with_ymd_and_hms(2025, 6, 21, 19, 30, 0).unwrap();
        let grid = MicrogridState { load_kw: 8.0, battery_soc_pct: 70.0 };

        let ev = evaluate(&london, calm_clear(), now, grid, &DecisionPolicy::default());
        assert!(ev.solar.irradiance_w_m2 > 10.0 && ev.solar.irradiance_w_m2 < 100.0);
        assert_eq!(
            ev.decision,
            decision_engine::decide(ev.solar.irradiance_w_m2, 2.0, 8.0, 70.0, None)
        );
        assert_eq!(ev.decision.label, SourceLabel::SolarRecommended);
        assert_eq!(ev.decision.reason, Reason::MinimalSolarBeatsWind);

        let clock = DecisionPolicy { use_local_hour: true, ..DecisionPolicy::default() };
        let ev = evaluate(&london, calm_clear(), now, grid, &clock);
        assert_eq!(ev.decision.label, SourceLabel::WindRecommended);
        assert_eq!(ev.decision.reason, Reason::SolarUnavailable);
    }

    #[test]
    fn test_configured_microgrid_values_win() {
        let mut rng = StdRng::seed_from_u64(3);
        let cfg = MicrogridConfig { load_kw: Some(4.0), battery_soc_pct: Some(90.0) };
        let s = microgrid_state(&cfg, &mut rng);
        assert_eq!(s, MicrogridState { load_kw: 4.0, battery_soc_pct: 90.0 });
    }

    #[test]
    fn test_synthesized_soc_is_clamped() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..500 {
            let s = microgrid_state(&MicrogridConfig::default(), &mut rng);
            assert!((10.0..=100.0).contains(&s.battery_soc_pct));
        }
    }
}
