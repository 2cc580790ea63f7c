//! ============================================================
//!  Solar Elevation & Irradiance Estimation
//!
//!  Algorithm pipeline:
//!   1. Solar geometry  – Cooper declination, hour angle from the
//!                        local wall-clock time, elevation angle
//!   2. Clear-sky model  – 1000 W/m² scaled by sin(elevation)
//!   3. Cloud attenuation – linear, full overcast removes 75 %
//! ============================================================

use chrono::{Datelike, Timelike};

use crate::models::evaluation::SolarEstimate;

// ─── Model constants ─────────────────────────────────────────
const MAX_DECLINATION_DEG: f64 = 23.45;
const CLEAR_SKY_W_M2: f64 = 1000.0;
const MAX_CLOUD_LOSS: f64 = 0.75;

/// Sun elevation above the horizon in degrees.
///
/// * `lat_deg` – geographic latitude (−90 … +90)
/// * `local`   – wall-clock time at the location (UTC when the zone is unknown)
pub fn elevation<T: Datelike + Timelike>(lat_deg: f64, local: &T) -> f64 {
    let doy = local.ordinal() as f64;
    let hour = local.hour() as f64 + local.minute() as f64 / 60.0;

    // Cooper (1969) declination
    let decl = (MAX_DECLINATION_DEG * (360.0 * (284.0 + doy) / 365.0).to_radians().sin()).to_radians();

    // Negative in the morning, positive in the afternoon
    let hour_angle = (15.0 * (hour - 12.0)).to_radians();

    let lat = lat_deg.to_radians();
    let sin_alpha = decl.sin() * lat.sin() + decl.cos() * lat.cos() * hour_angle.cos();

    // Rounding can push the argument a hair past ±1 at the poles
    sin_alpha.clamp(-1.0, 1.0).asin().to_degrees()
}

/// Estimated global horizontal irradiance in W/m², never negative.
pub fn irradiance<T: Datelike + Timelike>(lat_deg: f64, cloud_cover_pct: f64, local: &T) -> f64 {
    irradiance_at_elevation(elevation(lat_deg, local), cloud_cover_pct)
}

/// Computes both elevation and irradiance in one pass.
pub fn estimate<T: Datelike + Timelike>(lat_deg: f64, cloud_cover_pct: f64, local: &T) -> SolarEstimate {
    let elevation_deg = elevation(lat_deg, local);
    SolarEstimate {
        elevation_deg,
        irradiance_w_m2: irradiance_at_elevation(elevation_deg, cloud_cover_pct),
    }
}

fn irradiance_at_elevation(elevation_deg: f64, cloud_cover_pct: f64) -> f64 {
    if elevation_deg <= 0.0 {
        return 0.0; // sun below the horizon
    }

    let base = CLEAR_SKY_W_M2 * elevation_deg.to_radians().sin();
    let cloud_factor = 1.0 - (cloud_cover_pct / 100.0) * MAX_CLOUD_LOSS;

    (base * cloud_factor).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, min, 0).unwrap()
    }

    #[test]
    fn test_summer_solstice_noon_delhi() {
        let t = at(2025, 6, 21, 12, 0);
        assert_eq!(t.ordinal(), 172);

        let elev = elevation(28.6139, &t);
        assert!(elev > 80.0, "Elevation should be >80° at solstice noon, got {:.2}", elev);

        let clear = irradiance(28.6139, 0.0, &t);
        assert!(clear > 990.0 && clear <= 1000.0, "Clear-sky irradiance should be near 1000, got {:.1}", clear);
    }

    #[test]
    fn test_midnight_zero() {
        let t = at(2025, 6, 21, 0, 0);
        assert!(elevation(28.6139, &t) < 0.0);
        assert_eq!(irradiance(28.6139, 0.0, &t), 0.0, "Irradiance at night must be 0");
    }

    #[test]
    fn test_winter_noon_lower_than_summer() {
        let summer = elevation(45.07, &at(2025, 6, 21, 12, 0));
        let winter = elevation(45.07, &at(2025, 12, 21, 12, 0));
        assert!(winter > 15.0 && winter < 30.0, "Winter elevation should be 15-30°, got {:.1}", winter);
        assert!(summer - winter > 40.0);
    }

    #[test]
    fn test_minutes_shift_hour_angle() {
        // 11:30 and 12:30 are symmetric around solar noon
        let before = elevation(45.0, &at(2025, 3, 21, 11, 30));
        let after = elevation(45.0, &at(2025, 3, 21, 12, 30));
        assert!((before - after).abs() < 1e-9);
        assert!(before < elevation(45.0, &at(2025, 3, 21, 12, 0)));
    }

    #[test]
    fn test_poles_are_finite() {
        for lat in [-90.0, 90.0] {
            for h in [0, 6, 12, 18] {
                let t = at(2025, 6, 21, h, 0);
                let e = elevation(lat, &t);
                assert!(e.is_finite());
                assert!(irradiance(lat, 50.0, &t) >= 0.0);
            }
        }
    }

    #[test]
    fn test_cloud_cover_never_increases_irradiance() {
        let t = at(2025, 6, 21, 10, 15);
        let mut previous = f64::INFINITY;
        for cloud in (0..=100).map(|c| c as f64) {
            let g = irradiance(28.6139, cloud, &t);
            assert!(g <= previous, "irradiance rose at {}% cloud", cloud);
            previous = g;
        }
    }

    #[test]
    fn test_overcast_keeps_a_quarter() {
        let t = at(2025, 6, 21, 12, 0);
        let clear = irradiance(28.6139, 0.0, &t);
        let overcast = irradiance(28.6139, 100.0, &t);
        assert!((overcast - clear * 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_zero_whenever_sun_is_down() {
        for h in 0..24 {
            let t = at(2025, 1, 10, h, 0);
            if elevation(51.5, &t) <= 0.0 {
                assert_eq!(irradiance(51.5, 0.0, &t), 0.0);
            }
        }
    }

    #[test]
    fn test_estimate_matches_individual_calls() {
        let t = at(2025, 9, 1, 15, 45);
        let est = estimate(-33.9, 40.0, &t);
        assert_eq!(est.elevation_deg, elevation(-33.9, &t));
        assert_eq!(est.irradiance_w_m2, irradiance(-33.9, 40.0, &t));
    }
}
