//! Piecewise power curve of the microgrid's 15 kW wind turbine.

use crate::models::evaluation::CurvePoint;

pub const RATED_POWER_KW: f64 = 15.0;
pub const CUT_IN_M_S: f64 = 3.0;
pub const RATED_SPEED_M_S: f64 = 12.0;
pub const CUT_OUT_M_S: f64 = 25.0;

/// Upper bound on sampled intervals in [`power_curve`]
pub const MAX_CURVE_SAMPLES: usize = 10_000;

/// Generated power in kW for a hub-height wind speed in m/s.
///
/// Below cut-in the rotor does not turn, above cut-out the turbine shuts
/// down, and between rated and cut-out output saturates. In the ramp region
/// power follows the cube of the normalised speed.
pub fn power_kw(wind_speed_m_s: f64) -> f64 {
    if wind_speed_m_s < CUT_IN_M_S || wind_speed_m_s > CUT_OUT_M_S {
        0.0
    } else if wind_speed_m_s > RATED_SPEED_M_S {
        RATED_POWER_KW
    } else {
        RATED_POWER_KW * ((wind_speed_m_s - CUT_IN_M_S) / (RATED_SPEED_M_S - CUT_IN_M_S)).powi(3)
    }
}

/// Samples the curve from 0 to `max_speed_m_s` inclusive.
/// A non-positive or NaN step yields an empty curve; a step too fine for
/// [`MAX_CURVE_SAMPLES`] intervals is truncated at that count.
pub fn power_curve(step_m_s: f64, max_speed_m_s: f64) -> Vec<CurvePoint> {
    if step_m_s.is_nan() || step_m_s <= 0.0 || !max_speed_m_s.is_finite() || max_speed_m_s < 0.0 {
        return Vec::new();
    }

    // 0.3 / 0.1 is 2.9999999999999996
    let samples = ((max_speed_m_s / step_m_s) + 1e-9).floor();
    let samples = if samples >= MAX_CURVE_SAMPLES as f64 { MAX_CURVE_SAMPLES } else { samples as usize };
    (0..=samples)
        .map(|i| {
            let speed = i as f64 * step_m_s;
            CurvePoint {
                wind_speed_m_s: speed,
                power_kw: power_kw(speed),
            }
        })
        .collect()
}
