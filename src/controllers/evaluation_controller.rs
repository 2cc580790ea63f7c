use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveTime;
use serde::Deserialize;
use tracing::info;
use utoipa::IntoParams;

use crate::config::Config;
use crate::error::ApiError;
use crate::models::evaluation::{
    CurvePoint, DecideRequest, DecideResponse, Evaluation, HealthStatus, OfflineModeSetting,
};
use crate::models::weather::{GeoPoint, Location};
use crate::services::location_provider::LocationProvider;
use crate::services::{decision_engine, evaluator, wind_model};
use crate::shared_state::AppState;

const MIN_CURVE_STEP: f64 = 0.1;
const MAX_CURVE_SPEED: f64 = 50.0;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LiveQuery {
    /// Latitude reported by the browser
    pub lat: Option<f64>,
    /// Longitude reported by the browser
    pub lon: Option<f64>,
    /// IANA time zone of the browser, e.g. `Europe/Rome`
    pub timezone: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CurveQuery {
    /// Sampling step in m/s (default 0.5, minimum 0.1)
    pub step: Option<f64>,
    /// Highest sampled speed in m/s (default 30, maximum 50)
    pub max_speed: Option<f64>,
}

/// GET /api/evaluation
/// Latest background evaluation
///
/// Returns the most recent decision computed by the refresh loop for the site location.
#[utoipa::path(
    get,
    path = "/api/evaluation",
    responses(
        (status = 200, description = "Latest evaluation", body = Evaluation),
        (status = 404, description = "No evaluation computed yet")
    )
)]
pub async fn get_latest_evaluation(State(state): State<AppState>) -> Result<Json<Evaluation>, ApiError> {
    state
        .get_latest()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("no evaluation computed yet".to_string()))
}

/// GET /api/evaluation/live
/// Evaluate now
///
/// Fetches fresh weather and evaluates immediately. When `lat` and `lon` are
/// given (browser geolocation) they replace the site location for this call.
#[utoipa::path(
    get,
    path = "/api/evaluation/live",
    params(LiveQuery),
    responses(
        (status = 200, description = "Fresh evaluation", body = Evaluation),
        (status = 400, description = "Invalid or incomplete coordinates")
    )
)]
pub async fn get_live_evaluation(
    Query(query): Query<LiveQuery>,
    State(state): State<AppState>,
    State(config): State<Config>,
) -> Result<Json<Evaluation>, ApiError> {
    let location = match requested_provider(&query)? {
        Some(provider) => provider.resolve(state.weather.client()).await,
        None => state.location.as_ref().clone(),
    };

    let evaluation = evaluator::current_evaluation(
        &state.weather,
        &location,
        state.is_offline(),
        &config.microgrid,
        &config.decision,
    )
    .await;

    Ok(Json(evaluation))
}

/// Browser provider for the query's coordinates; `None` keeps the site location.
fn requested_provider(query: &LiveQuery) -> Result<Option<LocationProvider>, ApiError> {
    match (query.lat, query.lon) {
        (Some(lat), Some(lon)) => {
            let point = GeoPoint::new(lat, lon);
            if !point.is_valid() {
                return Err(ApiError::BadRequest(format!("coordinates out of range: {}, {}", lat, lon)));
            }
            Ok(Some(LocationProvider::Browser {
                point,
                timezone: query.timezone.clone(),
            }))
        }
        (None, None) => Ok(None),
        _ => Err(ApiError::BadRequest("lat and lon must be given together".to_string())),
    }
}

/// POST /api/decide
/// Test the decision model
///
/// Runs the decision engine on caller-supplied inputs and returns the power analysis.
#[utoipa::path(
    post,
    path = "/api/decide",
    request_body = DecideRequest,
    responses(
        (status = 200, description = "Decision and power analysis", body = DecideResponse),
        (status = 400, description = "Unparseable local time")
    )
)]
pub async fn post_decide(
    State(config): State<Config>,
    Json(req): Json<DecideRequest>,
) -> Result<Json<DecideResponse>, ApiError> {
    let local_time = req.local_time.as_deref().map(parse_local_time).transpose()?;

    let decision = decision_engine::decide_with_policy(
        &config.decision,
        req.irradiance_w_m2,
        req.wind_speed_m_s,
        req.load_kw,
        req.battery_soc_pct,
        local_time,
    );
    let power = decision_engine::power_output(req.irradiance_w_m2, req.wind_speed_m_s, req.load_kw);
    let (label_text, reason_text) = decision.as_pair();

    info!("[DECIDE] {} ({})", label_text, reason_text);

    Ok(Json(DecideResponse {
        decision,
        label_text: label_text.to_string(),
        reason_text: reason_text.to_string(),
        power,
    }))
}

fn parse_local_time(raw: &str) -> Result<NaiveTime, ApiError> {
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .map_err(|_| ApiError::BadRequest(format!("invalid local_time '{}', expected HH:MM", raw)))
}

/// GET /api/wind/curve
/// Turbine power curve
///
/// Samples the 15 kW turbine curve for charting.
#[utoipa::path(
    get,
    path = "/api/wind/curve",
    params(CurveQuery),
    responses(
        (status = 200, description = "Sampled power curve", body = Vec<CurvePoint>)
    )
)]
pub async fn get_wind_curve(Query(query): Query<CurveQuery>) -> Json<Vec<CurvePoint>> {
    let step = query.step.unwrap_or(0.5).max(MIN_CURVE_STEP);
    let max_speed = query.max_speed.unwrap_or(30.0).min(MAX_CURVE_SPEED);
    Json(wind_model::power_curve(step, max_speed))
}

/// GET /api/location
/// Site location resolved at startup
#[utoipa::path(
    get,
    path = "/api/location",
    responses(
        (status = 200, description = "Site location", body = Location)
    )
)]
pub async fn get_location(State(state): State<AppState>) -> Json<Location> {
    Json(state.location.as_ref().clone())
}

/// GET /api/settings/offline-mode
#[utoipa::path(
    get,
    path = "/api/settings/offline-mode",
    responses(
        (status = 200, description = "Current offline mode", body = OfflineModeSetting)
    )
)]
pub async fn get_offline_mode(State(state): State<AppState>) -> Json<OfflineModeSetting> {
    Json(OfflineModeSetting { enabled: state.is_offline() })
}

/// POST /api/settings/offline-mode
/// Toggle synthetic weather
///
/// While enabled, no weather API calls are made and synthetic samples are used.
#[utoipa::path(
    post,
    path = "/api/settings/offline-mode",
    request_body = OfflineModeSetting,
    responses(
        (status = 200, description = "Updated offline mode", body = OfflineModeSetting)
    )
)]
pub async fn set_offline_mode(
    State(state): State<AppState>,
    Json(setting): Json<OfflineModeSetting>,
) -> Json<OfflineModeSetting> {
    state.set_offline(setting.enabled);
    info!("[SETTINGS] Offline mode set to {}", setting.enabled);
    Json(OfflineModeSetting { enabled: state.is_offline() })
}

/// GET /api/health
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service health", body = HealthStatus)
    )
)]
pub async fn get_health(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        offline_mode: state.is_offline(),
        mqtt_connected: state.is_mqtt_connected(),
        last_evaluation: state.get_latest().map(|e| e.timestamp),
    })
}
