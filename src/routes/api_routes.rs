use axum::{routing::{get, post}, Router};
use crate::controllers::evaluation_controller::{
    // Evaluations
    get_latest_evaluation, get_live_evaluation, post_decide,
    // Models & site
    get_wind_curve, get_location,
    // Settings & health
    get_offline_mode, set_offline_mode, get_health,
};
use crate::shared_state::SharedState;

/// Build the `/api/*` sub-router.
/// Handlers extract `State<AppState>` and/or `State<Config>` via
/// `FromRef<SharedState>` — a single `.with_state(shared)` covers both.
pub fn api_routes(shared: SharedState) -> Router {
    Router::new()
        .route("/evaluation",              get(get_latest_evaluation))
        .route("/evaluation/live",         get(get_live_evaluation))
        .route("/decide",                  post(post_decide))
        .route("/wind/curve",              get(get_wind_curve))
        .route("/location",                get(get_location))
        .route("/settings/offline-mode",   get(get_offline_mode).post(set_offline_mode))
        .route("/health",                  get(get_health))
        .with_state(shared)
}
