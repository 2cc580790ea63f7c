use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use axum::{Router, routing::get, response::Html};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use utoipa::OpenApi;
use utoipa_scalar::Scalar;

use energy_source_predictor::api_docs::ApiDoc;
use energy_source_predictor::config::Config;
use energy_source_predictor::routes::api_routes::api_routes;
use energy_source_predictor::services::location_provider::LocationProvider;
use energy_source_predictor::services::weather_provider::WeatherProvider;
use energy_source_predictor::services::{evaluator, mqtt_service};
use energy_source_predictor::shared_state::{AppState, SharedState};
use energy_source_predictor::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing();

    // 1. Load configuration
    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config.json".to_string());
    let config = Config::load(&config_path)?;
    info!("Configuration loaded from {} (location mode: {:?})", config_path, config.location.mode);

    // 2. Resolve location and weather source
    let weather = WeatherProvider::new(&config.weather);
    if weather.has_api_key() {
        info!("Connected to live weather data");
    } else {
        warn!("No OpenWeatherMap API key, using mock weather data");
    }

    let location = LocationProvider::from_config(&config.location)
        .resolve(weather.client())
        .await;

    // 3. Initialize shared state
    let state = AppState::new(location, weather, config.offline_mode);

    // 4. Background evaluation loop
    {
        let state = state.clone();
        let config = config.clone();
        let interval = Duration::from_secs(config.refresh_interval_s.max(1));

        tokio::spawn(async move {
            loop {
                let evaluation = evaluator::current_evaluation(
                    &state.weather,
                    &state.location,
                    state.is_offline(),
                    &config.microgrid,
                    &config.decision,
                )
                .await;

                info!(
                    "[UPDATE] {} {} | Irradiance: {:.1} W/m² | Wind: {:.1} m/s | Solar: {:.2} kW | Wind: {:.2} kW | {} ({})",
                    evaluation.location.city,
                    evaluation.local_time.format("%H:%M"),
                    evaluation.solar.irradiance_w_m2,
                    evaluation.weather.wind_speed_m_s,
                    evaluation.power.solar_kw,
                    evaluation.power.wind_kw,
                    evaluation.label_text,
                    evaluation.reason_text,
                );

                state.set_latest(evaluation);
                tokio::time::sleep(interval).await;
            }
        });
    }

    // 5. MQTT publisher
    tokio::spawn(mqtt_service::run_publisher(config.mqtt.clone(), state.clone()));

    // 6. Start Axum HTTP server
    let server_port = config.server.port;
    let shared = SharedState { app: state, config };
    let app = Router::new()
        .nest("/api", api_routes(shared))
        .route("/scalar", get(|| async {
            Html(Scalar::new(ApiDoc::openapi()).to_html())
        }))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([0, 0, 0, 0], server_port));
    info!("API Server listening on http://{}", addr);
    info!("Scalar UI: http://{}/scalar", addr);

    let server = axum_server::bind(addr).serve(app.into_make_service());
    tokio::select! {
        res = server => res.with_context(|| format!("HTTP server on {} failed", addr))?,
        _ = telemetry::shutdown_signal() => {}
    }

    Ok(())
}
