use utoipa::OpenApi;
use crate::controllers::evaluation_controller;
use crate::models::{evaluation, weather};

#[derive(OpenApi)]
#[openapi(
    paths(
        evaluation_controller::get_latest_evaluation,
        evaluation_controller::get_live_evaluation,
        evaluation_controller::post_decide,
        evaluation_controller::get_wind_curve,
        evaluation_controller::get_location,
        evaluation_controller::get_offline_mode,
        evaluation_controller::set_offline_mode,
        evaluation_controller::get_health
    ),
    components(
        schemas(
            evaluation::Evaluation,
            evaluation::Decision,
            evaluation::SourceLabel,
            evaluation::Reason,
            evaluation::SolarEstimate,
            evaluation::PowerOutput,
            evaluation::MicrogridState,
            evaluation::CurvePoint,
            evaluation::DecideRequest,
            evaluation::DecideResponse,
            evaluation::HealthStatus,
            evaluation::OfflineModeSetting,
            weather::Location,
            weather::GeoPoint,
            weather::LocationSource,
            weather::WeatherSample,
            weather::WeatherOrigin
        )
    ),
    tags(
        (name = "energy-source-predictor", description = "Solar vs. wind recommendation API")
    )
)]
pub struct ApiDoc;
