//! Current weather for a site: live from OpenWeatherMap, or synthetic.
//!
//! Fallback policy when a live fetch fails:
//!
//! | error                    | sample served                      |
//! |--------------------------|------------------------------------|
//! | `MissingApiKey`          | synthetic (noisy around climate)   |
//! | `Status` (non-2xx reply) | fixed default record               |
//! | `Http`, decode errors    | fixed default record               |
//!
//! A rejected key or an upstream outage therefore yields the fixed record,
//! not synthetic scatter; only a missing key is treated as "no live source".

use std::time::Duration;

use rand::Rng;
use rand_distr::{Distribution, Normal};
use reqwest::Client;
use tracing::{debug, warn};

use crate::config::WeatherConfig;
use crate::error::FetchError;
use crate::models::weather::{GeoPoint, OwmCurrentResponse, WeatherOrigin, WeatherSample};

#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl WeatherProvider {
    pub fn new(cfg: &WeatherConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(cfg.timeout_s))
                .build()
                .unwrap_or_default(),
            api_key: cfg.api_key.trim().to_string(),
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Current conditions, never failing. `offline` skips the network.
    pub async fn current(&self, point: GeoPoint, offline: bool) -> WeatherSample {
        if offline {
            return synthetic_sample(&mut rand::thread_rng());
        }
        match self.fetch_live(point).await {
            Ok(sample) => sample,
            Err(e) => {
                warn!("Weather data fetch failed: {}, falling back", e);
                fallback_for(&e, &mut rand::thread_rng())
            }
        }
    }

    pub async fn fetch_live(&self, point: GeoPoint) -> Result<WeatherSample, FetchError> {
        if !self.has_api_key() {
            return Err(FetchError::MissingApiKey);
        }

        let url = format!("{}/weather", self.base_url);
        debug!("Fetching weather for ({:.4}, {:.4})", point.latitude, point.longitude);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", point.latitude.to_string()),
                ("lon", point.longitude.to_string()),
                ("appid", self.api_key.clone()),
                ("units", "metric".to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let code = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status { code, body });
        }

        let resp: OwmCurrentResponse = response.json().await?;
        Ok(WeatherSample::from(resp).clamped())
    }
}

/// Maps a failed fetch to the sample that replaces it.
pub fn fallback_for<R: Rng + ?Sized>(err: &FetchError, rng: &mut R) -> WeatherSample {
    match err {
        FetchError::MissingApiKey => synthetic_sample(rng),
        _ => WeatherSample::default_sample(),
    }
}

/// Plausible mild-climate conditions with Gaussian scatter.
pub fn synthetic_sample<R: Rng + ?Sized>(rng: &mut R) -> WeatherSample {
    WeatherSample {
        temperature_c: noisy(rng, 22.5, 2.0),
        humidity_pct: noisy(rng, 65.0, 10.0),
        wind_speed_m_s: noisy(rng, 3.2, 1.0),
        cloud_cover_pct: noisy(rng, 25.0, 15.0),
        pressure_hpa: 1013.25,
        description: "Partly cloudy".to_string(),
        origin: WeatherOrigin::Synthetic,
    }
    .clamped()
}

pub(crate) fn noisy<R: Rng + ?Sized>(rng: &mut R, mean: f64, std_dev: f64) -> f64 {
    Normal::new(mean, std_dev)
        .map(|n| n.sample(rng))
        .unwrap_or(mean)
}
