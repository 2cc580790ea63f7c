//! Site location resolution.
//!
//! The provider is chosen explicitly through [`LocationConfig`]; nothing is
//! cached between requests except the value resolved at startup.

use reqwest::Client;
use tracing::{info, warn};

use crate::config::{LocationConfig, LocationMode};
use crate::error::FetchError;
use crate::models::weather::{GeoPoint, IpApiResponse, Location, LocationSource};

const IP_API_URL: &str = "http://ip-api.com/json/";

#[derive(Debug, Clone)]
pub enum LocationProvider {
    /// Coordinates reported by the caller's browser
    Browser { point: GeoPoint, timezone: Option<String> },
    Manual(Location),
    IpFallback { url: String },
    Default,
}

impl LocationProvider {
    pub fn from_config(cfg: &LocationConfig) -> Self {
        match cfg.mode {
            LocationMode::Manual => match (cfg.latitude, cfg.longitude) {
                (Some(lat), Some(lon)) => LocationProvider::Manual(Location {
                    point: GeoPoint::new(lat, lon),
                    city: cfg.city.clone().unwrap_or_else(|| "Custom".to_string()),
                    country: cfg.country.clone().unwrap_or_default(),
                    timezone: cfg.timezone.clone().unwrap_or_else(|| "UTC".to_string()),
                    source: LocationSource::Manual,
                }),
                _ => {
                    warn!("Manual location mode without latitude/longitude, using default location");
                    LocationProvider::Default
                }
            },
            // Browser coordinates arrive per request; resolve something sane for the background loop
            LocationMode::Browser | LocationMode::Ip => LocationProvider::IpFallback {
                url: IP_API_URL.to_string(),
            },
            LocationMode::Default => LocationProvider::Default,
        }
    }

    /// Resolves the location. Failed lookups degrade to the default location.
    pub async fn resolve(&self, client: &Client) -> Location {
        match self {
            LocationProvider::Browser { point, timezone } => browser_location(*point, timezone.as_deref()),
            LocationProvider::Manual(location) => location.clone(),
            LocationProvider::IpFallback { url } => match lookup_ip(client, url).await {
                Ok(location) => {
                    info!(
                        "Location detected: {}, {} ({:.4}, {:.4})",
                        location.city, location.country, location.point.latitude, location.point.longitude
                    );
                    location
                }
                Err(e) => {
                    warn!("Location detection failed: {}, using default location", e);
                    Location::default_location()
                }
            },
            LocationProvider::Default => Location::default_location(),
        }
    }
}

fn browser_location(point: GeoPoint, timezone: Option<&str>) -> Location {
    Location {
        point,
        city: "Browser location".to_string(),
        country: String::new(),
        timezone: timezone.unwrap_or("UTC").to_string(),
        source: LocationSource::Browser,
    }
}

async fn lookup_ip(client: &Client, url: &str) -> Result<Location, FetchError> {
    let response = client.get(url).send().await?;
    if !response.status().is_success() {
        let code = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        return Err(FetchError::Status { code, body });
    }
    let data: IpApiResponse = response.json().await?;
    location_from_ip_api(data)
}

fn location_from_ip_api(data: IpApiResponse) -> Result<Location, FetchError> {
    if data.status != "success" {
        return Err(FetchError::Geolocation(
            data.message.unwrap_or_else(|| format!("status {}", data.status)),
        ));
    }
    let (Some(lat), Some(lon)) = (data.lat, data.lon) else {
        return Err(FetchError::Geolocation("response without coordinates".to_string()));
    };
    Ok(Location {
        point: GeoPoint::new(lat, lon),
        city: data.city.unwrap_or_default(),
        country: data.country.unwrap_or_default(),
        timezone: data.timezone.unwrap_or_else(|| "UTC".to_string()),
        source: LocationSource::IpFallback,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ip_api_success() {
        let data: IpApiResponse = serde_json::from_str(
            r#"{"status":"success","country":"Italy","city":"Turin","lat":45.07,"lon":7.69,"timezone":"Europe/Rome","query":"1.2.3.4"}"#,
        )
        .unwrap();
        let loc = location_from_ip_api(data).unwrap();
        assert_eq!(loc.city, "Turin");
        assert_eq!(loc.timezone, "Europe/Rome");
        assert_eq!(loc.source, LocationSource::IpFallback);
        assert_eq!(loc.point, GeoPoint::new(45.07, 7.69));
    }

    #[test]
    fn test_ip_api_failure_status() {
        let data: IpApiResponse =
            serde_json::from_str(r#"{"status":"fail","message":"private range","query":"10.0.0.1"}"#).unwrap();
        let err = location_from_ip_api(data).unwrap_err();
        assert!(matches!(err, FetchError::Geolocation(ref m) if m == "private range"));
    }

    #[test]
    fn test_manual_config_without_coordinates_falls_back() {
        let cfg = LocationConfig { mode: LocationMode::Manual, ..Default::default() };
        assert!(matches!(LocationProvider::from_config(&cfg), LocationProvider::Default));
    }

    #[tokio::test]
    async fn test_manual_and_default_resolve_without_network() {
        let client = Client::new();
        let cfg = LocationConfig {
            mode: LocationMode::Manual,
            latitude: Some(-33.87),
            longitude: Some(151.21),
            city: Some("Sydney".to_string()),
            country: Some("Australia".to_string()),
            timezone: Some("Australia/Sydney".to_string()),
        };
        let loc = LocationProvider::from_config(&cfg).resolve(&client).await;
        assert_eq!(loc.city, "Sydney");
        assert_eq!(loc.source, LocationSource::Manual);

        let loc = LocationProvider::Default.resolve(&client).await;
        assert_eq!(loc, Location::default_location());
    }

    #[tokio::test]
    async fn test_browser_location_defaults_to_utc() {
        let provider = LocationProvider::Browser { point: GeoPoint::new(10.0, 20.0), timezone: None };
        let loc = provider.resolve(&Client::new()).await;
        assert_eq!(loc.timezone, "UTC");
        assert_eq!(loc.source, LocationSource::Browser);
    }
}
