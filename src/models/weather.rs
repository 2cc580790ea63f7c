use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ─── Location ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Where a resolved location came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LocationSource {
    Browser,
    Manual,
    IpFallback,
    Default,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Location {
    pub point: GeoPoint,
    pub city: String,
    pub country: String,
    /// IANA zone name, e.g. `Asia/Kolkata`
    pub timezone: String,
    pub source: LocationSource,
}

impl Location {
    /// Delhi, India. Used whenever nothing better is known.
    pub fn default_location() -> Self {
        Self {
            point: GeoPoint::new(28.6139, 77.2090),
            city: "Delhi".to_string(),
            country: "India".to_string(),
            timezone: "Asia/Kolkata".to_string(),
            source: LocationSource::Default,
        }
    }

    /// Resolved time zone; unknown names fall back to UTC.
    pub fn tz(&self) -> Tz {
        self.timezone.parse::<Tz>().unwrap_or(Tz::UTC)
    }
}

// ─── Weather ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum WeatherOrigin {
    Live,
    Synthetic,
    Default,
}

/// Current conditions at a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WeatherSample {
    pub temperature_c: f64,
    pub humidity_pct: f64,
    pub wind_speed_m_s: f64,
    pub cloud_cover_pct: f64,
    pub pressure_hpa: f64,
    pub description: String,
    pub origin: WeatherOrigin,
}

impl WeatherSample {
    /// Fixed record served when a live fetch fails.
    pub fn default_sample() -> Self {
        Self {
            temperature_c: 20.0,
            humidity_pct: 60.0,
            wind_speed_m_s: 5.0,
            cloud_cover_pct: 30.0,
            pressure_hpa: 1013.25,
            description: "Clear sky".to_string(),
            origin: WeatherOrigin::Default,
        }
    }

    /// Pulls humidity and cloud cover into [0, 100] and wind speed to ≥ 0.
    pub fn clamped(mut self) -> Self {
        self.humidity_pct = self.humidity_pct.clamp(0.0, 100.0);
        self.cloud_cover_pct = self.cloud_cover_pct.clamp(0.0, 100.0);
        self.wind_speed_m_s = self.wind_speed_m_s.max(0.0);
        self
    }
}

// ─── OpenWeatherMap wire types ───────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct OwmCurrentResponse {
    pub main: OwmMain,
    pub wind: OwmWind,
    pub clouds: OwmClouds,
    #[serde(default)]
    pub weather: Vec<OwmCondition>,
}

#[derive(Debug, Deserialize)]
pub struct OwmMain {
    pub temp: f64,
    pub humidity: f64,
    pub pressure: f64,
}

#[derive(Debug, Deserialize)]
pub struct OwmWind {
    pub speed: f64,
}

#[derive(Debug, Deserialize)]
pub struct OwmClouds {
    pub all: f64,
}

#[derive(Debug, Deserialize)]
pub struct OwmCondition {
    pub description: String,
}

impl From<OwmCurrentResponse> for WeatherSample {
    fn from(resp: OwmCurrentResponse) -> Self {
        Self {
            temperature_c: resp.main.temp,
            humidity_pct: resp.main.humidity,
            wind_speed_m_s: resp.wind.speed,
            cloud_cover_pct: resp.clouds.all,
            pressure_hpa: resp.main.pressure,
            description: resp
                .weather
                .into_iter()
                .next()
                .map(|c| c.description)
                .unwrap_or_default(),
            origin: WeatherOrigin::Live,
        }
    }
}

// ─── ip-api.com wire types ───────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct IpApiResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub timezone: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_timezone_resolves_to_utc() {
        let mut loc = Location::default_location();
        assert_eq!(loc.tz(), chrono_tz::Asia::Kolkata);
        loc.timezone = "Mars/Olympus_Mons".to_string();
        assert_eq!(loc.tz(), Tz::UTC);
    }

    #[test]
    fn test_geopoint_bounds() {
        assert!(GeoPoint::new(90.0, -180.0).is_valid());
        assert!(!GeoPoint::new(90.5, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, 181.0).is_valid());
        assert!(!GeoPoint::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn test_clamped_sample() {
        let s = WeatherSample {
            humidity_pct: 112.0,
            cloud_cover_pct: -4.0,
            wind_speed_m_s: -0.3,
            ..WeatherSample::default_sample()
        }
        .clamped();
        assert_eq!(s.humidity_pct, 100.0);
        assert_eq!(s.cloud_cover_pct, 0.0);
        assert_eq!(s.wind_speed_m_s, 0.0);
    }

    #[test]
    fn test_owm_payload_maps_to_sample() {
        let body = r#"{
            "coord": {"lon": 77.21, "lat": 28.61},
            "weather": [{"id": 802, "main": "Clouds", "description": "scattered clouds", "icon": "03d"}],
            "main": {"temp": 31.4, "feels_like": 33.0, "pressure": 1006, "humidity": 48},
            "wind": {"speed": 4.6, "deg": 290},
            "clouds": {"all": 40},
            "name": "Delhi"
        }"#;
        let resp: OwmCurrentResponse = serde_json::from_str(body).unwrap();
        let s = WeatherSample::from(resp);
        assert_eq!(s.temperature_c, 31.4);
        assert_eq!(s.humidity_pct, 48.0);
        assert_eq!(s.pressure_hpa, 1006.0);
        assert_eq!(s.wind_speed_m_s, 4.6);
        assert_eq!(s.cloud_cover_pct, 40.0);
        assert_eq!(s.description, "scattered clouds");
        assert_eq!(s.origin, WeatherOrigin::Live);
    }
}
