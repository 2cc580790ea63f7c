use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Instant;

use axum::extract::FromRef;

use crate::config::Config;
use crate::models::evaluation::Evaluation;
use crate::models::weather::Location;
use crate::services::weather_provider::WeatherProvider;

#[derive(Clone, Debug)]
pub struct AppState {
    /// Most recent background evaluation
    pub latest: Arc<RwLock<Option<Evaluation>>>,
    /// Location resolved at startup
    pub location: Arc<Location>,
    pub weather: WeatherProvider,
    /// Offline mode flag — toggled at runtime via API
    pub offline_mode: Arc<AtomicBool>,
    pub mqtt_connected: Arc<AtomicBool>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(location: Location, weather: WeatherProvider, offline_mode_default: bool) -> Self {
        Self {
            latest: Arc::new(RwLock::new(None)),
            location: Arc::new(location),
            weather,
            offline_mode: Arc::new(AtomicBool::new(offline_mode_default)),
            mqtt_connected: Arc::new(AtomicBool::new(false)),
            started_at: Instant::now(),
        }
    }

    pub fn is_offline(&self) -> bool {
        self.offline_mode.load(Ordering::Relaxed)
    }

    pub fn set_offline(&self, value: bool) {
        self.offline_mode.store(value, Ordering::Relaxed);
    }

    pub fn is_mqtt_connected(&self) -> bool {
        self.mqtt_connected.load(Ordering::Relaxed)
    }

    pub fn set_mqtt_connected(&self, value: bool) {
        self.mqtt_connected.store(value, Ordering::Relaxed);
    }

    pub fn set_latest(&self, evaluation: Evaluation) {
        if let Ok(mut slot) = self.latest.write() {
            *slot = Some(evaluation);
        }
    }

    pub fn get_latest(&self) -> Option<Evaluation> {
        self.latest.read().ok().and_then(|slot| slot.clone())
    }
}

/// Router state; handlers pull `State<AppState>` or `State<Config>` out of it.
#[derive(Clone)]
pub struct SharedState {
    pub app: AppState,
    pub config: Config,
}

impl FromRef<SharedState> for AppState {
    fn from_ref(shared: &SharedState) -> Self {
        shared.app.clone()
    }
}

impl FromRef<SharedState> for Config {
    fn from_ref(shared: &SharedState) -> Self {
        shared.config.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WeatherConfig;

    #[test]
    fn test_offline_toggle_and_latest_slot() {
        let state = AppState::new(
            Location::default_location(),
            WeatherProvider::new(&WeatherConfig::default()),
            false,
        );
        assert!(!state.is_offline());
        state.set_offline(true);
        assert!(state.clone().is_offline());
        assert!(state.get_latest().is_none());
    }
}
