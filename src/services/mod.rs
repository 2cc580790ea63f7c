pub mod decision_engine;
pub mod evaluator;
pub mod location_provider;
pub mod mqtt_service;
pub mod solar_model;
pub mod weather_provider;
pub mod wind_model;
