//! Core library for the `weather-dashboard` terminal app.
//!
//! This crate defines:
//! - Configuration & credential handling
//! - The weather provider seam and its OpenWeather implementation
//! - Dashboard state, fetch orchestration and view-model derivation
//!
//! It is used by `dashboard-cli`, but the orchestration and derivations do not
//! depend on any terminal.

pub mod air_quality;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod model;
pub mod provider;
pub mod state;
pub mod view;

pub use air_quality::{AirQuality, AirQualityLevel, AirQualitySource, SimulatedAirQuality, Tint};
pub use config::Config;
pub use dashboard::Dashboard;
pub use error::{LOOKUP_FAILED_MESSAGE, LookupError};
pub use model::{Temperature, WeatherSnapshot, Wind};
pub use provider::{WeatherProvider, provider_from_config};
pub use state::DashboardState;
pub use view::{Background, BackgroundKind, DashboardView, ViewStatus, WeatherAlert, WeatherPanel};
