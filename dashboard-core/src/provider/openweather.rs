use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::{
    error::LookupError,
    model::{Temperature, WeatherSnapshot, Wind},
};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            http: Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn current_url(&self) -> String {
        format!("{}/weather", self.base_url)
    }

    async fn fetch_current(&self, city: &str) -> Result<WeatherSnapshot, LookupError> {
        debug!(city, "requesting current weather from OpenWeather");

        let res = self
            .http
            .get(self.current_url())
            .query(&[("q", city), ("appid", self.api_key.as_str()), ("units", "metric")])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(LookupError::Status { status, body: truncate_body(&body) });
        }

        parse_current(&body)
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn get_weather(&self, city: &str) -> Result<WeatherSnapshot, LookupError> {
        self.fetch_current(city).await
    }
}

/// Decode a `/weather` response body into a snapshot.
pub fn parse_current(body: &str) -> Result<WeatherSnapshot, LookupError> {
    let parsed: OwCurrentResponse = serde_json::from_str(body)?;
    parsed.into_snapshot()
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    temp_min: f64,
    temp_max: f64,
    humidity: u8,
    pressure: u32,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
    #[serde(default)]
    deg: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    #[serde(default)]
    country: String,
    sunrise: i64,
    sunset: i64,
}

#[derive(Debug, Default, Deserialize)]
struct OwClouds {
    all: u8,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    sys: OwSys,
    #[serde(default = "default_visibility")]
    visibility: u32,
    #[serde(default)]
    clouds: OwClouds,
}

// OpenWeather caps visibility at 10 km and omits it for some stations.
fn default_visibility() -> u32 {
    10_000
}

impl OwCurrentResponse {
    fn into_snapshot(self) -> Result<WeatherSnapshot, LookupError> {
        let weather = self
            .weather
            .into_iter()
            .next()
            .ok_or(LookupError::Incomplete("weather condition"))?;

        let sunrise = unix_to_utc(self.sys.sunrise).ok_or(LookupError::Incomplete("sunrise"))?;
        let sunset = unix_to_utc(self.sys.sunset).ok_or(LookupError::Incomplete("sunset"))?;

        Ok(WeatherSnapshot {
            location_name: self.name,
            country: self.sys.country,
            condition: weather.main,
            description: weather.description,
            temperature: Temperature {
                current: self.main.temp,
                min: self.main.temp_min,
                max: self.main.temp_max,
                feels_like: self.main.feels_like,
            },
            humidity_pct: self.main.humidity,
            pressure_hpa: self.main.pressure,
            wind: Wind { speed: self.wind.speed, direction_deg: self.wind.deg },
            visibility_m: self.visibility,
            cloud_cover_pct: self.clouds.all,
            sunrise,
            sunset,
        })
    }
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
