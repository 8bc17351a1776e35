//! Pure derivations from dashboard state to display values.
//!
//! Nothing in here touches the network or mutates state; the renderer calls
//! into this module on every redraw.

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::Serialize;
use std::fmt::Display;

use crate::{
    air_quality::{AirQuality, Tint},
    model::WeatherSnapshot,
    state::DashboardState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundKind {
    Clear,
    Clouds,
    Rain,
    Snow,
    Mist,
}

/// One of the ten background pictures: five kinds, each with a day and a night variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Background {
    pub kind: BackgroundKind,
    pub night: bool,
}

impl Background {
    /// Case-insensitive on the condition label; unknown labels fall back to clear.
    pub fn select(condition: &str, night: bool) -> Self {
        let kind = match condition.to_lowercase().as_str() {
            "clear" => BackgroundKind::Clear,
            "clouds" => BackgroundKind::Clouds,
            "rain" | "drizzle" | "thunderstorm" => BackgroundKind::Rain,
            "snow" => BackgroundKind::Snow,
            "mist" | "fog" | "haze" => BackgroundKind::Mist,
            _ => BackgroundKind::Clear,
        };

        Self { kind, night }
    }

    /// Background used before any snapshot has been fetched.
    pub fn initial() -> Self {
        Self { kind: BackgroundKind::Clear, night: false }
    }

    pub fn image_url(&self) -> &'static str {
        match (self.night, self.kind) {
            (false, BackgroundKind::Clear) => {
                "https://images.unsplash.com/photo-1601297183305-6df142704ea2?auto=format&fit=crop&w=2000&q=80"
            }
            (false, BackgroundKind::Clouds) => {
                "https://images.unsplash.com/photo-1534088568595-a066f410bcda?auto=format&fit=crop&w=2000&q=80"
            }
            (false, BackgroundKind::Rain) => {
                "https://images.unsplash.com/photo-1519692933481-e162a57d6721?auto=format&fit=crop&w=2000&q=80"
            }
            (false, BackgroundKind::Snow) => {
                "https://images.unsplash.com/photo-1478265409131-1f65c88f965c?auto=format&fit=crop&w=2000&q=80"
            }
            (false, BackgroundKind::Mist) => {
                "https://images.unsplash.com/photo-1543968996-ee822b8176ba?auto=format&fit=crop&w=2000&q=80"
            }
            (true, BackgroundKind::Clear) => {
                "https://images.unsplash.com/photo-1532074205216-d0e1f4b87368?auto=format&fit=crop&w=2000&q=80"
            }
            (true, BackgroundKind::Clouds) => {
                "https://images.unsplash.com/photo-1504608524841-42fe6f032b4b?auto=format&fit=crop&w=2000&q=80"
            }
            (true, BackgroundKind::Rain) => {
                "https://images.unsplash.com/photo-1501999635878-71cb5379c2d8?auto=format&fit=crop&w=2000&q=80"
            }
            (true, BackgroundKind::Snow) => {
                "https://images.unsplash.com/photo-1517799094725-e3453440724e?auto=format&fit=crop&w=2000&q=80"
            }
            (true, BackgroundKind::Mist) => {
                "https://images.unsplash.com/photo-1549277513-f1b32fe1f8f5?auto=format&fit=crop&w=2000&q=80"
            }
        }
    }
}

const COMPASS_POINTS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];

/// Eight-point compass label for a wind direction in degrees.
///
/// Rounds to the nearest 45° sector before wrapping, so 348.75° reads as "N".
pub fn compass_label(degrees: f64) -> &'static str {
    let sector = round_half_up(degrees / 45.0).rem_euclid(8.0);
    COMPASS_POINTS[sector as usize % COMPASS_POINTS.len()]
}

/// "6:05 AM" style clock time for an epoch-seconds instant, rendered in `tz`.
pub fn format_time<Tz>(epoch_secs: i64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match DateTime::<Utc>::from_timestamp(epoch_secs, 0) {
        Some(instant) => instant.with_timezone(tz).format("%-I:%M %p").to_string(),
        None => "--:--".to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherAlert {
    ExtremeHeat,
    Freezing,
    StrongWind,
}

impl WeatherAlert {
    pub const HEAT_THRESHOLD_C: f64 = 35.0;
    pub const FREEZING_THRESHOLD_C: f64 = 0.0;
    pub const WIND_THRESHOLD_MPS: f64 = 10.0;

    /// At most one alert; heat beats cold beats wind.
    pub fn derive(temperature_c: f64, wind_speed_mps: f64) -> Option<Self> {
        if temperature_c > Self::HEAT_THRESHOLD_C {
            Some(WeatherAlert::ExtremeHeat)
        } else if temperature_c < Self::FREEZING_THRESHOLD_C {
            Some(WeatherAlert::Freezing)
        } else if wind_speed_mps > Self::WIND_THRESHOLD_MPS {
            Some(WeatherAlert::StrongWind)
        } else {
            None
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            WeatherAlert::ExtremeHeat => {
                "Extreme heat warning! Stay hydrated and avoid direct sun exposure."
            }
            WeatherAlert::Freezing => "Freezing conditions! Bundle up and be careful of ice.",
            WeatherAlert::StrongWind => "Strong winds! Secure loose objects and exercise caution.",
        }
    }

    pub fn tint(&self) -> Tint {
        match self {
            WeatherAlert::ExtremeHeat => Tint::Red,
            WeatherAlert::Freezing => Tint::Blue,
            WeatherAlert::StrongWind => Tint::Yellow,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum ViewStatus {
    /// Nothing fetched yet and nothing in flight.
    Empty,
    Loading,
    Failed(String),
    Ready,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub city_input: String,
    pub status: ViewStatus,
    pub dark_mode: bool,
    pub is_night: bool,
    pub background: Background,
    pub background_url: &'static str,
    /// Only present when `status` is [`ViewStatus::Ready`].
    pub weather: Option<WeatherPanel>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherPanel {
    pub heading: String,
    pub temperature: String,
    pub range: String,
    pub description: String,
    pub alert: Option<WeatherAlert>,
    pub feels_like: String,
    pub humidity: String,
    pub wind_speed: String,
    pub wind_direction_deg: f64,
    pub wind_compass: &'static str,
    pub visibility: String,
    pub sunrise: String,
    pub sunset: String,
    pub pressure: String,
    pub cloud_cover: String,
    pub air_quality: AirQuality,
    pub air_quality_label: String,
}

impl DashboardView {
    pub fn from_state(state: &DashboardState) -> Self {
        Self::from_state_in(state, &Local)
    }

    pub fn from_state_in<Tz>(state: &DashboardState, tz: &Tz) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let status = if state.is_loading() {
            ViewStatus::Loading
        } else if let Some(message) = state.error() {
            ViewStatus::Failed(message.to_string())
        } else if state.snapshot().is_some() {
            ViewStatus::Ready
        } else {
            ViewStatus::Empty
        };

        let background = match state.snapshot() {
            Some(snap) => Background::select(&snap.condition, state.is_night()),
            None => Background::initial(),
        };

        let weather = match (&status, state.snapshot()) {
            (ViewStatus::Ready, Some(snap)) => {
                Some(WeatherPanel::build(snap, state.air_quality(), tz))
            }
            _ => None,
        };

        Self {
            city_input: state.city().to_string(),
            status,
            dark_mode: state.dark_mode(),
            is_night: state.is_night(),
            background,
            background_url: background.image_url(),
            weather,
        }
    }
}

impl WeatherPanel {
    fn build<Tz>(snap: &WeatherSnapshot, air_quality: AirQuality, tz: &Tz) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let temp = &snap.temperature;

        Self {
            heading: format!("{}, {}", snap.location_name, snap.country),
            temperature: format!("{}°C", round_half_up(temp.current)),
            range: format!("{:.1}° / {:.1}°", temp.min, temp.max),
            description: snap.description.clone(),
            alert: WeatherAlert::derive(temp.current, snap.wind.speed),
            feels_like: format!("{}°C", round_half_up(temp.feels_like)),
            humidity: format!("{}%", snap.humidity_pct),
            wind_speed: format!("{} m/s", snap.wind.speed),
            wind_direction_deg: snap.wind.direction_deg,
            wind_compass: compass_label(snap.wind.direction_deg),
            visibility: format!("{:.1} km", f64::from(snap.visibility_m) / 1000.0),
            sunrise: format_time(snap.sunrise.timestamp(), tz),
            sunset: format_time(snap.sunset.timestamp(), tz),
            pressure: format!("{} hPa", snap.pressure_hpa),
            cloud_cover: format!("{}%", snap.cloud_cover_pct),
            air_quality,
            air_quality_label: format!("{} ({})", air_quality.level, air_quality.value),
        }
    }
}

/// Halves round toward positive infinity, so -0.5 becomes 0 rather than -1.
fn round_half_up(value: f64) -> f64 {
    let rounded = (value + 0.5).floor();
    // avoid printing "-0"
    if rounded == 0.0 { 0.0 } else { rounded }
}
