use chrono::{DateTime, Utc};

/// Temperatures in degrees Celsius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Temperature {
    pub current: f64,
    pub min: f64,
    pub max: f64,
    pub feels_like: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wind {
    /// Metres per second.
    pub speed: f64,
    /// Meteorological degrees, 0 = from the north.
    pub direction_deg: f64,
}

/// Current conditions for one city, as returned by a single lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSnapshot {
    pub location_name: String,
    pub country: String,
    /// Coarse category such as "Rain" or "Clear".
    pub condition: String,
    pub description: String,
    pub temperature: Temperature,
    pub humidity_pct: u8,
    pub pressure_hpa: u32,
    pub wind: Wind,
    pub visibility_m: u32,
    pub cloud_cover_pct: u8,
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
}

impl WeatherSnapshot {
    /// Night is anything outside `[sunrise, sunset]`.
    pub fn is_night_at(&self, now: DateTime<Utc>) -> bool {
        now < self.sunrise || now > self.sunset
    }
}
