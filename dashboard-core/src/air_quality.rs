//! Air-quality reading and where it comes from.
//!
//! There is no real air-quality feed behind the dashboard yet. Readings come
//! from an [`AirQualitySource`], and the only implementation today,
//! [`SimulatedAirQuality`], draws a random score for every successful lookup.

use async_trait::async_trait;
use rand::Rng;
use serde::Serialize;
use std::fmt::{self, Debug};

use crate::model::WeatherSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AirQualityLevel {
    Good,
    Moderate,
    Poor,
    #[serde(rename = "Very Poor")]
    VeryPoor,
}

impl AirQualityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AirQualityLevel::Good => "Good",
            AirQualityLevel::Moderate => "Moderate",
            AirQualityLevel::Poor => "Poor",
            AirQualityLevel::VeryPoor => "Very Poor",
        }
    }
}

impl fmt::Display for AirQualityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display colour attached to a reading or alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tint {
    Green,
    Yellow,
    Orange,
    Red,
    Blue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AirQuality {
    pub value: u16,
    pub level: AirQualityLevel,
    pub tint: Tint,
}

impl AirQuality {
    /// Step function from score to level: <=50, <=100, <=150, above.
    pub fn classify(value: u16) -> Self {
        let (level, tint) = match value {
            0..=50 => (AirQualityLevel::Good, Tint::Green),
            51..=100 => (AirQualityLevel::Moderate, Tint::Yellow),
            101..=150 => (AirQualityLevel::Poor, Tint::Orange),
            _ => (AirQualityLevel::VeryPoor, Tint::Red),
        };

        Self { value, level, tint }
    }

    /// Reading shown before the first successful lookup.
    pub fn placeholder() -> Self {
        Self::classify(35)
    }
}

impl Default for AirQuality {
    fn default() -> Self {
        Self::placeholder()
    }
}

#[async_trait]
pub trait AirQualitySource: Send + Sync + Debug {
    async fn reading(&self, snapshot: &WeatherSnapshot) -> AirQuality;
}

/// Uniformly random score in `[0, 200)`, independent of the snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedAirQuality;

impl SimulatedAirQuality {
    pub const UPPER_BOUND: u16 = 200;
}

#[async_trait]
impl AirQualitySource for SimulatedAirQuality {
    async fn reading(&self, _snapshot: &WeatherSnapshot) -> AirQuality {
        let value = rand::thread_rng().gen_range(0..Self::UPPER_BOUND);
        AirQuality::classify(value)
    }
}
