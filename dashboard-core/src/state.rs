use crate::{air_quality::AirQuality, model::WeatherSnapshot};

/// Everything the dashboard shows, as one immutable value.
///
/// Transitions consume the current value and return the next one. A fetch is
/// identified by the sequence number handed to [`DashboardState::loading`];
/// outcomes carrying any other number are stale and leave the state untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardState {
    city: String,
    snapshot: Option<WeatherSnapshot>,
    pending: Option<u64>,
    error: Option<String>,
    is_night: bool,
    dark_mode: bool,
    air_quality: AirQuality,
}

impl DashboardState {
    pub fn new(city: impl Into<String>, dark_mode: bool) -> Self {
        Self {
            city: city.into(),
            snapshot: None,
            pending: None,
            error: None,
            is_night: false,
            dark_mode,
            air_quality: AirQuality::placeholder(),
        }
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn snapshot(&self) -> Option<&WeatherSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_night(&self) -> bool {
        self.is_night
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    pub fn air_quality(&self) -> AirQuality {
        self.air_quality
    }

    /// True if `request` is the most recently issued fetch and still unsettled.
    pub fn is_current(&self, request: u64) -> bool {
        self.pending == Some(request)
    }

    #[must_use]
    pub fn with_city(self, city: impl Into<String>) -> Self {
        Self { city: city.into(), ..self }
    }

    #[must_use]
    pub fn with_dark_mode_toggled(self) -> Self {
        Self { dark_mode: !self.dark_mode, ..self }
    }

    #[must_use]
    pub fn loading(self, request: u64) -> Self {
        Self { pending: Some(request), error: None, ..self }
    }

    #[must_use]
    pub fn succeeded(
        self,
        request: u64,
        snapshot: WeatherSnapshot,
        is_night: bool,
        air_quality: AirQuality,
    ) -> Self {
        if !self.is_current(request) {
            return self;
        }

        Self {
            snapshot: Some(snapshot),
            pending: None,
            error: None,
            is_night,
            air_quality,
            ..self
        }
    }

    /// Records a failed lookup. The previous snapshot stays.
    #[must_use]
    pub fn failed(self, request: u64, message: impl Into<String>) -> Self {
        if !self.is_current(request) {
            return self;
        }

        Self { pending: None, error: Some(message.into()), ..self }
    }
}
