//! Fetch orchestration for the dashboard.
//!
//! [`Dashboard`] owns the current [`DashboardState`] and is the only writer of
//! network outcomes into it. Every fetch is tagged with a sequence number; when
//! the user resubmits before an earlier lookup settles, the earlier response is
//! dropped instead of overwriting the newer request's result.

use chrono::{DateTime, Utc};
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::{
    air_quality::{AirQualitySource, SimulatedAirQuality},
    provider::WeatherProvider,
    state::DashboardState,
    view::DashboardView,
};

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

pub struct Dashboard {
    provider: Box<dyn WeatherProvider>,
    air_quality: Box<dyn AirQualitySource>,
    clock: Clock,
    next_request: AtomicU64,
    state: RwLock<DashboardState>,
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("provider", &self.provider)
            .field("air_quality", &self.air_quality)
            .field("next_request", &self.next_request)
            .finish_non_exhaustive()
    }
}

impl Dashboard {
    pub fn new(provider: Box<dyn WeatherProvider>, default_city: impl Into<String>) -> Self {
        Self {
            provider,
            air_quality: Box::new(SimulatedAirQuality),
            clock: Arc::new(Utc::now),
            next_request: AtomicU64::new(0),
            state: RwLock::new(DashboardState::new(default_city, false)),
        }
    }

    pub fn with_air_quality(mut self, source: Box<dyn AirQualitySource>) -> Self {
        self.air_quality = source;
        self
    }

    /// Replace the wall clock used for the day/night decision.
    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn with_dark_mode(mut self, dark_mode: bool) -> Self {
        let state = self.state.get_mut();
        if state.dark_mode() != dark_mode {
            *state = state.clone().with_dark_mode_toggled();
        }
        self
    }

    pub async fn state(&self) -> DashboardState {
        self.state.read().await.clone()
    }

    pub async fn view(&self) -> DashboardView {
        DashboardView::from_state(&*self.state.read().await)
    }

    /// Initial fetch for whatever city the state was created with.
    pub async fn start(&self) -> DashboardState {
        let city = self.state.read().await.city().to_string();
        self.fetch(city).await
    }

    pub async fn submit(&self, city: impl Into<String>) -> DashboardState {
        let city = city.into();
        self.set_city(city.clone()).await;
        self.fetch(city).await
    }

    /// Updates the city text without fetching.
    pub async fn set_city(&self, city: impl Into<String>) -> DashboardState {
        let mut state = self.state.write().await;
        *state = state.clone().with_city(city);
        state.clone()
    }

    pub async fn toggle_dark_mode(&self) -> DashboardState {
        let mut state = self.state.write().await;
        *state = state.clone().with_dark_mode_toggled();
        state.clone()
    }

    async fn fetch(&self, city: String) -> DashboardState {
        // Numbered under the write lock so issue order matches `pending` order.
        let request = {
            let mut state = self.state.write().await;
            let request = self.next_request.fetch_add(1, Ordering::Relaxed) + 1;
            *state = state.clone().loading(request);
            request
        };
        debug!(request, city = %city, "weather lookup started");

        let outcome = match self.provider.get_weather(&city).await {
            Ok(snapshot) => {
                let is_night = snapshot.is_night_at((self.clock)());
                let air_quality = self.air_quality.reading(&snapshot).await;
                Ok((snapshot, is_night, air_quality))
            }
            Err(err) => Err(err),
        };

        let mut state = self.state.write().await;
        if !state.is_current(request) {
            debug!(request, city = %city, "discarding superseded weather lookup");
            return state.clone();
        }

        *state = match outcome {
            Ok((snapshot, is_night, air_quality)) => {
                info!(
                    request,
                    city = %snapshot.location_name,
                    condition = %snapshot.condition,
                    is_night,
                    "weather lookup succeeded"
                );
                state.clone().succeeded(request, snapshot, is_night, air_quality)
            }
            Err(err) => {
                warn!(request, city = %city, error = %err, "weather lookup failed");
                state.clone().failed(request, err.user_message())
            }
        };

        state.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        air_quality::AirQuality,
        error::{LOOKUP_FAILED_MESSAGE, LookupError},
        model::{WeatherSnapshot, fixtures},
        view::ViewStatus,
    };
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use std::{collections::HashMap, sync::atomic::AtomicUsize, time::Duration};
    use tokio::sync::Semaphore;

    /// Answers from a fixed table; unknown cities get a 404.
    #[derive(Debug, Default)]
    struct TableProvider {
        cities: HashMap<String, (WeatherSnapshot, Duration)>,
    }

    impl TableProvider {
        fn with(mut self, snapshot: WeatherSnapshot, delay: Duration) -> Self {
            self.cities.insert(snapshot.location_name.clone(), (snapshot, delay));
            self
        }
    }

    #[async_trait]
    impl WeatherProvider for TableProvider {
        async fn get_weather(&self, city: &str) -> Result<WeatherSnapshot, LookupError> {
            match self.cities.get(city) {
                Some((snapshot, delay)) => {
                    tokio::time::sleep(*delay).await;
                    Ok(snapshot.clone())
                }
                None => Err(LookupError::Status {
                    status: StatusCode::NOT_FOUND,
                    body: r#"{"cod":"404","message":"city not found"}"#.to_string(),
                }),
            }
        }
    }

    /// Holds every lookup until the test releases the gate.
    #[derive(Debug)]
    struct GatedProvider {
        calls: AtomicUsize,
        gate: Semaphore,
        snapshot: WeatherSnapshot,
    }

    #[async_trait]
    impl WeatherProvider for Arc<GatedProvider> {
        async fn get_weather(&self, _city: &str) -> Result<WeatherSnapshot, LookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let _permit = self.gate.acquire().await.expect("gate stays open");
            Ok(self.snapshot.clone())
        }
    }

    #[derive(Debug)]
    struct FixedAirQuality(u16);

    #[async_trait]
    impl AirQualitySource for FixedAirQuality {
        async fn reading(&self, _snapshot: &WeatherSnapshot) -> AirQuality {
            AirQuality::classify(self.0)
        }
    }

    fn clock_at(secs: i64) -> impl Fn() -> DateTime<Utc> + Send + Sync + 'static {
        move || DateTime::from_timestamp(secs, 0).expect("valid timestamp")
    }

    async fn wait_until_issued(dashboard: &Dashboard, request: u64) {
        while !dashboard.state().await.is_current(request) {
            tokio::task::yield_now().await;
        }
    }

    fn london_dashboard(now: i64) -> Dashboard {
        let provider = TableProvider::default()
            .with(fixtures::snapshot("London", 1000, 2000), Duration::ZERO);

        Dashboard::new(Box::new(provider), "London")
            .with_clock(clock_at(now))
            .with_air_quality(Box::new(FixedAirQuality(42)))
    }

    #[tokio::test]
    async fn daytime_request_is_not_night() {
        let dashboard = london_dashboard(1500);
        let state = dashboard.submit("London").await;

        assert!(!state.is_night());
        assert!(!state.is_loading());
        assert!(state.error().is_none());
        assert_eq!(state.snapshot().map(|s| s.location_name.as_str()), Some("London"));
        assert_eq!(state.air_quality(), AirQuality::classify(42));
    }

    #[tokio::test]
    async fn request_after_sunset_is_night() {
        let dashboard = london_dashboard(2500);
        let state = dashboard.submit("London").await;

        assert!(state.is_night());
    }

    #[tokio::test]
    async fn start_fetches_default_city() {
        let dashboard = london_dashboard(1500);
        let state = dashboard.start().await;

        assert_eq!(state.city(), "London");
        assert!(state.snapshot().is_some());
        assert_eq!(dashboard.view().await.status, ViewStatus::Ready);
    }

    #[tokio::test]
    async fn not_found_keeps_previous_snapshot() {
        let dashboard = london_dashboard(1500);
        let before = dashboard.start().await;

        let after = dashboard.submit("Atlantis").await;

        assert_eq!(after.snapshot(), before.snapshot());
        assert_eq!(after.error(), Some(LOOKUP_FAILED_MESSAGE));
        assert_eq!(after.city(), "Atlantis");
        assert!(!after.is_loading());
        assert_eq!(after.air_quality(), before.air_quality());
    }

    #[tokio::test]
    async fn next_success_clears_error() {
        let dashboard = london_dashboard(1500);
        dashboard.submit("Atlantis").await;

        let state = dashboard.submit("London").await;
        assert!(state.error().is_none());
    }

    #[tokio::test]
    async fn dark_mode_toggle_does_not_touch_weather() {
        let dashboard = london_dashboard(1500).with_dark_mode(true);
        let fetched = dashboard.start().await;
        assert!(fetched.dark_mode());

        let toggled = dashboard.toggle_dark_mode().await;
        assert!(!toggled.dark_mode());
        assert_eq!(toggled.snapshot(), fetched.snapshot());
    }

    #[tokio::test(start_paused = true)]
    async fn superseded_response_is_discarded() {
        let provider = TableProvider::default()
            .with(fixtures::snapshot("Slowtown", 1000, 2000), Duration::from_secs(5))
            .with(fixtures::snapshot("Quickville", 1000, 2000), Duration::from_millis(10));

        let dashboard = Arc::new(
            Dashboard::new(Box::new(provider), "Slowtown").with_clock(clock_at(1500)),
        );

        let slow = tokio::spawn({
            let dashboard = Arc::clone(&dashboard);
            async move { dashboard.submit("Slowtown").await }
        });
        wait_until_issued(&dashboard, 1).await;

        let quick = dashboard.submit("Quickville").await;
        assert_eq!(quick.snapshot().map(|s| s.location_name.as_str()), Some("Quickville"));

        slow.await.expect("slow task");

        let settled = dashboard.state().await;
        assert_eq!(settled.snapshot().map(|s| s.location_name.as_str()), Some("Quickville"));
        assert_eq!(settled.city(), "Quickville");
        assert!(!settled.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn stale_completion_does_not_clear_loading() {
        let provider = TableProvider::default()
            .with(fixtures::snapshot("Quickville", 1000, 2000), Duration::from_millis(10))
            .with(fixtures::snapshot("Slowtown", 1000, 2000), Duration::from_secs(5));

        let dashboard =
            Arc::new(Dashboard::new(Box::new(provider), "Quickville").with_clock(clock_at(1500)));

        let quick = tokio::spawn({
            let dashboard = Arc::clone(&dashboard);
            async move { dashboard.submit("Quickville").await }
        });
        wait_until_issued(&dashboard, 1).await;

        let slow = tokio::spawn({
            let dashboard = Arc::clone(&dashboard);
            async move { dashboard.submit("Slowtown").await }
        });
        wait_until_issued(&dashboard, 2).await;

        let after_quick = quick.await.expect("quick task");
        assert!(after_quick.is_loading());
        assert!(after_quick.snapshot().is_none());

        let after_slow = slow.await.expect("slow task");
        assert!(!after_slow.is_loading());
        assert_eq!(after_slow.snapshot().map(|s| s.location_name.as_str()), Some("Slowtown"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_submits_keep_the_newest_request_pending() {
        const SUBMITS: usize = 16;

        let provider = Arc::new(GatedProvider {
            calls: AtomicUsize::new(0),
            gate: Semaphore::new(0),
            snapshot: fixtures::snapshot("London", 1000, 2000),
        });
        let dashboard = Arc::new(
            Dashboard::new(Box::new(Arc::clone(&provider)), "London").with_clock(clock_at(1500)),
        );

        let tasks: Vec<_> = (0..SUBMITS)
            .map(|_| {
                let dashboard = Arc::clone(&dashboard);
                tokio::spawn(async move { dashboard.submit("London").await })
            })
            .collect();

        while provider.calls.load(Ordering::SeqCst) < SUBMITS {
            tokio::task::yield_now().await;
        }

        // All requests are in flight; the highest number must be the pending one.
        assert!(dashboard.state().await.is_current(SUBMITS as u64));

        provider.gate.add_permits(SUBMITS);
        for task in tasks {
            task.await.expect("submit task");
        }

        let settled = dashboard.state().await;
        assert!(!settled.is_loading());
        assert!(settled.snapshot().is_some());
    }
}
