use crate::{
    error::WeatherError,
    geolocation::Geolocator,
    model::{CURRENT_LOCATION_TITLE, Coordinate, Location, RenderState},
    provider::ForecastProvider,
    render::RenderRegion,
};

/// Drives the Idle → Loading → Result | Error cycle and redraws the region on
/// every transition.
///
/// Requests borrow the controller mutably, so one controller never has two
/// requests in flight; whichever request finishes last owns the region.
#[derive(Debug)]
pub struct ViewController<R: RenderRegion> {
    provider: Box<dyn ForecastProvider>,
    geolocator: Option<Box<dyn Geolocator>>,
    region: R,
    state: RenderState,
}

impl<R: RenderRegion> ViewController<R> {
    /// `geolocator` is `None` when the runtime has no way to locate the user.
    pub fn new(
        provider: Box<dyn ForecastProvider>,
        geolocator: Option<Box<dyn Geolocator>>,
        region: R,
    ) -> Self {
        let mut controller = Self {
            provider,
            geolocator,
            region,
            state: RenderState::Idle,
        };
        controller.region.render(&controller.state);
        controller
    }

    pub fn state(&self) -> &RenderState {
        &self.state
    }

    pub fn region(&self) -> &R {
        &self.region
    }

    /// Show the forecast for `location`.
    ///
    /// A location without a coordinate is resolved through the geolocator,
    /// exactly like [`request_current_location`](Self::request_current_location).
    pub async fn request_search(&mut self, location: Location) {
        let Some(coordinate) = location.coordinate else {
            return self.request_current_location().await;
        };

        self.transition(RenderState::Loading);
        self.fetch_and_show(location, coordinate).await;
    }

    /// Locate the user, then show the forecast for that position.
    pub async fn request_current_location(&mut self) {
        self.transition(RenderState::Loading);

        let position = match &self.geolocator {
            Some(geolocator) => geolocator.current_position().await,
            None => Err(WeatherError::GeolocationUnavailable),
        };

        match position {
            Ok(coordinate) => {
                let location = Location {
                    title: CURRENT_LOCATION_TITLE.to_string(),
                    coordinate: Some(coordinate),
                };
                self.fetch_and_show(location, coordinate).await;
            }
            Err(err) => self.fail(err),
        }
    }

    async fn fetch_and_show(&mut self, location: Location, coordinate: Coordinate) {
        tracing::debug!(title = %location.title, %coordinate, "searching forecast");

        match self.provider.fetch_forecast(coordinate).await {
            Ok(forecast) => self.transition(RenderState::Result { location, forecast }),
            Err(err) => self.fail(err),
        }
    }

    fn fail(&mut self, err: WeatherError) {
        tracing::warn!(error = ?err, "forecast request failed");
        self.transition(RenderState::Error {
            message: err.to_string(),
        });
    }

    fn transition(&mut self, next: RenderState) {
        tracing::info!(
            from = self.state.name(),
            to = next.name(),
            "render state transition"
        );
        self.state = next;
        self.region.render(&self.state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::{ForecastResult, HourlyReading},
        render::render_text,
    };
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Default)]
    struct RecordingRegion {
        states: Vec<RenderState>,
        frames: Vec<String>,
    }

    impl RenderRegion for RecordingRegion {
        fn render(&mut self, state: &RenderState) {
            self.states.push(state.clone());
            self.frames.push(render_text(state));
        }
    }

    impl RecordingRegion {
        fn state_names(&self) -> Vec<&'static str> {
            self.states.iter().map(RenderState::name).collect()
        }

        fn last_frame(&self) -> &str {
            self.frames.last().map(String::as_str).unwrap_or_default()
        }
    }

    /// Answers every call with the same forecast, or `FetchFailed` when `forecast` is `None`.
    #[derive(Debug, Clone, Default)]
    struct FakeProvider {
        forecast: Option<ForecastResult>,
        calls: Arc<Mutex<Vec<Coordinate>>>,
    }

    impl FakeProvider {
        fn returning(readings: Vec<HourlyReading>) -> Self {
            Self {
                forecast: Some(readings.into()),
                ..Default::default()
            }
        }

        fn failing() -> Self {
            Self::default()
        }

        fn calls(&self) -> Vec<Coordinate> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ForecastProvider for FakeProvider {
        async fn fetch_forecast(
            &self,
            coordinate: Coordinate,
        ) -> Result<ForecastResult, WeatherError> {
            self.calls.lock().unwrap().push(coordinate);
            self.forecast.clone().ok_or(WeatherError::FetchFailed)
        }
    }

    #[derive(Debug)]
    struct FakeGeolocator(Option<Coordinate>);

    #[async_trait]
    impl Geolocator for FakeGeolocator {
        async fn current_position(&self) -> Result<Coordinate, WeatherError> {
            self.0.ok_or(WeatherError::GeolocationDenied)
        }
    }

    fn view_with(
        provider: &FakeProvider,
        geolocator: Option<FakeGeolocator>,
    ) -> ViewController<RecordingRegion> {
        let geolocator = geolocator.map(|g| Box::new(g) as Box<dyn Geolocator>);
        ViewController::new(
            Box::new(provider.clone()),
            geolocator,
            RecordingRegion::default(),
        )
    }

    fn hours() -> Vec<HourlyReading> {
        vec![
            HourlyReading {
                time: "2024-05-01T00:00".into(),
                temperature_celsius: 5.5,
                precipitation_mm: 0.0,
            },
            HourlyReading {
                time: "2024-05-01T01:00".into(),
                temperature_celsius: 5.0,
                precipitation_mm: 0.3,
            },
        ]
    }

    fn reykjavik() -> Location {
        Location::new("Reykjavík", Coordinate::new(64.1355, -21.8954))
    }

    #[tokio::test]
    async fn search_goes_idle_loading_result() {
        let provider = FakeProvider::returning(hours());
        let mut view = view_with(&provider, None);

        view.request_search(reykjavik()).await;

        assert_eq!(view.region().state_names(), ["idle", "loading", "result"]);
        assert_eq!(provider.calls(), [Coordinate::new(64.1355, -21.8954)]);
        assert_eq!(view.region().frames[1], "Loading...\n");

        let frame = view.region().last_frame();
        let lines: Vec<&str> = frame.lines().collect();
        assert_eq!(lines[0], "Weather results for: Reykjavík");
        // blank line, header row, then one row per hour
        assert_eq!(lines.len(), 2 + 1 + 2);
        assert!(lines[3].contains("5.5") && lines[3].ends_with("0.0"));
        assert!(lines[4].contains("5.0") && lines[4].ends_with("0.3"));
    }

    #[tokio::test]
    async fn fetch_failure_renders_error_line() {
        let mut view = view_with(&FakeProvider::failing(), None);

        view.request_search(reykjavik()).await;

        assert_eq!(view.region().state_names(), ["idle", "loading", "error"]);
        assert_eq!(
            view.region().last_frame(),
            "Error: Failed to fetch weather data\n"
        );
    }

    #[tokio::test]
    async fn missing_geolocation_fails_without_fetching() {
        let provider = FakeProvider::returning(hours());
        let mut view = view_with(&provider, None);

        view.request_current_location().await;

        assert_eq!(view.region().state_names(), ["idle", "loading", "error"]);
        assert_eq!(
            view.state(),
            &RenderState::Error {
                message: "Geolocation is not supported by this browser.".into()
            }
        );
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn denied_geolocation_renders_error() {
        let provider = FakeProvider::returning(hours());
        let mut view = view_with(&provider, Some(FakeGeolocator(None)));

        view.request_current_location().await;

        assert_eq!(
            view.region().last_frame(),
            "Error: Unable to retrieve your location.\n"
        );
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn current_location_is_titled_your_location() {
        let here = Coordinate::new(35.6764, 139.65);
        let provider = FakeProvider::returning(hours());
        let mut view = view_with(&provider, Some(FakeGeolocator(Some(here))));

        view.request_current_location().await;

        assert_eq!(provider.calls(), [here]);
        match view.state() {
            RenderState::Result { location, forecast } => {
                assert_eq!(location.title, "Your Location");
                assert_eq!(location.coordinate, Some(here));
                assert_eq!(forecast.len(), 2);
            }
            other => panic!("expected result, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn coordinate_less_location_uses_geolocation() {
        let here = Coordinate::new(1.0, 2.0);
        let provider = FakeProvider::returning(vec![]);
        let mut view = view_with(&provider, Some(FakeGeolocator(Some(here))));

        view.request_search(Location::current()).await;

        assert_eq!(view.region().state_names(), ["idle", "loading", "result"]);
        assert_eq!(provider.calls(), [here]);
        assert!(view.region().last_frame().ends_with("Precipitation (mm)\n"));
    }

    #[tokio::test]
    async fn new_search_after_error_replaces_output() {
        let mut view = view_with(&FakeProvider::failing(), None);
        view.request_current_location().await;
        assert_eq!(view.state().name(), "error");

        view.request_search(reykjavik()).await;

        assert_eq!(
            view.region().state_names(),
            ["idle", "loading", "error", "loading", "error"]
        );
        assert_eq!(
            view.region().last_frame(),
            "Error: Failed to fetch weather data\n"
        );
    }
}
