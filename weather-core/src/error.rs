/// Failures of a single forecast or geolocation request.
///
/// The `Display` text is what ends up after "Error: " in the output region.
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Failed to fetch weather data")]
    FetchFailed,
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Geolocation is not supported by this browser.")]
    GeolocationUnavailable,
    #[error("Unable to retrieve your location.")]
    GeolocationDenied,
}

impl From<serde_json::Error> for WeatherError {
    fn from(err: serde_json::Error) -> Self {
        WeatherError::Parse(err.to_string())
    }
}
