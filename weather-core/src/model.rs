use serde::{Deserialize, Serialize};

/// Title given to a location resolved through geolocation.
pub const CURRENT_LOCATION_TITLE: &str = "Your Location";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether the coordinate lies within the usual lat/lng ranges.
    ///
    /// Nothing in the fetch path enforces this; out-of-range values are sent
    /// as-is and the provider decides what to do with them.
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.latitude, self.longitude)
    }
}

/// A named point of interest. `coordinate` is `None` for "wherever I am now".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub title: String,
    pub coordinate: Option<Coordinate>,
}

impl Location {
    pub fn new(title: impl Into<String>, coordinate: Coordinate) -> Self {
        Self {
            title: title.into(),
            coordinate: Some(coordinate),
        }
    }

    pub fn current() -> Self {
        Self {
            title: CURRENT_LOCATION_TITLE.to_string(),
            coordinate: None,
        }
    }
}

/// The locations offered when no config overrides them.
pub fn builtin_locations() -> Vec<Location> {
    vec![
        Location::new("Reykjavík", Coordinate::new(64.1355, -21.8954)),
        Location::new("Akureyri", Coordinate::new(65.6835, -18.0878)),
        Location::new("New York", Coordinate::new(40.7128, -74.006)),
        Location::new("Tokyo", Coordinate::new(35.6764, 139.65)),
        Location::new("Sydney", Coordinate::new(33.8688, 151.2093)),
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyReading {
    /// ISO-8601 timestamp exactly as the provider sent it.
    pub time: String,
    pub temperature_celsius: f64,
    pub precipitation_mm: f64,
}

/// Hourly readings in the order the provider returned them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult(pub Vec<HourlyReading>);

impl ForecastResult {
    pub fn readings(&self) -> &[HourlyReading] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<HourlyReading>> for ForecastResult {
    fn from(readings: Vec<HourlyReading>) -> Self {
        Self(readings)
    }
}

/// What the output region currently shows.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RenderState {
    #[default]
    Idle,
    Loading,
    Result {
        location: Location,
        forecast: ForecastResult,
    },
    Error { message: String },
}

impl RenderState {
    pub fn name(&self) -> &'static str {
        match self {
            RenderState::Idle => "idle",
            RenderState::Loading => "loading",
            RenderState::Result { .. } => "result",
            RenderState::Error { .. } => "error",
        }
    }
}
