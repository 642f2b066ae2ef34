//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - Configuration (provider endpoint, geolocation, fixed location list)
//! - The forecast client and its Open-Meteo implementation
//! - Geolocation sources for "use my location"
//! - The render state machine and its plain-text presentation
//!
//! It is used by `weather-cli`, but the view controller only needs a
//! [`RenderRegion`], so other front-ends can drive it too.

pub mod config;
pub mod error;
pub mod geolocation;
pub mod model;
pub mod provider;
pub mod render;
pub mod view;

pub use config::{Config, GeolocationConfig, GeolocationMode, LocationEntry, ProviderConfig};
pub use error::WeatherError;
pub use geolocation::{Geolocator, geolocator_from_config};
pub use model::{Coordinate, ForecastResult, HourlyReading, Location, RenderState};
pub use provider::{ForecastProvider, provider_from_config};
pub use render::{RenderRegion, render_text};
pub use view::ViewController;
