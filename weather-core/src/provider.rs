use crate::{
    Config,
    error::WeatherError,
    model::{Coordinate, ForecastResult},
    provider::openmeteo::OpenMeteoProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openmeteo;

/// Source of hourly forecasts for a coordinate.
///
/// Implementations issue exactly one request per call and never retry.
#[async_trait]
pub trait ForecastProvider: Send + Sync + Debug {
    async fn fetch_forecast(&self, coordinate: Coordinate) -> Result<ForecastResult, WeatherError>;
}

/// Construct the forecast provider described by `config`.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn ForecastProvider>> {
    let provider = OpenMeteoProvider::from_config(&config.provider)?;
    Ok(Box::new(provider))
}
