use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::{
    config::ProviderConfig,
    error::WeatherError,
    model::{Coordinate, ForecastResult, HourlyReading},
};

use super::ForecastProvider;

const HOURLY_VARIABLES: &str = "temperature_2m,precipitation";
const TIMEZONE: &str = "GMT";
const FORECAST_DAYS: &str = "1";

/// Hourly forecasts from the Open-Meteo forecast API.
#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    base_url: String,
    http: Client,
}

impl OpenMeteoProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: Client::new(),
        }
    }

    pub fn from_config(config: &ProviderConfig) -> anyhow::Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .context("Failed to build HTTP client for Open-Meteo")?;

        Ok(Self {
            base_url: config.base_url.clone(),
            http,
        })
    }
}

/// Column-oriented hourly block of the provider response.
///
/// Series may be absent or shorter than `time`, and individual entries may be
/// `null`.
#[derive(Debug, Default, Deserialize)]
pub struct HourlySeries {
    #[serde(default)]
    pub time: Vec<String>,
    #[serde(default)]
    pub temperature_2m: Vec<Option<f64>>,
    #[serde(default)]
    pub precipitation: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct OmForecastResponse {
    hourly: HourlySeries,
}

/// Zip the parallel hourly series into one reading per `time` entry.
///
/// A value missing at some index (short series or `null`) becomes 0.0.
pub fn normalize_hourly(hourly: &HourlySeries) -> ForecastResult {
    let value_at = |series: &[Option<f64>], i: usize| {
        series.get(i).copied().flatten().unwrap_or(0.0)
    };

    hourly
        .time
        .iter()
        .enumerate()
        .map(|(i, time)| HourlyReading {
            time: time.clone(),
            temperature_celsius: value_at(&hourly.temperature_2m, i),
            precipitation_mm: value_at(&hourly.precipitation, i),
        })
        .collect::<Vec<_>>()
        .into()
}

#[async_trait]
impl ForecastProvider for OpenMeteoProvider {
    async fn fetch_forecast(
        &self,
        coordinate: Coordinate,
    ) -> Result<ForecastResult, WeatherError> {
        let latitude = coordinate.latitude.to_string();
        let longitude = coordinate.longitude.to_string();

        tracing::debug!(url = %self.base_url, %latitude, %longitude, "requesting hourly forecast");

        let res = self
            .http
            .get(&self.base_url)
            .query(&[
                ("latitude", latitude.as_str()),
                ("longitude", longitude.as_str()),
                ("hourly", HOURLY_VARIABLES),
                ("timezone", TIMEZONE),
                ("forecast_days", FORECAST_DAYS),
            ])
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            tracing::warn!(%status, "Open-Meteo forecast request failed");
            return Err(WeatherError::FetchFailed);
        }

        let body = res.text().await?;
        let parsed: OmForecastResponse = serde_json::from_str(&body)?;
        let forecast = normalize_hourly(&parsed.hourly);

        tracing::debug!(hours = forecast.len(), "received hourly forecast");
        Ok(forecast)
    }
}
