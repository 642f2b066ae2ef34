//! Position sources for "use my location".
//!
//! A missing capability is `None` rather than a geolocator that always fails,
//! so the controller can tell "unsupported" apart from "denied".

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt::Debug;

use crate::{
    config::{Config, GeolocationMode},
    error::WeatherError,
    model::Coordinate,
};

#[async_trait]
pub trait Geolocator: Send + Sync + Debug {
    async fn current_position(&self) -> Result<Coordinate, WeatherError>;
}

/// Always reports the same coordinate.
#[derive(Debug, Clone, Copy)]
pub struct FixedGeolocator {
    coordinate: Coordinate,
}

impl FixedGeolocator {
    pub fn new(coordinate: Coordinate) -> Self {
        Self { coordinate }
    }
}

#[async_trait]
impl Geolocator for FixedGeolocator {
    async fn current_position(&self) -> Result<Coordinate, WeatherError> {
        Ok(self.coordinate)
    }
}

/// Resolves the position from the public IP address via an ip-api.com style
/// JSON endpoint.
#[derive(Debug, Clone)]
pub struct IpGeolocator {
    service_url: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct IpLookupResponse {
    status: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

impl IpGeolocator {
    pub fn new(service_url: impl Into<String>) -> Self {
        Self {
            service_url: service_url.into(),
            http: Client::new(),
        }
    }

    async fn lookup(&self) -> Result<Coordinate, String> {
        let res = self
            .http
            .get(&self.service_url)
            .send()
            .await
            .map_err(|e| format!("request failed: {e}"))?;

        if !res.status().is_success() {
            return Err(format!("lookup returned status {}", res.status()));
        }

        let body: IpLookupResponse = res
            .json()
            .await
            .map_err(|e| format!("unexpected response: {e}"))?;

        if body.status.as_deref().is_some_and(|s| s != "success") {
            return Err(format!("lookup reported status {:?}", body.status));
        }

        match (body.lat, body.lon) {
            (Some(lat), Some(lon)) => Ok(Coordinate::new(lat, lon)),
            _ => Err("response has no coordinates".to_string()),
        }
    }
}

#[async_trait]
impl Geolocator for IpGeolocator {
    async fn current_position(&self) -> Result<Coordinate, WeatherError> {
        match self.lookup().await {
            Ok(coordinate) => {
                tracing::debug!(%coordinate, "resolved position from IP address");
                Ok(coordinate)
            }
            Err(reason) => {
                tracing::warn!(url = %self.service_url, "IP geolocation failed: {reason}");
                Err(WeatherError::GeolocationDenied)
            }
        }
    }
}

/// Build the geolocation capability described by `config`, if any.
pub fn geolocator_from_config(config: &Config) -> Option<Box<dyn Geolocator>> {
    let geo = &config.geolocation;
    match geo.mode {
        GeolocationMode::None => None,
        GeolocationMode::Ip => Some(Box::new(IpGeolocator::new(geo.service_url()))),
        GeolocationMode::Fixed => match geo.fixed_coordinate() {
            Some(coordinate) => Some(Box::new(FixedGeolocator::new(coordinate))),
            None => {
                tracing::warn!(
                    "geolocation mode is \"fixed\" but latitude/longitude are not both set"
                );
                None
            }
        },
    }
}
