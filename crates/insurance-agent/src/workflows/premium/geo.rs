//! Best-effort location enrichment.
//!
//! Location only ever nudges the premium, so every provider here is
//! infallible from the caller's point of view: lookup failures are logged
//! and collapse into an empty [`LocationSignal`].

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use super::domain::{Coordinates, LocationSignal};
use crate::config::GeoConfig;

/// Resolves a location for a quote. Implementations must never fail.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn locate(&self, hint: Option<Coordinates>) -> LocationSignal;
}

/// Provider used when enrichment is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unlocated;

#[async_trait]
impl LocationProvider for Unlocated {
    async fn locate(&self, _hint: Option<Coordinates>) -> LocationSignal {
        LocationSignal::empty()
    }
}

/// Provider returning a pre-resolved signal regardless of the hint.
#[derive(Debug, Clone, Default)]
pub struct FixedLocation(pub LocationSignal);

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn locate(&self, _hint: Option<Coordinates>) -> LocationSignal {
        self.0.clone()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GeoLookupError {
    #[error("geolocation request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("geolocation response did not include coordinates")]
    MissingCoordinates,
    #[error("reverse geocoding returned no city")]
    MissingCity,
}

#[derive(Debug, Deserialize)]
struct IpLookupResponse {
    latitude: Option<f64>,
    longitude: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ReverseGeocodeResponse {
    #[serde(default)]
    results: Vec<ReverseGeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct ReverseGeocodeResult {
    #[serde(default)]
    city: Option<String>,
}

/// IP geolocation followed by Mappls-style reverse geocoding.
#[derive(Debug, Clone)]
pub struct HttpGeoEnricher {
    client: reqwest::Client,
    ip_lookup_url: String,
    reverse_base_url: String,
    reverse_api_key: Option<String>,
}

impl HttpGeoEnricher {
    pub fn from_config(config: &GeoConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.timeout.min(Duration::from_secs(2)))
            .build()?;

        Ok(Self {
            client,
            ip_lookup_url: config.ip_lookup_url.clone(),
            reverse_base_url: config.reverse_base_url.trim_end_matches('/').to_string(),
            reverse_api_key: config.reverse_api_key.clone(),
        })
    }

    async fn resolve(&self, hint: Option<Coordinates>) -> Result<LocationSignal, GeoLookupError> {
        let coordinates = match hint {
            Some(coordinates) => coordinates,
            None => self.lookup_coordinates().await?,
        };
        let signal = LocationSignal::from_coordinates(coordinates);

        let Some(api_key) = self.reverse_api_key.as_deref() else {
            debug!("reverse geocoding credential not configured; skipping city lookup");
            return Ok(signal);
        };

        let city = self.reverse_geocode(api_key, coordinates).await?;
        Ok(signal.with_city(city))
    }

    async fn lookup_coordinates(&self) -> Result<Coordinates, GeoLookupError> {
        let body: IpLookupResponse = self
            .client
            .get(&self.ip_lookup_url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        match (body.latitude, body.longitude) {
            (Some(latitude), Some(longitude)) => Ok(Coordinates {
                latitude,
                longitude,
            }),
            _ => Err(GeoLookupError::MissingCoordinates),
        }
    }

    async fn reverse_geocode(
        &self,
        api_key: &str,
        coordinates: Coordinates,
    ) -> Result<String, GeoLookupError> {
        let url = format!("{}/{}/rev_geocode", self.reverse_base_url, api_key);
        let body: ReverseGeocodeResponse = self
            .client
            .get(url)
            .query(&[
                ("lat", coordinates.latitude.to_string()),
                ("lng", coordinates.longitude.to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        body.results
            .into_iter()
            .next()
            .and_then(|result| result.city)
            .map(|city| city.trim().to_string())
            .filter(|city| !city.is_empty())
            .ok_or(GeoLookupError::MissingCity)
    }
}

#[async_trait]
impl LocationProvider for HttpGeoEnricher {
    async fn locate(&self, hint: Option<Coordinates>) -> LocationSignal {
        match self.resolve(hint).await {
            Ok(signal) => signal,
            Err(err) => {
                // reqwest errors carry the request URL, which embeds the credential.
                let err = match err {
                    GeoLookupError::Http(source) => GeoLookupError::Http(source.without_url()),
                    other => other,
                };
                warn!(error = %err, "location enrichment unavailable; pricing without location");
                LocationSignal::empty()
            }
        }
    }
}
