//! HTTP client for the Google Geocoding API.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tracing::debug;

use super::types::{GeocodeResponse, GeocodeResult};
use crate::{REQUEST_TIMEOUT, TARGET_GEOCODE};

pub const DEFAULT_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/geocode/json";

const STATUS_OK: &str = "OK";
const STATUS_ZERO_RESULTS: &str = "ZERO_RESULTS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeocoderConfig {
    pub api_key: String,
    pub endpoint: String,
}

impl GeocoderConfig {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }
}

/// Free-text location lookup returning ranked candidates.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn search(&self, text: &str) -> Result<Vec<GeocodeResult>>;
}

pub struct GoogleGeocoder {
    config: GeocoderConfig,
    http: reqwest::Client,
}

impl GoogleGeocoder {
    pub fn new(config: GeocoderConfig) -> reqwest::Result<Self> {
        let http = reqwest::Client::builder()
            .gzip(true)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { config, http })
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    async fn search(&self, text: &str) -> Result<Vec<GeocodeResult>> {
        debug!(target: TARGET_GEOCODE, "Geocoding '{}'", text);

        let response = self
            .http
            .get(&self.config.endpoint)
            .query(&[("address", text), ("key", self.config.api_key.as_str())])
            .send()
            .await?
            .error_for_status()?;

        let body: GeocodeResponse = response.json().await?;
        into_results(body)
    }
}

fn into_results(body: GeocodeResponse) -> Result<Vec<GeocodeResult>> {
    match body.status.as_str() {
        STATUS_OK | STATUS_ZERO_RESULTS => Ok(body.results),
        status => Err(anyhow!(
            "Geocoding failed with status {}: {}",
            status,
            body.error_message.unwrap_or_default()
        )),
    }
}
