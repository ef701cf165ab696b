//! HTTP client for the Google Geocoding API.
//!
//! Wraps `reqwest` with provider-specific status handling. The API always
//! answers `200 OK` and reports failures through the `"status"` field of the
//! JSON envelope; [`GoogleGeocoder::geocode`] maps those statuses onto
//! [`GeocodeError`] or an empty result.

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};

use crate::error::GeocodeError;
use crate::types::GeocodeResponse;

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

/// A single resolved coordinate plus the provider's canonical address.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeMatch {
    pub latitude: f64,
    pub longitude: f64,
    pub formatted_address: String,
}

/// Client for the Google Geocoding API.
///
/// Use [`GoogleGeocoder::new`] for production or
/// [`GoogleGeocoder::with_base_url`] to point at a mock server in tests.
pub struct GoogleGeocoder {
    client: Client,
    api_key: String,
    base_url: Url,
}

impl GoogleGeocoder {
    /// Creates a new client pointed at the production Geocoding API.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, GeocodeError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom endpoint URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`GeocodeError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(5))
            .user_agent("storefinder/0.1 (store-locator)")
            .build()?;

        let base_url = Url::parse(base_url).map_err(|e| GeocodeError::InvalidBaseUrl {
            base_url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
        })
    }

    /// Geocodes a free-text address and returns the first usable match.
    ///
    /// `Ok(None)` means the provider answered but produced no usable
    /// coordinate (`ZERO_RESULTS`, or a first result without a location).
    ///
    /// # Errors
    ///
    /// - [`GeocodeError::QuotaExceeded`] when the key's quota is spent.
    /// - [`GeocodeError::Api`] for any other non-`OK` status.
    /// - [`GeocodeError::Http`] on network failure or non-2xx HTTP status.
    /// - [`GeocodeError::Deserialize`] if the body is not the expected JSON.
    pub async fn geocode(&self, address: &str) -> Result<Option<GeocodeMatch>, GeocodeError> {
        let url = self.build_url(address);
        let response = self.client.get(url).send().await?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(GeocodeError::QuotaExceeded(
                "HTTP 429 from geocoding endpoint".to_string(),
            ));
        }

        let body = response.error_for_status()?.text().await?;
        let parsed: GeocodeResponse =
            serde_json::from_str(&body).map_err(|e| GeocodeError::Deserialize {
                context: format!("geocode(address={address})"),
                source: e,
            })?;

        Self::interpret(parsed, address)
    }

    /// Builds the request URL with percent-encoded query parameters.
    fn build_url(&self, address: &str) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("address", address)
            .append_pair("key", &self.api_key);
        url
    }

    fn interpret(
        response: GeocodeResponse,
        address: &str,
    ) -> Result<Option<GeocodeMatch>, GeocodeError> {
        let message = response.error_message.unwrap_or_default();

        match response.status.as_str() {
            "OK" => {}
            "ZERO_RESULTS" => {
                tracing::debug!(address, "geocoder returned zero results");
                return Ok(None);
            }
            "OVER_QUERY_LIMIT" | "OVER_DAILY_LIMIT" => {
                return Err(GeocodeError::QuotaExceeded(message));
            }
            other => {
                return Err(GeocodeError::Api {
                    status: other.to_string(),
                    message,
                });
            }
        }

        let Some(first) = response.results.into_iter().next() else {
            return Ok(None);
        };

        let location = first.geometry.and_then(|g| g.location);
        let Some((latitude, longitude)) = location.and_then(|loc| loc.lat.zip(loc.lng)) else {
            tracing::debug!(address, "first geocoder result has no usable location");
            return Ok(None);
        };

        Ok(Some(GeocodeMatch {
            latitude,
            longitude,
            formatted_address: first
                .formatted_address
                .unwrap_or_else(|| address.to_string()),
        }))
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
