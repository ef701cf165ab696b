//! Geocoder seam and the adapter that turns provider outcomes into a point,
//! a display address and shopper-facing warnings.

use async_trait::async_trait;
use storefinder_core::GeoPoint;
use storefinder_geocoder::{GeocodeError, GeocodeMatch, GoogleGeocoder};

use crate::error::LocatorError;

pub const QUOTA_WARNING: &str = "Our geocoder is currently overloaded - please try again later!";
pub const NOT_FOUND_WARNING: &str = "We could not find that location!";

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// `Ok(None)` when the provider answered without a usable coordinate.
    async fn geocode(&self, text: &str) -> Result<Option<GeocodeMatch>, GeocodeError>;
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    async fn geocode(&self, text: &str) -> Result<Option<GeocodeMatch>, GeocodeError> {
        GoogleGeocoder::geocode(self, text).await
    }
}

/// Stands in when no provider key is configured: every lookup finds nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopGeocoder;

#[async_trait]
impl Geocoder for NoopGeocoder {
    async fn geocode(&self, _text: &str) -> Result<Option<GeocodeMatch>, GeocodeError> {
        Ok(None)
    }
}

/// Result of the geocoding step.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLocation {
    pub point: Option<GeoPoint>,
    /// The provider's formatted address on success, the raw query otherwise.
    pub display_query: String,
    pub warnings: Vec<String>,
}

/// Geocodes `query` with exactly one provider call.
///
/// An empty query skips the provider. Quota exhaustion and "no usable
/// coordinate" degrade to no point plus a warning.
///
/// # Errors
///
/// Returns [`LocatorError::Geocoder`] for any other provider failure.
pub async fn resolve_location(
    geocoder: &dyn Geocoder,
    query: &str,
) -> Result<ResolvedLocation, LocatorError> {
    let mut resolved = ResolvedLocation {
        point: None,
        display_query: query.to_string(),
        warnings: Vec::new(),
    };

    if query.is_empty() {
        return Ok(resolved);
    }

    match geocoder.geocode(query).await {
        Ok(Some(found)) => {
            resolved.point = Some(GeoPoint::new(found.latitude, found.longitude));
            resolved.display_query = found.formatted_address;
        }
        Ok(None) => {
            tracing::warn!(query, "geocoder found no usable location");
            resolved.warnings.push(NOT_FOUND_WARNING.to_string());
        }
        Err(e) if e.is_quota_exceeded() => {
            tracing::warn!(query, error = %e, "geocoder quota exceeded");
            resolved.warnings.push(QUOTA_WARNING.to_string());
        }
        Err(e) => return Err(LocatorError::Geocoder(e)),
    }

    Ok(resolved)
}
