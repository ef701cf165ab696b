use storefinder_db::DbError;
use storefinder_geocoder::GeocodeError;
use thiserror::Error;

/// Failures that end a store search without a rendered result.
#[derive(Debug, Error)]
pub enum LocatorError {
    /// Unparseable date, or an unknown or inactive category slug.
    #[error("not found: {0}")]
    NotFound(String),
    /// Malformed radius or locality.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Any geocoder failure other than quota exhaustion.
    #[error("geocoder failed: {0}")]
    Geocoder(#[from] GeocodeError),
    #[error("location store failed: {0}")]
    Store(#[from] DbError),
}

impl LocatorError {
    /// Stable machine-readable code, used as the API error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::BadRequest(_) => "bad_request",
            Self::Geocoder(_) => "geocoder_error",
            Self::Store(_) => "internal_error",
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
