use thiserror::Error;

/// Errors returned by the Google Geocoding client.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider refused the request because the key's quota is spent
    /// (`OVER_QUERY_LIMIT`, `OVER_DAILY_LIMIT` or HTTP 429).
    #[error("geocoder quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Any other non-`OK` status, e.g. `REQUEST_DENIED` or `INVALID_REQUEST`.
    #[error("geocoder returned {status}: {message}")]
    Api { status: String, message: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL '{base_url}': {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}

impl GeocodeError {
    /// `true` when the failure is the provider's usage quota.
    #[must_use]
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, Self::QuotaExceeded(_))
    }
}
