//! Client for the Google Geocoding REST API.
//!
//! One request per call, no retries. Provider-side failures are surfaced as
//! [`GeocodeError`] variants so callers can tell quota exhaustion apart from
//! every other failure.

pub mod client;
pub mod error;
pub mod types;

pub use client::{GeocodeMatch, GoogleGeocoder};
pub use error::GeocodeError;
