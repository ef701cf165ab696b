//! Shared domain types and configuration for the store finder.

mod app_config;
mod calendar;
mod config;
mod point;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use calendar::{DateBucket, RoadshowWindow};
pub use config::{load_app_config, load_app_config_from_env};
pub use point::{km_to_miles, GeoPoint, CONTINENTAL_CENTER, MILES_PER_KM};

/// Category slug reserved for the retail-partner roadshow listing.
pub const ROADSHOW_CATEGORY_SLUG: &str = "costco-roadshow";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
