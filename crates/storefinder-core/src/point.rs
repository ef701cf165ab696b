//! Great-circle distance on a spherical earth.
//!
//! Distances use `geo`'s haversine metric over the mean earth radius.

use geo::{Distance, Haversine, Point};
use serde::{Deserialize, Serialize};

/// Conversion factor used for every miles figure shown to shoppers.
pub const MILES_PER_KM: f64 = 0.621_371;

/// Geographic centre of the contiguous US, shown when no point was resolved.
pub const CONTINENTAL_CENTER: GeoPoint = GeoPoint {
    lat: 39.828_2,
    lng: -98.579_5,
};

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Great-circle distance to `other` in kilometres.
    #[must_use]
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        Haversine.distance(self.to_point(), other.to_point()) / 1000.0
    }

    /// `geo` points are (x, y), so longitude comes first.
    fn to_point(self) -> Point<f64> {
        Point::new(self.lng, self.lat)
    }

    /// `true` when `other` lies within `radius_km` along the earth's surface.
    #[must_use]
    pub fn is_within(&self, other: &GeoPoint, radius_km: f64) -> bool {
        self.distance_km(other) <= radius_km
    }
}

#[must_use]
pub fn km_to_miles(km: f64) -> f64 {
    km * MILES_PER_KM
}
