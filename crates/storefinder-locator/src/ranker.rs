//! Distance annotation, ordering, and the nearest-store fallback.

use serde::Serialize;
use storefinder_core::{km_to_miles, GeoPoint};

use crate::model::StoreLocation;
use crate::selector::Selection;

/// Great-circle distance in both units. Miles are derived once, here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Distance {
    pub km: f64,
    pub miles: f64,
}

impl Distance {
    #[must_use]
    pub fn from_km(km: f64) -> Self {
        Self {
            km,
            miles: km_to_miles(km),
        }
    }

    /// Truncated whole miles, as full pages display them.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn whole_miles(&self) -> i64 {
        self.miles.trunc() as i64
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedResult {
    pub location: StoreLocation,
    pub distance: Option<Distance>,
    pub is_fallback_closest: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ranking {
    pub results: Vec<RankedResult>,
    /// The nearest-store fallback fired, whether or not it found a store.
    pub closest: bool,
}

#[must_use]
pub fn rank(selection: Selection) -> Ranking {
    match selection {
        Selection::Unranked(stores) => Ranking {
            results: stores.into_iter().map(unranked).collect(),
            closest: false,
        },
        Selection::Roadshow { point, stores } => Ranking {
            results: stores
                .into_iter()
                .map(|location| match point {
                    Some(p) => annotate(p, location, false),
                    None => unranked(location),
                })
                .collect(),
            closest: false,
        },
        Selection::Nearby {
            point,
            scope,
            candidates,
            constrained,
        } => {
            if candidates.is_empty() && !constrained {
                let results = nearest(point, scope)
                    .map(|location| annotate(point, location, true))
                    .into_iter()
                    .collect();
                return Ranking {
                    results,
                    closest: true,
                };
            }

            let mut results: Vec<RankedResult> = candidates
                .into_iter()
                .map(|location| annotate(point, location, false))
                .collect();
            // Stable: equal distances keep store order.
            results.sort_by(|a, b| km(a).total_cmp(&km(b)));
            Ranking {
                results,
                closest: false,
            }
        }
    }
}

fn nearest(point: GeoPoint, scope: Vec<StoreLocation>) -> Option<StoreLocation> {
    scope
        .into_iter()
        .map(|l| (point.distance_km(&l.point), l))
        .min_by(|(a, _), (b, _)| a.total_cmp(b))
        .map(|(_, l)| l)
}

fn annotate(point: GeoPoint, location: StoreLocation, is_fallback_closest: bool) -> RankedResult {
    let distance = Distance::from_km(point.distance_km(&location.point));
    RankedResult {
        location,
        distance: Some(distance),
        is_fallback_closest,
    }
}

fn unranked(location: StoreLocation) -> RankedResult {
    RankedResult {
        location,
        distance: None,
        is_fallback_closest: false,
    }
}

fn km(result: &RankedResult) -> f64 {
    result.distance.map_or(f64::INFINITY, |d| d.km)
}
