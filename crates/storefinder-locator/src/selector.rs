//! Candidate selection: narrows the location set by category, roadshow
//! date and locality, radius, and inventory.

use std::collections::HashSet;

use chrono::NaiveDate;
use storefinder_core::{DateBucket, GeoPoint};
use storefinder_db::DbError;

use crate::model::{Category, InventoryConstraint, StoreLocation};
use crate::store::LocationStore;

/// What the ranker receives.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// Roadshow listing in store order; distances annotated when a point exists.
    Roadshow {
        point: Option<GeoPoint>,
        stores: Vec<StoreLocation>,
    },
    /// Radius search around a resolved point.
    Nearby {
        point: GeoPoint,
        /// Category-scoped active physical locations, before radius and
        /// inventory. The fallback picks from here.
        scope: Vec<StoreLocation>,
        candidates: Vec<StoreLocation>,
        /// A product path or facet filter was requested.
        constrained: bool,
    },
    /// No point: store order, no distances.
    Unranked(Vec<StoreLocation>),
}

/// Inputs the selector needs beyond the store itself.
#[derive(Debug, Clone, Copy)]
pub struct SelectionInput<'a> {
    pub point: Option<GeoPoint>,
    pub radius_km: u32,
    pub category: Option<&'a Category>,
    pub roadshow: Option<RoadshowFilter>,
    pub inventory: Option<&'a InventoryConstraint>,
    pub always_load_all_stores: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoadshowFilter {
    pub locality: i64,
    pub date: Option<NaiveDate>,
}

/// # Errors
///
/// Returns [`DbError`] if any store read fails.
pub async fn select(
    store: &dyn LocationStore,
    input: SelectionInput<'_>,
) -> Result<Selection, DbError> {
    if let Some(filter) = input.roadshow {
        let stores = store.roadshow_locations(filter.locality).await?;
        let stores = match filter.date {
            Some(date) => in_month(stores, DateBucket::of(date)),
            None => stores,
        };
        return Ok(Selection::Roadshow {
            point: input.point,
            stores,
        });
    }

    let Some(point) = input.point else {
        let stores = if input.always_load_all_stores {
            store.active_locations().await?
        } else {
            Vec::new()
        };
        return Ok(Selection::Unranked(stores));
    };

    let mut scope = store.active_physical_locations().await?;
    if let Some(category) = input.category {
        let subtree = store.category_subtree(category.id).await?;
        scope.retain(|l| l.in_any_category(&subtree));
    }

    let mut candidates = within_radius(&scope, point, f64::from(input.radius_km));
    if let Some(constraint) = input.inventory {
        let stocked = store.locations_with_inventory(constraint).await?;
        candidates = restrict_to(candidates, &stocked);
    }

    Ok(Selection::Nearby {
        point,
        scope,
        candidates,
        constrained: input.inventory.is_some(),
    })
}

/// Locations whose great-circle distance from `point` is at most `radius_km`.
#[must_use]
pub fn within_radius(
    locations: &[StoreLocation],
    point: GeoPoint,
    radius_km: f64,
) -> Vec<StoreLocation> {
    locations
        .iter()
        .filter(|l| point.is_within(&l.point, radius_km))
        .cloned()
        .collect()
}

/// Roadshows whose start month or end month is `bucket`.
#[must_use]
pub fn in_month(locations: Vec<StoreLocation>, bucket: DateBucket) -> Vec<StoreLocation> {
    locations
        .into_iter()
        .filter(|l| l.roadshow.is_some_and(|w| w.touches_month(bucket)))
        .collect()
}

fn restrict_to(locations: Vec<StoreLocation>, ids: &[i64]) -> Vec<StoreLocation> {
    let ids: HashSet<i64> = ids.iter().copied().collect();
    locations
        .into_iter()
        .filter(|l| ids.contains(&l.id))
        .collect()
}
