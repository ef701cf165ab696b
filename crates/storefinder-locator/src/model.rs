//! Read-only domain entities the pipeline works over.

use serde::Serialize;
use storefinder_core::{GeoPoint, RoadshowWindow};

/// A physical store, online retailer, or roadshow.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreLocation {
    pub id: i64,
    pub name: String,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub country: String,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub point: GeoPoint,
    pub category_ids: Vec<i64>,
    pub is_online: bool,
    pub is_active: bool,
    pub locality_id: Option<i64>,
    /// Present only for roadshows.
    pub roadshow: Option<RoadshowWindow>,
}

impl StoreLocation {
    #[must_use]
    pub fn in_any_category(&self, category_ids: &[i64]) -> bool {
        self.category_ids.iter().any(|id| category_ids.contains(id))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub name: String,
    pub slug: String,
    /// Distance from the root of the tree; roots are 0.
    pub depth: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    pub id: i64,
    pub slug: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Variation {
    pub id: i64,
    pub product_id: i64,
    pub slug: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    pub id: i64,
    pub variation_id: i64,
    pub slug: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Locality {
    pub name: String,
    pub id: i64,
}

/// What a location must stock to stay in the result set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryConstraint {
    Product(i64),
    Variation(i64),
    Item(i64),
    /// Any item of any of these variations (the facet-matched set).
    Variations(Vec<i64>),
}
