//! Collaborator seams: the location store and the facet filter set.
//!
//! The pipeline only reads through these traits. Postgres-backed
//! implementations live in [`crate::postgres`].

use async_trait::async_trait;
use storefinder_core::RoadshowWindow;
use storefinder_db::DbError;
use thiserror::Error;

use crate::model::{
    Category, InventoryConstraint, Item, Locality, Product, StoreLocation, Variation,
};

/// Read access to categories, locations, roadshows and the product catalog.
///
/// Every list comes back in the store's stable default order (by id unless
/// noted); the pipeline relies on it for tie-breaking.
#[async_trait]
pub trait LocationStore: Send + Sync {
    /// The active category with this slug, with its tree depth.
    async fn active_category(&self, slug: &str) -> Result<Option<Category>, DbError>;

    /// Ids of `category_id` and every descendant.
    async fn category_subtree(&self, category_id: i64) -> Result<Vec<i64>, DbError>;

    /// Active categories in depth-first tree order.
    async fn active_categories(&self) -> Result<Vec<Category>, DbError>;

    /// Active, non-online locations.
    async fn active_physical_locations(&self) -> Result<Vec<StoreLocation>, DbError>;

    /// Every active location, online ones included.
    async fn active_locations(&self) -> Result<Vec<StoreLocation>, DbError>;

    /// Active online retailers, ordered by name.
    async fn online_locations(&self) -> Result<Vec<StoreLocation>, DbError>;

    /// Non-online roadshows in `locality_id`, regardless of the active flag.
    async fn roadshow_locations(&self, locality_id: i64) -> Result<Vec<StoreLocation>, DbError>;

    /// Date ranges of every non-online roadshow, ordered by start date.
    async fn roadshow_windows(&self) -> Result<Vec<RoadshowWindow>, DbError>;

    /// Distinct localities hosting a non-online roadshow, ordered by id.
    async fn roadshow_localities(&self) -> Result<Vec<Locality>, DbError>;

    async fn product(&self, slug: &str) -> Result<Option<Product>, DbError>;

    async fn variation(&self, product_id: i64, slug: &str) -> Result<Option<Variation>, DbError>;

    async fn item(&self, variation_id: i64, slug: &str) -> Result<Option<Item>, DbError>;

    /// Ids of locations stocking anything that satisfies `constraint`.
    async fn locations_with_inventory(
        &self,
        constraint: &InventoryConstraint,
    ) -> Result<Vec<i64>, DbError>;

    /// Liveness probe for health endpoints.
    async fn health_check(&self) -> Result<(), DbError> {
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum FacetError {
    /// A filter spec names a facet or value that does not exist, or is not
    /// of the form `facet:value`.
    #[error("unknown facet filter: {0}")]
    UnknownFacet(String),
    #[error(transparent)]
    Store(#[from] DbError),
}

/// Turns facet filter specs into the set of variations they select.
///
/// Specs on the same facet are alternatives; specs on different facets must
/// all hold.
#[async_trait]
pub trait FacetFilters: Send + Sync {
    async fn matching_variations(&self, specs: &[String]) -> Result<Vec<i64>, FacetError>;
}
