//! Postgres-backed collaborators over `storefinder-db`.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use storefinder_core::{AppConfig, RoadshowWindow};
use storefinder_db::{
    CategoryRow, DbError, InventoryScope, ItemRow, LocalityRow, ProductRow, StoreLocationRow,
    VariationRow,
};
use storefinder_geocoder::GoogleGeocoder;

use crate::error::LocatorError;
use crate::geocode::{Geocoder, NoopGeocoder};
use crate::model::{
    Category, InventoryConstraint, Item, Locality, Product, StoreLocation, Variation,
};
use crate::pipeline::{Locator, LocatorSettings};
use crate::store::{FacetError, FacetFilters, LocationStore};

#[derive(Clone)]
pub struct PgLocationStore {
    pool: PgPool,
}

impl PgLocationStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// ---- Row conversion

impl TryFrom<StoreLocationRow> for StoreLocation {
    type Error = DbError;

    fn try_from(row: StoreLocationRow) -> Result<Self, Self::Error> {
        let point = row.point()?;
        let roadshow = row.roadshow_window();
        Ok(Self {
            id: row.id,
            name: row.name,
            address_line1: row.address_line1,
            address_line2: row.address_line2,
            city: row.city,
            state: row.state,
            zip: row.zip,
            country: row.country,
            phone: row.phone,
            website: row.website,
            point,
            category_ids: row.category_ids,
            is_online: row.is_online,
            is_active: row.is_active,
            locality_id: row.locality_id,
            roadshow,
        })
    }
}

fn locations(rows: Vec<StoreLocationRow>) -> Result<Vec<StoreLocation>, DbError> {
    rows.into_iter().map(StoreLocation::try_from).collect()
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id,
            parent_id: row.parent_id,
            name: row.name,
            slug: row.slug,
            depth: row.depth,
        }
    }
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            slug: row.slug,
            name: row.name,
        }
    }
}

impl From<VariationRow> for Variation {
    fn from(row: VariationRow) -> Self {
        Self {
            id: row.id,
            product_id: row.product_id,
            slug: row.slug,
            name: row.name,
        }
    }
}

impl From<ItemRow> for Item {
    fn from(row: ItemRow) -> Self {
        Self {
            id: row.id,
            variation_id: row.variation_id,
            slug: row.slug,
            name: row.name,
        }
    }
}

impl From<LocalityRow> for Locality {
    fn from(row: LocalityRow) -> Self {
        Self {
            name: row.name,
            id: row.id,
        }
    }
}

impl From<&InventoryConstraint> for InventoryScope {
    fn from(constraint: &InventoryConstraint) -> Self {
        match constraint {
            InventoryConstraint::Product(id) => Self::Product(*id),
            InventoryConstraint::Variation(id) => Self::Variation(*id),
            InventoryConstraint::Item(id) => Self::Item(*id),
            InventoryConstraint::Variations(ids) => Self::Variations(ids.clone()),
        }
    }
}

// ---- Store

#[async_trait]
impl LocationStore for PgLocationStore {
    async fn active_category(&self, slug: &str) -> Result<Option<Category>, DbError> {
        Ok(storefinder_db::get_active_category_by_slug(&self.pool, slug)
            .await?
            .map(Category::from))
    }

    async fn category_subtree(&self, category_id: i64) -> Result<Vec<i64>, DbError> {
        storefinder_db::list_category_subtree_ids(&self.pool, category_id).await
    }

    async fn active_categories(&self) -> Result<Vec<Category>, DbError> {
        Ok(storefinder_db::list_active_categories(&self.pool)
            .await?
            .into_iter()
            .map(Category::from)
            .collect())
    }

    async fn active_physical_locations(&self) -> Result<Vec<StoreLocation>, DbError> {
        locations(storefinder_db::list_active_physical_locations(&self.pool).await?)
    }

    async fn active_locations(&self) -> Result<Vec<StoreLocation>, DbError> {
        locations(storefinder_db::list_active_locations(&self.pool).await?)
    }

    async fn online_locations(&self) -> Result<Vec<StoreLocation>, DbError> {
        locations(storefinder_db::list_online_locations(&self.pool).await?)
    }

    async fn roadshow_locations(&self, locality_id: i64) -> Result<Vec<StoreLocation>, DbError> {
        locations(storefinder_db::list_roadshow_locations(&self.pool, locality_id).await?)
    }

    async fn roadshow_windows(&self) -> Result<Vec<RoadshowWindow>, DbError> {
        Ok(storefinder_db::list_roadshow_windows(&self.pool)
            .await?
            .into_iter()
            .map(RoadshowWindow::from)
            .collect())
    }

    async fn roadshow_localities(&self) -> Result<Vec<Locality>, DbError> {
        Ok(storefinder_db::list_roadshow_localities(&self.pool)
            .await?
            .into_iter()
            .map(Locality::from)
            .collect())
    }

    async fn product(&self, slug: &str) -> Result<Option<Product>, DbError> {
        Ok(storefinder_db::get_product_by_slug(&self.pool, slug)
            .await?
            .map(Product::from))
    }

    async fn variation(&self, product_id: i64, slug: &str) -> Result<Option<Variation>, DbError> {
        Ok(
            storefinder_db::get_variation_by_slug(&self.pool, product_id, slug)
                .await?
                .map(Variation::from),
        )
    }

    async fn item(&self, variation_id: i64, slug: &str) -> Result<Option<Item>, DbError> {
        Ok(storefinder_db::get_item_by_slug(&self.pool, variation_id, slug)
            .await?
            .map(Item::from))
    }

    async fn locations_with_inventory(
        &self,
        constraint: &InventoryConstraint,
    ) -> Result<Vec<i64>, DbError> {
        storefinder_db::list_location_ids_with_items(&self.pool, &InventoryScope::from(constraint))
            .await
    }

    async fn health_check(&self) -> Result<(), DbError> {
        storefinder_db::health_check(&self.pool).await
    }
}

// ---- Facets

/// Facet filters over `facets` / `facet_values`, specs written `facet:value`.
#[derive(Clone)]
pub struct PgFacetFilters {
    pool: PgPool,
}

impl PgFacetFilters {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Splits `facet:value` into its parts.
///
/// # Errors
///
/// Returns [`FacetError::UnknownFacet`] when either side is empty or the
/// separator is missing.
pub fn parse_facet_spec(spec: &str) -> Result<(String, String), FacetError> {
    match spec.split_once(':') {
        Some((facet, value)) if !facet.trim().is_empty() && !value.trim().is_empty() => {
            Ok((facet.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(FacetError::UnknownFacet(spec.to_string())),
    }
}

#[async_trait]
impl FacetFilters for PgFacetFilters {
    async fn matching_variations(&self, specs: &[String]) -> Result<Vec<i64>, FacetError> {
        let pairs = specs
            .iter()
            .map(|s| parse_facet_spec(s))
            .collect::<Result<Vec<_>, _>>()?;

        let values = storefinder_db::resolve_facet_values(&self.pool, &pairs).await?;
        if let Some((facet, value)) = pairs.iter().find(|(facet, value)| {
            !values
                .iter()
                .any(|v| &v.facet_slug == facet && &v.slug == value)
        }) {
            return Err(FacetError::UnknownFacet(format!("{facet}:{value}")));
        }

        let ids: Vec<i64> = values.iter().map(|v| v.id).collect();
        Ok(storefinder_db::list_public_variation_ids_with_facet_values(&self.pool, &ids).await?)
    }
}

// ---- Wiring

impl Locator {
    /// Builds a locator over Postgres and, when a key is configured, the
    /// Google geocoder. Without a key every geocode reports not-found.
    ///
    /// # Errors
    ///
    /// Returns [`LocatorError::Geocoder`] if the HTTP client cannot be built.
    pub fn from_pool(pool: PgPool, config: &AppConfig) -> Result<Self, LocatorError> {
        let geocoder: Arc<dyn Geocoder> = match config.google_api_key.as_deref() {
            Some(key) => Arc::new(GoogleGeocoder::new(key, config.geocoder_timeout_secs)?),
            None => {
                tracing::warn!("GOOGLE_API_KEY not set; location searches will find nothing");
                Arc::new(NoopGeocoder)
            }
        };

        Ok(Self::new(
            Arc::new(PgLocationStore::new(pool.clone())),
            geocoder,
            Arc::new(PgFacetFilters::new(pool)),
            LocatorSettings::from_app_config(config),
        ))
    }
}
