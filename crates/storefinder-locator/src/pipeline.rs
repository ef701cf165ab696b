//! The store search, end to end: interpret, check the category, resolve the
//! product path, geocode, select, rank, and shape.

use std::collections::BTreeSet;
use std::sync::Arc;

use storefinder_core::{AppConfig, RoadshowWindow, ROADSHOW_CATEGORY_SLUG};

use crate::error::LocatorError;
use crate::geocode::{resolve_location, Geocoder};
use crate::model::{InventoryConstraint, Item, Product, Variation};
use crate::query::{LocationQuery, PathSlugs, RawParams};
use crate::ranker::rank;
use crate::response::{
    InteractivePayload, LocatorResult, PageContext, PageExtras, Redirect, RoadshowContext,
};
use crate::selector::{select, RoadshowFilter, SelectionInput};
use crate::store::{FacetError, FacetFilters, LocationStore};

/// Behaviour switches read from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocatorSettings {
    /// Honour the `filters` parameter.
    pub include_filters: bool,
    /// With no resolved point, list every active location instead of none.
    pub always_load_all_stores: bool,
}

impl Default for LocatorSettings {
    fn default() -> Self {
        Self {
            include_filters: true,
            always_load_all_stores: false,
        }
    }
}

impl LocatorSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            include_filters: config.include_filters,
            always_load_all_stores: config.always_load_all_stores,
        }
    }
}

/// What a request renders to.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Interactive(InteractivePayload),
    Page(Box<PageContext>),
    Redirect(Redirect),
}

/// Resolved product path entities.
#[derive(Debug, Default)]
struct Drilldown {
    product: Option<Product>,
    variation: Option<Variation>,
    item: Option<Item>,
}

impl Drilldown {
    fn constraint(&self) -> Option<InventoryConstraint> {
        if let Some(item) = &self.item {
            Some(InventoryConstraint::Item(item.id))
        } else if let Some(variation) = &self.variation {
            Some(InventoryConstraint::Variation(variation.id))
        } else {
            self.product
                .as_ref()
                .map(|p| InventoryConstraint::Product(p.id))
        }
    }
}

#[derive(Clone)]
pub struct Locator {
    store: Arc<dyn LocationStore>,
    geocoder: Arc<dyn Geocoder>,
    facets: Arc<dyn FacetFilters>,
    settings: LocatorSettings,
}

impl Locator {
    pub fn new(
        store: Arc<dyn LocationStore>,
        geocoder: Arc<dyn Geocoder>,
        facets: Arc<dyn FacetFilters>,
        settings: LocatorSettings,
    ) -> Self {
        Self {
            store,
            geocoder,
            facets,
            settings,
        }
    }

    #[must_use]
    pub fn store(&self) -> &dyn LocationStore {
        self.store.as_ref()
    }

    /// Runs one search and renders it for the requested transport.
    ///
    /// # Errors
    ///
    /// Returns [`LocatorError`] for malformed parameters, unknown categories,
    /// fatal geocoder failures, and store failures.
    pub async fn handle(
        &self,
        raw: &RawParams,
        slugs: PathSlugs,
        interactive: bool,
    ) -> Result<Outcome, LocatorError> {
        let result = match self.locate(raw, slugs).await? {
            Ok(result) => result,
            Err(redirect) => return Ok(Outcome::Redirect(redirect)),
        };

        if interactive {
            return Ok(Outcome::Interactive(InteractivePayload::from(&result)));
        }
        let extras = self.page_extras(&result).await?;
        Ok(Outcome::Page(Box::new(PageContext::build(result, extras))))
    }

    /// Runs the search pipeline. The inner `Err` is a redirect to a shallower
    /// URL when a product, variation or item slug does not resolve.
    ///
    /// # Errors
    ///
    /// See [`Locator::handle`].
    pub async fn locate(
        &self,
        raw: &RawParams,
        slugs: PathSlugs,
    ) -> Result<Result<LocatorResult, Redirect>, LocatorError> {
        let query = LocationQuery::interpret(raw, slugs)?;

        let category = match query.category_slug.as_deref() {
            Some(slug) => Some(self.store.active_category(slug).await?.ok_or_else(|| {
                LocatorError::NotFound(format!("no active category '{slug}'"))
            })?),
            None => None,
        };

        let drilldown = match self.resolve_product_path(&query).await? {
            Ok(drilldown) => drilldown,
            Err(redirect) => {
                tracing::debug!(location = %redirect.location(), "product path did not resolve");
                return Ok(Err(redirect));
            }
        };
        let is_roadshow = query.category_slug.as_deref() == Some(ROADSHOW_CATEGORY_SLUG);

        let (filters, facet_constraint) = self.apply_facets(&query).await?;

        let resolved = resolve_location(self.geocoder.as_ref(), &query.query).await?;

        let inventory = drilldown.constraint().or(facet_constraint);
        let selection = select(
            self.store.as_ref(),
            SelectionInput {
                point: resolved.point,
                radius_km: query.radius,
                category: category.as_ref(),
                roadshow: is_roadshow.then_some(RoadshowFilter {
                    locality: query.locality,
                    date: query.date,
                }),
                inventory: inventory.as_ref(),
                always_load_all_stores: self.settings.always_load_all_stores,
            },
        )
        .await?;
        let ranking = rank(selection);

        tracing::debug!(
            query = %resolved.display_query,
            stores = ranking.results.len(),
            closest = ranking.closest,
            "store search complete"
        );

        Ok(Ok(LocatorResult {
            point: resolved.point,
            query: resolved.display_query,
            radius: query.radius,
            closest: ranking.closest,
            stores: ranking.results,
            warnings: resolved.warnings,
            product: drilldown.product,
            variation: drilldown.variation,
            item: drilldown.item,
            filters,
            category,
            is_roadshow,
            raw_date: query.raw_date,
            locality: query.locality,
        }))
    }

    async fn resolve_product_path(
        &self,
        query: &LocationQuery,
    ) -> Result<Result<Drilldown, Redirect>, LocatorError> {
        let Some(path) = &query.product_path else {
            return Ok(Ok(Drilldown::default()));
        };
        let up_to = |segments: &[&str]| redirect_up(query.category_slug.as_deref(), segments);

        let Some(product) = self.store.product(path.product()).await? else {
            return Ok(Err(up_to(&[])));
        };
        let Some(variation_slug) = path.variation() else {
            return Ok(Ok(Drilldown {
                product: Some(product),
                ..Drilldown::default()
            }));
        };

        let Some(variation) = self.store.variation(product.id, variation_slug).await? else {
            return Ok(Err(up_to(&[path.product()])));
        };
        let Some(item_slug) = path.item() else {
            return Ok(Ok(Drilldown {
                product: Some(product),
                variation: Some(variation),
                item: None,
            }));
        };

        let Some(item) = self.store.item(variation.id, item_slug).await? else {
            return Ok(Err(up_to(&[path.product(), variation_slug])));
        };
        Ok(Ok(Drilldown {
            product: Some(product),
            variation: Some(variation),
            item: Some(item),
        }))
    }

    /// Returns the effective filter list and the inventory constraint it
    /// produces. Filters are ignored under a product path or when disabled.
    async fn apply_facets(
        &self,
        query: &LocationQuery,
    ) -> Result<(Option<Vec<String>>, Option<InventoryConstraint>), LocatorError> {
        if query.product_path.is_some()
            || !self.settings.include_filters
            || query.facet_filters.is_empty()
        {
            return Ok((None, None));
        }

        match self.facets.matching_variations(&query.facet_filters).await {
            Ok(ids) => Ok((
                Some(query.facet_filters.clone()),
                Some(InventoryConstraint::Variations(ids)),
            )),
            Err(FacetError::UnknownFacet(spec)) => {
                tracing::warn!(
                    spec,
                    filters = ?query.facet_filters,
                    "dropping facet filters with unknown facet"
                );
                Ok((None, None))
            }
            Err(FacetError::Store(e)) => Err(LocatorError::Store(e)),
        }
    }

    async fn page_extras(&self, result: &LocatorResult) -> Result<PageExtras, LocatorError> {
        let categories = self.store.active_categories().await?;
        let online_stores = self.store.online_locations().await?;

        let roadshow = if result.is_roadshow {
            let dates: BTreeSet<_> = self
                .store
                .roadshow_windows()
                .await?
                .iter()
                .flat_map(RoadshowWindow::buckets)
                .collect();
            Some(RoadshowContext {
                dates: dates.into_iter().collect(),
                date: result.raw_date.clone(),
                localities: self.store.roadshow_localities().await?,
                locality: result.locality,
            })
        } else {
            None
        };

        Ok(PageExtras {
            categories,
            online_stores,
            roadshow,
        })
    }
}

/// Redirect to the category URL extended by `segments`.
fn redirect_up(category: Option<&str>, segments: &[&str]) -> Redirect {
    let mut all: Vec<&str> = category.into_iter().collect();
    all.extend_from_slice(segments);
    Redirect::to(&all)
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
