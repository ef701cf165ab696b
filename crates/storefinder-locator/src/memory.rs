//! In-memory collaborators for tests: a [`LocationStore`] over plain vectors,
//! a scripted [`Geocoder`], and a table-driven [`FacetFilters`].

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use storefinder_core::{GeoPoint, RoadshowWindow};
use storefinder_db::DbError;
use storefinder_geocoder::{GeocodeError, GeocodeMatch};

use crate::geocode::Geocoder;
use crate::model::{
    Category, InventoryConstraint, Item, Locality, Product, StoreLocation, Variation,
};
use crate::store::{FacetError, FacetFilters, LocationStore};

/// A bare active physical location at the given point.
#[must_use]
pub fn location_at(id: i64, name: &str, lat: f64, lng: f64) -> StoreLocation {
    StoreLocation {
        id,
        name: name.to_string(),
        address_line1: None,
        address_line2: None,
        city: None,
        state: None,
        zip: None,
        country: "US".to_string(),
        phone: None,
        website: None,
        point: GeoPoint::new(lat, lng),
        category_ids: Vec::new(),
        is_online: false,
        is_active: true,
        locality_id: None,
        roadshow: None,
    }
}

#[derive(Debug, Clone)]
struct CategoryEntry {
    id: i64,
    parent_id: Option<i64>,
    slug: String,
    is_active: bool,
    sort_order: i32,
}

/// Vector-backed store. Build it with the `with_*` methods.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    categories: Vec<CategoryEntry>,
    locations: Vec<StoreLocation>,
    localities: BTreeMap<i64, String>,
    products: Vec<Product>,
    variations: Vec<Variation>,
    items: Vec<Item>,
    inventory: Vec<(i64, i64)>,
    fail: bool,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_category(mut self, id: i64, parent_id: Option<i64>, slug: &str) -> Self {
        self.push_category(id, parent_id, slug, true);
        self
    }

    #[must_use]
    pub fn with_inactive_category(mut self, id: i64, parent_id: Option<i64>, slug: &str) -> Self {
        self.push_category(id, parent_id, slug, false);
        self
    }

    #[must_use]
    pub fn with_location(mut self, location: StoreLocation) -> Self {
        self.locations.push(location);
        self
    }

    #[must_use]
    pub fn with_locality(mut self, id: i64, name: &str) -> Self {
        self.localities.insert(id, name.to_string());
        self
    }

    #[must_use]
    pub fn with_product(mut self, id: i64, slug: &str) -> Self {
        self.products.push(Product {
            id,
            slug: slug.to_string(),
            name: slug.to_string(),
        });
        self
    }

    #[must_use]
    pub fn with_variation(mut self, id: i64, product_id: i64, slug: &str) -> Self {
        self.variations.push(Variation {
            id,
            product_id,
            slug: slug.to_string(),
            name: slug.to_string(),
        });
        self
    }

    #[must_use]
    pub fn with_item(mut self, id: i64, variation_id: i64, slug: &str) -> Self {
        self.items.push(Item {
            id,
            variation_id,
            slug: slug.to_string(),
            name: slug.to_string(),
        });
        self
    }

    /// Location `location_id` stocks item `item_id`.
    #[must_use]
    pub fn with_stock(mut self, location_id: i64, item_id: i64) -> Self {
        self.inventory.push((location_id, item_id));
        self
    }

    /// Every read fails with a connection error.
    #[must_use]
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    fn push_category(&mut self, id: i64, parent_id: Option<i64>, slug: &str, is_active: bool) {
        let sort_order = i32::try_from(self.categories.len()).unwrap_or(i32::MAX);
        self.categories.push(CategoryEntry {
            id,
            parent_id,
            slug: slug.to_string(),
            is_active,
            sort_order,
        });
    }

    fn check(&self) -> Result<(), DbError> {
        if self.fail {
            Err(DbError::Sqlx(sqlx::Error::PoolTimedOut))
        } else {
            Ok(())
        }
    }

    fn depth(&self, entry: &CategoryEntry) -> i32 {
        let mut depth = 0;
        let mut parent = entry.parent_id;
        while let Some(id) = parent {
            depth += 1;
            parent = self
                .categories
                .iter()
                .find(|c| c.id == id)
                .and_then(|c| c.parent_id);
        }
        depth
    }

    fn to_category(&self, entry: &CategoryEntry) -> Category {
        Category {
            id: entry.id,
            parent_id: entry.parent_id,
            name: entry.slug.clone(),
            slug: entry.slug.clone(),
            depth: self.depth(entry),
        }
    }

    fn children_of(&self, parent: Option<i64>) -> Vec<&CategoryEntry> {
        let mut children: Vec<&CategoryEntry> = self
            .categories
            .iter()
            .filter(|c| c.parent_id == parent)
            .collect();
        children.sort_by_key(|c| (c.sort_order, c.id));
        children
    }

    fn walk(&self, parent: Option<i64>, out: &mut Vec<Category>) {
        for entry in self.children_of(parent) {
            if entry.is_active {
                out.push(self.to_category(entry));
            }
            self.walk(Some(entry.id), out);
        }
    }

    fn sorted_by_id(&self, keep: impl Fn(&StoreLocation) -> bool) -> Vec<StoreLocation> {
        let mut out: Vec<StoreLocation> = self.locations.iter().filter(|l| keep(l)).cloned().collect();
        out.sort_by_key(|l| l.id);
        out
    }
}

#[async_trait]
impl LocationStore for InMemoryStore {
    async fn active_category(&self, slug: &str) -> Result<Option<Category>, DbError> {
        self.check()?;
        Ok(self
            .categories
            .iter()
            .find(|c| c.slug == slug && c.is_active)
            .map(|c| self.to_category(c)))
    }

    async fn category_subtree(&self, category_id: i64) -> Result<Vec<i64>, DbError> {
        self.check()?;
        let mut ids = vec![category_id];
        let mut i = 0;
        while i < ids.len() {
            let parent = ids[i];
            ids.extend(
                self.categories
                    .iter()
                    .filter(|c| c.parent_id == Some(parent))
                    .map(|c| c.id),
            );
            i += 1;
        }
        Ok(ids)
    }

    async fn active_categories(&self) -> Result<Vec<Category>, DbError> {
        self.check()?;
        let mut out = Vec::new();
        self.walk(None, &mut out);
        Ok(out)
    }

    async fn active_physical_locations(&self) -> Result<Vec<StoreLocation>, DbError> {
        self.check()?;
        Ok(self.sorted_by_id(|l| l.is_active && !l.is_online))
    }

    async fn active_locations(&self) -> Result<Vec<StoreLocation>, DbError> {
        self.check()?;
        Ok(self.sorted_by_id(|l| l.is_active))
    }

    async fn online_locations(&self) -> Result<Vec<StoreLocation>, DbError> {
        self.check()?;
        let mut out = self.sorted_by_id(|l| l.is_active && l.is_online);
        out.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(out)
    }

    async fn roadshow_locations(&self, locality_id: i64) -> Result<Vec<StoreLocation>, DbError> {
        self.check()?;
        Ok(self.sorted_by_id(|l| {
            l.roadshow.is_some() && !l.is_online && l.locality_id == Some(locality_id)
        }))
    }

    async fn roadshow_windows(&self) -> Result<Vec<RoadshowWindow>, DbError> {
        self.check()?;
        let mut windows: Vec<RoadshowWindow> = self
            .locations
            .iter()
            .filter(|l| !l.is_online)
            .filter_map(|l| l.roadshow)
            .collect();
        windows.sort_by_key(|w| w.start_date);
        Ok(windows)
    }

    async fn roadshow_localities(&self) -> Result<Vec<Locality>, DbError> {
        self.check()?;
        let ids: HashSet<i64> = self
            .locations
            .iter()
            .filter(|l| l.roadshow.is_some() && !l.is_online)
            .filter_map(|l| l.locality_id)
            .collect();
        Ok(self
            .localities
            .iter()
            .filter(|(id, _)| ids.contains(id))
            .map(|(id, name)| Locality {
                name: name.clone(),
                id: *id,
            })
            .collect())
    }

    async fn product(&self, slug: &str) -> Result<Option<Product>, DbError> {
        self.check()?;
        Ok(self.products.iter().find(|p| p.slug == slug).cloned())
    }

    async fn variation(&self, product_id: i64, slug: &str) -> Result<Option<Variation>, DbError> {
        self.check()?;
        Ok(self
            .variations
            .iter()
            .find(|v| v.product_id == product_id && v.slug == slug)
            .cloned())
    }

    async fn item(&self, variation_id: i64, slug: &str) -> Result<Option<Item>, DbError> {
        self.check()?;
        Ok(self
            .items
            .iter()
            .find(|i| i.variation_id == variation_id && i.slug == slug)
            .cloned())
    }

    async fn locations_with_inventory(
        &self,
        constraint: &InventoryConstraint,
    ) -> Result<Vec<i64>, DbError> {
        self.check()?;
        let variation_of: HashMap<i64, i64> =
            self.items.iter().map(|i| (i.id, i.variation_id)).collect();
        let product_of: HashMap<i64, i64> = self
            .variations
            .iter()
            .map(|v| (v.id, v.product_id))
            .collect();

        let matches = |item_id: i64| {
            let variation = variation_of.get(&item_id).copied();
            match constraint {
                InventoryConstraint::Item(id) => item_id == *id,
                InventoryConstraint::Variation(id) => variation == Some(*id),
                InventoryConstraint::Product(id) => {
                    variation.and_then(|v| product_of.get(&v).copied()) == Some(*id)
                }
                InventoryConstraint::Variations(ids) => variation.is_some_and(|v| ids.contains(&v)),
            }
        };

        let mut ids: Vec<i64> = self
            .inventory
            .iter()
            .filter(|(_, item_id)| matches(*item_id))
            .map(|(location_id, _)| *location_id)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        Ok(ids)
    }

    async fn health_check(&self) -> Result<(), DbError> {
        self.check()
    }
}

/// Canned geocoder answers.
#[derive(Debug, Clone)]
pub enum Scripted {
    Found(GeocodeMatch),
    NotFound,
    QuotaExceeded,
    /// A non-quota provider failure.
    Denied,
}

/// Geocoder answering from a table keyed by query text; unknown queries are
/// not found. Counts calls.
#[derive(Debug, Default)]
pub struct ScriptedGeocoder {
    answers: HashMap<String, Scripted>,
    calls: AtomicUsize,
}

impl ScriptedGeocoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn answer(mut self, query: &str, answer: Scripted) -> Self {
        self.answers.insert(query.to_string(), answer);
        self
    }

    /// Shorthand for a found point whose formatted address is `address`.
    #[must_use]
    pub fn found(self, query: &str, lat: f64, lng: f64, address: &str) -> Self {
        self.answer(
            query,
            Scripted::Found(GeocodeMatch {
                latitude: lat,
                longitude: lng,
                formatted_address: address.to_string(),
            }),
        )
    }

    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Geocoder for ScriptedGeocoder {
    async fn geocode(&self, text: &str) -> Result<Option<GeocodeMatch>, GeocodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.answers.get(text) {
            Some(Scripted::Found(found)) => Ok(Some(found.clone())),
            Some(Scripted::NotFound) | None => Ok(None),
            Some(Scripted::QuotaExceeded) => Err(GeocodeError::QuotaExceeded(
                "You have exceeded your daily request quota for this API.".to_string(),
            )),
            Some(Scripted::Denied) => Err(GeocodeError::Api {
                status: "REQUEST_DENIED".to_string(),
                message: "The provided API key is invalid.".to_string(),
            }),
        }
    }
}

/// Facet filters backed by a `facet:value → variation ids` table.
#[derive(Debug, Clone, Default)]
pub struct StaticFacets {
    values: HashMap<String, Vec<i64>>,
}

impl StaticFacets {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_value(mut self, spec: &str, variation_ids: &[i64]) -> Self {
        self.values.insert(spec.to_string(), variation_ids.to_vec());
        self
    }
}

#[async_trait]
impl FacetFilters for StaticFacets {
    async fn matching_variations(&self, specs: &[String]) -> Result<Vec<i64>, FacetError> {
        let mut by_facet: BTreeMap<&str, HashSet<i64>> = BTreeMap::new();
        for spec in specs {
            let ids = self
                .values
                .get(spec)
                .ok_or_else(|| FacetError::UnknownFacet(spec.clone()))?;
            let facet = spec.split_once(':').map_or(spec.as_str(), |(f, _)| f);
            by_facet.entry(facet).or_default().extend(ids);
        }

        let mut sets = by_facet.into_values();
        let Some(first) = sets.next() else {
            return Ok(Vec::new());
        };
        let matched = sets.fold(first, |acc, set| &acc & &set);
        let mut ids: Vec<i64> = matched.into_iter().collect();
        ids.sort_unstable();
        Ok(ids)
    }
}
