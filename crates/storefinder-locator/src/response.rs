//! One [`LocatorResult`], two serializers: the interactive JSON payload and
//! the full-page rendering context. Also the redirect target for dangling
//! product slugs.

use chrono::NaiveDate;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::Serialize;
use storefinder_core::{DateBucket, GeoPoint, CONTINENTAL_CENTER};

use crate::model::{Category, Item, Locality, Product, StoreLocation, Variation};
use crate::ranker::RankedResult;

/// Root of every store finder URL.
pub const STORE_FINDER_ROOT: &str = "/store-finder/";

/// Characters escaped inside a single path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Everything the pipeline resolved for one search.
#[derive(Debug, Clone, PartialEq)]
pub struct LocatorResult {
    pub point: Option<GeoPoint>,
    pub query: String,
    pub radius: u32,
    pub closest: bool,
    pub stores: Vec<RankedResult>,
    pub warnings: Vec<String>,
    pub product: Option<Product>,
    pub variation: Option<Variation>,
    pub item: Option<Item>,
    /// Facet filters actually applied.
    pub filters: Option<Vec<String>>,
    pub category: Option<Category>,
    pub is_roadshow: bool,
    pub raw_date: String,
    pub locality: i64,
}

/// A redirect to a shallower store finder URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub segments: Vec<String>,
}

impl Redirect {
    #[must_use]
    pub fn to(segments: &[&str]) -> Self {
        Self {
            segments: segments.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    /// The `Location` header value, one percent-encoded segment per level.
    #[must_use]
    pub fn location(&self) -> String {
        let mut url = STORE_FINDER_ROOT.to_string();
        for segment in &self.segments {
            url.extend(utf8_percent_encode(segment, SEGMENT));
            url.push('/');
        }
        url
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl From<GeoPoint> for LatLng {
    fn from(p: GeoPoint) -> Self {
        Self {
            lat: p.lat,
            lng: p.lng,
        }
    }
}

/// One store as serialized to interactive callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorePayload {
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
    pub lat: f64,
    pub lng: f64,
    pub distance_km: Option<f64>,
    pub distance_miles: Option<f64>,
    pub closest: bool,
    pub category_ids: Vec<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

impl From<&RankedResult> for StorePayload {
    fn from(r: &RankedResult) -> Self {
        let mut payload = Self::from(&r.location);
        payload.distance_km = r.distance.map(|d| d.km);
        payload.distance_miles = r.distance.map(|d| d.miles);
        payload.closest = r.is_fallback_closest;
        payload
    }
}

impl From<&StoreLocation> for StorePayload {
    fn from(l: &StoreLocation) -> Self {
        Self {
            id: l.id,
            name: l.name.clone(),
            address_line1: l.address_line1.clone(),
            address_line2: l.address_line2.clone(),
            city: l.city.clone(),
            state: l.state.clone(),
            zip: l.zip.clone(),
            country: l.country.clone(),
            phone: l.phone.clone(),
            website: l.website.clone(),
            lat: l.point.lat,
            lng: l.point.lng,
            distance_km: None,
            distance_miles: None,
            closest: false,
            category_ids: l.category_ids.clone(),
            start_date: l.roadshow.map(|w| w.start_date),
            end_date: l.roadshow.map(|w| w.end_date),
        }
    }
}

/// Body returned to `XMLHttpRequest` callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InteractivePayload {
    pub success: bool,
    pub location: LatLng,
    pub stores: Vec<StorePayload>,
    pub query: String,
    pub closest: bool,
    pub radius: u32,
    pub warnings: Vec<String>,
}

impl From<&LocatorResult> for InteractivePayload {
    fn from(result: &LocatorResult) -> Self {
        Self {
            success: result.point.is_some(),
            location: result.point.unwrap_or(CONTINENTAL_CENTER).into(),
            stores: result.stores.iter().map(StorePayload::from).collect(),
            query: result.query.clone(),
            closest: result.closest,
            radius: result.radius,
            warnings: result.warnings.clone(),
        }
    }
}

/// A store on a full page: the interactive fields plus whole-mile distance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageStore {
    #[serde(flatten)]
    pub store: StorePayload,
    pub distance: Option<i64>,
}

impl From<&RankedResult> for PageStore {
    fn from(r: &RankedResult) -> Self {
        Self {
            store: StorePayload::from(r),
            distance: r.distance.map(|d| d.whole_miles()),
        }
    }
}

/// Extra context for the roadshow listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoadshowContext {
    /// Distinct boundary months of every roadshow, ascending.
    pub dates: Vec<DateBucket>,
    pub date: String,
    pub localities: Vec<Locality>,
    pub locality: i64,
}

/// Data the store finder page template renders from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageContext {
    pub success: bool,
    pub location: LatLng,
    pub stores: Vec<PageStore>,
    pub query: String,
    pub closest: bool,
    pub radius: u32,
    pub warnings: Vec<String>,
    pub product: Option<Product>,
    pub variation: Option<Variation>,
    pub item: Option<Item>,
    pub filters: Option<Vec<String>>,
    pub categories: Vec<Category>,
    /// The requested category, or the first active one.
    pub category: Option<Category>,
    pub online_stores: Vec<StorePayload>,
    #[serde(flatten)]
    pub roadshow: Option<RoadshowContext>,
}

/// Page-only lookups gathered after the search itself.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageExtras {
    pub categories: Vec<Category>,
    pub online_stores: Vec<StoreLocation>,
    pub roadshow: Option<RoadshowContext>,
}

impl PageContext {
    #[must_use]
    pub fn build(result: LocatorResult, extras: PageExtras) -> Self {
        let category = result
            .category
            .or_else(|| extras.categories.first().cloned());
        Self {
            success: result.point.is_some(),
            location: result.point.unwrap_or(CONTINENTAL_CENTER).into(),
            stores: result.stores.iter().map(PageStore::from).collect(),
            query: result.query,
            closest: result.closest,
            radius: result.radius,
            warnings: result.warnings,
            product: result.product,
            variation: result.variation,
            item: result.item,
            filters: result.filters,
            categories: extras.categories,
            category,
            online_stores: extras.online_stores.iter().map(StorePayload::from).collect(),
            roadshow: extras.roadshow,
        }
    }
}

#[cfg(test)]
#[path = "response_test.rs"]
mod tests;
