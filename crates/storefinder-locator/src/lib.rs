//! Store locator resolution pipeline.
//!
//! A search flows through five stages: [`query`] interprets request
//! parameters, [`geocode`] resolves the free-text location, [`selector`]
//! narrows the location set, [`ranker`] orders it (or falls back to the
//! nearest store), and [`response`] shapes one result for interactive or
//! full-page callers. [`resolver`] sits in front and maps an opaque URL path
//! onto the pipeline.

pub mod error;
pub mod geocode;
pub mod model;
pub mod pipeline;
pub mod postgres;
pub mod query;
pub mod ranker;
pub mod resolver;
pub mod response;
pub mod selector;
pub mod store;

#[cfg(any(test, feature = "test-support"))]
pub mod memory;

pub use error::LocatorError;
pub use geocode::{Geocoder, NoopGeocoder, NOT_FOUND_WARNING, QUOTA_WARNING};
pub use model::{Category, InventoryConstraint, Item, Locality, Product, StoreLocation, Variation};
pub use pipeline::{Locator, LocatorSettings, Outcome};
pub use postgres::{PgFacetFilters, PgLocationStore};
pub use query::{LocationQuery, PathSlugs, ProductPath, RawParams};
pub use ranker::{Distance, RankedResult};
pub use resolver::{resolve, ResolveState};
pub use response::{InteractivePayload, LocatorResult, PageContext, Redirect, StorePayload};
pub use store::{FacetError, FacetFilters, LocationStore};
