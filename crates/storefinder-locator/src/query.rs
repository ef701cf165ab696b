//! Request parameters → [`LocationQuery`].

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::LocatorError;

pub const DEFAULT_RADIUS_KM: u32 = 25;
pub const DEFAULT_LOCALITY: i64 = 1;

/// Query-string parameters exactly as received.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawParams {
    pub location: Option<String>,
    pub radius: Option<String>,
    pub date: Option<String>,
    pub locality: Option<String>,
    pub filters: Option<String>,
}

/// The product drill-down. A deeper level cannot exist without its parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductPath {
    Product {
        product: String,
    },
    Variation {
        product: String,
        variation: String,
    },
    Item {
        product: String,
        variation: String,
        item: String,
    },
}

impl ProductPath {
    /// Builds the path from positional segments, stopping at the first
    /// missing or empty one.
    #[must_use]
    pub fn from_segments(
        product: Option<&str>,
        variation: Option<&str>,
        item: Option<&str>,
    ) -> Option<Self> {
        let present = |s: Option<&str>| s.filter(|s| !s.is_empty()).map(str::to_string);

        let product = present(product)?;
        let Some(variation) = present(variation) else {
            return Some(Self::Product { product });
        };
        let Some(item) = present(item) else {
            return Some(Self::Variation { product, variation });
        };
        Some(Self::Item {
            product,
            variation,
            item,
        })
    }

    #[must_use]
    pub fn product(&self) -> &str {
        match self {
            Self::Product { product }
            | Self::Variation { product, .. }
            | Self::Item { product, .. } => product,
        }
    }

    #[must_use]
    pub fn variation(&self) -> Option<&str> {
        match self {
            Self::Product { .. } => None,
            Self::Variation { variation, .. } | Self::Item { variation, .. } => Some(variation),
        }
    }

    #[must_use]
    pub fn item(&self) -> Option<&str> {
        match self {
            Self::Item { item, .. } => Some(item),
            _ => None,
        }
    }
}

/// Category and product segments taken from the URL path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathSlugs {
    pub category: Option<String>,
    pub product_path: Option<ProductPath>,
}

impl PathSlugs {
    /// Interprets up to four positional segments as
    /// category / product / variation / item.
    #[must_use]
    pub fn from_segments(segments: &[&str]) -> Self {
        let at = |i: usize| segments.get(i).copied();
        Self {
            category: at(0).filter(|s| !s.is_empty()).map(str::to_string),
            product_path: ProductPath::from_segments(at(1), at(2), at(3)),
        }
    }

    /// Treats the whole path as a single category slug.
    #[must_use]
    pub fn opaque(path: &str) -> Self {
        Self {
            category: Some(path.to_string()).filter(|s| !s.is_empty()),
            product_path: None,
        }
    }
}

/// A normalized store search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationQuery {
    pub query: String,
    /// Search radius in kilometres.
    pub radius: u32,
    pub date: Option<NaiveDate>,
    /// The `date` parameter as sent, echoed back on full pages.
    pub raw_date: String,
    pub locality: i64,
    pub category_slug: Option<String>,
    pub product_path: Option<ProductPath>,
    pub facet_filters: Vec<String>,
}

impl LocationQuery {
    /// # Errors
    ///
    /// - [`LocatorError::BadRequest`] for a malformed `radius` or `locality`.
    /// - [`LocatorError::NotFound`] for a `date` that is not `YYYY-MM-DD`.
    pub fn interpret(raw: &RawParams, path: PathSlugs) -> Result<Self, LocatorError> {
        let radius = parse_or_default(raw.radius.as_deref(), DEFAULT_RADIUS_KM, "radius")?;
        let locality = parse_or_default(raw.locality.as_deref(), DEFAULT_LOCALITY, "locality")?;

        let raw_date = raw.date.clone().unwrap_or_default();
        let date = match raw_date.trim() {
            "" => None,
            value => Some(NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
                LocatorError::NotFound(format!("invalid date '{value}'"))
            })?),
        };

        Ok(Self {
            query: raw.location.as_deref().unwrap_or_default().trim().to_string(),
            radius,
            date,
            raw_date,
            locality,
            category_slug: path.category,
            product_path: path.product_path,
            facet_filters: split_filters(raw.filters.as_deref()),
        })
    }
}

fn parse_or_default<T: std::str::FromStr>(
    value: Option<&str>,
    default: T,
    name: &str,
) -> Result<T, LocatorError> {
    match value.map(str::trim) {
        None | Some("") => Ok(default),
        Some(v) => v
            .parse()
            .map_err(|_| LocatorError::BadRequest(format!("{name} must be an integer, got '{v}'"))),
    }
}

/// Splits a slash-delimited facet string. `/` alone means no filters.
#[must_use]
pub fn split_filters(filters: Option<&str>) -> Vec<String> {
    filters
        .unwrap_or_default()
        .split('/')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
#[path = "query_test.rs"]
mod tests;
