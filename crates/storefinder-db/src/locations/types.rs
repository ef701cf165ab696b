//! Row types for the `store_locations` table.

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use storefinder_core::{GeoPoint, RoadshowWindow};

use crate::DbError;

/// A row from `store_locations`, joined with its category ids and, for
/// roadshows, the open date range.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoreLocationRow {
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
    pub latitude: Decimal,
    pub longitude: Decimal,
    pub is_online: bool,
    pub is_active: bool,
    pub locality_id: Option<i64>,
    /// Ids of every category the location is directly assigned to.
    pub category_ids: Vec<i64>,
    /// Set only for roadshows.
    pub start_date: Option<NaiveDate>,
    /// Set only for roadshows.
    pub end_date: Option<NaiveDate>,
}

impl StoreLocationRow {
    /// The row's coordinate as floating-point degrees.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidCoordinate`] if a `NUMERIC` value does not
    /// fit an `f64`.
    pub fn point(&self) -> Result<GeoPoint, DbError> {
        let invalid = || DbError::InvalidCoordinate {
            location_id: self.id,
        };
        let lat = self.latitude.to_f64().ok_or_else(invalid)?;
        let lng = self.longitude.to_f64().ok_or_else(invalid)?;
        Ok(GeoPoint::new(lat, lng))
    }

    #[must_use]
    pub fn roadshow_window(&self) -> Option<RoadshowWindow> {
        Some(RoadshowWindow {
            start_date: self.start_date?,
            end_date: self.end_date?,
        })
    }
}

/// Start and end date of one roadshow.
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct RoadshowWindowRow {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl From<RoadshowWindowRow> for RoadshowWindow {
    fn from(row: RoadshowWindowRow) -> Self {
        Self {
            start_date: row.start_date,
            end_date: row.end_date,
        }
    }
}

/// A locality that hosts at least one roadshow.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct LocalityRow {
    pub name: String,
    pub id: i64,
}
