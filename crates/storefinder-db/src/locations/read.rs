//! Read operations for the `store_locations` table.

use sqlx::PgPool;

use super::types::{LocalityRow, RoadshowWindowRow, StoreLocationRow};
use crate::DbError;

/// Column list shared by every `StoreLocationRow` query. Expects
/// `store_locations sl` and `roadshows r` (left or inner joined) in scope.
const LOCATION_COLUMNS: &str = "sl.id, sl.name, sl.address_line1, sl.address_line2, \
     sl.city, sl.state, sl.zip, sl.country, sl.phone, sl.website, \
     sl.latitude, sl.longitude, sl.is_online, sl.is_active, sl.locality_id, \
     ARRAY( \
         SELECT slc.category_id FROM store_location_categories slc \
         WHERE slc.location_id = sl.id ORDER BY slc.category_id \
     ) AS category_ids, \
     r.start_date, r.end_date";

/// Returns active, non-online locations ordered by id.
///
/// Roadshows are store locations too and are included.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_active_physical_locations(
    pool: &PgPool,
) -> Result<Vec<StoreLocationRow>, DbError> {
    let sql = format!(
        "SELECT {LOCATION_COLUMNS} \
         FROM store_locations sl \
         LEFT JOIN roadshows r ON r.location_id = sl.id \
         WHERE sl.is_active = TRUE AND sl.is_online = FALSE \
         ORDER BY sl.id"
    );
    let rows = sqlx::query_as::<_, StoreLocationRow>(&sql)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Returns every active location, online ones included, ordered by id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_active_locations(pool: &PgPool) -> Result<Vec<StoreLocationRow>, DbError> {
    let sql = format!(
        "SELECT {LOCATION_COLUMNS} \
         FROM store_locations sl \
         LEFT JOIN roadshows r ON r.location_id = sl.id \
         WHERE sl.is_active = TRUE \
         ORDER BY sl.id"
    );
    let rows = sqlx::query_as::<_, StoreLocationRow>(&sql)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Returns active online-only retailers ordered by name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_online_locations(pool: &PgPool) -> Result<Vec<StoreLocationRow>, DbError> {
    let sql = format!(
        "SELECT {LOCATION_COLUMNS} \
         FROM store_locations sl \
         LEFT JOIN roadshows r ON r.location_id = sl.id \
         WHERE sl.is_active = TRUE AND sl.is_online = TRUE \
         ORDER BY sl.name, sl.id"
    );
    let rows = sqlx::query_as::<_, StoreLocationRow>(&sql)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Returns non-online roadshows in the given locality, ordered by id.
///
/// The active flag is not consulted: a roadshow's date range decides
/// whether it is shown.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_roadshow_locations(
    pool: &PgPool,
    locality_id: i64,
) -> Result<Vec<StoreLocationRow>, DbError> {
    let sql = format!(
        "SELECT {LOCATION_COLUMNS} \
         FROM store_locations sl \
         JOIN roadshows r ON r.location_id = sl.id \
         WHERE sl.is_online = FALSE AND sl.locality_id = $1 \
         ORDER BY sl.id"
    );
    let rows = sqlx::query_as::<_, StoreLocationRow>(&sql)
        .bind(locality_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Returns the date range of every non-online roadshow, ordered by start date.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_roadshow_windows(pool: &PgPool) -> Result<Vec<RoadshowWindowRow>, DbError> {
    let rows = sqlx::query_as::<_, RoadshowWindowRow>(
        "SELECT r.start_date, r.end_date \
         FROM roadshows r \
         JOIN store_locations sl ON sl.id = r.location_id \
         WHERE sl.is_online = FALSE \
         ORDER BY r.start_date",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Returns the distinct localities hosting non-online roadshows, ordered by
/// locality id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_roadshow_localities(pool: &PgPool) -> Result<Vec<LocalityRow>, DbError> {
    let rows = sqlx::query_as::<_, LocalityRow>(
        "SELECT DISTINCT l.name, l.id \
         FROM roadshows r \
         JOIN store_locations sl ON sl.id = r.location_id \
         JOIN localities l ON l.id = sl.locality_id \
         WHERE sl.is_online = FALSE \
         ORDER BY l.id",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
