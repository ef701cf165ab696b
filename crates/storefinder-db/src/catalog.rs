//! Read operations on the product catalog: slug lookups for the
//! product → variation → item drill-down, facet values, and store inventory.

use sqlx::PgPool;

use crate::DbError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: i64,
    pub slug: String,
    pub name: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VariationRow {
    pub id: i64,
    pub product_id: i64,
    pub slug: String,
    pub name: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ItemRow {
    pub id: i64,
    pub variation_id: i64,
    pub slug: String,
    pub name: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FacetValueRow {
    pub id: i64,
    pub facet_id: i64,
    pub facet_slug: String,
    pub slug: String,
}

/// Which catalog entries a location must stock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryScope {
    Product(i64),
    Variation(i64),
    Item(i64),
    /// Any item of any of these variations.
    Variations(Vec<i64>),
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_product_by_slug(pool: &PgPool, slug: &str) -> Result<Option<ProductRow>, DbError> {
    let row = sqlx::query_as::<_, ProductRow>(
        "SELECT id, slug, name FROM products WHERE slug = $1",
    )
    .bind(slug)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Looks a variation up by slug, scoped to its parent product.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_variation_by_slug(
    pool: &PgPool,
    product_id: i64,
    slug: &str,
) -> Result<Option<VariationRow>, DbError> {
    let row = sqlx::query_as::<_, VariationRow>(
        "SELECT id, product_id, slug, name \
         FROM product_variations \
         WHERE product_id = $1 AND slug = $2",
    )
    .bind(product_id)
    .bind(slug)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Looks an item up by slug, scoped to its parent variation.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_item_by_slug(
    pool: &PgPool,
    variation_id: i64,
    slug: &str,
) -> Result<Option<ItemRow>, DbError> {
    let row = sqlx::query_as::<_, ItemRow>(
        "SELECT id, variation_id, slug, name \
         FROM product_items \
         WHERE variation_id = $1 AND slug = $2",
    )
    .bind(variation_id)
    .bind(slug)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Returns the ids of locations stocking at least one item in `scope`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_location_ids_with_items(
    pool: &PgPool,
    scope: &InventoryScope,
) -> Result<Vec<i64>, DbError> {
    let condition = match scope {
        InventoryScope::Item(_) => "i.id = $1",
        InventoryScope::Variation(_) => "v.id = $1",
        InventoryScope::Product(_) => "v.product_id = $1",
        InventoryScope::Variations(_) => "v.id = ANY($1)",
    };
    let sql = format!(
        "SELECT DISTINCT li.location_id \
         FROM location_inventory li \
         JOIN product_items i ON i.id = li.item_id \
         JOIN product_variations v ON v.id = i.variation_id \
         WHERE {condition} \
         ORDER BY li.location_id"
    );

    let query = sqlx::query_scalar::<_, i64>(&sql);
    let query = match scope {
        InventoryScope::Item(id) | InventoryScope::Variation(id) | InventoryScope::Product(id) => {
            query.bind(*id)
        }
        InventoryScope::Variations(ids) => query.bind(ids.clone()),
    };

    Ok(query.fetch_all(pool).await?)
}

/// Resolves `(facet_slug, value_slug)` pairs to facet value rows.
///
/// Unknown pairs are simply absent from the result; callers compare lengths
/// to detect them.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn resolve_facet_values(
    pool: &PgPool,
    pairs: &[(String, String)],
) -> Result<Vec<FacetValueRow>, DbError> {
    let (facet_slugs, value_slugs): (Vec<String>, Vec<String>) = pairs.iter().cloned().unzip();

    let rows = sqlx::query_as::<_, FacetValueRow>(
        "SELECT fv.id, fv.facet_id, f.slug AS facet_slug, fv.slug \
         FROM UNNEST($1::TEXT[], $2::TEXT[]) AS wanted (facet_slug, value_slug) \
         JOIN facets f ON f.slug = wanted.facet_slug \
         JOIN facet_values fv ON fv.facet_id = f.id AND fv.slug = wanted.value_slug \
         ORDER BY fv.id",
    )
    .bind(facet_slugs)
    .bind(value_slugs)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns public variations (of public products) carrying, for every facet
/// represented in `value_ids`, at least one of the listed values.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_public_variation_ids_with_facet_values(
    pool: &PgPool,
    value_ids: &[i64],
) -> Result<Vec<i64>, DbError> {
    let ids = sqlx::query_scalar::<_, i64>(
        "SELECT vfv.variation_id \
         FROM variation_facet_values vfv \
         JOIN facet_values fv ON fv.id = vfv.facet_value_id \
         JOIN product_variations v ON v.id = vfv.variation_id \
         JOIN products p ON p.id = v.product_id \
         WHERE vfv.facet_value_id = ANY($1) \
           AND v.is_public = TRUE \
           AND p.is_public = TRUE \
         GROUP BY vfv.variation_id \
         HAVING COUNT(DISTINCT fv.facet_id) = ( \
             SELECT COUNT(DISTINCT facet_id) FROM facet_values WHERE id = ANY($1) \
         ) \
         ORDER BY vfv.variation_id",
    )
    .bind(value_ids)
    .fetch_all(pool)
    .await?;

    Ok(ids)
}
