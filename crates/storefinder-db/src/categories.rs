//! Database operations for the `locator_categories` hierarchy.
//!
//! The hierarchy is an adjacency list (`parent_id`); subtree and tree-order
//! reads go through recursive CTEs rather than walking parents in Rust.

use sqlx::PgPool;

use crate::DbError;

/// An active category, annotated with its depth in the tree (roots are 0).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CategoryRow {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub name: String,
    pub slug: String,
    pub depth: i32,
}

/// Returns the active category with the given slug, or `None`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_active_category_by_slug(
    pool: &PgPool,
    slug: &str,
) -> Result<Option<CategoryRow>, DbError> {
    let row = sqlx::query_as::<_, CategoryRow>(
        "WITH RECURSIVE ancestry AS ( \
             SELECT id, parent_id, 0 AS depth FROM locator_categories WHERE slug = $1 \
             UNION ALL \
             SELECT a.id, c.parent_id, a.depth + 1 \
             FROM ancestry a \
             JOIN locator_categories c ON c.id = a.parent_id \
         ) \
         SELECT c.id, c.parent_id, c.name, c.slug, \
                (SELECT MAX(depth) FROM ancestry)::INT4 AS depth \
         FROM locator_categories c \
         WHERE c.slug = $1 AND c.is_active = TRUE",
    )
    .bind(slug)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns the ids of a category and all of its descendants (active or not).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_category_subtree_ids(pool: &PgPool, category_id: i64) -> Result<Vec<i64>, DbError> {
    let ids = sqlx::query_scalar::<_, i64>(
        "WITH RECURSIVE subtree AS ( \
             SELECT id FROM locator_categories WHERE id = $1 \
             UNION ALL \
             SELECT c.id \
             FROM locator_categories c \
             JOIN subtree s ON c.parent_id = s.id \
         ) \
         SELECT id FROM subtree",
    )
    .bind(category_id)
    .fetch_all(pool)
    .await?;

    Ok(ids)
}

/// Returns every active category in depth-first tree order, siblings sorted
/// by `sort_order` then id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_active_categories(pool: &PgPool) -> Result<Vec<CategoryRow>, DbError> {
    let rows = sqlx::query_as::<_, CategoryRow>(
        "WITH RECURSIVE tree AS ( \
             SELECT c.id, c.parent_id, c.name, c.slug, c.is_active, 0 AS depth, \
                    ARRAY[c.sort_order::BIGINT, c.id] AS path \
             FROM locator_categories c \
             WHERE c.parent_id IS NULL \
             UNION ALL \
             SELECT c.id, c.parent_id, c.name, c.slug, c.is_active, t.depth + 1, \
                    t.path || ARRAY[c.sort_order::BIGINT, c.id] \
             FROM locator_categories c \
             JOIN tree t ON c.parent_id = t.id \
         ) \
         SELECT id, parent_id, name, slug, depth \
         FROM tree \
         WHERE is_active = TRUE \
         ORDER BY path",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
