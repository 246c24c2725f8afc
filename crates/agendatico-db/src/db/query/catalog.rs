//! Town and category lookups for the filter bar and the publish form.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;
use crate::db::schema::{categories, towns};
use crate::error::DbResult;
use crate::model::category::Category;
use crate::model::town::Town;

/// ## Summary
/// Loads active towns ordered by name.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn active_towns(conn: &mut DbConnection<'_>) -> DbResult<Vec<Town>> {
    Ok(towns::table
        .filter(towns::is_active.eq(true))
        .order(towns::name.asc())
        .select(Town::as_select())
        .load(conn)
        .await?)
}

/// ## Summary
/// Loads active categories ordered by their sort order, then name.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn active_categories(conn: &mut DbConnection<'_>) -> DbResult<Vec<Category>> {
    Ok(categories::table
        .filter(categories::is_active.eq(true))
        .order((categories::sort_order.asc(), categories::name.asc()))
        .select(Category::as_select())
        .load(conn)
        .await?)
}

/// ## Summary
/// Existence check used by event validation.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn town_exists(conn: &mut DbConnection<'_>, id: i64) -> DbResult<bool> {
    Ok(diesel::select(diesel::dsl::exists(
        towns::table.filter(towns::id.eq(id)),
    ))
    .get_result(conn)
    .await?)
}

/// ## Summary
/// Existence check used by event validation.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn category_exists(conn: &mut DbConnection<'_>, id: i64) -> DbResult<bool> {
    Ok(diesel::select(diesel::dsl::exists(
        categories::table.filter(categories::id.eq(id)),
    ))
    .get_result(conn)
    .await?)
}
