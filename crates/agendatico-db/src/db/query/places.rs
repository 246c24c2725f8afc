//! Place queries backing the location autocomplete.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;
use crate::db::query::text_match::contains_pattern;
use crate::db::schema::places;
use crate::error::DbResult;
use crate::model::place::Place;

/// ## Summary
/// Loads all active places ordered by name. Callers group by town when the
/// grouped shape is needed.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn active_places(conn: &mut DbConnection<'_>) -> DbResult<Vec<Place>> {
    Ok(places::table
        .filter(places::is_active.eq(true))
        .order(places::name.asc())
        .select(Place::as_select())
        .load(conn)
        .await?)
}

/// ## Summary
/// Autocomplete search over active places: optional name fragment, optional
/// town narrowing, capped result count, ordered by name.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn search_places(
    conn: &mut DbConnection<'_>,
    search: Option<&str>,
    town_id: Option<i64>,
    limit: i64,
) -> DbResult<Vec<Place>> {
    let mut query = places::table
        .into_boxed()
        .filter(places::is_active.eq(true));

    if let Some(town_id) = town_id {
        query = query.filter(places::town_id.eq(town_id));
    }
    if let Some(search) = search {
        query = query.filter(places::name.ilike(contains_pattern(search)));
    }

    Ok(query
        .order(places::name.asc())
        .limit(limit)
        .select(Place::as_select())
        .load(conn)
        .await?)
}

/// ## Summary
/// Existence check used by event validation.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn place_exists(conn: &mut DbConnection<'_>, id: i64) -> DbResult<bool> {
    Ok(diesel::select(diesel::dsl::exists(
        places::table.filter(places::id.eq(id)),
    ))
    .get_result(conn)
    .await?)
}
