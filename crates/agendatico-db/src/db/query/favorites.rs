//! Favorite relation queries.
//!
//! The relation is a set: inserts go through `ON CONFLICT DO NOTHING` so a
//! concurrent toggle or a second sync of the same batch can never produce a
//! duplicate row, and the cached `favorites_count` on the event is only
//! adjusted when a row was actually inserted or deleted.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;
use crate::db::schema::{events, favorites};
use crate::error::DbResult;
use crate::model::favorite::NewFavorite;

/// ## Summary
/// Lists the event ids a user has favorited, in the order they were added.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn list_event_ids(conn: &mut DbConnection<'_>, user_id: i64) -> DbResult<Vec<i64>> {
    Ok(favorites::table
        .filter(favorites::user_id.eq(user_id))
        .order(favorites::id.asc())
        .select(favorites::event_id)
        .load(conn)
        .await?)
}

/// ## Summary
/// Membership test for one (user, event) pair.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn is_favorited(
    conn: &mut DbConnection<'_>,
    user_id: i64,
    event_id: i64,
) -> DbResult<bool> {
    Ok(diesel::select(diesel::dsl::exists(
        favorites::table
            .filter(favorites::user_id.eq(user_id))
            .filter(favorites::event_id.eq(event_id)),
    ))
    .get_result(conn)
    .await?)
}

/// ## Summary
/// Set-add of a favorite relation. Returns whether a row was inserted;
/// an already-present relation is a no-op that returns `false`.
///
/// ## Errors
/// Returns a database error if the insert fails.
pub async fn insert_if_absent(
    conn: &mut DbConnection<'_>,
    user_id: i64,
    event_id: i64,
) -> DbResult<bool> {
    let inserted = diesel::insert_into(favorites::table)
        .values(NewFavorite { user_id, event_id })
        .on_conflict((favorites::user_id, favorites::event_id))
        .do_nothing()
        .execute(conn)
        .await?;

    Ok(inserted > 0)
}

/// ## Summary
/// Removes a favorite relation. Returns whether a row was deleted.
///
/// ## Errors
/// Returns a database error if the delete fails.
pub async fn remove(conn: &mut DbConnection<'_>, user_id: i64, event_id: i64) -> DbResult<bool> {
    let deleted = diesel::delete(
        favorites::table
            .filter(favorites::user_id.eq(user_id))
            .filter(favorites::event_id.eq(event_id)),
    )
    .execute(conn)
    .await?;

    Ok(deleted > 0)
}

/// ## Summary
/// Adjusts the cached favorite counter on an event by `delta` with atomic
/// SQL arithmetic. Must run in the same transaction as the relation change
/// it mirrors.
///
/// ## Errors
/// Returns a database error if the update fails.
pub async fn adjust_count(conn: &mut DbConnection<'_>, event_id: i64, delta: i64) -> DbResult<()> {
    diesel::update(events::table.find(event_id))
        .set(events::favorites_count.eq(events::favorites_count + delta))
        .execute(conn)
        .await?;
    Ok(())
}

/// ## Summary
/// Reads the current cached favorite counter of an event.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn count_of(conn: &mut DbConnection<'_>, event_id: i64) -> DbResult<i64> {
    Ok(events::table
        .find(event_id)
        .select(events::favorites_count)
        .get_result(conn)
        .await?)
}

#[cfg(test)]
mod tests {
    #[expect(unused_imports)]
    use super::*;

    #[test]
    fn test_favorite_queries_compile() {
        // This test just verifies the query signatures compile
        // Integration tests with database would go in the tests module
    }
}
