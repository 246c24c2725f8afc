//! Server side of the favorites reconciler.
//!
//! Toggling and batch sync both maintain the invariant that an event's
//! cached `favorites_count` equals the cardinality of its favorite relation:
//! every relation change and its counter adjustment run in one transaction,
//! and the counter only moves when a row actually changed.

use std::collections::HashSet;

use diesel_async::AsyncConnection;
use diesel_async::scoped_futures::ScopedFutureExt;

use agendatico_db::db::connection::DbConnection;
use agendatico_db::db::query::{events as events_query, favorites as favorites_query};

use crate::error::{ServiceError, ServiceResult};

/// Outcome of one toggle: the new membership state and the fresh counter.
#[derive(Debug, Clone, Copy)]
pub struct ToggleResult {
    pub is_favorited: bool,
    pub favorites_count: i64,
}

/// Outcome of one guest-batch sync.
#[derive(Debug, Clone)]
pub struct SyncReport {
    /// How many relations were actually created by this call.
    pub synced_count: u32,
    /// The full favorite id list after the merge.
    pub favorites: Vec<i64>,
}

/// ## Summary
/// Flips the favorite relation for one (user, event) pair.
///
/// Remove-first toggle: if a relation row was deleted the event is now
/// unfavorited, otherwise a set-add creates it. The counter moves in the
/// same transaction, and only when a row changed, so two tabs toggling
/// concurrently cannot drift the cached count.
///
/// ## Errors
/// - `NotFound` if the event does not exist or is soft-deleted
/// - Database errors from the transaction
#[tracing::instrument(skip(conn))]
pub async fn toggle(
    conn: &mut DbConnection<'_>,
    user_id: i64,
    event_id: i64,
) -> ServiceResult<ToggleResult> {
    let _event = events_query::find_by_id(conn, event_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("event {event_id} not found")))?;

    let is_favorited = conn
        .transaction::<_, ServiceError, _>(|tx| {
            async move {
                if favorites_query::remove(tx, user_id, event_id).await? {
                    favorites_query::adjust_count(tx, event_id, -1).await?;
                    return Ok(false);
                }

                if favorites_query::insert_if_absent(tx, user_id, event_id).await? {
                    favorites_query::adjust_count(tx, event_id, 1).await?;
                }
                Ok(true)
            }
            .scope_boxed()
        })
        .await?;

    let favorites_count = favorites_query::count_of(conn, event_id).await?;

    tracing::debug!(is_favorited, favorites_count, "Favorite toggled");

    Ok(ToggleResult {
        is_favorited,
        favorites_count,
    })
}

/// ## Summary
/// Merges a guest-accumulated favorite batch into a user's server-side set.
///
/// Per-item semantics: ids of nonexistent (or soft-deleted) events are
/// skipped, ids already favorited are skipped without touching the counter,
/// and everything else becomes a relation row plus a counter increment.
/// Running the same batch twice reports `synced_count == 0` the second time.
///
/// ## Errors
/// Returns database errors from the lookup or the merge transaction.
#[tracing::instrument(skip(conn, event_ids), fields(batch_len = event_ids.len()))]
pub async fn sync(
    conn: &mut DbConnection<'_>,
    user_id: i64,
    event_ids: &[i64],
) -> ServiceResult<SyncReport> {
    let existing: HashSet<i64> = events_query::existing_ids(conn, event_ids)
        .await?
        .into_iter()
        .collect();

    let mut seen = HashSet::new();
    let to_add: Vec<i64> = event_ids
        .iter()
        .copied()
        .filter(|id| existing.contains(id) && seen.insert(*id))
        .collect();

    let skipped = event_ids.len() - to_add.len();
    if skipped > 0 {
        tracing::debug!(skipped, "Dropped unknown or duplicate ids from sync batch");
    }

    let synced_count = conn
        .transaction::<_, ServiceError, _>(|tx| {
            async move {
                let mut count: u32 = 0;
                for event_id in to_add {
                    if favorites_query::insert_if_absent(tx, user_id, event_id).await? {
                        favorites_query::adjust_count(tx, event_id, 1).await?;
                        count += 1;
                    }
                }
                Ok(count)
            }
            .scope_boxed()
        })
        .await?;

    let favorites = favorites_query::list_event_ids(conn, user_id).await?;

    tracing::info!(synced_count, total = favorites.len(), "Favorites batch merged");

    Ok(SyncReport {
        synced_count,
        favorites,
    })
}

/// ## Summary
/// Lists the favorite event ids of a user.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn list(conn: &mut DbConnection<'_>, user_id: i64) -> ServiceResult<Vec<i64>> {
    Ok(favorites_query::list_event_ids(conn, user_id).await?)
}

/// ## Summary
/// Extracts usable event ids from a raw sync payload, item by item.
///
/// A malformed entry (not an integer, not an integer-valued string) is
/// dropped without failing the rest of the batch.
#[must_use]
pub fn parse_sync_ids(raw: &[serde_json::Value]) -> Vec<i64> {
    raw.iter()
        .filter_map(|value| match value {
            serde_json::Value::Number(n) => n.as_i64(),
            serde_json::Value::String(s) => s.parse::<i64>().ok(),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test_log::test]
    fn parse_accepts_integers_and_integer_strings() {
        let raw = vec![json!(4), json!("17"), json!(23)];
        assert_eq!(parse_sync_ids(&raw), vec![4, 17, 23]);
    }

    #[test]
    fn parse_drops_malformed_entries_but_keeps_the_rest() {
        let raw = vec![
            json!(4),
            json!("not-a-number"),
            json!(2.5),
            json!(null),
            json!([1]),
            json!(9),
        ];
        assert_eq!(parse_sync_ids(&raw), vec![4, 9]);
    }

    #[test]
    fn parse_of_empty_batch_is_empty() {
        assert!(parse_sync_ids(&[]).is_empty());
    }
}
