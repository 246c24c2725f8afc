use diesel::{pg::Pg, prelude::*};
use serde::{Deserialize, Serialize};

use crate::db::schema;

/// One (user, event) favorite relation. A set, not a counter: the UNIQUE
/// constraint on (`user_id`, `event_id`) makes re-adding a no-op.
#[derive(
    Debug, Clone, PartialEq, Eq, Identifiable, Queryable, Selectable, Serialize, Deserialize,
)]
#[diesel(table_name = schema::favorites)]
#[diesel(check_for_backend(Pg))]
pub struct Favorite {
    pub id: i64,
    pub user_id: i64,
    pub event_id: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Copy, Insertable)]
#[diesel(table_name = schema::favorites)]
pub struct NewFavorite {
    pub user_id: i64,
    pub event_id: i64,
}
