use diesel::{pg::Pg, prelude::*};
use serde::{Deserialize, Serialize};

use crate::db::enums::PriceType;
use crate::db::schema;

#[derive(
    Debug, Clone, PartialEq, Identifiable, Queryable, Selectable, Serialize, Deserialize,
)]
#[diesel(table_name = schema::events)]
#[diesel(check_for_backend(Pg))]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub user_id: i64,
    pub category_id: i64,
    pub town_id: i64,
    pub place_id: Option<i64>,
    pub starts_at: chrono::DateTime<chrono::Utc>,
    pub ends_at: Option<chrono::DateTime<chrono::Utc>>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub organizer_name: Option<String>,
    pub price_type: PriceType,
    pub price_amount: Option<String>,
    pub image_path: Option<String>,
    pub instagram_url: Option<String>,
    pub whatsapp_url: Option<String>,
    pub website_url: Option<String>,
    pub views_count: i64,
    pub favorites_count: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub deleted_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Event {
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Insertable event row. Owned values: one recurring submission fans out
/// into several of these, differing only in slug and start/end times.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::events)]
pub struct NewEvent {
    pub title: String,
    pub slug: String,
    pub description: String,
    pub user_id: i64,
    pub category_id: i64,
    pub town_id: i64,
    pub place_id: Option<i64>,
    pub starts_at: chrono::DateTime<chrono::Utc>,
    pub ends_at: Option<chrono::DateTime<chrono::Utc>>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub organizer_name: Option<String>,
    pub price_type: PriceType,
    pub price_amount: Option<String>,
    pub image_path: Option<String>,
    pub instagram_url: Option<String>,
    pub whatsapp_url: Option<String>,
    pub website_url: Option<String>,
}

/// Partial update for an event. `None` leaves the column untouched;
/// `Some(None)` clears a nullable column.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = schema::events)]
pub struct EventChangeset {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<i64>,
    pub town_id: Option<i64>,
    pub place_id: Option<Option<i64>>,
    pub starts_at: Option<chrono::DateTime<chrono::Utc>>,
    pub ends_at: Option<Option<chrono::DateTime<chrono::Utc>>>,
    pub address: Option<Option<String>>,
    pub latitude: Option<Option<f64>>,
    pub longitude: Option<Option<f64>>,
    pub organizer_name: Option<Option<String>>,
    pub price_type: Option<PriceType>,
    pub price_amount: Option<Option<String>>,
    pub image_path: Option<Option<String>>,
    pub instagram_url: Option<Option<String>>,
    pub whatsapp_url: Option<Option<String>>,
    pub website_url: Option<Option<String>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}
