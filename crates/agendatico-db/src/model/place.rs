use diesel::{pg::Pg, prelude::*};
use serde::{Deserialize, Serialize};

use crate::db::schema;

#[derive(
    Debug, Clone, PartialEq, Identifiable, Queryable, Selectable, Serialize, Deserialize,
)]
#[diesel(table_name = schema::places)]
#[diesel(check_for_backend(Pg))]
pub struct Place {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub town_id: i64,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub place_type: Option<String>,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::places)]
pub struct NewPlace<'a> {
    pub name: &'a str,
    pub slug: &'a str,
    pub town_id: i64,
    pub address: Option<&'a str>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub place_type: Option<&'a str>,
    pub is_active: bool,
}
