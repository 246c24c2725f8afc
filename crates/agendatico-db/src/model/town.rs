use diesel::{pg::Pg, prelude::*};
use serde::{Deserialize, Serialize};

use crate::db::schema;

#[derive(
    Debug, Clone, PartialEq, Identifiable, Queryable, Selectable, Serialize, Deserialize,
)]
#[diesel(table_name = schema::towns)]
#[diesel(check_for_backend(Pg))]
pub struct Town {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::towns)]
pub struct NewTown<'a> {
    pub name: &'a str,
    pub slug: &'a str,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub sort_order: i32,
    pub is_active: bool,
}
