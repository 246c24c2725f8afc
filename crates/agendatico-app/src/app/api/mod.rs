mod auth;
mod catalog;
mod events;
mod favorites;
mod healthcheck;
mod locale;
mod places;

use std::collections::BTreeMap;

use salvo::Router;
use serde::Serialize;

use crate::middleware::{auth::AuthMiddleware, locale::LocaleMiddleware};
use agendatico_service::events::draft::FieldError;

// Re-export route constants from core
pub use agendatico_core::constants::{API_ROUTE_COMPONENT, API_ROUTE_PREFIX};

/// ## Summary
/// Error response payload
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Laravel-shaped page envelope the frontend already understands.
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub current_page: i64,
    pub per_page: i64,
    pub total: i64,
    pub last_page: i64,
}

impl<T> Paginated<T> {
    #[must_use]
    pub fn new(data: Vec<T>, current_page: i64, per_page: i64, total: i64) -> Self {
        let last_page = if total == 0 {
            1
        } else {
            (total + per_page - 1) / per_page
        };
        Self {
            data,
            current_page,
            per_page,
            total,
            last_page,
        }
    }
}

/// 422 payload: a top-level message plus per-field message lists.
#[derive(Debug, Serialize)]
pub struct ValidationResponse {
    pub message: String,
    pub errors: BTreeMap<&'static str, Vec<String>>,
}

impl ValidationResponse {
    #[must_use]
    pub fn from_field_errors(field_errors: Vec<FieldError>) -> Self {
        let message = field_errors
            .first()
            .map_or_else(|| "Datos inválidos.".to_string(), |e| e.message.clone());

        let mut errors: BTreeMap<&'static str, Vec<String>> = BTreeMap::new();
        for error in field_errors {
            errors.entry(error.field).or_default().push(error.message);
        }

        Self { message, errors }
    }
}

/// ## Summary
/// Constructs the main API router.
pub fn routes() -> Router {
    Router::with_path(API_ROUTE_COMPONENT)
        .hoop(AuthMiddleware)
        .hoop(LocaleMiddleware)
        .push(healthcheck::routes())
        .push(auth::routes())
        .push(favorites::routes())
        .push(events::routes())
        .push(places::routes())
        .push(catalog::routes())
        .push(locale::routes())
}
