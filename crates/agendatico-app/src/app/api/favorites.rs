use salvo::{Depot, Request, Response, Router, handler, http::StatusCode, writing::Json};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::app::api::ErrorResponse;
use crate::db_handler::get_db_from_depot;
use crate::depot::get_user;
use agendatico_db::db::query::events as events_query;
use agendatico_service::error::ServiceError;
use agendatico_service::favorites;

/// 401 payload for the favorites endpoints. The shape is part of the wire
/// contract the web client relies on.
#[derive(Debug, Serialize)]
struct AuthRequiredResponse {
    success: bool,
    message: &'static str,
}

const AUTH_REQUIRED: AuthRequiredResponse = AuthRequiredResponse {
    success: false,
    message: "Authentication required",
};

#[derive(Debug, Serialize)]
struct FavoritesListResponse {
    favorites: Vec<i64>,
}

#[derive(Debug, Serialize)]
struct ToggleResponse {
    success: bool,
    is_favorited: bool,
    favorites_count: i64,
}

#[derive(Debug, Serialize)]
struct SyncResponse {
    success: bool,
    synced_count: u32,
    favorites: Vec<i64>,
}

/// Raw sync payload: ids arrive untyped so one malformed entry can be
/// dropped without rejecting the rest of the batch.
#[derive(Debug, Deserialize)]
struct SyncPayload {
    #[serde(default)]
    event_ids: Vec<serde_json::Value>,
}

/// ## Summary
/// GET /api/favorites - the actor's favorite event ids.
///
/// Guests get an empty list, not an error: their favorites live in browser
/// storage and never reach the server until login.
#[handler]
async fn index(depot: &mut Depot, res: &mut Response) {
    let Some(user) = get_user(depot) else {
        res.render(Json(FavoritesListResponse { favorites: vec![] }));
        return;
    };

    let provider = match get_db_from_depot(depot) {
        Ok(p) => p,
        Err(e) => {
            error!(error = ?e, "Failed to get database provider");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            res.render(Json(ErrorResponse::new("Internal server error")));
            return;
        }
    };
    let mut conn = match provider.get_connection().await {
        Ok(c) => c,
        Err(e) => {
            error!(error = ?e, "Failed to get database connection");
            res.status_code(StatusCode::SERVICE_UNAVAILABLE);
            res.render(Json(ErrorResponse::new("Database unavailable")));
            return;
        }
    };

    match favorites::list(&mut conn, user.id).await {
        Ok(ids) => {
            res.render(Json(FavoritesListResponse { favorites: ids }));
        }
        Err(e) => {
            error!(error = ?e, "Failed to list favorites");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            res.render(Json(ErrorResponse::new("Internal server error")));
        }
    }
}

/// ## Summary
/// POST /`api/events/{event_id`}/favorite - toggle one favorite
/// (authenticated).
///
/// The relation flip and the cached counter move in one transaction; the
/// response carries the authoritative new state and count so the client can
/// reconcile its optimistic flip.
///
/// ## Errors
/// Returns HTTP 401 if not authenticated
/// Returns HTTP 404 if the event does not exist
#[handler]
async fn toggle(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let Some(user) = get_user(depot) else {
        res.status_code(StatusCode::UNAUTHORIZED);
        res.render(Json(AUTH_REQUIRED));
        return;
    };

    let Some(event_id) = req.param::<i64>("event_id") else {
        res.status_code(StatusCode::BAD_REQUEST);
        res.render(Json(ErrorResponse::new("Invalid event id")));
        return;
    };

    let provider = match get_db_from_depot(depot) {
        Ok(p) => p,
        Err(e) => {
            error!(error = ?e, "Failed to get database provider");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            res.render(Json(ErrorResponse::new("Internal server error")));
            return;
        }
    };
    let mut conn = match provider.get_connection().await {
        Ok(c) => c,
        Err(e) => {
            error!(error = ?e, "Failed to get database connection");
            res.status_code(StatusCode::SERVICE_UNAVAILABLE);
            res.render(Json(ErrorResponse::new("Database unavailable")));
            return;
        }
    };

    match favorites::toggle(&mut conn, user.id, event_id).await {
        Ok(result) => {
            res.render(Json(ToggleResponse {
                success: true,
                is_favorited: result.is_favorited,
                favorites_count: result.favorites_count,
            }));
        }
        Err(ServiceError::NotFound(_)) => {
            res.status_code(StatusCode::NOT_FOUND);
            res.render(Json(ErrorResponse::new("Event not found")));
        }
        Err(e) => {
            error!(error = ?e, "Failed to toggle favorite");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            res.render(Json(ErrorResponse::new("Failed to toggle favorite")));
        }
    }
}

/// ## Summary
/// POST /api/favorites/sync - merge a guest favorite batch (authenticated).
///
/// Per-item validation: malformed ids and ids of nonexistent events are
/// skipped, already-favorited ids merge as no-ops, and `synced_count`
/// reports only the relations actually created — syncing the same batch
/// twice reports 0 the second time.
///
/// ## Errors
/// Returns HTTP 401 if not authenticated
#[handler]
async fn sync(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let Some(user) = get_user(depot) else {
        res.status_code(StatusCode::UNAUTHORIZED);
        res.render(Json(AUTH_REQUIRED));
        return;
    };

    let payload: SyncPayload = match req.parse_json().await {
        Ok(p) => p,
        Err(e) => {
            error!(error = ?e, "Failed to parse sync payload");
            res.status_code(StatusCode::BAD_REQUEST);
            res.render(Json(ErrorResponse::new("Invalid request body")));
            return;
        }
    };

    let event_ids = favorites::parse_sync_ids(&payload.event_ids);

    let provider = match get_db_from_depot(depot) {
        Ok(p) => p,
        Err(e) => {
            error!(error = ?e, "Failed to get database provider");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            res.render(Json(ErrorResponse::new("Internal server error")));
            return;
        }
    };
    let mut conn = match provider.get_connection().await {
        Ok(c) => c,
        Err(e) => {
            error!(error = ?e, "Failed to get database connection");
            res.status_code(StatusCode::SERVICE_UNAVAILABLE);
            res.render(Json(ErrorResponse::new("Database unavailable")));
            return;
        }
    };

    match favorites::sync(&mut conn, user.id, &event_ids).await {
        Ok(report) => {
            res.render(Json(SyncResponse {
                success: true,
                synced_count: report.synced_count,
                favorites: report.favorites,
            }));
        }
        Err(e) => {
            error!(error = ?e, "Failed to sync favorites");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            res.render(Json(ErrorResponse::new("Failed to sync favorites")));
        }
    }
}

/// ## Summary
/// GET /api/favorites/events - the actor's upcoming favorited events,
/// soonest first (authenticated). Backs the favorites page.
#[handler]
async fn favorite_events(depot: &mut Depot, res: &mut Response) {
    let Some(user) = get_user(depot) else {
        res.status_code(StatusCode::UNAUTHORIZED);
        res.render(Json(AUTH_REQUIRED));
        return;
    };

    let provider = match get_db_from_depot(depot) {
        Ok(p) => p,
        Err(e) => {
            error!(error = ?e, "Failed to get database provider");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            res.render(Json(ErrorResponse::new("Internal server error")));
            return;
        }
    };
    let mut conn = match provider.get_connection().await {
        Ok(c) => c,
        Err(e) => {
            error!(error = ?e, "Failed to get database connection");
            res.status_code(StatusCode::SERVICE_UNAVAILABLE);
            res.render(Json(ErrorResponse::new("Database unavailable")));
            return;
        }
    };

    match events_query::upcoming_favorites(&mut conn, user.id, chrono::Utc::now()).await {
        Ok(events) => {
            res.render(Json(serde_json::json!({ "events": events })));
        }
        Err(e) => {
            error!(error = ?e, "Failed to load favorite events");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            res.render(Json(ErrorResponse::new("Internal server error")));
        }
    }
}

#[must_use]
pub fn routes() -> Router {
    Router::new()
        .push(
            Router::with_path("favorites")
                .get(index)
                .push(Router::with_path("sync").post(sync))
                .push(Router::with_path("events").get(favorite_events)),
        )
        .push(Router::with_path("events/<event_id>/favorite").post(toggle))
}
