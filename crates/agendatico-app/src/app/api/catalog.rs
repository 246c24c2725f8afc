use salvo::{Depot, Response, Router, handler, http::StatusCode, writing::Json};
use tracing::error;

use crate::app::api::ErrorResponse;
use crate::db_handler::get_db_from_depot;
use agendatico_db::db::query::catalog;

/// ## Summary
/// GET /api/towns - active towns for the filter bar and the publish form.
#[handler]
async fn towns(depot: &mut Depot, res: &mut Response) {
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

    match catalog::active_towns(&mut conn).await {
        Ok(rows) => {
            res.render(Json(serde_json::json!({ "towns": rows })));
        }
        Err(e) => {
            error!(error = ?e, "Failed to load towns");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            res.render(Json(ErrorResponse::new("Internal server error")));
        }
    }
}

/// ## Summary
/// GET /api/categories - active categories, in display order.
#[handler]
async fn categories(depot: &mut Depot, res: &mut Response) {
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

    match catalog::active_categories(&mut conn).await {
        Ok(rows) => {
            res.render(Json(serde_json::json!({ "categories": rows })));
        }
        Err(e) => {
            error!(error = ?e, "Failed to load categories");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            res.render(Json(ErrorResponse::new("Internal server error")));
        }
    }
}

#[must_use]
pub fn routes() -> Router {
    Router::new()
        .push(Router::with_path("towns").get(towns))
        .push(Router::with_path("categories").get(categories))
}
