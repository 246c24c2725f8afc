use std::collections::BTreeMap;

use salvo::{Depot, Request, Response, Router, handler, http::StatusCode, writing::Json};
use serde::Serialize;
use tracing::error;

use crate::app::api::ErrorResponse;
use crate::db_handler::get_db_from_depot;
use agendatico_core::constants::PLACES_SEARCH_LIMIT;
use agendatico_db::db::query::places as places_query;
use agendatico_db::model::place::Place;

const SEARCH_MAX_LEN: usize = 100;

#[derive(Debug, Serialize)]
struct PlacesResponse {
    places: Vec<Place>,
}

#[derive(Debug, Serialize)]
struct GroupedPlacesResponse {
    places: BTreeMap<i64, Vec<Place>>,
}

/// ## Summary
/// GET /api/places - all active places, grouped by town id.
#[handler]
async fn index(depot: &mut Depot, res: &mut Response) {
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

    match places_query::active_places(&mut conn).await {
        Ok(all) => {
            let mut places: BTreeMap<i64, Vec<Place>> = BTreeMap::new();
            for place in all {
                places.entry(place.town_id).or_default().push(place);
            }
            res.render(Json(GroupedPlacesResponse { places }));
        }
        Err(e) => {
            error!(error = ?e, "Failed to load places");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            res.render(Json(ErrorResponse::new("Internal server error")));
        }
    }
}

/// ## Summary
/// GET /api/places/search - autocomplete search over active places.
///
/// Query: `search` (max 100 chars), optional `town_id`; at most 20 results.
///
/// ## Errors
/// Returns HTTP 422 if the search term is too long
#[handler]
async fn search(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let search_query = req
        .query::<String>("search")
        .filter(|value| !value.trim().is_empty());
    let town_id = req.query::<i64>("town_id");

    if let Some(term) = &search_query
        && term.chars().count() > SEARCH_MAX_LEN
    {
        res.status_code(StatusCode::UNPROCESSABLE_ENTITY);
        res.render(Json(ErrorResponse::new("Search term too long")));
        return;
    }

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

    match places_query::search_places(&mut conn, search_query.as_deref(), town_id, PLACES_SEARCH_LIMIT)
        .await
    {
        Ok(places) => {
            res.render(Json(PlacesResponse { places }));
        }
        Err(e) => {
            error!(error = ?e, "Failed to search places");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            res.render(Json(ErrorResponse::new("Internal server error")));
        }
    }
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path("places")
        .get(index)
        .push(Router::with_path("search").get(search))
}
