use std::collections::HashSet;

use salvo::{Depot, Request, Response, Router, handler, http::StatusCode, writing::Json};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::app::api::{ErrorResponse, Paginated, ValidationResponse};
use crate::db_handler::get_db_from_depot;
use crate::depot::get_user;
use crate::image_handler::get_images_from_depot;
use agendatico_core::constants::EVENTS_PAGE_SIZE;
use agendatico_core::recurrence::{RecurrenceFrequency, RecurrenceRule};
use agendatico_db::db::enums::PriceType;
use agendatico_db::db::query::{events as events_query, favorites as favorites_query};
use agendatico_db::model::event::Event;
use agendatico_service::error::ServiceError;
use agendatico_service::events::draft::{EventDraft, FieldError};
use agendatico_service::events::{self, Submission};

/// Listing/detail item: the event row plus viewer-specific flags.
#[derive(Debug, Serialize)]
struct EventItem {
    #[serde(flatten)]
    event: Event,
    is_favorited: bool,
}

#[derive(Debug, Serialize)]
struct EventDetail {
    #[serde(flatten)]
    event: Event,
    is_favorited: bool,
    is_owner: bool,
}

/// Create/update request payload.
#[derive(Debug, Deserialize)]
struct EventPayload {
    title: String,
    description: String,
    category_id: i64,
    town_id: i64,
    place_id: Option<i64>,
    starts_at: chrono::DateTime<chrono::Utc>,
    ends_at: Option<chrono::DateTime<chrono::Utc>>,
    address: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    organizer_name: Option<String>,
    price_type: PriceType,
    price_amount: Option<String>,
    image_path: Option<String>,
    instagram_url: Option<String>,
    whatsapp_url: Option<String>,
    website_url: Option<String>,
    #[serde(default)]
    is_recurring: bool,
    recurrence_frequency: Option<RecurrenceFrequency>,
    recurrence_end_date: Option<chrono::NaiveDate>,
    #[serde(default)]
    remove_image: bool,
}

impl EventPayload {
    /// Turns the payload into a draft, or reports which recurrence fields a
    /// recurring submission forgot.
    fn into_draft(self) -> Result<(EventDraft, bool), Vec<FieldError>> {
        let recurrence = if self.is_recurring {
            match (self.recurrence_frequency, self.recurrence_end_date) {
                (Some(frequency), Some(end_date)) => Some(RecurrenceRule {
                    frequency,
                    end_date,
                }),
                (frequency, end_date) => {
                    let mut errors = Vec::new();
                    if frequency.is_none() {
                        errors.push(FieldError {
                            field: "recurrence_frequency",
                            message: "Selecciona la frecuencia.".to_string(),
                        });
                    }
                    if end_date.is_none() {
                        errors.push(FieldError {
                            field: "recurrence_end_date",
                            message: "Indica la fecha final.".to_string(),
                        });
                    }
                    return Err(errors);
                }
            }
        } else {
            None
        };

        let draft = EventDraft {
            title: self.title,
            description: self.description,
            category_id: self.category_id,
            town_id: self.town_id,
            place_id: self.place_id,
            starts_at: self.starts_at,
            ends_at: self.ends_at,
            address: self.address,
            latitude: self.latitude,
            longitude: self.longitude,
            organizer_name: self.organizer_name,
            price_type: self.price_type,
            price_amount: self.price_amount,
            image_path: self.image_path,
            instagram_url: self.instagram_url,
            whatsapp_url: self.whatsapp_url,
            website_url: self.website_url,
            recurrence,
        };
        Ok((draft, self.remove_image))
    }
}

/// ## Summary
/// GET /api/events - paginated, filterable listing of upcoming events.
///
/// Filters: `town`, `category`, `date` (today|week|month), `price`
/// (free|donation|paid|any), `search`, `page`. Each item carries
/// `is_favorited` for the current actor (always false for guests, whose
/// favorites live client-side).
#[handler]
async fn index(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let page = req.query::<i64>("page").unwrap_or(1).max(1);
    let filters = events_query::EventFilters {
        town_id: req.query::<i64>("town"),
        category_id: req.query::<i64>("category"),
        date: req
            .query::<String>("date")
            .and_then(|value| value.parse().ok()),
        price: req
            .query::<String>("price")
            .filter(|value| value != "any")
            .and_then(|value| value.parse().ok()),
        search: req
            .query::<String>("search")
            .filter(|value| !value.trim().is_empty()),
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

    let now = chrono::Utc::now();
    let event_page =
        match events_query::list_events(&mut conn, &filters, now, page, EVENTS_PAGE_SIZE).await {
            Ok(p) => p,
            Err(e) => {
                error!(error = ?e, "Failed to list events");
                res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
                res.render(Json(ErrorResponse::new("Internal server error")));
                return;
            }
        };

    let favorite_ids: HashSet<i64> = match get_user(depot) {
        Some(user) => match favorites_query::list_event_ids(&mut conn, user.id).await {
            Ok(ids) => ids.into_iter().collect(),
            Err(e) => {
                error!(error = ?e, "Failed to load favorite ids");
                res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
                res.render(Json(ErrorResponse::new("Internal server error")));
                return;
            }
        },
        None => HashSet::new(),
    };

    let total = event_page.total;
    let items: Vec<EventItem> = event_page
        .items
        .into_iter()
        .map(|event| {
            let is_favorited = favorite_ids.contains(&event.id);
            EventItem {
                event,
                is_favorited,
            }
        })
        .collect();

    res.render(Json(Paginated::new(items, page, EVENTS_PAGE_SIZE, total)));
}

/// ## Summary
/// GET /`api/events/{slug`} - event detail.
///
/// ## Side Effects
/// Increments the event's view counter.
#[handler]
async fn show(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let Some(slug) = req.param::<String>("slug") else {
        res.status_code(StatusCode::BAD_REQUEST);
        res.render(Json(ErrorResponse::new("Event slug required")));
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

    let event = match events_query::find_by_slug(&mut conn, &slug).await {
        Ok(Some(event)) => event,
        Ok(None) => {
            res.status_code(StatusCode::NOT_FOUND);
            res.render(Json(ErrorResponse::new("Event not found")));
            return;
        }
        Err(e) => {
            error!(error = ?e, "Failed to load event");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            res.render(Json(ErrorResponse::new("Internal server error")));
            return;
        }
    };

    if let Err(e) = events_query::increment_views(&mut conn, event.id).await {
        // The page still renders; a lost view tick is not worth a 500.
        error!(error = ?e, event_id = event.id, "Failed to increment view counter");
    }

    let user = get_user(depot);
    let is_owner = user.as_ref().is_some_and(|u| u.id == event.user_id);
    let is_favorited = match &user {
        Some(u) => match favorites_query::is_favorited(&mut conn, u.id, event.id).await {
            Ok(v) => v,
            Err(e) => {
                error!(error = ?e, "Failed to check favorite state");
                false
            }
        },
        None => false,
    };

    res.render(Json(EventDetail {
        event,
        is_favorited,
        is_owner,
    }));
}

/// ## Summary
/// POST /api/events - publish an event (authenticated).
///
/// A recurring submission is expanded server-side; the occurrence count is
/// recomputed here no matter what the client already displayed, and a count
/// over the ceiling rejects the whole submission with HTTP 422 naming the
/// computed count.
///
/// ## Errors
/// Returns HTTP 401 if not authenticated
/// Returns HTTP 422 on validation failure
/// Returns HTTP 500 if database operations fail
#[handler]
async fn store(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let Some(user) = get_user(depot) else {
        res.status_code(StatusCode::UNAUTHORIZED);
        res.render(Json(ErrorResponse::new("Authentication required")));
        return;
    };

    let payload: EventPayload = match req.parse_json().await {
        Ok(p) => p,
        Err(e) => {
            error!(error = ?e, "Failed to parse event payload");
            res.status_code(StatusCode::BAD_REQUEST);
            res.render(Json(ErrorResponse::new("Invalid request body")));
            return;
        }
    };

    let (draft, _remove_image) = match payload.into_draft() {
        Ok(parts) => parts,
        Err(field_errors) => {
            res.status_code(StatusCode::UNPROCESSABLE_ENTITY);
            res.render(Json(ValidationResponse::from_field_errors(field_errors)));
            return;
        }
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

    match events::create(&mut conn, &user, draft, chrono::Utc::now()).await {
        Ok(Submission::Accepted(created)) => {
            res.status_code(StatusCode::CREATED);
            res.render(Json(serde_json::json!({
                "success": true,
                "count": created.len(),
                "events": created,
            })));
        }
        Ok(Submission::Rejected(field_errors)) => {
            res.status_code(StatusCode::UNPROCESSABLE_ENTITY);
            res.render(Json(ValidationResponse::from_field_errors(field_errors)));
        }
        Err(e) => {
            error!(error = ?e, "Failed to create event");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            res.render(Json(ErrorResponse::new("Failed to create event")));
        }
    }
}

/// ## Summary
/// PUT /`api/events/{slug`} - update an event (owner only).
///
/// ## Errors
/// Returns HTTP 401 if not authenticated
/// Returns HTTP 403 if the caller does not own the event
/// Returns HTTP 404 if the event does not exist
/// Returns HTTP 422 on validation failure
#[handler]
async fn update(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let Some(user) = get_user(depot) else {
        res.status_code(StatusCode::UNAUTHORIZED);
        res.render(Json(ErrorResponse::new("Authentication required")));
        return;
    };

    let Some(slug) = req.param::<String>("slug") else {
        res.status_code(StatusCode::BAD_REQUEST);
        res.render(Json(ErrorResponse::new("Event slug required")));
        return;
    };

    let payload: EventPayload = match req.parse_json().await {
        Ok(p) => p,
        Err(e) => {
            error!(error = ?e, "Failed to parse event payload");
            res.status_code(StatusCode::BAD_REQUEST);
            res.render(Json(ErrorResponse::new("Invalid request body")));
            return;
        }
    };

    let (draft, remove_image) = match payload.into_draft() {
        Ok(parts) => parts,
        Err(field_errors) => {
            res.status_code(StatusCode::UNPROCESSABLE_ENTITY);
            res.render(Json(ValidationResponse::from_field_errors(field_errors)));
            return;
        }
    };

    let images = match get_images_from_depot(depot) {
        Ok(i) => i,
        Err(e) => {
            error!(error = ?e, "Failed to get image store");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            res.render(Json(ErrorResponse::new("Internal server error")));
            return;
        }
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

    let outcome = events::update(
        &mut conn,
        &images,
        &user,
        &slug,
        draft,
        remove_image,
        chrono::Utc::now(),
    )
    .await;

    match outcome {
        Ok(Submission::Accepted(event)) => {
            res.render(Json(serde_json::json!({
                "success": true,
                "event": event,
            })));
        }
        Ok(Submission::Rejected(field_errors)) => {
            res.status_code(StatusCode::UNPROCESSABLE_ENTITY);
            res.render(Json(ValidationResponse::from_field_errors(field_errors)));
        }
        Err(ServiceError::NotFound(_)) => {
            res.status_code(StatusCode::NOT_FOUND);
            res.render(Json(ErrorResponse::new("Event not found")));
        }
        Err(ServiceError::AuthorizationError(_)) => {
            res.status_code(StatusCode::FORBIDDEN);
            res.render(Json(ErrorResponse::new("You do not own this event")));
        }
        Err(e) => {
            error!(error = ?e, "Failed to update event");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            res.render(Json(ErrorResponse::new("Failed to update event")));
        }
    }
}

/// ## Summary
/// DELETE /`api/events/{slug`} - soft-delete an event (owner only).
///
/// ## Side Effects
/// Removes the event's image asset.
///
/// ## Errors
/// Returns HTTP 401 if not authenticated
/// Returns HTTP 403 if the caller does not own the event
/// Returns HTTP 404 if the event does not exist
#[handler]
async fn destroy(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let Some(user) = get_user(depot) else {
        res.status_code(StatusCode::UNAUTHORIZED);
        res.render(Json(ErrorResponse::new("Authentication required")));
        return;
    };

    let Some(slug) = req.param::<String>("slug") else {
        res.status_code(StatusCode::BAD_REQUEST);
        res.render(Json(ErrorResponse::new("Event slug required")));
        return;
    };

    let images = match get_images_from_depot(depot) {
        Ok(i) => i,
        Err(e) => {
            error!(error = ?e, "Failed to get image store");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            res.render(Json(ErrorResponse::new("Internal server error")));
            return;
        }
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

    match events::destroy(&mut conn, &images, &user, &slug, chrono::Utc::now()).await {
        Ok(()) => {
            res.render(Json(serde_json::json!({ "success": true })));
        }
        Err(ServiceError::NotFound(_)) => {
            res.status_code(StatusCode::NOT_FOUND);
            res.render(Json(ErrorResponse::new("Event not found")));
        }
        Err(ServiceError::AuthorizationError(_)) => {
            res.status_code(StatusCode::FORBIDDEN);
            res.render(Json(ErrorResponse::new("You do not own this event")));
        }
        Err(e) => {
            error!(error = ?e, "Failed to delete event");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            res.render(Json(ErrorResponse::new("Failed to delete event")));
        }
    }
}

/// ## Summary
/// GET /api/my-events - the caller's own events, soft-deleted included,
/// newest first (authenticated).
#[handler]
async fn my_events(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let Some(user) = get_user(depot) else {
        res.status_code(StatusCode::UNAUTHORIZED);
        res.render(Json(ErrorResponse::new("Authentication required")));
        return;
    };

    let page = req.query::<i64>("page").unwrap_or(1).max(1);

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

    match events_query::list_by_owner(&mut conn, user.id, page, EVENTS_PAGE_SIZE).await {
        Ok(event_page) => {
            let total = event_page.total;
            res.render(Json(Paginated::new(
                event_page.items,
                page,
                EVENTS_PAGE_SIZE,
                total,
            )));
        }
        Err(e) => {
            error!(error = ?e, "Failed to list own events");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            res.render(Json(ErrorResponse::new("Internal server error")));
        }
    }
}

/// ## Summary
/// POST /api/events/image - stores an uploaded event image and returns its
/// path for a subsequent create/update call (authenticated). The client is
/// expected to have resized the image already.
#[handler]
async fn upload_image(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let Some(_user) = get_user(depot) else {
        res.status_code(StatusCode::UNAUTHORIZED);
        res.render(Json(ErrorResponse::new("Authentication required")));
        return;
    };

    let Some(file) = req.file("image").await else {
        res.status_code(StatusCode::BAD_REQUEST);
        res.render(Json(ErrorResponse::new("Image file required")));
        return;
    };

    let extension = file
        .name()
        .and_then(|name| name.rsplit('.').next())
        .unwrap_or("jpg")
        .to_string();

    let bytes = match tokio::fs::read(file.path()).await {
        Ok(b) => b,
        Err(e) => {
            error!(error = ?e, "Failed to read uploaded file");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            res.render(Json(ErrorResponse::new("Failed to read upload")));
            return;
        }
    };

    let images = match get_images_from_depot(depot) {
        Ok(i) => i,
        Err(e) => {
            error!(error = ?e, "Failed to get image store");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            res.render(Json(ErrorResponse::new("Internal server error")));
            return;
        }
    };

    match images.save(&extension, &bytes).await {
        Ok(path) => {
            res.status_code(StatusCode::CREATED);
            res.render(Json(serde_json::json!({ "path": path })));
        }
        Err(e) => {
            error!(error = ?e, "Failed to store image");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            res.render(Json(ErrorResponse::new("Failed to store image")));
        }
    }
}

#[must_use]
pub fn routes() -> Router {
    Router::new()
        .push(
            Router::with_path("events")
                .get(index)
                .post(store)
                .push(Router::with_path("image").post(upload_image))
                .push(
                    Router::with_path("<slug>")
                        .get(show)
                        .put(update)
                        .delete(destroy),
                ),
        )
        .push(Router::with_path("my-events").get(my_events))
}
