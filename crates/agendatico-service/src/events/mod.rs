//! Event publishing: creation with recurrence fan-out, edits, and soft
//! deletion, always on behalf of the owning user.

pub mod draft;

use chrono::{DateTime, Utc};

use agendatico_core::error::CoreError;
use agendatico_core::recurrence::enforce_occurrence_ceiling;
use agendatico_core::util::slug::generate_event_slug;
use agendatico_db::db::connection::DbConnection;
use agendatico_db::db::query::{catalog, events as events_query, places as places_query};
use agendatico_db::model::event::{Event, EventChangeset, NewEvent};
use agendatico_db::model::user::User;

use crate::error::{ServiceError, ServiceResult};
use crate::storage::ImageStore;
use draft::{EventDraft, FieldError, validate_fields};

/// What became of a submission: rows, or the per-field reasons it bounced.
#[derive(Debug)]
pub enum Submission<T> {
    Accepted(T),
    Rejected(Vec<FieldError>),
}

/// ## Summary
/// Creates the event rows for one submission.
///
/// A non-recurring draft creates exactly one row. A recurring draft is
/// expanded into its occurrence timestamps — identical attributes, each with
/// its own slug, `starts_at` advanced per occurrence and `ends_at` shifted by
/// the same delta. The expansion count is recomputed here regardless of
/// anything the client claimed, and a count over the ceiling rejects the
/// whole submission; the single multi-row INSERT keeps acceptance
/// all-or-nothing.
///
/// ## Errors
/// Returns database errors; validation problems come back as
/// `Submission::Rejected`.
#[tracing::instrument(skip(conn, draft), fields(user_id = user.id, title = %draft.title))]
pub async fn create(
    conn: &mut DbConnection<'_>,
    user: &User,
    draft: EventDraft,
    now: DateTime<Utc>,
) -> ServiceResult<Submission<Vec<Event>>> {
    let mut errors = validate_fields(&draft, now);
    reference_errors(conn, &draft, &mut errors).await?;

    if let Some(rule) = &draft.recurrence {
        let count = rule.occurrence_count(draft.starts_at);
        if let Err(CoreError::ValidationError(message)) = enforce_occurrence_ceiling(count) {
            errors.push(FieldError {
                field: "is_recurring",
                message,
            });
        }
    }

    if !errors.is_empty() {
        tracing::debug!(error_count = errors.len(), "Event submission rejected");
        return Ok(Submission::Rejected(errors));
    }

    let rows = expand_rows(&draft, user.id);
    let created = events_query::create_events(conn, &rows).await?;

    tracing::info!(
        created = created.len(),
        recurring = draft.recurrence.is_some(),
        "Event submission accepted"
    );

    Ok(Submission::Accepted(created))
}

/// ## Summary
/// Replaces an event's attributes with a fresh draft, owner only.
///
/// A new `image_path` in the draft (or `remove_image`) deletes the previous
/// asset. Recurrence is a creation-time concept; a rule on an update draft
/// is ignored rather than fanning out new rows.
///
/// ## Errors
/// - `NotFound` if no live event has this slug
/// - `AuthorizationError` if the caller does not own the event
/// - Database errors; validation problems come back as `Submission::Rejected`
#[tracing::instrument(skip(conn, images, draft), fields(user_id = user.id, slug))]
pub async fn update(
    conn: &mut DbConnection<'_>,
    images: &ImageStore,
    user: &User,
    slug: &str,
    draft: EventDraft,
    remove_image: bool,
    now: DateTime<Utc>,
) -> ServiceResult<Submission<Event>> {
    let event = events_query::find_by_slug(conn, slug)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("event {slug} not found")))?;
    ensure_owner(user, &event)?;

    let mut errors = validate_fields(&draft, now);
    reference_errors(conn, &draft, &mut errors).await?;
    if !errors.is_empty() {
        return Ok(Submission::Rejected(errors));
    }

    let image_path = next_image_path(&event, &draft, remove_image);
    if let Some(old) = replaced_image(&event, &image_path) {
        discard_image(images, &old).await;
    }

    let changeset = EventChangeset {
        title: Some(draft.title),
        description: Some(draft.description),
        category_id: Some(draft.category_id),
        town_id: Some(draft.town_id),
        place_id: Some(draft.place_id),
        starts_at: Some(draft.starts_at),
        ends_at: Some(draft.ends_at),
        address: Some(draft.address),
        latitude: Some(draft.latitude),
        longitude: Some(draft.longitude),
        organizer_name: Some(draft.organizer_name),
        price_type: Some(draft.price_type),
        price_amount: Some(draft.price_amount),
        image_path: Some(image_path),
        instagram_url: Some(draft.instagram_url),
        whatsapp_url: Some(draft.whatsapp_url),
        website_url: Some(draft.website_url),
        updated_at: Some(now),
    };

    let updated = events_query::update_event(conn, event.id, &changeset).await?;

    tracing::info!(event_id = updated.id, "Event updated");

    Ok(Submission::Accepted(updated))
}

/// ## Summary
/// Soft-deletes an event and discards its image asset, owner only.
///
/// ## Errors
/// - `NotFound` if no live event has this slug
/// - `AuthorizationError` if the caller does not own the event
/// - Database errors from the soft delete
#[tracing::instrument(skip(conn, images), fields(user_id = user.id, slug))]
pub async fn destroy(
    conn: &mut DbConnection<'_>,
    images: &ImageStore,
    user: &User,
    slug: &str,
    now: DateTime<Utc>,
) -> ServiceResult<()> {
    let event = events_query::find_by_slug(conn, slug)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("event {slug} not found")))?;
    ensure_owner(user, &event)?;

    events_query::soft_delete(conn, event.id, now).await?;

    if let Some(image_path) = &event.image_path {
        discard_image(images, image_path).await;
    }

    tracing::info!(event_id = event.id, "Event soft-deleted");

    Ok(())
}

/// Owner gate shared by the mutating operations.
fn ensure_owner(user: &User, event: &Event) -> ServiceResult<()> {
    if event.user_id == user.id {
        Ok(())
    } else {
        Err(ServiceError::AuthorizationError(format!(
            "user {} does not own event {}",
            user.id, event.id
        )))
    }
}

/// Appends referential validation errors for category, town, and place.
async fn reference_errors(
    conn: &mut DbConnection<'_>,
    draft: &EventDraft,
    errors: &mut Vec<FieldError>,
) -> ServiceResult<()> {
    if !catalog::category_exists(conn, draft.category_id).await? {
        errors.push(FieldError {
            field: "category_id",
            message: "Selecciona una categoría.".to_string(),
        });
    }
    if !catalog::town_exists(conn, draft.town_id).await? {
        errors.push(FieldError {
            field: "town_id",
            message: "Selecciona un pueblo.".to_string(),
        });
    }
    if let Some(place_id) = draft.place_id
        && !places_query::place_exists(conn, place_id).await?
    {
        errors.push(FieldError {
            field: "place_id",
            message: "El lugar seleccionado no existe.".to_string(),
        });
    }
    Ok(())
}

/// Expands a draft into its insertable rows, one per occurrence.
///
/// A rule that produces no occurrences (possible only for drafts that
/// bypassed field validation) degrades to a single non-recurring event.
fn expand_rows(draft: &EventDraft, user_id: i64) -> Vec<NewEvent> {
    let occurrence_starts = draft
        .recurrence
        .as_ref()
        .map(|rule| rule.occurrences(draft.starts_at))
        .filter(|occurrences| !occurrences.is_empty())
        .unwrap_or_else(|| vec![draft.starts_at]);

    occurrence_starts
        .into_iter()
        .map(|starts_at| {
            let delta = starts_at - draft.starts_at;
            NewEvent {
                title: draft.title.clone(),
                slug: generate_event_slug(&draft.title),
                description: draft.description.clone(),
                user_id,
                category_id: draft.category_id,
                town_id: draft.town_id,
                place_id: draft.place_id,
                starts_at,
                ends_at: draft.ends_at.map(|ends_at| ends_at + delta),
                address: draft.address.clone(),
                latitude: draft.latitude,
                longitude: draft.longitude,
                organizer_name: draft.organizer_name.clone(),
                price_type: draft.price_type,
                price_amount: draft.price_amount.clone(),
                image_path: draft.image_path.clone(),
                instagram_url: draft.instagram_url.clone(),
                whatsapp_url: draft.whatsapp_url.clone(),
                website_url: draft.website_url.clone(),
            }
        })
        .collect()
}

/// The image path the event should end up with after an update.
fn next_image_path(event: &Event, draft: &EventDraft, remove_image: bool) -> Option<String> {
    if draft.image_path.is_some() {
        draft.image_path.clone()
    } else if remove_image {
        None
    } else {
        event.image_path.clone()
    }
}

/// The old asset to discard, if the update replaced or dropped it.
fn replaced_image(event: &Event, next: &Option<String>) -> Option<String> {
    match (&event.image_path, next) {
        (Some(old), Some(new)) if old != new => Some(old.clone()),
        (Some(old), None) => Some(old.clone()),
        _ => None,
    }
}

/// Best-effort asset removal; the database is already consistent, so a
/// failed unlink is logged instead of failing the request.
async fn discard_image(images: &ImageStore, path: &str) {
    if let Err(err) = images.delete(path).await {
        tracing::warn!(path, error = %err, "Failed to remove image asset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agendatico_core::recurrence::{RecurrenceFrequency, RecurrenceRule};
    use agendatico_db::db::enums::PriceType;
    use chrono::TimeZone;

    fn utc(y: i32, mo: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, 0, 0).unwrap()
    }

    fn draft_with(recurrence: Option<RecurrenceRule>) -> EventDraft {
        EventDraft {
            title: "Feria del Mar".to_string(),
            description: "Puestos y música".to_string(),
            category_id: 1,
            town_id: 2,
            place_id: Some(3),
            starts_at: utc(2025, 6, 20, 19),
            ends_at: Some(utc(2025, 6, 20, 22)),
            address: None,
            latitude: None,
            longitude: None,
            organizer_name: None,
            price_type: PriceType::Free,
            price_amount: None,
            image_path: None,
            instagram_url: None,
            whatsapp_url: None,
            website_url: None,
            recurrence,
        }
    }

    #[test]
    fn non_recurring_draft_expands_to_one_row() {
        let rows = expand_rows(&draft_with(None), 7);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].starts_at, utc(2025, 6, 20, 19));
        assert_eq!(rows[0].user_id, 7);
    }

    #[test]
    fn weekly_draft_expands_with_shifted_end_times() {
        let rule = RecurrenceRule {
            frequency: RecurrenceFrequency::Weekly,
            end_date: utc(2025, 7, 4, 0).date_naive(),
        };
        let rows = expand_rows(&draft_with(Some(rule)), 7);

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].starts_at, utc(2025, 6, 27, 19));
        assert_eq!(rows[1].ends_at, Some(utc(2025, 6, 27, 22)));
        assert_eq!(rows[2].starts_at, utc(2025, 7, 4, 19));
        assert_eq!(rows[2].ends_at, Some(utc(2025, 7, 4, 22)));
    }

    #[test]
    fn every_expanded_row_gets_its_own_slug() {
        let rule = RecurrenceRule {
            frequency: RecurrenceFrequency::Weekly,
            end_date: utc(2025, 7, 18, 0).date_naive(),
        };
        let rows = expand_rows(&draft_with(Some(rule)), 7);
        let mut slugs: Vec<&str> = rows.iter().map(|r| r.slug.as_str()).collect();
        slugs.sort_unstable();
        slugs.dedup();
        assert_eq!(slugs.len(), rows.len());
    }

    #[test]
    fn replaced_image_is_detected() {
        let draft = EventDraft {
            image_path: Some("events/new.jpg".to_string()),
            ..draft_with(None)
        };
        let mut event = fake_event();
        event.image_path = Some("events/old.jpg".to_string());

        let next = next_image_path(&event, &draft, false);
        assert_eq!(next.as_deref(), Some("events/new.jpg"));
        assert_eq!(
            replaced_image(&event, &next),
            Some("events/old.jpg".to_string())
        );
    }

    #[test]
    fn remove_image_clears_and_discards() {
        let event = {
            let mut event = fake_event();
            event.image_path = Some("events/old.jpg".to_string());
            event
        };
        let next = next_image_path(&event, &draft_with(None), true);
        assert_eq!(next, None);
        assert_eq!(
            replaced_image(&event, &next),
            Some("events/old.jpg".to_string())
        );
    }

    #[test]
    fn untouched_image_is_kept() {
        let event = {
            let mut event = fake_event();
            event.image_path = Some("events/old.jpg".to_string());
            event
        };
        let next = next_image_path(&event, &draft_with(None), false);
        assert_eq!(next.as_deref(), Some("events/old.jpg"));
        assert_eq!(replaced_image(&event, &next), None);
    }

    fn fake_event() -> Event {
        Event {
            id: 1,
            title: "Feria del Mar".to_string(),
            slug: "feria-del-mar-abc123".to_string(),
            description: "Puestos y música".to_string(),
            user_id: 7,
            category_id: 1,
            town_id: 2,
            place_id: None,
            starts_at: utc(2025, 6, 20, 19),
            ends_at: None,
            address: None,
            latitude: None,
            longitude: None,
            organizer_name: None,
            price_type: PriceType::Free,
            price_amount: None,
            image_path: None,
            instagram_url: None,
            whatsapp_url: None,
            website_url: None,
            views_count: 0,
            favorites_count: 0,
            created_at: utc(2025, 6, 1, 0),
            updated_at: utc(2025, 6, 1, 0),
            deleted_at: None,
        }
    }
}
