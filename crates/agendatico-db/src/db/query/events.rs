//! Event listing, lookup, and mutation queries.

use chrono::{DateTime, Datelike, Days, Months, NaiveTime, Utc};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use agendatico_core::error::CoreError;

use crate::db::connection::DbConnection;
use crate::db::enums::PriceType;
use crate::db::query::text_match::contains_pattern;
use crate::db::schema::{events, favorites};
use crate::error::DbResult;
use crate::model::event::{Event, EventChangeset, NewEvent};

/// Relative date window for the listing filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateWindow {
    Today,
    Week,
    Month,
}

impl std::str::FromStr for DateWindow {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "today" => Ok(Self::Today),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            other => Err(CoreError::ParseError(format!(
                "unknown date window: {other}"
            ))),
        }
    }
}

/// ## Summary
/// Exclusive upper bound of a date window, anchored at `now`.
///
/// Listings always require `starts_at >= now`; a window only narrows the
/// future side. `Today` ends at the next midnight, `Week` at the midnight
/// after Sunday, `Month` at the first midnight of the next month (all UTC).
#[must_use]
pub fn window_end(window: DateWindow, now: DateTime<Utc>) -> DateTime<Utc> {
    let today = now.date_naive();
    let end_date = match window {
        DateWindow::Today => today + Days::new(1),
        DateWindow::Week => {
            let past_sunday = 8 - u64::from(today.weekday().number_from_monday());
            today + Days::new(past_sunday)
        }
        DateWindow::Month => today
            .with_day(1)
            .and_then(|first| first.checked_add_months(Months::new(1)))
            .unwrap_or(today + Days::new(31)),
    };
    end_date.and_time(NaiveTime::MIN).and_utc()
}

/// Listing filters, all optional; `None` means "don't narrow".
#[derive(Debug, Clone, Default)]
pub struct EventFilters {
    pub town_id: Option<i64>,
    pub category_id: Option<i64>,
    pub date: Option<DateWindow>,
    pub price: Option<PriceType>,
    pub search: Option<String>,
}

/// A page of results plus the total row count for pagination.
#[derive(Debug, Clone)]
pub struct EventPage {
    pub items: Vec<Event>,
    pub total: i64,
}

fn filtered(filters: &EventFilters, now: DateTime<Utc>) -> events::BoxedQuery<'static, Pg> {
    let mut query = events::table
        .into_boxed()
        .filter(events::deleted_at.is_null())
        .filter(events::starts_at.ge(now));

    if let Some(window) = filters.date {
        query = query.filter(events::starts_at.lt(window_end(window, now)));
    }
    if let Some(town_id) = filters.town_id {
        query = query.filter(events::town_id.eq(town_id));
    }
    if let Some(category_id) = filters.category_id {
        query = query.filter(events::category_id.eq(category_id));
    }
    if let Some(price) = filters.price {
        query = query.filter(events::price_type.eq(price));
    }
    if let Some(search) = &filters.search {
        let pattern = contains_pattern(search);
        query = query.filter(
            events::title
                .ilike(pattern.clone())
                .or(events::description.ilike(pattern)),
        );
    }

    query
}

/// ## Summary
/// Loads one page of upcoming events matching `filters`, ordered by start
/// time, along with the total match count.
///
/// ## Errors
/// Returns a database error if either query fails.
pub async fn list_events(
    conn: &mut DbConnection<'_>,
    filters: &EventFilters,
    now: DateTime<Utc>,
    page: i64,
    per_page: i64,
) -> DbResult<EventPage> {
    let total: i64 = filtered(filters, now).count().get_result(conn).await?;

    let items = filtered(filters, now)
        .order(events::starts_at.asc())
        .limit(per_page)
        .offset((page - 1) * per_page)
        .select(Event::as_select())
        .load(conn)
        .await?;

    Ok(EventPage { items, total })
}

/// ## Summary
/// Finds a live (not soft-deleted) event by its slug.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn find_by_slug(conn: &mut DbConnection<'_>, slug: &str) -> DbResult<Option<Event>> {
    Ok(events::table
        .filter(events::slug.eq(slug))
        .filter(events::deleted_at.is_null())
        .select(Event::as_select())
        .first(conn)
        .await
        .optional()?)
}

/// ## Summary
/// Finds a live (not soft-deleted) event by id.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn find_by_id(conn: &mut DbConnection<'_>, id: i64) -> DbResult<Option<Event>> {
    Ok(events::table
        .find(id)
        .filter(events::deleted_at.is_null())
        .select(Event::as_select())
        .first(conn)
        .await
        .optional()?)
}

/// ## Summary
/// Returns the subset of `ids` that reference live events.
///
/// Used by the favorites sync batch to skip identifiers that don't point at
/// anything real.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn existing_ids(conn: &mut DbConnection<'_>, ids: &[i64]) -> DbResult<Vec<i64>> {
    Ok(events::table
        .filter(events::id.eq_any(ids.iter().copied()))
        .filter(events::deleted_at.is_null())
        .select(events::id)
        .load(conn)
        .await?)
}

/// ## Summary
/// Bumps the view counter with atomic SQL arithmetic.
///
/// ## Errors
/// Returns a database error if the update fails.
pub async fn increment_views(conn: &mut DbConnection<'_>, id: i64) -> DbResult<()> {
    diesel::update(events::table.find(id))
        .set(events::views_count.eq(events::views_count + 1))
        .execute(conn)
        .await?;
    Ok(())
}

/// ## Summary
/// Inserts a batch of event rows and returns them with their fresh ids.
///
/// A non-recurring submission passes a single row; a recurring one passes
/// one row per occurrence. Callers wrap this in a transaction when the batch
/// must be all-or-nothing.
///
/// ## Errors
/// Returns a database error if the insert fails.
pub async fn create_events(
    conn: &mut DbConnection<'_>,
    rows: &[NewEvent],
) -> DbResult<Vec<Event>> {
    Ok(diesel::insert_into(events::table)
        .values(rows)
        .returning(Event::as_returning())
        .get_results(conn)
        .await?)
}

/// ## Summary
/// Applies a partial update to one event and returns the updated row.
///
/// ## Errors
/// Returns a database error if the update fails.
pub async fn update_event(
    conn: &mut DbConnection<'_>,
    id: i64,
    changeset: &EventChangeset,
) -> DbResult<Event> {
    Ok(diesel::update(events::table.find(id))
        .set(changeset)
        .returning(Event::as_returning())
        .get_result(conn)
        .await?)
}

/// ## Summary
/// Soft-deletes an event by stamping `deleted_at`.
///
/// ## Errors
/// Returns a database error if the update fails.
pub async fn soft_delete(
    conn: &mut DbConnection<'_>,
    id: i64,
    now: DateTime<Utc>,
) -> DbResult<()> {
    diesel::update(events::table.find(id))
        .set((events::deleted_at.eq(Some(now)), events::updated_at.eq(now)))
        .execute(conn)
        .await?;
    Ok(())
}

/// ## Summary
/// Lists a user's own events, soft-deleted ones included, newest first.
///
/// ## Errors
/// Returns a database error if either query fails.
pub async fn list_by_owner(
    conn: &mut DbConnection<'_>,
    user_id: i64,
    page: i64,
    per_page: i64,
) -> DbResult<EventPage> {
    let total: i64 = events::table
        .filter(events::user_id.eq(user_id))
        .count()
        .get_result(conn)
        .await?;

    let items = events::table
        .filter(events::user_id.eq(user_id))
        .order(events::created_at.desc())
        .limit(per_page)
        .offset((page - 1) * per_page)
        .select(Event::as_select())
        .load(conn)
        .await?;

    Ok(EventPage { items, total })
}

/// ## Summary
/// Loads live events that start on or after `since`, newest first. Feeds
/// the sitemap generator.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn starting_since(
    conn: &mut DbConnection<'_>,
    since: DateTime<Utc>,
) -> DbResult<Vec<Event>> {
    Ok(events::table
        .filter(events::deleted_at.is_null())
        .filter(events::starts_at.ge(since))
        .order(events::starts_at.desc())
        .select(Event::as_select())
        .load(conn)
        .await?)
}

/// ## Summary
/// Loads a user's upcoming favorited events, soonest first.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn upcoming_favorites(
    conn: &mut DbConnection<'_>,
    user_id: i64,
    now: DateTime<Utc>,
) -> DbResult<Vec<Event>> {
    Ok(favorites::table
        .inner_join(events::table.on(events::id.eq(favorites::event_id)))
        .filter(favorites::user_id.eq(user_id))
        .filter(events::deleted_at.is_null())
        .filter(events::starts_at.ge(now))
        .order(events::starts_at.asc())
        .select(Event::as_select())
        .load(conn)
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, mo: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, 0, 0).unwrap()
    }

    #[test_log::test]
    fn today_window_ends_at_next_midnight() {
        // 2025-06-18 is a Wednesday.
        let end = window_end(DateWindow::Today, utc(2025, 6, 18, 15));
        assert_eq!(end, utc(2025, 6, 19, 0));
    }

    #[test]
    fn week_window_ends_after_sunday() {
        let end = window_end(DateWindow::Week, utc(2025, 6, 18, 15));
        assert_eq!(end, utc(2025, 6, 23, 0));
    }

    #[test]
    fn week_window_on_sunday_ends_next_midnight() {
        // 2025-06-22 is a Sunday.
        let end = window_end(DateWindow::Week, utc(2025, 6, 22, 9));
        assert_eq!(end, utc(2025, 6, 23, 0));
    }

    #[test]
    fn month_window_ends_on_first_of_next_month() {
        let end = window_end(DateWindow::Month, utc(2025, 6, 18, 15));
        assert_eq!(end, utc(2025, 7, 1, 0));
    }

    #[test]
    fn month_window_handles_december() {
        let end = window_end(DateWindow::Month, utc(2025, 12, 5, 8));
        assert_eq!(end, utc(2026, 1, 1, 0));
    }

    #[test]
    fn date_window_parses_known_values() {
        assert_eq!("today".parse::<DateWindow>().unwrap(), DateWindow::Today);
        assert_eq!("week".parse::<DateWindow>().unwrap(), DateWindow::Week);
        assert_eq!("month".parse::<DateWindow>().unwrap(), DateWindow::Month);
        assert!("yesterday".parse::<DateWindow>().is_err());
    }
}
