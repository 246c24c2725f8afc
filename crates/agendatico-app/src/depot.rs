//! Depot keys and accessors shared by middleware and handlers.

use agendatico_core::locale::Locale;
use agendatico_db::actor::Actor;
use agendatico_db::model::user::User;

pub mod depot_keys {
    pub const ACTOR: &str = "__actor";
    pub const LOCALE: &str = "__locale";
}

/// Get the current actor from the depot. Requests that never went through
/// the auth middleware count as guests.
#[must_use]
pub fn get_actor(depot: &salvo::Depot) -> Actor {
    depot
        .get::<Actor>(depot_keys::ACTOR)
        .ok()
        .cloned()
        .unwrap_or(Actor::Guest)
}

/// Get the authenticated user from the depot, if any.
#[must_use]
pub fn get_user(depot: &salvo::Depot) -> Option<User> {
    match get_actor(depot) {
        Actor::User(user) => Some(user),
        Actor::Guest => None,
    }
}

/// Get the negotiated locale for this request.
#[must_use]
pub fn get_locale(depot: &salvo::Depot) -> Locale {
    depot
        .get::<Locale>(depot_keys::LOCALE)
        .ok()
        .copied()
        .unwrap_or_default()
}
