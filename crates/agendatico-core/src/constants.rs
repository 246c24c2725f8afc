/// Route component constants shared across crates
pub const API_ROUTE_COMPONENT: &str = "api";
pub const API_ROUTE_PREFIX: &str = const_str::concat!("/", API_ROUTE_COMPONENT);

pub const EVENTS_ROUTE_COMPONENT: &str = "events";
pub const EVENTS_ROUTE_PREFIX: &str =
    const_str::concat!(API_ROUTE_PREFIX, "/", EVENTS_ROUTE_COMPONENT);

pub const FAVORITES_ROUTE_COMPONENT: &str = "favorites";
pub const FAVORITES_ROUTE_PREFIX: &str =
    const_str::concat!(API_ROUTE_PREFIX, "/", FAVORITES_ROUTE_COMPONENT);

/// Key under which guest favorites live in browser-local storage.
pub const FAVORITES_STORAGE_KEY: &str = "agendatico_favorites";

/// Events per page on listing endpoints.
pub const EVENTS_PAGE_SIZE: i64 = 12;

/// Maximum results returned by the place autocomplete search.
pub const PLACES_SEARCH_LIMIT: i64 = 20;

/// Cookie carrying the visitor's locale preference.
pub const LOCALE_COOKIE: &str = "locale";

/// Locale cookie lifetime.
pub const LOCALE_COOKIE_MAX_AGE_DAYS: i64 = 365;
