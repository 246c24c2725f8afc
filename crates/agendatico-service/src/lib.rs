//! Domain services for Agendatico.
//!
//! Everything here composes the db crate's queries into the operations the
//! HTTP layer exposes: favorites toggle/sync, event publishing with
//! recurrence fan-out, session auth, image assets, and sitemap generation.

pub mod auth;
pub mod error;
pub mod events;
pub mod favorites;
pub mod sitemap;
pub mod storage;
