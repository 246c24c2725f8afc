//! Shared foundation for the Agendatico events platform.
//!
//! Holds the pieces every other crate agrees on: configuration loading,
//! route/storage constants, the core error type, locale negotiation, and the
//! recurrence expansion that the server and the API client must compute
//! identically.

pub mod config;
pub mod constants;
pub mod error;
pub mod locale;
pub mod recurrence;
pub mod util;
