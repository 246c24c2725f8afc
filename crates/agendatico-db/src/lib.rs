//! Persistence layer for Agendatico: Diesel schema, row models, and the
//! query modules the service layer composes into domain operations.

use diesel_migrations::{EmbeddedMigrations, embed_migrations};

pub mod actor;
pub mod db;
pub mod error;
pub mod model;

/// Schema migrations compiled into the binary; applied at startup.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();
