//! Database enum types with Diesel serialization.
//!
//! This module provides type-safe enum wrappers for database CHECK constraints.
//! Each enum implements `ToSql` and `FromSql` for automatic conversion between Rust and `PostgreSQL`.

use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::pg::{Pg, PgValue};
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use std::fmt;
use std::io::Write;

use agendatico_core::error::CoreError;

/// Price classification for an event.
///
/// Maps to `events.price_type` CHECK constraint. A free-text amount is only
/// meaningful for `Paid`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    AsExpression,
    FromSqlRow,
    serde::Serialize,
    serde::Deserialize,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "lowercase")]
pub enum PriceType {
    Free,
    Donation,
    Paid,
}

impl ToSql<Text, Pg> for PriceType {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        let s = match self {
            Self::Free => "free",
            Self::Donation => "donation",
            Self::Paid => "paid",
        };
        out.write_all(s.as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Pg> for PriceType {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"free" => Ok(Self::Free),
            b"donation" => Ok(Self::Donation),
            b"paid" => Ok(Self::Paid),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

impl PriceType {
    /// Returns the database string representation of this price type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Donation => "donation",
            Self::Paid => "paid",
        }
    }
}

impl fmt::Display for PriceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PriceType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(Self::Free),
            "donation" => Ok(Self::Donation),
            "paid" => Ok(Self::Paid),
            other => Err(CoreError::ParseError(format!(
                "unknown price type: {other}"
            ))),
        }
    }
}
