//! Bearer session tokens.
//!
//! The raw token travels only to the client; the database stores its SHA-256
//! digest, so a leaked sessions table cannot be replayed.

use chrono::{DateTime, TimeDelta, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use sha2::{Digest, Sha256};

use agendatico_db::db::connection::DbConnection;
use agendatico_db::db::schema;
use agendatico_db::model::user::{NewSession, User};

use crate::error::{ServiceError, ServiceResult};

/// A freshly issued session: the raw token plus its expiry.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

fn digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

fn generate_token() -> String {
    // Two v4 UUIDs back to back: 64 hex characters of randomness.
    format!(
        "{}{}",
        uuid::Uuid::new_v4().simple(),
        uuid::Uuid::new_v4().simple()
    )
}

/// ## Summary
/// Issues a new session for a user.
///
/// ## Side Effects
/// Inserts a session row holding the token digest.
///
/// ## Errors
/// Returns an error if `ttl_hours` doesn't fit a time delta or the insert
/// fails.
#[tracing::instrument(skip(conn))]
pub async fn issue(
    conn: &mut DbConnection<'_>,
    user_id: i64,
    ttl_hours: i64,
) -> ServiceResult<IssuedSession> {
    let ttl = TimeDelta::try_hours(ttl_hours).ok_or(ServiceError::InvalidConfiguration(
        format!("invalid session ttl: {ttl_hours}h"),
    ))?;
    let token = generate_token();
    let token_digest = digest(&token);
    let expires_at = Utc::now() + ttl;

    let new_session = NewSession {
        user_id,
        token_digest: &token_digest,
        expires_at,
    };

    diesel::insert_into(schema::sessions::table)
        .values(&new_session)
        .execute(conn)
        .await?;

    tracing::debug!(user_id, %expires_at, "Session issued");

    Ok(IssuedSession { token, expires_at })
}

/// ## Summary
/// Resolves a bearer token to its user, if the session is still live.
///
/// ## Errors
/// Returns a database error if the lookup fails.
pub async fn authenticate(
    conn: &mut DbConnection<'_>,
    token: &str,
    now: DateTime<Utc>,
) -> ServiceResult<Option<User>> {
    Ok(schema::sessions::table
        .inner_join(schema::users::table)
        .filter(schema::sessions::token_digest.eq(digest(token)))
        .filter(schema::sessions::expires_at.gt(now))
        .select(User::as_select())
        .first::<User>(conn)
        .await
        .optional()?)
}

/// ## Summary
/// Revokes a session by its raw token. Unknown tokens are a no-op.
///
/// ## Errors
/// Returns a database error if the delete fails.
pub async fn revoke(conn: &mut DbConnection<'_>, token: &str) -> ServiceResult<()> {
    diesel::delete(
        schema::sessions::table.filter(schema::sessions::token_digest.eq(digest(token))),
    )
    .execute(conn)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_long_and_unique() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
    }

    #[test]
    fn digest_is_stable_hex() {
        let d1 = digest("some-token");
        let d2 = digest("some-token");
        assert_eq!(d1, d2);
        assert_eq!(d1.len(), 64);
        assert!(d1.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn different_tokens_have_different_digests() {
        assert_ne!(digest("a"), digest("b"));
    }
}
