//! Authentication: email/password accounts, social identities, and the
//! bearer sessions both flows end up issuing.

pub mod password;
pub mod session;
pub mod social;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use agendatico_db::db::connection::DbConnection;
use agendatico_db::db::schema;
use agendatico_db::model::user::{NewUser, User};

use crate::error::{ServiceError, ServiceResult};

/// ## Summary
/// Looks a user up by email.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn find_by_email(
    conn: &mut DbConnection<'_>,
    email: &str,
) -> ServiceResult<Option<User>> {
    Ok(schema::users::table
        .filter(schema::users::email.eq(email))
        .select(User::as_select())
        .first::<User>(conn)
        .await
        .optional()?)
}

/// ## Summary
/// Registers a new email/password account.
///
/// ## Side Effects
/// Inserts a user row with an Argon2 password hash.
///
/// ## Errors
/// - `Conflict` if the email is already registered
/// - Errors from hashing or the insert
#[tracing::instrument(skip(conn, password), fields(email))]
pub async fn register(
    conn: &mut DbConnection<'_>,
    name: &str,
    email: &str,
    password: &str,
) -> ServiceResult<User> {
    if find_by_email(conn, email).await?.is_some() {
        return Err(ServiceError::Conflict(format!(
            "email {email} is already registered"
        )));
    }

    let password_hash = password::hash_password(password)?;

    let new_user = NewUser {
        name,
        email,
        password_hash: Some(password_hash.as_str()),
    };

    let user = diesel::insert_into(schema::users::table)
        .values(&new_user)
        .returning(User::as_select())
        .get_result::<User>(conn)
        .await?;

    tracing::info!(user_id = user.id, "User registered");

    Ok(user)
}

/// ## Summary
/// Verifies email/password credentials.
///
/// ## Errors
/// Returns `NotAuthenticated` for an unknown email, a social-only account,
/// or a wrong password; database errors otherwise.
#[tracing::instrument(skip(conn, password), fields(email))]
pub async fn login(
    conn: &mut DbConnection<'_>,
    email: &str,
    password: &str,
) -> ServiceResult<User> {
    let user = find_by_email(conn, email)
        .await?
        .ok_or(ServiceError::NotAuthenticated)?;

    let Some(password_hash) = &user.password_hash else {
        // Social-only account: no password to check against.
        return Err(ServiceError::NotAuthenticated);
    };

    password::verify_password(password, password_hash)?;

    tracing::debug!(user_id = user.id, "Credentials verified");

    Ok(user)
}
