//! Social login at the interface boundary.
//!
//! The three-legged OAuth dance happens entirely in the provider's hands;
//! what arrives here is an already-verified profile. This module only decides
//! which local user it belongs to, creating one on first sight.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use agendatico_db::db::connection::DbConnection;
use agendatico_db::db::schema;
use agendatico_db::model::user::{AuthIdentity, NewAuthIdentity, NewUser, User};

use crate::error::ServiceResult;

/// Externally verified identity-provider profile.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct SocialProfile {
    pub provider: String,
    pub provider_user_id: String,
    pub email: String,
    pub name: String,
}

/// ## Summary
/// Finds or creates the local user for a social profile.
///
/// Resolution order: an existing identity link wins; otherwise an account
/// with the same email gets the identity attached; otherwise a new
/// password-less user is created with the link.
///
/// ## Side Effects
/// May insert a user row and/or an identity row.
///
/// ## Errors
/// Returns database errors from the lookups or inserts.
#[tracing::instrument(skip(conn, profile), fields(provider = %profile.provider))]
pub async fn login_or_register(
    conn: &mut DbConnection<'_>,
    profile: &SocialProfile,
) -> ServiceResult<User> {
    // Existing link?
    let linked = schema::auth_identities::table
        .inner_join(schema::users::table)
        .filter(schema::auth_identities::provider.eq(&profile.provider))
        .filter(schema::auth_identities::provider_user_id.eq(&profile.provider_user_id))
        .select(User::as_select())
        .first::<User>(conn)
        .await
        .optional()?;

    if let Some(user) = linked {
        tracing::debug!(user_id = user.id, "Social identity already linked");
        return Ok(user);
    }

    // Same email, different login method: attach the identity.
    let user = match crate::auth::find_by_email(conn, &profile.email).await? {
        Some(user) => user,
        None => {
            let new_user = NewUser {
                name: &profile.name,
                email: &profile.email,
                password_hash: None,
            };
            let user = diesel::insert_into(schema::users::table)
                .values(&new_user)
                .returning(User::as_select())
                .get_result::<User>(conn)
                .await?;
            tracing::info!(user_id = user.id, "User created from social profile");
            user
        }
    };

    let new_identity = NewAuthIdentity {
        user_id: user.id,
        provider: &profile.provider,
        provider_user_id: &profile.provider_user_id,
    };
    let _identity: AuthIdentity = diesel::insert_into(schema::auth_identities::table)
        .values(&new_identity)
        .returning(AuthIdentity::as_select())
        .get_result::<AuthIdentity>(conn)
        .await?;

    tracing::info!(user_id = user.id, "Social identity linked");

    Ok(user)
}
