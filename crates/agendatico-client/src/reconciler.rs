//! The reconciler proper: one favorites capability, two backends, and the
//! exactly-once guest-to-account migration at the login boundary.

use std::sync::Arc;

use crate::ToggleResolution;
use crate::api::ApiClient;
use crate::error::ClientResult;
use crate::local::LocalFavorites;
use crate::remote::RemoteFavorites;
use crate::storage::KeyValueStorage;

/// Authentication state as the reconciler sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Guest,
    Authenticated,
}

/// ## Summary
/// The migration trigger, as a pure function of the state transition:
/// only the guest-to-authenticated edge migrates, so a batch is merged at
/// most once per login no matter how often state is re-observed.
#[must_use]
pub const fn migration_required(previous: AuthState, current: AuthState) -> bool {
    matches!(
        (previous, current),
        (AuthState::Guest, AuthState::Authenticated)
    )
}

/// Favorites for whoever is currently using the app. Consumers call
/// `is_favorited` / `toggle` / `list` and never branch on the backend;
/// the auth transitions pick it for them.
pub struct FavoritesReconciler<S: KeyValueStorage> {
    auth: AuthState,
    local: LocalFavorites<S>,
    remote: Option<RemoteFavorites>,
}

impl<S: KeyValueStorage> FavoritesReconciler<S> {
    /// Starts a guest session from whatever the durable storage holds.
    pub fn new(storage: S) -> Self {
        Self {
            auth: AuthState::Guest,
            local: LocalFavorites::new(storage),
            remote: None,
        }
    }

    #[must_use]
    pub const fn auth_state(&self) -> AuthState {
        self.auth
    }

    /// ## Summary
    /// Observes a login: switches to the authenticated backend and migrates
    /// the guest set exactly once.
    ///
    /// The server set is fetched once here and cached for the session. If a
    /// non-empty guest set exists, it is sent as one batch; success clears
    /// local storage entirely (the server already skipped duplicates and
    /// unknown ids item by item), failure leaves it untouched so the next
    /// login retries the migration.
    ///
    /// ## Errors
    /// Returns HTTP errors from the initial favorites fetch; the reconciler
    /// stays in guest mode in that case.
    #[tracing::instrument(skip(self, api))]
    pub async fn login(&mut self, api: Arc<ApiClient>) -> ClientResult<()> {
        let previous = self.auth;
        let remote = RemoteFavorites::new(api).await?;

        if migration_required(previous, AuthState::Authenticated) {
            let pending = self.local.list();
            if pending.is_empty() {
                tracing::debug!("No guest favorites to migrate");
            } else {
                match remote.sync(&pending).await {
                    Ok(_merged) => {
                        // Whole-set clear, not per-item: the batch either
                        // landed or it didn't.
                        self.local.clear();
                    }
                    Err(err) => {
                        tracing::warn!(
                            error = %err,
                            "Favorites migration failed; keeping guest set for retry"
                        );
                    }
                }
            }
        }

        self.auth = AuthState::Authenticated;
        self.remote = Some(remote);
        Ok(())
    }

    /// Observes a logout: back to the guest backend. The guest set was
    /// cleared on login, so a fresh guest session starts empty.
    pub fn logout(&mut self) {
        self.auth = AuthState::Guest;
        self.remote = None;
    }

    pub async fn is_favorited(&self, event_id: i64) -> bool {
        match &self.remote {
            Some(remote) if self.auth == AuthState::Authenticated => {
                remote.is_favorited(event_id).await
            }
            _ => self.local.is_favorited(event_id),
        }
    }

    pub async fn list(&self) -> Vec<i64> {
        match &self.remote {
            Some(remote) if self.auth == AuthState::Authenticated => remote.list().await,
            _ => self.local.list(),
        }
    }

    /// ## Summary
    /// Toggles through whichever backend is active.
    ///
    /// ## Errors
    /// Only the authenticated backend can error (dead session); guest
    /// toggles always resolve.
    pub async fn toggle(&mut self, event_id: i64) -> ClientResult<ToggleResolution> {
        match &self.remote {
            Some(remote) if self.auth == AuthState::Authenticated => {
                remote.toggle(event_id).await
            }
            _ => Ok(self.local.toggle(event_id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn migration_triggers_only_on_the_login_edge() {
        assert!(migration_required(
            AuthState::Guest,
            AuthState::Authenticated
        ));
        assert!(!migration_required(AuthState::Guest, AuthState::Guest));
        assert!(!migration_required(
            AuthState::Authenticated,
            AuthState::Authenticated
        ));
        assert!(!migration_required(
            AuthState::Authenticated,
            AuthState::Guest
        ));
    }

    #[test_log::test(tokio::test)]
    async fn guest_flow_needs_no_network() {
        let mut reconciler = FavoritesReconciler::new(MemoryStorage::new());
        assert_eq!(reconciler.auth_state(), AuthState::Guest);

        let resolution = reconciler.toggle(11).await.unwrap();
        assert!(resolution.is_favorited());
        assert!(reconciler.is_favorited(11).await);
        assert_eq!(reconciler.list().await, vec![11]);

        let resolution = reconciler.toggle(11).await.unwrap();
        assert!(!resolution.is_favorited());
        assert!(reconciler.list().await.is_empty());
    }

    #[test_log::test(tokio::test)]
    async fn logout_returns_to_the_guest_backend() {
        let mut reconciler = FavoritesReconciler::new(MemoryStorage::new());
        reconciler.toggle(3).await.unwrap();
        reconciler.logout();

        assert_eq!(reconciler.auth_state(), AuthState::Guest);
        assert!(reconciler.is_favorited(3).await);
    }
}
