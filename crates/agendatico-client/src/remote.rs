//! Authenticated favorites: the server's set, fetched once per session and
//! cached, with optimistic toggles reconciled against responses.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::ToggleResolution;
use crate::api::ApiClient;
use crate::error::{ClientError, ClientResult};
use crate::membership::{flip, set_membership};

pub struct RemoteFavorites {
    api: Arc<ApiClient>,
    /// Last-known authenticated set; only completed toggles and the latest
    /// optimistic guess are visible here.
    state: Mutex<Vec<i64>>,
    /// Per-event-id toggle locks. Overlapping toggles on one event used to
    /// race (last response wins); holding the id's lock across the request
    /// serializes them instead.
    toggle_locks: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl RemoteFavorites {
    /// ## Summary
    /// Builds the authenticated backend by fetching the server set once.
    ///
    /// ## Errors
    /// Returns HTTP errors from the initial fetch.
    pub async fn new(api: Arc<ApiClient>) -> ClientResult<Self> {
        let favorites = api.get_favorites().await?;
        tracing::debug!(count = favorites.len(), "Fetched authenticated favorites");
        Ok(Self {
            api,
            state: Mutex::new(favorites),
            toggle_locks: Mutex::new(HashMap::new()),
        })
    }

    pub async fn is_favorited(&self, event_id: i64) -> bool {
        self.state.lock().await.contains(&event_id)
    }

    pub async fn list(&self) -> Vec<i64> {
        self.state.lock().await.clone()
    }

    /// ## Summary
    /// Optimistically flips one favorite, then reconciles with the server.
    ///
    /// The flip is applied to the cached set before the request goes out, so
    /// reads during the round trip already show the guess. On success the
    /// server's answer is adopted verbatim; on failure (timeouts included)
    /// the pre-toggle state is restored and reported as `RolledBack`.
    /// Toggles on the same event id are serialized through a per-id lock.
    ///
    /// ## Errors
    /// `Unauthorized` if the session died mid-flight (after rollback).
    /// Transient failures are not errors; they resolve as `RolledBack`.
    #[tracing::instrument(skip(self))]
    pub async fn toggle(&self, event_id: i64) -> ClientResult<ToggleResolution> {
        let lock = self.toggle_lock(event_id).await;
        let _serialized = lock.lock().await;

        // Optimistic flip from the currently held set.
        let previous = {
            let mut state = self.state.lock().await;
            let flipped_to = flip(&mut state, event_id);
            !flipped_to
        };

        match self.api.toggle_favorite(event_id).await {
            Ok(response) => {
                let mut state = self.state.lock().await;
                set_membership(&mut state, event_id, response.is_favorited);
                Ok(ToggleResolution::Confirmed {
                    is_favorited: response.is_favorited,
                    favorites_count: Some(response.favorites_count),
                    persisted: true,
                })
            }
            Err(err) => {
                {
                    let mut state = self.state.lock().await;
                    set_membership(&mut state, event_id, previous);
                }
                if matches!(err, ClientError::Unauthorized) {
                    return Err(err);
                }
                tracing::warn!(error = %err, "Favorite toggle failed; rolled back");
                Ok(ToggleResolution::RolledBack {
                    is_favorited: previous,
                })
            }
        }
    }

    /// ## Summary
    /// Sends a guest batch to the server and adopts the merged set.
    ///
    /// ## Errors
    /// Returns HTTP/status errors; on failure the cached set is untouched.
    #[tracing::instrument(skip(self, event_ids), fields(batch_len = event_ids.len()))]
    pub async fn sync(&self, event_ids: &[i64]) -> ClientResult<Vec<i64>> {
        let response = self.api.sync_favorites(event_ids).await?;

        tracing::info!(
            synced_count = response.synced_count,
            "Guest favorites merged into account"
        );

        let mut state = self.state.lock().await;
        *state = response.favorites.clone();
        Ok(response.favorites)
    }

    async fn toggle_lock(&self, event_id: i64) -> Arc<Mutex<()>> {
        let mut locks = self.toggle_locks.lock().await;
        locks
            .entry(event_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
