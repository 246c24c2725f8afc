//! Thin typed wrapper over the favorites HTTP endpoints.
//!
//! Every request carries the session bearer token and a bounded timeout;
//! a timed-out toggle is indistinguishable from any other failure and rolls
//! back the same way.

use std::time::Duration;

use serde::Deserialize;

use crate::error::{ClientError, ClientResult};

#[derive(Debug, Clone, Deserialize)]
pub struct FavoritesResponse {
    pub favorites: Vec<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToggleResponse {
    pub success: bool,
    pub is_favorited: bool,
    pub favorites_count: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SyncResponse {
    pub success: bool,
    pub synced_count: u32,
    pub favorites: Vec<i64>,
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl ApiClient {
    /// ## Summary
    /// Builds a client for one authenticated session.
    ///
    /// ## Errors
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> ClientResult<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    /// ## Summary
    /// Fetches the authenticated favorite id list (`GET /api/favorites`).
    ///
    /// ## Errors
    /// Returns HTTP/status errors; the server answers guests with an empty
    /// list rather than an error.
    pub async fn get_favorites(&self) -> ClientResult<Vec<i64>> {
        let response = self
            .http
            .get(format!("{}/api/favorites", self.base_url))
            .bearer_auth(&self.token)
            .send()
            .await?;

        let body: FavoritesResponse = checked(response)?.json().await?;
        Ok(body.favorites)
    }

    /// ## Summary
    /// Toggles one favorite (`POST /api/events/{id}/favorite`).
    ///
    /// ## Errors
    /// `Unauthorized` on 401, `UnexpectedStatus` on other failures.
    pub async fn toggle_favorite(&self, event_id: i64) -> ClientResult<ToggleResponse> {
        let response = self
            .http
            .post(format!(
                "{}/api/events/{event_id}/favorite",
                self.base_url
            ))
            .bearer_auth(&self.token)
            .send()
            .await?;

        Ok(checked(response)?.json().await?)
    }

    /// ## Summary
    /// Sends a guest batch for merging (`POST /api/favorites/sync`).
    ///
    /// ## Errors
    /// `Unauthorized` on 401, `UnexpectedStatus` on other failures.
    pub async fn sync_favorites(&self, event_ids: &[i64]) -> ClientResult<SyncResponse> {
        let response = self
            .http
            .post(format!("{}/api/favorites/sync", self.base_url))
            .bearer_auth(&self.token)
            .json(&serde_json::json!({ "event_ids": event_ids }))
            .send()
            .await?;

        Ok(checked(response)?.json().await?)
    }
}

fn checked(response: reqwest::Response) -> ClientResult<reqwest::Response> {
    match response.status() {
        status if status.is_success() => Ok(response),
        reqwest::StatusCode::UNAUTHORIZED => Err(ClientError::Unauthorized),
        status => Err(ClientError::UnexpectedStatus(status.as_u16())),
    }
}
