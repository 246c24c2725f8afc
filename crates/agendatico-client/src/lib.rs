//! Client half of the favorites reconciler.
//!
//! One capability — `is_favorited` / `toggle` / `list` — backed by two
//! concrete variants: a guest set in durable local storage and an
//! authenticated set cached from the server. [`FavoritesReconciler`] selects
//! the variant from the authentication state and migrates the guest set into
//! the account exactly once on login.

pub mod api;
pub mod error;
pub mod local;
mod membership;
pub mod reconciler;
pub mod remote;
pub mod storage;

pub use api::ApiClient;
pub use error::{ClientError, ClientResult};
pub use local::LocalFavorites;
pub use reconciler::{AuthState, FavoritesReconciler, migration_required};
pub use remote::RemoteFavorites;
pub use storage::{KeyValueStorage, MemoryStorage};

/// How one toggle ended, after the optimistic flip was reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleResolution {
    /// The flip stuck; state is authoritative.
    Confirmed {
        is_favorited: bool,
        /// Fresh server-side count, when the authenticated backend answered.
        favorites_count: Option<i64>,
        /// `false` when guest-local storage refused the write: the in-memory
        /// set still holds the flip and the divergence is surfaced here
        /// instead of being swallowed.
        persisted: bool,
    },
    /// The request failed and the optimistic flip was undone.
    RolledBack { is_favorited: bool },
}

impl ToggleResolution {
    /// The membership state the UI should show after reconciliation.
    #[must_use]
    pub const fn is_favorited(self) -> bool {
        match self {
            Self::Confirmed { is_favorited, .. } | Self::RolledBack { is_favorited } => {
                is_favorited
            }
        }
    }
}
