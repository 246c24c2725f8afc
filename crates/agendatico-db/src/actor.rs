//! Request actor shared between middleware and handlers through the depot.

use crate::model::user::User;

/// Who is making the current request. Guests are first-class citizens: they
/// can browse and keep favorites client-side, they just can't publish or
/// touch server-side favorites.
#[derive(Debug, Clone)]
pub enum Actor {
    User(User),
    Guest,
}

impl Actor {
    /// Returns the authenticated user, if any.
    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        match self {
            Self::User(user) => Some(user),
            Self::Guest => None,
        }
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::User(_))
    }
}
