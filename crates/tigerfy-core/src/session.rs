//! Owner identity attached to each request.
//!
//! Logging in is somebody else's job; this module only carries the result so
//! every query can be scoped to the owner that made it.

use crate::error::{BackofficeError, Result};

/// The authenticated user a request acts for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    owner: Option<String>,
}

impl Session {
    /// A request without a logged-in user.
    pub fn anonymous() -> Self {
        Self { owner: None }
    }

    /// A request made by `owner`. Blank identifiers count as anonymous.
    pub fn for_owner(owner: impl Into<String>) -> Self {
        let owner = owner.into();
        let owner = owner.trim();
        Self {
            owner: (!owner.is_empty()).then(|| owner.to_string()),
        }
    }

    pub fn current_owner_id(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    /// The owner, or [`BackofficeError::Unauthenticated`].
    pub fn require_owner(&self) -> Result<&str> {
        self.current_owner_id()
            .ok_or(BackofficeError::Unauthenticated)
    }
}

impl From<Option<String>> for Session {
    fn from(owner: Option<String>) -> Self {
        owner.map(Session::for_owner).unwrap_or_default()
    }
}
