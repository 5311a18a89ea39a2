//! The host's user, as far as payment drivers are concerned.

use serde::{Deserialize, Serialize};

use crate::ids::{RemoteCustomerId, UserId};

/// A local user identity.
///
/// Users are owned by the host application. Tender reads `id` and `email`
/// and writes `remote_customer_id` exactly once, when the user is bound to a
/// customer at the payment backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Local identifier.
    pub id: UserId,

    /// Email the remote customer is keyed by.
    pub email: String,

    /// Customer id at the payment backend, once bound.
    pub remote_customer_id: Option<RemoteCustomerId>,
}

impl User {
    /// Create an unbound user.
    #[must_use]
    pub fn new(id: UserId, email: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
            remote_customer_id: None,
        }
    }

    /// Whether the user already has a remote customer.
    #[must_use]
    pub const fn is_bound(&self) -> bool {
        self.remote_customer_id.is_some()
    }
}
