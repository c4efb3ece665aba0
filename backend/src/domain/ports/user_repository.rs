//! Port abstraction for user persistence adapters and their errors.

use std::fmt;

use async_trait::async_trait;
use pagination::PageRequest;

use crate::domain::{NewUser, User, UserId, UserUpdate};

/// User column guarded by a uniqueness constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    /// `users.username`.
    Username,
    /// `users.email`.
    Email,
}

impl fmt::Display for UniqueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Username => "username",
            Self::Email => "email",
        })
    }
}

/// Persistence errors raised by user repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserPersistenceError {
    /// Repository connection could not be established.
    #[error("user repository connection failed: {message}")]
    Connection {
        /// Driver or pool message.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("user repository query failed: {message}")]
    Query {
        /// Driver message.
        message: String,
    },
    /// Another user already holds the value of `field`.
    #[error("user {field} already exists")]
    Duplicate {
        /// Column whose constraint rejected the write.
        field: UniqueField,
    },
}

impl UserPersistenceError {
    /// Build a [`UserPersistenceError::Connection`].
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Build a [`UserPersistenceError::Query`].
    #[must_use]
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Build a [`UserPersistenceError::Duplicate`].
    #[must_use]
    pub const fn duplicate(field: UniqueField) -> Self {
        Self::Duplicate { field }
    }
}

/// Storage operations over users and their owned calculations.
///
/// Every returned [`User`] carries its calculations in ascending id order.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user, rejecting a taken username or email with
    /// [`UserPersistenceError::Duplicate`].
    async fn create(&self, user: &NewUser) -> Result<User, UserPersistenceError>;

    /// Users in ascending id order, windowed by `page`.
    async fn list(&self, page: PageRequest) -> Result<Vec<User>, UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Apply the present fields of `update`; `Ok(None)` when the user is absent.
    async fn update(
        &self,
        id: UserId,
        update: &UserUpdate,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Remove a user and every calculation it owns; `false` when absent.
    async fn delete(&self, id: UserId) -> Result<bool, UserPersistenceError>;
}
