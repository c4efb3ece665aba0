//! User domain service.
//!
//! Applies the user business rules on top of [`UserRepository`] and turns
//! persistence failures into domain [`Error`]s.

use std::sync::Arc;

use pagination::PageRequest;
use serde_json::json;
use tracing::info;

use crate::domain::ports::{UniqueField, UserPersistenceError, UserRepository};
use crate::domain::{Error, NewUser, User, UserId, UserUpdate};

pub(crate) const USER_NOT_FOUND: &str = "User not found";

/// Use-cases over registered users.
#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
}

impl UserService {
    /// Create a service backed by `repo`.
    #[must_use]
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }

    fn map_persistence_error(error: UserPersistenceError) -> Error {
        match error {
            UserPersistenceError::Connection { message } => {
                Error::service_unavailable(format!("user repository unavailable: {message}"))
            }
            UserPersistenceError::Query { message } => {
                Error::internal(format!("user repository error: {message}"))
            }
            UserPersistenceError::Duplicate { field } => {
                let message = match field {
                    UniqueField::Username => "Username already registered",
                    UniqueField::Email => "Email already registered",
                };
                Error::duplicate(message).with_details(json!({ "field": field.to_string() }))
            }
        }
    }

    fn not_found(id: UserId) -> Error {
        Error::not_found(USER_NOT_FOUND).with_details(json!({ "user_id": id.get() }))
    }

    /// Register a new user.
    ///
    /// # Errors
    /// Duplicate when the username or email is already taken.
    pub async fn create(&self, new_user: &NewUser) -> Result<User, Error> {
        let user = self
            .repo
            .create(new_user)
            .await
            .map_err(Self::map_persistence_error)?;
        info!(user_id = %user.id, username = %user.username, "user created");
        Ok(user)
    }

    /// Page through users in ascending id order.
    pub async fn list(&self, page: PageRequest) -> Result<Vec<User>, Error> {
        self.repo
            .list(page)
            .await
            .map_err(Self::map_persistence_error)
    }

    /// Fetch a single user with its calculations.
    pub async fn get(&self, id: UserId) -> Result<User, Error> {
        self.repo
            .find_by_id(id)
            .await
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| Self::not_found(id))
    }

    /// Apply a partial update.
    ///
    /// Uniqueness is not pre-checked; a collision surfaces from storage as
    /// Duplicate.
    pub async fn update(&self, id: UserId, update: &UserUpdate) -> Result<User, Error> {
        if update.is_empty() {
            return self.get(id).await;
        }
        let user = self
            .repo
            .update(id, update)
            .await
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| Self::not_found(id))?;
        info!(
            user_id = %id,
            username_changed = update.username.is_some(),
            email_changed = update.email.is_some(),
            "user updated"
        );
        Ok(user)
    }

    /// Delete a user together with its calculations.
    pub async fn delete(&self, id: UserId) -> Result<(), Error> {
        let removed = self
            .repo
            .delete(id)
            .await
            .map_err(Self::map_persistence_error)?;
        if !removed {
            return Err(Self::not_found(id));
        }
        info!(user_id = %id, "user deleted");
        Ok(())
    }
}
