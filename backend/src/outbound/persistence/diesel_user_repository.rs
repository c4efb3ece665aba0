//! PostgreSQL-backed `UserRepository` built on Diesel.
//!
//! Users are always returned with their calculations, loaded in a second
//! query through `belonging_to` and regrouped per user in ascending id order.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use pagination::PageRequest;

use crate::domain::ports::{UniqueField, UserPersistenceError, UserRepository};
use crate::domain::{NewUser, User, UserId, UserUpdate};

use super::error_mapping::StorageFailure;
use super::models::{CalculationRow, NewUserRow, UserChangeset, UserRow, user_from_rows};
use super::pool::DbPool;
use super::schema::{calculations, users};

/// Diesel implementation of [`UserRepository`].
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a repository over `pool`.
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn to_port_error(failure: StorageFailure) -> UserPersistenceError {
    match failure {
        StorageFailure::Connection(message) => UserPersistenceError::connection(message),
        StorageFailure::Query(message) => UserPersistenceError::query(message),
        StorageFailure::Duplicate(field) => UserPersistenceError::duplicate(field),
        StorageFailure::MissingReference => {
            UserPersistenceError::query("unexpected foreign key violation")
        }
    }
}

/// Attach calculations to each user row, preserving the order of `rows`.
async fn with_calculations(
    conn: &mut AsyncPgConnection,
    rows: Vec<UserRow>,
) -> Result<Vec<User>, StorageFailure> {
    let calcs = CalculationRow::belonging_to(&rows)
        .select(CalculationRow::as_select())
        .order(calculations::id.asc())
        .load::<CalculationRow>(conn)
        .await?;
    let grouped = calcs.grouped_by(&rows);
    rows.into_iter()
        .zip(grouped)
        .map(|(row, calcs)| {
            user_from_rows(row, calcs).map_err(|err| StorageFailure::Query(err.to_string()))
        })
        .collect()
}

async fn single_with_calculations(
    conn: &mut AsyncPgConnection,
    row: UserRow,
) -> Result<User, StorageFailure> {
    with_calculations(conn, vec![row])
        .await?
        .pop()
        .ok_or_else(|| StorageFailure::Query("user row vanished while loading".to_owned()))
}

async fn taken_field(
    conn: &mut AsyncPgConnection,
    user: &NewUser,
) -> Result<Option<UniqueField>, StorageFailure> {
    let username_taken = users::table
        .filter(users::username.eq(user.username.as_ref()))
        .select(users::id)
        .first::<i32>(conn)
        .await
        .optional()?;
    if username_taken.is_some() {
        return Ok(Some(UniqueField::Username));
    }
    let email_taken = users::table
        .filter(users::email.eq(user.email.as_ref()))
        .select(users::id)
        .first::<i32>(conn)
        .await
        .optional()?;
    Ok(email_taken.map(|_| UniqueField::Email))
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(&self, user: &NewUser) -> Result<User, UserPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| to_port_error(err.into()))?;
        conn.transaction::<_, StorageFailure, _>(|conn| {
            async move {
                if let Some(field) = taken_field(conn, user).await? {
                    return Err(StorageFailure::Duplicate(field));
                }
                let row = diesel::insert_into(users::table)
                    .values(NewUserRow::from(user))
                    .returning(UserRow::as_returning())
                    .get_result(conn)
                    .await?;
                // A fresh user owns no calculations yet.
                user_from_rows(row, Vec::new()).map_err(|err| StorageFailure::Query(err.to_string()))
            }
            .scope_boxed()
        })
        .await
        .map_err(to_port_error)
    }

    async fn list(&self, page: PageRequest) -> Result<Vec<User>, UserPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| to_port_error(err.into()))?;
        let rows = users::table
            .order(users::id.asc())
            .offset(page.skip())
            .limit(page.limit())
            .select(UserRow::as_select())
            .load::<UserRow>(&mut conn)
            .await
            .map_err(|err| to_port_error(err.into()))?;
        with_calculations(&mut conn, rows)
            .await
            .map_err(to_port_error)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| to_port_error(err.into()))?;
        let found = users::table
            .find(id.get())
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(|err| to_port_error(err.into()))?;
        match found {
            Some(row) => single_with_calculations(&mut conn, row)
                .await
                .map(Some)
                .map_err(to_port_error),
            None => Ok(None),
        }
    }

    async fn update(
        &self,
        id: UserId,
        update: &UserUpdate,
    ) -> Result<Option<User>, UserPersistenceError> {
        if update.is_empty() {
            // Diesel rejects an empty changeset.
            return self.find_by_id(id).await;
        }
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| to_port_error(err.into()))?;
        conn.transaction::<_, StorageFailure, _>(|conn| {
            async move {
                let updated = diesel::update(users::table.find(id.get()))
                    .set(UserChangeset::from(update))
                    .returning(UserRow::as_returning())
                    .get_result::<UserRow>(conn)
                    .await
                    .optional()?;
                match updated {
                    Some(row) => single_with_calculations(conn, row).await.map(Some),
                    None => Ok(None),
                }
            }
            .scope_boxed()
        })
        .await
        .map_err(to_port_error)
    }

    async fn delete(&self, id: UserId) -> Result<bool, UserPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| to_port_error(err.into()))?;
        let removed = diesel::delete(users::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(|err| to_port_error(err.into()))?;
        Ok(removed > 0)
    }
}
