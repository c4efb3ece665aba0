//! Classification of pool and Diesel failures shared by the repositories.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::{debug, warn};

use crate::domain::ports::UniqueField;

use super::pool::PoolError;

const USERNAME_CONSTRAINT: &str = "users_username_key";
const EMAIL_CONSTRAINT: &str = "users_email_key";

/// Storage failure reduced to the cases the repositories distinguish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StorageFailure {
    /// The connection is gone or could not be obtained.
    Connection(String),
    /// Any other failed statement.
    Query(String),
    /// A known unique constraint on `users` rejected the write.
    Duplicate(UniqueField),
    /// A foreign key pointed at a missing row.
    MissingReference,
}

impl From<PoolError> for StorageFailure {
    fn from(error: PoolError) -> Self {
        Self::Connection(error.message().to_owned())
    }
}

impl From<DieselError> for StorageFailure {
    fn from(error: DieselError) -> Self {
        match &error {
            DieselError::DatabaseError(kind, info) => {
                debug!(
                    ?kind,
                    message = info.message(),
                    constraint = info.constraint_name(),
                    "diesel operation failed"
                );
            }
            _ => debug!(
                error_type = %std::any::type_name_of_val(&error),
                "diesel operation failed"
            ),
        }

        match error {
            DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
                Self::Connection("database connection error".to_owned())
            }
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                match info.constraint_name() {
                    Some(USERNAME_CONSTRAINT) => Self::Duplicate(UniqueField::Username),
                    Some(EMAIL_CONSTRAINT) => Self::Duplicate(UniqueField::Email),
                    other => {
                        warn!(constraint = ?other, "unexpected unique violation");
                        Self::Query("database error".to_owned())
                    }
                }
            }
            DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                Self::MissingReference
            }
            DieselError::QueryBuilderError(_) => Self::Query("database query error".to_owned()),
            DieselError::NotFound => Self::Query("record not found".to_owned()),
            _ => Self::Query("database error".to_owned()),
        }
    }
}
