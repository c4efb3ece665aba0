//! Diesel row structs.
//!
//! Persistence-only shapes; conversions into domain types live here so the
//! repositories stay focused on queries.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::domain::{
    Calculation, CalculationId, CalculationSummary, EmailAddress, NewCalculation, NewUser,
    Operation, User, UserId, UserUpdate, Username,
};

use super::schema::{calculations, users};

/// Row read from `users`.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Insertable user; `id` and `created_at` are assigned by the database.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub username: &'a str,
    pub email: &'a str,
}

impl<'a> From<&'a NewUser> for NewUserRow<'a> {
    fn from(user: &'a NewUser) -> Self {
        Self {
            username: user.username.as_ref(),
            email: user.email.as_ref(),
        }
    }
}

/// Partial update of a user; `None` leaves the column untouched.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserChangeset<'a> {
    pub username: Option<&'a str>,
    pub email: Option<&'a str>,
}

impl<'a> From<&'a UserUpdate> for UserChangeset<'a> {
    fn from(update: &'a UserUpdate) -> Self {
        Self {
            username: update.username.as_ref().map(AsRef::as_ref),
            email: update.email.as_ref().map(AsRef::as_ref),
        }
    }
}

/// Row read from `calculations`.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = calculations)]
#[diesel(belongs_to(UserRow, foreign_key = user_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CalculationRow {
    pub id: i32,
    pub operation: String,
    pub operand_a: f64,
    pub operand_b: f64,
    pub result: f64,
    pub timestamp: DateTime<Utc>,
    pub user_id: i32,
}

/// Insertable calculation; `id` and `timestamp` are assigned by the database.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = calculations)]
pub(crate) struct NewCalculationRow<'a> {
    pub operation: &'a str,
    pub operand_a: f64,
    pub operand_b: f64,
    pub result: f64,
    pub user_id: i32,
}

impl<'a> From<&'a NewCalculation> for NewCalculationRow<'a> {
    fn from(calc: &'a NewCalculation) -> Self {
        Self {
            operation: calc.operation.as_ref(),
            operand_a: calc.operand_a,
            operand_b: calc.operand_b,
            result: calc.result,
            user_id: calc.user_id.get(),
        }
    }
}

/// Row of the calculations/users inner join.
#[derive(Debug, Clone, Queryable)]
pub(crate) struct CalculationSummaryRow {
    pub username: String,
    pub operation: String,
    pub operand_a: f64,
    pub operand_b: f64,
    pub result: f64,
}

/// Stored text that no longer passes domain validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("stored {table} row failed validation: {reason}")]
pub(crate) struct InvalidRow {
    table: &'static str,
    reason: String,
}

impl InvalidRow {
    fn new(table: &'static str, reason: &dyn std::fmt::Display) -> Self {
        Self {
            table,
            reason: reason.to_string(),
        }
    }
}

impl TryFrom<CalculationRow> for Calculation {
    type Error = InvalidRow;

    fn try_from(row: CalculationRow) -> Result<Self, Self::Error> {
        let operation =
            Operation::new(row.operation).map_err(|err| InvalidRow::new("calculations", &err))?;
        Ok(Self {
            id: CalculationId::new(row.id),
            operation,
            operand_a: row.operand_a,
            operand_b: row.operand_b,
            result: row.result,
            timestamp: row.timestamp,
            user_id: UserId::new(row.user_id),
        })
    }
}

/// Assemble a domain user from its row and its calculation rows.
pub(crate) fn user_from_rows(
    row: UserRow,
    calculation_rows: Vec<CalculationRow>,
) -> Result<User, InvalidRow> {
    let id = row.id;
    let username = Username::new(row.username).map_err(|err| InvalidRow::new("users", &err))?;
    let email = EmailAddress::new(row.email).map_err(|err| InvalidRow::new("users", &err))?;
    let calculations = calculation_rows
        .into_iter()
        .map(Calculation::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(User {
        id: UserId::new(id),
        username,
        email,
        created_at: row.created_at,
        calculations,
    })
}

impl TryFrom<CalculationSummaryRow> for CalculationSummary {
    type Error = InvalidRow;

    fn try_from(row: CalculationSummaryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            username: Username::new(row.username).map_err(|err| InvalidRow::new("users", &err))?,
            operation: Operation::new(row.operation)
                .map_err(|err| InvalidRow::new("calculations", &err))?,
            operand_a: row.operand_a,
            operand_b: row.operand_b,
            result: row.result,
        })
    }
}
