//! PostgreSQL-backed `CalculationRepository` built on Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use pagination::PageRequest;

use crate::domain::ports::{CalculationPersistenceError, CalculationRepository};
use crate::domain::{
    Calculation, CalculationId, CalculationSummary, CalculationUpdate, NewCalculation,
};

use super::error_mapping::StorageFailure;
use super::models::{CalculationRow, CalculationSummaryRow, NewCalculationRow};
use super::pool::DbPool;
use super::schema::{calculations, users};

/// Diesel implementation of [`CalculationRepository`].
#[derive(Clone)]
pub struct DieselCalculationRepository {
    pool: DbPool,
}

impl DieselCalculationRepository {
    /// Create a repository over `pool`.
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn to_port_error(failure: StorageFailure) -> CalculationPersistenceError {
    match failure {
        StorageFailure::Connection(message) => CalculationPersistenceError::connection(message),
        StorageFailure::Query(message) => CalculationPersistenceError::query(message),
        StorageFailure::MissingReference => CalculationPersistenceError::user_not_found(),
        StorageFailure::Duplicate(field) => {
            CalculationPersistenceError::query(format!("unexpected duplicate {field}"))
        }
    }
}

fn from_row(row: CalculationRow) -> Result<Calculation, StorageFailure> {
    Calculation::try_from(row).map_err(|err| StorageFailure::Query(err.to_string()))
}

#[async_trait]
impl CalculationRepository for DieselCalculationRepository {
    async fn create(
        &self,
        calculation: &NewCalculation,
    ) -> Result<Calculation, CalculationPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| to_port_error(err.into()))?;
        conn.transaction::<_, StorageFailure, _>(|conn| {
            async move {
                // Hold the owner row until commit so a concurrent user delete
                // waits for the insert and then cascades it.
                let owner = users::table
                    .find(calculation.user_id.get())
                    .select(users::id)
                    .for_key_share()
                    .first::<i32>(conn)
                    .await
                    .optional()?;
                if owner.is_none() {
                    return Err(StorageFailure::MissingReference);
                }
                let row = diesel::insert_into(calculations::table)
                    .values(NewCalculationRow::from(calculation))
                    .returning(CalculationRow::as_returning())
                    .get_result::<CalculationRow>(conn)
                    .await?;
                from_row(row)
            }
            .scope_boxed()
        })
        .await
        .map_err(to_port_error)
    }

    async fn list(
        &self,
        page: PageRequest,
    ) -> Result<Vec<Calculation>, CalculationPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| to_port_error(err.into()))?;
        let rows = calculations::table
            .order(calculations::id.asc())
            .offset(page.skip())
            .limit(page.limit())
            .select(CalculationRow::as_select())
            .load::<CalculationRow>(&mut conn)
            .await
            .map_err(|err| to_port_error(err.into()))?;
        rows.into_iter()
            .map(from_row)
            .collect::<Result<_, _>>()
            .map_err(to_port_error)
    }

    async fn find_by_id(
        &self,
        id: CalculationId,
    ) -> Result<Option<Calculation>, CalculationPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| to_port_error(err.into()))?;
        let row = calculations::table
            .find(id.get())
            .select(CalculationRow::as_select())
            .first::<CalculationRow>(&mut conn)
            .await
            .optional()
            .map_err(|err| to_port_error(err.into()))?;
        row.map(from_row).transpose().map_err(to_port_error)
    }

    async fn list_with_usernames(
        &self,
    ) -> Result<Vec<CalculationSummary>, CalculationPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| to_port_error(err.into()))?;
        let rows = calculations::table
            .inner_join(users::table)
            .order(calculations::id.asc())
            .select((
                users::username,
                calculations::operation,
                calculations::operand_a,
                calculations::operand_b,
                calculations::result,
            ))
            .load::<CalculationSummaryRow>(&mut conn)
            .await
            .map_err(|err| to_port_error(err.into()))?;
        rows.into_iter()
            .map(|row| {
                CalculationSummary::try_from(row)
                    .map_err(|err| CalculationPersistenceError::query(err.to_string()))
            })
            .collect()
    }

    async fn update_result(
        &self,
        id: CalculationId,
        update: CalculationUpdate,
    ) -> Result<Option<Calculation>, CalculationPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| to_port_error(err.into()))?;
        let row = diesel::update(calculations::table.find(id.get()))
            .set(calculations::result.eq(update.result))
            .returning(CalculationRow::as_returning())
            .get_result::<CalculationRow>(&mut conn)
            .await
            .optional()
            .map_err(|err| to_port_error(err.into()))?;
        row.map(from_row).transpose().map_err(to_port_error)
    }

    async fn delete(&self, id: CalculationId) -> Result<bool, CalculationPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| to_port_error(err.into()))?;
        let removed = diesel::delete(calculations::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(|err| to_port_error(err.into()))?;
        Ok(removed > 0)
    }
}
