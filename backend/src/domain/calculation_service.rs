//! Calculation domain service.

use std::sync::Arc;

use pagination::PageRequest;
use serde_json::json;
use tracing::info;

use crate::domain::ports::{CalculationPersistenceError, CalculationRepository};
use crate::domain::user_service::USER_NOT_FOUND;
use crate::domain::{
    Calculation, CalculationId, CalculationSummary, CalculationUpdate, Error, NewCalculation,
};

const CALCULATION_NOT_FOUND: &str = "Calculation not found";

/// Use-cases over recorded calculations.
#[derive(Clone)]
pub struct CalculationService {
    repo: Arc<dyn CalculationRepository>,
}

impl CalculationService {
    /// Create a service backed by `repo`.
    #[must_use]
    pub fn new(repo: Arc<dyn CalculationRepository>) -> Self {
        Self { repo }
    }

    fn map_persistence_error(error: CalculationPersistenceError) -> Error {
        match error {
            CalculationPersistenceError::Connection { message } => Error::service_unavailable(
                format!("calculation repository unavailable: {message}"),
            ),
            CalculationPersistenceError::Query { message } => {
                Error::internal(format!("calculation repository error: {message}"))
            }
            CalculationPersistenceError::UserNotFound => Error::not_found(USER_NOT_FOUND),
        }
    }

    fn not_found(id: CalculationId) -> Error {
        Error::not_found(CALCULATION_NOT_FOUND).with_details(json!({ "calculation_id": id.get() }))
    }

    /// Record a calculation for an existing user. `result` is stored as given.
    ///
    /// # Errors
    /// NotFound when `user_id` references no user.
    pub async fn create(&self, new_calc: &NewCalculation) -> Result<Calculation, Error> {
        let user_id = new_calc.user_id;
        let calc = self.repo.create(new_calc).await.map_err(|err| match err {
            CalculationPersistenceError::UserNotFound => Error::not_found(USER_NOT_FOUND)
                .with_details(json!({ "user_id": user_id.get() })),
            other => Self::map_persistence_error(other),
        })?;
        info!(
            calculation_id = %calc.id,
            user_id = %calc.user_id,
            operation = %calc.operation,
            "calculation recorded"
        );
        Ok(calc)
    }

    /// Page through calculations in ascending id order.
    pub async fn list(&self, page: PageRequest) -> Result<Vec<Calculation>, Error> {
        self.repo
            .list(page)
            .await
            .map_err(Self::map_persistence_error)
    }

    /// Fetch a single calculation.
    pub async fn get(&self, id: CalculationId) -> Result<Calculation, Error> {
        self.repo
            .find_by_id(id)
            .await
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| Self::not_found(id))
    }

    /// Every calculation with its owner's username.
    pub async fn list_with_usernames(&self) -> Result<Vec<CalculationSummary>, Error> {
        self.repo
            .list_with_usernames()
            .await
            .map_err(Self::map_persistence_error)
    }

    /// Replace the stored result of a calculation.
    pub async fn update_result(
        &self,
        id: CalculationId,
        update: CalculationUpdate,
    ) -> Result<Calculation, Error> {
        let calc = self
            .repo
            .update_result(id, update)
            .await
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| Self::not_found(id))?;
        info!(calculation_id = %id, result = update.result, "calculation result updated");
        Ok(calc)
    }

    /// Delete a calculation.
    pub async fn delete(&self, id: CalculationId) -> Result<(), Error> {
        let removed = self
            .repo
            .delete(id)
            .await
            .map_err(Self::map_persistence_error)?;
        if !removed {
            return Err(Self::not_found(id));
        }
        info!(calculation_id = %id, "calculation deleted");
        Ok(())
    }
}
