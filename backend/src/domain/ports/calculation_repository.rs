//! Port abstraction for calculation persistence adapters and their errors.

use async_trait::async_trait;
use pagination::PageRequest;

use crate::domain::{
    Calculation, CalculationId, CalculationSummary, CalculationUpdate, NewCalculation,
};

/// Persistence errors raised by calculation repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalculationPersistenceError {
    /// Repository connection could not be established.
    #[error("calculation repository connection failed: {message}")]
    Connection {
        /// Driver or pool message.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("calculation repository query failed: {message}")]
    Query {
        /// Driver message.
        message: String,
    },
    /// The referenced owner does not exist.
    #[error("owning user does not exist")]
    UserNotFound,
}

impl CalculationPersistenceError {
    /// Build a [`CalculationPersistenceError::Connection`].
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Build a [`CalculationPersistenceError::Query`].
    #[must_use]
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Build a [`CalculationPersistenceError::UserNotFound`].
    #[must_use]
    pub const fn user_not_found() -> Self {
        Self::UserNotFound
    }
}

/// Storage operations over calculations.
#[async_trait]
pub trait CalculationRepository: Send + Sync {
    /// Insert a calculation, failing with
    /// [`CalculationPersistenceError::UserNotFound`] when the owner is absent.
    async fn create(
        &self,
        calculation: &NewCalculation,
    ) -> Result<Calculation, CalculationPersistenceError>;

    /// Calculations in ascending id order, windowed by `page`.
    async fn list(&self, page: PageRequest)
    -> Result<Vec<Calculation>, CalculationPersistenceError>;

    /// Fetch a calculation by identifier.
    async fn find_by_id(
        &self,
        id: CalculationId,
    ) -> Result<Option<Calculation>, CalculationPersistenceError>;

    /// Every calculation joined with its owner's username, ascending id.
    async fn list_with_usernames(
        &self,
    ) -> Result<Vec<CalculationSummary>, CalculationPersistenceError>;

    /// Replace the stored result; `Ok(None)` when the calculation is absent.
    async fn update_result(
        &self,
        id: CalculationId,
        update: CalculationUpdate,
    ) -> Result<Option<Calculation>, CalculationPersistenceError>;

    /// Remove a calculation; `false` when absent.
    async fn delete(&self, id: CalculationId) -> Result<bool, CalculationPersistenceError>;
}
