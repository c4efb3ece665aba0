//! Driven ports at the boundary between the domain and its storage adapters.

mod calculation_repository;
mod user_repository;

pub use calculation_repository::{CalculationPersistenceError, CalculationRepository};
pub use user_repository::{UniqueField, UserPersistenceError, UserRepository};
