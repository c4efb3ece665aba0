//! PostgreSQL persistence adapters.
//!
//! Diesel repositories implementing the domain ports over a `bb8` pool of
//! `diesel-async` connections, plus the embedded schema migrations.

mod diesel_calculation_repository;
mod diesel_user_repository;
mod error_mapping;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_calculation_repository::DieselCalculationRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
