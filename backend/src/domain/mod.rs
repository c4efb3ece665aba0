//! Domain primitives, ports and services.
//!
//! Purpose: define the strongly typed entities shared by the HTTP and
//! persistence adapters, the ports those adapters implement, and the services
//! that apply the business rules between them.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - User, Calculation and their validated value types.
//! - UserService / CalculationService: use-cases over the repository ports.

pub mod calculation;
pub mod calculation_service;
pub mod error;
pub mod ports;
pub mod user;
pub mod user_service;

pub use self::calculation::{
    Calculation, CalculationId, CalculationSummary, CalculationUpdate,
    CalculationValidationError, NewCalculation, OPERATION_MAX, Operation,
};
pub use self::calculation_service::CalculationService;
pub use self::error::{Error, ErrorCode};
pub use self::user::{
    EMAIL_MAX, EmailAddress, NewUser, USERNAME_MAX, User, UserId, UserUpdate,
    UserValidationError, Username,
};
pub use self::user_service::UserService;

/// Convenient result alias for domain and handler code.
///
/// # Examples
/// ```
/// use calc_api::domain::{ApiResult, Error};
///
/// fn lookup() -> ApiResult<()> {
///     Err(Error::not_found("User not found"))
/// }
/// assert!(lookup().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
