//! Calculation data model.
//!
//! A calculation is a record of an arithmetic request submitted by a user.
//! The service stores whatever `result` the caller reports; it never
//! evaluates `operation` itself.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::user::UserId;

/// Maximum length of an operation label, in characters.
pub const OPERATION_MAX: usize = 20;

/// Validation errors raised by [`Operation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalculationValidationError {
    /// Operation label is empty or whitespace only.
    EmptyOperation,
    /// Operation label exceeds the column limit.
    OperationTooLong {
        /// Column limit in characters.
        max: usize,
    },
}

impl CalculationValidationError {
    /// Request field the error refers to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        "operation"
    }

    /// Stable detail code reported to clients.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::EmptyOperation => "empty_operation",
            Self::OperationTooLong { .. } => "operation_too_long",
        }
    }
}

impl fmt::Display for CalculationValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyOperation => write!(f, "operation must not be empty"),
            Self::OperationTooLong { max } => {
                write!(f, "operation must be at most {max} characters")
            }
        }
    }
}

impl std::error::Error for CalculationValidationError {}

/// System-assigned calculation identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CalculationId(i32);

impl CalculationId {
    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(raw: i32) -> Self {
        Self(raw)
    }

    /// Raw integer value as stored.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl From<i32> for CalculationId {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

impl fmt::Display for CalculationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Free-form operation label such as `add` or `divide`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Operation(String);

impl Operation {
    /// Validate and construct an [`Operation`].
    ///
    /// # Errors
    /// [`CalculationValidationError`] when the label is blank or too long.
    pub fn new(raw: impl Into<String>) -> Result<Self, CalculationValidationError> {
        let value: String = raw.into();
        if value.trim().is_empty() {
            return Err(CalculationValidationError::EmptyOperation);
        }
        if value.chars().count() > OPERATION_MAX {
            return Err(CalculationValidationError::OperationTooLong { max: OPERATION_MAX });
        }
        Ok(Self(value))
    }
}

impl AsRef<str> for Operation {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Operation> for String {
    fn from(value: Operation) -> Self {
        value.0
    }
}

impl TryFrom<String> for Operation {
    type Error = CalculationValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Stored calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Calculation {
    /// Identifier assigned on insert.
    #[schema(value_type = i32, example = 1)]
    pub id: CalculationId,
    /// Operation label.
    #[schema(value_type = String, example = "add")]
    pub operation: Operation,
    /// First operand.
    #[schema(example = 2.0)]
    pub operand_a: f64,
    /// Second operand.
    #[schema(example = 3.0)]
    pub operand_b: f64,
    /// Result reported by the caller.
    #[schema(example = 5.0)]
    pub result: f64,
    /// Insert time.
    pub timestamp: DateTime<Utc>,
    /// Owning user.
    #[schema(value_type = i32, example = 1)]
    pub user_id: UserId,
}

/// Validated input for recording a calculation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCalculation {
    /// Operation label.
    pub operation: Operation,
    /// First operand.
    pub operand_a: f64,
    /// Second operand.
    pub operand_b: f64,
    /// Result reported by the caller.
    pub result: f64,
    /// Owning user; must exist.
    pub user_id: UserId,
}

/// Replacement result for an existing calculation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalculationUpdate {
    /// New result.
    pub result: f64,
}

/// Calculation flattened with its owner's username.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CalculationSummary {
    /// Owner's username.
    #[schema(value_type = String, example = "carol")]
    pub username: super::user::Username,
    /// Operation label.
    #[schema(value_type = String, example = "add")]
    pub operation: Operation,
    /// First operand.
    pub operand_a: f64,
    /// Second operand.
    pub operand_b: f64,
    /// Stored result.
    pub result: f64,
}
