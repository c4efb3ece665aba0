//! Request and response shapes shared by the collection handlers.

use pagination::PageRequest;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::Error;

use super::validation::page_error;

/// Offset/limit query parameters.
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Rows to skip (default 0).
    pub skip: Option<i64>,
    /// Maximum rows to return (default 100).
    pub limit: Option<i64>,
}

impl TryFrom<PageQuery> for PageRequest {
    type Error = Error;

    fn try_from(query: PageQuery) -> Result<Self, Self::Error> {
        Self::new(query.skip, query.limit).map_err(|err| page_error(&err))
    }
}

/// Confirmation body returned by delete endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DeletedResponse {
    /// Always `deleted`.
    #[schema(example = "deleted")]
    pub detail: String,
}

impl DeletedResponse {
    /// The fixed `{"detail": "deleted"}` body.
    #[must_use]
    pub fn deleted() -> Self {
        Self {
            detail: "deleted".to_owned(),
        }
    }
}
