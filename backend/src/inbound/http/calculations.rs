//! Calculation handlers.
//!
//! ```text
//! POST   /calculations/       {"operation":"add","operand_a":2,"operand_b":3,"result":5,"user_id":1}
//! GET    /calculations/?skip=0&limit=100
//! GET    /calculations/join
//! GET    /calculations/{calc_id}
//! PATCH  /calculations/{calc_id}   {"result":6}
//! DELETE /calculations/{calc_id}
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use pagination::PageRequest;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    Calculation, CalculationId, CalculationSummary, CalculationUpdate,
    CalculationValidationError, Error, NewCalculation, Operation, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::{DeletedResponse, PageQuery};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::calculation_validation_error;

/// Body of `POST /calculations/`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CalculationCreateRequest {
    /// Operation label, at most 20 characters.
    #[schema(example = "add")]
    pub operation: String,
    /// First operand.
    #[schema(example = 2.0)]
    pub operand_a: f64,
    /// Second operand.
    #[schema(example = 3.0)]
    pub operand_b: f64,
    /// Result computed by the caller; stored as given.
    #[schema(example = 5.0)]
    pub result: f64,
    /// Owning user.
    #[schema(example = 1)]
    pub user_id: i32,
}

impl TryFrom<CalculationCreateRequest> for NewCalculation {
    type Error = CalculationValidationError;

    fn try_from(value: CalculationCreateRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            operation: Operation::new(value.operation)?,
            operand_a: value.operand_a,
            operand_b: value.operand_b,
            result: value.result,
            user_id: UserId::new(value.user_id),
        })
    }
}

/// Body of `PATCH /calculations/{calc_id}`.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, ToSchema)]
pub struct CalculationUpdateRequest {
    /// Replacement result.
    #[schema(example = 6.0)]
    pub result: f64,
}

impl From<CalculationUpdateRequest> for CalculationUpdate {
    fn from(value: CalculationUpdateRequest) -> Self {
        Self {
            result: value.result,
        }
    }
}

/// Record a calculation for an existing user.
#[utoipa::path(
    post,
    path = "/calculations/",
    request_body = CalculationCreateRequest,
    responses(
        (status = 201, description = "Calculation recorded", body = Calculation),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "User not found", body = Error)
    ),
    tags = ["calculations"],
    operation_id = "createCalculation"
)]
#[post("/calculations/")]
pub async fn create_calculation(
    state: web::Data<HttpState>,
    payload: web::Json<CalculationCreateRequest>,
) -> ApiResult<HttpResponse> {
    let new_calc = NewCalculation::try_from(payload.into_inner())
        .map_err(|err| calculation_validation_error(&err))?;
    let calc = state.calculations.create(&new_calc).await?;
    Ok(HttpResponse::Created().json(calc))
}

/// List calculations.
#[utoipa::path(
    get,
    path = "/calculations/",
    params(PageQuery),
    responses(
        (status = 200, description = "Calculations in ascending id order", body = [Calculation]),
        (status = 400, description = "Invalid skip or limit", body = Error)
    ),
    tags = ["calculations"],
    operation_id = "listCalculations"
)]
#[get("/calculations/")]
pub async fn list_calculations(
    state: web::Data<HttpState>,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<Vec<Calculation>>> {
    let page = PageRequest::try_from(query.into_inner())?;
    Ok(web::Json(state.calculations.list(page).await?))
}

/// Calculations joined with their owners' usernames.
#[utoipa::path(
    get,
    path = "/calculations/join",
    responses(
        (status = 200, description = "Join view", body = [CalculationSummary])
    ),
    tags = ["calculations"],
    operation_id = "joinCalculations"
)]
#[get("/calculations/join")]
pub async fn join_calculations(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<CalculationSummary>>> {
    Ok(web::Json(state.calculations.list_with_usernames().await?))
}

/// Fetch one calculation.
#[utoipa::path(
    get,
    path = "/calculations/{calc_id}",
    params(("calc_id" = i32, Path, description = "Calculation identifier")),
    responses(
        (status = 200, description = "Calculation", body = Calculation),
        (status = 404, description = "Calculation not found", body = Error)
    ),
    tags = ["calculations"],
    operation_id = "getCalculation"
)]
#[get("/calculations/{calc_id}")]
pub async fn get_calculation(
    state: web::Data<HttpState>,
    path: web::Path<i32>,
) -> ApiResult<web::Json<Calculation>> {
    let id = CalculationId::new(path.into_inner());
    Ok(web::Json(state.calculations.get(id).await?))
}

/// Replace a calculation's result.
#[utoipa::path(
    patch,
    path = "/calculations/{calc_id}",
    params(("calc_id" = i32, Path, description = "Calculation identifier")),
    request_body = CalculationUpdateRequest,
    responses(
        (status = 200, description = "Updated calculation", body = Calculation),
        (status = 404, description = "Calculation not found", body = Error)
    ),
    tags = ["calculations"],
    operation_id = "updateCalculation"
)]
#[patch("/calculations/{calc_id}")]
pub async fn update_calculation(
    state: web::Data<HttpState>,
    path: web::Path<i32>,
    payload: web::Json<CalculationUpdateRequest>,
) -> ApiResult<web::Json<Calculation>> {
    let id = CalculationId::new(path.into_inner());
    let update = CalculationUpdate::from(payload.into_inner());
    Ok(web::Json(state.calculations.update_result(id, update).await?))
}

/// Delete a calculation.
#[utoipa::path(
    delete,
    path = "/calculations/{calc_id}",
    params(("calc_id" = i32, Path, description = "Calculation identifier")),
    responses(
        (status = 200, description = "Calculation deleted", body = DeletedResponse),
        (status = 404, description = "Calculation not found", body = Error)
    ),
    tags = ["calculations"],
    operation_id = "deleteCalculation"
)]
#[delete("/calculations/{calc_id}")]
pub async fn delete_calculation(
    state: web::Data<HttpState>,
    path: web::Path<i32>,
) -> ApiResult<web::Json<DeletedResponse>> {
    state
        .calculations
        .delete(CalculationId::new(path.into_inner()))
        .await?;
    Ok(web::Json(DeletedResponse::deleted()))
}
