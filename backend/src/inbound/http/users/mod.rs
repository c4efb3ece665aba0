//! User handlers.
//!
//! ```text
//! POST   /users/              {"username":"carol","email":"carol@example.com"}
//! GET    /users/?skip=0&limit=100
//! GET    /users/{user_id}
//! PATCH  /users/{user_id}     {"email":"carol@newdomain.com"}
//! DELETE /users/{user_id}
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use pagination::PageRequest;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    EmailAddress, Error, NewUser, User, UserId, UserUpdate, UserValidationError, Username,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::{DeletedResponse, PageQuery};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::user_validation_error;

/// Body of `POST /users/`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct UserCreateRequest {
    /// Unique username, at most 50 characters.
    #[schema(example = "carol")]
    pub username: String,
    /// Unique email address, at most 100 characters.
    #[schema(example = "carol@example.com")]
    pub email: String,
}

impl TryFrom<UserCreateRequest> for NewUser {
    type Error = UserValidationError;

    fn try_from(value: UserCreateRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(value.username, value.email)
    }
}

/// Body of `PATCH /users/{user_id}`; omitted fields stay unchanged.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct UserUpdateRequest {
    /// Replacement username.
    #[schema(example = "carol")]
    pub username: Option<String>,
    /// Replacement email address.
    #[schema(example = "carol@newdomain.com")]
    pub email: Option<String>,
}

impl TryFrom<UserUpdateRequest> for UserUpdate {
    type Error = UserValidationError;

    fn try_from(value: UserUpdateRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            username: value.username.map(Username::new).transpose()?,
            email: value.email.map(EmailAddress::new).transpose()?,
        })
    }
}

/// Register a user.
#[utoipa::path(
    post,
    path = "/users/",
    request_body = UserCreateRequest,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Invalid request or duplicate username/email", body = Error),
        (status = 503, description = "Database unavailable", body = Error)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/users/")]
pub async fn create_user(
    state: web::Data<HttpState>,
    payload: web::Json<UserCreateRequest>,
) -> ApiResult<HttpResponse> {
    let new_user =
        NewUser::try_from(payload.into_inner()).map_err(|err| user_validation_error(&err))?;
    let user = state.users.create(&new_user).await?;
    Ok(HttpResponse::Created().json(user))
}

/// List users with their calculations.
#[utoipa::path(
    get,
    path = "/users/",
    params(PageQuery),
    responses(
        (status = 200, description = "Users in ascending id order", body = [User]),
        (status = 400, description = "Invalid skip or limit", body = Error)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users/")]
pub async fn list_users(
    state: web::Data<HttpState>,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<Vec<User>>> {
    let page = PageRequest::try_from(query.into_inner())?;
    Ok(web::Json(state.users.list(page).await?))
}

/// Fetch one user with its calculations.
#[utoipa::path(
    get,
    path = "/users/{user_id}",
    params(("user_id" = i32, Path, description = "User identifier")),
    responses(
        (status = 200, description = "User", body = User),
        (status = 404, description = "User not found", body = Error)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{user_id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    path: web::Path<i32>,
) -> ApiResult<web::Json<User>> {
    let id = UserId::new(path.into_inner());
    Ok(web::Json(state.users.get(id).await?))
}

/// Partially update a user.
#[utoipa::path(
    patch,
    path = "/users/{user_id}",
    params(("user_id" = i32, Path, description = "User identifier")),
    request_body = UserUpdateRequest,
    responses(
        (status = 200, description = "Updated user", body = User),
        (status = 400, description = "Invalid request or duplicate username/email", body = Error),
        (status = 404, description = "User not found", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[patch("/users/{user_id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    path: web::Path<i32>,
    payload: web::Json<UserUpdateRequest>,
) -> ApiResult<web::Json<User>> {
    let id = UserId::new(path.into_inner());
    let update =
        UserUpdate::try_from(payload.into_inner()).map_err(|err| user_validation_error(&err))?;
    Ok(web::Json(state.users.update(id, &update).await?))
}

/// Delete a user and its calculations.
#[utoipa::path(
    delete,
    path = "/users/{user_id}",
    params(("user_id" = i32, Path, description = "User identifier")),
    responses(
        (status = 200, description = "User deleted", body = DeletedResponse),
        (status = 404, description = "User not found", body = Error)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/users/{user_id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    path: web::Path<i32>,
) -> ApiResult<web::Json<DeletedResponse>> {
    state.users.delete(UserId::new(path.into_inner())).await?;
    Ok(web::Json(DeletedResponse::deleted()))
}
