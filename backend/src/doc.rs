//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] collects every HTTP handler in the inbound layer together with
//! the request, response and error schemas they reference. Swagger UI serves
//! the document at `/docs` in debug builds.

use utoipa::OpenApi;

use crate::domain::{Calculation, CalculationSummary, Error, ErrorCode, User};
use crate::inbound::http::calculations::{CalculationCreateRequest, CalculationUpdateRequest};
use crate::inbound::http::dto::DeletedResponse;
use crate::inbound::http::health::HealthStatus;
use crate::inbound::http::users::{UserCreateRequest, UserUpdateRequest};

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Calculations API",
        description = "Users and the calculations they record.",
        license(name = "MIT")
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::calculations::create_calculation,
        crate::inbound::http::calculations::list_calculations,
        crate::inbound::http::calculations::join_calculations,
        crate::inbound::http::calculations::get_calculation,
        crate::inbound::http::calculations::update_calculation,
        crate::inbound::http::calculations::delete_calculation,
        crate::inbound::http::health::health,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        User,
        Calculation,
        CalculationSummary,
        UserCreateRequest,
        UserUpdateRequest,
        CalculationCreateRequest,
        CalculationUpdateRequest,
        DeletedResponse,
        HealthStatus,
        Error,
        ErrorCode
    )),
    tags(
        (name = "users", description = "User registration and maintenance"),
        (name = "calculations", description = "Calculations recorded by users"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying the assembled OpenAPI document.

    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn assert_object_schema_has_fields(name: &str, fields: &[&str]) {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let schema = schemas
            .get(name)
            .unwrap_or_else(|| panic!("{name} schema"));
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                for field in fields {
                    assert!(
                        obj.properties.contains_key(*field),
                        "{name} should have field '{field}'"
                    );
                }
            }
            _ => panic!("expected Object schema for {name}"),
        }
    }

    #[rstest]
    #[case("Error", &["code", "message", "trace_id", "details"])]
    #[case("User", &["id", "username", "email", "created_at", "calculations"])]
    #[case(
        "Calculation",
        &["id", "operation", "operand_a", "operand_b", "result", "timestamp", "user_id"]
    )]
    #[case(
        "CalculationSummary",
        &["username", "operation", "operand_a", "operand_b", "result"]
    )]
    fn schemas_expose_wire_fields(#[case] name: &str, #[case] fields: &[&str]) {
        assert_object_schema_has_fields(name, fields);
    }

    #[rstest]
    #[case("/users/")]
    #[case("/users/{user_id}")]
    #[case("/calculations/")]
    #[case("/calculations/join")]
    #[case("/calculations/{calc_id}")]
    #[case("/health")]
    fn every_route_is_documented(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }
}
