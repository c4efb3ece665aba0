//! Calculations ledger backend: users, the calculations they record, and the
//! HTTP and PostgreSQL adapters around them.

pub mod config;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
/// Request tracing middleware wrapping every route.
pub use middleware::RequestTrace;
