//! Shared helpers for the HTTP behaviour suites.
//!
//! Integration tests compile as separate crates under `backend/tests/`; this
//! module gives them one way to stand up the API over the in-memory store and
//! drive it with JSON requests.

use std::sync::Arc;

use actix_http::Request;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{Method, StatusCode, header};
use actix_web::{App, test as actix_test, web};
use calc_api::RequestTrace;
use calc_api::inbound::http::configure_api;
use calc_api::inbound::http::health::{HealthState, health, live, ready};
use calc_api::inbound::http::state::HttpState;
use calc_api::middleware::trace::TRACE_ID_HEADER;
use calc_api::test_support::InMemoryStore;
use serde_json::Value;

/// Response captured from the app under test.
#[derive(Debug)]
pub struct Captured {
    /// Response status.
    pub status: StatusCode,
    /// Value of the `trace-id` header.
    pub trace_id: Option<String>,
    /// Value of the `Location` header.
    pub location: Option<String>,
    /// JSON body, or `Null` when the body is empty or not JSON.
    pub body: Value,
}

impl Captured {
    /// String at a JSON pointer in the body.
    pub fn str_at(&self, pointer: &str) -> Option<&str> {
        self.body.pointer(pointer).and_then(Value::as_str)
    }

    /// Number at a JSON pointer in the body.
    pub fn f64_at(&self, pointer: &str) -> Option<f64> {
        self.body.pointer(pointer).and_then(Value::as_f64)
    }

    /// Integer at a JSON pointer in the body.
    pub fn i64_at(&self, pointer: &str) -> Option<i64> {
        self.body.pointer(pointer).and_then(Value::as_i64)
    }

    /// Body as an array; empty when it is not one.
    pub fn items(&self) -> &[Value] {
        self.body.as_array().map_or(&[], Vec::as_slice)
    }
}

/// Build the application the server runs, minus Swagger UI, over `store`.
pub async fn init_app(
    store: Arc<InMemoryStore>,
) -> impl Service<Request, Response = ServiceResponse, Error = actix_web::Error> {
    let health_state = web::Data::new(HealthState::new());
    health_state.mark_ready();
    let http_state = web::Data::new(HttpState::new(store.clone(), store));
    actix_test::init_service(
        App::new()
            .app_data(health_state)
            .app_data(http_state)
            .wrap(RequestTrace)
            .configure(configure_api)
            .service(health)
            .service(ready)
            .service(live),
    )
    .await
}

/// Send a request with an optional JSON body and capture the response.
pub async fn send(
    app: &impl Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
    method: Method,
    path: &str,
    payload: Option<Value>,
) -> Captured {
    let mut request = actix_test::TestRequest::default().method(method).uri(path);
    if let Some(payload) = payload {
        request = request.set_json(payload);
    }
    let response = actix_test::call_service(app, request.to_request()).await;
    let status = response.status();
    let header_value = |name: &str| {
        response
            .headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
    };
    let trace_id = header_value(TRACE_ID_HEADER);
    let location = header_value(header::LOCATION.as_str());
    let bytes = actix_test::read_body(response).await;
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    Captured {
        status,
        trace_id,
        location,
        body,
    }
}
