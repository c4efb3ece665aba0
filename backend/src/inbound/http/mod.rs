//! HTTP inbound adapter exposing the REST endpoints.

pub mod calculations;
pub mod dto;
pub mod error;
pub mod health;
pub mod state;
pub mod users;
pub mod validation;

use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, web};

pub use error::ApiResult;

/// Register extractor settings and every user and calculation route.
///
/// `/calculations/join` is registered ahead of `/calculations/{calc_id}` so
/// the literal segment wins. `/users` and `/calculations` without the trailing
/// slash redirect to the collection routes.
///
/// # Examples
/// ```
/// use std::sync::Arc;
///
/// use actix_web::{App, web};
/// use calc_api::inbound::http::{configure_api, state::HttpState};
/// use calc_api::test_support::InMemoryStore;
///
/// let store = Arc::new(InMemoryStore::default());
/// let state = web::Data::new(HttpState::new(store.clone(), store));
/// let _app = App::new().app_data(state).configure(configure_api);
/// ```
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.app_data(validation::json_config())
        .app_data(validation::query_config())
        .app_data(validation::path_config())
        .service(users::create_user)
        .service(users::list_users)
        .service(users::get_user)
        .service(users::update_user)
        .service(users::delete_user)
        .service(calculations::create_calculation)
        .service(calculations::list_calculations)
        .service(calculations::join_calculations)
        .service(calculations::get_calculation)
        .service(calculations::update_calculation)
        .service(calculations::delete_calculation)
        .service(web::resource(["/users", "/calculations"]).to(append_trailing_slash));
}

/// 307 to the same path with a trailing slash, keeping the query string.
/// Clients replay the method and body against the new location.
async fn append_trailing_slash(req: HttpRequest) -> HttpResponse {
    let location = match req.query_string() {
        "" => format!("{}/", req.path()),
        query => format!("{}/?{query}", req.path()),
    };
    HttpResponse::TemporaryRedirect()
        .insert_header((header::LOCATION, location))
        .finish()
}
