//! HTTP application wiring (axum router + service wiring).
//!
//! Layout:
//! - `services.rs`: infrastructure wiring (stores, task queue, mailer)
//! - `routes/`: HTTP routes + handlers (one file per resource area)
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs` and the
/// black-box tests).
pub fn build_app(services: Arc<AppServices>, jwt_secret: String) -> Router {
    let jwt = Arc::new(talentbridge_auth::Hs256JwtValidator::new(
        jwt_secret.into_bytes(),
    ));
    let auth_state = middleware::AuthState { jwt };

    // Resource routes run behind the bearer middleware; it leaves guests
    // anonymous, so public reads still pass through it.
    let api = routes::router()
        .layer(Extension(services.clone()))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .layer(Extension(services))
        .merge(api)
}
