use axum::Router;

pub mod accounts;
pub mod applications;
pub mod jobs;
pub mod system;

/// Router for all resource endpoints.
pub fn router() -> Router {
    Router::new()
        .nest("/jobs", jobs::router().merge(applications::router()))
        .nest("/users", accounts::router())
}
