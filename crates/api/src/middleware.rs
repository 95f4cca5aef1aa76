use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use talentbridge_auth::JwtValidator;

use crate::context::{AuthContext, MaybeAuth};

#[derive(Clone)]
pub struct AuthState {
    pub jwt: Arc<dyn JwtValidator>,
}

/// Bearer authentication.
///
/// No `Authorization` header leaves the request anonymous (the catalog is
/// publicly readable); a header that is present but unusable is rejected
/// outright with 401.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    match bearer_token(req.headers())? {
        None => {
            req.extensions_mut().insert(MaybeAuth::default());
        }
        Some(token) => {
            let claims = state
                .jwt
                .validate(token, Utc::now())
                .map_err(|_e| StatusCode::UNAUTHORIZED)?;

            req.extensions_mut().insert(MaybeAuth(Some(AuthContext {
                user_id: claims.sub,
                email: claims.email,
                role: claims.role,
            })));
        }
    }

    Ok(next.run(req).await)
}

fn bearer_token(headers: &HeaderMap) -> Result<Option<&str>, StatusCode> {
    let Some(header) = headers.get(axum::http::header::AUTHORIZATION) else {
        return Ok(None);
    };

    let header = header.to_str().map_err(|_| StatusCode::UNAUTHORIZED)?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?
        .trim();

    if token.is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(Some(token))
}
