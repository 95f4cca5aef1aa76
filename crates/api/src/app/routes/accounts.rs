use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::Utc;

use talentbridge_accounts::{CandidateProfile, EmployerProfile, RoleProfile, User};
use talentbridge_infra::stores::StoreError;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz;
use crate::context::{AuthContext, MaybeAuth};

pub fn router() -> Router {
    Router::new()
        .route("/me", get(me))
        .route(
            "/me/employer-profile",
            get(get_employer_profile).put(put_employer_profile),
        )
        .route(
            "/me/candidate-profile",
            get(get_candidate_profile).put(put_candidate_profile),
        )
}

/// Fetch the caller's account row, provisioning it from the verified claims
/// on first touch. Registration itself happens upstream; this is the
/// get-or-create step behind the profile endpoints.
async fn get_or_create_user(
    services: &AppServices,
    ctx: &AuthContext,
) -> Result<User, axum::response::Response> {
    match services.users.get(ctx.user_id).await {
        Ok(Some(user)) => return Ok(user),
        Ok(None) => {}
        Err(e) => return Err(errors::store_error_to_response(e)),
    }

    let user = User::register(
        ctx.user_id,
        &ctx.email,
        "",
        RoleProfile::empty_for(ctx.role),
        Utc::now(),
    )
    .map_err(errors::domain_error_to_response)?;

    match services.users.insert(user.clone()).await {
        Ok(()) => Ok(user),
        // a concurrent request provisioned the row first; use theirs
        Err(StoreError::Conflict(_)) => match services.users.get(ctx.user_id).await {
            Ok(Some(user)) => Ok(user),
            Ok(None) => Err(errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "store_error",
                "account provisioning raced",
            )),
            Err(e) => Err(errors::store_error_to_response(e)),
        },
        Err(e) => Err(errors::store_error_to_response(e)),
    }
}

pub async fn me(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<MaybeAuth>,
) -> axum::response::Response {
    let ctx = match authz::require_auth(&auth) {
        Ok(ctx) => ctx,
        Err(resp) => return resp,
    };

    match services.users.get(ctx.user_id).await {
        Ok(Some(user)) => (StatusCode::OK, Json(dto::user_to_json(&user))).into_response(),
        // identity is valid even before any profile write created a row
        Ok(None) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "id": ctx.user_id.to_string(),
                "email": ctx.email,
                "role": ctx.role.as_str(),
                "display_name": serde_json::Value::Null,
                "profile": serde_json::Value::Null,
            })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_employer_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<MaybeAuth>,
) -> axum::response::Response {
    let ctx = match authz::require_employer(&auth) {
        Ok(ctx) => ctx,
        Err(resp) => return resp,
    };

    match get_or_create_user(&services, ctx).await {
        Ok(user) => profile_response(&user),
        Err(resp) => resp,
    }
}

pub async fn put_employer_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<MaybeAuth>,
    Json(body): Json<EmployerProfile>,
) -> axum::response::Response {
    let ctx = match authz::require_employer(&auth) {
        Ok(ctx) => ctx,
        Err(resp) => return resp,
    };

    let mut user = match get_or_create_user(&services, ctx).await {
        Ok(user) => user,
        Err(resp) => return resp,
    };

    if let Err(e) = user.set_employer_profile(body) {
        return errors::domain_error_to_response(e);
    }
    if let Err(e) = services.users.update(&user).await {
        return errors::store_error_to_response(e);
    }

    profile_response(&user)
}

pub async fn get_candidate_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<MaybeAuth>,
) -> axum::response::Response {
    let ctx = match authz::require_candidate(&auth) {
        Ok(ctx) => ctx,
        Err(resp) => return resp,
    };

    match get_or_create_user(&services, ctx).await {
        Ok(user) => profile_response(&user),
        Err(resp) => resp,
    }
}

pub async fn put_candidate_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<MaybeAuth>,
    Json(body): Json<CandidateProfile>,
) -> axum::response::Response {
    let ctx = match authz::require_candidate(&auth) {
        Ok(ctx) => ctx,
        Err(resp) => return resp,
    };

    let mut user = match get_or_create_user(&services, ctx).await {
        Ok(user) => user,
        Err(resp) => return resp,
    };

    if let Err(e) = user.set_candidate_profile(body) {
        return errors::domain_error_to_response(e);
    }
    if let Err(e) = services.users.update(&user).await {
        return errors::store_error_to_response(e);
    }

    profile_response(&user)
}

fn profile_response(user: &User) -> axum::response::Response {
    let profile = serde_json::to_value(&user.profile)
        .map(|v| v["profile"].clone())
        .unwrap_or(serde_json::Value::Null);
    (StatusCode::OK, Json(profile)).into_response()
}
