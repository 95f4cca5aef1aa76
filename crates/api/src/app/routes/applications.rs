use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
};
use chrono::Utc;
use tracing::warn;

use talentbridge_applications::Application;
use talentbridge_core::{ApplicationId, JobId};
use talentbridge_infra::notify;
use talentbridge_infra::tasks::ApplicationNotice;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz;
use crate::context::MaybeAuth;

pub fn router() -> Router {
    Router::new()
        .route("/:id/apply", post(apply))
        .route("/:id/applications", get(job_applications))
        .route("/applications/me", get(my_applications))
        .route("/applications/:id", patch(update_application))
}

pub async fn apply(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<MaybeAuth>,
    Path(id): Path<String>,
    Json(body): Json<dto::ApplyRequest>,
) -> axum::response::Response {
    let ctx = match authz::require_candidate(&auth) {
        Ok(ctx) => ctx,
        Err(resp) => return resp,
    };
    let id: JobId = match id.parse() {
        Ok(id) => id,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid job id"),
    };

    let job = match services.jobs.get(id).await {
        Ok(Some(job)) => job,
        Ok(None) => return errors::json_error(StatusCode::NOT_FOUND, "not_found", "job not found"),
        Err(e) => return errors::store_error_to_response(e),
    };

    let application = match Application::submit(
        &job,
        ctx.user_id,
        &body.cover_letter,
        body.resume_url,
        Utc::now(),
    ) {
        Ok(application) => application,
        Err(e) => return errors::domain_error_to_response(e),
    };

    // The unique (job, candidate) constraint inside the store is the only
    // duplicate check; a second apply surfaces here as a conflict.
    if let Err(e) = services.applications.insert(application.clone()).await {
        return errors::store_error_to_response(e);
    }

    // The application is committed; from here on, nothing may fail the
    // request. Notification delivery is best-effort and fully decoupled.
    match services.users.get(job.employer_id).await {
        Ok(Some(employer)) => notify::enqueue_application_notice(
            services.notifications.as_ref(),
            ApplicationNotice {
                employer_email: employer.email,
                job_title: job.title.clone(),
                candidate_email: ctx.email.clone(),
            },
        ),
        Ok(None) => warn!(
            employer_id = %job.employer_id,
            "employer account not provisioned; skipping application notification"
        ),
        Err(error) => warn!(%error, "employer lookup failed; skipping application notification"),
    }

    (
        StatusCode::CREATED,
        Json(dto::application_to_json(
            &application,
            Some(&job.title),
            Some(&ctx.email),
        )),
    )
        .into_response()
}

pub async fn job_applications(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<MaybeAuth>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let ctx = match authz::require_auth(&auth) {
        Ok(ctx) => ctx,
        Err(resp) => return resp,
    };
    let id: JobId = match id.parse() {
        Ok(id) => id,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid job id"),
    };

    let job = match services.jobs.get(id).await {
        Ok(Some(job)) => job,
        Ok(None) => return errors::json_error(StatusCode::NOT_FOUND, "not_found", "job not found"),
        Err(e) => return errors::store_error_to_response(e),
    };

    if let Err(resp) = authz::require_job_owner(&job, ctx) {
        return resp;
    }

    let applications = match services.applications.list_for_job(id).await {
        Ok(applications) => applications,
        Err(e) => return errors::store_error_to_response(e),
    };

    let mut items = Vec::with_capacity(applications.len());
    for application in &applications {
        let candidate_email = match services.users.get(application.candidate_id).await {
            Ok(user) => user.map(|u| u.email),
            Err(e) => return errors::store_error_to_response(e),
        };
        items.push(dto::application_to_json(
            application,
            Some(&job.title),
            candidate_email.as_deref(),
        ));
    }

    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}

pub async fn update_application(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<MaybeAuth>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateApplicationRequest>,
) -> axum::response::Response {
    let ctx = match authz::require_auth(&auth) {
        Ok(ctx) => ctx,
        Err(resp) => return resp,
    };
    let id: ApplicationId = match id.parse() {
        Ok(id) => id,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid application id");
        }
    };

    let mut application = match services.applications.get(id).await {
        Ok(Some(application)) => application,
        Ok(None) => {
            return errors::json_error(StatusCode::NOT_FOUND, "not_found", "application not found");
        }
        Err(e) => return errors::store_error_to_response(e),
    };

    let job = match services.jobs.get(application.job_id).await {
        Ok(Some(job)) => job,
        Ok(None) => return errors::json_error(StatusCode::NOT_FOUND, "not_found", "job not found"),
        Err(e) => return errors::store_error_to_response(e),
    };

    if let Err(resp) = authz::require_job_owner(&job, ctx) {
        return resp;
    }

    if let Err(e) = application.transition(body.status) {
        return errors::domain_error_to_response(e);
    }

    if let Err(e) = services.applications.update(&application).await {
        return errors::store_error_to_response(e);
    }

    (
        StatusCode::OK,
        Json(dto::application_to_json(&application, Some(&job.title), None)),
    )
        .into_response()
}

pub async fn my_applications(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<MaybeAuth>,
) -> axum::response::Response {
    let ctx = match authz::require_candidate(&auth) {
        Ok(ctx) => ctx,
        Err(resp) => return resp,
    };

    let applications = match services.applications.list_for_candidate(ctx.user_id).await {
        Ok(applications) => applications,
        Err(e) => return errors::store_error_to_response(e),
    };

    let mut items = Vec::with_capacity(applications.len());
    for application in &applications {
        let job = match services.jobs.get(application.job_id).await {
            Ok(job) => job,
            Err(e) => return errors::store_error_to_response(e),
        };
        items.push(dto::candidate_application_to_json(application, job.as_ref()));
    }

    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}
