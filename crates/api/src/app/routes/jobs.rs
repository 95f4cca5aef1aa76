use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;

use talentbridge_core::JobId;
use talentbridge_jobs::{Job, JobUpdate, NewJob};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz;
use crate::context::MaybeAuth;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_jobs).post(create_job))
        .route("/my-jobs", get(my_jobs))
        .route("/bookmarks", get(bookmarked_jobs))
        .route("/:id", get(get_job).put(update_job).delete(delete_job))
        .route("/:id/bookmark", post(toggle_bookmark))
}

pub async fn list_jobs(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::JobListQuery>,
) -> axum::response::Response {
    let (filter, ordering) = match query.into_parts() {
        Ok(parts) => parts,
        Err(resp) => return resp,
    };

    let jobs = match services.jobs.list_active(&filter, ordering).await {
        Ok(jobs) => jobs,
        Err(e) => return errors::store_error_to_response(e),
    };

    let now = Utc::now();
    let items: Vec<_> = jobs.iter().map(|j| dto::job_to_json(j, now)).collect();
    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}

pub async fn create_job(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<MaybeAuth>,
    Json(body): Json<dto::CreateJobRequest>,
) -> axum::response::Response {
    let ctx = match authz::require_employer(&auth) {
        Ok(ctx) => ctx,
        Err(resp) => return resp,
    };

    // Blank company name auto-fills from the employer profile.
    let fallback_company = match services.users.get(ctx.user_id).await {
        Ok(user) => user.and_then(|u| u.company_name().map(str::to_string)),
        Err(e) => return errors::store_error_to_response(e),
    };

    let job = match Job::post(
        NewJob {
            employer_id: ctx.user_id,
            title: body.title,
            company_name: body.company_name,
            description: body.description,
            requirements: body.requirements,
            location: body.location,
            salary: body.salary,
            salary_range: body.salary_range,
            job_type: body.job_type,
            remote_status: body.remote_status,
            experience_level: body.experience_level,
            deadline: body.deadline,
        },
        fallback_company.as_deref(),
        Utc::now(),
    ) {
        Ok(job) => job,
        Err(e) => return errors::domain_error_to_response(e),
    };

    if let Err(e) = services.jobs.insert(job.clone()).await {
        return errors::store_error_to_response(e);
    }

    (StatusCode::CREATED, Json(dto::job_to_json(&job, Utc::now()))).into_response()
}

pub async fn get_job(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: JobId = match id.parse() {
        Ok(id) => id,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid job id"),
    };

    match services.jobs.get(id).await {
        Ok(Some(job)) => (StatusCode::OK, Json(dto::job_to_json(&job, Utc::now()))).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "job not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_job(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<MaybeAuth>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateJobRequest>,
) -> axum::response::Response {
    let ctx = match authz::require_auth(&auth) {
        Ok(ctx) => ctx,
        Err(resp) => return resp,
    };
    let id: JobId = match id.parse() {
        Ok(id) => id,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid job id"),
    };

    let mut job = match services.jobs.get(id).await {
        Ok(Some(job)) => job,
        Ok(None) => return errors::json_error(StatusCode::NOT_FOUND, "not_found", "job not found"),
        Err(e) => return errors::store_error_to_response(e),
    };

    if let Err(resp) = authz::require_job_owner(&job, ctx) {
        return resp;
    }

    let update = JobUpdate {
        title: body.title,
        company_name: body.company_name,
        description: body.description,
        requirements: body.requirements,
        location: body.location,
        salary: body.salary,
        salary_range: body.salary_range,
        job_type: body.job_type,
        remote_status: body.remote_status,
        experience_level: body.experience_level,
        is_active: body.is_active,
        deadline: body.deadline,
    };
    if let Err(e) = job.apply_update(update, Utc::now()) {
        return errors::domain_error_to_response(e);
    }

    if let Err(e) = services.jobs.update(&job).await {
        return errors::store_error_to_response(e);
    }

    (StatusCode::OK, Json(dto::job_to_json(&job, Utc::now()))).into_response()
}

pub async fn delete_job(
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

    if let Err(e) = services.jobs.delete(id).await {
        return errors::store_error_to_response(e);
    }

    StatusCode::NO_CONTENT.into_response()
}

pub async fn my_jobs(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<MaybeAuth>,
) -> axum::response::Response {
    let ctx = match authz::require_employer(&auth) {
        Ok(ctx) => ctx,
        Err(resp) => return resp,
    };

    let jobs = match services.jobs.list_by_employer(ctx.user_id).await {
        Ok(jobs) => jobs,
        Err(e) => return errors::store_error_to_response(e),
    };

    let now = Utc::now();
    let items: Vec<_> = jobs.iter().map(|j| dto::job_to_json(j, now)).collect();
    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}

pub async fn toggle_bookmark(
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

    match services.jobs.toggle_bookmark(id, ctx.user_id).await {
        Ok(bookmarked) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "job_id": id.to_string(),
                "bookmarked": bookmarked,
            })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn bookmarked_jobs(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<MaybeAuth>,
) -> axum::response::Response {
    let ctx = match authz::require_auth(&auth) {
        Ok(ctx) => ctx,
        Err(resp) => return resp,
    };

    let jobs = match services.jobs.bookmarked_jobs(ctx.user_id).await {
        Ok(jobs) => jobs,
        Err(e) => return errors::store_error_to_response(e),
    };

    let now = Utc::now();
    let items: Vec<_> = jobs.iter().map(|j| dto::job_to_json(j, now)).collect();
    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}
