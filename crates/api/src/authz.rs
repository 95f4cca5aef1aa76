//! Request-level authorization gates.
//!
//! Two composable predicates sit in front of every mutation: a role gate
//! (who may attempt the operation at all) and an ownership gate (who may
//! touch this particular job and its applications). Domain aggregates and
//! stores stay auth-agnostic.

use axum::http::StatusCode;
use axum::response::Response;

use talentbridge_jobs::Job;

use crate::app::errors;
use crate::context::{AuthContext, MaybeAuth};

/// The request must carry a verified identity.
pub fn require_auth(auth: &MaybeAuth) -> Result<&AuthContext, Response> {
    auth.0.as_ref().ok_or_else(|| {
        errors::json_error(
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            "authentication required",
        )
    })
}

/// The request must come from an employer account.
pub fn require_employer(auth: &MaybeAuth) -> Result<&AuthContext, Response> {
    let ctx = require_auth(auth)?;
    if !ctx.role.is_employer() {
        return Err(errors::json_error(
            StatusCode::FORBIDDEN,
            "forbidden",
            "only employers may perform this action",
        ));
    }
    Ok(ctx)
}

/// The request must come from a candidate account.
pub fn require_candidate(auth: &MaybeAuth) -> Result<&AuthContext, Response> {
    let ctx = require_auth(auth)?;
    if !ctx.role.is_candidate() {
        return Err(errors::json_error(
            StatusCode::FORBIDDEN,
            "forbidden",
            "only candidates may perform this action",
        ));
    }
    Ok(ctx)
}

/// Object-level gate: the acting identity must own the job.
///
/// A mismatch is an authorization failure (403), not a not-found: job
/// details are public, so hiding existence would buy nothing.
pub fn require_job_owner(job: &Job, ctx: &AuthContext) -> Result<(), Response> {
    job.ensure_owned_by(ctx.user_id).map_err(|_| {
        errors::json_error(
            StatusCode::FORBIDDEN,
            "forbidden",
            "you do not own this job",
        )
    })
}
