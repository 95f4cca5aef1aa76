use chrono::{DateTime, Utc};
use serde::Deserialize;

use talentbridge_accounts::User;
use talentbridge_applications::{Application, ApplicationStatus};
use talentbridge_jobs::{
    ExperienceLevel, Job, JobFilter, JobOrdering, JobType, RemoteStatus,
};

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateJobRequest {
    pub title: String,
    #[serde(default)]
    pub company_name: Option<String>,
    pub description: String,
    pub requirements: String,
    pub location: String,
    #[serde(default)]
    pub salary: Option<i64>,
    #[serde(default)]
    pub salary_range: Option<String>,
    #[serde(default)]
    pub job_type: JobType,
    #[serde(default)]
    pub remote_status: RemoteStatus,
    #[serde(default)]
    pub experience_level: ExperienceLevel,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateJobRequest {
    pub title: String,
    #[serde(default)]
    pub company_name: Option<String>,
    pub description: String,
    pub requirements: String,
    pub location: String,
    #[serde(default)]
    pub salary: Option<i64>,
    #[serde(default)]
    pub salary_range: Option<String>,
    #[serde(default)]
    pub job_type: JobType,
    #[serde(default)]
    pub remote_status: RemoteStatus,
    #[serde(default)]
    pub experience_level: ExperienceLevel,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct ApplyRequest {
    pub cover_letter: String,
    #[serde(default)]
    pub resume_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateApplicationRequest {
    pub status: ApplicationStatus,
}

/// Query string for the public listing: filter fields plus `ordering`.
#[derive(Debug, Default, Deserialize)]
pub struct JobListQuery {
    pub job_type: Option<JobType>,
    pub remote_status: Option<RemoteStatus>,
    pub experience_level: Option<ExperienceLevel>,
    pub location: Option<String>,
    pub min_salary: Option<i64>,
    pub max_salary: Option<i64>,
    pub search: Option<String>,
    pub ordering: Option<String>,
}

impl JobListQuery {
    pub fn into_parts(self) -> Result<(JobFilter, JobOrdering), axum::response::Response> {
        let ordering = match self.ordering.as_deref() {
            None => JobOrdering::default(),
            Some(raw) => raw
                .parse()
                .map_err(|e: talentbridge_core::DomainError| errors::domain_error_to_response(e))?,
        };

        let filter = JobFilter {
            job_type: self.job_type,
            remote_status: self.remote_status,
            experience_level: self.experience_level,
            location: self.location,
            min_salary: self.min_salary,
            max_salary: self.max_salary,
            search: self.search,
        };

        Ok((filter, ordering))
    }
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn job_to_json(job: &Job, now: DateTime<Utc>) -> serde_json::Value {
    serde_json::json!({
        "id": job.id.to_string(),
        "employer_id": job.employer_id.to_string(),
        "title": job.title,
        "company_name": job.company_name,
        "description": job.description,
        "requirements": job.requirements,
        "location": job.location,
        "salary": job.salary,
        "salary_range": job.salary_range,
        "job_type": job.job_type.as_str(),
        "remote_status": job.remote_status.as_str(),
        "experience_level": job.experience_level.as_str(),
        "is_active": job.is_active,
        "deadline": job.deadline.map(|d| d.to_rfc3339()),
        "days_ago": (now - job.created_at).num_days(),
        "created_at": job.created_at.to_rfc3339(),
        "updated_at": job.updated_at.to_rfc3339(),
    })
}

/// Compact job view embedded in a candidate's application list.
pub fn job_summary_to_json(job: &Job) -> serde_json::Value {
    serde_json::json!({
        "id": job.id.to_string(),
        "title": job.title,
        "company_name": job.company_name,
        "location": job.location,
        "job_type": job.job_type.as_str(),
        "remote_status": job.remote_status.as_str(),
    })
}

/// Employer-facing application view.
pub fn application_to_json(
    application: &Application,
    job_title: Option<&str>,
    candidate_email: Option<&str>,
) -> serde_json::Value {
    serde_json::json!({
        "id": application.id.to_string(),
        "job_id": application.job_id.to_string(),
        "job_title": job_title,
        "candidate_id": application.candidate_id.to_string(),
        "candidate_email": candidate_email,
        "cover_letter": application.cover_letter,
        "resume_url": application.resume_url,
        "status": application.status.as_str(),
        "created_at": application.created_at.to_rfc3339(),
    })
}

/// Candidate-facing application view with its job summary inline.
pub fn candidate_application_to_json(
    application: &Application,
    job: Option<&Job>,
) -> serde_json::Value {
    serde_json::json!({
        "id": application.id.to_string(),
        "job": job.map(job_summary_to_json),
        "cover_letter": application.cover_letter,
        "status": application.status.as_str(),
        "created_at": application.created_at.to_rfc3339(),
    })
}

pub fn user_to_json(user: &User) -> serde_json::Value {
    serde_json::json!({
        "id": user.id.to_string(),
        "email": user.email,
        "display_name": user.display_name,
        "role": user.role().as_str(),
        "profile": serde_json::to_value(&user.profile)
            .map(|v| v["profile"].clone())
            .unwrap_or(serde_json::Value::Null),
        "created_at": user.created_at.to_rfc3339(),
    })
}
