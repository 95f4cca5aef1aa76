//! Postgres-backed stores.
//!
//! Queries are plain runtime SQL over a shared `PgPool`. Uniqueness lives in
//! the schema (`users.email`, the (job, candidate) pair on applications);
//! unique violations surface as [`StoreError::Conflict`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, QueryBuilder, Row};

use talentbridge_accounts::{RoleProfile, User};
use talentbridge_applications::{Application, ApplicationStatus};
use talentbridge_core::{ApplicationId, JobId, UserId};
use talentbridge_jobs::{Job, JobFilter, JobOrdering};

use super::{ApplicationStore, JobStore, StoreError, StoreHealth, UserStore};

const SCHEMA: &str = include_str!("schema.sql");

/// All store traits over one Postgres pool.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url).await.map_err(map_sqlx)?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply the idempotent schema bootstrap.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(())
    }
}

fn map_sqlx(err: sqlx::Error) -> StoreError {
    if let Some(db) = err.as_database_error() {
        if db.is_unique_violation() {
            let message = match db.constraint() {
                Some("applications_job_id_candidate_id_key") => {
                    "you have already applied to this job"
                }
                Some("users_email_key") => "email already registered",
                _ => "unique constraint violated",
            };
            return StoreError::Conflict(message.to_string());
        }
    }
    StoreError::Backend(err.to_string())
}

fn corrupt(what: &str) -> StoreError {
    StoreError::Backend(format!("corrupt row: bad {what}"))
}

fn user_from_row(row: &PgRow) -> Result<User, StoreError> {
    let profile: serde_json::Value = row.try_get("profile").map_err(map_sqlx)?;
    let profile: RoleProfile =
        serde_json::from_value(profile).map_err(|_| corrupt("profile"))?;

    Ok(User {
        id: UserId::from_uuid(row.try_get("id").map_err(map_sqlx)?),
        email: row.try_get("email").map_err(map_sqlx)?,
        display_name: row.try_get("display_name").map_err(map_sqlx)?,
        profile,
        created_at: row.try_get("created_at").map_err(map_sqlx)?,
    })
}

fn job_from_row(row: &PgRow) -> Result<Job, StoreError> {
    let job_type: String = row.try_get("job_type").map_err(map_sqlx)?;
    let remote_status: String = row.try_get("remote_status").map_err(map_sqlx)?;
    let experience_level: String = row.try_get("experience_level").map_err(map_sqlx)?;

    Ok(Job {
        id: JobId::from_uuid(row.try_get("id").map_err(map_sqlx)?),
        employer_id: UserId::from_uuid(row.try_get("employer_id").map_err(map_sqlx)?),
        title: row.try_get("title").map_err(map_sqlx)?,
        company_name: row.try_get("company_name").map_err(map_sqlx)?,
        description: row.try_get("description").map_err(map_sqlx)?,
        requirements: row.try_get("requirements").map_err(map_sqlx)?,
        location: row.try_get("location").map_err(map_sqlx)?,
        salary: row.try_get("salary").map_err(map_sqlx)?,
        salary_range: row.try_get("salary_range").map_err(map_sqlx)?,
        job_type: job_type.parse().map_err(|_| corrupt("job_type"))?,
        remote_status: remote_status.parse().map_err(|_| corrupt("remote_status"))?,
        experience_level: experience_level
            .parse()
            .map_err(|_| corrupt("experience_level"))?,
        is_active: row.try_get("is_active").map_err(map_sqlx)?,
        deadline: row.try_get("deadline").map_err(map_sqlx)?,
        created_at: row.try_get("created_at").map_err(map_sqlx)?,
        updated_at: row.try_get("updated_at").map_err(map_sqlx)?,
    })
}

fn application_from_row(row: &PgRow) -> Result<Application, StoreError> {
    let status: String = row.try_get("status").map_err(map_sqlx)?;

    Ok(Application {
        id: ApplicationId::from_uuid(row.try_get("id").map_err(map_sqlx)?),
        job_id: JobId::from_uuid(row.try_get("job_id").map_err(map_sqlx)?),
        candidate_id: UserId::from_uuid(row.try_get("candidate_id").map_err(map_sqlx)?),
        cover_letter: row.try_get("cover_letter").map_err(map_sqlx)?,
        resume_url: row.try_get("resume_url").map_err(map_sqlx)?,
        status: status
            .parse::<ApplicationStatus>()
            .map_err(|_| corrupt("status"))?,
        created_at: row.try_get("created_at").map_err(map_sqlx)?,
    })
}

/// Escape `%`, `_` and `\` so user input matches literally inside ILIKE.
fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[async_trait]
impl UserStore for PostgresStore {
    async fn insert(&self, user: User) -> Result<(), StoreError> {
        let profile =
            serde_json::to_value(&user.profile).map_err(|e| StoreError::Backend(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO users (id, email, display_name, role, profile, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.email)
        .bind(&user.display_name)
        .bind(user.role().as_str())
        .bind(profile)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(())
    }

    async fn get(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let row = sqlx::query("SELECT * FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn update(&self, user: &User) -> Result<(), StoreError> {
        let profile =
            serde_json::to_value(&user.profile).map_err(|e| StoreError::Backend(e.to_string()))?;

        let result = sqlx::query(
            r#"
            UPDATE users
            SET email = $2, display_name = $3, role = $4, profile = $5
            WHERE id = $1
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.email)
        .bind(&user.display_name)
        .bind(user.role().as_str())
        .bind(profile)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl JobStore for PostgresStore {
    async fn insert(&self, job: Job) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO jobs (
                id, employer_id, title, company_name, description, requirements,
                location, salary, salary_range, job_type, remote_status,
                experience_level, is_active, deadline, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(job.id.as_uuid())
        .bind(job.employer_id.as_uuid())
        .bind(&job.title)
        .bind(&job.company_name)
        .bind(&job.description)
        .bind(&job.requirements)
        .bind(&job.location)
        .bind(job.salary)
        .bind(&job.salary_range)
        .bind(job.job_type.as_str())
        .bind(job.remote_status.as_str())
        .bind(job.experience_level.as_str())
        .bind(job.is_active)
        .bind(job.deadline)
        .bind(job.created_at)
        .bind(job.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(())
    }

    async fn get(&self, id: JobId) -> Result<Option<Job>, StoreError> {
        let row = sqlx::query("SELECT * FROM jobs WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;

        row.as_ref().map(job_from_row).transpose()
    }

    async fn update(&self, job: &Job) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE jobs
            SET title = $2, company_name = $3, description = $4, requirements = $5,
                location = $6, salary = $7, salary_range = $8, job_type = $9,
                remote_status = $10, experience_level = $11, is_active = $12,
                deadline = $13, updated_at = $14
            WHERE id = $1
            "#,
        )
        .bind(job.id.as_uuid())
        .bind(&job.title)
        .bind(&job.company_name)
        .bind(&job.description)
        .bind(&job.requirements)
        .bind(&job.location)
        .bind(job.salary)
        .bind(&job.salary_range)
        .bind(job.job_type.as_str())
        .bind(job.remote_status.as_str())
        .bind(job.experience_level.as_str())
        .bind(job.is_active)
        .bind(job.deadline)
        .bind(job.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: JobId) -> Result<(), StoreError> {
        // applications and bookmarks cascade via their FKs
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list_active(
        &self,
        filter: &JobFilter,
        ordering: JobOrdering,
    ) -> Result<Vec<Job>, StoreError> {
        let mut qb: QueryBuilder<sqlx::Postgres> =
            QueryBuilder::new("SELECT * FROM jobs WHERE is_active = TRUE");

        if let Some(job_type) = filter.job_type {
            qb.push(" AND job_type = ").push_bind(job_type.as_str());
        }
        if let Some(remote_status) = filter.remote_status {
            qb.push(" AND remote_status = ")
                .push_bind(remote_status.as_str());
        }
        if let Some(level) = filter.experience_level {
            qb.push(" AND experience_level = ").push_bind(level.as_str());
        }
        if let Some(location) = &filter.location {
            qb.push(" AND location ILIKE ")
                .push_bind(like_pattern(location));
        }
        if let Some(min) = filter.min_salary {
            qb.push(" AND salary >= ").push_bind(min);
        }
        if let Some(max) = filter.max_salary {
            qb.push(" AND salary <= ").push_bind(max);
        }
        if let Some(search) = &filter.search {
            let pattern = like_pattern(search);
            qb.push(" AND (title ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR company_name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR description ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR requirements ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR location ILIKE ")
                .push_bind(pattern)
                .push(")");
        }

        qb.push(match ordering {
            JobOrdering::CreatedAtAsc => " ORDER BY created_at ASC",
            JobOrdering::CreatedAtDesc => " ORDER BY created_at DESC",
            JobOrdering::SalaryAsc => " ORDER BY salary ASC NULLS FIRST",
            JobOrdering::SalaryDesc => " ORDER BY salary DESC NULLS LAST",
        });

        let rows = qb
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)?;

        rows.iter().map(job_from_row).collect()
    }

    async fn list_by_employer(&self, employer_id: UserId) -> Result<Vec<Job>, StoreError> {
        let rows =
            sqlx::query("SELECT * FROM jobs WHERE employer_id = $1 ORDER BY created_at DESC")
                .bind(employer_id.as_uuid())
                .fetch_all(&self.pool)
                .await
                .map_err(map_sqlx)?;

        rows.iter().map(job_from_row).collect()
    }

    async fn deactivate_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE jobs
            SET is_active = FALSE, updated_at = $1
            WHERE is_active = TRUE AND deadline IS NOT NULL AND deadline < $1
            "#,
        )
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;

        Ok(result.rows_affected())
    }

    async fn toggle_bookmark(&self, job_id: JobId, user_id: UserId) -> Result<bool, StoreError> {
        let exists = sqlx::query("SELECT 1 FROM jobs WHERE id = $1")
            .bind(job_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;
        if exists.is_none() {
            return Err(StoreError::NotFound);
        }

        let inserted = sqlx::query(
            "INSERT INTO bookmarks (job_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(job_id.as_uuid())
        .bind(user_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;

        if inserted.rows_affected() == 1 {
            return Ok(true);
        }

        sqlx::query("DELETE FROM bookmarks WHERE job_id = $1 AND user_id = $2")
            .bind(job_id.as_uuid())
            .bind(user_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(false)
    }

    async fn bookmarked_jobs(&self, user_id: UserId) -> Result<Vec<Job>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT j.* FROM jobs j
            JOIN bookmarks b ON b.job_id = j.id
            WHERE b.user_id = $1
            ORDER BY j.created_at DESC
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx)?;

        rows.iter().map(job_from_row).collect()
    }
}

#[async_trait]
impl ApplicationStore for PostgresStore {
    async fn insert(&self, application: Application) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO applications (
                id, job_id, candidate_id, cover_letter, resume_url, status, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(application.id.as_uuid())
        .bind(application.job_id.as_uuid())
        .bind(application.candidate_id.as_uuid())
        .bind(&application.cover_letter)
        .bind(&application.resume_url)
        .bind(application.status.as_str())
        .bind(application.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(())
    }

    async fn get(&self, id: ApplicationId) -> Result<Option<Application>, StoreError> {
        let row = sqlx::query("SELECT * FROM applications WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;

        row.as_ref().map(application_from_row).transpose()
    }

    async fn update(&self, application: &Application) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE applications SET status = $2 WHERE id = $1")
            .bind(application.id.as_uuid())
            .bind(application.status.as_str())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list_for_job(&self, job_id: JobId) -> Result<Vec<Application>, StoreError> {
        let rows =
            sqlx::query("SELECT * FROM applications WHERE job_id = $1 ORDER BY created_at ASC")
                .bind(job_id.as_uuid())
                .fetch_all(&self.pool)
                .await
                .map_err(map_sqlx)?;

        rows.iter().map(application_from_row).collect()
    }

    async fn list_for_candidate(
        &self,
        candidate_id: UserId,
    ) -> Result<Vec<Application>, StoreError> {
        let rows = sqlx::query(
            "SELECT * FROM applications WHERE candidate_id = $1 ORDER BY created_at DESC",
        )
        .bind(candidate_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx)?;

        rows.iter().map(application_from_row).collect()
    }
}

#[async_trait]
impl StoreHealth for PostgresStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::like_pattern;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
        assert_eq!(like_pattern("berlin"), "%berlin%");
    }
}
