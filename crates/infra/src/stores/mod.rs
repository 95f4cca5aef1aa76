//! Store traits and their implementations.
//!
//! The stores are the only place uniqueness is enforced: duplicate detection
//! happens inside the store (single write lock in memory, unique constraints
//! in Postgres), never as a check-then-insert in request code.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use talentbridge_accounts::User;
use talentbridge_applications::Application;
use talentbridge_core::{ApplicationId, JobId, UserId};
use talentbridge_jobs::{Job, JobFilter, JobOrdering};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PostgresStore;

/// Store-level error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("not found")]
    NotFound,

    /// A uniqueness constraint rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("storage error: {0}")]
    Backend(String),
}

/// Account storage.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new account. `Conflict` when the id or email is taken.
    async fn insert(&self, user: User) -> Result<(), StoreError>;

    async fn get(&self, id: UserId) -> Result<Option<User>, StoreError>;

    /// Persist profile changes. `NotFound` when the account does not exist.
    async fn update(&self, user: &User) -> Result<(), StoreError>;
}

/// Job catalog storage, bookmarks included.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn insert(&self, job: Job) -> Result<(), StoreError>;

    async fn get(&self, id: JobId) -> Result<Option<Job>, StoreError>;

    async fn update(&self, job: &Job) -> Result<(), StoreError>;

    /// Delete a posting; its applications and bookmarks go with it.
    async fn delete(&self, id: JobId) -> Result<(), StoreError>;

    /// Active postings matching `filter`, sorted by `ordering`.
    async fn list_active(
        &self,
        filter: &JobFilter,
        ordering: JobOrdering,
    ) -> Result<Vec<Job>, StoreError>;

    /// All of an employer's postings, active and inactive, newest first.
    async fn list_by_employer(&self, employer_id: UserId) -> Result<Vec<Job>, StoreError>;

    /// Bulk-close every active posting whose deadline is strictly in the
    /// past. Returns the number of rows touched; a rerun with no newly
    /// expired postings reports zero.
    async fn deactivate_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError>;

    /// Flip a bookmark and report the resulting state (`true` = bookmarked).
    async fn toggle_bookmark(&self, job_id: JobId, user_id: UserId) -> Result<bool, StoreError>;

    async fn bookmarked_jobs(&self, user_id: UserId) -> Result<Vec<Job>, StoreError>;
}

/// Application pipeline storage.
#[async_trait]
pub trait ApplicationStore: Send + Sync {
    /// Insert a new application. `Conflict` when the (job, candidate) pair
    /// already exists; this is the sole duplicate-application detector.
    async fn insert(&self, application: Application) -> Result<(), StoreError>;

    async fn get(&self, id: ApplicationId) -> Result<Option<Application>, StoreError>;

    async fn update(&self, application: &Application) -> Result<(), StoreError>;

    /// Applications for a job, in submission order.
    async fn list_for_job(&self, job_id: JobId) -> Result<Vec<Application>, StoreError>;

    /// A candidate's own applications, newest first.
    async fn list_for_candidate(&self, candidate_id: UserId) -> Result<Vec<Application>, StoreError>;
}

/// Liveness probe against the primary store, for the health endpoint.
#[async_trait]
pub trait StoreHealth: Send + Sync {
    async fn ping(&self) -> Result<(), StoreError>;
}
