//! In-memory store for dev and tests.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use talentbridge_accounts::User;
use talentbridge_applications::Application;
use talentbridge_core::{ApplicationId, JobId, UserId};
use talentbridge_jobs::{Job, JobFilter, JobOrdering};

use super::{ApplicationStore, JobStore, StoreError, StoreHealth, UserStore};

/// One shared in-process store behind all store traits.
///
/// Holding users, jobs, bookmarks and applications together lets a job
/// deletion cascade the way the relational schema does.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    users: RwLock<HashMap<UserId, User>>,
    jobs: RwLock<HashMap<JobId, Job>>,
    bookmarks: RwLock<HashSet<(JobId, UserId)>>,
    applications: RwLock<HashMap<ApplicationId, Application>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn insert(&self, user: User) -> Result<(), StoreError> {
        let mut users = self.users.write().unwrap();
        if users.contains_key(&user.id) {
            return Err(StoreError::Conflict("user id already exists".to_string()));
        }
        if users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict("email already registered".to_string()));
        }
        users.insert(user.id, user);
        Ok(())
    }

    async fn get(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().unwrap().get(&id).cloned())
    }

    async fn update(&self, user: &User) -> Result<(), StoreError> {
        let mut users = self.users.write().unwrap();
        if !users.contains_key(&user.id) {
            return Err(StoreError::NotFound);
        }
        users.insert(user.id, user.clone());
        Ok(())
    }
}

#[async_trait]
impl JobStore for InMemoryStore {
    async fn insert(&self, job: Job) -> Result<(), StoreError> {
        let mut jobs = self.jobs.write().unwrap();
        if jobs.contains_key(&job.id) {
            return Err(StoreError::Conflict("job id already exists".to_string()));
        }
        jobs.insert(job.id, job);
        Ok(())
    }

    async fn get(&self, id: JobId) -> Result<Option<Job>, StoreError> {
        Ok(self.jobs.read().unwrap().get(&id).cloned())
    }

    async fn update(&self, job: &Job) -> Result<(), StoreError> {
        let mut jobs = self.jobs.write().unwrap();
        if !jobs.contains_key(&job.id) {
            return Err(StoreError::NotFound);
        }
        jobs.insert(job.id, job.clone());
        Ok(())
    }

    async fn delete(&self, id: JobId) -> Result<(), StoreError> {
        let mut jobs = self.jobs.write().unwrap();
        if jobs.remove(&id).is_none() {
            return Err(StoreError::NotFound);
        }
        self.bookmarks.write().unwrap().retain(|(job_id, _)| *job_id != id);
        self.applications
            .write()
            .unwrap()
            .retain(|_, app| app.job_id != id);
        Ok(())
    }

    async fn list_active(
        &self,
        filter: &JobFilter,
        ordering: JobOrdering,
    ) -> Result<Vec<Job>, StoreError> {
        let jobs = self.jobs.read().unwrap();
        let mut result: Vec<Job> = jobs
            .values()
            .filter(|j| j.is_active && filter.matches(j))
            .cloned()
            .collect();
        ordering.sort(&mut result);
        Ok(result)
    }

    async fn list_by_employer(&self, employer_id: UserId) -> Result<Vec<Job>, StoreError> {
        let jobs = self.jobs.read().unwrap();
        let mut result: Vec<Job> = jobs
            .values()
            .filter(|j| j.employer_id == employer_id)
            .cloned()
            .collect();
        result.sort_by_key(|j| std::cmp::Reverse(j.created_at));
        Ok(result)
    }

    async fn deactivate_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut jobs = self.jobs.write().unwrap();
        let mut closed = 0;
        for job in jobs.values_mut() {
            if job.is_active && job.is_expired(now) {
                job.is_active = false;
                job.updated_at = now;
                closed += 1;
            }
        }
        Ok(closed)
    }

    async fn toggle_bookmark(&self, job_id: JobId, user_id: UserId) -> Result<bool, StoreError> {
        if !self.jobs.read().unwrap().contains_key(&job_id) {
            return Err(StoreError::NotFound);
        }
        let mut bookmarks = self.bookmarks.write().unwrap();
        let key = (job_id, user_id);
        if bookmarks.remove(&key) {
            Ok(false)
        } else {
            bookmarks.insert(key);
            Ok(true)
        }
    }

    async fn bookmarked_jobs(&self, user_id: UserId) -> Result<Vec<Job>, StoreError> {
        let bookmarks = self.bookmarks.read().unwrap();
        let jobs = self.jobs.read().unwrap();
        let mut result: Vec<Job> = bookmarks
            .iter()
            .filter(|(_, u)| *u == user_id)
            .filter_map(|(job_id, _)| jobs.get(job_id).cloned())
            .collect();
        result.sort_by_key(|j| std::cmp::Reverse(j.created_at));
        Ok(result)
    }
}

#[async_trait]
impl ApplicationStore for InMemoryStore {
    async fn insert(&self, application: Application) -> Result<(), StoreError> {
        // One write lock spans the pair check and the insert, so two
        // concurrent applies for the same (job, candidate) cannot both pass.
        let mut applications = self.applications.write().unwrap();
        if applications.contains_key(&application.id) {
            return Err(StoreError::Conflict(
                "application id already exists".to_string(),
            ));
        }
        let duplicate = applications.values().any(|a| {
            a.job_id == application.job_id && a.candidate_id == application.candidate_id
        });
        if duplicate {
            return Err(StoreError::Conflict(
                "you have already applied to this job".to_string(),
            ));
        }
        applications.insert(application.id, application);
        Ok(())
    }

    async fn get(&self, id: ApplicationId) -> Result<Option<Application>, StoreError> {
        Ok(self.applications.read().unwrap().get(&id).cloned())
    }

    async fn update(&self, application: &Application) -> Result<(), StoreError> {
        let mut applications = self.applications.write().unwrap();
        if !applications.contains_key(&application.id) {
            return Err(StoreError::NotFound);
        }
        applications.insert(application.id, application.clone());
        Ok(())
    }

    async fn list_for_job(&self, job_id: JobId) -> Result<Vec<Application>, StoreError> {
        let applications = self.applications.read().unwrap();
        let mut result: Vec<Application> = applications
            .values()
            .filter(|a| a.job_id == job_id)
            .cloned()
            .collect();
        result.sort_by_key(|a| a.created_at);
        Ok(result)
    }

    async fn list_for_candidate(&self, candidate_id: UserId) -> Result<Vec<Application>, StoreError> {
        let applications = self.applications.read().unwrap();
        let mut result: Vec<Application> = applications
            .values()
            .filter(|a| a.candidate_id == candidate_id)
            .cloned()
            .collect();
        result.sort_by_key(|a| std::cmp::Reverse(a.created_at));
        Ok(result)
    }
}

#[async_trait]
impl StoreHealth for InMemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use talentbridge_applications::ApplicationStatus;
    use talentbridge_jobs::{ExperienceLevel, JobType, NewJob, RemoteStatus};

    fn posting(employer_id: UserId, deadline: Option<DateTime<Utc>>) -> Job {
        Job::post(
            NewJob {
                employer_id,
                title: "Engineer".to_string(),
                company_name: Some("Acme".to_string()),
                description: "Work.".to_string(),
                requirements: "Rust".to_string(),
                location: "Berlin".to_string(),
                salary: Some(80_000),
                salary_range: None,
                job_type: JobType::FullTime,
                remote_status: RemoteStatus::Onsite,
                experience_level: ExperienceLevel::Mid,
                deadline,
            },
            None,
            Utc::now(),
        )
        .unwrap()
    }

    fn application(job: &Job, candidate_id: UserId) -> Application {
        Application::submit(job, candidate_id, "Hello", None, Utc::now()).unwrap()
    }

    #[tokio::test]
    async fn duplicate_application_is_a_conflict_and_leaves_store_unchanged() {
        let store = InMemoryStore::new();
        let job = posting(UserId::new(), None);
        let candidate = UserId::new();
        JobStore::insert(&store, job.clone()).await.unwrap();

        ApplicationStore::insert(&store, application(&job, candidate))
            .await
            .unwrap();
        let err = ApplicationStore::insert(&store, application(&job, candidate))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        let all = store.list_for_job(job.id).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn same_candidate_may_apply_to_different_jobs() {
        let store = InMemoryStore::new();
        let candidate = UserId::new();
        let job_a = posting(UserId::new(), None);
        let job_b = posting(UserId::new(), None);
        JobStore::insert(&store, job_a.clone()).await.unwrap();
        JobStore::insert(&store, job_b.clone()).await.unwrap();

        ApplicationStore::insert(&store, application(&job_a, candidate))
            .await
            .unwrap();
        ApplicationStore::insert(&store, application(&job_b, candidate))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn deactivate_expired_is_idempotent() {
        let store = InMemoryStore::new();
        let now = Utc::now();
        let expired = posting(UserId::new(), Some(now - Duration::hours(1)));
        let open = posting(UserId::new(), Some(now + Duration::hours(1)));
        let undated = posting(UserId::new(), None);
        JobStore::insert(&store, expired.clone()).await.unwrap();
        JobStore::insert(&store, open.clone()).await.unwrap();
        JobStore::insert(&store, undated.clone()).await.unwrap();

        assert_eq!(store.deactivate_expired(now).await.unwrap(), 1);
        assert_eq!(store.deactivate_expired(now).await.unwrap(), 0);

        let closed = JobStore::get(&store, expired.id).await.unwrap().unwrap();
        assert!(!closed.is_active);
        assert!(JobStore::get(&store, open.id).await.unwrap().unwrap().is_active);
        assert!(JobStore::get(&store, undated.id).await.unwrap().unwrap().is_active);
    }

    #[tokio::test]
    async fn bookmark_toggles() {
        let store = InMemoryStore::new();
        let user = UserId::new();
        let job = posting(UserId::new(), None);
        JobStore::insert(&store, job.clone()).await.unwrap();

        assert!(store.toggle_bookmark(job.id, user).await.unwrap());
        assert_eq!(store.bookmarked_jobs(user).await.unwrap().len(), 1);

        assert!(!store.toggle_bookmark(job.id, user).await.unwrap());
        assert!(store.bookmarked_jobs(user).await.unwrap().is_empty());

        let err = store.toggle_bookmark(JobId::new(), user).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[tokio::test]
    async fn deleting_a_job_cascades() {
        let store = InMemoryStore::new();
        let candidate = UserId::new();
        let job = posting(UserId::new(), None);
        JobStore::insert(&store, job.clone()).await.unwrap();
        store.toggle_bookmark(job.id, candidate).await.unwrap();
        ApplicationStore::insert(&store, application(&job, candidate))
            .await
            .unwrap();

        JobStore::delete(&store, job.id).await.unwrap();

        assert!(JobStore::get(&store, job.id).await.unwrap().is_none());
        assert!(store.bookmarked_jobs(candidate).await.unwrap().is_empty());
        assert!(store.list_for_candidate(candidate).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn listing_filters_inactive_jobs_out() {
        let store = InMemoryStore::new();
        let mut inactive = posting(UserId::new(), None);
        inactive.is_active = false;
        let active = posting(UserId::new(), None);
        JobStore::insert(&store, inactive).await.unwrap();
        JobStore::insert(&store, active.clone()).await.unwrap();

        let listed = store
            .list_active(&JobFilter::default(), JobOrdering::default())
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, active.id);
    }

    #[tokio::test]
    async fn status_updates_persist() {
        let store = InMemoryStore::new();
        let job = posting(UserId::new(), None);
        JobStore::insert(&store, job.clone()).await.unwrap();
        let mut app = application(&job, UserId::new());
        ApplicationStore::insert(&store, app.clone()).await.unwrap();

        app.transition(ApplicationStatus::Accepted).unwrap();
        ApplicationStore::update(&store, &app).await.unwrap();

        let loaded = ApplicationStore::get(&store, app.id).await.unwrap().unwrap();
        assert_eq!(loaded.status, ApplicationStatus::Accepted);
    }

    #[tokio::test]
    async fn email_uniqueness_is_enforced() {
        use talentbridge_accounts::RoleProfile;
        use talentbridge_auth::Role;

        let store = InMemoryStore::new();
        let first = User::register(
            UserId::new(),
            "same@example.com",
            "First",
            RoleProfile::empty_for(Role::Candidate),
            Utc::now(),
        )
        .unwrap();
        let second = User::register(
            UserId::new(),
            "same@example.com",
            "Second",
            RoleProfile::empty_for(Role::Employer),
            Utc::now(),
        )
        .unwrap();

        UserStore::insert(&store, first).await.unwrap();
        let err = UserStore::insert(&store, second).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }
}
