use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use talentbridge_core::{ApplicationId, DomainError, DomainResult, JobId, UserId};
use talentbridge_jobs::Job;

/// Review status of an application.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    /// A decision has been made; the application left the review queue.
    pub fn is_decided(&self) -> bool {
        !matches!(self, ApplicationStatus::Pending)
    }
}

impl core::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ApplicationStatus::Pending),
            "accepted" => Ok(ApplicationStatus::Accepted),
            "rejected" => Ok(ApplicationStatus::Rejected),
            other => Err(DomainError::validation(format!("unknown status: {other}"))),
        }
    }
}

/// A candidate's request to be considered for a job.
///
/// # Invariants
/// - At most one application per (job, candidate) pair; the storage layer's
///   unique constraint is the sole duplicate detector.
/// - Created with status `Pending`; any client-supplied status is ignored.
/// - Status changes only through [`Application::transition`], invoked by the
///   employer owning the referenced job.
/// - Never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub job_id: JobId,
    pub candidate_id: UserId,
    pub cover_letter: String,
    pub resume_url: Option<String>,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
}

impl Application {
    /// Submit an application for a posting.
    pub fn submit(
        job: &Job,
        candidate_id: UserId,
        cover_letter: &str,
        resume_url: Option<String>,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if !job.is_active {
            return Err(DomainError::validation(
                "this job is no longer accepting applications",
            ));
        }

        let cover_letter = cover_letter.trim();
        if cover_letter.is_empty() {
            return Err(DomainError::validation("cover_letter must not be blank"));
        }

        Ok(Self {
            id: ApplicationId::new(),
            job_id: job.id,
            candidate_id,
            cover_letter: cover_letter.to_string(),
            resume_url: resume_url.filter(|s| !s.trim().is_empty()),
            status: ApplicationStatus::Pending,
            created_at: now,
        })
    }

    /// Move the application to `new_status`.
    ///
    /// Re-applying the current status is an idempotent no-op. A rejected
    /// candidate cannot be accepted afterwards, and a decided application
    /// never returns to `Pending`.
    pub fn transition(&mut self, new_status: ApplicationStatus) -> DomainResult<()> {
        use ApplicationStatus::*;

        match (self.status, new_status) {
            (current, next) if current == next => Ok(()),
            (Rejected, Accepted) => Err(DomainError::validation(
                "cannot accept a previously rejected candidate",
            )),
            (_, Pending) => Err(DomainError::validation(
                "a reviewed application cannot return to pending",
            )),
            (_, next) => {
                self.status = next;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use talentbridge_jobs::{ExperienceLevel, JobType, NewJob, RemoteStatus};

    fn posting(active: bool) -> Job {
        let mut job = Job::post(
            NewJob {
                employer_id: UserId::new(),
                title: "Data Engineer".to_string(),
                company_name: Some("Acme".to_string()),
                description: "Pipelines.".to_string(),
                requirements: "SQL".to_string(),
                location: "Remote".to_string(),
                salary: None,
                salary_range: None,
                job_type: JobType::FullTime,
                remote_status: RemoteStatus::Remote,
                experience_level: ExperienceLevel::Mid,
                deadline: None,
            },
            None,
            Utc::now(),
        )
        .unwrap();
        job.is_active = active;
        job
    }

    fn pending() -> Application {
        Application::submit(&posting(true), UserId::new(), "Hi!", None, Utc::now()).unwrap()
    }

    #[test]
    fn submit_forces_pending() {
        let app = pending();
        assert_eq!(app.status, ApplicationStatus::Pending);
    }

    #[test]
    fn submit_refuses_inactive_posting() {
        let err =
            Application::submit(&posting(false), UserId::new(), "Hi!", None, Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn submit_requires_cover_letter() {
        let err =
            Application::submit(&posting(true), UserId::new(), "  ", None, Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn pending_can_be_accepted_or_rejected() {
        let mut app = pending();
        app.transition(ApplicationStatus::Accepted).unwrap();
        assert_eq!(app.status, ApplicationStatus::Accepted);

        let mut app = pending();
        app.transition(ApplicationStatus::Rejected).unwrap();
        assert_eq!(app.status, ApplicationStatus::Rejected);
    }

    #[test]
    fn rejected_cannot_become_accepted() {
        let mut app = pending();
        app.transition(ApplicationStatus::Rejected).unwrap();

        let err = app.transition(ApplicationStatus::Accepted).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(app.status, ApplicationStatus::Rejected);
    }

    #[test]
    fn accepted_can_still_be_rejected() {
        let mut app = pending();
        app.transition(ApplicationStatus::Accepted).unwrap();
        app.transition(ApplicationStatus::Rejected).unwrap();
        assert_eq!(app.status, ApplicationStatus::Rejected);
    }

    #[test]
    fn same_status_is_a_no_op() {
        let mut app = pending();
        app.transition(ApplicationStatus::Pending).unwrap();
        app.transition(ApplicationStatus::Pending).unwrap();
        assert_eq!(app.status, ApplicationStatus::Pending);

        app.transition(ApplicationStatus::Accepted).unwrap();
        app.transition(ApplicationStatus::Accepted).unwrap();
        assert_eq!(app.status, ApplicationStatus::Accepted);
    }

    #[test]
    fn decided_never_returns_to_pending() {
        for decided in [ApplicationStatus::Accepted, ApplicationStatus::Rejected] {
            let mut app = pending();
            app.transition(decided).unwrap();
            assert!(app.transition(ApplicationStatus::Pending).is_err());
            assert_eq!(app.status, decided);
        }
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn status_strategy() -> impl Strategy<Value = ApplicationStatus> {
            prop_oneof![
                Just(ApplicationStatus::Pending),
                Just(ApplicationStatus::Accepted),
                Just(ApplicationStatus::Rejected),
            ]
        }

        proptest! {
            /// No sequence of transition attempts moves a decided
            /// application back to pending or flips rejected to accepted.
            #[test]
            fn transitions_respect_terminal_rules(
                attempts in proptest::collection::vec(status_strategy(), 0..16)
            ) {
                let mut app = pending();
                let mut was_rejected = false;

                for next in attempts {
                    let before = app.status;
                    let result = app.transition(next);

                    if before.is_decided() && next == ApplicationStatus::Pending {
                        prop_assert!(result.is_err());
                        prop_assert_eq!(app.status, before);
                    }
                    if was_rejected {
                        prop_assert_ne!(app.status, ApplicationStatus::Accepted);
                    }
                    if app.status == ApplicationStatus::Rejected {
                        was_rejected = true;
                    }
                }
            }
        }
    }
}
