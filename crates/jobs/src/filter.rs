//! Catalog listing filter and ordering.

use core::str::FromStr;

use serde::Deserialize;

use talentbridge_core::{DomainError, DomainResult};

use crate::job::{ExperienceLevel, Job, JobType, RemoteStatus};

/// Filter over the public job listing.
///
/// Text filters are case-insensitive substring matches; the salary bounds
/// only ever match postings that carry a numeric salary.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobFilter {
    pub job_type: Option<JobType>,
    pub remote_status: Option<RemoteStatus>,
    pub experience_level: Option<ExperienceLevel>,
    pub location: Option<String>,
    pub min_salary: Option<i64>,
    pub max_salary: Option<i64>,
    /// Free-text search across title, company, description, requirements
    /// and location.
    pub search: Option<String>,
}

impl JobFilter {
    pub fn matches(&self, job: &Job) -> bool {
        if let Some(job_type) = self.job_type {
            if job.job_type != job_type {
                return false;
            }
        }
        if let Some(remote_status) = self.remote_status {
            if job.remote_status != remote_status {
                return false;
            }
        }
        if let Some(level) = self.experience_level {
            if job.experience_level != level {
                return false;
            }
        }
        if let Some(location) = &self.location {
            if !contains_ci(&job.location, location) {
                return false;
            }
        }
        if let Some(min) = self.min_salary {
            match job.salary {
                Some(salary) if salary >= min => {}
                _ => return false,
            }
        }
        if let Some(max) = self.max_salary {
            match job.salary {
                Some(salary) if salary <= max => {}
                _ => return false,
            }
        }
        if let Some(needle) = &self.search {
            let hit = contains_ci(&job.title, needle)
                || contains_ci(&job.company_name, needle)
                || contains_ci(&job.description, needle)
                || contains_ci(&job.requirements, needle)
                || contains_ci(&job.location, needle);
            if !hit {
                return false;
            }
        }
        true
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Listing order. `-` prefix descends; the default is newest first.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum JobOrdering {
    CreatedAtAsc,
    #[default]
    CreatedAtDesc,
    SalaryAsc,
    SalaryDesc,
}

impl JobOrdering {
    pub fn sort(&self, jobs: &mut [Job]) {
        match self {
            JobOrdering::CreatedAtAsc => jobs.sort_by_key(|j| j.created_at),
            JobOrdering::CreatedAtDesc => {
                jobs.sort_by_key(|j| std::cmp::Reverse(j.created_at))
            }
            // Postings without a numeric salary sort below any priced one.
            JobOrdering::SalaryAsc => jobs.sort_by_key(|j| j.salary.unwrap_or(i64::MIN)),
            JobOrdering::SalaryDesc => {
                jobs.sort_by_key(|j| std::cmp::Reverse(j.salary.unwrap_or(i64::MIN)))
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobOrdering::CreatedAtAsc => "created_at",
            JobOrdering::CreatedAtDesc => "-created_at",
            JobOrdering::SalaryAsc => "salary",
            JobOrdering::SalaryDesc => "-salary",
        }
    }
}

impl FromStr for JobOrdering {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        match s {
            "created_at" => Ok(JobOrdering::CreatedAtAsc),
            "-created_at" => Ok(JobOrdering::CreatedAtDesc),
            "salary" => Ok(JobOrdering::SalaryAsc),
            "-salary" => Ok(JobOrdering::SalaryDesc),
            other => Err(DomainError::validation(format!(
                "unknown ordering: {other} (expected created_at, -created_at, salary or -salary)"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use talentbridge_core::UserId;

    use crate::job::NewJob;

    fn job(title: &str, location: &str, salary: Option<i64>) -> Job {
        Job::post(
            NewJob {
                employer_id: UserId::new(),
                title: title.to_string(),
                company_name: Some("Acme".to_string()),
                description: "desc".to_string(),
                requirements: "reqs".to_string(),
                location: location.to_string(),
                salary,
                salary_range: None,
                job_type: JobType::FullTime,
                remote_status: RemoteStatus::Remote,
                experience_level: ExperienceLevel::Mid,
                deadline: None,
            },
            None,
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(JobFilter::default().matches(&job("Engineer", "Berlin", None)));
    }

    #[test]
    fn location_is_case_insensitive_substring() {
        let filter = JobFilter {
            location: Some("ber".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&job("Engineer", "Berlin", None)));
        assert!(!filter.matches(&job("Engineer", "Lisbon", None)));
    }

    #[test]
    fn salary_bounds_exclude_unpriced_postings() {
        let filter = JobFilter {
            min_salary: Some(50_000),
            ..Default::default()
        };
        assert!(filter.matches(&job("Engineer", "Berlin", Some(60_000))));
        assert!(!filter.matches(&job("Engineer", "Berlin", Some(40_000))));
        assert!(!filter.matches(&job("Engineer", "Berlin", None)));
    }

    #[test]
    fn search_spans_title_and_company() {
        let filter = JobFilter {
            search: Some("acme".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&job("Engineer", "Berlin", None)));

        let filter = JobFilter {
            search: Some("astronaut".to_string()),
            ..Default::default()
        };
        assert!(!filter.matches(&job("Engineer", "Berlin", None)));
    }

    #[test]
    fn ordering_parses_and_sorts() {
        let mut jobs = vec![
            job("a", "x", Some(10)),
            job("b", "x", None),
            job("c", "x", Some(30)),
        ];
        "-salary".parse::<JobOrdering>().unwrap().sort(&mut jobs);
        assert_eq!(jobs[0].title, "c");
        assert_eq!(jobs[2].title, "b");

        assert!("title".parse::<JobOrdering>().is_err());
    }
}
