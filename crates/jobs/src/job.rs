use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use talentbridge_core::{DomainError, DomainResult, JobId, UserId};

macro_rules! impl_enum_str {
    ($t:ty { $($variant:path => $s:literal),+ $(,)? }) => {
        impl $t {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($variant => $s),+
                }
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok($variant),)+
                    other => Err(DomainError::validation(format!(
                        concat!("unknown ", stringify!($t), ": {}"),
                        other
                    ))),
                }
            }
        }
    };
}

/// Employment type of a posting.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    #[default]
    FullTime,
    PartTime,
    Contract,
    Freelance,
    Internship,
}

impl_enum_str!(JobType {
    JobType::FullTime => "full_time",
    JobType::PartTime => "part_time",
    JobType::Contract => "contract",
    JobType::Freelance => "freelance",
    JobType::Internship => "internship",
});

/// Where the work happens.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteStatus {
    #[default]
    Onsite,
    Remote,
    Hybrid,
}

impl_enum_str!(RemoteStatus {
    RemoteStatus::Onsite => "onsite",
    RemoteStatus::Remote => "remote",
    RemoteStatus::Hybrid => "hybrid",
});

/// Seniority band the posting targets.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    Junior,
    #[default]
    Mid,
    Senior,
    Lead,
}

impl_enum_str!(ExperienceLevel {
    ExperienceLevel::Junior => "junior",
    ExperienceLevel::Mid => "mid",
    ExperienceLevel::Senior => "senior",
    ExperienceLevel::Lead => "lead",
});

/// A job posting, owned by exactly one employer.
///
/// # Invariants
/// - Only the owning employer may mutate or delete the posting.
/// - Everyone (including guests) may read active postings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub employer_id: UserId,
    pub title: String,
    pub company_name: String,
    pub description: String,
    pub requirements: String,
    pub location: String,
    pub salary: Option<i64>,
    pub salary_range: Option<String>,
    pub job_type: JobType,
    pub remote_status: RemoteStatus,
    pub experience_level: ExperienceLevel,
    pub is_active: bool,
    pub deadline: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for posting a new job.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub employer_id: UserId,
    pub title: String,
    /// Blank falls back to the employer profile's company name.
    pub company_name: Option<String>,
    pub description: String,
    pub requirements: String,
    pub location: String,
    pub salary: Option<i64>,
    pub salary_range: Option<String>,
    pub job_type: JobType,
    pub remote_status: RemoteStatus,
    pub experience_level: ExperienceLevel,
    pub deadline: Option<DateTime<Utc>>,
}

/// Full replacement of a posting's mutable fields.
#[derive(Debug, Clone)]
pub struct JobUpdate {
    pub title: String,
    pub company_name: Option<String>,
    pub description: String,
    pub requirements: String,
    pub location: String,
    pub salary: Option<i64>,
    pub salary_range: Option<String>,
    pub job_type: JobType,
    pub remote_status: RemoteStatus,
    pub experience_level: ExperienceLevel,
    pub is_active: bool,
    pub deadline: Option<DateTime<Utc>>,
}

impl Job {
    /// Post a new job.
    ///
    /// `fallback_company` is the employer profile's company name; it fills a
    /// blank `company_name` the way the posting form auto-fills it.
    pub fn post(new: NewJob, fallback_company: Option<&str>, now: DateTime<Utc>) -> DomainResult<Self> {
        let title = non_blank("title", &new.title)?;
        let description = non_blank("description", &new.description)?;
        let requirements = non_blank("requirements", &new.requirements)?;
        let location = non_blank("location", &new.location)?;
        let company_name = resolve_company(new.company_name.as_deref(), fallback_company)?;
        validate_salary(new.salary)?;

        Ok(Self {
            id: JobId::new(),
            employer_id: new.employer_id,
            title,
            company_name,
            description,
            requirements,
            location,
            salary: new.salary,
            salary_range: new.salary_range.filter(|s| !s.trim().is_empty()),
            job_type: new.job_type,
            remote_status: new.remote_status,
            experience_level: new.experience_level,
            is_active: true,
            deadline: new.deadline,
            created_at: now,
            updated_at: now,
        })
    }

    /// Replace the posting's mutable fields. Ownership is checked by the caller.
    pub fn apply_update(&mut self, update: JobUpdate, now: DateTime<Utc>) -> DomainResult<()> {
        let title = non_blank("title", &update.title)?;
        let description = non_blank("description", &update.description)?;
        let requirements = non_blank("requirements", &update.requirements)?;
        let location = non_blank("location", &update.location)?;
        // On update the current company name is the fallback, so a blank
        // value keeps what the posting already had.
        let company_name = resolve_company(update.company_name.as_deref(), Some(&self.company_name))?;
        validate_salary(update.salary)?;

        self.title = title;
        self.company_name = company_name;
        self.description = description;
        self.requirements = requirements;
        self.location = location;
        self.salary = update.salary;
        self.salary_range = update.salary_range.filter(|s| !s.trim().is_empty());
        self.job_type = update.job_type;
        self.remote_status = update.remote_status;
        self.experience_level = update.experience_level;
        self.is_active = update.is_active;
        self.deadline = update.deadline;
        self.updated_at = now;
        Ok(())
    }

    /// Ownership gate: the acting identity must be the posting employer.
    pub fn ensure_owned_by(&self, user_id: UserId) -> DomainResult<()> {
        if self.employer_id == user_id {
            Ok(())
        } else {
            Err(DomainError::Unauthorized)
        }
    }

    /// Whether the posting's deadline is strictly in the past.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self.deadline, Some(deadline) if deadline < now)
    }
}

fn non_blank(field: &str, value: &str) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{field} must not be blank")));
    }
    Ok(trimmed.to_string())
}

fn resolve_company(given: Option<&str>, fallback: Option<&str>) -> DomainResult<String> {
    if let Some(name) = given.map(str::trim).filter(|s| !s.is_empty()) {
        return Ok(name.to_string());
    }
    if let Some(name) = fallback.map(str::trim).filter(|s| !s.is_empty()) {
        return Ok(name.to_string());
    }
    Err(DomainError::validation(
        "company_name is required when the employer profile has none",
    ))
}

fn validate_salary(salary: Option<i64>) -> DomainResult<()> {
    if matches!(salary, Some(s) if s < 0) {
        return Err(DomainError::validation("salary must not be negative"));
    }
    Ok(())
}
