use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use talentbridge_auth::Role;
use talentbridge_core::{DomainError, DomainResult, UserId};

use crate::profile::{CandidateProfile, EmployerProfile, RoleProfile};

/// An account, employer or candidate, with its role profile inline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub display_name: String,
    pub profile: RoleProfile,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Register an account: user + role profile in one step.
    ///
    /// A blank display name falls back to the email local part, so accounts
    /// provisioned from bearer claims alone still get a usable name.
    pub fn register(
        id: UserId,
        email: &str,
        display_name: &str,
        profile: RoleProfile,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let email = email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(DomainError::validation("invalid email format"));
        }

        let display_name = match display_name.trim() {
            "" => email.split('@').next().unwrap_or_default().to_string(),
            name => name.to_string(),
        };

        Ok(Self {
            id,
            email,
            display_name,
            profile,
            created_at: now,
        })
    }

    pub fn role(&self) -> Role {
        self.profile.role()
    }

    /// Replace the employer profile. Fails for candidate accounts.
    pub fn set_employer_profile(&mut self, profile: EmployerProfile) -> DomainResult<()> {
        match self.profile {
            RoleProfile::Employer(_) => {
                self.profile = RoleProfile::Employer(profile);
                Ok(())
            }
            RoleProfile::Candidate(_) => Err(DomainError::validation(
                "account is not an employer",
            )),
        }
    }

    /// Replace the candidate profile. Fails for employer accounts.
    pub fn set_candidate_profile(&mut self, profile: CandidateProfile) -> DomainResult<()> {
        match self.profile {
            RoleProfile::Candidate(_) => {
                self.profile = RoleProfile::Candidate(profile);
                Ok(())
            }
            RoleProfile::Employer(_) => Err(DomainError::validation(
                "account is not a candidate",
            )),
        }
    }

    /// Company name from the employer profile, if any.
    pub fn company_name(&self) -> Option<&str> {
        self.profile
            .as_employer()
            .and_then(|p| p.company_name.as_deref())
    }
}
