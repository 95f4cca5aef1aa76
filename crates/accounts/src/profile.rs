use serde::{Deserialize, Serialize};

use talentbridge_auth::Role;

/// Company-facing details of an employer account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployerProfile {
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub company_website: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Candidate-facing details: headline, bio, links.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateProfile {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub resume_url: Option<String>,
    #[serde(default)]
    pub skills: Option<String>,
    #[serde(default)]
    pub github_url: Option<String>,
    #[serde(default)]
    pub linkedin_url: Option<String>,
}

/// Role-specific profile carried inline on the user.
///
/// The variant *is* the role: an account with both profiles, or with a role
/// and no profile slot, is unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", content = "profile", rename_all = "snake_case")]
pub enum RoleProfile {
    Employer(EmployerProfile),
    Candidate(CandidateProfile),
}

impl RoleProfile {
    pub fn role(&self) -> Role {
        match self {
            RoleProfile::Employer(_) => Role::Employer,
            RoleProfile::Candidate(_) => Role::Candidate,
        }
    }

    pub fn as_employer(&self) -> Option<&EmployerProfile> {
        match self {
            RoleProfile::Employer(p) => Some(p),
            RoleProfile::Candidate(_) => None,
        }
    }

    pub fn as_candidate(&self) -> Option<&CandidateProfile> {
        match self {
            RoleProfile::Candidate(p) => Some(p),
            RoleProfile::Employer(_) => None,
        }
    }

    /// Empty profile slot for a freshly provisioned account.
    pub fn empty_for(role: Role) -> Self {
        match role {
            Role::Employer => RoleProfile::Employer(EmployerProfile::default()),
            Role::Candidate => RoleProfile::Candidate(CandidateProfile::default()),
        }
    }
}
