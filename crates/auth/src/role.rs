use core::str::FromStr;

use serde::{Deserialize, Serialize};

use talentbridge_core::DomainError;

/// Account role.
///
/// Modeled as a closed variant rather than independent boolean flags: an
/// identity is exactly one of employer or candidate, never both or neither.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// May post and manage job listings.
    Employer,
    /// May apply to job listings.
    Candidate,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Employer => "employer",
            Role::Candidate => "candidate",
        }
    }

    pub fn is_employer(&self) -> bool {
        matches!(self, Role::Employer)
    }

    pub fn is_candidate(&self) -> bool {
        matches!(self, Role::Candidate)
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "employer" => Ok(Role::Employer),
            "candidate" => Ok(Role::Candidate),
            other => Err(DomainError::validation(format!("unknown role: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_uses_snake_case() {
        assert_eq!(serde_json::to_string(&Role::Employer).unwrap(), "\"employer\"");
        let role: Role = serde_json::from_str("\"candidate\"").unwrap();
        assert_eq!(role, Role::Candidate);
    }

    #[test]
    fn parse_rejects_unknown() {
        assert!("admin".parse::<Role>().is_err());
        assert_eq!("employer".parse::<Role>().unwrap(), Role::Employer);
    }
}
