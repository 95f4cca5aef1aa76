//! `talentbridge-accounts` — user identities and role-specific profiles.
//!
//! Registration constructs the user and its role profile as one validated
//! unit; there is no out-of-band profile creation hook.

pub mod profile;
pub mod user;

pub use profile::{CandidateProfile, EmployerProfile, RoleProfile};
pub use user::User;
