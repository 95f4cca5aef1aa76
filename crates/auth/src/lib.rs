//! `talentbridge-auth` — pure authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage.

pub mod claims;
pub mod role;
pub mod token;

pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use role::Role;
pub use token::{Hs256JwtValidator, JwtValidator};
