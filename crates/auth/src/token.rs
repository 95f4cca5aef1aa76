//! Token decoding and verification.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};

use crate::claims::{JwtClaims, TokenValidationError, validate_claims};

/// Verifies a bearer token and yields its claims.
///
/// Implementations own key material; callers supply `now` so the time-window
/// check stays deterministic and testable.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenValidationError>;
}

/// HS256 validator over a shared secret.
pub struct Hs256JwtValidator {
    decoding: DecodingKey,
}

impl Hs256JwtValidator {
    pub fn new(secret: Vec<u8>) -> Self {
        Self {
            decoding: DecodingKey::from_secret(&secret),
        }
    }
}

impl JwtValidator for Hs256JwtValidator {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenValidationError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // The time window is checked by `validate_claims` against the caller's
        // clock, not jsonwebtoken's leeway-based check.
        validation.validate_exp = false;

        let data = jsonwebtoken::decode::<JwtClaims>(token, &self.decoding, &validation)
            .map_err(|_| TokenValidationError::Malformed)?;

        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use jsonwebtoken::{EncodingKey, Header};
    use talentbridge_core::UserId;

    use crate::Role;

    fn mint(secret: &str, iat: DateTime<Utc>, exp: DateTime<Utc>) -> (UserId, String) {
        let sub = UserId::new();
        let claims = JwtClaims {
            sub,
            email: "candidate@example.com".to_string(),
            role: Role::Candidate,
            iat,
            exp,
        };
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();
        (sub, token)
    }

    #[test]
    fn decodes_valid_token() {
        let now = Utc::now();
        let (sub, token) = mint("s3cret", now, now + Duration::minutes(10));

        let validator = Hs256JwtValidator::new(b"s3cret".to_vec());
        let claims = validator.validate(&token, now).unwrap();
        assert_eq!(claims.sub, sub);
        assert_eq!(claims.role, Role::Candidate);
    }

    #[test]
    fn rejects_wrong_secret() {
        let now = Utc::now();
        let (_, token) = mint("s3cret", now, now + Duration::minutes(10));

        let validator = Hs256JwtValidator::new(b"other".to_vec());
        assert_eq!(
            validator.validate(&token, now),
            Err(TokenValidationError::Malformed)
        );
    }

    #[test]
    fn rejects_expired_token() {
        let now = Utc::now();
        let (_, token) = mint("s3cret", now - Duration::hours(2), now - Duration::hours(1));

        let validator = Hs256JwtValidator::new(b"s3cret".to_vec());
        assert_eq!(
            validator.validate(&token, now),
            Err(TokenValidationError::Expired)
        );
    }
}
