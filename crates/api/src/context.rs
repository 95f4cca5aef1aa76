use talentbridge_auth::Role;
use talentbridge_core::UserId;

/// Authenticated identity for a request, derived from verified bearer claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: UserId,
    pub email: String,
    pub role: Role,
}

/// Request identity slot: `None` for anonymous (guest) requests.
///
/// The middleware inserts this on every request; handlers decide per
/// operation whether a guest is acceptable.
#[derive(Debug, Clone, Default)]
pub struct MaybeAuth(pub Option<AuthContext>);
