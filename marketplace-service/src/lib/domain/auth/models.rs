use chrono::DateTime;
use chrono::Utc;

use crate::domain::user::models::User;
use crate::domain::user::models::UserId;

/// Result of a successful login.
///
/// Stateless: the token is the only server-issued artifact and cannot be
/// revoked before `expires_at`.
#[derive(Debug, Clone)]
pub struct AuthenticatedSession {
    pub user: User,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Identity attested by a verified bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub email: String,
    pub role: String,
}
