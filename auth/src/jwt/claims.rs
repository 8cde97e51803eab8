use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Identity claims carried by an access token.
///
/// Subject, email and role are attested by the signature; `iat`/`exp` bound
/// the validity window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user identifier)
    pub sub: String,

    /// Email address of the subject at issuance time
    pub email: String,

    /// Role name resolved at issuance time
    pub role: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Create claims for a user, issued now.
    ///
    /// # Arguments
    /// * `user_id` - Unique user identifier
    /// * `email` - User email
    /// * `role` - Role name
    /// * `validity` - How long the token stays valid
    pub fn for_user(
        user_id: impl ToString,
        email: impl Into<String>,
        role: impl Into<String>,
        validity: Duration,
    ) -> Self {
        Self::issued_at(user_id, email, role, Utc::now(), validity)
    }

    /// Create claims for a user with an explicit issuance instant.
    pub fn issued_at(
        user_id: impl ToString,
        email: impl Into<String>,
        role: impl Into<String>,
        issued_at: DateTime<Utc>,
        validity: Duration,
    ) -> Self {
        Self {
            sub: user_id.to_string(),
            email: email.into(),
            role: role.into(),
            iat: issued_at.timestamp(),
            exp: (issued_at + validity).timestamp(),
        }
    }

    /// Expiry as a timestamp, if representable.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}
