use thiserror::Error;

/// Errors raised while authenticating a user or verifying a token.
///
/// Unknown email and wrong password share one variant so callers cannot
/// enumerate accounts.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("This account signs in with an external provider")]
    ExternalAuthRequired,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Service temporarily unavailable: {0}")]
    Unavailable(String),

    #[error("Internal authentication error: {0}")]
    Internal(String),
}

impl From<auth::InvalidToken> for AuthError {
    fn from(_: auth::InvalidToken) -> Self {
        AuthError::InvalidToken
    }
}
