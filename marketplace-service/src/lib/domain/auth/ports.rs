use async_trait::async_trait;

use crate::auth::errors::AuthError;
use crate::auth::models::AuthenticatedSession;
use crate::auth::models::AuthenticatedUser;

/// Port for credential checks and token verification.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Authenticate with email and password and issue a 7-day token.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown email or wrong password (indistinguishable)
    /// * `ExternalAuthRequired` - Account has no local password
    /// * `Unavailable` - Credential store could not be reached
    /// * `Internal` - Stored hash unreadable or signing failed
    async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthenticatedSession, AuthError>;

    /// Verify a bearer token and return the identity it carries.
    ///
    /// # Errors
    /// * `InvalidToken` - Any signature, expiry or format failure
    fn verify_token(&self, token: &str) -> Result<AuthenticatedUser, AuthError>;
}
