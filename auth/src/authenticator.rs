use crate::jwt::Claims;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Authentication coordinator combining password verification and JWT generation.
///
/// Provides high-level authentication operations by coordinating
/// password hashing and JWT token handling.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    jwt_handler: JwtHandler,
}

/// Result of successful authentication.
pub struct AuthenticationResult {
    /// JWT access token
    pub access_token: String,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
}

/// Token rejected for any reason (bad signature, expired, malformed).
///
/// Deliberately carries no detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Invalid or expired token")]
pub struct InvalidToken;

impl Authenticator {
    /// Create a new authenticator with the default password cost.
    ///
    /// # Arguments
    /// * `jwt_secret` - Secret key for JWT signing
    ///
    /// # Errors
    /// * `WeakSecret` - Secret is shorter than 32 bytes
    pub fn new(jwt_secret: &[u8]) -> Result<Self, JwtError> {
        Self::with_password_hasher(jwt_secret, PasswordHasher::new())
    }

    /// Create an authenticator using a specific password hasher.
    pub fn with_password_hasher(
        jwt_secret: &[u8],
        password_hasher: PasswordHasher,
    ) -> Result<Self, JwtError> {
        Ok(Self {
            password_hasher,
            jwt_handler: JwtHandler::new(jwt_secret)?,
        })
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Check a password against a stored hash.
    ///
    /// Returns `Ok(false)` on mismatch; errors only when the stored hash is unreadable.
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> Result<bool, PasswordError> {
        self.password_hasher.verify(password, stored_hash)
    }

    /// Verify credentials and generate JWT token.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `stored_hash` - Stored password hash
    /// * `claims` - Claims to encode in token
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `PasswordError` - Password verification failed
    /// * `JwtError` - Token generation failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: &str,
        claims: &Claims,
    ) -> Result<AuthenticationResult, AuthenticationError> {
        let is_valid = self.password_hasher.verify(password, stored_hash)?;

        if !is_valid {
            return Err(AuthenticationError::InvalidCredentials);
        }

        let access_token = self.issue_token(claims)?;

        Ok(AuthenticationResult { access_token })
    }

    /// Sign claims into a token without password verification.
    ///
    /// # Errors
    /// * `JwtError` - Token generation failed
    pub fn issue_token(&self, claims: &Claims) -> Result<String, JwtError> {
        self.jwt_handler.encode(claims)
    }

    /// Validate and decode a token.
    ///
    /// Every failure collapses into [`InvalidToken`] so callers cannot tell an
    /// expired token from a forged one.
    pub fn verify_token(&self, token: &str) -> Result<Claims, InvalidToken> {
        self.jwt_handler.decode(token).map_err(|_| InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use chrono::Utc;

    use super::*;

    const SECRET: &[u8] = b"test_secret_key_at_least_32_bytes!";

    #[test]
    fn test_authenticate_success() {
        let authenticator = Authenticator::new(SECRET).unwrap();

        let password = "my_password";
        let hash = authenticator
            .hash_password(password)
            .expect("Failed to hash password");

        let claims = Claims::for_user(3, "carol@example.com", "client", Duration::days(7));
        let result = authenticator
            .authenticate(password, &hash, &claims)
            .expect("Authentication failed");

        assert!(!result.access_token.is_empty());

        let decoded = authenticator
            .verify_token(&result.access_token)
            .expect("Token validation failed");
        assert_eq!(decoded.sub, "3");
        assert_eq!(decoded.role, "client");
    }

    #[test]
    fn test_authenticate_invalid_password() {
        let authenticator = Authenticator::new(SECRET).unwrap();

        let hash = authenticator
            .hash_password("my_password")
            .expect("Failed to hash password");

        let claims = Claims::for_user(3, "carol@example.com", "client", Duration::days(7));

        let result = authenticator.authenticate("wrong_password", &hash, &claims);
        assert!(matches!(
            result,
            Err(AuthenticationError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let authenticator = Authenticator::new(SECRET).unwrap();
        let claims = Claims::for_user(9, "dan@example.com", "admin", Duration::days(7));

        let token = authenticator.issue_token(&claims).unwrap();
        assert_eq!(authenticator.verify_token(&token), Ok(claims));
    }

    #[test]
    fn test_verify_collapses_failures() {
        let authenticator = Authenticator::new(SECRET).unwrap();

        let issued = Utc::now() - Duration::days(7) - Duration::seconds(1);
        let expired = Claims::issued_at(9, "dan@example.com", "admin", issued, Duration::days(7));
        let expired_token = authenticator.issue_token(&expired).unwrap();

        let other = Authenticator::new(b"another_secret_key_at_least_32_bytes").unwrap();
        let forged_token = other
            .issue_token(&Claims::for_user(9, "dan@example.com", "admin", Duration::days(7)))
            .unwrap();

        assert_eq!(authenticator.verify_token(&expired_token), Err(InvalidToken));
        assert_eq!(authenticator.verify_token(&forged_token), Err(InvalidToken));
        assert_eq!(authenticator.verify_token("garbage"), Err(InvalidToken));
    }

    #[test]
    fn test_weak_secret_fails_closed() {
        assert!(Authenticator::new(b"your-secret-key").is_err());
    }
}
