use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use chrono::Utc;
use uuid::Uuid;

use crate::auth::errors::AuthError;
use crate::auth::models::AuthenticatedSession;
use crate::auth::models::AuthenticatedUser;
use crate::auth::ports::AuthServicePort;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;

/// Login and token verification over the credential store.
pub struct AuthService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    authenticator: Arc<auth::Authenticator>,
    token_validity: Duration,
    /// Hash checked when the email is unknown, so both failure paths pay
    /// the same Argon2 cost.
    decoy_hash: String,
}

impl<UR> AuthService<UR>
where
    UR: UserRepository,
{
    /// Create a new auth service.
    ///
    /// # Arguments
    /// * `repository` - Credential store
    /// * `authenticator` - Password hasher and token signer
    /// * `token_validity` - Lifetime of issued tokens
    ///
    /// # Errors
    /// * `HashingFailed` - The decoy hash could not be produced
    pub fn new(
        repository: Arc<UR>,
        authenticator: Arc<auth::Authenticator>,
        token_validity: Duration,
    ) -> Result<Self, auth::PasswordError> {
        let decoy_hash = authenticator.hash_password(&Uuid::new_v4().to_string())?;

        Ok(Self {
            repository,
            authenticator,
            token_validity,
            decoy_hash,
        })
    }

    fn check_password(&self, password: &str, stored_hash: &str) -> Result<bool, AuthError> {
        self.authenticator
            .verify_password(password, stored_hash)
            .map_err(|e| {
                tracing::error!(error = %e, "Stored password hash is unreadable");
                AuthError::Internal(e.to_string())
            })
    }
}

fn lookup_error(err: UserError) -> AuthError {
    match err {
        UserError::Unavailable(msg) => AuthError::Unavailable(msg),
        other => AuthError::Internal(other.to_string()),
    }
}

#[async_trait]
impl<UR> AuthServicePort for AuthService<UR>
where
    UR: UserRepository,
{
    async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthenticatedSession, AuthError> {
        let Some(user) = self
            .repository
            .find_by_email(email.trim())
            .await
            .map_err(lookup_error)?
        else {
            self.check_password(password, &self.decoy_hash)?;
            return Err(AuthError::InvalidCredentials);
        };

        let stored_hash = user
            .password_hash
            .as_deref()
            .ok_or(AuthError::ExternalAuthRequired)?;

        let is_valid = self.check_password(password, stored_hash)?;

        if !is_valid {
            tracing::debug!(user_id = %user.id, "Password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        let claims = auth::Claims::for_user(
            user.id,
            user.email.as_str(),
            user.role.name.as_str(),
            self.token_validity,
        );

        let token = self
            .authenticator
            .issue_token(&claims)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        let expires_at = claims
            .expires_at()
            .unwrap_or_else(|| Utc::now() + self.token_validity);

        tracing::info!(user_id = %user.id, role = %user.role.name, "User logged in");

        Ok(AuthenticatedSession {
            user,
            token,
            expires_at,
        })
    }

    fn verify_token(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let claims = self.authenticator.verify_token(token)?;
        let user_id = UserId::from_string(&claims.sub).map_err(|_| AuthError::InvalidToken)?;

        Ok(AuthenticatedUser {
            user_id,
            email: claims.email,
            role: claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::service::tests::sample_user;
    use crate::domain::user::service::tests::MockTestUserRepository;

    const SECRET: &[u8] = b"test_secret_key_at_least_32_bytes!";

    fn authenticator() -> Arc<auth::Authenticator> {
        Arc::new(auth::Authenticator::new(SECRET).unwrap())
    }

    fn service_with(
        repository: MockTestUserRepository,
        authenticator: Arc<auth::Authenticator>,
    ) -> AuthService<MockTestUserRepository> {
        AuthService::new(Arc::new(repository), authenticator, Duration::days(7)).unwrap()
    }

    #[tokio::test]
    async fn test_authenticate_issues_token_with_subject_and_role() {
        let authenticator = authenticator();
        let hash = authenticator.hash_password("correct horse").unwrap();

        let mut repository = MockTestUserRepository::new();
        repository
            .expect_find_by_email()
            .withf(|email| email == "user7@example.com")
            .times(1)
            .returning(move |_| Ok(Some(sample_user(7, "freelancer", Some(hash.clone())))));

        let service = service_with(repository, authenticator);

        let session = service
            .authenticate("user7@example.com", "correct horse")
            .await
            .expect("login should succeed");

        let identity = service.verify_token(&session.token).unwrap();
        assert_eq!(identity.user_id, UserId(7));
        assert_eq!(identity.role, "freelancer");
        assert_eq!(identity.email, "user7@example.com");

        let remaining = session.expires_at - Utc::now();
        assert!(remaining <= Duration::days(7));
        assert!(remaining > Duration::days(7) - Duration::minutes(1));
    }

    #[tokio::test]
    async fn test_unknown_email_and_wrong_password_are_indistinguishable() {
        let authenticator = authenticator();
        let hash = authenticator.hash_password("correct horse").unwrap();

        let mut repository = MockTestUserRepository::new();
        repository
            .expect_find_by_email()
            .returning(move |email| {
                if email == "user7@example.com" {
                    Ok(Some(sample_user(7, "client", Some(hash.clone()))))
                } else {
                    Ok(None)
                }
            });

        let service = service_with(repository, authenticator);

        let unknown = service
            .authenticate("nobody@example.com", "correct horse")
            .await
            .unwrap_err();
        let wrong = service
            .authenticate("user7@example.com", "battery staple")
            .await
            .unwrap_err();

        assert!(matches!(unknown, AuthError::InvalidCredentials));
        assert!(matches!(wrong, AuthError::InvalidCredentials));
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[tokio::test]
    async fn test_unknown_email_still_verifies_a_password_hash() {
        let mut repository = MockTestUserRepository::new();
        repository.expect_find_by_email().returning(|_| Ok(None));

        let mut service = service_with(repository, authenticator());
        assert!(service.decoy_hash.starts_with("$argon2id$"));

        let result = service.authenticate("nobody@example.com", "anything").await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));

        // An unreadable decoy surfaces, so the not-found branch really hashes.
        service.decoy_hash = "not-a-phc-string".to_string();
        let result = service.authenticate("nobody@example.com", "anything").await;
        assert!(matches!(result, Err(AuthError::Internal(_))));
    }

    #[tokio::test]
    async fn test_null_hash_requires_external_auth() {
        let mut repository = MockTestUserRepository::new();
        repository
            .expect_find_by_email()
            .returning(|_| Ok(Some(sample_user(4, "client", None))));

        let service = service_with(repository, authenticator());

        for password in ["", "anything", "correct horse"] {
            let result = service.authenticate("user4@example.com", password).await;
            assert!(matches!(result, Err(AuthError::ExternalAuthRequired)));
        }
    }

    #[tokio::test]
    async fn test_store_outage_surfaces_as_unavailable() {
        let mut repository = MockTestUserRepository::new();
        repository
            .expect_find_by_email()
            .returning(|_| Err(UserError::Unavailable("pool timed out".to_string())));

        let service = service_with(repository, authenticator());

        let result = service.authenticate("user4@example.com", "whatever").await;
        assert!(matches!(result, Err(AuthError::Unavailable(_))));
    }

    #[test]
    fn test_verify_token_rejects_non_numeric_subject() {
        let authenticator = authenticator();
        let claims = auth::Claims::for_user("abc", "x@example.com", "client", Duration::days(7));
        let token = authenticator.issue_token(&claims).unwrap();

        let service = service_with(MockTestUserRepository::new(), authenticator);

        assert!(matches!(
            service.verify_token(&token),
            Err(AuthError::InvalidToken)
        ));
    }
}
