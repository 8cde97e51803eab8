use async_trait::async_trait;

use crate::domain::user::models::CreateUserCommand;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;

/// Port for user domain service operations.
#[async_trait]
pub trait UserServicePort: Send + Sync + 'static {
    /// Register a new user with a locally managed password.
    ///
    /// # Arguments
    /// * `command` - Validated command containing email, password, name and role
    ///
    /// # Returns
    /// Created user entity, role resolved through the roles table
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `RoleNotConfigured` - Requested role has no row in the roles table
    /// * `Unavailable` / `DatabaseError` - Store failure
    async fn create_user(&self, command: CreateUserCommand) -> Result<User, UserError>;

    /// Retrieve a non-deleted user by identifier.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist or is soft-deleted
    async fn get_user(&self, id: &UserId) -> Result<User, UserError>;

    /// List all non-deleted users ordered by creation time.
    async fn list_users(&self) -> Result<Vec<User>, UserError>;
}

/// Persistence operations for user aggregate.
///
/// Every read excludes soft-deleted rows and joins the role.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist new user to storage.
    ///
    /// The role id is looked up by role name inside the same statement.
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `RoleNotConfigured` - No role row with that name
    /// * `Unavailable` / `DatabaseError` - Store failure
    async fn create(&self, user: NewUser) -> Result<User, UserError>;

    /// Retrieve user by identifier.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;

    /// Retrieve user by email address.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError>;

    /// Retrieve all users from storage.
    async fn list_all(&self) -> Result<Vec<User>, UserError>;
}
