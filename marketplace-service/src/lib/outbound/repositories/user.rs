use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;

use super::is_unavailable;
use super::is_unique_violation;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::Rating;
use crate::domain::user::models::Role;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

const USER_COLUMNS: &str = r#"
    u.id,
    u.email,
    u.password_hash,
    u.name,
    r.id AS role_id,
    r.name AS role_name,
    r.label AS role_label,
    u.bio,
    u.avatar_url,
    u.location,
    u.rating::TEXT AS rating,
    u.is_verified,
    u.created_at,
    u.updated_at
"#;

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i32,
    email: String,
    password_hash: Option<String>,
    name: String,
    role_id: i32,
    role_name: String,
    role_label: String,
    bio: Option<String>,
    avatar_url: Option<String>,
    location: Option<String>,
    rating: Option<String>,
    is_verified: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> Result<User, UserError> {
        Ok(User {
            id: UserId(self.id),
            email: EmailAddress::new(self.email)?,
            password_hash: self.password_hash,
            name: self.name,
            role: Role {
                id: self.role_id,
                name: self.role_name,
                label: self.role_label,
            },
            bio: self.bio,
            avatar_url: self.avatar_url,
            location: self.location,
            rating: Rating::from_decimal_text(self.rating.as_deref()),
            is_verified: self.is_verified,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn store_error(err: sqlx::Error) -> UserError {
    tracing::error!(error = %err, "User query failed");
    if is_unavailable(&err) {
        UserError::Unavailable(err.to_string())
    } else {
        UserError::DatabaseError(err.to_string())
    }
}

/// PostgreSQL implementation of UserRepository.
///
/// Soft-deleted rows (`deleted_at IS NOT NULL`) are invisible to every read.
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, UserError> {
        let sql = format!(
            r#"
            WITH u AS (
                INSERT INTO users (email, password_hash, name, role_id)
                SELECT $1, $2, $3, r.id
                FROM roles r
                WHERE r.name = $4
                RETURNING *
            )
            SELECT {USER_COLUMNS}
            FROM u
            JOIN roles r ON r.id = u.role_id
            "#
        );

        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(user.email.as_str())
            .bind(&user.password_hash)
            .bind(&user.name)
            .bind(user.role.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    return UserError::EmailAlreadyExists(user.email.as_str().to_string());
                }
                store_error(e)
            })?;

        match row {
            Some(r) => r.into_user(),
            None => {
                tracing::error!(role = user.role.as_str(), "Role row missing from roles table");
                Err(UserError::RoleNotConfigured(user.role.as_str().to_string()))
            }
        }
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        let sql = format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users u
            JOIN roles r ON r.id = u.role_id
            WHERE u.id = $1 AND u.deleted_at IS NULL
            "#
        );

        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id.as_i32())
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;

        row.map(UserRow::into_user).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        let sql = format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users u
            JOIN roles r ON r.id = u.role_id
            WHERE LOWER(u.email) = LOWER($1) AND u.deleted_at IS NULL
            "#
        );

        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;

        row.map(UserRow::into_user).transpose()
    }

    async fn list_all(&self) -> Result<Vec<User>, UserError> {
        let sql = format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users u
            JOIN roles r ON r.id = u.role_id
            WHERE u.deleted_at IS NULL
            ORDER BY u.created_at
            "#
        );

        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(store_error)?;

        rows.into_iter().map(UserRow::into_user).collect()
    }
}
