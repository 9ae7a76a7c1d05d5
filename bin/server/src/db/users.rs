//! Account storage.

use chrono::{DateTime, Utc};
use schoolbook_core::UserId;
use schoolbook_platform_access::Role;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use std::str::FromStr;
use tracing::instrument;

/// Row type for user queries.
#[derive(FromRow)]
struct UserRow {
    id: i64,
    username: String,
    password_hash: String,
    role: String,
    name: String,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn try_into_credentials(self) -> Result<UserCredentials, sqlx::Error> {
        let role = Role::from_str(&self.role).map_err(|e| {
            sqlx::Error::Decode(Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("user {}: {}", self.id, e),
            )))
        })?;
        Ok(UserCredentials {
            user: UserRecord {
                id: UserId::new(self.id),
                username: self.username,
                role,
                name: self.name,
                created_at: self.created_at,
            },
            password_hash: self.password_hash,
        })
    }
}

/// An account as returned by the API. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRecord {
    pub id: UserId,
    pub username: String,
    pub role: Role,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// An account together with its stored password hash, for login.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: UserRecord,
    pub password_hash: String,
}

/// Fields for a new account.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub role: Role,
    #[serde(default)]
    pub name: String,
}

/// Repository for account operations.
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Creates a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Finds an account and its password hash by username.
    #[instrument(skip(self))]
    pub async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, sqlx::Error> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT id, username, password_hash, role, name, created_at
            FROM users
            WHERE username = $1
            LIMIT 1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::try_into_credentials).transpose()
    }

    /// Lists every account, ordered by username.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<UserRecord>, sqlx::Error> {
        let rows: Vec<UserRow> = sqlx::query_as(
            r#"
            SELECT id, username, password_hash, role, name, created_at
            FROM users
            ORDER BY username
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| row.try_into_credentials().map(|c| c.user))
            .collect()
    }

    /// Creates an account with an already hashed password.
    #[instrument(skip(self, password_hash))]
    pub async fn create(
        &self,
        username: &str,
        password_hash: &str,
        role: Role,
        name: &str,
    ) -> Result<UserRecord, sqlx::Error> {
        let row: UserRow = sqlx::query_as(
            r#"
            INSERT INTO users (username, password_hash, role, name)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, password_hash, role, name, created_at
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(role.as_str())
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        row.try_into_credentials().map(|c| c.user)
    }

    /// Counts all accounts.
    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
    }
}
