//! User repository for database operations.

use sqlx::PgPool;

use chequealo_core::{Email, UserId};

use super::RepositoryError;
use crate::models::{ProfileStats, User};

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(
            r"
            SELECT id, email, display_name, created_at, updated_at
            FROM directory.app_user
            WHERE email = $1
            ",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(
            r"
            SELECT id, email, display_name, created_at, updated_at
            FROM directory.app_user
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Create a new user with email and password.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_with_password(
        &self,
        email: &Email,
        display_name: Option<&str>,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, User>(
            r"
            INSERT INTO directory.app_user (email, display_name)
            VALUES ($1, $2)
            RETURNING id, email, display_name, created_at, updated_at
            ",
        )
        .bind(email)
        .bind(display_name)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "email already exists"))?;

        sqlx::query(
            r"
            INSERT INTO directory.user_password (user_id, password_hash)
            VALUES ($1, $2)
            ",
        )
        .bind(user.id)
        .bind(password_hash)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(user)
    }

    /// Get a user together with their password hash, for login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct Row {
            #[sqlx(flatten)]
            user: User,
            password_hash: String,
        }

        let row = sqlx::query_as::<_, Row>(
            r"
            SELECT u.id, u.email, u.display_name, u.created_at, u.updated_at, p.password_hash
            FROM directory.app_user u
            JOIN directory.user_password p ON p.user_id = u.id
            WHERE u.email = $1
            ",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|r| (r.user, r.password_hash)))
    }

    /// Review and favorite totals for a profile page.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn profile_stats(&self, id: UserId) -> Result<ProfileStats, RepositoryError> {
        let stats = sqlx::query_as::<_, ProfileStats>(
            r"
            SELECT
                (SELECT COUNT(*) FROM directory.review WHERE user_id = $1) AS review_count,
                (SELECT COUNT(*) FROM directory.user_favorite WHERE user_id = $1) AS favorite_count,
                (SELECT COALESCE(AVG(rating), 0)::DOUBLE PRECISION
                 FROM directory.review WHERE user_id = $1) AS average_given_rating
            ",
        )
        .bind(id)
        .fetch_one(self.pool)
        .await?;

        Ok(stats)
    }
}
