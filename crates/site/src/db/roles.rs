//! Role grants.
//!
//! Roles are authorization predicates only; nothing in the request path
//! grants or revokes them. The CLI manages them.

use sqlx::PgPool;

use chequealo_core::{UserId, UserRole};

use super::RepositoryError;

/// Repository for `directory.user_role_grant`.
pub struct RoleRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RoleRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All roles granted to a user, in a stable order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn roles_for(&self, user_id: UserId) -> Result<Vec<UserRole>, RepositoryError> {
        let roles = sqlx::query_scalar::<_, UserRole>(
            r"
            SELECT role FROM directory.user_role_grant
            WHERE user_id = $1
            ORDER BY role
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(roles)
    }

    /// Grant a role. Returns `false` if it was already granted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn grant(&self, user_id: UserId, role: UserRole) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            INSERT INTO directory.user_role_grant (user_id, role)
            VALUES ($1, $2)
            ON CONFLICT (user_id, role) DO NOTHING
            ",
        )
        .bind(user_id)
        .bind(role)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Revoke a role. Returns `false` if it was not granted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn revoke(&self, user_id: UserId, role: UserRole) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM directory.user_role_grant
            WHERE user_id = $1 AND role = $2
            ",
        )
        .bind(user_id)
        .bind(role)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
