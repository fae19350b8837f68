//! Saved shops.

use sqlx::PgPool;

use chequealo_core::{ShopId, UserId};

use super::RepositoryError;
use crate::models::FavoriteShop;

/// Repository for `directory.user_favorite`.
pub struct FavoriteRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> FavoriteRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Save a shop. Returns `false` when it was already saved.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn add(&self, user_id: UserId, shop_id: ShopId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            INSERT INTO directory.user_favorite (user_id, shop_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, shop_id) DO NOTHING
            ",
        )
        .bind(user_id)
        .bind(shop_id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Unsave a shop. Returns `false` when it was not saved.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn remove(&self, user_id: UserId, shop_id: ShopId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "DELETE FROM directory.user_favorite WHERE user_id = $1 AND shop_id = $2",
        )
        .bind(user_id)
        .bind(shop_id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Whether the user saved the shop.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn is_favorite(&self, user_id: UserId, shop_id: ShopId) -> Result<bool, RepositoryError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r"
            SELECT EXISTS (
                SELECT 1 FROM directory.user_favorite WHERE user_id = $1 AND shop_id = $2
            )
            ",
        )
        .bind(user_id)
        .bind(shop_id)
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }

    /// The user's saved shops, most recently saved first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<FavoriteShop>, RepositoryError> {
        let shops = sqlx::query_as::<_, FavoriteShop>(
            r"
            SELECT f.id AS favorite_id, f.created_at AS favorited_at,
                   s.id, s.name, s.address, s.city, s.phone, s.schedule, s.whatsapp,
                   s.map_link, s.latitude, s.longitude,
                   r.average_rating, r.review_count
            FROM directory.user_favorite f
            JOIN directory.shop s ON s.id = f.shop_id
            JOIN directory.shop_rating r ON r.shop_id = s.id
            WHERE f.user_id = $1
            ORDER BY f.created_at DESC, f.id DESC
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(shops)
    }
}
