//! Shop repository.
//!
//! Shops are read-only here; the only write path is an approved update
//! request (see [`super::UpdateRequestRepository::approve`]).

use sqlx::PgPool;

use chequealo_core::{ShopId, UserId};

use super::RepositoryError;
use crate::models::{OwnedShop, Shop};

/// Shop columns joined with the rating view, aliased as `s` and `r`.
macro_rules! shop_select {
    () => {
        r"
        SELECT s.id, s.name, s.address, s.city, s.phone, s.schedule, s.whatsapp,
               s.map_link, s.latitude, s.longitude,
               r.average_rating, r.review_count
        FROM directory.shop s
        JOIN directory.shop_rating r ON r.shop_id = s.id
        "
    };
}

/// Repository for shop lookups.
pub struct ShopRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ShopRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Every shop with its rating aggregate, in id order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Shop>, RepositoryError> {
        let shops = sqlx::query_as::<_, Shop>(concat!(shop_select!(), "ORDER BY s.id"))
            .fetch_all(self.pool)
            .await?;

        Ok(shops)
    }

    /// One shop with its rating aggregate.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ShopId) -> Result<Option<Shop>, RepositoryError> {
        let shop = sqlx::query_as::<_, Shop>(concat!(shop_select!(), "WHERE s.id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(shop)
    }

    /// Whether a shop with this id exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists(&self, id: ShopId) -> Result<bool, RepositoryError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM directory.shop WHERE id = $1)",
        )
        .bind(id)
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }

    /// Whether any verified owner exists for the shop.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn is_claimed(&self, id: ShopId) -> Result<bool, RepositoryError> {
        let claimed = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM directory.shop_owner WHERE shop_id = $1)",
        )
        .bind(id)
        .fetch_one(self.pool)
        .await?;

        Ok(claimed)
    }

    /// Whether `user_id` is a verified owner of the shop.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn is_owner(&self, id: ShopId, user_id: UserId) -> Result<bool, RepositoryError> {
        let owner = sqlx::query_scalar::<_, bool>(
            r"
            SELECT EXISTS (
                SELECT 1 FROM directory.shop_owner WHERE shop_id = $1 AND user_id = $2
            )
            ",
        )
        .bind(id)
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        Ok(owner)
    }

    /// Shops the user is a verified owner of, oldest ownership first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn owned_by(&self, user_id: UserId) -> Result<Vec<OwnedShop>, RepositoryError> {
        let shops = sqlx::query_as::<_, OwnedShop>(
            r"
            SELECT o.id AS ownership_id, o.created_at AS owner_since,
                   s.id, s.name, s.address, s.city, s.phone, s.schedule, s.whatsapp,
                   s.map_link, s.latitude, s.longitude,
                   r.average_rating, r.review_count
            FROM directory.shop_owner o
            JOIN directory.shop s ON s.id = o.shop_id
            JOIN directory.shop_rating r ON r.shop_id = s.id
            WHERE o.user_id = $1
            ORDER BY o.created_at, o.id
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(shops)
    }
}
