//! Review repository.

use sqlx::PgPool;
use tracing::instrument;

use chequealo_core::{Rating, ReviewId, ShopId, UserId};

use super::RepositoryError;
use crate::models::{Review, UserReview};

const REVIEW_COLUMNS: &str = "id, shop_id, user_id, reviewer_name, rating, comment, has_been_edited, created_at, updated_at";

/// Repository for `directory.review`.
pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a review.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user already reviewed the shop.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self, reviewer_name, comment), fields(shop_id = %shop_id, user_id = %user_id))]
    pub async fn create(
        &self,
        shop_id: ShopId,
        user_id: UserId,
        reviewer_name: &str,
        rating: Rating,
        comment: &str,
    ) -> Result<Review, RepositoryError> {
        let review = sqlx::query_as::<_, Review>(&format!(
            r"
            INSERT INTO directory.review (shop_id, user_id, reviewer_name, rating, comment)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {REVIEW_COLUMNS}
            "
        ))
        .bind(shop_id)
        .bind(user_id)
        .bind(reviewer_name)
        .bind(rating)
        .bind(comment)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "review already exists for this shop"))?;

        Ok(review)
    }

    /// Apply the single permitted edit.
    ///
    /// Matches only an unedited review owned by `user_id`; `None` means no such
    /// review (missing, someone else's, or already edited).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    #[instrument(skip(self, comment), fields(review_id = %id, user_id = %user_id))]
    pub async fn edit_once(
        &self,
        id: ReviewId,
        user_id: UserId,
        rating: Rating,
        comment: &str,
    ) -> Result<Option<Review>, RepositoryError> {
        let review = sqlx::query_as::<_, Review>(&format!(
            r"
            UPDATE directory.review
            SET rating = $3, comment = $4, has_been_edited = TRUE, updated_at = NOW()
            WHERE id = $1 AND user_id = $2 AND has_been_edited = FALSE
            RETURNING {REVIEW_COLUMNS}
            "
        ))
        .bind(id)
        .bind(user_id)
        .bind(rating)
        .bind(comment)
        .fetch_optional(self.pool)
        .await?;

        Ok(review)
    }

    /// Get a review by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ReviewId) -> Result<Option<Review>, RepositoryError> {
        let review = sqlx::query_as::<_, Review>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM directory.review WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(review)
    }

    /// Reviews of a shop, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn for_shop(&self, shop_id: ShopId) -> Result<Vec<Review>, RepositoryError> {
        let reviews = sqlx::query_as::<_, Review>(&format!(
            r"
            SELECT {REVIEW_COLUMNS} FROM directory.review
            WHERE shop_id = $1
            ORDER BY created_at DESC, id DESC
            "
        ))
        .bind(shop_id)
        .fetch_all(self.pool)
        .await?;

        Ok(reviews)
    }

    /// The user's review of a shop, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn by_user_for_shop(
        &self,
        shop_id: ShopId,
        user_id: UserId,
    ) -> Result<Option<Review>, RepositoryError> {
        let review = sqlx::query_as::<_, Review>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM directory.review WHERE shop_id = $1 AND user_id = $2"
        ))
        .bind(shop_id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(review)
    }

    /// Whether the user already reviewed the shop.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn has_reviewed(&self, shop_id: ShopId, user_id: UserId) -> Result<bool, RepositoryError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r"
            SELECT EXISTS (
                SELECT 1 FROM directory.review WHERE shop_id = $1 AND user_id = $2
            )
            ",
        )
        .bind(shop_id)
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }

    /// All of a user's reviews with shop names, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn by_user(&self, user_id: UserId) -> Result<Vec<UserReview>, RepositoryError> {
        let reviews = sqlx::query_as::<_, UserReview>(
            r"
            SELECT r.id, r.shop_id, r.user_id, r.reviewer_name, r.rating, r.comment,
                   r.has_been_edited, r.created_at, r.updated_at,
                   s.name AS shop_name
            FROM directory.review r
            JOIN directory.shop s ON s.id = r.shop_id
            WHERE r.user_id = $1
            ORDER BY r.created_at DESC, r.id DESC
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(reviews)
    }
}
