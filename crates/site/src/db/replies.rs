//! Owner replies to reviews.
//!
//! Both writes carry the ownership check in the statement itself, so a
//! caller who is not a verified owner of the review's shop matches no rows.

use sqlx::PgPool;
use tracing::instrument;

use chequealo_core::{ReplyId, ReviewId, ShopId, UserId};

use super::RepositoryError;
use crate::models::Reply;

/// Repository for `directory.review_reply`.
pub struct ReplyRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReplyRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create the reply to a review as one of the shop's owners.
    ///
    /// Returns `None` when the review does not exist or `owner` does not own
    /// its shop.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the review already has a reply.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self, text), fields(review_id = %review_id, owner = %owner))]
    pub async fn create_as_owner(
        &self,
        review_id: ReviewId,
        owner: UserId,
        text: &str,
    ) -> Result<Option<Reply>, RepositoryError> {
        let reply = sqlx::query_as::<_, Reply>(
            r"
            INSERT INTO directory.review_reply (review_id, shop_id, owner_user_id, reply_text)
            SELECT r.id, r.shop_id, $2, $3
            FROM directory.review r
            WHERE r.id = $1
              AND EXISTS (
                  SELECT 1 FROM directory.shop_owner o
                  WHERE o.shop_id = r.shop_id AND o.user_id = $2
              )
            RETURNING id, review_id, shop_id, owner_user_id, reply_text, created_at, updated_at
            ",
        )
        .bind(review_id)
        .bind(owner)
        .bind(text)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "review already has a reply"))?;

        Ok(reply)
    }

    /// Replace a reply's text as one of the shop's owners.
    ///
    /// Returns `None` when the reply does not exist or `owner` does not own
    /// its shop.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    #[instrument(skip(self, text), fields(reply_id = %id, owner = %owner))]
    pub async fn update_as_owner(
        &self,
        id: ReplyId,
        owner: UserId,
        text: &str,
    ) -> Result<Option<Reply>, RepositoryError> {
        let reply = sqlx::query_as::<_, Reply>(
            r"
            UPDATE directory.review_reply rr
            SET reply_text = $3, updated_at = NOW()
            WHERE rr.id = $1
              AND EXISTS (
                  SELECT 1 FROM directory.shop_owner o
                  WHERE o.shop_id = rr.shop_id AND o.user_id = $2
              )
            RETURNING rr.id, rr.review_id, rr.shop_id, rr.owner_user_id, rr.reply_text,
                      rr.created_at, rr.updated_at
            ",
        )
        .bind(id)
        .bind(owner)
        .bind(text)
        .fetch_optional(self.pool)
        .await?;

        Ok(reply)
    }

    /// All replies on a shop's reviews.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn for_shop(&self, shop_id: ShopId) -> Result<Vec<Reply>, RepositoryError> {
        let replies = sqlx::query_as::<_, Reply>(
            r"
            SELECT id, review_id, shop_id, owner_user_id, reply_text, created_at, updated_at
            FROM directory.review_reply
            WHERE shop_id = $1
            ORDER BY created_at, id
            ",
        )
        .bind(shop_id)
        .fetch_all(self.pool)
        .await?;

        Ok(replies)
    }
}
