//! Reviews and owner replies.
//!
//! One review per user and shop, one edit per review, one reply per review.
//! The checks here only shape the error message; the unique indexes and the
//! conditional statements in the repositories decide.

use sqlx::PgPool;
use tracing::instrument;

use chequealo_core::{Rating, ReplyId, ReviewId, ShopId};

use super::error::Duplicate;
use super::{Caller, ServiceError};
use crate::db::{ReplyRepository, ReviewRepository, ShopRepository, UserRepository};
use crate::models::user::reviewer_name;
use crate::models::{Reply, Review, ReviewView, UserReview};

/// Longest accepted review comment, in characters.
pub const MAX_COMMENT_LENGTH: usize = 500;

/// Longest accepted reply, in characters.
pub const MAX_REPLY_LENGTH: usize = 500;

/// Validate a star rating and comment, returning the trimmed comment.
///
/// # Errors
///
/// Returns `ServiceError::Validation` for an out-of-range rating or a blank
/// or over-long comment.
pub fn validate_review(rating: i64, comment: &str) -> Result<(Rating, String), ServiceError> {
    let rating = Rating::new(rating).map_err(|e| ServiceError::Validation(e.to_string()))?;
    let comment = validate_text(comment, "comment", MAX_COMMENT_LENGTH)?;
    Ok((rating, comment))
}

/// Validate reply text, returning it trimmed.
///
/// # Errors
///
/// Returns `ServiceError::Validation` for blank or over-long text.
pub fn validate_reply(text: &str) -> Result<String, ServiceError> {
    validate_text(text, "reply", MAX_REPLY_LENGTH)
}

fn validate_text(text: &str, what: &str, max: usize) -> Result<String, ServiceError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ServiceError::Validation(format!("{what} must not be empty")));
    }
    if text.chars().count() > max {
        return Err(ServiceError::Validation(format!(
            "{what} must be at most {max} characters"
        )));
    }
    Ok(text.to_string())
}

/// Review and reply operations.
pub struct ReviewService<'a> {
    shops: ShopRepository<'a>,
    users: UserRepository<'a>,
    reviews: ReviewRepository<'a>,
    replies: ReplyRepository<'a>,
}

impl<'a> ReviewService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            shops: ShopRepository::new(pool),
            users: UserRepository::new(pool),
            reviews: ReviewRepository::new(pool),
            replies: ReplyRepository::new(pool),
        }
    }

    /// Submit the caller's review of a shop.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for bad input, `NotFound` for an unknown shop and
    /// `Duplicate(Review)` if the caller already reviewed it.
    #[instrument(skip(self, caller, comment), fields(user_id = %caller.user_id, shop_id = %shop_id))]
    pub async fn submit(
        &self,
        caller: &Caller,
        shop_id: ShopId,
        rating: i64,
        comment: &str,
    ) -> Result<Review, ServiceError> {
        let (rating, comment) = validate_review(rating, comment)?;

        if !self.shops.exists(shop_id).await? {
            return Err(ServiceError::NotFound("shop"));
        }
        if self.reviews.has_reviewed(shop_id, caller.user_id).await? {
            return Err(ServiceError::Duplicate(Duplicate::Review));
        }

        let user = self.users.get_by_id(caller.user_id).await?;
        let name = reviewer_name(
            user.as_ref().and_then(|u| u.display_name.as_deref()),
            user.as_ref().map(|u| &u.email),
        );

        let review = self
            .reviews
            .create(shop_id, caller.user_id, &name, rating, &comment)
            .await
            .map_err(|e| ServiceError::duplicate_on_conflict(e, Duplicate::Review))?;

        tracing::info!(review_id = %review.id, "Review submitted");
        Ok(review)
    }

    /// Use the caller's single edit on one of their reviews.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyEdited` if the edit was already used and `NotFound` if
    /// the review does not exist or belongs to someone else.
    #[instrument(skip(self, caller, comment), fields(user_id = %caller.user_id, review_id = %review_id))]
    pub async fn edit(
        &self,
        caller: &Caller,
        review_id: ReviewId,
        rating: i64,
        comment: &str,
    ) -> Result<Review, ServiceError> {
        let (rating, comment) = validate_review(rating, comment)?;

        if let Some(review) = self
            .reviews
            .edit_once(review_id, caller.user_id, rating, &comment)
            .await?
        {
            return Ok(review);
        }

        match self.reviews.get(review_id).await? {
            Some(review) if review.user_id == caller.user_id && review.has_been_edited => {
                Err(ServiceError::AlreadyEdited)
            }
            _ => Err(ServiceError::NotFound("review")),
        }
    }

    /// Reviews of a shop with labels and replies, newest first.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown shop.
    pub async fn for_shop(&self, shop_id: ShopId) -> Result<Vec<ReviewView>, ServiceError> {
        if !self.shops.exists(shop_id).await? {
            return Err(ServiceError::NotFound("shop"));
        }
        self.views(shop_id).await
    }

    async fn views(&self, shop_id: ShopId) -> Result<Vec<ReviewView>, ServiceError> {
        let reviews = self.reviews.for_shop(shop_id).await?;
        let replies = self.replies.for_shop(shop_id).await?;
        Ok(ReviewView::attach(reviews, replies))
    }

    /// The caller's review of a shop, if any.
    ///
    /// # Errors
    ///
    /// Returns `Repository` on database failure.
    pub async fn mine_for_shop(
        &self,
        caller: &Caller,
        shop_id: ShopId,
    ) -> Result<Option<Review>, ServiceError> {
        Ok(self.reviews.by_user_for_shop(shop_id, caller.user_id).await?)
    }

    /// Everything the caller has reviewed.
    ///
    /// # Errors
    ///
    /// Returns `Repository` on database failure.
    pub async fn by_caller(&self, caller: &Caller) -> Result<Vec<UserReview>, ServiceError> {
        Ok(self.reviews.by_user(caller.user_id).await?)
    }

    /// Reviews of a shop the caller owns, for the owner dashboard.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` unless the caller is a verified owner of the shop.
    pub async fn for_owned_shop(
        &self,
        caller: &Caller,
        shop_id: ShopId,
    ) -> Result<Vec<ReviewView>, ServiceError> {
        if !self.shops.is_owner(shop_id, caller.user_id).await? {
            return Err(ServiceError::Forbidden);
        }
        self.views(shop_id).await
    }

    /// Reply to a review as an owner of its shop.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` unless the caller owns the review's shop (an unknown
    /// review is reported the same way) and `Duplicate(Reply)` if the review
    /// already has a reply.
    #[instrument(skip(self, caller, text), fields(user_id = %caller.user_id, review_id = %review_id))]
    pub async fn reply(
        &self,
        caller: &Caller,
        review_id: ReviewId,
        text: &str,
    ) -> Result<Reply, ServiceError> {
        let text = validate_reply(text)?;

        let reply = self
            .replies
            .create_as_owner(review_id, caller.user_id, &text)
            .await
            .map_err(|e| ServiceError::duplicate_on_conflict(e, Duplicate::Reply))?
            .ok_or(ServiceError::Forbidden)?;

        tracing::info!(reply_id = %reply.id, "Reply created");
        Ok(reply)
    }

    /// Replace the text of a reply as an owner of its shop.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` unless the caller owns the reply's shop.
    #[instrument(skip(self, caller, text), fields(user_id = %caller.user_id, reply_id = %reply_id))]
    pub async fn update_reply(
        &self,
        caller: &Caller,
        reply_id: ReplyId,
        text: &str,
    ) -> Result<Reply, ServiceError> {
        let text = validate_reply(text)?;

        self.replies
            .update_as_owner(reply_id, caller.user_id, &text)
            .await?
            .ok_or(ServiceError::Forbidden)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_review_accepts_and_trims() {
        let (rating, comment) = validate_review(4, "  Rápidos y honestos ").unwrap();
        assert_eq!(rating.stars(), 4);
        assert_eq!(comment, "Rápidos y honestos");
    }

    #[test]
    fn test_validate_review_rejects_rating_out_of_range() {
        assert!(matches!(validate_review(0, "ok"), Err(ServiceError::Validation(_))));
        assert!(matches!(validate_review(6, "ok"), Err(ServiceError::Validation(_))));
    }

    #[test]
    fn test_validate_review_rejects_blank_comment() {
        assert!(matches!(validate_review(3, "   \n"), Err(ServiceError::Validation(_))));
    }

    #[test]
    fn test_comment_limit_counts_characters() {
        let exactly = "ñ".repeat(MAX_COMMENT_LENGTH);
        assert!(validate_review(5, &exactly).is_ok());

        let over = "a".repeat(MAX_COMMENT_LENGTH + 1);
        let err = validate_review(5, &over).unwrap_err();
        assert_eq!(err.to_string(), "comment must be at most 500 characters");
    }

    #[test]
    fn test_validate_reply() {
        assert_eq!(validate_reply(" Gracias ").unwrap(), "Gracias");
        assert!(validate_reply("").is_err());
        assert!(validate_reply(&"b".repeat(MAX_REPLY_LENGTH + 1)).is_err());
    }
}
