//! Reviews and owner replies.

use chrono::{DateTime, Utc};
use serde::Serialize;

use chequealo_core::{Rating, ReplyId, ReviewId, ShopId, UserId};

/// A user's rating and comment on a shop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Review {
    pub id: ReviewId,
    pub shop_id: ShopId,
    pub user_id: UserId,
    pub reviewer_name: String,
    pub rating: Rating,
    pub comment: String,
    /// Set by the single permitted edit; the review is immutable afterwards.
    pub has_been_edited: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// An owner's public answer to a review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Reply {
    pub id: ReplyId,
    pub review_id: ReviewId,
    pub shop_id: ShopId,
    pub owner_user_id: UserId,
    pub reply_text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A review as shown on a shop page, with its label and reply.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewView {
    #[serde(flatten)]
    pub review: Review,
    pub rating_label: &'static str,
    pub reply: Option<Reply>,
}

impl ReviewView {
    /// Pair each review with its reply, if one exists.
    #[must_use]
    pub fn attach(reviews: Vec<Review>, mut replies: Vec<Reply>) -> Vec<Self> {
        reviews
            .into_iter()
            .map(|review| {
                let reply = replies
                    .iter()
                    .position(|r| r.review_id == review.id)
                    .map(|idx| replies.swap_remove(idx));
                Self {
                    rating_label: review.rating.label(),
                    review,
                    reply,
                }
            })
            .collect()
    }
}

/// A review in the author's own history, with the shop it belongs to.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UserReview {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub review: Review,
    pub shop_name: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn review(id: i32, rating: i64) -> Review {
        Review {
            id: ReviewId::new(id),
            shop_id: ShopId::new(1),
            user_id: UserId::new(id),
            reviewer_name: "ana".to_string(),
            rating: Rating::new(rating).unwrap(),
            comment: "Buen servicio".to_string(),
            has_been_edited: false,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn reply(id: i32, review_id: i32) -> Reply {
        Reply {
            id: ReplyId::new(id),
            review_id: ReviewId::new(review_id),
            shop_id: ShopId::new(1),
            owner_user_id: UserId::new(99),
            reply_text: "Gracias".to_string(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn test_attach_pairs_replies_by_review() {
        let views = ReviewView::attach(
            vec![review(1, 5), review(2, 2), review(3, 4)],
            vec![reply(10, 3), reply(11, 1)],
        );

        assert_eq!(views.len(), 3);
        assert_eq!(views[0].reply.as_ref().unwrap().id, ReplyId::new(11));
        assert!(views[1].reply.is_none());
        assert_eq!(views[2].reply.as_ref().unwrap().id, ReplyId::new(10));
        assert_eq!(views[1].rating_label, "Regular");
    }

    #[test]
    fn test_view_serializes_flat() {
        let view = ReviewView::attach(vec![review(1, 4)], vec![]).remove(0);
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["rating"], 4);
        assert_eq!(json["rating_label"], "Muy bueno");
        assert!(json["reply"].is_null());
    }
}
